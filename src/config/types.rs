//! Statutory configuration tables.
//!
//! These are the jurisdiction-mandated constants the statutory calculators run
//! on: contribution rates and wage ceilings, regional tax slab tables,
//! termination-benefit conventions, bonus bands, and welfare levy schedules.
//! Defaults carry a representative configuration; production deployments load
//! their own tables from `statutory.yaml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contribution-with-ceiling configuration (provident-fund style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidentFundConfig {
    /// Maximum wage base for contribution, regardless of actual wage.
    pub wage_ceiling: Decimal,
    /// Employee contribution rate on the capped wage.
    pub employee_rate: Decimal,
    /// Employer pension sub-rate; together with `employer_fund_rate` it must
    /// sum to the nominal employer rate.
    pub employer_pension_rate: Decimal,
    /// Employer fund sub-rate.
    pub employer_fund_rate: Decimal,
    /// Flat administrative surcharge rate on the capped wage.
    pub admin_charge_rate: Decimal,
    /// Flat insurance surcharge rate on the capped wage.
    pub insurance_charge_rate: Decimal,
}

impl Default for ProvidentFundConfig {
    fn default() -> Self {
        Self {
            wage_ceiling: Decimal::new(15_000, 0),
            employee_rate: Decimal::new(12, 2),
            employer_pension_rate: Decimal::new(833, 4),
            employer_fund_rate: Decimal::new(367, 4),
            admin_charge_rate: Decimal::new(50, 4),
            insurance_charge_rate: Decimal::new(50, 4),
        }
    }
}

/// Income-threshold contribution configuration (health-insurance style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceConfig {
    /// Gross wage above which the contribution is inapplicable.
    pub gross_ceiling: Decimal,
    /// Employee contribution rate on gross wage.
    pub employee_rate: Decimal,
    /// Employer contribution rate on gross wage.
    pub employer_rate: Decimal,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            gross_ceiling: Decimal::new(21_000, 0),
            employee_rate: Decimal::new(75, 4),
            employer_rate: Decimal::new(325, 4),
        }
    }
}

/// One slab of a regional payroll tax table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    /// Inclusive lower bound of the gross wage range.
    pub min: Decimal,
    /// Inclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Monthly tax for wages in this slab.
    pub tax: Decimal,
    /// Override tax applied only when the invoked month is February.
    #[serde(default)]
    pub february_tax: Option<Decimal>,
}

impl TaxSlab {
    /// Returns true if `gross` falls inside this slab's range.
    pub fn contains(&self, gross: Decimal) -> bool {
        gross >= self.min && self.max.map_or(true, |max| gross <= max)
    }
}

/// Service-based termination benefit configuration (gratuity style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratuityConfig {
    /// Minimum service months for eligibility under a standard exit.
    ///
    /// The conventional value is 56 (4 years 8 months), encoding the
    /// "4 years 240 days counts as 5 years" practice.
    pub required_months: u32,
    /// Benefit days credited per completed year of service.
    pub days_per_year: Decimal,
    /// Working days per month used as the denominator.
    pub working_days_per_month: Decimal,
    /// Statutory maximum benefit.
    pub statutory_cap: Decimal,
    /// Exit reasons that waive the minimum tenure gate.
    pub qualifying_reasons: Vec<String>,
}

impl Default for GratuityConfig {
    fn default() -> Self {
        Self {
            required_months: 56,
            days_per_year: Decimal::new(15, 0),
            working_days_per_month: Decimal::new(26, 0),
            statutory_cap: Decimal::new(2_000_000, 0),
            qualifying_reasons: vec!["death".to_string(), "disability".to_string()],
        }
    }
}

/// Profit/tenure-linked bonus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusConfig {
    /// Minimum days worked in the period for eligibility.
    pub min_working_days: Decimal,
    /// Average monthly salary above which the employee is ineligible.
    pub eligibility_ceiling: Decimal,
    /// Monthly salary cap used for the bonus computation itself.
    pub calculation_ceiling: Decimal,
    /// Minimum bonus rate on the capped annual salary.
    pub min_rate: Decimal,
    /// Maximum bonus rate on the capped annual salary.
    pub max_rate: Decimal,
    /// Floor on the minimum bonus, in currency units.
    pub flat_minimum: Decimal,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            min_working_days: Decimal::new(30, 0),
            eligibility_ceiling: Decimal::new(21_000, 0),
            calculation_ceiling: Decimal::new(7_000, 0),
            min_rate: Decimal::new(833, 4),
            max_rate: Decimal::new(20, 2),
            flat_minimum: Decimal::new(100, 0),
        }
    }
}

/// Per-jurisdiction welfare levy schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelfareLevyEntry {
    /// Flat employee contribution per deduction month.
    pub employee_amount: Decimal,
    /// Flat employer contribution per deduction month.
    pub employer_amount: Decimal,
    /// Calendar months (1-12) in which the levy is deducted.
    pub deduction_months: Vec<u32>,
    /// Wage above which the levy does not apply.
    #[serde(default)]
    pub wage_ceiling: Option<Decimal>,
    /// Wage below which the levy does not apply.
    #[serde(default)]
    pub wage_floor: Option<Decimal>,
    /// Employment types exempt from the levy (e.g., interns).
    #[serde(default)]
    pub exempt_employment_types: Vec<String>,
}

/// The aggregate of all statutory constant tables for a run.
///
/// Treated as an immutable snapshot for the duration of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatutoryConfig {
    /// Contribution-with-ceiling constants.
    #[serde(default)]
    pub provident_fund: ProvidentFundConfig,
    /// Income-threshold contribution constants.
    #[serde(default)]
    pub insurance: InsuranceConfig,
    /// Regional tax slab tables keyed by jurisdiction code.
    #[serde(default)]
    pub tax_slabs: BTreeMap<String, Vec<TaxSlab>>,
    /// Termination benefit constants.
    #[serde(default)]
    pub gratuity: GratuityConfig,
    /// Bonus constants.
    #[serde(default)]
    pub bonus: BonusConfig,
    /// Welfare levy schedules keyed by jurisdiction code.
    #[serde(default)]
    pub welfare_levy: BTreeMap<String, WelfareLevyEntry>,
}
