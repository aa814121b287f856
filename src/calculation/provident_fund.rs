//! Contribution-with-ceiling calculation (provident-fund style).
//!
//! The contribution wage is the basic-plus-allowance wage capped at the
//! configured ceiling. The employee contributes a flat rate of that wage; the
//! employer side splits into a pension sub-rate and a fund sub-rate that
//! together sum to the nominal employer rate, plus flat administrative and
//! insurance surcharges computed off the same capped wage. Every money figure
//! is rounded to the nearest whole unit.

use rust_decimal::Decimal;

use crate::config::ProvidentFundConfig;
use crate::formula::round_half_up;

/// The structured result of a provident fund calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidentFundResult {
    /// The wage base after applying the ceiling.
    pub contribution_wage: Decimal,
    /// Employee share.
    pub employee_contribution: Decimal,
    /// Employer pension share.
    pub employer_pension: Decimal,
    /// Employer fund share.
    pub employer_fund: Decimal,
    /// Administrative surcharge.
    pub admin_charge: Decimal,
    /// Insurance surcharge.
    pub insurance_charge: Decimal,
}

impl ProvidentFundResult {
    /// Total employer outgo: pension + fund + surcharges.
    pub fn total_employer(&self) -> Decimal {
        self.employer_pension + self.employer_fund + self.admin_charge + self.insurance_charge
    }
}

/// Calculates the provident fund contribution for one month's wage.
///
/// `basic_plus_allowance` is the monthly basic wage plus dearness allowance.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_provident_fund;
/// use payroll_engine::config::ProvidentFundConfig;
/// use rust_decimal::Decimal;
///
/// // wage 20,000 with a 15,000 ceiling at 12% => employee share 1,800
/// let result = calculate_provident_fund(
///     Decimal::new(20_000, 0),
///     &ProvidentFundConfig::default(),
/// );
/// assert_eq!(result.contribution_wage, Decimal::new(15_000, 0));
/// assert_eq!(result.employee_contribution, Decimal::new(1_800, 0));
/// ```
pub fn calculate_provident_fund(
    basic_plus_allowance: Decimal,
    config: &ProvidentFundConfig,
) -> ProvidentFundResult {
    let contribution_wage = basic_plus_allowance.min(config.wage_ceiling);

    ProvidentFundResult {
        contribution_wage,
        employee_contribution: round_half_up(contribution_wage * config.employee_rate, 0),
        employer_pension: round_half_up(contribution_wage * config.employer_pension_rate, 0),
        employer_fund: round_half_up(contribution_wage * config.employer_fund_rate, 0),
        admin_charge: round_half_up(contribution_wage * config.admin_charge_rate, 0),
        insurance_charge: round_half_up(contribution_wage * config.insurance_charge_rate, 0),
    }
}
