//! Salary element model and related types.
//!
//! A salary element is a single named earning, deduction, or contribution line
//! (e.g., a housing allowance, a provident fund deduction). Elements are pure
//! configuration: adding or editing them requires no code change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The payroll direction of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Money paid to the employee (basic salary, allowances, bonus).
    Earning,
    /// Money withheld from the employee (taxes, recoveries).
    Deduction,
    /// Statutory contribution, possibly with an employer-side share.
    Contribution,
}

/// The fallback calculation method used when no rule matches an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// The element's `default_amount`, as-is.
    Fixed,
    /// A percentage of another element's computed amount.
    Percentage,
    /// The `default_amount` scaled by `present_days / period_days`.
    Prorated,
}

/// A single named earning, deduction, or contribution line.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CalculationMethod, ElementType, SalaryElement};
/// use rust_decimal::Decimal;
///
/// let basic = SalaryElement {
///     code: "basic".to_string(),
///     name: "Basic Salary".to_string(),
///     element_type: ElementType::Earning,
///     category: "salary".to_string(),
///     calculation_method: CalculationMethod::Fixed,
///     percentage_of: None,
///     percentage: None,
///     default_amount: Decimal::new(50_000, 0),
///     is_statutory: false,
///     is_recurring: true,
///     is_taxable: true,
///     jurisdiction: None,
///     is_system_defined: true,
///     is_active: true,
///     display_order: 1,
/// };
/// assert!(basic.is_active);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryElement {
    /// Unique element code (e.g., "basic", "hra", "pf_employee").
    pub code: String,
    /// Human-readable display name.
    pub name: String,
    /// Whether this is an earning, deduction, or contribution.
    pub element_type: ElementType,
    /// Grouping category for display and reporting (e.g., "allowance").
    pub category: String,
    /// Fallback calculation method when no rule matches.
    pub calculation_method: CalculationMethod,
    /// For `Percentage` elements, the code of the element the percentage applies to.
    #[serde(default)]
    pub percentage_of: Option<String>,
    /// For `Percentage` elements, the percentage value (e.g., 40 for 40%).
    #[serde(default)]
    pub percentage: Option<Decimal>,
    /// Default amount used by the `Fixed` and `Prorated` methods.
    #[serde(default)]
    pub default_amount: Decimal,
    /// True for externally mandated elements (provident fund, slab tax).
    #[serde(default)]
    pub is_statutory: bool,
    /// True if the element recurs every period.
    #[serde(default)]
    pub is_recurring: bool,
    /// True if the element counts toward taxable income.
    #[serde(default)]
    pub is_taxable: bool,
    /// Jurisdiction scope; `None` means the element applies globally.
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// System-defined elements are immutable to end users.
    #[serde(default)]
    pub is_system_defined: bool,
    /// Inactive elements always calculate to zero.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Ordering hint for payslip display.
    #[serde(default)]
    pub display_order: u32,
}

fn default_true() -> bool {
    true
}

/// Links an element to a regulatory authority and reporting code for a
/// jurisdiction. Read-only from the engine's perspective; used for statutory
/// reporting, never for amount computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceMapping {
    /// The element this mapping belongs to.
    pub element_code: String,
    /// The regulatory authority (e.g., a provident fund organisation).
    pub authority: String,
    /// The authority's reporting code for this element.
    pub reporting_code: String,
    /// Jurisdiction the mapping applies in.
    pub jurisdiction: String,
    /// Start of the effective window (inclusive).
    pub effective_from: NaiveDate,
    /// End of the effective window (exclusive); `None` means open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Optional wage ceiling the authority caps reporting at.
    #[serde(default)]
    pub wage_ceiling: Option<Decimal>,
    /// Optional minimum wage for applicability.
    #[serde(default)]
    pub wage_min: Option<Decimal>,
    /// Optional maximum wage for applicability.
    #[serde(default)]
    pub wage_max: Option<Decimal>,
}

impl ComplianceMapping {
    /// Returns true if the mapping is effective on `date`.
    ///
    /// The window is `[effective_from, effective_to)`; an absent
    /// `effective_to` means open-ended.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.map_or(true, |to| date < to)
    }
}
