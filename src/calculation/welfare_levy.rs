//! Jurisdiction welfare levy calculation.
//!
//! The levy is a flat per-head amount collected only in specific calendar
//! months, per jurisdiction. An entry may bound the wage from either side and
//! exempt named employment types; anything outside those bounds yields a
//! not-applicable result with a reason rather than a silent zero.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::WelfareLevyEntry;

/// The structured result of a welfare levy lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WelfareLevyResult {
    /// False when the levy does not apply; see `reason`.
    pub applicable: bool,
    /// Why the levy does not apply, when it doesn't.
    pub reason: Option<String>,
    /// Employee share for the month.
    pub employee_amount: Decimal,
    /// Employer share for the month.
    pub employer_amount: Decimal,
}

impl WelfareLevyResult {
    fn not_applicable(reason: String) -> Self {
        Self {
            applicable: false,
            reason: Some(reason),
            employee_amount: Decimal::ZERO,
            employer_amount: Decimal::ZERO,
        }
    }
}

/// Looks up the welfare levy for one employee-month.
///
/// `month` is the calendar month (1-12) of the period being calculated.
pub fn calculate_welfare_levy(
    schedules: &BTreeMap<String, WelfareLevyEntry>,
    jurisdiction: &str,
    month: u32,
    monthly_wage: Decimal,
    employment_type: &str,
) -> WelfareLevyResult {
    let Some(entry) = schedules.get(jurisdiction) else {
        return WelfareLevyResult::not_applicable(format!(
            "no welfare levy configured for jurisdiction '{jurisdiction}'"
        ));
    };

    if !entry.deduction_months.contains(&month) {
        return WelfareLevyResult::not_applicable(format!(
            "month {month} is not a deduction month for '{jurisdiction}'"
        ));
    }
    if entry
        .exempt_employment_types
        .iter()
        .any(|exempt| exempt.eq_ignore_ascii_case(employment_type))
    {
        return WelfareLevyResult::not_applicable(format!(
            "employment type '{employment_type}' is exempt"
        ));
    }
    if let Some(floor) = entry.wage_floor {
        if monthly_wage < floor {
            return WelfareLevyResult::not_applicable(format!(
                "wage {monthly_wage} is below the floor {floor}"
            ));
        }
    }
    if let Some(ceiling) = entry.wage_ceiling {
        if monthly_wage > ceiling {
            return WelfareLevyResult::not_applicable(format!(
                "wage {monthly_wage} exceeds the ceiling {ceiling}"
            ));
        }
    }

    WelfareLevyResult {
        applicable: true,
        reason: None,
        employee_amount: entry.employee_amount,
        employer_amount: entry.employer_amount,
    }
}
