//! Income-threshold contribution calculation (health-insurance style).
//!
//! The contribution is inapplicable when the employee opted out or the gross
//! wage exceeds the configured ceiling; otherwise both shares are flat
//! percentages of gross wage, rounded to whole units. A ceiling-breach helper
//! lets callers stop future deductions once an employee crosses the threshold
//! mid-year.

use rust_decimal::Decimal;

use crate::config::InsuranceConfig;
use crate::formula::round_half_up;

/// The structured result of an insurance contribution calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct InsuranceContributionResult {
    /// False when the contribution does not apply; see `reason`.
    pub applicable: bool,
    /// Why the contribution does not apply, when it doesn't.
    pub reason: Option<String>,
    /// Employee share of the contribution.
    pub employee_contribution: Decimal,
    /// Employer share of the contribution.
    pub employer_contribution: Decimal,
}

impl InsuranceContributionResult {
    fn not_applicable(reason: String) -> Self {
        Self {
            applicable: false,
            reason: Some(reason),
            employee_contribution: Decimal::ZERO,
            employer_contribution: Decimal::ZERO,
        }
    }
}

/// Calculates the insurance contribution on one month's gross wage.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_insurance_contribution;
/// use payroll_engine::config::InsuranceConfig;
/// use rust_decimal::Decimal;
///
/// // gross 22,000 exceeds the 21,000 ceiling: not applicable
/// let result = calculate_insurance_contribution(
///     Decimal::new(22_000, 0),
///     false,
///     &InsuranceConfig::default(),
/// );
/// assert!(!result.applicable);
/// assert_eq!(result.employee_contribution, Decimal::ZERO);
/// ```
pub fn calculate_insurance_contribution(
    gross_wage: Decimal,
    opted_out: bool,
    config: &InsuranceConfig,
) -> InsuranceContributionResult {
    if opted_out {
        return InsuranceContributionResult::not_applicable(
            "employee has opted out of the insurance scheme".to_string(),
        );
    }
    if gross_wage > config.gross_ceiling {
        return InsuranceContributionResult::not_applicable(format!(
            "gross wage {gross_wage} exceeds the ceiling {}",
            config.gross_ceiling
        ));
    }

    InsuranceContributionResult {
        applicable: true,
        reason: None,
        employee_contribution: round_half_up(gross_wage * config.employee_rate, 0),
        employer_contribution: round_half_up(gross_wage * config.employer_rate, 0),
    }
}

/// Returns true exactly when a wage revision crossed the ceiling.
///
/// True iff `previous <= ceiling < current`. Used by callers to stop future
/// deductions once an employee crosses the threshold mid-year. A wage that
/// was already above the ceiling does not "breach" again.
pub fn check_ceiling_breach(current: Decimal, previous: Decimal, ceiling: Decimal) -> bool {
    previous <= ceiling && current > ceiling
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ==========================================================================
    // ESI-001: gross above the ceiling is not applicable
    // ==========================================================================
    #[test]
    fn test_esi_001_gross_above_ceiling_not_applicable() {
        let result =
            calculate_insurance_contribution(dec("22000"), false, &InsuranceConfig::default());

        assert!(!result.applicable);
        assert_eq!(result.employee_contribution, Decimal::ZERO);
        assert_eq!(result.employer_contribution, Decimal::ZERO);
        assert!(result.reason.as_deref().unwrap().contains("exceeds the ceiling"));
    }

    // ==========================================================================
    // ESI-002: opted-out employee is not applicable
    // ==========================================================================
    #[test]
    fn test_esi_002_opted_out_not_applicable() {
        let result =
            calculate_insurance_contribution(dec("15000"), true, &InsuranceConfig::default());

        assert!(!result.applicable);
        assert!(result.reason.as_deref().unwrap().contains("opted out"));
    }

    // ==========================================================================
    // ESI-003: both shares are flat percentages of gross, whole units
    // ==========================================================================
    #[test]
    fn test_esi_003_flat_percentages_of_gross() {
        let result =
            calculate_insurance_contribution(dec("20000"), false, &InsuranceConfig::default());

        assert!(result.applicable);
        assert!(result.reason.is_none());
        // 20,000 * 0.0075 = 150
        assert_eq!(result.employee_contribution, dec("150"));
        // 20,000 * 0.0325 = 650
        assert_eq!(result.employer_contribution, dec("650"));
    }

    // ==========================================================================
    // ESI-004: gross exactly at the ceiling still applies
    // ==========================================================================
    #[test]
    fn test_esi_004_gross_at_ceiling_applies() {
        let result =
            calculate_insurance_contribution(dec("21000"), false, &InsuranceConfig::default());

        assert!(result.applicable);
        // 21,000 * 0.0075 = 157.5 -> 158 (half-up)
        assert_eq!(result.employee_contribution, dec("158"));
    }

    // ==========================================================================
    // Ceiling-breach helper
    // ==========================================================================
    #[test]
    fn test_breach_when_crossing_upward() {
        let ceiling = dec("21000");
        assert!(check_ceiling_breach(dec("22000"), dec("20000"), ceiling));
        assert!(check_ceiling_breach(dec("21001"), dec("21000"), ceiling));
    }

    #[test]
    fn test_no_breach_when_already_above() {
        let ceiling = dec("21000");
        assert!(!check_ceiling_breach(dec("25000"), dec("22000"), ceiling));
    }

    #[test]
    fn test_no_breach_when_still_below() {
        let ceiling = dec("21000");
        assert!(!check_ceiling_breach(dec("20000"), dec("18000"), ceiling));
        assert!(!check_ceiling_breach(dec("21000"), dec("20000"), ceiling));
    }

    #[test]
    fn test_no_breach_when_unchanged() {
        let ceiling = dec("21000");
        assert!(!check_ceiling_breach(dec("20000"), dec("20000"), ceiling));
        assert!(!check_ceiling_breach(dec("22000"), dec("22000"), ceiling));
    }

    #[test]
    fn test_no_breach_when_falling_back_below() {
        let ceiling = dec("21000");
        assert!(!check_ceiling_breach(dec("20000"), dec("22000"), ceiling));
    }
}
