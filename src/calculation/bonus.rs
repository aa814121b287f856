//! Profit-linked annual bonus calculation.
//!
//! Eligibility requires a minimum number of days worked and an average
//! monthly salary at or below the eligibility ceiling. The payable bonus is
//! computed on the annualized salary capped at the calculation ceiling,
//! clamped between the minimum band (or the flat minimum floor, whichever is
//! higher) and the maximum band, then prorated by days worked.

use rust_decimal::Decimal;

use crate::config::BonusConfig;
use crate::formula::round_half_up;

/// The inputs to a bonus calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusInput {
    /// Average monthly salary (basic plus dearness allowance) over the year.
    pub monthly_salary: Decimal,
    /// Days actually worked in the bonus year.
    pub days_worked: Decimal,
    /// Working days in the bonus year.
    pub total_working_days: Decimal,
    /// Employer's allocable-surplus factor scaling between the minimum and
    /// maximum rates; `None` pays at the minimum rate.
    pub profit_factor: Option<Decimal>,
}

/// The structured result of a bonus calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusResult {
    /// False when the employee is not eligible; see `reason`.
    pub eligible: bool,
    /// Why the employee is not eligible, when they aren't.
    pub reason: Option<String>,
    /// Annualized salary after the calculation ceiling.
    pub capped_annual_salary: Decimal,
    /// Lower bound of the bonus band.
    pub minimum_bonus: Decimal,
    /// Upper bound of the bonus band.
    pub maximum_bonus: Decimal,
    /// The bonus payable after clamping and proration.
    pub payable_bonus: Decimal,
}

impl BonusResult {
    fn not_eligible(reason: String) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
            capped_annual_salary: Decimal::ZERO,
            minimum_bonus: Decimal::ZERO,
            maximum_bonus: Decimal::ZERO,
            payable_bonus: Decimal::ZERO,
        }
    }
}

/// Calculates the annual bonus for one employee.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_bonus, BonusInput};
/// use payroll_engine::config::BonusConfig;
/// use rust_decimal::Decimal;
///
/// let result = calculate_bonus(
///     &BonusInput {
///         monthly_salary: Decimal::new(10_000, 0),
///         days_worked: Decimal::new(240, 0),
///         total_working_days: Decimal::new(240, 0),
///         profit_factor: None,
///     },
///     &BonusConfig::default(),
/// );
/// assert!(result.eligible);
/// // annualized 7,000 * 12 = 84,000 at the 8.33% minimum rate
/// assert_eq!(result.payable_bonus, Decimal::new(6_997, 0));
/// ```
pub fn calculate_bonus(input: &BonusInput, config: &BonusConfig) -> BonusResult {
    if input.days_worked < config.min_working_days {
        return BonusResult::not_eligible(format!(
            "{} days worked is below the required {}",
            input.days_worked, config.min_working_days
        ));
    }
    if input.monthly_salary > config.eligibility_ceiling {
        return BonusResult::not_eligible(format!(
            "monthly salary {} exceeds the eligibility ceiling {}",
            input.monthly_salary, config.eligibility_ceiling
        ));
    }

    let capped_annual_salary =
        input.monthly_salary.min(config.calculation_ceiling) * Decimal::new(12, 0);
    let minimum_bonus = (capped_annual_salary * config.min_rate).max(config.flat_minimum);
    let maximum_bonus = capped_annual_salary * config.max_rate;

    // The profit factor interpolates inside the band; out-of-range factors
    // clamp to the band edges.
    let target = match input.profit_factor {
        Some(factor) => {
            let span = maximum_bonus - minimum_bonus;
            minimum_bonus + span * factor.clamp(Decimal::ZERO, Decimal::ONE)
        }
        None => minimum_bonus,
    };
    let clamped = target.clamp(minimum_bonus, maximum_bonus.max(minimum_bonus));

    let prorated = if input.total_working_days.is_zero() {
        Decimal::ZERO
    } else {
        clamped * input.days_worked / input.total_working_days
    };

    BonusResult {
        eligible: true,
        reason: None,
        capped_annual_salary,
        minimum_bonus: round_half_up(minimum_bonus, 0),
        maximum_bonus: round_half_up(maximum_bonus, 0),
        payable_bonus: round_half_up(prorated, 0),
    }
}
