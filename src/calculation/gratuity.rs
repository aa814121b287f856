//! Service-based termination benefit calculation (gratuity style).
//!
//! The service period between joining and leaving is computed calendar-wise
//! with borrow adjustment, so "2020-01-15 to 2024-10-10" reads as 4 years,
//! 8 months, 25 days rather than a raw day count. Eligibility requires either
//! the configured minimum service months or a qualifying exit reason; the
//! benefit itself is days-per-year of the last drawn salary over the working
//! days per month, with the final partial year rounded up when it reaches six
//! months, capped at the statutory maximum.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::GratuityConfig;
use crate::formula::round_half_up;

/// A calendar-wise service period with borrow adjustment applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePeriod {
    /// Completed years of service.
    pub years: u32,
    /// Months beyond the completed years (0-11).
    pub months: u32,
    /// Days beyond the completed months.
    pub days: u32,
}

impl ServicePeriod {
    /// Total service expressed in whole months (days are dropped).
    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }
}

/// The inputs to a gratuity calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct GratuityInput {
    /// Date the employee joined.
    pub date_of_joining: NaiveDate,
    /// Date the employee left.
    pub date_of_leaving: NaiveDate,
    /// Last drawn monthly salary (basic plus dearness allowance).
    pub last_drawn_salary: Decimal,
    /// The exit reason code (e.g., "resignation", "death", "disability").
    pub exit_reason: String,
    /// Gratuity actually received, when known. Drives the exemption split;
    /// `None` treats the computed benefit as the amount received.
    pub gratuity_received: Option<Decimal>,
}

/// The structured result of a gratuity calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct GratuityResult {
    /// False when the employee is not eligible; see `reason`.
    pub eligible: bool,
    /// Why the employee is not eligible, when they aren't.
    pub reason: Option<String>,
    /// The borrow-adjusted service period.
    pub service: ServicePeriod,
    /// Benefit years after rounding the final partial year.
    pub service_years: u32,
    /// The computed benefit, capped at the statutory maximum.
    pub gratuity_amount: Decimal,
    /// The exempt portion of the amount received.
    pub exempt_amount: Decimal,
    /// The taxable portion of the amount received.
    pub taxable_amount: Decimal,
}

/// Computes the calendar service period between two dates.
///
/// Day and month differences borrow from the next-larger unit, the way a
/// person counts tenure: if the leaving day-of-month precedes the joining
/// day-of-month, a month is borrowed and its actual day count is credited.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::service_period;
/// use chrono::NaiveDate;
///
/// let period = service_period(
///     NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 10, 10).unwrap(),
/// );
/// assert_eq!((period.years, period.months, period.days), (4, 8, 25));
/// ```
pub fn service_period(date_of_joining: NaiveDate, date_of_leaving: NaiveDate) -> ServicePeriod {
    if date_of_leaving <= date_of_joining {
        return ServicePeriod {
            years: 0,
            months: 0,
            days: 0,
        };
    }

    let mut years = date_of_leaving.year() - date_of_joining.year();
    let mut months = date_of_leaving.month() as i32 - date_of_joining.month() as i32;
    let mut days = date_of_leaving.day() as i32 - date_of_joining.day() as i32;

    if days < 0 {
        months -= 1;
        let (prev_year, prev_month) = if date_of_leaving.month() == 1 {
            (date_of_leaving.year() - 1, 12)
        } else {
            (date_of_leaving.year(), date_of_leaving.month() - 1)
        };
        days += days_in_month(prev_year, prev_month);
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    ServicePeriod {
        years: years as u32,
        months: months as u32,
        days: days as u32,
    }
}

fn days_in_month(year: i32, month: u32) -> i32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).unwrap())
        .num_days() as i32
}

/// Calculates the termination benefit and its exemption split.
///
/// Eligibility: total service months at or above `required_months`, waived
/// when the exit reason is one of the configured qualifying reasons. The
/// benefit is `last_drawn * days_per_year * service_years /
/// working_days_per_month`, where `service_years` rounds the final partial
/// year up once it reaches six months, capped at the statutory maximum and
/// rounded to whole units.
pub fn calculate_gratuity(input: &GratuityInput, config: &GratuityConfig) -> GratuityResult {
    let service = service_period(input.date_of_joining, input.date_of_leaving);

    let reason_qualifies = config
        .qualifying_reasons
        .iter()
        .any(|reason| reason.eq_ignore_ascii_case(&input.exit_reason));

    if !reason_qualifies && service.total_months() < config.required_months {
        return GratuityResult {
            eligible: false,
            reason: Some(format!(
                "service of {} months is below the required {} months",
                service.total_months(),
                config.required_months
            )),
            service,
            service_years: 0,
            gratuity_amount: Decimal::ZERO,
            exempt_amount: Decimal::ZERO,
            taxable_amount: Decimal::ZERO,
        };
    }

    // The final partial year counts as a full year once it reaches 6 months.
    let service_years = if service.months >= 6 {
        service.years + 1
    } else {
        service.years
    };

    let raw = input.last_drawn_salary * config.days_per_year * Decimal::from(service_years)
        / config.working_days_per_month;
    let gratuity_amount = round_half_up(raw, 0).min(config.statutory_cap);

    let received = input.gratuity_received.unwrap_or(gratuity_amount);
    let exempt_amount = received.min(gratuity_amount).min(config.statutory_cap);
    let taxable_amount = (received - exempt_amount).max(Decimal::ZERO);

    GratuityResult {
        eligible: true,
        reason: None,
        service,
        service_years,
        gratuity_amount,
        exempt_amount,
        taxable_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn input(joining: &str, leaving: &str, salary: &str, reason: &str) -> GratuityInput {
        GratuityInput {
            date_of_joining: d(joining),
            date_of_leaving: d(leaving),
            last_drawn_salary: dec(salary),
            exit_reason: reason.to_string(),
            gratuity_received: None,
        }
    }

    // ==========================================================================
    // Service period borrow adjustment
    // ==========================================================================
    #[test]
    fn test_service_period_exact_years() {
        let period = service_period(d("2020-06-01"), d("2025-06-01"));
        assert_eq!((period.years, period.months, period.days), (5, 0, 0));
    }

    #[test]
    fn test_service_period_borrows_days_from_previous_month() {
        // Leaving day 10 precedes joining day 15: borrow September's 30 days
        let period = service_period(d("2020-01-15"), d("2024-10-10"));
        assert_eq!((period.years, period.months, period.days), (4, 8, 25));
    }

    #[test]
    fn test_service_period_borrows_months_into_years() {
        let period = service_period(d("2020-10-01"), d("2024-03-01"));
        assert_eq!((period.years, period.months, period.days), (3, 5, 0));
    }

    #[test]
    fn test_service_period_double_borrow() {
        // Day borrow drops January to December of the previous year
        let period = service_period(d("2020-03-20"), d("2024-01-10"));
        assert_eq!((period.years, period.months, period.days), (3, 9, 21));
    }

    #[test]
    fn test_service_period_leaving_before_joining_is_zero() {
        let period = service_period(d("2024-01-01"), d("2020-01-01"));
        assert_eq!(period.total_months(), 0);
    }

    // ==========================================================================
    // GR-001: eligibility at the 56-month gate (scenario: 4y7m vs 4y9m)
    // ==========================================================================
    #[test]
    fn test_gr_001_four_years_seven_months_ineligible() {
        let result = calculate_gratuity(
            &input("2020-01-01", "2024-08-01", "40000", "resignation"),
            &GratuityConfig::default(),
        );

        assert!(!result.eligible);
        assert_eq!(result.service.total_months(), 55);
        assert_eq!(result.gratuity_amount, Decimal::ZERO);
        assert!(result.reason.as_deref().unwrap().contains("55 months"));
    }

    #[test]
    fn test_gr_001_four_years_nine_months_eligible() {
        let result = calculate_gratuity(
            &input("2020-01-01", "2024-10-01", "40000", "resignation"),
            &GratuityConfig::default(),
        );

        assert!(result.eligible);
        assert_eq!(result.service.total_months(), 57);
        // 9 months rounds the final partial year up to 5 benefit years
        assert_eq!(result.service_years, 5);
        // 40,000 * 15 * 5 / 26 = 115,384.6153... -> 115,385
        assert_eq!(result.gratuity_amount, dec("115385"));
    }

    // ==========================================================================
    // GR-002: qualifying exit reasons waive the tenure gate
    // ==========================================================================
    #[test]
    fn test_gr_002_qualifying_reason_waives_tenure() {
        let result = calculate_gratuity(
            &input("2023-01-01", "2024-01-01", "30000", "death"),
            &GratuityConfig::default(),
        );

        assert!(result.eligible);
        assert_eq!(result.service_years, 1);
        // 30,000 * 15 * 1 / 26 = 17,307.69... -> 17,308
        assert_eq!(result.gratuity_amount, dec("17308"));
    }

    #[test]
    fn test_gr_002_reason_match_is_case_insensitive() {
        let result = calculate_gratuity(
            &input("2023-01-01", "2024-01-01", "30000", "Disability"),
            &GratuityConfig::default(),
        );
        assert!(result.eligible);
    }

    // ==========================================================================
    // GR-003: final partial year below six months does not round up
    // ==========================================================================
    #[test]
    fn test_gr_003_partial_year_under_six_months_kept_down() {
        let result = calculate_gratuity(
            &input("2019-01-01", "2024-05-01", "40000", "resignation"),
            &GratuityConfig::default(),
        );

        assert!(result.eligible);
        assert_eq!((result.service.years, result.service.months), (5, 4));
        assert_eq!(result.service_years, 5);
    }

    #[test]
    fn test_gr_003_partial_year_at_six_months_rounds_up() {
        let result = calculate_gratuity(
            &input("2019-01-01", "2024-07-01", "40000", "resignation"),
            &GratuityConfig::default(),
        );

        assert_eq!((result.service.years, result.service.months), (5, 6));
        assert_eq!(result.service_years, 6);
    }

    // ==========================================================================
    // GR-004: statutory cap
    // ==========================================================================
    #[test]
    fn test_gr_004_benefit_capped_at_statutory_maximum() {
        let result = calculate_gratuity(
            &input("1990-01-01", "2025-01-01", "200000", "retirement"),
            &GratuityConfig::default(),
        );

        // 200,000 * 15 * 35 / 26 = 4,038,461.5... well above the cap
        assert_eq!(result.gratuity_amount, dec("2000000"));
        assert_eq!(result.exempt_amount, dec("2000000"));
    }

    // ==========================================================================
    // GR-005: exemption split against the amount actually received
    // ==========================================================================
    #[test]
    fn test_gr_005_received_above_computed_benefit_is_taxable() {
        let mut input = input("2019-01-01", "2025-01-01", "40000", "resignation");
        // 40,000 * 15 * 6 / 26 = 138,461.5... -> 138,462 computed
        input.gratuity_received = Some(dec("200000"));

        let result = calculate_gratuity(&input, &GratuityConfig::default());

        assert_eq!(result.gratuity_amount, dec("138462"));
        assert_eq!(result.exempt_amount, dec("138462"));
        assert_eq!(result.taxable_amount, dec("61538"));
    }

    #[test]
    fn test_gr_005_received_below_computed_benefit_fully_exempt() {
        let mut input = input("2019-01-01", "2025-01-01", "40000", "resignation");
        input.gratuity_received = Some(dec("100000"));

        let result = calculate_gratuity(&input, &GratuityConfig::default());

        assert_eq!(result.exempt_amount, dec("100000"));
        assert_eq!(result.taxable_amount, Decimal::ZERO);
    }

    #[test]
    fn test_no_received_amount_means_nothing_taxable() {
        let result = calculate_gratuity(
            &input("2019-01-01", "2025-01-01", "40000", "resignation"),
            &GratuityConfig::default(),
        );
        assert_eq!(result.taxable_amount, Decimal::ZERO);
    }
}
