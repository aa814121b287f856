//! Regional slab tax calculation (professional-tax style).
//!
//! Each jurisdiction carries a table of non-overlapping wage slabs; the
//! monthly tax is the first slab whose range contains the gross wage. A slab
//! may carry a February-specific override tax, selected only when the invoked
//! month equals 2, the convention used by jurisdictions that collect a
//! year-end adjustment in February. The annual total is the sum of the 12
//! per-month evaluations, so the override is naturally included once.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::TaxSlab;

/// The structured result of a slab tax lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SlabTaxResult {
    /// False when the jurisdiction has no slab table; see `reason`.
    pub applicable: bool,
    /// Why no tax applies, when it doesn't.
    pub reason: Option<String>,
    /// The tax amount (monthly or annual depending on the call).
    pub tax: Decimal,
}

impl SlabTaxResult {
    fn not_applicable(reason: String) -> Self {
        Self {
            applicable: false,
            reason: Some(reason),
            tax: Decimal::ZERO,
        }
    }
}

/// Looks up the monthly slab tax for a gross wage in a jurisdiction.
///
/// `month` is the calendar month (1-12) of the period being calculated; only
/// February selects a slab's override tax, and only for slabs carrying one.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::monthly_slab_tax;
/// use payroll_engine::config::TaxSlab;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let mut tables = BTreeMap::new();
/// tables.insert("IN-MH".to_string(), vec![
///     TaxSlab { min: Decimal::ZERO, max: Some(Decimal::new(7_500, 0)),
///               tax: Decimal::ZERO, february_tax: None },
///     TaxSlab { min: Decimal::new(7_501, 0), max: Some(Decimal::new(10_000, 0)),
///               tax: Decimal::new(175, 0), february_tax: None },
///     TaxSlab { min: Decimal::new(10_001, 0), max: None,
///               tax: Decimal::new(200, 0), february_tax: Some(Decimal::new(300, 0)) },
/// ]);
///
/// let february = monthly_slab_tax(&tables, "IN-MH", Decimal::new(12_000, 0), 2);
/// assert_eq!(february.tax, Decimal::new(300, 0));
///
/// let may = monthly_slab_tax(&tables, "IN-MH", Decimal::new(12_000, 0), 5);
/// assert_eq!(may.tax, Decimal::new(200, 0));
/// ```
pub fn monthly_slab_tax(
    tables: &BTreeMap<String, Vec<TaxSlab>>,
    jurisdiction: &str,
    gross: Decimal,
    month: u32,
) -> SlabTaxResult {
    let Some(slabs) = tables.get(jurisdiction) else {
        return SlabTaxResult::not_applicable(format!(
            "no slab table configured for jurisdiction '{jurisdiction}'"
        ));
    };

    for slab in slabs {
        if slab.contains(gross) {
            let tax = match (month, slab.february_tax) {
                (2, Some(february_tax)) => february_tax,
                _ => slab.tax,
            };
            return SlabTaxResult {
                applicable: true,
                reason: None,
                tax,
            };
        }
    }

    SlabTaxResult::not_applicable(format!(
        "gross wage {gross} falls outside every configured slab for '{jurisdiction}'"
    ))
}

/// Sums the 12 per-month evaluations for a constant gross wage.
///
/// The February override, where configured, is included exactly once.
pub fn annual_slab_tax(
    tables: &BTreeMap<String, Vec<TaxSlab>>,
    jurisdiction: &str,
    gross: Decimal,
) -> SlabTaxResult {
    let mut total = Decimal::ZERO;
    for month in 1..=12 {
        let monthly = monthly_slab_tax(tables, jurisdiction, gross, month);
        if !monthly.applicable {
            return monthly;
        }
        total += monthly.tax;
    }
    SlabTaxResult {
        applicable: true,
        reason: None,
        tax: total,
    }
}
