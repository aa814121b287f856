//! The per-employee, per-period calculation context.
//!
//! A context is assembled fresh for every calculation from employee static
//! data, an attendance summary, and a calculation date. It carries the running
//! map of already-computed salary components so later elements can reference
//! earlier results. It is never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed employee field value usable in rule conditions and formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A numeric field (salary, age, tenure months).
    Number(Decimal),
    /// A boolean field (is_esi_opted_out, is_metro).
    Flag(bool),
    /// A text field (employment_type, grade, department).
    Text(String),
    /// A date field (date_of_joining).
    Date(NaiveDate),
}

impl FieldValue {
    /// Returns the numeric value of this field, if it has one.
    ///
    /// Flags coerce to 1/0 so they can participate in formulas.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Flag(true) => Some(Decimal::ONE),
            FieldValue::Flag(false) => Some(Decimal::ZERO),
            FieldValue::Text(_) | FieldValue::Date(_) => None,
        }
    }
}

/// Ephemeral per-employee-per-period calculation state.
///
/// `salary_components` uses a [`BTreeMap`] so that iteration, and therefore
/// any serialized output, is deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationContext {
    /// The employee being calculated.
    pub employee_id: String,
    /// Employee static fields (employment type, grade, opt-out flags, dates).
    #[serde(default)]
    pub employee_fields: BTreeMap<String, FieldValue>,
    /// Running map of element code to computed amount.
    #[serde(default)]
    pub salary_components: BTreeMap<String, Decimal>,
    /// Jurisdiction code (e.g., a state code); `None` if not scoped.
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Sub-jurisdiction code; `None` if not scoped.
    #[serde(default)]
    pub sub_jurisdiction: Option<String>,
    /// Total days in the pay period.
    pub period_days: u32,
    /// Paid days in the period (may be fractional for half days).
    pub present_days: Decimal,
    /// The date rules are selected against.
    pub calculation_date: NaiveDate,
}

impl CalculationContext {
    /// Resolves a field name against the context.
    ///
    /// Resolution order: salary components, then employee fields, then the
    /// synthetic fields `basic` (the computed basic component) and `gross`
    /// (the sum of all currently computed salary components).
    pub fn resolve_field(&self, field: &str) -> Option<FieldValue> {
        if let Some(amount) = self.salary_components.get(field) {
            return Some(FieldValue::Number(*amount));
        }
        if let Some(value) = self.employee_fields.get(field) {
            return Some(value.clone());
        }
        match field {
            "basic" => self
                .salary_components
                .get("basic")
                .copied()
                .map(FieldValue::Number),
            "gross" => Some(FieldValue::Number(self.gross())),
            _ => None,
        }
    }

    /// Returns the sum of all currently computed salary components.
    pub fn gross(&self) -> Decimal {
        self.salary_components.values().copied().sum()
    }

    /// Returns the variable bindings visible to formula evaluation.
    ///
    /// Salary components are bound both bare (`basic`) and under the
    /// `elements.` namespace (`elements.basic`); numeric employee fields are
    /// bound bare; `gross`, `period_days` and `present_days` are synthetic.
    pub fn formula_bindings(&self) -> BTreeMap<String, Decimal> {
        let mut bindings = BTreeMap::new();
        for (field, value) in &self.employee_fields {
            if let Some(number) = value.as_number() {
                bindings.insert(field.clone(), number);
            }
        }
        for (code, amount) in &self.salary_components {
            bindings.insert(code.clone(), *amount);
            bindings.insert(format!("elements.{code}"), *amount);
        }
        bindings.insert("gross".to_string(), self.gross());
        bindings.insert("period_days".to_string(), Decimal::from(self.period_days));
        bindings.insert("present_days".to_string(), self.present_days);
        bindings
    }
}
