//! Payroll element rules: time-bounded, jurisdiction-scoped calculation
//! strategies attached to an element.
//!
//! The formula payload is a closed enum with one variant per rule type so that
//! dispatch is exhaustive pattern matching, so adding a new rule type without a
//! handler is a compile error, not a silent fall-through.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The comparison operator of a rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Field equals the value.
    Eq,
    /// Field does not equal the value.
    Ne,
    /// Field is strictly greater than the value.
    Gt,
    /// Field is greater than or equal to the value.
    Gte,
    /// Field is strictly less than the value.
    Lt,
    /// Field is less than or equal to the value.
    Lte,
    /// Field is a member of the value list.
    In,
    /// Field is not a member of the value list.
    NotIn,
}

/// The right-hand side of a rule condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// A numeric comparand.
    Number(Decimal),
    /// A boolean comparand.
    Flag(bool),
    /// A text comparand (employment type, grade, department).
    Text(String),
    /// A list comparand for `In`/`NotIn`.
    List(Vec<String>),
}

/// A single field/operator/value predicate on the calculation context.
///
/// Field names resolve against salary components first, then employee fields,
/// then the synthetic fields `basic` and `gross`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// The context field to test.
    pub field: String,
    /// The comparison operator.
    pub operator: ConditionOperator,
    /// The comparand.
    pub value: ConditionValue,
}

/// One tier of a tiered-calculation rule.
///
/// Exactly one of `rate` and `amount` must be set; the registry rejects slabs
/// with both or neither at configuration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSlab {
    /// Inclusive lower bound of the wage range.
    pub min: Decimal,
    /// Inclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Rate applied to the base value when this slab matches.
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Flat amount returned when this slab matches.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl RuleSlab {
    /// Returns true if `value` falls inside this slab's range.
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// How an attendance-based rule scales the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationMethod {
    /// Scale by `present_days / period_days`.
    DayBased,
    /// Pay the base value unchanged.
    None,
}

/// One branch of a conditional-formula rule.
///
/// A branch is either a flat amount, an expression, or a nested conditional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionalBranch {
    /// A flat amount.
    Amount(Decimal),
    /// An expression evaluated against the calculation context.
    Formula(String),
    /// A nested conditional.
    Nested(Box<ConditionalPayload>),
}

/// The payload of a conditional-formula rule, also usable as a nested branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalPayload {
    /// The condition expression; non-zero means true.
    pub condition: String,
    /// Branch taken when the condition is true.
    pub if_true: ConditionalBranch,
    /// Branch taken when the condition is false.
    pub if_false: ConditionalBranch,
}

/// The typed formula payload of a rule, one variant per rule type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum RuleFormula {
    /// A statutory base-times-rate calculation with an optional wage ceiling.
    StatutoryCalculation {
        /// Context field supplying the wage base; defaults to `basic`.
        #[serde(default)]
        base_field: Option<String>,
        /// The contribution or tax rate (e.g., 0.12 for 12%).
        rate: Decimal,
        /// Optional cap on the wage base.
        #[serde(default)]
        ceiling: Option<Decimal>,
    },
    /// An if/else formula; either branch may itself be a nested formula.
    ConditionalFormula {
        /// The condition expression; non-zero means true.
        condition: String,
        /// Branch taken when the condition is true.
        if_true: ConditionalBranch,
        /// Branch taken when the condition is false.
        if_false: ConditionalBranch,
    },
    /// A slab table scanned first-match against a base value.
    TieredCalculation {
        /// Context field supplying the base value; defaults to `basic`.
        #[serde(default)]
        base_field: Option<String>,
        /// Slabs, authored ascending and non-overlapping.
        slabs: Vec<RuleSlab>,
    },
    /// A base value prorated by attendance.
    AttendanceBased {
        /// Context field supplying the base value; defaults to `basic`.
        #[serde(default)]
        base_field: Option<String>,
        /// The proration method.
        proration: ProrationMethod,
    },
    /// A restricted expression evaluated with all computed components bound.
    Custom {
        /// The expression text.
        expression: String,
    },
}

/// A time-bounded, jurisdiction-scoped calculation strategy for one element.
///
/// At most one rule is *applied* per element per calculation, chosen
/// deterministically by the rule selector (highest priority among the
/// effective, matching candidates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollElementRule {
    /// Unique rule identifier.
    pub id: String,
    /// The element this rule belongs to.
    pub element_code: String,
    /// The typed formula payload.
    pub formula: RuleFormula,
    /// Conditions that must all hold for the rule to match.
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    /// Start of the effective window (inclusive).
    pub effective_from: NaiveDate,
    /// End of the effective window (exclusive); `None` means open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Jurisdiction scope; `None` matches any jurisdiction.
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Sub-jurisdiction scope; `None` matches any sub-jurisdiction.
    #[serde(default)]
    pub sub_jurisdiction: Option<String>,
    /// Tie-break when multiple rules match; higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Inactive rules are never considered.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Lower clamp applied to the computed amount.
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    /// Upper clamp applied to the computed amount.
    #[serde(default)]
    pub max_amount: Option<Decimal>,
}

fn default_true() -> bool {
    true
}

impl PayrollElementRule {
    /// Returns true if the rule is effective on `date`.
    ///
    /// The window is `[effective_from, effective_to)`; an absent
    /// `effective_to` means open-ended.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.map_or(true, |to| date < to)
    }
}
