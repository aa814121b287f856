//! Rule selection for one element in one calculation context.
//!
//! Filtering, in order: inactive rules, effective-date window, jurisdiction
//! and sub-jurisdiction scope, then the conditions predicate. Of the
//! remaining candidates, the highest-priority rule wins (ties broken by rule
//! id, so selection is deterministic).

use tracing::debug;

use crate::models::{
    CalculationContext, ConditionOperator, ConditionValue, FieldValue, PayrollElementRule,
    RuleCondition,
};

/// Selects the rule to apply for an element, or `None` when no rule matches.
///
/// `rules` is expected highest-priority-first (the registry stores it that
/// way); the first rule surviving all filters is selected. `None` signals the
/// caller to fall back to the element's basic calculation method.
pub fn select_rule<'a>(
    rules: &'a [PayrollElementRule],
    context: &CalculationContext,
) -> Option<&'a PayrollElementRule> {
    let selected = rules.iter().find(|rule| {
        rule.is_active
            && rule.is_effective_on(context.calculation_date)
            && jurisdiction_matches(rule, context)
            && rule
                .conditions
                .iter()
                .all(|condition| condition_holds(condition, context))
    });

    if let Some(rule) = selected {
        debug!(rule_id = %rule.id, element = %rule.element_code, "rule selected");
    }
    selected
}

fn jurisdiction_matches(rule: &PayrollElementRule, context: &CalculationContext) -> bool {
    if let Some(jurisdiction) = &rule.jurisdiction {
        if context.jurisdiction.as_ref() != Some(jurisdiction) {
            return false;
        }
    }
    if let Some(sub) = &rule.sub_jurisdiction {
        if context.sub_jurisdiction.as_ref() != Some(sub) {
            return false;
        }
    }
    true
}

/// Evaluates one condition against the context.
///
/// A field that cannot be resolved makes the condition false; the rule
/// simply does not match, and the element falls back to its basic method.
fn condition_holds(condition: &RuleCondition, context: &CalculationContext) -> bool {
    let Some(field) = context.resolve_field(&condition.field) else {
        return false;
    };

    match (&condition.value, &field) {
        (ConditionValue::Number(expected), _) => match field.as_number() {
            Some(actual) => compare(condition.operator, actual.cmp(expected)),
            None => false,
        },
        (ConditionValue::Flag(expected), FieldValue::Flag(actual)) => match condition.operator {
            ConditionOperator::Eq => actual == expected,
            ConditionOperator::Ne => actual != expected,
            _ => false,
        },
        (ConditionValue::Text(expected), FieldValue::Text(actual)) => match condition.operator {
            ConditionOperator::Eq => actual == expected,
            ConditionOperator::Ne => actual != expected,
            _ => false,
        },
        (ConditionValue::List(values), FieldValue::Text(actual)) => match condition.operator {
            ConditionOperator::In => values.iter().any(|v| v == actual),
            ConditionOperator::NotIn => values.iter().all(|v| v != actual),
            _ => false,
        },
        _ => false,
    }
}

fn compare(operator: ConditionOperator, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match operator {
        ConditionOperator::Eq => ordering == Equal,
        ConditionOperator::Ne => ordering != Equal,
        ConditionOperator::Gt => ordering == Greater,
        ConditionOperator::Gte => ordering != Less,
        ConditionOperator::Lt => ordering == Less,
        ConditionOperator::Lte => ordering != Greater,
        ConditionOperator::In | ConditionOperator::NotIn => false,
    }
}
