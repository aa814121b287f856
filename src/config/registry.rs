//! The immutable element/rule configuration snapshot for a run.
//!
//! An [`ElementRegistry`] is built once per batch run from element and rule
//! records, validates the configuration up front (malformed slab tables and
//! dangling references are rejected here, never silently "fixed" at
//! calculation time), and precomputes each element's dependency set so the
//! dependency graph is never re-derived per employee.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EngineError, EngineResult};
use crate::formula::FormulaEvaluator;
use crate::models::{
    CalculationMethod, ConditionalBranch, ElementType, PayrollElementRule, RuleFormula, RuleSlab,
    SalaryElement,
};

/// Immutable snapshot of elements and rules for one calculation run.
///
/// Concurrent configuration edits must not affect an in-flight run; callers
/// take a consistent read of their configuration store, build a registry from
/// it, and share the registry (behind an `Arc`) across per-employee tasks.
#[derive(Debug)]
pub struct ElementRegistry {
    elements: BTreeMap<String, SalaryElement>,
    /// Rules per element, sorted by priority descending then id.
    rules: BTreeMap<String, Vec<PayrollElementRule>>,
    /// Precomputed dependency set per element.
    dependencies: BTreeMap<String, Vec<String>>,
}

impl ElementRegistry {
    /// Builds and validates a registry from element and rule records.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::InvalidRuleConfiguration`] when:
    /// - two elements share a code, or a rule references an unknown element;
    /// - a percentage element lacks `percentage`/`percentage_of`, or its
    ///   `percentage_of` references an unknown element;
    /// - a tiered rule's slabs are not ascending and non-overlapping, a slab
    ///   carries both `rate` and `amount` (or neither), or an unbounded slab
    ///   is not last;
    /// - a custom or conditional rule carries an unparseable expression.
    pub fn new(
        elements: Vec<SalaryElement>,
        rules: Vec<PayrollElementRule>,
    ) -> EngineResult<Self> {
        let evaluator = FormulaEvaluator::new();

        let mut element_map: BTreeMap<String, SalaryElement> = BTreeMap::new();
        for element in elements {
            if element_map.contains_key(&element.code) {
                return Err(EngineError::InvalidRuleConfiguration {
                    element_code: element.code.clone(),
                    message: "duplicate element code".to_string(),
                });
            }
            validate_element(&element, &mut element_map)?;
        }
        for element in element_map.values() {
            if let Some(reference) = &element.percentage_of {
                if !element_map.contains_key(reference) {
                    return Err(EngineError::InvalidRuleConfiguration {
                        element_code: element.code.clone(),
                        message: format!("percentage_of references unknown element '{reference}'"),
                    });
                }
            }
        }

        let mut rule_map: BTreeMap<String, Vec<PayrollElementRule>> = BTreeMap::new();
        for rule in rules {
            if !element_map.contains_key(&rule.element_code) {
                return Err(EngineError::InvalidRuleConfiguration {
                    element_code: rule.element_code.clone(),
                    message: format!("rule '{}' references an unknown element", rule.id),
                });
            }
            validate_formula(&rule, &evaluator)?;
            rule_map.entry(rule.element_code.clone()).or_default().push(rule);
        }
        for rules in rule_map.values_mut() {
            rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        }

        let dependencies = build_dependencies(&element_map, &rule_map, &evaluator)?;

        Ok(Self {
            elements: element_map,
            rules: rule_map,
            dependencies,
        })
    }

    /// Looks up an element by code.
    pub fn element(&self, code: &str) -> Option<&SalaryElement> {
        self.elements.get(code)
    }

    /// Returns the rules for an element, highest priority first.
    pub fn rules_for(&self, code: &str) -> &[PayrollElementRule] {
        self.rules.get(code).map_or(&[], Vec::as_slice)
    }

    /// Returns all element codes in the registry, sorted.
    pub fn element_codes(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Returns the precomputed dependency graph restricted to `codes`.
    ///
    /// Dependencies on elements outside `codes` are retained; the resolver
    /// treats edges to absent nodes as external inputs.
    pub fn dependency_graph(&self, codes: &[String]) -> BTreeMap<String, Vec<String>> {
        codes
            .iter()
            .filter(|code| self.elements.contains_key(*code))
            .map(|code| {
                (
                    code.clone(),
                    self.dependencies.get(code).cloned().unwrap_or_default(),
                )
            })
            .collect()
    }
}

fn validate_element(
    element: &SalaryElement,
    element_map: &mut BTreeMap<String, SalaryElement>,
) -> EngineResult<()> {
    if element.calculation_method == CalculationMethod::Percentage {
        if element.percentage.is_none() || element.percentage_of.is_none() {
            return Err(EngineError::InvalidRuleConfiguration {
                element_code: element.code.clone(),
                message: "percentage elements require both 'percentage' and 'percentage_of'"
                    .to_string(),
            });
        }
    }
    element_map.insert(element.code.clone(), element.clone());
    Ok(())
}

fn validate_formula(rule: &PayrollElementRule, evaluator: &FormulaEvaluator) -> EngineResult<()> {
    match &rule.formula {
        RuleFormula::StatutoryCalculation { rate, .. } => {
            if rate.is_sign_negative() {
                return Err(invalid(rule, "statutory rate must not be negative"));
            }
        }
        RuleFormula::ConditionalFormula {
            condition,
            if_true,
            if_false,
        } => {
            validate_expression(rule, condition, evaluator)?;
            validate_branch(rule, if_true, evaluator)?;
            validate_branch(rule, if_false, evaluator)?;
        }
        RuleFormula::TieredCalculation { slabs, .. } => validate_slabs(rule, slabs)?,
        RuleFormula::AttendanceBased { .. } => {}
        RuleFormula::Custom { expression } => validate_expression(rule, expression, evaluator)?,
    }
    Ok(())
}

fn validate_branch(
    rule: &PayrollElementRule,
    branch: &ConditionalBranch,
    evaluator: &FormulaEvaluator,
) -> EngineResult<()> {
    match branch {
        ConditionalBranch::Amount(_) => Ok(()),
        ConditionalBranch::Formula(expression) => validate_expression(rule, expression, evaluator),
        ConditionalBranch::Nested(nested) => {
            validate_expression(rule, &nested.condition, evaluator)?;
            validate_branch(rule, &nested.if_true, evaluator)?;
            validate_branch(rule, &nested.if_false, evaluator)
        }
    }
}

fn validate_expression(
    rule: &PayrollElementRule,
    expression: &str,
    evaluator: &FormulaEvaluator,
) -> EngineResult<()> {
    let validation = evaluator.validate(expression);
    if !validation.valid {
        return Err(invalid(
            rule,
            &format!(
                "invalid expression '{expression}': {}",
                validation.error.unwrap_or_default()
            ),
        ));
    }
    Ok(())
}

fn validate_slabs(rule: &PayrollElementRule, slabs: &[RuleSlab]) -> EngineResult<()> {
    if slabs.is_empty() {
        return Err(invalid(rule, "tiered rule has no slabs"));
    }
    for (i, slab) in slabs.iter().enumerate() {
        match (slab.rate, slab.amount) {
            (Some(_), Some(_)) => {
                return Err(invalid(rule, "slab carries both 'rate' and 'amount'"));
            }
            (None, None) => {
                return Err(invalid(rule, "slab carries neither 'rate' nor 'amount'"));
            }
            _ => {}
        }
        if let Some(max) = slab.max {
            if max < slab.min {
                return Err(invalid(rule, &format!("slab {i} has max below min")));
            }
        } else if i + 1 != slabs.len() {
            return Err(invalid(rule, "unbounded slab must be the last slab"));
        }
        if i > 0 {
            let prev = &slabs[i - 1];
            match prev.max {
                Some(prev_max) if prev_max < slab.min => {}
                _ => {
                    return Err(invalid(
                        rule,
                        &format!("slabs must be ascending and non-overlapping at index {i}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn invalid(rule: &PayrollElementRule, message: &str) -> EngineError {
    EngineError::InvalidRuleConfiguration {
        element_code: rule.element_code.clone(),
        message: format!("rule '{}': {message}", rule.id),
    }
}

/// Computes each element's dependency set from its rules and fallback method.
///
/// Dependencies come from: `elements.*` variables in expressions, a
/// percentage element's `percentage_of`, and a rule `base_field` that names
/// another element. A reference to the synthetic `gross` value depends on all
/// earning elements, so that gross-based deductions evaluate after every
/// earning has been written into the context.
fn build_dependencies(
    elements: &BTreeMap<String, SalaryElement>,
    rules: &BTreeMap<String, Vec<PayrollElementRule>>,
    evaluator: &FormulaEvaluator,
) -> EngineResult<BTreeMap<String, Vec<String>>> {
    let earning_codes: Vec<String> = elements
        .values()
        .filter(|e| e.element_type == ElementType::Earning)
        .map(|e| e.code.clone())
        .collect();

    let mut graph = BTreeMap::new();
    for (code, element) in elements {
        let mut deps: BTreeSet<String> = BTreeSet::new();
        let mut references_gross = false;

        if let Some(percentage_of) = &element.percentage_of {
            deps.insert(percentage_of.clone());
        }

        for rule in rules.get(code).map_or(&[][..], Vec::as_slice) {
            if !rule.is_active {
                continue;
            }
            collect_rule_dependencies(rule, evaluator, &mut deps, &mut references_gross)?;
        }

        if references_gross {
            for earning in &earning_codes {
                if earning != code {
                    deps.insert(earning.clone());
                }
            }
        }
        deps.remove(code);
        graph.insert(code.clone(), deps.into_iter().collect());
    }
    Ok(graph)
}

fn collect_rule_dependencies(
    rule: &PayrollElementRule,
    evaluator: &FormulaEvaluator,
    deps: &mut BTreeSet<String>,
    references_gross: &mut bool,
) -> EngineResult<()> {
    match &rule.formula {
        RuleFormula::StatutoryCalculation { base_field, .. }
        | RuleFormula::TieredCalculation { base_field, .. }
        | RuleFormula::AttendanceBased { base_field, .. } => {
            if let Some(field) = base_field {
                if field == "gross" {
                    *references_gross = true;
                } else {
                    deps.insert(field.clone());
                }
            }
        }
        RuleFormula::ConditionalFormula {
            condition,
            if_true,
            if_false,
        } => {
            collect_expression_dependencies(condition, evaluator, deps, references_gross)?;
            collect_branch_dependencies(if_true, evaluator, deps, references_gross)?;
            collect_branch_dependencies(if_false, evaluator, deps, references_gross)?;
        }
        RuleFormula::Custom { expression } => {
            collect_expression_dependencies(expression, evaluator, deps, references_gross)?;
        }
    }
    Ok(())
}

fn collect_branch_dependencies(
    branch: &ConditionalBranch,
    evaluator: &FormulaEvaluator,
    deps: &mut BTreeSet<String>,
    references_gross: &mut bool,
) -> EngineResult<()> {
    match branch {
        ConditionalBranch::Amount(_) => Ok(()),
        ConditionalBranch::Formula(expression) => {
            collect_expression_dependencies(expression, evaluator, deps, references_gross)
        }
        ConditionalBranch::Nested(nested) => {
            collect_expression_dependencies(&nested.condition, evaluator, deps, references_gross)?;
            collect_branch_dependencies(&nested.if_true, evaluator, deps, references_gross)?;
            collect_branch_dependencies(&nested.if_false, evaluator, deps, references_gross)
        }
    }
}

fn collect_expression_dependencies(
    expression: &str,
    evaluator: &FormulaEvaluator,
    deps: &mut BTreeSet<String>,
    references_gross: &mut bool,
) -> EngineResult<()> {
    deps.extend(evaluator.extract_dependencies(expression)?);
    // A bare `gross` reference pins this element after all earnings.
    let parsed = crate::formula::parse_expression(expression).map_err(|message| {
        EngineError::Formula {
            expression: expression.to_string(),
            message,
        }
    })?;
    parsed.visit_variables(&mut |name| {
        if name == "gross" {
            *references_gross = true;
        }
    });
    Ok(())
}
