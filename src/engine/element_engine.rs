//! The top-level element calculation orchestrator.
//!
//! An engine instance holds only the immutable configuration snapshot for the
//! current run (registry, statutory tables, formula evaluator) and is shared
//! read-only across per-employee tasks. There is no other state: calculating
//! the same context against the same snapshot twice yields identical output.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{ElementRegistry, StatutoryConfig};
use crate::error::{EngineError, EngineResult};
use crate::formula::dependency::topological_sort;
use crate::formula::{round_half_up, FormulaEvaluator};
use crate::models::{
    CalculationContext, CalculationMethod, ConditionalBranch, ProrationMethod, RuleFormula,
    SalaryElement,
};

use super::rule_selector::select_rule;

/// Calculates element amounts for one employee-period at a time.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::engine::ElementCalculationEngine;
///
/// let (statutory, registry) = ConfigLoader::load("./config/default")
///     .unwrap()
///     .into_parts();
/// let engine = ElementCalculationEngine::new(registry, statutory);
/// ```
#[derive(Debug)]
pub struct ElementCalculationEngine {
    registry: ElementRegistry,
    statutory: StatutoryConfig,
    evaluator: FormulaEvaluator,
}

impl ElementCalculationEngine {
    /// Creates an engine over an immutable configuration snapshot.
    pub fn new(registry: ElementRegistry, statutory: StatutoryConfig) -> Self {
        Self {
            registry,
            statutory,
            evaluator: FormulaEvaluator::new(),
        }
    }

    /// Returns the statutory constant tables for this run.
    pub fn statutory(&self) -> &StatutoryConfig {
        &self.statutory
    }

    /// Returns the element registry for this run.
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Calculates one element's amount against the context.
    ///
    /// Fails with [`EngineError::ElementNotFound`] for an unknown code.
    /// Inactive elements calculate to zero. If a rule matches, it is
    /// dispatched by its formula variant; otherwise the element's basic
    /// calculation method applies. The result is clamped to the rule's
    /// min/max when present and rounded to 2 decimal places, half-up.
    pub fn calculate_element(
        &self,
        code: &str,
        context: &CalculationContext,
    ) -> EngineResult<Decimal> {
        let element = self
            .registry
            .element(code)
            .ok_or_else(|| EngineError::ElementNotFound {
                code: code.to_string(),
            })?;

        if !element.is_active {
            return Ok(Decimal::ZERO);
        }

        let amount = match select_rule(self.registry.rules_for(code), context) {
            Some(rule) => {
                let raw = self.apply_rule(&rule.formula, context)?;
                let clamped = clamp(raw, rule.min_amount, rule.max_amount);
                debug!(element = %code, rule_id = %rule.id, %raw, %clamped, "rule applied");
                clamped
            }
            None => self.fallback_amount(element, context)?,
        };

        Ok(round_half_up(amount, 2))
    }

    /// Calculates all assigned elements in dependency order.
    ///
    /// Each result is written back into the context before the next element
    /// is evaluated, so later elements can reference earlier results (e.g., a
    /// tax on `gross`, which sums the prior components).
    pub fn calculate_all_elements(
        &self,
        element_codes: &[String],
        context: &mut CalculationContext,
    ) -> EngineResult<BTreeMap<String, Decimal>> {
        for code in element_codes {
            if self.registry.element(code).is_none() {
                return Err(EngineError::ElementNotFound { code: code.clone() });
            }
        }

        let graph = self.registry.dependency_graph(element_codes);
        let order = topological_sort(&graph)?;

        let mut results = BTreeMap::new();
        for code in &order {
            let amount = self.calculate_element(code, context)?;
            context.salary_components.insert(code.clone(), amount);
            results.insert(code.clone(), amount);
        }
        Ok(results)
    }

    fn apply_rule(
        &self,
        formula: &RuleFormula,
        context: &CalculationContext,
    ) -> EngineResult<Decimal> {
        match formula {
            RuleFormula::StatutoryCalculation {
                base_field,
                rate,
                ceiling,
            } => {
                let mut base = self.resolve_numeric(base_field.as_deref().unwrap_or("basic"), context)?;
                if let Some(ceiling) = ceiling {
                    base = base.min(*ceiling);
                }
                Ok(base * rate)
            }
            RuleFormula::ConditionalFormula {
                condition,
                if_true,
                if_false,
            } => self.apply_conditional(condition, if_true, if_false, context),
            RuleFormula::TieredCalculation { base_field, slabs } => {
                let base = self.resolve_numeric(base_field.as_deref().unwrap_or("basic"), context)?;
                // First-match scan; the registry validated ordering at build
                // time, so no re-sorting happens here.
                for slab in slabs {
                    if slab.contains(base) {
                        return Ok(match (slab.rate, slab.amount) {
                            (Some(rate), _) => base * rate,
                            (None, Some(amount)) => amount,
                            (None, None) => Decimal::ZERO,
                        });
                    }
                }
                debug!(%base, "no slab matched; tiered amount is zero");
                Ok(Decimal::ZERO)
            }
            RuleFormula::AttendanceBased {
                base_field,
                proration,
            } => {
                let base = self.resolve_numeric(base_field.as_deref().unwrap_or("basic"), context)?;
                match proration {
                    ProrationMethod::DayBased => {
                        if context.period_days == 0 {
                            return Ok(Decimal::ZERO);
                        }
                        Ok(base / Decimal::from(context.period_days) * context.present_days)
                    }
                    ProrationMethod::None => Ok(base),
                }
            }
            RuleFormula::Custom { expression } => {
                let bindings = context.formula_bindings();
                self.evaluator.evaluate(expression, &bindings)
            }
        }
    }

    fn apply_conditional(
        &self,
        condition: &str,
        if_true: &ConditionalBranch,
        if_false: &ConditionalBranch,
        context: &CalculationContext,
    ) -> EngineResult<Decimal> {
        let bindings = context.formula_bindings();
        let condition_value = self.evaluator.evaluate(condition, &bindings)?;
        let branch = if condition_value.is_zero() {
            if_false
        } else {
            if_true
        };
        self.apply_branch(branch, context)
    }

    fn apply_branch(
        &self,
        branch: &ConditionalBranch,
        context: &CalculationContext,
    ) -> EngineResult<Decimal> {
        match branch {
            ConditionalBranch::Amount(amount) => Ok(*amount),
            ConditionalBranch::Formula(expression) => {
                let bindings = context.formula_bindings();
                self.evaluator.evaluate(expression, &bindings)
            }
            ConditionalBranch::Nested(nested) => {
                self.apply_conditional(&nested.condition, &nested.if_true, &nested.if_false, context)
            }
        }
    }

    /// Applies the element's basic calculation method when no rule matched.
    fn fallback_amount(
        &self,
        element: &SalaryElement,
        context: &CalculationContext,
    ) -> EngineResult<Decimal> {
        match element.calculation_method {
            CalculationMethod::Fixed => Ok(element.default_amount),
            CalculationMethod::Percentage => {
                // The registry guarantees both fields are present.
                let reference = element.percentage_of.as_deref().unwrap_or_default();
                let percentage = element.percentage.unwrap_or_default();
                let base = self.resolve_numeric(reference, context)?;
                Ok(base * percentage / Decimal::new(100, 0))
            }
            CalculationMethod::Prorated => {
                if context.period_days == 0 {
                    return Ok(Decimal::ZERO);
                }
                Ok(element.default_amount / Decimal::from(context.period_days)
                    * context.present_days)
            }
        }
    }

    fn resolve_numeric(&self, field: &str, context: &CalculationContext) -> EngineResult<Decimal> {
        context
            .resolve_field(field)
            .and_then(|value| value.as_number())
            .ok_or_else(|| EngineError::Formula {
                expression: field.to_string(),
                message: format!("field '{field}' is not available in the calculation context"),
            })
    }
}

fn clamp(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> Decimal {
    let mut result = value;
    if let Some(min) = min {
        result = result.max(min);
    }
    if let Some(max) = max {
        result = result.min(max);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ConditionOperator, ConditionValue, ElementType, FieldValue, PayrollElementRule,
        RuleCondition, RuleSlab,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn element(code: &str, element_type: ElementType) -> SalaryElement {
        SalaryElement {
            code: code.to_string(),
            name: code.to_uppercase(),
            element_type,
            category: "test".to_string(),
            calculation_method: CalculationMethod::Fixed,
            percentage_of: None,
            percentage: None,
            default_amount: Decimal::ZERO,
            is_statutory: false,
            is_recurring: true,
            is_taxable: true,
            jurisdiction: None,
            is_system_defined: false,
            is_active: true,
            display_order: 0,
        }
    }

    fn rule(id: &str, element_code: &str, formula: RuleFormula) -> PayrollElementRule {
        PayrollElementRule {
            id: id.to_string(),
            element_code: element_code.to_string(),
            formula,
            conditions: vec![],
            effective_from: NaiveDate::from_str("2024-04-01").unwrap(),
            effective_to: None,
            jurisdiction: None,
            sub_jurisdiction: None,
            priority: 0,
            is_active: true,
            min_amount: None,
            max_amount: None,
        }
    }

    fn context() -> CalculationContext {
        let mut ctx = CalculationContext {
            employee_id: "emp_001".to_string(),
            employee_fields: BTreeMap::new(),
            salary_components: BTreeMap::new(),
            jurisdiction: Some("IN-MH".to_string()),
            sub_jurisdiction: None,
            period_days: 30,
            present_days: dec("30"),
            calculation_date: NaiveDate::from_str("2025-06-15").unwrap(),
        };
        ctx.salary_components.insert("basic".to_string(), dec("20000"));
        ctx
    }

    fn engine(elements: Vec<SalaryElement>, rules: Vec<PayrollElementRule>) -> ElementCalculationEngine {
        let registry = ElementRegistry::new(elements, rules).unwrap();
        ElementCalculationEngine::new(registry, StatutoryConfig::default())
    }

    #[test]
    fn test_unknown_element_fails() {
        let engine = engine(vec![], vec![]);
        let err = engine.calculate_element("ghost", &context()).unwrap_err();
        match err {
            EngineError::ElementNotFound { code } => assert_eq!(code, "ghost"),
            other => panic!("expected ElementNotFound, got {other}"),
        }
    }

    #[test]
    fn test_inactive_element_is_zero() {
        let mut inactive = element("x", ElementType::Earning);
        inactive.default_amount = dec("5000");
        inactive.is_active = false;

        let engine = engine(vec![inactive], vec![]);
        assert_eq!(engine.calculate_element("x", &context()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_statutory_rule_applies_ceiling() {
        // wage 20,000, ceiling 15,000, rate 0.12 => 1,800
        let engine = engine(
            vec![element("pf_employee", ElementType::Contribution)],
            vec![rule(
                "pf_rule",
                "pf_employee",
                RuleFormula::StatutoryCalculation {
                    base_field: Some("basic".to_string()),
                    rate: dec("0.12"),
                    ceiling: Some(dec("15000")),
                },
            )],
        );

        let amount = engine.calculate_element("pf_employee", &context()).unwrap();
        assert_eq!(amount, dec("1800.00"));
    }

    #[test]
    fn test_statutory_rule_below_ceiling_uses_actual_wage() {
        let engine = engine(
            vec![element("pf_employee", ElementType::Contribution)],
            vec![rule(
                "pf_rule",
                "pf_employee",
                RuleFormula::StatutoryCalculation {
                    base_field: Some("basic".to_string()),
                    rate: dec("0.12"),
                    ceiling: Some(dec("15000")),
                },
            )],
        );

        let mut ctx = context();
        ctx.salary_components.insert("basic".to_string(), dec("10000"));
        assert_eq!(engine.calculate_element("pf_employee", &ctx).unwrap(), dec("1200.00"));
    }

    #[test]
    fn test_statutory_rule_defaults_base_field_to_basic() {
        let engine = engine(
            vec![element("pf_employee", ElementType::Contribution)],
            vec![rule(
                "pf_rule",
                "pf_employee",
                RuleFormula::StatutoryCalculation {
                    base_field: None,
                    rate: dec("0.10"),
                    ceiling: None,
                },
            )],
        );

        assert_eq!(
            engine.calculate_element("pf_employee", &context()).unwrap(),
            dec("2000.00")
        );
    }

    #[test]
    fn test_tiered_rule_first_match() {
        let slabs = vec![
            RuleSlab {
                min: dec("0"),
                max: Some(dec("7500")),
                rate: None,
                amount: Some(dec("0")),
            },
            RuleSlab {
                min: dec("7501"),
                max: Some(dec("10000")),
                rate: None,
                amount: Some(dec("175")),
            },
            RuleSlab {
                min: dec("10001"),
                max: None,
                rate: None,
                amount: Some(dec("200")),
            },
        ];
        let engine = engine(
            vec![
                element("basic", ElementType::Earning),
                element("pt", ElementType::Deduction),
            ],
            vec![rule(
                "pt_rule",
                "pt",
                RuleFormula::TieredCalculation {
                    base_field: Some("gross".to_string()),
                    slabs,
                },
            )],
        );

        // gross currently = basic = 20,000 -> last slab
        assert_eq!(engine.calculate_element("pt", &context()).unwrap(), dec("200.00"));

        let mut ctx = context();
        ctx.salary_components.insert("basic".to_string(), dec("8000"));
        assert_eq!(engine.calculate_element("pt", &ctx).unwrap(), dec("175.00"));

        ctx.salary_components.insert("basic".to_string(), dec("5000"));
        assert_eq!(engine.calculate_element("pt", &ctx).unwrap(), dec("0.00"));
    }

    #[test]
    fn test_tiered_rule_with_rate_slab() {
        let engine = engine(
            vec![element("levy", ElementType::Deduction)],
            vec![rule(
                "levy_rule",
                "levy",
                RuleFormula::TieredCalculation {
                    base_field: Some("basic".to_string()),
                    slabs: vec![RuleSlab {
                        min: dec("0"),
                        max: None,
                        rate: Some(dec("0.01")),
                        amount: None,
                    }],
                },
            )],
        );

        assert_eq!(engine.calculate_element("levy", &context()).unwrap(), dec("200.00"));
    }

    #[test]
    fn test_attendance_rule_day_based_proration() {
        let engine = engine(
            vec![element("conveyance", ElementType::Earning)],
            vec![rule(
                "conv_rule",
                "conveyance",
                RuleFormula::AttendanceBased {
                    base_field: Some("basic".to_string()),
                    proration: ProrationMethod::DayBased,
                },
            )],
        );

        let mut ctx = context();
        ctx.present_days = dec("15");
        // 20000 / 30 * 15 = 10000
        assert_eq!(
            engine.calculate_element("conveyance", &ctx).unwrap(),
            dec("10000.00")
        );
    }

    #[test]
    fn test_attendance_rule_without_proration_keeps_base() {
        let engine = engine(
            vec![element("allowance", ElementType::Earning)],
            vec![rule(
                "r1",
                "allowance",
                RuleFormula::AttendanceBased {
                    base_field: Some("basic".to_string()),
                    proration: ProrationMethod::None,
                },
            )],
        );

        let mut ctx = context();
        ctx.present_days = dec("10");
        assert_eq!(
            engine.calculate_element("allowance", &ctx).unwrap(),
            dec("20000.00")
        );
    }

    #[test]
    fn test_conditional_rule_with_nested_branch() {
        let engine = engine(
            vec![element("special_bonus", ElementType::Earning)],
            vec![rule(
                "r1",
                "special_bonus",
                RuleFormula::ConditionalFormula {
                    condition: "basic > 25000".to_string(),
                    if_true: ConditionalBranch::Formula("percentage(basic, 10)".to_string()),
                    if_false: ConditionalBranch::Nested(Box::new(
                        crate::models::ConditionalPayload {
                            condition: "basic > 15000".to_string(),
                            if_true: ConditionalBranch::Amount(dec("1000")),
                            if_false: ConditionalBranch::Amount(dec("500")),
                        },
                    )),
                },
            )],
        );

        // basic = 20,000 -> outer false, inner true
        assert_eq!(
            engine.calculate_element("special_bonus", &context()).unwrap(),
            dec("1000.00")
        );

        let mut ctx = context();
        ctx.salary_components.insert("basic".to_string(), dec("30000"));
        assert_eq!(engine.calculate_element("special_bonus", &ctx).unwrap(), dec("3000.00"));

        ctx.salary_components.insert("basic".to_string(), dec("12000"));
        assert_eq!(engine.calculate_element("special_bonus", &ctx).unwrap(), dec("500.00"));
    }

    #[test]
    fn test_custom_rule_binds_components() {
        let engine = engine(
            vec![element("x", ElementType::Earning)],
            vec![rule(
                "r1",
                "x",
                RuleFormula::Custom {
                    expression: "elements.basic * 0.05 + 100".to_string(),
                },
            )],
        );

        assert_eq!(engine.calculate_element("x", &context()).unwrap(), dec("1100.00"));
    }

    #[test]
    fn test_custom_rule_unknown_variable_is_an_error() {
        let engine = engine(
            vec![element("x", ElementType::Earning)],
            vec![rule(
                "r1",
                "x",
                RuleFormula::Custom {
                    expression: "elements.basic + unknown_thing".to_string(),
                },
            )],
        );

        assert!(engine.calculate_element("x", &context()).is_err());
    }

    #[test]
    fn test_min_max_clamps_applied() {
        let mut r = rule(
            "r1",
            "x",
            RuleFormula::Custom {
                expression: "elements.basic * 0.5".to_string(),
            },
        );
        r.min_amount = Some(dec("500"));
        r.max_amount = Some(dec("5000"));

        let engine = engine(vec![element("x", ElementType::Earning)], vec![r]);
        // raw 10,000 clamps to 5,000
        assert_eq!(engine.calculate_element("x", &context()).unwrap(), dec("5000.00"));
    }

    #[test]
    fn test_result_rounded_to_two_decimals_half_up() {
        let engine = engine(
            vec![element("x", ElementType::Earning)],
            vec![rule(
                "r1",
                "x",
                RuleFormula::Custom {
                    expression: "100.005".to_string(),
                },
            )],
        );

        assert_eq!(engine.calculate_element("x", &context()).unwrap(), dec("100.01"));
    }

    #[test]
    fn test_fallback_fixed() {
        let mut fixed = element("medical", ElementType::Earning);
        fixed.default_amount = dec("1250");

        let engine = engine(vec![fixed], vec![]);
        assert_eq!(engine.calculate_element("medical", &context()).unwrap(), dec("1250.00"));
    }

    #[test]
    fn test_fallback_percentage() {
        let mut hra = element("hra", ElementType::Earning);
        hra.calculation_method = CalculationMethod::Percentage;
        hra.percentage_of = Some("basic".to_string());
        hra.percentage = Some(dec("40"));

        let engine = engine(vec![element("basic", ElementType::Earning), hra], vec![]);
        assert_eq!(engine.calculate_element("hra", &context()).unwrap(), dec("8000.00"));
    }

    #[test]
    fn test_fallback_prorated() {
        let mut conveyance = element("conveyance", ElementType::Earning);
        conveyance.calculation_method = CalculationMethod::Prorated;
        conveyance.default_amount = dec("1600");

        let engine = engine(vec![conveyance], vec![]);
        let mut ctx = context();
        ctx.present_days = dec("15");
        assert_eq!(engine.calculate_element("conveyance", &ctx).unwrap(), dec("800.00"));
    }

    #[test]
    fn test_rule_with_failing_condition_falls_back() {
        let mut r = rule(
            "r1",
            "x",
            RuleFormula::Custom {
                expression: "9999".to_string(),
            },
        );
        r.conditions.push(RuleCondition {
            field: "employment_type".to_string(),
            operator: ConditionOperator::Eq,
            value: ConditionValue::Text("intern".to_string()),
        });

        let mut fixed = element("x", ElementType::Earning);
        fixed.default_amount = dec("100");

        let engine = engine(vec![fixed], vec![r]);
        assert_eq!(engine.calculate_element("x", &context()).unwrap(), dec("100.00"));
    }

    #[test]
    fn test_calculate_all_elements_in_dependency_order() {
        let basic = {
            let mut e = element("basic", ElementType::Earning);
            e.default_amount = dec("30000");
            e
        };
        let hra = {
            let mut e = element("hra", ElementType::Earning);
            e.calculation_method = CalculationMethod::Percentage;
            e.percentage_of = Some("basic".to_string());
            e.percentage = Some(dec("40"));
            e
        };
        let pt_rule = rule(
            "pt_rule",
            "pt",
            RuleFormula::TieredCalculation {
                base_field: Some("gross".to_string()),
                slabs: vec![
                    RuleSlab {
                        min: dec("0"),
                        max: Some(dec("10000")),
                        rate: None,
                        amount: Some(dec("0")),
                    },
                    RuleSlab {
                        min: dec("10001"),
                        max: None,
                        rate: None,
                        amount: Some(dec("200")),
                    },
                ],
            },
        );

        let engine = engine(
            vec![basic, hra, element("pt", ElementType::Deduction)],
            vec![pt_rule],
        );

        let mut ctx = context();
        ctx.salary_components.clear();

        let results = engine
            .calculate_all_elements(
                &["pt".to_string(), "hra".to_string(), "basic".to_string()],
                &mut ctx,
            )
            .unwrap();

        assert_eq!(results["basic"], dec("30000.00"));
        assert_eq!(results["hra"], dec("12000.00"));
        // pt sees gross = basic + hra = 42,000 -> 200
        assert_eq!(results["pt"], dec("200.00"));
        assert_eq!(ctx.salary_components["pt"], dec("200.00"));
    }

    #[test]
    fn test_calculate_all_elements_unknown_code_fails() {
        let engine = engine(vec![element("basic", ElementType::Earning)], vec![]);
        let mut ctx = context();
        let err = engine
            .calculate_all_elements(&["basic".to_string(), "ghost".to_string()], &mut ctx)
            .unwrap_err();
        assert!(matches!(err, EngineError::ElementNotFound { .. }));
    }

    #[test]
    fn test_determinism_same_input_same_output() {
        let mut fixed = element("basic", ElementType::Earning);
        fixed.default_amount = dec("30000");
        let engine = engine(vec![fixed], vec![]);

        let mut ctx_a = context();
        ctx_a.salary_components.clear();
        let mut ctx_b = ctx_a.clone();

        let first = engine
            .calculate_all_elements(&["basic".to_string()], &mut ctx_a)
            .unwrap();
        let second = engine
            .calculate_all_elements(&["basic".to_string()], &mut ctx_b)
            .unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_employee_field_usable_as_base() {
        let engine = engine(
            vec![element("ot", ElementType::Earning)],
            vec![rule(
                "r1",
                "ot",
                RuleFormula::Custom {
                    expression: "overtime_hours * 150".to_string(),
                },
            )],
        );

        let mut ctx = context();
        ctx.employee_fields.insert(
            "overtime_hours".to_string(),
            FieldValue::Number(dec("12.5")),
        );
        assert_eq!(engine.calculate_element("ot", &ctx).unwrap(), dec("1875.00"));
    }
}
