//! Formula evaluation against a variable map.
//!
//! The evaluator parses each expression once and caches the AST keyed by the
//! expression text, so a batch run never re-parses the same configured formula
//! per employee. Evaluation itself is a pure walk over the AST.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::error::{EngineError, EngineResult};

use super::ast::{BinaryOp, Expr};
use super::parser::parse_expression;

/// Rounds a value half-up (midpoint away from zero) to `decimals` places.
///
/// # Examples
///
/// ```
/// use payroll_engine::formula::round_half_up;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("2.345").unwrap();
/// assert_eq!(round_half_up(value, 2), Decimal::from_str("2.35").unwrap());
/// assert_eq!(round_half_up(Decimal::from_str("2.5").unwrap(), 0), Decimal::from_str("3").unwrap());
/// ```
pub fn round_half_up(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// The outcome of a parse-only validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// True if the expression parsed successfully.
    pub valid: bool,
    /// The parse error message, when invalid.
    pub error: Option<String>,
}

/// Parses, caches, and evaluates restricted formula expressions.
///
/// # Example
///
/// ```
/// use payroll_engine::formula::FormulaEvaluator;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let evaluator = FormulaEvaluator::new();
/// let mut vars = BTreeMap::new();
/// vars.insert("basic".to_string(), Decimal::new(20_000, 0));
///
/// let result = evaluator.evaluate("percentage(basic, 12)", &vars).unwrap();
/// assert_eq!(result, Decimal::new(2_400, 0));
/// ```
#[derive(Debug, Default)]
pub struct FormulaEvaluator {
    cache: RwLock<HashMap<String, Arc<Expr>>>,
}

impl FormulaEvaluator {
    /// Creates an evaluator with an empty parse cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `expression`, consulting and filling the cache.
    fn parse_cached(&self, expression: &str) -> EngineResult<Arc<Expr>> {
        if let Ok(cache) = self.cache.read() {
            if let Some(parsed) = cache.get(expression) {
                return Ok(Arc::clone(parsed));
            }
        }

        let parsed = Arc::new(parse_expression(expression).map_err(|message| {
            EngineError::Formula {
                expression: expression.to_string(),
                message,
            }
        })?);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(expression.to_string(), Arc::clone(&parsed));
        }
        Ok(parsed)
    }

    /// Evaluates `expression` against the given variable bindings.
    ///
    /// Fails with [`EngineError::Formula`] if the expression is syntactically
    /// invalid, references an unknown variable or function, or does not
    /// evaluate to a finite result (division or remainder by zero, overflow).
    pub fn evaluate(
        &self,
        expression: &str,
        vars: &BTreeMap<String, Decimal>,
    ) -> EngineResult<Decimal> {
        let parsed = self.parse_cached(expression)?;
        eval(&parsed, vars).map_err(|message| EngineError::Formula {
            expression: expression.to_string(),
            message,
        })
    }

    /// Performs a parse-only check, for configuration-time feedback.
    pub fn validate(&self, expression: &str) -> Validation {
        match self.parse_cached(expression) {
            Ok(_) => Validation {
                valid: true,
                error: None,
            },
            Err(EngineError::Formula { message, .. }) => Validation {
                valid: false,
                error: Some(message),
            },
            Err(other) => Validation {
                valid: false,
                error: Some(other.to_string()),
            },
        }
    }

    /// Returns the element codes `expression` depends on.
    ///
    /// Only variables under the `elements.` namespace count as dependencies;
    /// the prefix is stripped from the returned names.
    pub fn extract_dependencies(&self, expression: &str) -> EngineResult<BTreeSet<String>> {
        let parsed = self.parse_cached(expression)?;
        let mut deps = BTreeSet::new();
        parsed.visit_variables(&mut |name| {
            if let Some(code) = name.strip_prefix("elements.") {
                deps.insert(code.to_string());
            }
        });
        Ok(deps)
    }
}

fn is_true(value: Decimal) -> bool {
    !value.is_zero()
}

fn from_bool(value: bool) -> Decimal {
    if value {
        Decimal::ONE
    } else {
        Decimal::ZERO
    }
}

fn eval(expr: &Expr, vars: &BTreeMap<String, Decimal>) -> Result<Decimal, String> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Variable(name) => vars
            .get(name)
            .copied()
            .ok_or_else(|| format!("unknown variable '{name}'")),
        Expr::Neg(inner) => {
            let value = eval(inner, vars)?;
            Ok(-value)
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = eval(lhs, vars)?;
            let right = eval(rhs, vars)?;
            match op {
                BinaryOp::Add => left.checked_add(right).ok_or_else(overflow),
                BinaryOp::Sub => left.checked_sub(right).ok_or_else(overflow),
                BinaryOp::Mul => left.checked_mul(right).ok_or_else(overflow),
                BinaryOp::Div => {
                    if right.is_zero() {
                        Err("division by zero".to_string())
                    } else {
                        left.checked_div(right).ok_or_else(overflow)
                    }
                }
                BinaryOp::Rem => {
                    if right.is_zero() {
                        Err("remainder by zero".to_string())
                    } else {
                        left.checked_rem(right).ok_or_else(overflow)
                    }
                }
                BinaryOp::Eq => Ok(from_bool(left == right)),
                BinaryOp::Ne => Ok(from_bool(left != right)),
                BinaryOp::Lt => Ok(from_bool(left < right)),
                BinaryOp::Lte => Ok(from_bool(left <= right)),
                BinaryOp::Gt => Ok(from_bool(left > right)),
                BinaryOp::Gte => Ok(from_bool(left >= right)),
                BinaryOp::And => Ok(from_bool(is_true(left) && is_true(right))),
                BinaryOp::Or => Ok(from_bool(is_true(left) || is_true(right))),
            }
        }
        Expr::Call { name, args } => eval_call(name, args, vars),
    }
}

fn overflow() -> String {
    "arithmetic overflow".to_string()
}

fn eval_call(name: &str, args: &[Expr], vars: &BTreeMap<String, Decimal>) -> Result<Decimal, String> {
    match name {
        "min" => {
            let values = eval_args(name, args, 2, vars)?;
            Ok(values[0].min(values[1]))
        }
        "max" => {
            let values = eval_args(name, args, 2, vars)?;
            Ok(values[0].max(values[1]))
        }
        "round" => {
            let values = eval_args(name, args, 2, vars)?;
            let decimals = decimals_arg(values[1])?;
            Ok(round_half_up(values[0], decimals))
        }
        "floor" => {
            let values = eval_args(name, args, 1, vars)?;
            Ok(values[0].floor())
        }
        "ceil" => {
            let values = eval_args(name, args, 1, vars)?;
            Ok(values[0].ceil())
        }
        "abs" => {
            let values = eval_args(name, args, 1, vars)?;
            Ok(values[0].abs())
        }
        "if_else" => {
            // Only the taken branch is evaluated, so a guarded division by
            // zero in the other branch cannot fail the whole formula.
            if args.len() != 3 {
                return Err(format!("if_else expects 3 arguments, got {}", args.len()));
            }
            let condition = eval(&args[0], vars)?;
            if is_true(condition) {
                eval(&args[1], vars)
            } else {
                eval(&args[2], vars)
            }
        }
        "prorate" => {
            let values = eval_args(name, args, 3, vars)?;
            let (amount, paid, total) = (values[0], values[1], values[2]);
            if total.is_zero() {
                return Ok(Decimal::ZERO);
            }
            let scaled = amount
                .checked_mul(paid)
                .and_then(|v| v.checked_div(total))
                .ok_or_else(overflow)?;
            Ok(round_half_up(scaled, 0))
        }
        "percentage" => {
            let values = eval_args(name, args, 2, vars)?;
            let scaled = values[0]
                .checked_mul(values[1])
                .and_then(|v| v.checked_div(Decimal::new(100, 0)))
                .ok_or_else(overflow)?;
            Ok(round_half_up(scaled, 0))
        }
        _ => Err(format!("unknown function '{name}'")),
    }
}

fn eval_args(
    name: &str,
    args: &[Expr],
    expected: usize,
    vars: &BTreeMap<String, Decimal>,
) -> Result<Vec<Decimal>, String> {
    if args.len() != expected {
        return Err(format!(
            "{name} expects {expected} arguments, got {}",
            args.len()
        ));
    }
    args.iter().map(|arg| eval(arg, vars)).collect()
}

fn decimals_arg(value: Decimal) -> Result<u32, String> {
    if value.is_sign_negative() || value.fract() != Decimal::ZERO {
        return Err(format!("round expects a non-negative integer decimal count, got {value}"));
    }
    u32::try_from(value.mantissa() / 10i128.pow(value.scale()))
        .map_err(|_| format!("round decimal count out of range: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, Decimal> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), dec(v)))
            .collect()
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let evaluator = FormulaEvaluator::new();
        let result = evaluator.evaluate("2 + 3 * 4", &BTreeMap::new()).unwrap();
        assert_eq!(result, dec("14"));
    }

    #[test]
    fn test_evaluate_variable_lookup() {
        let evaluator = FormulaEvaluator::new();
        let result = evaluator
            .evaluate("basic * 0.12", &vars(&[("basic", "15000")]))
            .unwrap();
        assert_eq!(result, dec("1800"));
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let evaluator = FormulaEvaluator::new();
        let err = evaluator.evaluate("mystery + 1", &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("unknown variable 'mystery'"));
    }

    #[test]
    fn test_unknown_function_is_an_error() {
        let evaluator = FormulaEvaluator::new();
        let err = evaluator.evaluate("sqrt(4)", &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("unknown function 'sqrt'"));
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let evaluator = FormulaEvaluator::new();
        let err = evaluator.evaluate("1 / 0", &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn test_round_is_half_up() {
        let evaluator = FormulaEvaluator::new();
        let empty = BTreeMap::new();

        assert_eq!(evaluator.evaluate("round(2.5, 0)", &empty).unwrap(), dec("3"));
        assert_eq!(evaluator.evaluate("round(2.4, 0)", &empty).unwrap(), dec("2"));
        assert_eq!(
            evaluator.evaluate("round(2.345, 2)", &empty).unwrap(),
            dec("2.35")
        );
    }

    #[test]
    fn test_round_rejects_fractional_decimal_count() {
        let evaluator = FormulaEvaluator::new();
        assert!(evaluator.evaluate("round(2.5, 1.5)", &BTreeMap::new()).is_err());
        assert!(evaluator.evaluate("round(2.5, -1)", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_prorate_full_period_is_identity() {
        let evaluator = FormulaEvaluator::new();
        let result = evaluator
            .evaluate("prorate(30000, 30, 30)", &BTreeMap::new())
            .unwrap();
        assert_eq!(result, dec("30000"));
    }

    #[test]
    fn test_prorate_zero_total_days_returns_zero() {
        let evaluator = FormulaEvaluator::new();
        let result = evaluator
            .evaluate("prorate(30000, 15, 0)", &BTreeMap::new())
            .unwrap();
        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn test_prorate_rounds_to_whole_units() {
        let evaluator = FormulaEvaluator::new();
        // 10000 * 20 / 30 = 6666.66... -> 6667
        let result = evaluator
            .evaluate("prorate(10000, 20, 30)", &BTreeMap::new())
            .unwrap();
        assert_eq!(result, dec("6667"));
    }

    #[test]
    fn test_percentage_rounds_to_whole_units() {
        let evaluator = FormulaEvaluator::new();
        // 20001 * 12 / 100 = 2400.12 -> 2400
        let result = evaluator
            .evaluate("percentage(20001, 12)", &BTreeMap::new())
            .unwrap();
        assert_eq!(result, dec("2400"));
    }

    #[test]
    fn test_if_else_only_evaluates_taken_branch() {
        let evaluator = FormulaEvaluator::new();
        let result = evaluator
            .evaluate("if_else(1, 10, 1 / 0)", &BTreeMap::new())
            .unwrap();
        assert_eq!(result, dec("10"));
    }

    #[test]
    fn test_if_else_false_branch() {
        let evaluator = FormulaEvaluator::new();
        let result = evaluator
            .evaluate("if_else(basic > 20000, 500, 250)", &vars(&[("basic", "15000")]))
            .unwrap();
        assert_eq!(result, dec("250"));
    }

    #[test]
    fn test_min_max_abs_floor_ceil() {
        let evaluator = FormulaEvaluator::new();
        let empty = BTreeMap::new();

        assert_eq!(evaluator.evaluate("min(3, 7)", &empty).unwrap(), dec("3"));
        assert_eq!(evaluator.evaluate("max(3, 7)", &empty).unwrap(), dec("7"));
        assert_eq!(evaluator.evaluate("abs(-4.5)", &empty).unwrap(), dec("4.5"));
        assert_eq!(evaluator.evaluate("floor(4.9)", &empty).unwrap(), dec("4"));
        assert_eq!(evaluator.evaluate("ceil(4.1)", &empty).unwrap(), dec("5"));
    }

    #[test]
    fn test_wrong_arity_is_an_error() {
        let evaluator = FormulaEvaluator::new();
        assert!(evaluator.evaluate("min(3)", &BTreeMap::new()).is_err());
        assert!(evaluator.evaluate("abs(1, 2)", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_comparisons_yield_unit_decimals() {
        let evaluator = FormulaEvaluator::new();
        let empty = BTreeMap::new();

        assert_eq!(evaluator.evaluate("3 > 2", &empty).unwrap(), Decimal::ONE);
        assert_eq!(evaluator.evaluate("3 < 2", &empty).unwrap(), Decimal::ZERO);
        assert_eq!(
            evaluator.evaluate("1 == 1 && 2 != 3", &empty).unwrap(),
            Decimal::ONE
        );
        assert_eq!(
            evaluator.evaluate("1 > 2 || 3 >= 3", &empty).unwrap(),
            Decimal::ONE
        );
    }

    #[test]
    fn test_validate_reports_parse_errors_without_evaluating() {
        let evaluator = FormulaEvaluator::new();

        let good = evaluator.validate("elements.basic * 0.4");
        assert!(good.valid);
        assert!(good.error.is_none());

        // References unknown variables but parses fine
        let unbound = evaluator.validate("no_such_variable + 1");
        assert!(unbound.valid);

        let bad = evaluator.validate("basic +");
        assert!(!bad.valid);
        assert!(bad.error.is_some());
    }

    #[test]
    fn test_extract_dependencies_strips_elements_prefix() {
        let evaluator = FormulaEvaluator::new();
        let deps = evaluator
            .extract_dependencies("elements.basic + elements.hra * 0.5 + period_days")
            .unwrap();

        let expected: BTreeSet<String> =
            ["basic".to_string(), "hra".to_string()].into_iter().collect();
        assert_eq!(deps, expected);
    }

    #[test]
    fn test_extract_dependencies_ignores_unnamespaced_variables() {
        let evaluator = FormulaEvaluator::new();
        let deps = evaluator.extract_dependencies("basic + gross").unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_cache_returns_identical_results() {
        let evaluator = FormulaEvaluator::new();
        let bindings = vars(&[("basic", "12345.67")]);

        let first = evaluator.evaluate("round(basic * 0.4, 2)", &bindings).unwrap();
        let second = evaluator.evaluate("round(basic * 0.4, 2)", &bindings).unwrap();
        assert_eq!(first, second);
    }
}
