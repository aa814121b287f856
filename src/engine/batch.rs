//! Parallel batch execution across employees.
//!
//! A batch payroll run parallelizes trivially: each employee's calculation is
//! a pure function of its context and the shared configuration snapshot, with
//! no shared mutable state. One task per employee is fanned out and joined
//! before aggregation. A failure for one employee is recorded against that
//! employee and never aborts the rest of the batch.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;
use uuid::Uuid;

use crate::models::CalculationContext;

use super::element_engine::ElementCalculationEngine;

/// One employee's input to a batch run.
#[derive(Debug, Clone)]
pub struct EmployeeRun {
    /// The employee's calculation context.
    pub context: CalculationContext,
    /// The element codes assigned to the employee for this period.
    pub element_codes: Vec<String>,
}

/// A calculation failure recorded against a single employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFailure {
    /// The employee whose calculation failed.
    pub employee_id: String,
    /// The rendered engine error.
    pub error: String,
}

/// The aggregated outcome of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Identifier for this run.
    pub run_id: Uuid,
    /// Per-employee element amounts, keyed by employee id.
    pub results: BTreeMap<String, BTreeMap<String, Decimal>>,
    /// Per-employee failures, sorted by employee id.
    pub failures: Vec<EmployeeFailure>,
}

/// Runs a batch of per-employee calculations against one engine snapshot.
///
/// The engine is shared read-only; the configuration snapshot it holds is
/// immutable for the duration of the run, so concurrent configuration edits
/// cannot affect in-flight calculations.
pub async fn run_batch(
    engine: Arc<ElementCalculationEngine>,
    runs: Vec<EmployeeRun>,
) -> BatchOutcome {
    let mut tasks = JoinSet::new();
    for run in runs {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            let EmployeeRun {
                mut context,
                element_codes,
            } = run;
            let employee_id = context.employee_id.clone();
            let outcome = engine.calculate_all_elements(&element_codes, &mut context);
            (employee_id, outcome)
        });
    }

    let mut results = BTreeMap::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((employee_id, Ok(amounts))) => {
                results.insert(employee_id, amounts);
            }
            Ok((employee_id, Err(error))) => {
                warn!(%employee_id, %error, "employee calculation failed");
                failures.push(EmployeeFailure {
                    employee_id,
                    error: error.to_string(),
                });
            }
            Err(join_error) => {
                warn!(%join_error, "calculation task panicked");
                failures.push(EmployeeFailure {
                    employee_id: String::new(),
                    error: join_error.to_string(),
                });
            }
        }
    }
    // Join order is nondeterministic; sort so the outcome is stable.
    failures.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

    BatchOutcome {
        run_id: Uuid::new_v4(),
        results,
        failures,
    }
}
