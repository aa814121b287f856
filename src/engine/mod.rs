//! The element calculation engine.
//!
//! The engine resolves one element's amount either via a matched rule
//! (dispatched to the correct rule-type handler) or via the element's basic
//! fixed/percentage/prorated fallback, and iterates all assigned elements for
//! an employee in dependency order, accumulating a running context so later
//! elements can reference earlier results.

mod batch;
mod element_engine;
mod rule_selector;

pub use batch::{run_batch, BatchOutcome, EmployeeFailure, EmployeeRun};
pub use element_engine::ElementCalculationEngine;
pub use rule_selector::select_rule;
