//! Restricted formula language for data-driven element calculation.
//!
//! Expressions are parsed once into an explicit AST and cached keyed by the
//! expression text; evaluation walks the AST against a variable map. There is
//! no dynamic code execution anywhere. The grammar supports arithmetic,
//! comparisons, boolean combinators, and a fixed library of helper functions
//! (`min`, `max`, `round`, `floor`, `ceil`, `abs`, `if_else`, `prorate`,
//! `percentage`).

mod ast;
pub mod dependency;
mod evaluator;
mod parser;

pub use ast::{BinaryOp, Expr};
pub use evaluator::{round_half_up, FormulaEvaluator, Validation};
pub use parser::parse_expression;
