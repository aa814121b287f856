//! The formula expression AST.

use rust_decimal::Decimal;

/// A binary operator in a formula expression.
///
/// Comparison and boolean operators evaluate to `1` or `0` so the language
/// stays single-typed over decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Rem,
    /// Equality comparison.
    Eq,
    /// Inequality comparison.
    Ne,
    /// Less-than comparison.
    Lt,
    /// Less-than-or-equal comparison.
    Lte,
    /// Greater-than comparison.
    Gt,
    /// Greater-than-or-equal comparison.
    Gte,
    /// Boolean and (non-zero operands are true).
    And,
    /// Boolean or (non-zero operands are true).
    Or,
}

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(Decimal),
    /// A named variable, possibly dotted (`elements.basic`).
    Variable(String),
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A call to one of the built-in helper functions.
    Call {
        /// The function name.
        name: String,
        /// The argument expressions.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Visits every variable reference in the expression.
    pub fn visit_variables<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => visit(name),
            Expr::Neg(inner) => inner.visit_variables(visit),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit_variables(visit);
                rhs.visit_variables(visit);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.visit_variables(visit);
                }
            }
        }
    }
}
