//! Data models for the Payroll Element Calculation Engine.

mod attendance;
mod context;
mod element;
mod rule;

pub use attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, LeaveBalance, LeaveRecord,
};
pub use context::{CalculationContext, FieldValue};
pub use element::{CalculationMethod, ComplianceMapping, ElementType, SalaryElement};
pub use rule::{
    ConditionOperator, ConditionValue, ConditionalBranch, ConditionalPayload, PayrollElementRule,
    ProrationMethod, RuleCondition, RuleFormula, RuleSlab,
};
