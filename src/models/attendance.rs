//! Attendance and leave models.
//!
//! Raw attendance and leave records are reduced by the metrics aggregator into
//! a fixed [`AttendanceSummary`] snapshot for one employee and period. The
//! summary is derived, read-only data: it is computed on demand, never
//! authoritative storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The recorded status of one attendance day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present for the full day.
    Present,
    /// Absent without approved leave.
    Absent,
    /// Present for half the day.
    HalfDay,
    /// On approved leave (paid or unpaid, per the leave record).
    OnLeave,
    /// A declared holiday.
    Holiday,
    /// The employee's weekly off day.
    WeekOff,
}

/// One day's raw attendance record for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The day this record covers.
    pub date: NaiveDate,
    /// The recorded status.
    pub status: AttendanceStatus,
    /// Hours worked on this day.
    #[serde(default)]
    pub hours_worked: Decimal,
    /// Approved overtime hours on this day.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// True if the employee checked in late.
    #[serde(default)]
    pub is_late: bool,
    /// True if the employee checked out early.
    #[serde(default)]
    pub left_early: bool,
}

/// An approved leave span for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// The leave type code (e.g., "casual", "sick", "earned", "lop").
    pub leave_type: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Only approved records count toward the summary.
    pub is_approved: bool,
    /// False for loss-of-pay leave; unpaid days count as LOP days.
    pub is_paid: bool,
}

impl LeaveRecord {
    /// Returns true if `date` falls within this leave span.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Per-employee, per-year leave entitlement and usage.
///
/// Mutated only by leave approval/rejection transitions outside this engine;
/// the aggregator consumes it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The employee this balance belongs to.
    pub employee_id: String,
    /// The calendar year of the balance.
    pub year: i32,
    /// The leave type code.
    pub leave_type: String,
    /// Days granted for the year.
    pub entitled: Decimal,
    /// Days already taken.
    pub taken: Decimal,
    /// Days remaining.
    pub remaining: Decimal,
}

/// Fixed metrics snapshot for one employee and period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Full days present.
    pub present_days: Decimal,
    /// Days absent without approved leave.
    pub absent_days: Decimal,
    /// Half days (each contributes 0.5 to payable days).
    pub half_days: u32,
    /// Approved leave days by leave type.
    pub leave_days: BTreeMap<String, Decimal>,
    /// Declared holidays in the period.
    pub holiday_days: u32,
    /// Weekly off days in the period.
    pub week_off_days: u32,
    /// Loss-of-pay days (unpaid leave plus unapproved absence).
    pub lop_days: Decimal,
    /// Total hours worked.
    pub total_hours: Decimal,
    /// Approved overtime hours.
    pub overtime_hours: Decimal,
    /// Late check-in count.
    pub late_count: u32,
    /// Early check-out count.
    pub early_exit_count: u32,
    /// Days the employee is paid for (present + half-credit + paid leave
    /// + holidays + week offs).
    pub payable_days: Decimal,
}
