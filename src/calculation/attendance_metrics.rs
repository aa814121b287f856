//! Attendance metrics aggregation.
//!
//! Reduces one employee's raw attendance records, approved leave spans, and
//! leave balances for a period into an [`AttendanceSummary`]. Payable days
//! drive day-based proration downstream: present days, holidays, and week
//! offs count in full, half days count half, and approved paid leave counts
//! while balance remains. Unpaid leave, unapproved absence, the unpaid half
//! of a half day, and paid leave past its balance all land in loss-of-pay.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, LeaveBalance, LeaveRecord,
};

/// Reduces a period's attendance into a metrics summary.
///
/// A day marked on-leave is matched against the approved leave spans; a day
/// with no covering approved span is counted as unapproved absence. Paid
/// leave consumes the per-type balance day by day; once the balance for a
/// type is exhausted, further days of that type become loss-of-pay. A leave
/// type with no balance entry is treated as unlimited.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::summarize_attendance;
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let records = vec![
///     AttendanceRecord {
///         date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
///         status: AttendanceStatus::Present,
///         hours_worked: Decimal::new(8, 0),
///         overtime_hours: Decimal::ZERO,
///         is_late: false,
///         left_early: false,
///     },
///     AttendanceRecord {
///         date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
///         status: AttendanceStatus::HalfDay,
///         hours_worked: Decimal::new(4, 0),
///         overtime_hours: Decimal::ZERO,
///         is_late: true,
///         left_early: false,
///     },
/// ];
///
/// let summary = summarize_attendance(&records, &[], &[]);
/// assert_eq!(summary.payable_days, Decimal::new(15, 1)); // 1.5
/// assert_eq!(summary.late_count, 1);
/// ```
pub fn summarize_attendance(
    records: &[AttendanceRecord],
    leaves: &[LeaveRecord],
    balances: &[LeaveBalance],
) -> AttendanceSummary {
    let half = Decimal::new(5, 1);
    let mut summary = AttendanceSummary::default();
    // Remaining paid-leave balance per type, drawn down as days are consumed.
    let mut remaining: BTreeMap<&str, Decimal> = balances
        .iter()
        .map(|balance| (balance.leave_type.as_str(), balance.remaining))
        .collect();

    for record in records {
        match record.status {
            AttendanceStatus::Present => {
                summary.present_days += Decimal::ONE;
                summary.payable_days += Decimal::ONE;
            }
            AttendanceStatus::HalfDay => {
                summary.half_days += 1;
                summary.payable_days += half;
                summary.lop_days += half;
            }
            AttendanceStatus::Holiday => {
                summary.holiday_days += 1;
                summary.payable_days += Decimal::ONE;
            }
            AttendanceStatus::WeekOff => {
                summary.week_off_days += 1;
                summary.payable_days += Decimal::ONE;
            }
            AttendanceStatus::Absent => {
                summary.absent_days += Decimal::ONE;
                summary.lop_days += Decimal::ONE;
            }
            AttendanceStatus::OnLeave => {
                let Some(leave) = leaves
                    .iter()
                    .find(|leave| leave.is_approved && leave.covers(record.date))
                else {
                    summary.absent_days += Decimal::ONE;
                    summary.lop_days += Decimal::ONE;
                    continue;
                };

                *summary
                    .leave_days
                    .entry(leave.leave_type.clone())
                    .or_default() += Decimal::ONE;

                let balance_left = remaining
                    .get(leave.leave_type.as_str())
                    .copied()
                    .unwrap_or(Decimal::MAX);
                if leave.is_paid && balance_left >= Decimal::ONE {
                    summary.payable_days += Decimal::ONE;
                    if let Some(left) = remaining.get_mut(leave.leave_type.as_str()) {
                        *left -= Decimal::ONE;
                    }
                } else {
                    summary.lop_days += Decimal::ONE;
                }
            }
        }

        summary.total_hours += record.hours_worked;
        summary.overtime_hours += record.overtime_hours;
        if record.is_late {
            summary.late_count += 1;
        }
        if record.left_early {
            summary.early_exit_count += 1;
        }
    }

    summary
}
