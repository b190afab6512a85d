use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{calendar::{Period, WorkingCalendar}, error::DataQualityError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    /// Came in, but late. Counts as a present day.
    Late,
    Absent,
    Sick,
    Leave,
}

/// One raw attendance record as captured by the attendance system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub overtime_hours: Decimal,
}

/// What a working day without any record counts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDayPolicy {
    #[default]
    Absent,
    Present,
}

impl MissingDayPolicy {
    fn status(self) -> AttendanceStatus {
        match self {
            MissingDayPolicy::Absent => AttendanceStatus::Absent,
            MissingDayPolicy::Present => AttendanceStatus::Present,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub working_days: u32,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub sick: u32,
    pub leave: u32,
    pub overtime_hours: Decimal,
}

impl AttendanceSummary {
    /// Days actually worked, late arrivals included
    pub fn present_days(&self) -> u32 {
        self.present + self.late
    }

    /// Worked days plus sick and leave days
    pub fn paid_days(&self) -> u32 {
        self.present_days() + self.sick + self.leave
    }

    fn count(&mut self, status: AttendanceStatus) {
        let counter = match status {
            AttendanceStatus::Present => &mut self.present,
            AttendanceStatus::Late => &mut self.late,
            AttendanceStatus::Absent => &mut self.absent,
            AttendanceStatus::Sick => &mut self.sick,
            AttendanceStatus::Leave => &mut self.leave,
        };

        *counter += 1;
    }
}

/// Reduces one employee's raw records for `period` into day counts.
///
/// Every working day lands in exactly one bucket. Records on weekends and holidays
/// only contribute their overtime hours. Two records on the same date are rejected
/// rather than letting one silently win.
pub fn aggregate(
    employee_id: Uuid,
    period: Period,
    calendar: &WorkingCalendar,
    entries: &[AttendanceEntry],
    missing_day: MissingDayPolicy,
) -> Result<AttendanceSummary, DataQualityError> {
    let mut statuses = BTreeMap::new();
    let mut summary = AttendanceSummary::default();

    for entry in entries {
        if entry.employee_id != employee_id {
            return Err(DataQualityError::ForeignEmployeeEntry {
                expected: employee_id,
                found: entry.employee_id,
                date: entry.date,
            });
        }

        if !period.contains(entry.date) {
            return Err(DataQualityError::EntryOutsidePeriod {
                employee_id,
                date: entry.date,
            });
        }

        if statuses.insert(entry.date, entry.status).is_some() {
            return Err(DataQualityError::DuplicateAttendanceRecord {
                employee_id,
                date: entry.date,
            });
        }

        summary.overtime_hours += entry.overtime_hours;
    }

    for date in calendar.working_dates(period) {
        summary.working_days += 1;
        summary.count(statuses.get(&date).copied().unwrap_or(missing_day.status()));
    }

    Ok(summary)
}
