use actix_web::{body, http::{header::ContentType, StatusCode}, HttpResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::{deduction::BpjsProgram, payroll::PeriodStatus};

/// Broken master data or policy. Aborts the whole run before any employee is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("tax bracket table is empty")]
    EmptyBracketTable,
    #[error("tax bracket table must start at 0, first bracket starts at {0}")]
    BracketTableNotFromZero(Decimal),
    #[error("tax bracket gap or overlap: bracket {index} starts at {min} but the previous one ends at {previous_max}")]
    BracketTableGapOrOverlap {
        index: usize,
        previous_max: Decimal,
        min: Decimal,
    },
    #[error("tax bracket {0} is unbounded but is not the last bracket")]
    UnboundedInnerBracket(usize),
    #[error("last tax bracket must have no upper bound")]
    BoundedLastBracket,
    #[error("tax bracket {0} has an empty range")]
    EmptyBracket(usize),
    #[error("rate {rate}% for {what} is outside 0..=100")]
    RateOutOfRange { what: String, rate: Decimal },
    #[error("unknown PTKP code `{0}`")]
    UnknownPtkpCode(String),
    #[error("PTKP code `{0}` is listed twice")]
    DuplicatePtkpCode(String),
    #[error("PTKP threshold for `{code}` is lower than for fewer dependents")]
    NonMonotonicPtkp { code: String },
    #[error("BPJS rate for {0} is missing")]
    MissingBpjsRate(BpjsProgram),
    #[error("BPJS rate for {0} is listed twice")]
    DuplicateBpjsRate(BpjsProgram),
    #[error("invalid value `{value}` for `{key}`")]
    InvalidPolicy { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid period {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },
}

/// Bad attendance data for a single employee. The employee is skipped, the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityError {
    #[error("employee {employee_id} has more than one attendance record on {date}")]
    DuplicateAttendanceRecord { employee_id: Uuid, date: NaiveDate },
    #[error("attendance record on {date} for employee {employee_id} is outside the payroll period")]
    EntryOutsidePeriod { employee_id: Uuid, date: NaiveDate },
    #[error("attendance record on {date} belongs to employee {found}, expected {expected}")]
    ForeignEmployeeEntry {
        expected: Uuid,
        found: Uuid,
        date: NaiveDate,
    },
}

/// Recorded against a payroll record and logged, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComputationWarning {
    NegativeNetPay { net_pay: Decimal },
    NonPositiveGrossIncome { gross: Decimal },
    NoWorkingDays,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("payroll period cannot move from {from} to {to}")]
    InvalidTransition { from: PeriodStatus, to: PeriodStatus },
    #[error("payroll period is {0} and can no longer be changed")]
    PeriodLocked(PeriodStatus),
    #[error("payroll period {0} not found")]
    PeriodNotFound(Uuid),
    #[error("database error")]
    Database(#[from] sea_orm::DbErr),
}

impl actix_web::error::ResponseError for EngineError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let EngineError::Database(err) = self {
            error!(%err, "database error");
        }

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Calendar(_) => StatusCode::BAD_REQUEST,
            EngineError::InvalidTransition { .. } | EngineError::PeriodLocked(_) => StatusCode::CONFLICT,
            EngineError::PeriodNotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError as _;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(EngineError::from(ConfigurationError::EmptyBracketTable).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(EngineError::from(CalendarError::InvalidPeriod { year: 2025, month: 13 }).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(EngineError::PeriodLocked(PeriodStatus::Paid).status_code(), StatusCode::CONFLICT);
        assert_eq!(EngineError::PeriodNotFound(Uuid::nil()).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_warning_serialization() {
        let warning = ComputationWarning::NegativeNetPay { net_pay: dec!(-1500) };
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["kind"], "negative_net_pay");
        assert_eq!(json["net_pay"], "-1500");
    }
}
