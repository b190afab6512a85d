use crate::payroll::{PayrollRecord, PayrollSummary};

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CreatePeriod {
    pub(super) year: i32,
    pub(super) month: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PeriodDetail {
    pub(super) period: PayrollPeriod,
    pub(super) records: Vec<PayrollRecord>,
    pub(super) summary: PayrollSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PeriodAction {
    Finalize,
    Pay,
    Cancel,
}

impl PeriodAction {
    pub(super) fn target(self) -> PeriodStatus {
        match self {
            PeriodAction::Finalize => PeriodStatus::Finalized,
            PeriodAction::Pay => PeriodStatus::Paid,
            PeriodAction::Cancel => PeriodStatus::Cancelled,
        }
    }
}

impl FromStr for PeriodAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finalize" => Ok(PeriodAction::Finalize),
            "pay" => Ok(PeriodAction::Pay),
            "cancel" => Ok(PeriodAction::Cancel),
            _ => Err(()),
        }
    }
}
