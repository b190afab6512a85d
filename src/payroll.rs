use std::{collections::BTreeMap, fmt};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    attendance::AttendanceSummary,
    calendar::Period,
    compensation::CompensationComponents,
    deduction::Deductions,
    employee::Employee,
    error::{ComputationWarning, EngineError},
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OtherDeductions {
    pub loan: Decimal,
    pub misc: Decimal,
}

impl OtherDeductions {
    pub fn total(&self) -> Decimal {
        self.loan + self.misc
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub employee_id: Uuid,
    pub full_name: String,
    pub division: String,
    pub position: String,
    pub period: Period,
    pub attendance: AttendanceSummary,
    pub compensation: CompensationComponents,
    pub deductions: Deductions,
    pub other_deductions: OtherDeductions,
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
    pub warnings: Vec<ComputationWarning>,
}

/// Puts the pieces together. Net pay is never clamped, a negative one is only flagged.
pub fn assemble_payroll(
    employee: &Employee,
    period: Period,
    attendance: AttendanceSummary,
    compensation: CompensationComponents,
    deductions: Deductions,
    other_deductions: OtherDeductions,
) -> PayrollRecord {
    let gross_pay = compensation.gross_pay;
    let total_deductions = deductions.bpjs_employee + deductions.pph21_monthly + other_deductions.total();
    let net_pay = gross_pay - total_deductions;

    let mut warnings = deductions.warnings.clone();

    if attendance.working_days == 0 {
        warn!(employee_id = %employee.id, %period, "period has no working days");
        warnings.push(ComputationWarning::NoWorkingDays);
    }

    if net_pay < Decimal::ZERO {
        warn!(employee_id = %employee.id, %period, %net_pay, "negative net pay");
        warnings.push(ComputationWarning::NegativeNetPay { net_pay });
    }

    PayrollRecord {
        employee_id: employee.id,
        full_name: employee.full_name.clone(),
        division: employee.division.clone(),
        position: employee.position.clone(),
        period,
        attendance,
        compensation,
        deductions,
        other_deductions,
        gross_pay,
        total_deductions,
        net_pay,
        warnings,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollTotals {
    pub headcount: u32,
    pub base_salary: Decimal,
    pub allowances: Decimal,
    pub production_premium: Decimal,
    pub overtime_premium: Decimal,
    pub other_income: Decimal,
    pub gross_pay: Decimal,
    pub bpjs_employee: Decimal,
    pub bpjs_employer: Decimal,
    pub pph21: Decimal,
    pub other_deductions: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
}

impl PayrollTotals {
    pub fn add(&mut self, record: &PayrollRecord) {
        self.headcount += 1;
        self.base_salary += record.compensation.prorated_base;
        self.allowances += record.compensation.allowance_total;
        self.production_premium += record.compensation.production_premium;
        self.overtime_premium += record.compensation.overtime_premium;
        self.other_income += record.compensation.other_income;
        self.gross_pay += record.gross_pay;
        self.bpjs_employee += record.deductions.bpjs_employee;
        self.bpjs_employer += record.deductions.bpjs_employer;
        self.pph21 += record.deductions.pph21_monthly;
        self.other_deductions += record.other_deductions.total();
        self.total_deductions += record.total_deductions;
        self.net_pay += record.net_pay;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionTotals {
    pub division: String,
    pub totals: PayrollTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// Sorted by division name
    pub divisions: Vec<DivisionTotals>,
    pub grand_total: PayrollTotals,
}

/// Plain sums per division and overall.
pub fn summarize(records: &[PayrollRecord]) -> PayrollSummary {
    let mut divisions = BTreeMap::<&str, PayrollTotals>::new();
    let mut grand_total = PayrollTotals::default();

    for record in records {
        divisions.entry(record.division.as_str()).or_default().add(record);
        grand_total.add(record);
    }

    PayrollSummary {
        divisions: divisions.into_iter()
            .map(|(division, totals)| DivisionTotals {
                division: division.to_string(),
                totals,
            })
            .collect(),
        grand_total,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Draft,
    Processing,
    Finalized,
    Paid,
    Cancelled,
    Failed,
}

impl PeriodStatus {
    pub fn can_transition_to(self, to: PeriodStatus) -> bool {
        use PeriodStatus::*;

        matches!(
            (self, to),
            (Draft, Processing) | (Draft, Cancelled) | (Processing, Finalized) | (Processing, Failed) | (Finalized, Paid)
        )
    }

    /// Only draft and processing periods accept new or changed records
    pub fn allows_mutation(self) -> bool {
        matches!(self, PeriodStatus::Draft | PeriodStatus::Processing)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PeriodStatus::Draft => "draft",
            PeriodStatus::Processing => "processing",
            PeriodStatus::Finalized => "finalized",
            PeriodStatus::Paid => "paid",
            PeriodStatus::Cancelled => "cancelled",
            PeriodStatus::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    pub id: Uuid,
    pub period: Period,
    pub status: PeriodStatus,
    pub failure_reason: Option<String>,
}

impl PayrollPeriod {
    pub fn new(period: Period) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            status: PeriodStatus::Draft,
            failure_reason: None,
        }
    }

    pub fn transition(&mut self, to: PeriodStatus) -> Result<(), EngineError> {
        if !self.status.can_transition_to(to) {
            return Err(EngineError::InvalidTransition { from: self.status, to });
        }

        self.status = to;
        Ok(())
    }

    /// Draft moves to processing, an already processing period stays there
    pub fn start_processing(&mut self) -> Result<(), EngineError> {
        match self.status {
            PeriodStatus::Processing => Ok(()),
            PeriodStatus::Draft => self.transition(PeriodStatus::Processing),
            status => Err(EngineError::PeriodLocked(status)),
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), EngineError> {
        self.transition(PeriodStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{
        compensation::{build_gross_pay, RateConfig},
        deduction::{DeductionEngine, RateTables, TaxPolicy},
        employee::PeriodInputs,
    };

    use super::*;

    fn employee(division: &str, base_salary: Decimal) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            full_name: "Siti Rahma".to_string(),
            division: division.to_string(),
            position: "Mandor".to_string(),
            worker_type: Default::default(),
            base_salary,
            npwp: Some("12.345.678.9-012.000".to_string()),
            ptkp_code: "TK/0".parse().unwrap(),
            allowances: vec![],
        }
    }

    fn attendance() -> AttendanceSummary {
        AttendanceSummary {
            working_days: 20,
            present: 20,
            ..Default::default()
        }
    }

    fn record(employee: &Employee, other: OtherDeductions) -> PayrollRecord {
        let tables = RateTables::default();
        let policy = TaxPolicy::default();
        let config = RateConfig::default();

        let compensation = build_gross_pay(employee, &attendance(), &PeriodInputs::default(), &config);
        let deductions = DeductionEngine::new(&tables, &policy)
            .compute_deductions(compensation.gross_pay, employee.ptkp_code, compensation.gross_pay)
            .unwrap();

        assemble_payroll(employee, Period::new(2025, 4).unwrap(), attendance(), compensation, deductions, other)
    }

    #[test]
    fn test_assemble_payroll() {
        let record = record(&employee("Kantor", dec!(10000000)), OtherDeductions { loan: dec!(500000), misc: dec!(25000) });

        assert_eq!(record.gross_pay, dec!(10000000));
        // 400,000 BPJS + 230,000 PPh-21 + 525,000 other
        assert_eq!(record.total_deductions, dec!(1155000));
        assert_eq!(record.net_pay, dec!(8845000));
        assert_eq!(record.net_pay, record.gross_pay - record.total_deductions);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_negative_net_pay_is_flagged_not_clamped() {
        let record = record(&employee("Kantor", dec!(3000000)), OtherDeductions { loan: dec!(4000000), misc: dec!(0) });

        assert!(record.net_pay < dec!(0));
        assert_eq!(record.net_pay, record.gross_pay - record.total_deductions);
        assert_eq!(record.warnings, vec![ComputationWarning::NegativeNetPay { net_pay: record.net_pay }]);
    }

    #[test]
    fn test_summarize() {
        let records = vec![
            record(&employee("Kantor", dec!(10000000)), OtherDeductions::default()),
            record(&employee("Afdeling I", dec!(4000000)), OtherDeductions::default()),
            record(&employee("Kantor", dec!(6000000)), OtherDeductions::default()),
        ];

        let summary = summarize(&records);

        assert_eq!(summary.divisions.len(), 2);
        assert_eq!(summary.divisions[0].division, "Afdeling I");
        assert_eq!(summary.divisions[1].division, "Kantor");
        assert_eq!(summary.divisions[1].totals.headcount, 2);
        assert_eq!(summary.divisions[1].totals.gross_pay, dec!(16000000));

        assert_eq!(summary.grand_total.headcount, 3);
        assert_eq!(summary.grand_total.gross_pay, dec!(20000000));
        assert_eq!(
            summary.grand_total.net_pay,
            summary.divisions.iter().map(|d| d.totals.net_pay).sum::<Decimal>()
        );
        assert_eq!(
            summary.grand_total.net_pay,
            summary.grand_total.gross_pay - summary.grand_total.total_deductions
        );
    }

    #[test]
    fn test_period_lifecycle() {
        let mut period = PayrollPeriod::new(Period::new(2025, 4).unwrap());
        assert!(period.status.allows_mutation());

        period.start_processing().unwrap();
        period.start_processing().unwrap();
        assert_eq!(period.status, PeriodStatus::Processing);

        period.transition(PeriodStatus::Finalized).unwrap();
        assert!(!period.status.allows_mutation());
        assert!(matches!(period.start_processing(), Err(EngineError::PeriodLocked(PeriodStatus::Finalized))));

        period.transition(PeriodStatus::Paid).unwrap();
        assert!(matches!(
            period.transition(PeriodStatus::Cancelled),
            Err(EngineError::InvalidTransition { from: PeriodStatus::Paid, to: PeriodStatus::Cancelled })
        ));
    }

    #[test]
    fn test_failed_period_keeps_reason() {
        let mut period = PayrollPeriod::new(Period::new(2025, 4).unwrap());

        assert!(period.fail("bracket table has a gap").is_err());

        period.start_processing().unwrap();
        period.fail("bracket table has a gap").unwrap();

        assert_eq!(period.status, PeriodStatus::Failed);
        assert_eq!(period.failure_reason.as_deref(), Some("bracket table has a gap"));
    }

    #[test]
    fn test_cancel_only_from_draft() {
        assert!(PeriodStatus::Draft.can_transition_to(PeriodStatus::Cancelled));
        assert!(!PeriodStatus::Processing.can_transition_to(PeriodStatus::Cancelled));
        assert!(!PeriodStatus::Failed.can_transition_to(PeriodStatus::Processing));
    }
}
