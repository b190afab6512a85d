use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    attendance::AttendanceSummary,
    consts,
    employee::{Allowance, Employee, PeriodInputs, WorkerType},
    error::ConfigurationError,
    utils::round_rupiah,
};

/// Whether the base salary follows attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proration {
    /// Full monthly base regardless of attendance
    #[default]
    Disabled,
    /// base × present days / working days
    ByPresence,
    /// base × (present + sick + leave) / working days
    ByPaidDays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HourlyRate {
    Fixed(Decimal),
    /// Monthly base salary divided by this many hours
    MonthlyDivisor(Decimal),
}

impl Default for HourlyRate {
    fn default() -> Self {
        HourlyRate::MonthlyDivisor(consts::MONTHLY_HOURS_DIVISOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    pub proration: Proration,
    pub overtime_multiplier: Decimal,
    pub hourly_rate: HourlyRate,
    pub production_price_per_unit: Decimal,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            proration: Proration::default(),
            overtime_multiplier: consts::OVERTIME_MULTIPLIER,
            hourly_rate: HourlyRate::default(),
            production_price_per_unit: Decimal::ZERO,
        }
    }
}

impl RateConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |key: &str, value: Decimal| ConfigurationError::InvalidPolicy {
            key: key.to_string(),
            value: value.to_string(),
        };

        if self.overtime_multiplier < Decimal::ZERO {
            return Err(invalid("overtime_multiplier", self.overtime_multiplier));
        }

        match self.hourly_rate {
            HourlyRate::Fixed(rate) if rate < Decimal::ZERO => return Err(invalid("hourly_rate", rate)),
            HourlyRate::MonthlyDivisor(divisor) if divisor <= Decimal::ZERO => return Err(invalid("overtime_divisor", divisor)),
            _ => {}
        }

        if self.production_price_per_unit < Decimal::ZERO {
            return Err(invalid("production_price_per_unit", self.production_price_per_unit));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationComponents {
    /// Nominal monthly base from master data
    pub base_salary: Decimal,
    /// Base actually paid this period
    pub prorated_base: Decimal,
    pub allowances: Vec<Allowance>,
    pub allowance_total: Decimal,
    pub tonnage: Decimal,
    pub production_premium: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_hourly_rate: Decimal,
    pub overtime_premium: Decimal,
    pub other_income: Decimal,
    pub gross_pay: Decimal,
}

impl CompensationComponents {
    pub fn fixed_pay(&self) -> Decimal {
        self.prorated_base + self.allowance_total
    }
}

/// Gross pay for one employee and one period. Pure.
pub fn build_gross_pay(
    employee: &Employee,
    attendance: &AttendanceSummary,
    inputs: &PeriodInputs,
    config: &RateConfig,
) -> CompensationComponents {
    let base_salary = employee.base_salary;

    let paid_days = match config.proration {
        Proration::Disabled => None,
        Proration::ByPresence => Some(attendance.present_days()),
        Proration::ByPaidDays => Some(attendance.paid_days()),
    };

    let prorated_base = match paid_days {
        // No working days means nothing to pro-rate against, the aggregator flags it
        Some(days) if attendance.working_days > 0 => {
            round_rupiah(base_salary * Decimal::from(days) / Decimal::from(attendance.working_days))
        }
        _ => base_salary,
    };

    let allowance_total = employee.allowances.iter().map(|a| a.amount).sum::<Decimal>();

    let tonnage = match employee.worker_type {
        WorkerType::Harvester => inputs.tonnage,
        WorkerType::Staff => Decimal::ZERO,
    };
    let production_premium = round_rupiah(tonnage * config.production_price_per_unit);

    let overtime_hourly_rate = match config.hourly_rate {
        HourlyRate::Fixed(rate) => rate,
        HourlyRate::MonthlyDivisor(divisor) => base_salary / divisor,
    };
    let overtime_premium = round_rupiah(attendance.overtime_hours * overtime_hourly_rate * config.overtime_multiplier);

    let gross_pay = prorated_base + allowance_total + production_premium + overtime_premium + inputs.other_income;

    CompensationComponents {
        base_salary,
        prorated_base,
        allowances: employee.allowances.clone(),
        allowance_total,
        tonnage,
        production_premium,
        overtime_hours: attendance.overtime_hours,
        overtime_hourly_rate,
        overtime_premium,
        other_income: inputs.other_income,
        gross_pay,
    }
}
