use std::{env, net::{SocketAddr, ToSocketAddrs as _}, str::FromStr};

use sea_orm::ConnectOptions;
use tracing::info;

use crate::{
    attendance::MissingDayPolicy,
    compensation::{HourlyRate, Proration},
    deduction::BpjsBasis,
    error::ConfigurationError,
    run::PayrollPolicy,
};

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,

    pub policy: PayrollPolicy,
}

pub fn load() -> Config {
    Config {
        host_address: load_host_address(),
        database_opt: load_database_opt().into(),
        policy: load_policy(),
    }
}

fn load_host_address() -> SocketAddr {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| "127.0.0.1:0".to_string());

    var.to_socket_addrs()
        .expect("`HOST_ADDRESS` is not in a valid format").nth(0)
        .expect("unable to resolve host from `HOST_ADDRESS`")
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");

    let var = env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set");

    var
}

fn load_policy() -> PayrollPolicy {
    info!("Loading payroll policy from `PAYROLL_*` environment");

    load_policy_from(|key| env::var(key).ok()).expect("invalid payroll policy")
}

/// Builds the policy from `lookup`, falling back to statutory defaults for unset keys.
pub fn load_policy_from(lookup: impl Fn(&str) -> Option<String>) -> Result<PayrollPolicy, ConfigurationError> {
    let mut policy = PayrollPolicy::default();

    if let Some(value) = lookup("PAYROLL_PRORATION") {
        policy.rates.proration = match value.trim() {
            "disabled" => Proration::Disabled,
            "presence" => Proration::ByPresence,
            "paid_days" => Proration::ByPaidDays,
            _ => return Err(invalid("PAYROLL_PRORATION", &value)),
        };
    }

    if let Some(value) = lookup("PAYROLL_MISSING_DAY") {
        policy.missing_day = match value.trim() {
            "absent" => MissingDayPolicy::Absent,
            "present" => MissingDayPolicy::Present,
            _ => return Err(invalid("PAYROLL_MISSING_DAY", &value)),
        };
    }

    if let Some(value) = lookup("PAYROLL_BPJS_BASIS") {
        policy.bpjs_basis = match value.trim() {
            "gross" => BpjsBasis::GrossPay,
            "fixed" => BpjsBasis::BasePlusFixedAllowances,
            _ => return Err(invalid("PAYROLL_BPJS_BASIS", &value)),
        };
    }

    if let Some(multiplier) = parse(&lookup, "PAYROLL_OVERTIME_MULTIPLIER")? {
        policy.rates.overtime_multiplier = multiplier;
    }

    if let Some(divisor) = parse(&lookup, "PAYROLL_OVERTIME_DIVISOR")? {
        policy.rates.hourly_rate = HourlyRate::MonthlyDivisor(divisor);
    }

    if let Some(price) = parse(&lookup, "PAYROLL_PRODUCTION_PRICE")? {
        policy.rates.production_price_per_unit = price;
    }

    if let Some(rate) = parse(&lookup, "PAYROLL_OCCUPATIONAL_COST_RATE")? {
        policy.tax.occupational_cost_rate = rate;
    }

    if let Some(cap) = parse(&lookup, "PAYROLL_OCCUPATIONAL_COST_CAP")? {
        policy.tax.occupational_cost_cap = cap;
    }

    if let Some(unit) = parse(&lookup, "PAYROLL_TAXABLE_ROUNDING")? {
        policy.tax.taxable_rounding_unit = unit;
    }

    if let Some(unit) = parse(&lookup, "PAYROLL_MONTHLY_ROUNDING")? {
        policy.tax.monthly_rounding_unit = unit;
    }

    if let Some(months) = parse::<u8>(&lookup, "PAYROLL_ANNUALIZATION_MONTHS")? {
        policy.tax.annualization_months = months;
    }

    policy.validate()?;

    Ok(policy)
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigurationError> {
    lookup(key)
        .map(|value| value.trim().parse::<T>().map_err(|_| invalid(key, &value)))
        .transpose()
}

fn invalid(key: &str, value: &str) -> ConfigurationError {
    ConfigurationError::InvalidPolicy {
        key: key.to_string(),
        value: value.to_string(),
    }
}
