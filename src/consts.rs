use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Overtime is paid at 1.5x the hourly rate unless configured otherwise
pub const OVERTIME_MULTIPLIER: Decimal = dec!(1.5);

/// Hourly wage = monthly wage / 173
pub const MONTHLY_HOURS_DIVISOR: Decimal = dec!(173);

pub const OCCUPATIONAL_COST_RATE: Decimal = dec!(5);

/// Annual cap on the occupational cost deduction (500,000 a month)
pub const OCCUPATIONAL_COST_CAP: Decimal = dec!(6000000);

/// PKP is rounded down to this unit
pub const TAXABLE_ROUNDING_UNIT: Decimal = dec!(1000);

pub const MONTHLY_TAX_ROUNDING_UNIT: Decimal = dec!(1);

pub const ANNUALIZATION_MONTHS: u8 = 12;
