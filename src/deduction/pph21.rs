//! PPh-21 on monthly employment income.
//!
//! Tax is computed on the annualized income and divided back to a monthly figure:
//! gross × months, minus the capped occupational cost and the employee's own BPJS,
//! minus PTKP, rounded down to the taxable unit, then run through the marginal
//! brackets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    consts,
    error::ConfigurationError,
    utils::{floor_to_unit, percent_of, round_to_unit},
};

use super::{bracket::{BracketSlice, BracketTable}, ptkp::{PtkpCode, PtkpTable}};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Percent of annual gross allowed as occupational cost (biaya jabatan)
    pub occupational_cost_rate: Decimal,
    /// Ceiling on the occupational cost for a full year, scaled down for shorter ones
    pub occupational_cost_cap: Decimal,
    pub taxable_rounding_unit: Decimal,
    pub monthly_rounding_unit: Decimal,
    pub annualization_months: u8,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            occupational_cost_rate: consts::OCCUPATIONAL_COST_RATE,
            occupational_cost_cap: consts::OCCUPATIONAL_COST_CAP,
            taxable_rounding_unit: consts::TAXABLE_ROUNDING_UNIT,
            monthly_rounding_unit: consts::MONTHLY_TAX_ROUNDING_UNIT,
            annualization_months: consts::ANNUALIZATION_MONTHS,
        }
    }
}

pub fn validate_months(months: u8) -> Result<u8, ConfigurationError> {
    if (1..=12).contains(&months) {
        Ok(months)
    } else {
        Err(ConfigurationError::InvalidPolicy {
            key: "annualization_months".to_string(),
            value: months.to_string(),
        })
    }
}

impl TaxPolicy {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |key: &str, value: Decimal| ConfigurationError::InvalidPolicy {
            key: key.to_string(),
            value: value.to_string(),
        };

        if self.occupational_cost_rate < Decimal::ZERO || self.occupational_cost_rate > Decimal::ONE_HUNDRED {
            return Err(ConfigurationError::RateOutOfRange {
                what: "occupational cost".to_string(),
                rate: self.occupational_cost_rate,
            });
        }

        if self.occupational_cost_cap < Decimal::ZERO {
            return Err(invalid("occupational_cost_cap", self.occupational_cost_cap));
        }

        if self.taxable_rounding_unit <= Decimal::ZERO {
            return Err(invalid("taxable_rounding_unit", self.taxable_rounding_unit));
        }

        if self.monthly_rounding_unit <= Decimal::ZERO {
            return Err(invalid("monthly_rounding_unit", self.monthly_rounding_unit));
        }

        validate_months(self.annualization_months)?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub annualization_months: u8,
    pub gross_annual: Decimal,
    pub occupational_cost: Decimal,
    pub employee_bpjs_annual: Decimal,
    pub net_annual: Decimal,
    pub ptkp_code: PtkpCode,
    pub ptkp_threshold: Decimal,
    /// PKP after rounding down
    pub taxable_income: Decimal,
    pub brackets: Vec<BracketSlice>,
    pub annual_tax: Decimal,
    pub monthly_tax: Decimal,
}

/// Fails only when `ptkp_code` is missing from the table.
pub fn compute_pph21(
    gross_monthly: Decimal,
    employee_bpjs_monthly: Decimal,
    ptkp_code: PtkpCode,
    months: u8,
    ptkp: &PtkpTable,
    brackets: &BracketTable,
    policy: &TaxPolicy,
) -> Result<TaxBreakdown, ConfigurationError> {
    let months = validate_months(months)?;
    let ptkp_threshold = ptkp.lookup(ptkp_code)?;
    let multiplier = Decimal::from(months);

    let gross_annual = gross_monthly.max(Decimal::ZERO) * multiplier;
    let occupational_cost_cap = policy.occupational_cost_cap * multiplier / Decimal::from(consts::ANNUALIZATION_MONTHS);
    let occupational_cost = percent_of(gross_annual, policy.occupational_cost_rate).min(occupational_cost_cap);
    let employee_bpjs_annual = employee_bpjs_monthly * multiplier;
    let net_annual = gross_annual - occupational_cost - employee_bpjs_annual;

    let taxable_income = floor_to_unit((net_annual - ptkp_threshold).max(Decimal::ZERO), policy.taxable_rounding_unit);

    let brackets = brackets.slices(taxable_income);
    let annual_tax = brackets.iter().map(|slice| slice.tax).sum::<Decimal>();
    let monthly_tax = round_to_unit(annual_tax / multiplier, policy.monthly_rounding_unit);

    Ok(TaxBreakdown {
        annualization_months: months,
        gross_annual,
        occupational_cost,
        employee_bpjs_annual,
        net_annual,
        ptkp_code,
        ptkp_threshold,
        taxable_income,
        brackets,
        annual_tax,
        monthly_tax,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn code(s: &str) -> PtkpCode {
        s.parse().unwrap()
    }

    fn compute(gross: Decimal, bpjs: Decimal, ptkp_code: &str) -> TaxBreakdown {
        compute_pph21(gross, bpjs, code(ptkp_code), 12, &PtkpTable::default(), &BracketTable::default(), &TaxPolicy::default()).unwrap()
    }

    #[test]
    fn test_single_bracket() {
        let tax = compute(dec!(10000000), dec!(400000), "TK/0");

        assert_eq!(tax.gross_annual, dec!(120000000));
        assert_eq!(tax.occupational_cost, dec!(6000000));
        assert_eq!(tax.employee_bpjs_annual, dec!(4800000));
        assert_eq!(tax.net_annual, dec!(109200000));
        assert_eq!(tax.taxable_income, dec!(55200000));
        assert_eq!(tax.brackets.len(), 1);
        assert_eq!(tax.annual_tax, dec!(2760000));
        assert_eq!(tax.monthly_tax, dec!(230000));
    }

    #[test]
    fn test_two_brackets_with_rounded_pkp() {
        let tax = compute(dec!(25000000), dec!(720423), "K/1");

        assert_eq!(tax.employee_bpjs_annual, dec!(8645076));
        assert_eq!(tax.net_annual, dec!(285354924));
        assert_eq!(tax.ptkp_threshold, dec!(63000000));
        assert_eq!(tax.taxable_income, dec!(222354000));
        assert_eq!(tax.annual_tax, dec!(27353100));
        assert_eq!(tax.monthly_tax, dec!(2279425));
    }

    #[test]
    fn test_occupational_cost_below_cap() {
        let tax = compute(dec!(5000000), dec!(0), "TK/0");

        // 5% of 60,000,000 stays under the 6,000,000 cap
        assert_eq!(tax.occupational_cost, dec!(3000000));
        assert_eq!(tax.taxable_income, dec!(3000000));
        assert_eq!(tax.monthly_tax, dec!(12500));
    }

    #[test]
    fn test_income_below_ptkp() {
        let tax = compute(dec!(4000000), dec!(160000), "K/2");

        assert_eq!(tax.taxable_income, dec!(0));
        assert!(tax.brackets.is_empty());
        assert_eq!(tax.monthly_tax, dec!(0));
    }

    #[test]
    fn test_reference_pkp_lands_in_first_bracket() {
        // Sample payroll figure: PKP 4,031,124 taxed at 5% only, about 16,796 a month
        let ptkp = PtkpTable::new([(code("K/2"), dec!(63000000))]).unwrap();
        let policy = TaxPolicy {
            occupational_cost_rate: dec!(0),
            ..Default::default()
        };
        let gross_monthly = (dec!(63000000) + dec!(4031124)) / dec!(12);

        let tax = compute_pph21(gross_monthly, dec!(0), code("K/2"), 12, &ptkp, &BracketTable::default(), &policy).unwrap();

        assert_eq!(tax.taxable_income, dec!(4031000));
        assert_eq!(tax.brackets.len(), 1);
        assert_eq!(tax.annual_tax, dec!(201550));
        assert!((tax.monthly_tax - dec!(16796)).abs() <= policy.monthly_rounding_unit);
    }

    #[test]
    fn test_partial_year() {
        let full = compute(dec!(10000000), dec!(400000), "TK/0");
        let partial = compute_pph21(dec!(10000000), dec!(400000), code("TK/0"), 6, &PtkpTable::default(), &BracketTable::default(), &TaxPolicy::default()).unwrap();

        assert_eq!(partial.gross_annual, dec!(60000000));
        // 60,000,000 - 3,000,000 - 2,400,000 - 54,000,000 = 600,000
        assert_eq!(partial.taxable_income, dec!(600000));
        assert_eq!(partial.monthly_tax, dec!(5000));
        assert!(partial.monthly_tax < full.monthly_tax);
    }

    #[test]
    fn test_partial_year_occupational_cap_scales() {
        let partial = compute_pph21(dec!(20000000), dec!(0), code("TK/0"), 6, &PtkpTable::default(), &BracketTable::default(), &TaxPolicy::default()).unwrap();

        // 500,000 a month for 6 months
        assert_eq!(partial.gross_annual, dec!(120000000));
        assert_eq!(partial.occupational_cost, dec!(3000000));
        assert_eq!(partial.taxable_income, dec!(63000000));
        assert_eq!(partial.annual_tax, dec!(3450000));
        assert_eq!(partial.monthly_tax, dec!(575000));
    }

    #[test]
    fn test_unknown_code() {
        let ptkp = PtkpTable::new([(code("TK/0"), dec!(54000000))]).unwrap();
        let result = compute_pph21(dec!(10000000), dec!(0), code("K/3"), 12, &ptkp, &BracketTable::default(), &TaxPolicy::default());

        assert_eq!(result, Err(ConfigurationError::UnknownPtkpCode("K/3".to_string())));
    }

    #[test]
    fn test_zero_gross() {
        let tax = compute(dec!(0), dec!(0), "TK/0");

        assert_eq!(tax.annual_tax, dec!(0));
        assert_eq!(tax.monthly_tax, dec!(0));
    }

    #[test]
    fn test_invalid_months() {
        let result = compute_pph21(dec!(1), dec!(0), code("TK/0"), 0, &PtkpTable::default(), &BracketTable::default(), &TaxPolicy::default());
        assert!(matches!(result, Err(ConfigurationError::InvalidPolicy { .. })));

        let policy = TaxPolicy {
            annualization_months: 13,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rounding_units_must_be_positive() {
        for (taxable, monthly) in [(dec!(0), dec!(1)), (dec!(1000), dec!(0)), (dec!(-1000), dec!(1))] {
            let policy = TaxPolicy {
                taxable_rounding_unit: taxable,
                monthly_rounding_unit: monthly,
                ..Default::default()
            };

            assert!(matches!(policy.validate(), Err(ConfigurationError::InvalidPolicy { .. })));
        }

        assert_eq!(TaxPolicy::default().validate(), Ok(()));
    }
}
