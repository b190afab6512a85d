//! Statutory deductions: BPJS contributions and PPh-21.
//!
//! The engine applies the rate tables but does not own them. Tables are handed in
//! as an already validated [`RateTables`] snapshot that stays immutable for the
//! whole payroll run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ComputationWarning, ConfigurationError};

mod bpjs;
mod bracket;
mod pph21;
mod ptkp;

pub use bpjs::{BpjsBreakdown, BpjsContribution, BpjsProgram, BpjsRate, BpjsRateTable};
pub use bracket::{BracketSlice, BracketTable, TaxBracket};
pub use pph21::{compute_pph21, validate_months, TaxBreakdown, TaxPolicy};
pub use ptkp::{MaritalStatus, PtkpCode, PtkpTable, MAX_DEPENDENTS};

/// Wage the BPJS rates are applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpjsBasis {
    #[default]
    GrossPay,
    /// Base salary plus fixed allowances, leaving out overtime and premiums
    BasePlusFixedAllowances,
}

/// Read-only master tables for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTables {
    pub ptkp: PtkpTable,
    pub brackets: BracketTable,
    pub bpjs: BpjsRateTable,
}

impl RateTables {
    /// Validates raw master rows into a snapshot. Any broken table aborts the run.
    pub fn load(
        ptkp: impl IntoIterator<Item = (PtkpCode, Decimal)>,
        brackets: Vec<TaxBracket>,
        bpjs: Vec<BpjsRate>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            ptkp: PtkpTable::new(ptkp)?,
            brackets: BracketTable::new(brackets)?,
            bpjs: BpjsRateTable::new(bpjs)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub bpjs: BpjsBreakdown,
    pub bpjs_employee: Decimal,
    pub bpjs_employer: Decimal,
    pub pph21_monthly: Decimal,
    pub tax: TaxBreakdown,
    pub warnings: Vec<ComputationWarning>,
}

#[derive(Debug, Clone, Copy)]
pub struct DeductionEngine<'a> {
    tables: &'a RateTables,
    policy: &'a TaxPolicy,
}

impl<'a> DeductionEngine<'a> {
    pub fn new(tables: &'a RateTables, policy: &'a TaxPolicy) -> Self {
        Self { tables, policy }
    }

    pub fn compute_deductions(
        &self,
        gross_monthly: Decimal,
        ptkp_code: PtkpCode,
        bpjs_base: Decimal,
    ) -> Result<Deductions, ConfigurationError> {
        self.compute_deductions_annualized(gross_monthly, ptkp_code, bpjs_base, self.policy.annualization_months)
    }

    /// Same as [`Self::compute_deductions`] with the annualization months overridden.
    pub fn compute_deductions_annualized(
        &self,
        gross_monthly: Decimal,
        ptkp_code: PtkpCode,
        bpjs_base: Decimal,
        months: u8,
    ) -> Result<Deductions, ConfigurationError> {
        let mut warnings = Vec::new();

        if gross_monthly <= Decimal::ZERO {
            warn!(%gross_monthly, %ptkp_code, "non-positive gross income, no tax withheld");
            warnings.push(ComputationWarning::NonPositiveGrossIncome { gross: gross_monthly });
        }

        let bpjs = self.tables.bpjs.compute(bpjs_base);

        let tax = compute_pph21(
            gross_monthly,
            bpjs.employee_total,
            ptkp_code,
            months,
            &self.tables.ptkp,
            &self.tables.brackets,
            self.policy,
        )?;

        Ok(Deductions {
            bpjs_employee: bpjs.employee_total,
            bpjs_employer: bpjs.employer_total,
            pph21_monthly: tax.monthly_tax,
            bpjs,
            tax,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn code(s: &str) -> PtkpCode {
        s.parse().unwrap()
    }

    #[test]
    fn test_compute_deductions() {
        let tables = RateTables::default();
        let policy = TaxPolicy::default();
        let engine = DeductionEngine::new(&tables, &policy);

        let deductions = engine.compute_deductions(dec!(25000000), code("K/1"), dec!(25000000)).unwrap();

        assert_eq!(deductions.bpjs_employee, dec!(720423));
        assert_eq!(deductions.bpjs_employer, dec!(1740846));
        assert_eq!(deductions.pph21_monthly, dec!(2279425));
        assert!(deductions.warnings.is_empty());
    }

    #[test]
    fn test_bpjs_base_differs_from_gross() {
        let tables = RateTables::default();
        let policy = TaxPolicy::default();
        let engine = DeductionEngine::new(&tables, &policy);

        let deductions = engine.compute_deductions(dec!(12000000), code("TK/0"), dec!(10000000)).unwrap();

        assert_eq!(deductions.bpjs_employee, dec!(400000));
        assert_eq!(deductions.tax.gross_annual, dec!(144000000));
    }

    #[test]
    fn test_zero_income_is_a_warning() {
        let tables = RateTables::default();
        let policy = TaxPolicy::default();
        let engine = DeductionEngine::new(&tables, &policy);

        let deductions = engine.compute_deductions(dec!(0), code("TK/0"), dec!(0)).unwrap();

        assert_eq!(deductions.pph21_monthly, dec!(0));
        assert_eq!(deductions.bpjs_employee, dec!(0));
        assert_eq!(deductions.warnings, vec![ComputationWarning::NonPositiveGrossIncome { gross: dec!(0) }]);
    }

    #[test]
    fn test_load_fails_fast() {
        let gap = vec![
            TaxBracket { min: dec!(0), max: Some(dec!(60000000)), rate: dec!(5) },
            TaxBracket { min: dec!(70000000), max: None, rate: dec!(15) },
        ];

        let result = RateTables::load(PtkpTable::default().iter(), gap, BpjsRateTable::default().rates().to_vec());

        assert!(matches!(result, Err(ConfigurationError::BracketTableGapOrOverlap { .. })));
    }

    #[test]
    fn test_unknown_ptkp_code() {
        let tables = RateTables {
            ptkp: PtkpTable::new([(code("TK/0"), dec!(54000000))]).unwrap(),
            ..Default::default()
        };
        let policy = TaxPolicy::default();
        let engine = DeductionEngine::new(&tables, &policy);

        assert_eq!(
            engine.compute_deductions(dec!(10000000), code("K/0"), dec!(10000000)),
            Err(ConfigurationError::UnknownPtkpCode("K/0".to_string()))
        );
    }
}
