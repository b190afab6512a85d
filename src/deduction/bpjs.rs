use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigurationError, utils::{floor_to_unit, percent_of}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpjsProgram {
    /// BPJS Kesehatan
    Health,
    /// Jaminan Kecelakaan Kerja, work accident
    Jkk,
    /// Jaminan Kematian, death
    Jkm,
    /// Jaminan Hari Tua, old age
    Jht,
    /// Jaminan Pensiun, pension
    Jp,
}

impl BpjsProgram {
    pub const ALL: [BpjsProgram; 5] = [
        BpjsProgram::Health,
        BpjsProgram::Jkk,
        BpjsProgram::Jkm,
        BpjsProgram::Jht,
        BpjsProgram::Jp,
    ];
}

impl fmt::Display for BpjsProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BpjsProgram::Health => "BPJS Kesehatan",
            BpjsProgram::Jkk => "JKK",
            BpjsProgram::Jkm => "JKM",
            BpjsProgram::Jht => "JHT",
            BpjsProgram::Jp => "JP",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpjsRate {
    pub program: BpjsProgram,
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    /// Ceiling on the wage the rates apply to
    pub salary_cap: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpjsContribution {
    pub program: BpjsProgram,
    pub base: Decimal,
    pub employee: Decimal,
    pub employer: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BpjsBreakdown {
    pub contributions: Vec<BpjsContribution>,
    pub employee_total: Decimal,
    pub employer_total: Decimal,
}

/// One rate per program, every program present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpjsRateTable {
    rates: Vec<BpjsRate>,
}

impl BpjsRateTable {
    pub fn new(mut rates: Vec<BpjsRate>) -> Result<Self, ConfigurationError> {
        rates.sort_by_key(|rate| rate.program);

        for pair in rates.windows(2) {
            if pair[0].program == pair[1].program {
                return Err(ConfigurationError::DuplicateBpjsRate(pair[0].program));
            }
        }

        for program in BpjsProgram::ALL {
            if !rates.iter().any(|rate| rate.program == program) {
                return Err(ConfigurationError::MissingBpjsRate(program));
            }
        }

        for rate in &rates {
            for (side, value) in [("employee", rate.employee_rate), ("employer", rate.employer_rate)] {
                if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                    return Err(ConfigurationError::RateOutOfRange {
                        what: format!("{} {side}", rate.program),
                        rate: value,
                    });
                }
            }

            if let Some(cap) = rate.salary_cap {
                if cap <= Decimal::ZERO {
                    return Err(ConfigurationError::InvalidPolicy {
                        key: format!("{} salary cap", rate.program),
                        value: cap.to_string(),
                    });
                }
            }
        }

        Ok(Self { rates })
    }

    pub fn rates(&self) -> &[BpjsRate] {
        &self.rates
    }

    /// Contributions on a monthly wage. Each side is rounded down to whole rupiah
    /// so a capped contribution never exceeds `cap × rate`.
    pub fn compute(&self, monthly_base: Decimal) -> BpjsBreakdown {
        let monthly_base = monthly_base.max(Decimal::ZERO);

        let contributions = self.rates.iter()
            .map(|rate| {
                let base = rate.salary_cap.map_or(monthly_base, |cap| monthly_base.min(cap));

                BpjsContribution {
                    program: rate.program,
                    base,
                    employee: floor_to_unit(percent_of(base, rate.employee_rate), Decimal::ONE),
                    employer: floor_to_unit(percent_of(base, rate.employer_rate), Decimal::ONE),
                }
            })
            .collect::<Vec<_>>();

        BpjsBreakdown {
            employee_total: contributions.iter().map(|c| c.employee).sum(),
            employer_total: contributions.iter().map(|c| c.employer).sum(),
            contributions,
        }
    }
}

impl Default for BpjsRateTable {
    /// Statutory rates with the 2024 wage caps, JKK at the lowest risk class
    fn default() -> Self {
        let rate = |program, employee_rate, employer_rate, salary_cap| BpjsRate {
            program,
            employee_rate,
            employer_rate,
            salary_cap,
        };

        Self {
            rates: vec![
                rate(BpjsProgram::Health, dec!(1), dec!(4), Some(dec!(12000000))),
                rate(BpjsProgram::Jkk, dec!(0), dec!(0.24), None),
                rate(BpjsProgram::Jkm, dec!(0), dec!(0.30), None),
                rate(BpjsProgram::Jht, dec!(2), dec!(3.7), None),
                rate(BpjsProgram::Jp, dec!(1), dec!(2), Some(dec!(10042300))),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(breakdown: &BpjsBreakdown, program: BpjsProgram) -> &BpjsContribution {
        breakdown.contributions.iter().find(|c| c.program == program).unwrap()
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = BpjsRateTable::default();

        assert_eq!(BpjsRateTable::new(table.rates().to_vec()).unwrap(), table);
    }

    #[test]
    fn test_below_caps() {
        let breakdown = BpjsRateTable::default().compute(dec!(10000000));

        assert_eq!(breakdown.employee_total, dec!(400000));
        assert_eq!(breakdown.employer_total, dec!(1024000));
    }

    #[test]
    fn test_caps_apply_per_program() {
        let breakdown = BpjsRateTable::default().compute(dec!(25000000));

        let health = contribution(&breakdown, BpjsProgram::Health);
        assert_eq!(health.base, dec!(12000000));
        assert_eq!(health.employee, dec!(120000));
        assert_eq!(health.employer, dec!(480000));

        let pension = contribution(&breakdown, BpjsProgram::Jp);
        assert_eq!(pension.base, dec!(10042300));
        assert_eq!(pension.employee, dec!(100423));
        assert_eq!(pension.employer, dec!(200846));

        let old_age = contribution(&breakdown, BpjsProgram::Jht);
        assert_eq!(old_age.base, dec!(25000000));

        assert_eq!(breakdown.employee_total, dec!(720423));
        assert_eq!(breakdown.employer_total, dec!(1740846));
    }

    #[test]
    fn test_capped_contribution_never_exceeds_cap_rate() {
        let table = BpjsRateTable::default();

        for wage in [dec!(12000000), dec!(50000000), dec!(1000000000), dec!(999999999999)] {
            let breakdown = table.compute(wage);

            for rate in table.rates() {
                let Some(cap) = rate.salary_cap else { continue };
                let contribution = contribution(&breakdown, rate.program);

                assert!(contribution.employee <= percent_of(cap, rate.employee_rate));
                assert!(contribution.employer <= percent_of(cap, rate.employer_rate));
            }
        }
    }

    #[test]
    fn test_rounds_down() {
        let table = BpjsRateTable::default();
        let breakdown = table.compute(dec!(3333333));

        // 0.24% of 3,333,333 = 7,999.9992
        assert_eq!(contribution(&breakdown, BpjsProgram::Jkk).employer, dec!(7999));
    }

    #[test]
    fn test_zero_and_negative_base() {
        let breakdown = BpjsRateTable::default().compute(dec!(-100));

        assert_eq!(breakdown.employee_total, dec!(0));
        assert_eq!(breakdown.employer_total, dec!(0));
    }

    #[test]
    fn test_rejects_invalid_tables() {
        let mut rates = BpjsRateTable::default().rates().to_vec();
        rates.pop();
        assert_eq!(BpjsRateTable::new(rates), Err(ConfigurationError::MissingBpjsRate(BpjsProgram::Jp)));

        let mut rates = BpjsRateTable::default().rates().to_vec();
        rates.push(rates[0].clone());
        assert_eq!(BpjsRateTable::new(rates), Err(ConfigurationError::DuplicateBpjsRate(BpjsProgram::Health)));

        let mut rates = BpjsRateTable::default().rates().to_vec();
        rates[3].employee_rate = dec!(120);
        assert!(matches!(BpjsRateTable::new(rates), Err(ConfigurationError::RateOutOfRange { .. })));
    }
}
