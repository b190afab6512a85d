use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigurationError, utils::percent_of};

/// `[min, max)` at a marginal `rate` percent. `max = None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

/// Part of the taxable income that fell into one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub taxable: Decimal,
    pub tax: Decimal,
}

/// Progressive brackets partitioning `[0, ∞)`, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(mut brackets: Vec<TaxBracket>) -> Result<Self, ConfigurationError> {
        brackets.sort_by(|a, b| a.min.cmp(&b.min));

        let Some(first) = brackets.first() else {
            return Err(ConfigurationError::EmptyBracketTable);
        };

        if !first.min.is_zero() {
            return Err(ConfigurationError::BracketTableNotFromZero(first.min));
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE_HUNDRED {
                return Err(ConfigurationError::RateOutOfRange {
                    what: format!("tax bracket {index}"),
                    rate: bracket.rate,
                });
            }

            match (bracket.max, index == last_index) {
                (None, true) => {}
                (Some(_), true) => return Err(ConfigurationError::BoundedLastBracket),
                (None, false) => return Err(ConfigurationError::UnboundedInnerBracket(index)),
                (Some(max), false) => {
                    if max <= bracket.min {
                        return Err(ConfigurationError::EmptyBracket(index));
                    }

                    let next = &brackets[index + 1];
                    if next.min != max {
                        return Err(ConfigurationError::BracketTableGapOrOverlap {
                            index: index + 1,
                            previous_max: max,
                            min: next.min,
                        });
                    }
                }
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Upper edges of every bounded bracket
    pub fn boundaries(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.brackets.iter().filter_map(|bracket| bracket.max)
    }

    /// Marginal tax on the income range `[from, to)`, kept exact.
    pub fn slices_between(&self, from: Decimal, to: Decimal) -> Vec<BracketSlice> {
        let from = from.max(Decimal::ZERO);
        let mut slices = Vec::new();

        for bracket in &self.brackets {
            if to <= bracket.min {
                break;
            }

            let lower = bracket.min.max(from);
            let upper = bracket.max.map_or(to, |max| max.min(to));
            if upper <= lower {
                continue;
            }

            let taxable = upper - lower;
            slices.push(BracketSlice {
                min: bracket.min,
                max: bracket.max,
                rate: bracket.rate,
                taxable,
                tax: percent_of(taxable, bracket.rate),
            });
        }

        slices
    }

    pub fn slices(&self, taxable_income: Decimal) -> Vec<BracketSlice> {
        self.slices_between(Decimal::ZERO, taxable_income)
    }

    pub fn tax(&self, taxable_income: Decimal) -> Decimal {
        self.slices(taxable_income).iter().map(|slice| slice.tax).sum()
    }
}

impl Default for BracketTable {
    /// Article 17 brackets as amended by UU HPP
    fn default() -> Self {
        let bracket = |min: Decimal, max: Option<Decimal>, rate: Decimal| TaxBracket { min, max, rate };

        Self {
            brackets: vec![
                bracket(dec!(0), Some(dec!(60000000)), dec!(5)),
                bracket(dec!(60000000), Some(dec!(250000000)), dec!(15)),
                bracket(dec!(250000000), Some(dec!(500000000)), dec!(25)),
                bracket(dec!(500000000), Some(dec!(5000000000)), dec!(30)),
                bracket(dec!(5000000000), None, dec!(35)),
            ],
        }
    }
}
