use std::{collections::BTreeMap, fmt, str::FromStr};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

pub const MAX_DEPENDENTS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaritalStatus {
    /// TK, tidak kawin
    Single,
    /// K, kawin
    Married,
    /// K/I, married with the spouse's income combined
    MarriedCombined,
}

impl MaritalStatus {
    fn prefix(self) -> &'static str {
        match self {
            MaritalStatus::Single => "TK",
            MaritalStatus::Married => "K",
            MaritalStatus::MarriedCombined => "K/I",
        }
    }
}

/// Marital/dependent status such as `TK/0`, `K/2` or `K/I/3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PtkpCode {
    pub status: MaritalStatus,
    pub dependents: u8,
}

impl PtkpCode {
    pub const fn new(status: MaritalStatus, dependents: u8) -> Self {
        Self { status, dependents }
    }
}

impl fmt::Display for PtkpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.status.prefix(), self.dependents)
    }
}

impl FromStr for PtkpCode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigurationError::UnknownPtkpCode(s.to_string());

        let normalized = s.trim().to_ascii_uppercase();
        let (prefix, dependents) = normalized.rsplit_once('/').ok_or_else(unknown)?;

        let status = match prefix {
            "TK" => MaritalStatus::Single,
            "K" => MaritalStatus::Married,
            "K/I" => MaritalStatus::MarriedCombined,
            _ => return Err(unknown()),
        };

        if dependents.is_empty() || !dependents.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unknown());
        }

        let dependents = dependents.parse::<u8>().map_err(|_| unknown())?;
        if dependents > MAX_DEPENDENTS {
            return Err(unknown());
        }

        Ok(Self { status, dependents })
    }
}

impl From<PtkpCode> for String {
    fn from(code: PtkpCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for PtkpCode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Annual non-taxable thresholds per status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtkpTable {
    thresholds: BTreeMap<PtkpCode, Decimal>,
}

impl PtkpTable {
    /// Thresholds must be non-negative, codes unique, and within a marital status
    /// a threshold may never drop as dependents increase.
    pub fn new(entries: impl IntoIterator<Item = (PtkpCode, Decimal)>) -> Result<Self, ConfigurationError> {
        let mut thresholds = BTreeMap::new();

        for (code, threshold) in entries {
            if threshold < Decimal::ZERO {
                return Err(ConfigurationError::InvalidPolicy {
                    key: format!("ptkp {code}"),
                    value: threshold.to_string(),
                });
            }

            if thresholds.insert(code, threshold).is_some() {
                return Err(ConfigurationError::DuplicatePtkpCode(code.to_string()));
            }
        }

        // BTreeMap iterates by (status, dependents) so neighbours share a status
        let mut previous: Option<(PtkpCode, Decimal)> = None;
        for (code, threshold) in &thresholds {
            if let Some((previous_code, previous_threshold)) = previous {
                if previous_code.status == code.status && *threshold < previous_threshold {
                    return Err(ConfigurationError::NonMonotonicPtkp { code: code.to_string() });
                }
            }

            previous = Some((*code, *threshold));
        }

        Ok(Self { thresholds })
    }

    pub fn lookup(&self, code: PtkpCode) -> Result<Decimal, ConfigurationError> {
        self.thresholds
            .get(&code)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownPtkpCode(code.to_string()))
    }

    pub fn contains(&self, code: PtkpCode) -> bool {
        self.thresholds.contains_key(&code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PtkpCode, Decimal)> + '_ {
        self.thresholds.iter().map(|(code, threshold)| (*code, *threshold))
    }
}

impl Default for PtkpTable {
    /// PMK 101/PMK.010/2016 thresholds
    fn default() -> Self {
        let personal = dec!(54000000);
        let per_step = dec!(4500000);

        let mut thresholds = BTreeMap::new();
        for dependents in 0..=MAX_DEPENDENTS {
            let extra = per_step * Decimal::from(dependents);

            thresholds.insert(PtkpCode::new(MaritalStatus::Single, dependents), personal + extra);
            thresholds.insert(PtkpCode::new(MaritalStatus::Married, dependents), personal + per_step + extra);
            thresholds.insert(PtkpCode::new(MaritalStatus::MarriedCombined, dependents), personal * dec!(2) + per_step + extra);
        }

        Self { thresholds }
    }
}
