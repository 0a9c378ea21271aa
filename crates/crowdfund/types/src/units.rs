//! Monetary amounts.
//!
//! The ledger only knows its indivisible minor unit. [`Wei`] carries that value
//! end to end; the decimal major-unit form is produced and parsed only for
//! display and user input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minor units per major unit (10^18).
pub const MINOR_UNITS_PER_MAJOR: u128 = 1_000_000_000_000_000_000;

/// Fractional digits representable in the major unit.
pub const MAJOR_UNIT_DECIMALS: usize = 18;

/// Fee the contract charges for opening a campaign, in major units.
pub const CAMPAIGN_CREATION_FEE_MAJOR: &str = "0.02";

/// Errors parsing a major-unit decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal amount")]
    Malformed(String),

    #[error("'{raw}' has more than {max_decimals} fractional digits")]
    TooPrecise { raw: String, max_decimals: usize },

    #[error("'{0}' does not fit in the ledger's amount range")]
    Overflow(String),
}

/// Amount in the ledger's minor unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub const fn new(minor: u128) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The fixed campaign creation fee (0.02 major units).
    pub const fn campaign_creation_fee() -> Self {
        Self(MINOR_UNITS_PER_MAJOR / 50)
    }

    /// Parse a non-negative major-unit decimal such as `"0.02"` or `"3"`.
    pub fn from_major_str(raw: &str) -> Result<Self, AmountError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
        {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }

        if fraction.len() > MAJOR_UNIT_DECIMALS {
            return Err(AmountError::TooPrecise {
                raw: trimmed.to_string(),
                max_decimals: MAJOR_UNIT_DECIMALS,
            });
        }

        let overflow = || AmountError::Overflow(trimmed.to_string());

        let whole_minor = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| overflow())?
                .checked_mul(MINOR_UNITS_PER_MAJOR)
                .ok_or_else(overflow)?
        };

        let fraction_minor = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = MAJOR_UNIT_DECIMALS);
            padded.parse::<u128>().map_err(|_| overflow())?
        };

        whole_minor
            .checked_add(fraction_minor)
            .map(Self)
            .ok_or_else(overflow)
    }

    /// Shortest decimal major-unit rendering (`"1.5"`, `"0.02"`, `"3"`).
    pub fn to_major_string(self) -> String {
        let whole = self.0 / MINOR_UNITS_PER_MAJOR;
        let fraction = self.0 % MINOR_UNITS_PER_MAJOR;
        if fraction == 0 {
            return whole.to_string();
        }
        let fraction = format!("{fraction:0width$}", width = MAJOR_UNIT_DECIMALS);
        format!("{}.{}", whole, fraction.trim_end_matches('0'))
    }

    /// Cost of `units` pledges at this per-unit price.
    pub fn checked_mul(self, units: u64) -> Option<Self> {
        self.0.checked_mul(u128::from(units)).map(Self)
    }

    pub fn checked_add(self, other: Wei) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Wei) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

/// Serde adapter writing a [`Wei`] as a major-unit decimal string.
///
/// Used for human-edited configuration (TOML has no 128-bit integers).
pub mod as_major {
    use super::Wei;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &Wei, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_major_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Wei, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Wei::from_major_str(&raw).map_err(serde::de::Error::custom)
    }
}
