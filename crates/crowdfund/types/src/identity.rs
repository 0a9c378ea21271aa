//! Identity normalization.
//!
//! Wallets and the ledger report addresses in mixed (checksummed) case. An
//! [`Identity`] only exists in canonical lowercase form, so two identities are
//! equal exactly when the addresses they were parsed from are equal ignoring case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hex digits in an address, excluding the `0x` prefix.
const ADDRESS_HEX_DIGITS: usize = 40;

/// Reasons an externally supplied address is not an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity is empty")]
    Empty,

    #[error("identity '{0}' is missing the 0x prefix")]
    MissingPrefix(String),

    #[error("identity '{raw}' must have {expected} hex digits, found {found}")]
    BadLength {
        raw: String,
        expected: usize,
        found: usize,
    },

    #[error("identity '{0}' contains non-hex characters")]
    NotHex(String),
}

/// Canonical participant address (`0x` + 40 lowercase hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Canonicalize an address. Surrounding whitespace is ignored, case is not significant.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| IdentityError::MissingPrefix(trimmed.to_string()))?;

        if digits.len() != ADDRESS_HEX_DIGITS {
            return Err(IdentityError::BadLength {
                raw: trimmed.to_string(),
                expected: ADDRESS_HEX_DIGITS,
                found: digits.len(),
            });
        }

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentityError::NotHex(trimmed.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Wrap a literal already known to be canonical.
    pub(crate) fn from_canonical(canonical: &str) -> Self {
        Self(canonical.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `raw` names this identity. Unparseable input never matches.
    pub fn matches(&self, raw: &str) -> bool {
        Identity::parse(raw).is_ok_and(|other| other == *self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_ignores_case() {
        let upper = Identity::parse("0xABC0000000000000000000000000000000000001").unwrap();
        let lower = Identity::parse("0xabc0000000000000000000000000000000000001").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "0xabc0000000000000000000000000000000000001");
        assert!(lower.matches("0xAbC0000000000000000000000000000000000001"));
    }

    #[test]
    fn whitespace_and_prefix_case_are_tolerated() {
        let id = Identity::parse("  0X153dfef4355E823dCB0FCc76Efe942BefCa86477 ").unwrap();
        assert_eq!(id.as_str(), "0x153dfef4355e823dcb0fcc76efe942befca86477");
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert_eq!(Identity::parse("   "), Err(IdentityError::Empty));
        assert!(matches!(
            Identity::parse("153dfef4355E823dCB0FCc76Efe942BefCa86477"),
            Err(IdentityError::MissingPrefix(_))
        ));
        assert!(matches!(
            Identity::parse("0x1234"),
            Err(IdentityError::BadLength { found: 4, .. })
        ));
        assert!(matches!(
            Identity::parse("0xZZZ0000000000000000000000000000000000001"),
            Err(IdentityError::NotHex(_))
        ));
        assert!(!Identity::parse("0xabc0000000000000000000000000000000000001")
            .unwrap()
            .matches("not-an-address"));
    }

    #[test]
    fn serde_normalizes_on_the_way_in() {
        let id: Identity =
            serde_json::from_str("\"0xABC0000000000000000000000000000000000001\"").unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"0xabc0000000000000000000000000000000000001\""
        );
        assert!(serde_json::from_str::<Identity>("\"0x12\"").is_err());
    }
}
