//! User-visible status messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown while no wallet identity is available.
pub const CONNECT_WALLET: &str = "Please connect your wallet.";

/// How long a message stays relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Holds until the underlying condition clears (no wallet connected).
    Persistent,
    /// Describes the outcome of a single attempt.
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn connect_wallet() -> Self {
        Self {
            kind: StatusKind::Persistent,
            level: StatusLevel::Error,
            text: CONNECT_WALLET.to_string(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::transient(StatusLevel::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::transient(StatusLevel::Error, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::transient(StatusLevel::Info, text)
    }

    fn transient(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Transient,
            level,
            text: text.into(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.kind == StatusKind::Persistent
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
