//! Client-side campaign projection.
//!
//! The [`CampaignRegistry`] rebuilds a [`Projection`] of every campaign on the
//! ledger, plus the current identity's pledges and refundable investments,
//! from scratch on every reload. A reload either replaces the projection in
//! full or leaves the previous one untouched.

#![deny(unsafe_code)]

pub mod error;
pub mod projection;
pub mod registry;

pub use error::{RegistryError, Result};
pub use projection::Projection;
pub use registry::{CampaignRegistry, ReloadOutcome};
