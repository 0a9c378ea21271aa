//! Shared vocabulary of the crowdfund client.
//!
//! Everything that crosses a component boundary lives here: canonical
//! identities, minor-unit amounts, the campaign record as the ledger reports it,
//! the gateway error taxonomy and the status messages surfaced to the user.
//!
//! Amounts are carried in the ledger's minor unit everywhere. Conversion to the
//! human-facing major unit (10^18 minor units) only happens at presentation.

#![deny(unsafe_code)]

pub mod campaign;
pub mod config;
pub mod error;
pub mod identity;
pub mod status;
pub mod units;

pub use campaign::{Campaign, CampaignId, CampaignRecord, CampaignState, RecordError};
pub use config::{ClientConfig, DEFAULT_PRIVILEGED_IDENTITY};
pub use error::GatewayError;
pub use identity::{Identity, IdentityError};
pub use status::{StatusKind, StatusLevel, StatusMessage, CONNECT_WALLET};
pub use units::{
    AmountError, Wei, CAMPAIGN_CREATION_FEE_MAJOR, MAJOR_UNIT_DECIMALS, MINOR_UNITS_PER_MAJOR,
};
