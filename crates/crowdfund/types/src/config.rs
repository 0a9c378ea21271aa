//! Client configuration.

use crate::identity::Identity;
use crate::units::{as_major, Wei};
use serde::{Deserialize, Serialize};

/// Identity always treated as the administrative owner, whatever the ledger reports.
pub const DEFAULT_PRIVILEGED_IDENTITY: &str = "0x153dfef4355E823dCB0FCc76Efe942BefCa86477";

/// Settings shared by every client component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Hardcoded privileged identity.
    pub privileged_identity: Identity,

    /// Fee attached to `createCampaign`, written in major units.
    #[serde(with = "as_major")]
    pub creation_fee: Wei,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            privileged_identity: Identity::from_canonical(DEFAULT_PRIVILEGED_IDENTITY),
            creation_fee: Wei::campaign_creation_fee(),
        }
    }
}
