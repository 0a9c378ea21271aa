use crowdfund_types::CONNECT_WALLET;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an action is not offered to the current identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    #[error("{}", CONNECT_WALLET)]
    NotConnected,

    #[error("campaign is no longer live")]
    CampaignClosed,

    #[error("campaign has no pledges left")]
    NoPledgesLeft,

    #[error("campaign still needs pledges")]
    PledgesOutstanding,

    #[error("only the campaign's entrepreneur may do this")]
    NotEntrepreneur,

    #[error("no cancelled campaign holds a refundable investment")]
    NothingToClaim,

    #[error("the contract owner cannot create campaigns")]
    PrivilegedOwner,

    #[error("this account is banned from creating campaigns")]
    Banned,

    #[error("only the contract owner may administer the contract")]
    NotOwner,

    #[error("the contract is no longer active")]
    ContractInactive,
}
