use crowdfund_gateway::WriteReceipt;
use crowdfund_registry::{RegistryError, ReloadOutcome};
use crowdfund_types::StatusMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-triggered write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Pledge,
    Cancel,
    Fulfill,
    ClaimRefunds,
    CreateCampaign,
    WithdrawFees,
    ChangeOwner,
    BanEntrepreneur,
    DestroyContract,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pledge => "pledge",
            Self::Cancel => "cancel",
            Self::Fulfill => "fulfill",
            Self::ClaimRefunds => "claim",
            Self::CreateCampaign => "create campaign",
            Self::WithdrawFees => "withdraw",
            Self::ChangeOwner => "change owner",
            Self::BanEntrepreneur => "ban entrepreneur",
            Self::DestroyContract => "destroy contract",
        }
    }

    /// Shown while the write is in flight.
    pub fn pending_text(self) -> &'static str {
        match self {
            Self::ClaimRefunds => "Processing claim...",
            Self::CreateCampaign => "Transaction is being processed...",
            Self::WithdrawFees => "Processing withdrawal...",
            Self::ChangeOwner => "Processing owner change...",
            Self::BanEntrepreneur => "Processing ban...",
            Self::DestroyContract => "Destroying contract...",
            Self::Pledge | Self::Cancel | Self::Fulfill => "Transaction is being processed...",
        }
    }

    pub fn success_text(self) -> &'static str {
        match self {
            Self::Pledge => "Pledge successful!",
            Self::Cancel => "Campaign successfully cancelled!",
            Self::Fulfill => "Campaign successfully fulfilled!",
            Self::ClaimRefunds => "Claim successful!",
            Self::CreateCampaign => "Campaign successfully created!",
            Self::WithdrawFees => "Withdrawal successful!",
            Self::ChangeOwner => "Owner changed successfully!",
            Self::BanEntrepreneur => "Entrepreneur banned successfully!",
            Self::DestroyContract => {
                "Contract destroyed successfully! No new campaigns can be created."
            }
        }
    }

    pub fn failure_text(self) -> &'static str {
        match self {
            Self::Pledge => "There was an error processing your pledge.",
            Self::Cancel => "There was an error canceling the campaign.",
            Self::Fulfill => "There was an error fulfilling the campaign.",
            Self::ClaimRefunds => "Claim failed. Please try again.",
            Self::CreateCampaign => "There was an error creating the campaign.",
            Self::WithdrawFees => "Error during withdrawal. Please try again.",
            Self::ChangeOwner => "Error changing owner. Please try again.",
            Self::BanEntrepreneur => "Error banning entrepreneur. Please try again.",
            Self::DestroyContract => "Error destroying contract. Please try again.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A settled write and the reload that followed it.
#[derive(Debug, Clone)]
pub struct ActionReceipt {
    pub action: Action,
    pub receipt: WriteReceipt,
    pub reload: Result<ReloadOutcome, RegistryError>,
}

impl ActionReceipt {
    pub fn status(&self) -> StatusMessage {
        StatusMessage::success(self.action.success_text())
    }
}
