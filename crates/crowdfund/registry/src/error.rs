use crowdfund_types::{CampaignId, CampaignState, GatewayError, RecordError, StatusMessage};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Why a reload was abandoned. The previous projection stays in place for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("ledger read failed: {0}")]
    Read(#[from] GatewayError),

    #[error("malformed campaign record: {0}")]
    Record(#[from] RecordError),

    #[error("campaign {id} was {observed} and is now reported as {reported}")]
    TerminalStateRegression {
        id: CampaignId,
        observed: CampaignState,
        reported: CampaignState,
    },

    #[error("campaign {id} breaks the pledge invariant: {detail}")]
    InvariantViolation { id: CampaignId, detail: String },

    #[error("ledger reports {reported} campaigns after {previous} were observed")]
    CampaignCountRegressed { previous: u64, reported: u64 },
}

impl RegistryError {
    /// Whether the ledger answered with data the projection cannot accept,
    /// as opposed to not answering at all.
    pub fn is_stale_read(&self) -> bool {
        matches!(
            self,
            Self::TerminalStateRegression { .. } | Self::CampaignCountRegressed { .. }
        )
    }

    pub fn status(&self) -> StatusMessage {
        if self.is_stale_read() {
            StatusMessage::error("Error loading campaigns. The ledger returned outdated data.")
        } else {
            StatusMessage::error("Error loading campaigns.")
        }
    }
}
