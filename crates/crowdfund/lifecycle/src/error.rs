use crate::action::Action;
use crowdfund_policy::Denial;
use crowdfund_types::{CampaignId, GatewayError, StatusMessage};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("no wallet identity is connected")]
    NotConnected,

    #[error("{action} is not permitted: {denial}")]
    NotPermitted { action: Action, denial: Denial },

    #[error("campaign {0} is not in the current projection")]
    CampaignNotFound(CampaignId),

    #[error("{action}: {message}")]
    InvalidInput { action: Action, message: String },

    #[error("{action} failed: {source}")]
    Write {
        action: Action,
        #[source]
        source: GatewayError,
    },
}

impl LifecycleError {
    pub(crate) fn denied(action: Action, denial: Denial) -> Self {
        match denial {
            Denial::NotConnected => Self::NotConnected,
            denial => Self::NotPermitted { action, denial },
        }
    }

    pub(crate) fn invalid(action: Action, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            action,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusMessage {
        match self {
            Self::NotConnected => StatusMessage::connect_wallet(),
            Self::NotPermitted { denial, .. } => StatusMessage::error(denial.to_string()),
            Self::CampaignNotFound(id) => {
                StatusMessage::error(format!("Campaign {id} is not listed. Reload and try again."))
            }
            Self::InvalidInput { message, .. } => StatusMessage::error(message.clone()),
            Self::Write { action, .. } => StatusMessage::error(action.failure_text()),
        }
    }
}
