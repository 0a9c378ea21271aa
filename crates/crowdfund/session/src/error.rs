use crowdfund_types::{GatewayError, StatusMessage};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("could not register for identity changes: {0}")]
    Subscription(#[source] GatewayError),

    #[error("wallet did not report its accounts: {0}")]
    Wallet(#[source] GatewayError),
}

impl SessionError {
    pub fn status(&self) -> StatusMessage {
        match self {
            Self::Subscription(_) => StatusMessage::error("Could not follow wallet account changes."),
            Self::Wallet(_) => StatusMessage::error("Please connect to your wallet!"),
        }
    }
}
