use thiserror::Error;

/// Failures at the ledger boundary.
///
/// Reads fail with [`GatewayError::Read`]; a write fails because the signer
/// refused it, the ledger reverted it, or the transport dropped it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("read '{method}' failed: {message}")]
    Read { method: String, message: String },

    #[error("'{method}' was rejected by the signer: {message}")]
    Rejected { method: String, message: String },

    #[error("'{method}' reverted: {reason}")]
    Reverted { method: String, reason: String },

    #[error("transport failure during '{method}': {message}")]
    Transport { method: String, message: String },

    #[error("unexpected response to '{method}'")]
    UnexpectedResponse { method: String },

    #[error("identity subscription failed: {0}")]
    Subscription(String),
}

impl GatewayError {
    pub fn read(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn reverted(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reverted {
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Read { method, .. }
            | Self::Rejected { method, .. }
            | Self::Reverted { method, .. }
            | Self::Transport { method, .. }
            | Self::UnexpectedResponse { method } => Some(method),
            Self::Subscription(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_method() {
        let err = GatewayError::reverted("completeCampaign", "pledges outstanding");
        assert_eq!(err.method(), Some("completeCampaign"));
        assert_eq!(
            err.to_string(),
            "'completeCampaign' reverted: pledges outstanding"
        );
        assert_eq!(GatewayError::Subscription("busy".into()).method(), None);
    }
}
