use crowdfund_session::SessionError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("seed campaign {title:?}: {message}")]
    Seed { title: String, message: String },

    #[error("session failed to start: {0}")]
    Session(#[from] SessionError),
}
