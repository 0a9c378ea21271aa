//! Active identity tracking.
//!
//! [`AccountSession`] owns the session state: which identity the wallet is
//! currently using, whether that identity is the privileged owner, and whether
//! the ledger has banned it. Everything else reads [`SessionSnapshot`]s.

#![deny(unsafe_code)]

pub mod error;
pub mod session;

pub use error::{Result, SessionError};
pub use session::{AccountSession, SessionSnapshot};
