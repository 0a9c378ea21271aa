//! Write orchestration.
//!
//! Every action follows the same path: check what must be checked, submit one
//! write through the gateway, then reload the registry whether or not the
//! write went through. The projection is never patched from a write result.

#![deny(unsafe_code)]

pub mod action;
pub mod admin;
pub mod claims;
pub mod controller;
pub mod error;

pub use action::{Action, ActionReceipt};
pub use admin::AdminController;
pub use claims::{ClaimAttempt, ClaimReport, ClaimSummary};
pub use controller::CampaignLifecycleController;
pub use error::{LifecycleError, Result};
