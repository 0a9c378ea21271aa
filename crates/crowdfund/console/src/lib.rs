//! Crowdfund console.
//!
//! [`Dapp`] is the client as a whole: it owns the session, the campaign
//! registry and both controllers, and reloads campaigns whenever the wallet
//! identity changes. [`Console`] drives a `Dapp` over the simulated ledger from
//! text commands, one line at a time.

#![deny(unsafe_code)]

pub mod app;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod render;

pub use app::{ContractOverview, Dapp, DappView};
pub use commands::{Command, Parsed};
pub use config::{ConsoleConfig, LedgerSeed, SeedCampaign, SeedPledge};
pub use console::{Console, Flow, Reply};
pub use error::{ConsoleError, Result};
