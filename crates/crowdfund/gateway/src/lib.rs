//! Boundary to the external ledger.
//!
//! [`ContractGateway`] is the only way the client touches the deployed contract:
//! side-effect-free reads and state-mutating writes. [`WalletProvider`] is the
//! injected wallet that reports which identities are available and notifies
//! when that changes.
//!
//! [`InMemoryLedger`] implements both for local runs and tests, enforcing the
//! same rules the deployed contract does.

#![deny(unsafe_code)]

pub mod contract;
pub mod memory;
pub mod reads;
pub mod wallet;

pub use contract::{ContractGateway, ReadCall, ReadValue, WriteCall, WriteReceipt};
pub use memory::{InMemoryLedger, SubmittedWrite, WriteFault};
pub use wallet::{IdentityChanged, IdentitySubscription, ListenerSlot, WalletProvider};
