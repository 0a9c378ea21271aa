//! Permission rules.
//!
//! Pure functions from the current [`Projection`](crowdfund_registry::Projection)
//! and [`SessionSnapshot`](crowdfund_session::SessionSnapshot) to the actions an
//! identity may take. Nothing here reads the ledger or holds state; callers
//! re-evaluate whenever either input changes.

#![deny(unsafe_code)]

pub mod error;
pub mod rules;
pub mod sheet;

pub use error::Denial;
pub use rules::{
    can_administer, can_cancel, can_claim, can_create_campaign, can_fulfill, can_pledge,
    claimable_campaigns,
};
pub use sheet::{PermissionSheet, RowActions};
