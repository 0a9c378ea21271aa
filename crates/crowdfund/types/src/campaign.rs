//! Campaign data model.

use crate::identity::{Identity, IdentityError};
use crate::units::Wei;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sequential campaign id assigned by the ledger. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub u64);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CampaignId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Campaign lifecycle state. `Cancelled` and `Fulfilled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Created,
    Cancelled,
    Fulfilled,
}

impl CampaignState {
    /// Decode the contract's enum ordinal.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Created),
            1 => Some(Self::Cancelled),
            2 => Some(Self::Fulfilled),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Cancelled => 1,
            Self::Fulfilled => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Created)
    }

    /// Whether a campaign observed in `self` may later be observed in `next`.
    pub fn may_become(self, next: CampaignState) -> bool {
        self == next || self == Self::Created
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Cancelled => "Cancelled",
            Self::Fulfilled => "Fulfilled",
        }
    }
}

impl fmt::Display for CampaignState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Campaign as returned by the ledger's `campaigns(id)` getter, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub entrepreneur: String,
    pub title: String,
    pub pledge_cost: Wei,
    pub pledges_needed: u64,
    pub pledges_count: u64,
    pub funds_raised: Wei,
    pub state: u8,
}

/// A ledger record that cannot enter the projection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("campaign {id} reports unknown state code {code}")]
    UnknownState { id: CampaignId, code: u8 },

    #[error("campaign {id} has an invalid entrepreneur address: {source}")]
    Entrepreneur {
        id: CampaignId,
        #[source]
        source: IdentityError,
    },
}

/// Normalized campaign row held by the client projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub entrepreneur: Identity,
    pub title: String,
    pub pledge_cost: Wei,
    pub pledges_needed: u64,
    pub pledges_count: u64,
    pub funds_raised: Wei,
    pub state: CampaignState,
}

impl Campaign {
    pub fn from_record(id: CampaignId, record: CampaignRecord) -> Result<Self, RecordError> {
        let state = CampaignState::from_code(record.state).ok_or(RecordError::UnknownState {
            id,
            code: record.state,
        })?;
        let entrepreneur = Identity::parse(&record.entrepreneur)
            .map_err(|source| RecordError::Entrepreneur { id, source })?;

        Ok(Self {
            id,
            entrepreneur,
            title: record.title,
            pledge_cost: record.pledge_cost,
            pledges_needed: record.pledges_needed,
            pledges_count: record.pledges_count,
            funds_raised: record.funds_raised,
            state,
        })
    }

    pub fn pledges_left(&self) -> u64 {
        self.pledges_needed.saturating_sub(self.pledges_count)
    }

    pub fn is_live(&self) -> bool {
        self.state == CampaignState::Created
    }

    /// Amount to attach when pledging `units` at this campaign's cost.
    pub fn pledge_amount(&self, units: u64) -> Option<Wei> {
        self.pledge_cost.checked_mul(units)
    }

    /// Description of the broken invariant, if this row cannot be a true ledger state.
    pub fn invariant_violation(&self) -> Option<String> {
        if self.state == CampaignState::Created && self.pledges_count > self.pledges_needed {
            return Some(format!(
                "live campaign has {} pledges but only needs {}",
                self.pledges_count, self.pledges_needed
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: u8) -> CampaignRecord {
        CampaignRecord {
            entrepreneur: "0xABC0000000000000000000000000000000000001".to_string(),
            title: "Solar kiosk".to_string(),
            pledge_cost: Wei::new(100),
            pledges_needed: 3,
            pledges_count: 1,
            funds_raised: Wei::new(100),
            state,
        }
    }

    #[test]
    fn record_is_normalized() {
        let campaign = Campaign::from_record(CampaignId(4), record(0)).unwrap();
        assert_eq!(campaign.id, CampaignId(4));
        assert_eq!(
            campaign.entrepreneur.as_str(),
            "0xabc0000000000000000000000000000000000001"
        );
        assert_eq!(campaign.state, CampaignState::Created);
        assert_eq!(campaign.pledges_left(), 2);
        assert_eq!(campaign.pledge_amount(2), Some(Wei::new(200)));
    }

    #[test]
    fn unknown_state_code_is_rejected() {
        assert_eq!(
            Campaign::from_record(CampaignId(1), record(7)),
            Err(RecordError::UnknownState {
                id: CampaignId(1),
                code: 7
            })
        );
    }

    #[test]
    fn bad_entrepreneur_is_rejected() {
        let mut raw = record(0);
        raw.entrepreneur = "nobody".to_string();
        assert!(matches!(
            Campaign::from_record(CampaignId(0), raw),
            Err(RecordError::Entrepreneur { .. })
        ));
    }

    #[test]
    fn terminal_states_never_reopen() {
        use CampaignState::*;
        assert!(Created.may_become(Cancelled));
        assert!(Created.may_become(Fulfilled));
        assert!(Cancelled.may_become(Cancelled));
        assert!(!Cancelled.may_become(Created));
        assert!(!Fulfilled.may_become(Created));
        assert!(!Fulfilled.may_become(Cancelled));
        for state in [Created, Cancelled, Fulfilled] {
            assert_eq!(CampaignState::from_code(state.code()), Some(state));
        }
    }

    #[test]
    fn overfilled_live_campaign_is_flagged() {
        let mut campaign = Campaign::from_record(CampaignId(0), record(0)).unwrap();
        assert!(campaign.invariant_violation().is_none());
        campaign.pledges_count = 4;
        assert!(campaign.invariant_violation().is_some());
        assert_eq!(campaign.pledges_left(), 0);
        campaign.state = CampaignState::Fulfilled;
        assert!(campaign.invariant_violation().is_none());
    }
}
