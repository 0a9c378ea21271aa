use chrono::{DateTime, Utc};
use crowdfund_types::{Campaign, CampaignId, CampaignState, Identity, Wei};
use std::collections::BTreeMap;

/// One complete, internally consistent view of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    /// Reload that produced this view; 0 for the empty view at startup.
    pub sequence: u64,
    /// Identity the per-identity columns were read for.
    pub identity: Option<Identity>,
    /// Every campaign, ordered by id.
    pub campaigns: Vec<Campaign>,
    /// Pledge units held by `identity`, per campaign.
    pub pledges: BTreeMap<CampaignId, u64>,
    /// Amount `identity` has invested, recorded for cancelled campaigns only.
    pub investments: BTreeMap<CampaignId, Wei>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Projection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    pub fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.campaigns.get(index))
            .filter(|campaign| campaign.id == id)
    }

    pub fn pledges_of(&self, id: CampaignId) -> u64 {
        self.pledges.get(&id).copied().unwrap_or(0)
    }

    pub fn investment_in(&self, id: CampaignId) -> Wei {
        self.investments.get(&id).copied().unwrap_or(Wei::ZERO)
    }

    fn in_state(&self, state: CampaignState) -> impl Iterator<Item = &Campaign> {
        self.campaigns.iter().filter(move |c| c.state == state)
    }

    pub fn live(&self) -> impl Iterator<Item = &Campaign> {
        self.in_state(CampaignState::Created)
    }

    pub fn fulfilled(&self) -> impl Iterator<Item = &Campaign> {
        self.in_state(CampaignState::Fulfilled)
    }

    pub fn cancelled(&self) -> impl Iterator<Item = &Campaign> {
        self.in_state(CampaignState::Cancelled)
    }
}
