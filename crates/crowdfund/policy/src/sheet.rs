use crate::rules;
use crowdfund_registry::Projection;
use crowdfund_session::SessionSnapshot;
use crowdfund_types::{Campaign, CampaignId, Identity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Actions offered on one campaign row. Only live rows carry actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowActions {
    pub pledge: bool,
    pub cancel: bool,
    pub fulfill: bool,
}

impl RowActions {
    pub fn for_campaign(campaign: &Campaign, identity: Option<&Identity>) -> Self {
        if !campaign.is_live() {
            return Self::default();
        }
        Self {
            pledge: rules::can_pledge(campaign, identity).is_ok(),
            cancel: rules::can_cancel(campaign, identity).is_ok(),
            fulfill: rules::can_fulfill(campaign, identity).is_ok(),
        }
    }

    pub fn any(&self) -> bool {
        self.pledge || self.cancel || self.fulfill
    }
}

/// Every permission for one (projection, session) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSheet {
    pub rows: BTreeMap<CampaignId, RowActions>,
    pub claim: bool,
    pub create_campaign: bool,
    pub administer: bool,
}

impl PermissionSheet {
    pub fn evaluate(projection: &Projection, session: &SessionSnapshot) -> Self {
        let identity = session.current.as_ref();
        let rows = projection
            .campaigns
            .iter()
            .map(|campaign| (campaign.id, RowActions::for_campaign(campaign, identity)))
            .collect();

        Self {
            rows,
            claim: rules::can_claim(projection, identity).is_ok(),
            create_campaign: rules::can_create_campaign(session).is_ok(),
            administer: rules::can_administer(session).is_ok(),
        }
    }

    pub fn row(&self, id: CampaignId) -> RowActions {
        self.rows.get(&id).copied().unwrap_or_default()
    }
}
