use crate::error::Denial;
use crowdfund_registry::Projection;
use crowdfund_session::SessionSnapshot;
use crowdfund_types::{Campaign, CampaignId, CampaignState, Identity};

fn connected(identity: Option<&Identity>) -> Result<&Identity, Denial> {
    identity.ok_or(Denial::NotConnected)
}

fn live(campaign: &Campaign) -> Result<(), Denial> {
    if campaign.state != CampaignState::Created {
        return Err(Denial::CampaignClosed);
    }
    Ok(())
}

fn entrepreneur_of(campaign: &Campaign, identity: &Identity) -> Result<(), Denial> {
    if campaign.entrepreneur != *identity {
        return Err(Denial::NotEntrepreneur);
    }
    Ok(())
}

/// Any connected identity may pledge while pledges are left.
pub fn can_pledge(campaign: &Campaign, identity: Option<&Identity>) -> Result<(), Denial> {
    connected(identity)?;
    live(campaign)?;
    if campaign.pledges_left() == 0 {
        return Err(Denial::NoPledgesLeft);
    }
    Ok(())
}

pub fn can_cancel(campaign: &Campaign, identity: Option<&Identity>) -> Result<(), Denial> {
    let identity = connected(identity)?;
    live(campaign)?;
    entrepreneur_of(campaign, identity)
}

/// The entrepreneur may fulfill a live campaign once every pledge is taken.
pub fn can_fulfill(campaign: &Campaign, identity: Option<&Identity>) -> Result<(), Denial> {
    let identity = connected(identity)?;
    live(campaign)?;
    entrepreneur_of(campaign, identity)?;
    if campaign.pledges_left() > 0 {
        return Err(Denial::PledgesOutstanding);
    }
    Ok(())
}

/// Cancelled campaigns run by `identity` in which it still holds an investment.
///
/// Investments in the projection were read for `projection.identity`; for any
/// other identity nothing is claimable until the next reload.
pub fn claimable_campaigns(projection: &Projection, identity: &Identity) -> Vec<CampaignId> {
    if projection.identity.as_ref() != Some(identity) {
        return Vec::new();
    }
    projection
        .cancelled()
        .filter(|campaign| campaign.entrepreneur == *identity)
        .filter(|campaign| !projection.investment_in(campaign.id).is_zero())
        .map(|campaign| campaign.id)
        .collect()
}

pub fn can_claim(projection: &Projection, identity: Option<&Identity>) -> Result<(), Denial> {
    let identity = connected(identity)?;
    if claimable_campaigns(projection, identity).is_empty() {
        return Err(Denial::NothingToClaim);
    }
    Ok(())
}

/// Creation is closed to the privileged owner and to banned identities.
pub fn can_create_campaign(session: &SessionSnapshot) -> Result<(), Denial> {
    connected(session.current.as_ref())?;
    if session.is_privileged_owner {
        return Err(Denial::PrivilegedOwner);
    }
    if session.is_banned {
        return Err(Denial::Banned);
    }
    Ok(())
}

/// Gates withdraw, change-owner, ban and destroy.
pub fn can_administer(session: &SessionSnapshot) -> Result<(), Denial> {
    connected(session.current.as_ref())?;
    if !session.is_contract_owner() {
        return Err(Denial::NotOwner);
    }
    if !session.contract_active {
        return Err(Denial::ContractInactive);
    }
    Ok(())
}
