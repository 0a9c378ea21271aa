//! Typed wrappers over [`ContractGateway::read`].
//!
//! Addresses coming back from the ledger are normalized here, so nothing past
//! this module ever sees a raw address string.

use crate::contract::{ContractGateway, ReadCall};
use crowdfund_types::{CampaignId, CampaignRecord, GatewayError, Identity, Wei};
use tracing::debug;

pub async fn owner<G: ContractGateway + ?Sized>(gateway: &G) -> Result<Identity, GatewayError> {
    let call = ReadCall::Owner;
    let method = call.method();
    let raw = gateway.read(call).await?.into_address(method)?;
    Identity::parse(&raw).map_err(|err| GatewayError::read(method, err.to_string()))
}

pub async fn is_active<G: ContractGateway + ?Sized>(gateway: &G) -> Result<bool, GatewayError> {
    let call = ReadCall::IsActive;
    let method = call.method();
    gateway.read(call).await?.into_bool(method)
}

pub async fn collected_fees<G: ContractGateway + ?Sized>(
    gateway: &G,
) -> Result<Wei, GatewayError> {
    let call = ReadCall::CollectedFees;
    let method = call.method();
    gateway.read(call).await?.into_amount(method)
}

pub async fn ledger_balance<G: ContractGateway + ?Sized>(
    gateway: &G,
) -> Result<Wei, GatewayError> {
    let call = ReadCall::LedgerBalance;
    let method = call.method();
    gateway.read(call).await?.into_amount(method)
}

/// Number of campaigns ever created; ids run from 0 up to this value, exclusive.
pub async fn next_campaign_id<G: ContractGateway + ?Sized>(
    gateway: &G,
) -> Result<u64, GatewayError> {
    let call = ReadCall::NextCampaignId;
    let method = call.method();
    gateway.read(call).await?.into_count(method)
}

pub async fn campaign<G: ContractGateway + ?Sized>(
    gateway: &G,
    id: CampaignId,
) -> Result<CampaignRecord, GatewayError> {
    let call = ReadCall::Campaign(id);
    let method = call.method();
    debug!(campaign_id = %id, "Reading campaign record");
    gateway.read(call).await?.into_campaign(method)
}

pub async fn pledge_amount<G: ContractGateway + ?Sized>(
    gateway: &G,
    id: CampaignId,
    investor: &Identity,
) -> Result<u64, GatewayError> {
    let call = ReadCall::PledgeAmount {
        campaign: id,
        investor: investor.clone(),
    };
    let method = call.method();
    gateway.read(call).await?.into_count(method)
}

pub async fn investment_amount<G: ContractGateway + ?Sized>(
    gateway: &G,
    id: CampaignId,
    investor: &Identity,
) -> Result<Wei, GatewayError> {
    let call = ReadCall::InvestmentAmount {
        campaign: id,
        investor: investor.clone(),
    };
    let method = call.method();
    gateway.read(call).await?.into_amount(method)
}

pub async fn is_banned<G: ContractGateway + ?Sized>(
    gateway: &G,
    who: &Identity,
) -> Result<bool, GatewayError> {
    let call = ReadCall::IsBanned(who.clone());
    let method = call.method();
    gateway.read(call).await?.into_bool(method)
}
