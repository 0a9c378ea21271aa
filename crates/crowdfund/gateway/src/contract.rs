use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowdfund_types::{CampaignId, CampaignRecord, GatewayError, Identity, Wei};
use serde::{Deserialize, Serialize};

/// Side-effect-free contract getters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadCall {
    Owner,
    IsActive,
    CollectedFees,
    /// Balance held by the contract account itself.
    LedgerBalance,
    NextCampaignId,
    Campaign(CampaignId),
    /// Pledge units `investor` holds in `campaign`.
    PledgeAmount {
        campaign: CampaignId,
        investor: Identity,
    },
    /// Minor-unit amount `investor` has invested in `campaign`.
    InvestmentAmount {
        campaign: CampaignId,
        investor: Identity,
    },
    IsBanned(Identity),
}

impl ReadCall {
    /// Contract-side name of the getter.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::IsActive => "isActive",
            Self::CollectedFees => "collectedFees",
            Self::LedgerBalance => "getBalance",
            Self::NextCampaignId => "nextCampaignId",
            Self::Campaign(_) => "campaigns",
            Self::PledgeAmount { .. } => "pledges",
            Self::InvestmentAmount { .. } => "investments",
            Self::IsBanned(_) => "bannedEntrepreneurs",
        }
    }
}

/// Raw getter result. Addresses are returned as reported, not normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadValue {
    Address(String),
    Bool(bool),
    Amount(Wei),
    Count(u64),
    Campaign(CampaignRecord),
}

impl ReadValue {
    pub fn into_address(self, method: &str) -> Result<String, GatewayError> {
        match self {
            Self::Address(value) => Ok(value),
            _ => Err(unexpected(method)),
        }
    }

    pub fn into_bool(self, method: &str) -> Result<bool, GatewayError> {
        match self {
            Self::Bool(value) => Ok(value),
            _ => Err(unexpected(method)),
        }
    }

    pub fn into_amount(self, method: &str) -> Result<Wei, GatewayError> {
        match self {
            Self::Amount(value) => Ok(value),
            _ => Err(unexpected(method)),
        }
    }

    pub fn into_count(self, method: &str) -> Result<u64, GatewayError> {
        match self {
            Self::Count(value) => Ok(value),
            _ => Err(unexpected(method)),
        }
    }

    pub fn into_campaign(self, method: &str) -> Result<CampaignRecord, GatewayError> {
        match self {
            Self::Campaign(value) => Ok(value),
            _ => Err(unexpected(method)),
        }
    }
}

fn unexpected(method: &str) -> GatewayError {
    GatewayError::UnexpectedResponse {
        method: method.to_string(),
    }
}

/// State-mutating contract calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    /// Attaches the creation fee.
    CreateCampaign {
        title: String,
        pledge_cost: Wei,
        pledges_needed: u64,
    },
    /// Attaches `pledge_cost × units`.
    Pledge { campaign: CampaignId, units: u64 },
    CancelCampaign(CampaignId),
    CompleteCampaign(CampaignId),
    RefundInvestor(CampaignId),
    WithdrawFees,
    ChangeOwner(Identity),
    BanEntrepreneur(Identity),
    DestroyContract,
}

impl WriteCall {
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateCampaign { .. } => "createCampaign",
            Self::Pledge { .. } => "pledge",
            Self::CancelCampaign(_) => "cancelCampaign",
            Self::CompleteCampaign(_) => "completeCampaign",
            Self::RefundInvestor(_) => "refundInvestor",
            Self::WithdrawFees => "withdrawFees",
            Self::ChangeOwner(_) => "changeOwner",
            Self::BanEntrepreneur(_) => "banEntrepreneur",
            Self::DestroyContract => "destroyContract",
        }
    }
}

/// Confirmation that a write settled.
///
/// Says nothing about what a later read will observe; callers re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    pub tx_hash: String,
    pub method: String,
    pub from: Identity,
    pub value: Wei,
    pub settled_at: DateTime<Utc>,
}

/// Calls into the deployed contract.
///
/// Every call may suspend for as long as the ledger takes to answer. The
/// gateway owns any timeout or retry policy; callers never retry on their own.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn read(&self, call: ReadCall) -> Result<ReadValue, GatewayError>;

    /// Submit `call` signed by `from`, attaching `value` minor units.
    async fn write(
        &self,
        from: &Identity,
        call: WriteCall,
        value: Wei,
    ) -> Result<WriteReceipt, GatewayError>;
}
