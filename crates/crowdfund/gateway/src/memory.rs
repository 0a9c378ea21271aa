//! In-process ledger.
//!
//! Implements [`ContractGateway`] and [`WalletProvider`] over local state and
//! enforces the deployed contract's rules, so a client can be exercised end to
//! end without a node. Addresses are reported in upper-case hex, the way a
//! checksumming node mixes case, so every consumer has to normalize.
//!
//! Faults can be injected per read method, per campaign id, or as a queue of
//! failures for a given write method.

use crate::contract::{ContractGateway, ReadCall, ReadValue, WriteCall, WriteReceipt};
use crate::wallet::{IdentitySubscription, ListenerSlot, WalletProvider};
use async_trait::async_trait;
use chrono::Utc;
use crowdfund_types::{CampaignId, CampaignRecord, CampaignState, GatewayError, Identity, Wei};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Failure to produce for the next write of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFault {
    /// The ledger reverts with this reason.
    Revert(String),
    /// The signer refuses to sign.
    Reject(String),
    /// The submission is lost in transit.
    Transport(String),
}

impl WriteFault {
    fn into_error(self, method: &str) -> GatewayError {
        match self {
            Self::Revert(reason) => GatewayError::reverted(method, reason),
            Self::Reject(message) => GatewayError::Rejected {
                method: method.to_string(),
                message,
            },
            Self::Transport(message) => GatewayError::Transport {
                method: method.to_string(),
                message,
            },
        }
    }
}

/// Write as it reached the ledger, accepted or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedWrite {
    pub from: Identity,
    pub call: WriteCall,
    pub value: Wei,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
struct StoredCampaign {
    entrepreneur: Identity,
    title: String,
    pledge_cost: Wei,
    pledges_needed: u64,
    pledges_count: u64,
    funds_raised: Wei,
    state: CampaignState,
}

impl StoredCampaign {
    fn record(&self) -> CampaignRecord {
        CampaignRecord {
            entrepreneur: reported_address(&self.entrepreneur),
            title: self.title.clone(),
            pledge_cost: self.pledge_cost,
            pledges_needed: self.pledges_needed,
            pledges_count: self.pledges_count,
            funds_raised: self.funds_raised,
            state: self.state.code(),
        }
    }
}

#[derive(Debug)]
struct LedgerState {
    owner: Identity,
    active: bool,
    collected_fees: Wei,
    balance: Wei,
    creation_fee: Wei,
    campaigns: Vec<StoredCampaign>,
    pledges: HashMap<(CampaignId, Identity), u64>,
    investments: HashMap<(CampaignId, Identity), Wei>,
    banned: HashSet<Identity>,
    payouts: HashMap<Identity, Wei>,
    nonce: u64,
    journal: Vec<SubmittedWrite>,
    accounts: Vec<String>,
    failing_reads: HashSet<&'static str>,
    failing_campaigns: HashSet<CampaignId>,
    write_faults: HashMap<&'static str, VecDeque<WriteFault>>,
}

/// Simulated contract plus wallet.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    listeners: Arc<ListenerSlot>,
}

fn reported_address(identity: &Identity) -> String {
    format!("0x{}", identity.as_str()[2..].to_ascii_uppercase())
}

fn revert(method: &str, reason: &str) -> GatewayError {
    GatewayError::reverted(method, reason)
}

impl InMemoryLedger {
    /// Active contract owned by `owner`, no campaigns, no wallet accounts.
    pub fn new(owner: Identity) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                owner,
                active: true,
                collected_fees: Wei::ZERO,
                balance: Wei::ZERO,
                creation_fee: Wei::campaign_creation_fee(),
                campaigns: Vec::new(),
                pledges: HashMap::new(),
                investments: HashMap::new(),
                banned: HashSet::new(),
                payouts: HashMap::new(),
                nonce: 0,
                journal: Vec::new(),
                accounts: Vec::new(),
                failing_reads: HashSet::new(),
                failing_campaigns: HashSet::new(),
                write_faults: HashMap::new(),
            })),
            listeners: ListenerSlot::new(),
        }
    }

    /// Override the fee `createCampaign` must carry.
    pub fn with_creation_fee(self, fee: Wei) -> Self {
        self.lock().creation_fee = fee;
        self
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- wallet side ----

    /// Replace the wallet's account list and notify the listener.
    pub fn set_accounts<I, S>(&self, accounts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let accounts: Vec<String> = accounts.into_iter().map(Into::into).collect();
        self.lock().accounts = accounts.clone();
        debug!(accounts = accounts.len(), "Wallet accounts changed");
        self.listeners.notify(accounts);
    }

    /// Simulate the user locking the wallet.
    pub fn disconnect(&self) {
        self.set_accounts(Vec::<String>::new());
    }

    pub fn has_listener(&self) -> bool {
        self.listeners.is_registered()
    }

    // ---- seeding ----

    /// Insert a campaign directly, bypassing the creation rules.
    pub fn seed_campaign(
        &self,
        entrepreneur: &Identity,
        title: &str,
        pledge_cost: Wei,
        pledges_needed: u64,
    ) -> CampaignId {
        let mut state = self.lock();
        let id = CampaignId(state.campaigns.len() as u64);
        state.campaigns.push(StoredCampaign {
            entrepreneur: entrepreneur.clone(),
            title: title.to_string(),
            pledge_cost,
            pledges_needed,
            pledges_count: 0,
            funds_raised: Wei::ZERO,
            state: CampaignState::Created,
        });
        id
    }

    /// Record `units` pledges by `investor`, bypassing the pledge rules.
    pub fn seed_pledge(&self, id: CampaignId, investor: &Identity, units: u64, amount: Wei) {
        let mut state = self.lock();
        if let Some(campaign) = state.campaigns.get_mut(id.0 as usize) {
            campaign.pledges_count += units;
            campaign.funds_raised = campaign
                .funds_raised
                .checked_add(amount)
                .unwrap_or(campaign.funds_raised);
        }
        *state.pledges.entry((id, investor.clone())).or_default() += units;
        let invested = state.investments.entry((id, investor.clone())).or_default();
        *invested = invested.checked_add(amount).unwrap_or(*invested);
        state.balance = state.balance.checked_add(amount).unwrap_or(state.balance);
    }

    /// Force a campaign's state. Moving a terminal campaign back to `Created`
    /// simulates a node serving a stale block.
    pub fn set_campaign_state(&self, id: CampaignId, next: CampaignState) {
        if let Some(campaign) = self.lock().campaigns.get_mut(id.0 as usize) {
            campaign.state = next;
        }
    }

    /// Overwrite a campaign's pledge count without touching funds.
    pub fn set_pledges_count(&self, id: CampaignId, count: u64) {
        if let Some(campaign) = self.lock().campaigns.get_mut(id.0 as usize) {
            campaign.pledges_count = count;
        }
    }

    pub fn ban(&self, who: &Identity) {
        self.lock().banned.insert(who.clone());
    }

    // ---- fault injection ----

    /// Fail every read of `campaigns(id)` until cleared.
    pub fn fail_campaign_reads(&self, id: CampaignId) {
        self.lock().failing_campaigns.insert(id);
    }

    /// Fail every read of the getter named `method` until cleared.
    pub fn fail_reads(&self, method: &'static str) {
        self.lock().failing_reads.insert(method);
    }

    /// Queue a failure for the next write of `method`. Queued faults are
    /// consumed one per write, so queueing n faults fails the next n writes.
    pub fn inject_write_fault(&self, method: &'static str, fault: WriteFault) {
        self.lock()
            .write_faults
            .entry(method)
            .or_default()
            .push_back(fault);
    }

    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.failing_reads.clear();
        state.failing_campaigns.clear();
        state.write_faults.clear();
    }

    // ---- inspection ----

    pub fn owner(&self) -> Identity {
        self.lock().owner.clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn campaign_count(&self) -> u64 {
        self.lock().campaigns.len() as u64
    }

    pub fn campaign_state(&self, id: CampaignId) -> Option<CampaignState> {
        self.lock().campaigns.get(id.0 as usize).map(|c| c.state)
    }

    pub fn collected_fees(&self) -> Wei {
        self.lock().collected_fees
    }

    pub fn balance(&self) -> Wei {
        self.lock().balance
    }

    /// Total transferred out of the contract to `who`.
    pub fn paid_out(&self, who: &Identity) -> Wei {
        self.lock().payouts.get(who).copied().unwrap_or(Wei::ZERO)
    }

    /// Every write that reached the ledger, in submission order.
    pub fn journal(&self) -> Vec<SubmittedWrite> {
        self.lock().journal.clone()
    }

    fn answer(&self, call: &ReadCall) -> Result<ReadValue, GatewayError> {
        let state = self.lock();
        let method = call.method();
        if state.failing_reads.contains(method) {
            return Err(GatewayError::read(method, "injected read failure"));
        }

        let value = match call {
            ReadCall::Owner => ReadValue::Address(reported_address(&state.owner)),
            ReadCall::IsActive => ReadValue::Bool(state.active),
            ReadCall::CollectedFees => ReadValue::Amount(state.collected_fees),
            ReadCall::LedgerBalance => ReadValue::Amount(state.balance),
            ReadCall::NextCampaignId => ReadValue::Count(state.campaigns.len() as u64),
            ReadCall::Campaign(id) => {
                if state.failing_campaigns.contains(id) {
                    return Err(GatewayError::read(
                        method,
                        format!("injected failure reading campaign {id}"),
                    ));
                }
                let campaign = state
                    .campaigns
                    .get(id.0 as usize)
                    .ok_or_else(|| GatewayError::read(method, format!("no campaign {id}")))?;
                ReadValue::Campaign(campaign.record())
            }
            ReadCall::PledgeAmount { campaign, investor } => ReadValue::Count(
                state
                    .pledges
                    .get(&(*campaign, investor.clone()))
                    .copied()
                    .unwrap_or(0),
            ),
            ReadCall::InvestmentAmount { campaign, investor } => ReadValue::Amount(
                state
                    .investments
                    .get(&(*campaign, investor.clone()))
                    .copied()
                    .unwrap_or(Wei::ZERO),
            ),
            ReadCall::IsBanned(who) => ReadValue::Bool(state.banned.contains(who)),
        };
        Ok(value)
    }

    fn submit(
        &self,
        from: &Identity,
        call: WriteCall,
        value: Wei,
    ) -> Result<WriteReceipt, GatewayError> {
        let mut state = self.lock();
        let method = call.method();

        let fault = state
            .write_faults
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        if let Some(fault) = fault {
            state.journal.push(SubmittedWrite {
                from: from.clone(),
                call: call.clone(),
                value,
                accepted: false,
            });
            return Err(fault.into_error(method));
        }

        let outcome = state.apply(from, &call, value);
        state.journal.push(SubmittedWrite {
            from: from.clone(),
            call,
            value,
            accepted: outcome.is_ok(),
        });
        outcome?;

        state.nonce += 1;
        let digest = blake3::hash(
            format!("{}:{}:{}:{}", state.nonce, method, from, value.minor()).as_bytes(),
        );
        Ok(WriteReceipt {
            tx_hash: format!("0x{}", digest.to_hex()),
            method: method.to_string(),
            from: from.clone(),
            value,
            settled_at: Utc::now(),
        })
    }
}

impl LedgerState {
    fn campaign_mut(
        &mut self,
        method: &str,
        id: CampaignId,
    ) -> Result<&mut StoredCampaign, GatewayError> {
        self.campaigns
            .get_mut(id.0 as usize)
            .ok_or_else(|| revert(method, "campaign does not exist"))
    }

    fn pay(&mut self, to: &Identity, amount: Wei) {
        self.balance = self.balance.saturating_sub(amount);
        let paid = self.payouts.entry(to.clone()).or_default();
        *paid = paid.checked_add(amount).unwrap_or(*paid);
    }

    fn require_owner(&self, method: &str, from: &Identity) -> Result<(), GatewayError> {
        if *from != self.owner {
            return Err(revert(method, "caller is not the owner"));
        }
        Ok(())
    }

    fn apply(&mut self, from: &Identity, call: &WriteCall, value: Wei) -> Result<(), GatewayError> {
        let method = call.method();
        let payable = matches!(call, WriteCall::CreateCampaign { .. } | WriteCall::Pledge { .. });
        if !payable && !value.is_zero() {
            return Err(revert(method, "function is not payable"));
        }

        match call {
            WriteCall::CreateCampaign {
                title,
                pledge_cost,
                pledges_needed,
            } => {
                if !self.active {
                    return Err(revert(method, "contract is not active"));
                }
                if *from == self.owner {
                    return Err(revert(method, "owner cannot create campaigns"));
                }
                if self.banned.contains(from) {
                    return Err(revert(method, "entrepreneur is banned"));
                }
                if value != self.creation_fee {
                    return Err(revert(method, "creation fee must be paid exactly"));
                }
                if pledge_cost.is_zero() || *pledges_needed == 0 {
                    return Err(revert(method, "pledge cost and pledges needed must be positive"));
                }

                let id = CampaignId(self.campaigns.len() as u64);
                self.campaigns.push(StoredCampaign {
                    entrepreneur: from.clone(),
                    title: title.clone(),
                    pledge_cost: *pledge_cost,
                    pledges_needed: *pledges_needed,
                    pledges_count: 0,
                    funds_raised: Wei::ZERO,
                    state: CampaignState::Created,
                });
                self.collected_fees = self
                    .collected_fees
                    .checked_add(value)
                    .unwrap_or(self.collected_fees);
                self.balance = self.balance.checked_add(value).unwrap_or(self.balance);
                info!(campaign_id = %id, entrepreneur = %from, "Campaign created");
            }

            WriteCall::Pledge { campaign, units } => {
                let campaign_id = *campaign;
                let units = *units;
                let stored = self.campaign_mut(method, campaign_id)?;
                if stored.state != CampaignState::Created {
                    return Err(revert(method, "campaign is not open"));
                }
                if units == 0 {
                    return Err(revert(method, "must pledge at least one unit"));
                }
                if stored.pledges_count.saturating_add(units) > stored.pledges_needed {
                    return Err(revert(method, "not enough pledges left"));
                }
                if stored.pledge_cost.checked_mul(units) != Some(value) {
                    return Err(revert(method, "attached value does not match pledge cost"));
                }
                stored.pledges_count += units;
                stored.funds_raised = stored
                    .funds_raised
                    .checked_add(value)
                    .ok_or_else(|| revert(method, "funds overflow"))?;

                *self.pledges.entry((campaign_id, from.clone())).or_default() += units;
                let invested = self.investments.entry((campaign_id, from.clone())).or_default();
                *invested = invested.checked_add(value).unwrap_or(*invested);
                self.balance = self.balance.checked_add(value).unwrap_or(self.balance);
            }

            WriteCall::CancelCampaign(id) => {
                let owner = self.owner.clone();
                let stored = self.campaign_mut(method, *id)?;
                if stored.state != CampaignState::Created {
                    return Err(revert(method, "campaign is not open"));
                }
                if stored.entrepreneur != *from && owner != *from {
                    return Err(revert(method, "only the entrepreneur or owner may cancel"));
                }
                stored.state = CampaignState::Cancelled;
                info!(campaign_id = %id, "Campaign cancelled");
            }

            WriteCall::CompleteCampaign(id) => {
                let stored = self.campaign_mut(method, *id)?;
                if stored.state != CampaignState::Created {
                    return Err(revert(method, "campaign is not open"));
                }
                if stored.entrepreneur != *from {
                    return Err(revert(method, "only the entrepreneur may complete"));
                }
                if stored.pledges_count < stored.pledges_needed {
                    return Err(revert(method, "campaign still needs pledges"));
                }
                stored.state = CampaignState::Fulfilled;
                let raised = stored.funds_raised;
                let entrepreneur = stored.entrepreneur.clone();
                self.pay(&entrepreneur, raised);
                info!(campaign_id = %id, "Campaign fulfilled");
            }

            WriteCall::RefundInvestor(id) => {
                let stored = self.campaign_mut(method, *id)?;
                if stored.state != CampaignState::Cancelled {
                    return Err(revert(method, "campaign is not cancelled"));
                }
                let key = (*id, from.clone());
                let invested = self.investments.remove(&key).unwrap_or(Wei::ZERO);
                if invested.is_zero() {
                    return Err(revert(method, "nothing to refund"));
                }
                self.pledges.remove(&key);
                self.pay(from, invested);
            }

            WriteCall::WithdrawFees => {
                self.require_owner(method, from)?;
                let fees = self.collected_fees;
                self.collected_fees = Wei::ZERO;
                let owner = self.owner.clone();
                self.pay(&owner, fees);
            }

            WriteCall::ChangeOwner(next) => {
                self.require_owner(method, from)?;
                info!(from = %self.owner, to = %next, "Contract ownership transferred");
                self.owner = next.clone();
            }

            WriteCall::BanEntrepreneur(who) => {
                self.require_owner(method, from)?;
                self.banned.insert(who.clone());
            }

            WriteCall::DestroyContract => {
                self.require_owner(method, from)?;
                if !self.active {
                    return Err(revert(method, "contract is not active"));
                }
                self.active = false;
                for campaign in self
                    .campaigns
                    .iter_mut()
                    .filter(|c| c.state == CampaignState::Created)
                {
                    campaign.state = CampaignState::Cancelled;
                }
                warn!("Contract deactivated, live campaigns cancelled");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ContractGateway for InMemoryLedger {
    async fn read(&self, call: ReadCall) -> Result<ReadValue, GatewayError> {
        self.answer(&call)
    }

    async fn write(
        &self,
        from: &Identity,
        call: WriteCall,
        value: Wei,
    ) -> Result<WriteReceipt, GatewayError> {
        self.submit(from, call, value)
    }
}

#[async_trait]
impl WalletProvider for InMemoryLedger {
    async fn request_accounts(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.lock().accounts.clone())
    }

    fn subscribe(&self) -> Result<IdentitySubscription, GatewayError> {
        self.listeners.register()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads;

    fn id(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    fn owner() -> Identity {
        id("0x00000000000000000000000000000000000000aa")
    }

    fn alice() -> Identity {
        id("0xabc0000000000000000000000000000000000001")
    }

    fn bob() -> Identity {
        id("0xb0b0000000000000000000000000000000000002")
    }

    async fn create(ledger: &InMemoryLedger, who: &Identity, needed: u64) -> CampaignId {
        let next = ledger.campaign_count();
        ledger
            .write(
                who,
                WriteCall::CreateCampaign {
                    title: "Bike lane".to_string(),
                    pledge_cost: Wei::new(10),
                    pledges_needed: needed,
                },
                Wei::campaign_creation_fee(),
            )
            .await
            .unwrap();
        CampaignId(next)
    }

    #[tokio::test]
    async fn creation_collects_the_fee() {
        let ledger = InMemoryLedger::new(owner());
        let campaign = create(&ledger, &alice(), 2).await;

        assert_eq!(ledger.collected_fees(), Wei::campaign_creation_fee());
        let record = reads::campaign(&ledger, campaign).await.unwrap();
        assert_eq!(record.entrepreneur, "0xABC0000000000000000000000000000000000001");
        assert_eq!(record.state, CampaignState::Created.code());
    }

    #[tokio::test]
    async fn creation_rules_are_enforced() {
        let ledger = InMemoryLedger::new(owner());
        let call = WriteCall::CreateCampaign {
            title: "x".to_string(),
            pledge_cost: Wei::new(1),
            pledges_needed: 1,
        };

        let wrong_fee = ledger.write(&alice(), call.clone(), Wei::new(1)).await;
        assert!(matches!(wrong_fee, Err(GatewayError::Reverted { .. })));

        let by_owner = ledger
            .write(&owner(), call.clone(), Wei::campaign_creation_fee())
            .await;
        assert!(matches!(by_owner, Err(GatewayError::Reverted { .. })));

        ledger.ban(&bob());
        let banned = ledger
            .write(&bob(), call, Wei::campaign_creation_fee())
            .await;
        assert!(matches!(banned, Err(GatewayError::Reverted { .. })));
        assert_eq!(ledger.campaign_count(), 0);
    }

    #[tokio::test]
    async fn pledges_fill_and_complete_pays_out() {
        let ledger = InMemoryLedger::new(owner());
        let campaign = create(&ledger, &alice(), 2).await;

        let short = ledger
            .write(&bob(), WriteCall::Pledge { campaign, units: 2 }, Wei::new(10))
            .await;
        assert!(matches!(short, Err(GatewayError::Reverted { .. })));

        ledger
            .write(&bob(), WriteCall::Pledge { campaign, units: 2 }, Wei::new(20))
            .await
            .unwrap();
        let full = ledger
            .write(&bob(), WriteCall::Pledge { campaign, units: 1 }, Wei::new(10))
            .await;
        assert!(matches!(full, Err(GatewayError::Reverted { .. })));

        assert_eq!(reads::pledge_amount(&ledger, campaign, &bob()).await.unwrap(), 2);

        ledger
            .write(&alice(), WriteCall::CompleteCampaign(campaign), Wei::ZERO)
            .await
            .unwrap();
        assert_eq!(ledger.campaign_state(campaign), Some(CampaignState::Fulfilled));
        assert_eq!(ledger.paid_out(&alice()), Wei::new(20));
    }

    #[tokio::test]
    async fn refund_requires_cancelled_campaign() {
        let ledger = InMemoryLedger::new(owner());
        let campaign = create(&ledger, &alice(), 3).await;
        ledger
            .write(&bob(), WriteCall::Pledge { campaign, units: 1 }, Wei::new(10))
            .await
            .unwrap();

        let early = ledger
            .write(&bob(), WriteCall::RefundInvestor(campaign), Wei::ZERO)
            .await;
        assert!(matches!(early, Err(GatewayError::Reverted { .. })));

        ledger
            .write(&alice(), WriteCall::CancelCampaign(campaign), Wei::ZERO)
            .await
            .unwrap();
        ledger
            .write(&bob(), WriteCall::RefundInvestor(campaign), Wei::ZERO)
            .await
            .unwrap();
        assert_eq!(ledger.paid_out(&bob()), Wei::new(10));
        assert_eq!(
            reads::investment_amount(&ledger, campaign, &bob()).await.unwrap(),
            Wei::ZERO
        );
    }

    #[tokio::test]
    async fn destroy_cancels_live_campaigns() {
        let ledger = InMemoryLedger::new(owner());
        let campaign = create(&ledger, &alice(), 1).await;

        let not_owner = ledger
            .write(&alice(), WriteCall::DestroyContract, Wei::ZERO)
            .await;
        assert!(matches!(not_owner, Err(GatewayError::Reverted { .. })));

        ledger
            .write(&owner(), WriteCall::DestroyContract, Wei::ZERO)
            .await
            .unwrap();
        assert!(!ledger.is_active());
        assert_eq!(ledger.campaign_state(campaign), Some(CampaignState::Cancelled));
    }

    #[tokio::test]
    async fn injected_faults_are_consumed_in_order() {
        let ledger = InMemoryLedger::new(owner());
        ledger.inject_write_fault("withdrawFees", WriteFault::Reject("user denied".into()));
        ledger.inject_write_fault("withdrawFees", WriteFault::Transport("timeout".into()));

        let first = ledger.write(&owner(), WriteCall::WithdrawFees, Wei::ZERO).await;
        assert!(matches!(first, Err(GatewayError::Rejected { .. })));
        let second = ledger.write(&owner(), WriteCall::WithdrawFees, Wei::ZERO).await;
        assert!(matches!(second, Err(GatewayError::Transport { .. })));
        let third = ledger.write(&owner(), WriteCall::WithdrawFees, Wei::ZERO).await;
        assert!(third.unwrap().tx_hash.starts_with("0x"));

        let journal = ledger.journal();
        assert_eq!(journal.len(), 3);
        assert_eq!(
            journal.iter().map(|w| w.accepted).collect::<Vec<_>>(),
            vec![false, false, true]
        );
    }

    #[tokio::test]
    async fn read_faults_target_one_campaign() {
        let ledger = InMemoryLedger::new(owner());
        let first = create(&ledger, &alice(), 1).await;
        let second = create(&ledger, &alice(), 1).await;
        ledger.fail_campaign_reads(second);

        assert!(reads::campaign(&ledger, first).await.is_ok());
        assert!(matches!(
            reads::campaign(&ledger, second).await,
            Err(GatewayError::Read { .. })
        ));

        ledger.clear_faults();
        assert!(reads::campaign(&ledger, second).await.is_ok());
    }

    #[tokio::test]
    async fn wallet_notifies_its_listener() {
        let ledger = InMemoryLedger::new(owner());
        let mut subscription = ledger.subscribe().unwrap();
        assert!(ledger.subscribe().is_err());

        ledger.set_accounts(["0xABC0000000000000000000000000000000000001"]);
        assert_eq!(
            ledger.request_accounts().await.unwrap(),
            vec!["0xABC0000000000000000000000000000000000001".to_string()]
        );
        let change = subscription.next().await.unwrap();
        assert_eq!(change.accounts.len(), 1);

        drop(subscription);
        assert!(!ledger.has_listener());
    }
}
