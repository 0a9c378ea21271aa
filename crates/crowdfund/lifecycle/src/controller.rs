use crate::action::{Action, ActionReceipt};
use crate::error::{LifecycleError, Result};
use crowdfund_gateway::{ContractGateway, WriteCall, WriteReceipt};
use crowdfund_policy::rules;
use crowdfund_registry::{CampaignRegistry, RegistryError, ReloadOutcome};
use crowdfund_session::AccountSession;
use crowdfund_types::{Campaign, CampaignId, GatewayError, Identity, Wei};
use std::sync::Arc;
use tracing::{info, warn};

/// Write, then reload. Shared by both controllers.
#[derive(Clone)]
pub(crate) struct WritePath {
    pub(crate) gateway: Arc<dyn ContractGateway>,
    pub(crate) session: Arc<AccountSession>,
    pub(crate) registry: Arc<CampaignRegistry>,
}

impl WritePath {
    pub(crate) async fn caller(&self) -> Result<Identity> {
        self.session
            .current_identity()
            .await
            .ok_or(LifecycleError::NotConnected)
    }

    pub(crate) async fn write(
        &self,
        action: Action,
        from: &Identity,
        call: WriteCall,
        value: Wei,
    ) -> std::result::Result<WriteReceipt, GatewayError> {
        let method = call.method();
        info!(action = %action, method, from = %from, value = %value, "Submitting write");
        match self.gateway.write(from, call, value).await {
            Ok(receipt) => {
                info!(action = %action, tx_hash = %receipt.tx_hash, "Write settled");
                Ok(receipt)
            }
            Err(err) => {
                warn!(action = %action, error = %err, "Write failed");
                Err(err)
            }
        }
    }

    /// Reload for whoever is the current identity once the write settled.
    pub(crate) async fn reload(&self) -> std::result::Result<ReloadOutcome, RegistryError> {
        let identity = self.session.current_identity().await;
        self.registry.reload(identity.as_ref()).await
    }

    pub(crate) async fn submit(
        &self,
        action: Action,
        from: &Identity,
        call: WriteCall,
        value: Wei,
    ) -> Result<ActionReceipt> {
        let written = self.write(action, from, call, value).await;
        let reload = self.reload().await;
        settle(action, written, reload)
    }
}

pub(crate) fn settle(
    action: Action,
    written: std::result::Result<WriteReceipt, GatewayError>,
    reload: std::result::Result<ReloadOutcome, RegistryError>,
) -> Result<ActionReceipt> {
    let receipt = written.map_err(|source| LifecycleError::Write { action, source })?;
    Ok(ActionReceipt {
        action,
        receipt,
        reload,
    })
}

/// Campaign writes: pledge, cancel, fulfill, create and the refund batch.
///
/// Row actions are checked against the policy only to log a warning; the
/// ledger enforces them and a rejected write is reported like any other
/// failure. Creation is checked strictly and never submitted when denied.
pub struct CampaignLifecycleController {
    pub(crate) path: WritePath,
    creation_fee: Wei,
}

impl CampaignLifecycleController {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        session: Arc<AccountSession>,
        registry: Arc<CampaignRegistry>,
        creation_fee: Wei,
    ) -> Self {
        Self {
            path: WritePath {
                gateway,
                session,
                registry,
            },
            creation_fee,
        }
    }

    async fn listed(&self, id: CampaignId) -> Result<Campaign> {
        self.path
            .registry
            .projection()
            .await
            .campaign(id)
            .cloned()
            .ok_or(LifecycleError::CampaignNotFound(id))
    }

    pub async fn pledge(&self, id: CampaignId, units: u64) -> Result<ActionReceipt> {
        let action = Action::Pledge;
        let caller = self.path.caller().await?;
        if units == 0 {
            return Err(LifecycleError::invalid(action, "Pledge at least one unit."));
        }
        let campaign = self.listed(id).await?;
        let amount = campaign
            .pledge_amount(units)
            .ok_or_else(|| LifecycleError::invalid(action, "Pledge amount is too large."))?;

        if let Err(denial) = rules::can_pledge(&campaign, Some(&caller)) {
            warn!(
                campaign_id = %id,
                denial = %denial,
                "Pledge not offered by policy, submitting anyway"
            );
        }
        self.path
            .submit(action, &caller, WriteCall::Pledge { campaign: id, units }, amount)
            .await
    }

    pub async fn cancel(&self, id: CampaignId) -> Result<ActionReceipt> {
        let caller = self.path.caller().await?;
        let campaign = self.listed(id).await?;
        if let Err(denial) = rules::can_cancel(&campaign, Some(&caller)) {
            warn!(
                campaign_id = %id,
                denial = %denial,
                "Cancel not offered by policy, submitting anyway"
            );
        }
        self.path
            .submit(Action::Cancel, &caller, WriteCall::CancelCampaign(id), Wei::ZERO)
            .await
    }

    pub async fn fulfill(&self, id: CampaignId) -> Result<ActionReceipt> {
        let caller = self.path.caller().await?;
        let campaign = self.listed(id).await?;
        if let Err(denial) = rules::can_fulfill(&campaign, Some(&caller)) {
            warn!(
                campaign_id = %id,
                denial = %denial,
                "Fulfill not offered by policy, submitting anyway"
            );
        }
        self.path
            .submit(Action::Fulfill, &caller, WriteCall::CompleteCampaign(id), Wei::ZERO)
            .await
    }

    /// Create a campaign costing `pledge_cost` per pledge.
    pub async fn create_campaign(
        &self,
        title: &str,
        pledge_cost: Wei,
        pledges_needed: u64,
    ) -> Result<ActionReceipt> {
        let action = Action::CreateCampaign;
        let session = self.path.session.snapshot().await;
        rules::can_create_campaign(&session)
            .map_err(|denial| LifecycleError::denied(action, denial))?;
        let caller = self.path.caller().await?;

        let title = title.trim();
        if title.is_empty() {
            return Err(LifecycleError::invalid(action, "Enter a campaign title."));
        }
        if pledge_cost.is_zero() {
            return Err(LifecycleError::invalid(action, "Pledge cost must be positive."));
        }
        if pledges_needed == 0 {
            return Err(LifecycleError::invalid(action, "At least one pledge must be needed."));
        }

        let call = WriteCall::CreateCampaign {
            title: title.to_string(),
            pledge_cost,
            pledges_needed,
        };
        self.path.submit(action, &caller, call, self.creation_fee).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crowdfund_gateway::{InMemoryLedger, WriteFault};
    use crowdfund_policy::Denial;
    use crowdfund_types::{CampaignState, DEFAULT_PRIVILEGED_IDENTITY};

    pub(crate) const OWNER: &str = "0x00000000000000000000000000000000000000aa";
    pub(crate) const ALICE: &str = "0xABC0000000000000000000000000000000000001";
    pub(crate) const BOB: &str = "0xb0b0000000000000000000000000000000000002";

    pub(crate) fn id(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    pub(crate) fn major(raw: &str) -> Wei {
        Wei::from_major_str(raw).unwrap()
    }

    pub(crate) struct Rig {
        pub(crate) ledger: InMemoryLedger,
        pub(crate) session: Arc<AccountSession>,
        pub(crate) registry: Arc<CampaignRegistry>,
        pub(crate) controller: CampaignLifecycleController,
    }

    impl Rig {
        pub(crate) async fn new(ledger: InMemoryLedger, account: Option<&str>) -> Self {
            if let Some(account) = account {
                ledger.set_accounts([account]);
            }
            let gateway: Arc<dyn ContractGateway> = Arc::new(ledger.clone());
            let session = Arc::new(AccountSession::new(
                Arc::clone(&gateway),
                Arc::new(ledger.clone()),
                id(DEFAULT_PRIVILEGED_IDENTITY),
            ));
            session.initialize().await.unwrap();
            let registry = Arc::new(CampaignRegistry::new(Arc::clone(&gateway)));
            let current = session.current_identity().await;
            registry.reload(current.as_ref()).await.unwrap();
            let controller = CampaignLifecycleController::new(
                gateway,
                Arc::clone(&session),
                Arc::clone(&registry),
                Wei::campaign_creation_fee(),
            );
            Self {
                ledger,
                session,
                registry,
                controller,
            }
        }

        pub(crate) async fn switch_to(&self, account: &str) {
            self.ledger.set_accounts([account]);
            self.session.next_change().await.unwrap();
            let current = self.session.current_identity().await;
            self.registry.reload(current.as_ref()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn create_then_pledge_reloads_each_time() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(ALICE)).await;

        let created = rig
            .controller
            .create_campaign("  Tool library ", major("0.5"), 2)
            .await
            .unwrap();
        assert_eq!(created.status().text, "Campaign successfully created!");
        let projection = rig.registry.projection().await;
        let campaign = projection.campaign(CampaignId(0)).unwrap();
        assert_eq!(campaign.title, "Tool library");
        assert_eq!(campaign.pledge_cost, major("0.5"));
        assert_eq!(rig.ledger.collected_fees(), Wei::campaign_creation_fee());

        rig.switch_to(BOB).await;
        let pledged = rig.controller.pledge(CampaignId(0), 2).await.unwrap();
        assert_eq!(pledged.receipt.value, Wei::new(1_000_000_000_000_000_000));
        assert!(pledged.reload.unwrap().is_applied());

        let projection = rig.registry.projection().await;
        assert_eq!(projection.campaign(CampaignId(0)).unwrap().pledges_left(), 0);
        assert_eq!(projection.pledges_of(CampaignId(0)), 2);
    }

    #[tokio::test]
    async fn failed_write_still_reloads() {
        let ledger = InMemoryLedger::new(id(OWNER));
        ledger.seed_campaign(&id(ALICE), "Full", Wei::new(10), 1);
        ledger.seed_pledge(CampaignId(0), &id(ALICE), 1, Wei::new(10));
        let rig = Rig::new(ledger, Some(BOB)).await;
        let before = rig.registry.latest_started();

        let err = rig.controller.pledge(CampaignId(0), 1).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Write {
                action: Action::Pledge,
                source: GatewayError::Reverted { .. }
            }
        ));
        assert_eq!(err.status().text, "There was an error processing your pledge.");
        assert_eq!(rig.registry.latest_started(), before + 1);
        assert_eq!(rig.ledger.journal().len(), 1);
    }

    #[tokio::test]
    async fn signer_rejection_is_a_write_error() {
        let ledger = InMemoryLedger::new(id(OWNER));
        ledger.seed_campaign(&id(ALICE), "Open", Wei::new(10), 3);
        ledger.inject_write_fault("cancelCampaign", WriteFault::Reject("user denied".into()));
        let rig = Rig::new(ledger, Some(ALICE)).await;

        let err = rig.controller.cancel(CampaignId(0)).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Write {
                source: GatewayError::Rejected { .. },
                ..
            }
        ));
        assert_eq!(rig.ledger.campaign_state(CampaignId(0)), Some(CampaignState::Created));

        rig.controller.cancel(CampaignId(0)).await.unwrap();
        let projection = rig.registry.projection().await;
        assert_eq!(projection.cancelled().count(), 1);
    }

    #[tokio::test]
    async fn fulfill_pays_the_entrepreneur() {
        let ledger = InMemoryLedger::new(id(OWNER));
        ledger.seed_campaign(&id(ALICE), "Mural", Wei::new(10), 2);
        ledger.seed_pledge(CampaignId(0), &id(BOB), 2, Wei::new(20));
        let rig = Rig::new(ledger, Some(ALICE)).await;

        let done = rig.controller.fulfill(CampaignId(0)).await.unwrap();
        assert_eq!(done.status().text, "Campaign successfully fulfilled!");
        assert_eq!(rig.ledger.paid_out(&id(ALICE)), Wei::new(20));
        let projection = rig.registry.projection().await;
        assert_eq!(projection.fulfilled().count(), 1);
    }

    #[tokio::test]
    async fn nothing_is_submitted_while_disconnected() {
        let ledger = InMemoryLedger::new(id(OWNER));
        ledger.seed_campaign(&id(ALICE), "Open", Wei::new(10), 3);
        let rig = Rig::new(ledger, None).await;

        assert_eq!(
            rig.controller.pledge(CampaignId(0), 1).await.unwrap_err(),
            LifecycleError::NotConnected
        );
        assert_eq!(
            rig.controller.create_campaign("x", major("1"), 1).await.unwrap_err(),
            LifecycleError::NotConnected
        );
        assert!(rig.ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn creation_is_strictly_gated() {
        let owner_rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(OWNER)).await;
        assert_eq!(
            owner_rig.controller.create_campaign("x", major("1"), 1).await.unwrap_err(),
            LifecycleError::NotPermitted {
                action: Action::CreateCampaign,
                denial: Denial::PrivilegedOwner
            }
        );

        let ledger = InMemoryLedger::new(id(OWNER));
        ledger.ban(&id(BOB));
        let banned_rig = Rig::new(ledger, Some(BOB)).await;
        assert_eq!(
            banned_rig.controller.create_campaign("x", major("1"), 1).await.unwrap_err(),
            LifecycleError::NotPermitted {
                action: Action::CreateCampaign,
                denial: Denial::Banned
            }
        );

        assert!(owner_rig.ledger.journal().is_empty());
        assert!(banned_rig.ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn creation_input_is_validated() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(ALICE)).await;
        let c = &rig.controller;

        for (title, cost, needed) in [
            ("   ", major("1"), 1),
            ("Roof", Wei::ZERO, 1),
            ("Roof", major("1"), 0),
        ] {
            let err = c.create_campaign(title, cost, needed).await.unwrap_err();
            assert!(
                matches!(err, LifecycleError::InvalidInput { .. }),
                "{title:?} {cost:?} {needed}"
            );
        }
        assert!(rig.ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn unknown_campaign_is_not_submitted() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(ALICE)).await;
        assert_eq!(
            rig.controller.fulfill(CampaignId(4)).await.unwrap_err(),
            LifecycleError::CampaignNotFound(CampaignId(4))
        );
        assert!(rig.ledger.journal().is_empty());
    }
}
