use crate::action::{Action, ActionReceipt};
use crate::controller::{settle, WritePath};
use crate::error::{LifecycleError, Result};
use crowdfund_gateway::{ContractGateway, WriteCall};
use crowdfund_policy::rules;
use crowdfund_registry::CampaignRegistry;
use crowdfund_session::AccountSession;
use crowdfund_types::{Identity, Wei};
use std::sync::Arc;
use tracing::info;

/// Contract administration: withdraw fees, transfer ownership, ban
/// entrepreneurs and deactivate the contract.
///
/// Every call is refused without a write unless the current identity is the
/// owner of an active contract. After a write the session re-reads the owner
/// and activity flag before the registry reloads.
pub struct AdminController {
    path: WritePath,
}

impl AdminController {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        session: Arc<AccountSession>,
        registry: Arc<CampaignRegistry>,
    ) -> Self {
        Self {
            path: WritePath {
                gateway,
                session,
                registry,
            },
        }
    }

    async fn authorize(&self, action: Action) -> Result<Identity> {
        let session = self.path.session.snapshot().await;
        rules::can_administer(&session).map_err(|denial| LifecycleError::denied(action, denial))?;
        self.path.caller().await
    }

    async fn submit(
        &self,
        action: Action,
        from: &Identity,
        call: WriteCall,
    ) -> Result<ActionReceipt> {
        let written = self.path.write(action, from, call, Wei::ZERO).await;
        self.path.session.refresh_contract().await;
        let reload = self.path.reload().await;
        settle(action, written, reload)
    }

    fn target(action: Action, raw: &str) -> Result<Identity> {
        Identity::parse(raw)
            .map_err(|err| LifecycleError::invalid(action, format!("Invalid address: {err}.")))
    }

    pub async fn withdraw_fees(&self) -> Result<ActionReceipt> {
        let action = Action::WithdrawFees;
        let owner = self.authorize(action).await?;
        self.submit(action, &owner, WriteCall::WithdrawFees).await
    }

    pub async fn change_owner(&self, new_owner: &str) -> Result<ActionReceipt> {
        let action = Action::ChangeOwner;
        let owner = self.authorize(action).await?;
        let next = Self::target(action, new_owner)?;
        info!(from = %owner, to = %next, "Transferring contract ownership");
        self.submit(action, &owner, WriteCall::ChangeOwner(next)).await
    }

    pub async fn ban_entrepreneur(&self, entrepreneur: &str) -> Result<ActionReceipt> {
        let action = Action::BanEntrepreneur;
        let owner = self.authorize(action).await?;
        let banned = Self::target(action, entrepreneur)?;
        self.submit(action, &owner, WriteCall::BanEntrepreneur(banned)).await
    }

    pub async fn destroy_contract(&self) -> Result<ActionReceipt> {
        let action = Action::DestroyContract;
        let owner = self.authorize(action).await?;
        self.submit(action, &owner, WriteCall::DestroyContract).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{id, major, Rig, ALICE, BOB, OWNER};
    use crowdfund_gateway::InMemoryLedger;
    use crowdfund_policy::Denial;
    use crowdfund_types::{CampaignId, CampaignState};

    fn admin(rig: &Rig) -> AdminController {
        AdminController::new(
            Arc::new(rig.ledger.clone()),
            Arc::clone(&rig.session),
            Arc::clone(&rig.registry),
        )
    }

    #[tokio::test]
    async fn owner_withdraws_collected_fees() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(ALICE)).await;
        rig.controller.create_campaign("Well", major("1"), 1).await.unwrap();
        rig.switch_to(OWNER).await;

        let receipt = admin(&rig).withdraw_fees().await.unwrap();
        assert_eq!(receipt.status().text, "Withdrawal successful!");
        assert_eq!(rig.ledger.paid_out(&id(OWNER)), Wei::campaign_creation_fee());
        assert!(rig.ledger.collected_fees().is_zero());
    }

    #[tokio::test]
    async fn non_owner_is_refused_without_a_write() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(ALICE)).await;

        let err = admin(&rig).destroy_contract().await.unwrap_err();
        assert_eq!(
            err,
            LifecycleError::NotPermitted {
                action: Action::DestroyContract,
                denial: Denial::NotOwner
            }
        );
        assert!(rig.ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn ownership_transfer_is_reflected_in_the_session() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(OWNER)).await;
        let admin = admin(&rig);

        assert!(matches!(
            admin.change_owner("not-an-address").await,
            Err(LifecycleError::InvalidInput { .. })
        ));

        admin.change_owner(BOB).await.unwrap();
        let session = rig.session.snapshot().await;
        assert_eq!(session.contract_owner, Some(id(BOB)));
        assert!(!session.is_contract_owner());

        let err = admin.withdraw_fees().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::NotPermitted {
                denial: Denial::NotOwner,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn banned_entrepreneur_loses_creation() {
        let rig = Rig::new(InMemoryLedger::new(id(OWNER)), Some(OWNER)).await;
        admin(&rig).ban_entrepreneur(ALICE).await.unwrap();

        rig.switch_to(ALICE).await;
        let err = rig.controller.create_campaign("Shed", major("1"), 1).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::NotPermitted {
                denial: Denial::Banned,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn destroy_deactivates_and_cancels() {
        let ledger = InMemoryLedger::new(id(OWNER));
        ledger.seed_campaign(&id(ALICE), "Open", Wei::new(10), 3);
        let rig = Rig::new(ledger, Some(OWNER)).await;
        let admin = admin(&rig);

        let receipt = admin.destroy_contract().await.unwrap();
        assert!(receipt.reload.unwrap().is_applied());
        assert!(!rig.session.snapshot().await.contract_active);
        assert_eq!(
            rig.registry.projection().await.campaign(CampaignId(0)).map(|c| c.state),
            Some(CampaignState::Cancelled)
        );

        let err = admin.destroy_contract().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::NotPermitted {
                denial: Denial::ContractInactive,
                ..
            }
        ));
    }
}
