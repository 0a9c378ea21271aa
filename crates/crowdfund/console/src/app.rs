//! Client facade: wires the session, registry and controllers together and
//! runs the identity-change loop.

use crowdfund_gateway::{reads, ContractGateway, WalletProvider};
use crowdfund_lifecycle::{AdminController, CampaignLifecycleController};
use crowdfund_policy::PermissionSheet;
use crowdfund_registry::{CampaignRegistry, Projection, RegistryError, ReloadOutcome};
use crowdfund_session::{AccountSession, SessionError, SessionSnapshot};
use crowdfund_types::{CampaignId, ClientConfig, Identity, StatusMessage, Wei};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct DappView {
    pub session: Arc<SessionSnapshot>,
    pub projection: Arc<Projection>,
    pub sheet: PermissionSheet,
    /// The projection was loaded for the session's current identity. False
    /// after an identity change whose reload failed.
    pub projection_is_current: bool,
}

impl DappView {
    pub fn new(session: Arc<SessionSnapshot>, projection: Arc<Projection>) -> Self {
        let sheet = PermissionSheet::evaluate(&projection, &session);
        let projection_is_current = projection.identity == session.current;
        Self {
            session,
            projection,
            sheet,
            projection_is_current,
        }
    }

    /// The current identity's pledge units in `id`, unknown while the
    /// projection belongs to another identity.
    pub fn pledges_of(&self, id: CampaignId) -> Option<u64> {
        self.projection_is_current
            .then(|| self.projection.pledges_of(id))
    }
}

/// Contract-wide figures shown next to the campaign list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractOverview {
    pub current: Option<Identity>,
    /// The privileged identity is shown as owner while it is the current one.
    pub owner: Option<Identity>,
    pub ledger_balance: Wei,
    pub collected_fees: Wei,
    /// First read failure, if any. Failed amounts read as zero.
    pub status: Option<StatusMessage>,
}

impl ContractOverview {
    pub async fn load(
        gateway: &dyn ContractGateway,
        session: &SessionSnapshot,
        privileged: &Identity,
    ) -> Self {
        let mut status = None;
        let mut note = |text: &str| {
            if status.is_none() {
                status = Some(StatusMessage::error(text));
            }
        };

        let owner = match &session.current {
            Some(current) if current == privileged => Some(current.clone()),
            _ => match reads::owner(gateway).await {
                Ok(owner) => Some(owner),
                Err(err) => {
                    warn!(error = %err, "Overview owner read failed");
                    note("Error loading contract owner.");
                    None
                }
            },
        };
        let ledger_balance = reads::ledger_balance(gateway).await.unwrap_or_else(|err| {
            warn!(error = %err, "Overview balance read failed");
            note("Error loading contract balance.");
            Wei::ZERO
        });
        let collected_fees = reads::collected_fees(gateway).await.unwrap_or_else(|err| {
            warn!(error = %err, "Overview fees read failed");
            note("Error loading collected fees.");
            Wei::ZERO
        });

        Self {
            current: session.current.clone(),
            owner,
            ledger_balance,
            collected_fees,
            status,
        }
    }
}

pub struct Dapp {
    gateway: Arc<dyn ContractGateway>,
    privileged: Identity,
    session: Arc<AccountSession>,
    registry: Arc<CampaignRegistry>,
    campaigns: CampaignLifecycleController,
    admin: AdminController,
}

impl Dapp {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        wallet: Arc<dyn WalletProvider>,
        config: &ClientConfig,
    ) -> Self {
        let session = Arc::new(AccountSession::new(
            Arc::clone(&gateway),
            wallet,
            config.privileged_identity.clone(),
        ));
        let registry = Arc::new(CampaignRegistry::new(Arc::clone(&gateway)));
        let campaigns = CampaignLifecycleController::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            Arc::clone(&registry),
            config.creation_fee,
        );
        let admin = AdminController::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            Arc::clone(&registry),
        );
        Self {
            gateway,
            privileged: config.privileged_identity.clone(),
            session,
            registry,
            campaigns,
            admin,
        }
    }

    /// Derive the session, then load campaigns for it.
    ///
    /// A failed initial load leaves the empty projection in place; only a
    /// wallet or subscription failure stops the client.
    pub async fn start(&self) -> Result<DappView, SessionError> {
        let session = self.session.initialize().await?;
        info!(connected = session.is_connected(), "Client started");
        if let Err(err) = self.on_identity_changed(&session).await {
            warn!(error = %err, "Initial campaign load failed");
        }
        Ok(self.view().await)
    }

    /// Reload campaigns for the identity `session` carries.
    pub async fn on_identity_changed(
        &self,
        session: &SessionSnapshot,
    ) -> Result<ReloadOutcome, RegistryError> {
        self.registry.reload(session.current.as_ref()).await
    }

    /// Apply every identity change already delivered by the wallet and reload
    /// once for the last one.
    pub async fn sync_identity(&self) -> Option<Result<ReloadOutcome, RegistryError>> {
        let mut latest = None;
        while let Some(session) = self.session.try_next_change().await {
            latest = Some(session);
        }
        let session = latest?;
        debug!(connected = session.is_connected(), "Identity change applied");
        Some(self.on_identity_changed(&session).await)
    }

    /// Follow identity changes in the background until the session shuts
    /// down. Do not combine with [`Dapp::sync_identity`].
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let dapp = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(session) = dapp.session.next_change().await {
                if let Err(err) = dapp.on_identity_changed(&session).await {
                    warn!(error = %err, "Reload after identity change failed");
                }
            }
            debug!("Identity listener stopped");
        })
    }

    pub async fn reload(&self) -> Result<ReloadOutcome, RegistryError> {
        let identity = self.session.current_identity().await;
        self.registry.reload(identity.as_ref()).await
    }

    pub async fn view(&self) -> DappView {
        let session = self.session.snapshot().await;
        let projection = self.registry.projection().await;
        DappView::new(session, projection)
    }

    pub async fn overview(&self) -> ContractOverview {
        let session = self.session.snapshot().await;
        ContractOverview::load(self.gateway.as_ref(), &session, &self.privileged).await
    }

    pub fn campaigns(&self) -> &CampaignLifecycleController {
        &self.campaigns
    }

    pub fn admin(&self) -> &AdminController {
        &self.admin
    }

    pub fn session(&self) -> &Arc<AccountSession> {
        &self.session
    }

    pub fn registry(&self) -> &Arc<CampaignRegistry> {
        &self.registry
    }

    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}
