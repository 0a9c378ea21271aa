use crate::error::{Result, SessionError};
use crowdfund_gateway::{reads, ContractGateway, IdentitySubscription, WalletProvider};
use crowdfund_types::{GatewayError, Identity, StatusMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

const OWNER_LOAD_FAILED: &str = "Error loading contract owner.";
const BAN_LOOKUP_FAILED: &str = "Error checking whether this account is banned.";
const UNREADABLE_ACCOUNT: &str = "Wallet reported an unreadable account.";

/// Read-only view of the session handed to other components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Active identity; `None` while disconnected.
    pub current: Option<Identity>,
    /// Owner as last reported by the ledger.
    pub contract_owner: Option<Identity>,
    pub contract_active: bool,
    /// Current identity is the hardcoded privileged identity or the ledger owner.
    pub is_privileged_owner: bool,
    pub is_banned: bool,
    pub status: Option<StatusMessage>,
}

impl SessionSnapshot {
    fn initial() -> Self {
        Self {
            current: None,
            contract_owner: None,
            contract_active: false,
            is_privileged_owner: false,
            is_banned: false,
            status: Some(StatusMessage::connect_wallet()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    /// Current identity is the owner the ledger reports, ignoring the hardcoded one.
    pub fn is_contract_owner(&self) -> bool {
        match (&self.current, &self.contract_owner) {
            (Some(current), Some(owner)) => current == owner,
            _ => false,
        }
    }
}

/// Tracks the wallet's active identity and the flags derived from it.
///
/// Every derivation takes a token when it starts. A derivation that finishes
/// after a newer one started is dropped, so a slow ban lookup for an identity
/// the wallet already moved away from never overwrites the newer state.
pub struct AccountSession {
    gateway: Arc<dyn ContractGateway>,
    wallet: Arc<dyn WalletProvider>,
    privileged: Identity,
    snapshot: RwLock<Arc<SessionSnapshot>>,
    derivations: AtomicU64,
    subscription: Mutex<Option<IdentitySubscription>>,
    closed: watch::Sender<bool>,
}

impl AccountSession {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        wallet: Arc<dyn WalletProvider>,
        privileged: Identity,
    ) -> Self {
        Self {
            gateway,
            wallet,
            privileged,
            snapshot: RwLock::new(Arc::new(SessionSnapshot::initial())),
            derivations: AtomicU64::new(0),
            subscription: Mutex::new(None),
            closed: watch::channel(false).0,
        }
    }

    /// Subscribe to identity changes, read the contract owner once and derive
    /// the session from the wallet's current accounts.
    pub async fn initialize(&self) -> Result<Arc<SessionSnapshot>> {
        {
            let mut subscription = self.subscription.lock().await;
            if subscription.is_none() {
                let registered = self.wallet.subscribe().map_err(SessionError::Subscription)?;
                *subscription = Some(registered);
            }
        }

        self.refresh_contract().await;

        let accounts = self
            .wallet
            .request_accounts()
            .await
            .map_err(SessionError::Wallet)?;
        Ok(self.apply_accounts(&accounts).await)
    }

    /// Re-read owner and activity flag from the ledger.
    ///
    /// On failure the previous values are kept and a transient status is set.
    /// A later successful read clears that status again.
    pub async fn refresh_contract(&self) -> Arc<SessionSnapshot> {
        let facts = self.read_contract().await;

        let mut guard = self.snapshot.write().await;
        let mut next = (**guard).clone();
        match facts {
            Ok((owner, active)) => {
                debug!(owner = %owner, active, "Contract facts loaded");
                next.contract_owner = Some(owner);
                next.contract_active = active;
                if next.status.as_ref().is_some_and(|s| s.text == OWNER_LOAD_FAILED) {
                    next.status = match next.current {
                        Some(_) => None,
                        None => Some(StatusMessage::connect_wallet()),
                    };
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to load contract owner");
                next.status = Some(StatusMessage::error(OWNER_LOAD_FAILED));
            }
        }
        next.is_privileged_owner = next
            .current
            .as_ref()
            .is_some_and(|current| self.is_privileged(current, next.contract_owner.as_ref()));

        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        next
    }

    async fn read_contract(&self) -> std::result::Result<(Identity, bool), GatewayError> {
        let owner = reads::owner(self.gateway.as_ref()).await?;
        let active = reads::is_active(self.gateway.as_ref()).await?;
        Ok((owner, active))
    }

    fn is_privileged(&self, identity: &Identity, owner: Option<&Identity>) -> bool {
        *identity == self.privileged || owner == Some(identity)
    }

    /// Derive the session from a raw account list, as delivered by the wallet.
    ///
    /// Returns the snapshot visible once this derivation settles, which is a
    /// newer one if this derivation was overtaken.
    pub async fn apply_accounts(&self, accounts: &[String]) -> Arc<SessionSnapshot> {
        let token = self.derivations.fetch_add(1, Ordering::SeqCst) + 1;

        let (current, is_banned, status) = match accounts.first() {
            None => {
                info!("Wallet disconnected");
                (None, false, Some(StatusMessage::connect_wallet()))
            }
            Some(raw) => match Identity::parse(raw) {
                Ok(identity) => {
                    let (banned, status) = self.lookup_ban(&identity).await;
                    (Some(identity), banned, status)
                }
                Err(err) => {
                    warn!(account = %raw, error = %err, "Wallet reported an unreadable account");
                    (None, false, Some(StatusMessage::error(UNREADABLE_ACCOUNT)))
                }
            },
        };

        let mut guard = self.snapshot.write().await;
        if self.derivations.load(Ordering::SeqCst) != token {
            debug!(token, "Discarding identity derivation overtaken by a newer one");
            return Arc::clone(&guard);
        }

        let is_privileged_owner = current
            .as_ref()
            .is_some_and(|identity| self.is_privileged(identity, guard.contract_owner.as_ref()));
        let next = Arc::new(SessionSnapshot {
            current,
            contract_owner: guard.contract_owner.clone(),
            contract_active: guard.contract_active,
            is_privileged_owner,
            is_banned,
            status,
        });
        if let Some(identity) = &next.current {
            info!(
                identity = %identity,
                privileged = next.is_privileged_owner,
                banned = next.is_banned,
                "Active identity derived"
            );
        }
        *guard = Arc::clone(&next);
        next
    }

    async fn lookup_ban(&self, identity: &Identity) -> (bool, Option<StatusMessage>) {
        match reads::is_banned(self.gateway.as_ref(), identity).await {
            Ok(banned) => (banned, None),
            Err(err) => {
                warn!(identity = %identity, error = %err, "Ban lookup failed, treating as banned");
                (true, Some(StatusMessage::error(BAN_LOOKUP_FAILED)))
            }
        }
    }

    pub async fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    pub async fn current_identity(&self) -> Option<Identity> {
        self.snapshot.read().await.current.clone()
    }

    /// Wait for the next identity change and apply it.
    ///
    /// `None` once the session is shut down or the wallet goes away.
    pub async fn next_change(&self) -> Option<Arc<SessionSnapshot>> {
        let mut closed = self.closed.subscribe();
        let change = {
            let mut subscription = self.subscription.lock().await;
            let subscription = subscription.as_mut()?;
            tokio::select! {
                change = subscription.next() => change?,
                _ = closed.wait_for(|closed| *closed) => return None,
            }
        };
        Some(self.apply_accounts(&change.accounts).await)
    }

    /// Apply a pending identity change without waiting for one.
    pub async fn try_next_change(&self) -> Option<Arc<SessionSnapshot>> {
        let change = {
            let mut subscription = self.subscription.lock().await;
            subscription.as_mut()?.try_next()?
        };
        Some(self.apply_accounts(&change.accounts).await)
    }

    /// Drop the identity subscription, freeing the wallet's listener slot.
    pub async fn shutdown(&self) {
        // wakes a pending next_change so the subscription lock is released
        self.closed.send_replace(true);
        if self.subscription.lock().await.take().is_some() {
            debug!("Identity subscription released");
        }
    }
}
