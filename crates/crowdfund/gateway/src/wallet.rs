//! Wallet provider boundary.
//!
//! The wallet reports the identities it controls and pushes an
//! [`IdentityChanged`] whenever that list changes. Only one listener may be
//! registered at a time; dropping the [`IdentitySubscription`] frees the slot.

use async_trait::async_trait;
use crowdfund_types::GatewayError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Account list pushed by the wallet. An empty list means disconnected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityChanged {
    pub accounts: Vec<String>,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for its accounts. The first one is the active identity.
    async fn request_accounts(&self) -> Result<Vec<String>, GatewayError>;

    /// Register the single identity-change listener.
    fn subscribe(&self) -> Result<IdentitySubscription, GatewayError>;
}

type Listener = (u64, mpsc::UnboundedSender<IdentityChanged>);

/// Holds at most one registered listener.
#[derive(Debug, Default)]
pub struct ListenerSlot {
    listener: Mutex<Option<Listener>>,
    next_id: AtomicU64,
}

impl ListenerSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the slot. Fails while another subscription is alive.
    pub fn register(self: &Arc<Self>) -> Result<IdentitySubscription, GatewayError> {
        let mut guard = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, sender)) = guard.as_ref() {
            if !sender.is_closed() {
                return Err(GatewayError::Subscription(
                    "an identity listener is already registered".to_string(),
                ));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        *guard = Some((id, sender));
        debug!(listener_id = id, "Identity listener registered");

        Ok(IdentitySubscription {
            id,
            receiver,
            slot: Arc::clone(self),
        })
    }

    /// Deliver `accounts` to the listener. Returns whether anyone received it.
    pub fn notify(&self, accounts: Vec<String>) -> bool {
        let guard = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some((id, sender)) => {
                let delivered = sender.send(IdentityChanged { accounts }).is_ok();
                if !delivered {
                    warn!(listener_id = *id, "Identity listener went away");
                }
                delivered
            }
            None => false,
        }
    }

    fn release(&self, id: u64) {
        let mut guard = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(guard.as_ref(), Some((current, _)) if *current == id) {
            *guard = None;
            debug!(listener_id = id, "Identity listener released");
        }
    }

    pub fn is_registered(&self) -> bool {
        let guard = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().is_some_and(|(_, sender)| !sender.is_closed())
    }
}

/// Live registration with a [`WalletProvider`].
#[derive(Debug)]
pub struct IdentitySubscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<IdentityChanged>,
    slot: Arc<ListenerSlot>,
}

impl IdentitySubscription {
    /// Wait for the next change. `None` once the provider is gone.
    pub async fn next(&mut self) -> Option<IdentityChanged> {
        self.receiver.recv().await
    }

    /// Take a pending change without waiting.
    pub fn try_next(&mut self) -> Option<IdentityChanged> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.slot.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_listener_at_a_time() {
        let slot = ListenerSlot::new();
        let first = slot.register().unwrap();
        assert!(matches!(
            slot.register(),
            Err(GatewayError::Subscription(_))
        ));

        drop(first);
        assert!(!slot.is_registered());
        assert!(slot.register().is_ok());
    }

    #[test]
    fn changes_reach_the_listener() {
        let slot = ListenerSlot::new();
        assert!(!slot.notify(vec!["0xabc".to_string()]));

        let mut subscription = slot.register().unwrap();
        assert!(slot.notify(vec!["0xabc".to_string()]));
        assert!(slot.notify(Vec::new()));

        assert_eq!(
            subscription.try_next(),
            Some(IdentityChanged {
                accounts: vec!["0xabc".to_string()]
            })
        );
        assert_eq!(
            subscription.try_next(),
            Some(IdentityChanged { accounts: vec![] })
        );
        assert_eq!(subscription.try_next(), None);
    }

    #[test]
    fn stale_release_keeps_the_newer_listener() {
        let slot = ListenerSlot::new();
        let first = slot.register().unwrap();
        let first_id = first.id;
        drop(first);

        let _second = slot.register().unwrap();
        slot.release(first_id);
        assert!(slot.is_registered());
    }
}
