use crate::error::{RegistryError, Result};
use crate::projection::Projection;
use chrono::Utc;
use crowdfund_gateway::{reads, ContractGateway};
use crowdfund_types::{Campaign, CampaignId, CampaignState, Identity, Wei};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// How a reload that completed all its reads ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The projection was replaced by this one.
    Applied(Arc<Projection>),
    /// A newer reload started before this one finished; its result was dropped.
    Superseded { sequence: u64, latest: u64 },
}

impl ReloadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn projection(&self) -> Option<&Arc<Projection>> {
        match self {
            Self::Applied(projection) => Some(projection),
            Self::Superseded { .. } => None,
        }
    }
}

/// Everything read for one campaign id.
struct Row {
    campaign: Campaign,
    pledges: Option<u64>,
    investment: Option<Wei>,
}

/// Owner of the campaign projection.
///
/// Only [`CampaignRegistry::reload`] replaces the projection; everyone else
/// holds `Arc<Projection>` snapshots. Reloads may overlap. Each one takes a
/// sequence number when it starts, and a result is published only if no
/// newer reload has started in the meantime.
pub struct CampaignRegistry {
    gateway: Arc<dyn ContractGateway>,
    projection: RwLock<Arc<Projection>>,
    started: AtomicU64,
}

impl CampaignRegistry {
    pub fn new(gateway: Arc<dyn ContractGateway>) -> Self {
        Self {
            gateway,
            projection: RwLock::new(Arc::new(Projection::empty())),
            started: AtomicU64::new(0),
        }
    }

    pub async fn projection(&self) -> Arc<Projection> {
        Arc::clone(&*self.projection.read().await)
    }

    /// Sequence number of the most recently started reload.
    pub fn latest_started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    /// Rebuild the projection for `identity`.
    ///
    /// With no identity, campaigns are still read but the per-identity
    /// columns are left empty.
    pub async fn reload(&self, identity: Option<&Identity>) -> Result<ReloadOutcome> {
        let sequence = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(sequence, identity = ?identity.map(Identity::as_str), "Reload started");

        let rows = match self.fetch(identity).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(sequence, error = %err, "Reload abandoned, previous projection kept");
                return Err(err);
            }
        };

        let mut current = self.projection.write().await;
        let latest = self.started.load(Ordering::SeqCst);
        if latest != sequence {
            info!(sequence, latest, "Reload superseded by a newer one, result dropped");
            return Ok(ReloadOutcome::Superseded { sequence, latest });
        }

        if let Err(err) = check_against(&current, &rows) {
            warn!(sequence, error = %err, "Reload rejected as a stale read, previous projection kept");
            return Err(err);
        }

        let mut campaigns = Vec::with_capacity(rows.len());
        let mut pledges = BTreeMap::new();
        let mut investments = BTreeMap::new();
        for row in rows {
            if let Some(units) = row.pledges {
                pledges.insert(row.campaign.id, units);
            }
            if let Some(amount) = row.investment {
                investments.insert(row.campaign.id, amount);
            }
            campaigns.push(row.campaign);
        }

        let next = Arc::new(Projection {
            sequence,
            identity: identity.cloned(),
            campaigns,
            pledges,
            investments,
            loaded_at: Some(Utc::now()),
        });
        info!(sequence, campaigns = next.len(), "Campaign projection replaced");
        *current = Arc::clone(&next);
        Ok(ReloadOutcome::Applied(next))
    }

    async fn fetch(&self, identity: Option<&Identity>) -> Result<Vec<Row>> {
        let count = reads::next_campaign_id(self.gateway.as_ref()).await?;
        try_join_all((0..count).map(|raw| self.fetch_row(CampaignId(raw), identity))).await
    }

    async fn fetch_row(&self, id: CampaignId, identity: Option<&Identity>) -> Result<Row> {
        let gateway = self.gateway.as_ref();
        let record = reads::campaign(gateway, id).await?;
        let campaign = Campaign::from_record(id, record)?;
        if let Some(detail) = campaign.invariant_violation() {
            return Err(RegistryError::InvariantViolation { id, detail });
        }

        let Some(investor) = identity else {
            return Ok(Row {
                campaign,
                pledges: None,
                investment: None,
            });
        };

        let pledges = reads::pledge_amount(gateway, id, investor).await?;
        let investment = if campaign.state == CampaignState::Cancelled {
            Some(reads::investment_amount(gateway, id, investor).await?)
        } else {
            None
        };
        Ok(Row {
            campaign,
            pledges: Some(pledges),
            investment,
        })
    }
}

/// Reject results that contradict what an earlier projection already showed.
fn check_against(previous: &Projection, rows: &[Row]) -> Result<()> {
    if rows.len() < previous.len() {
        return Err(RegistryError::CampaignCountRegressed {
            previous: previous.len() as u64,
            reported: rows.len() as u64,
        });
    }

    for (before, row) in previous.campaigns.iter().zip(rows) {
        if !before.state.may_become(row.campaign.state) {
            return Err(RegistryError::TerminalStateRegression {
                id: before.id,
                observed: before.state,
                reported: row.campaign.state,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crowdfund_gateway::{InMemoryLedger, ReadCall, ReadValue, WriteCall, WriteReceipt};
    use crowdfund_types::GatewayError;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

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

    /// Five campaigns by alice; bob holds one pledge in campaign 1 and campaign 3 is cancelled.
    fn seeded() -> InMemoryLedger {
        let ledger = InMemoryLedger::new(owner());
        for n in 0..5 {
            ledger.seed_campaign(&alice(), &format!("campaign {n}"), Wei::new(10), 3);
        }
        ledger.seed_pledge(CampaignId(1), &bob(), 1, Wei::new(10));
        ledger.seed_pledge(CampaignId(3), &bob(), 2, Wei::new(20));
        ledger.set_campaign_state(CampaignId(3), CampaignState::Cancelled);
        ledger
    }

    fn registry(ledger: &InMemoryLedger) -> CampaignRegistry {
        CampaignRegistry::new(Arc::new(ledger.clone()))
    }

    #[tokio::test]
    async fn reload_reads_identity_columns() {
        let ledger = seeded();
        let registry = registry(&ledger);

        let outcome = registry.reload(Some(&bob())).await.unwrap();
        let projection = outcome.projection().unwrap();
        assert_eq!(projection.sequence, 1);
        assert_eq!(projection.len(), 5);
        assert_eq!(projection.pledges.len(), 5);
        assert_eq!(projection.pledges_of(CampaignId(1)), 1);
        assert_eq!(projection.pledges_of(CampaignId(3)), 2);
        assert_eq!(
            projection.investments.keys().copied().collect::<Vec<_>>(),
            vec![CampaignId(3)]
        );
        assert_eq!(projection.investment_in(CampaignId(3)), Wei::new(20));
        assert_eq!(projection.campaign(CampaignId(0)).unwrap().entrepreneur, alice());
    }

    #[tokio::test]
    async fn disconnected_reload_skips_identity_reads() {
        let ledger = seeded();
        let registry = registry(&ledger);

        let outcome = registry.reload(None).await.unwrap();
        let projection = outcome.projection().unwrap();
        assert_eq!(projection.len(), 5);
        assert!(projection.identity.is_none());
        assert!(projection.pledges.is_empty());
        assert!(projection.investments.is_empty());
    }

    #[tokio::test]
    async fn failed_read_keeps_previous_projection() {
        let ledger = seeded();
        let registry = registry(&ledger);
        registry.reload(Some(&bob())).await.unwrap();
        let before = registry.projection().await;

        ledger.set_campaign_state(CampaignId(0), CampaignState::Cancelled);
        ledger.fail_campaign_reads(CampaignId(2));

        let err = registry.reload(Some(&bob())).await.unwrap_err();
        assert!(matches!(err, RegistryError::Read(GatewayError::Read { .. })));

        let after = registry.projection().await;
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), 5);
        assert_eq!(after.campaign(CampaignId(0)).unwrap().state, CampaignState::Created);
    }

    #[tokio::test]
    async fn terminal_state_never_reverts() {
        let ledger = seeded();
        let registry = registry(&ledger);
        registry.reload(None).await.unwrap();

        ledger.set_campaign_state(CampaignId(3), CampaignState::Created);
        let err = registry.reload(None).await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::TerminalStateRegression {
                id: CampaignId(3),
                observed: CampaignState::Cancelled,
                reported: CampaignState::Created,
            }
        );
        assert!(err.is_stale_read());
        assert!(err.status().text.contains("outdated data"));

        let projection = registry.projection().await;
        assert_eq!(
            projection.campaign(CampaignId(3)).unwrap().state,
            CampaignState::Cancelled
        );
    }

    #[tokio::test]
    async fn overfilled_live_campaign_is_rejected() {
        let ledger = seeded();
        let registry = registry(&ledger);
        registry.reload(None).await.unwrap();

        ledger.set_pledges_count(CampaignId(4), 7);
        let err = registry.reload(None).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvariantViolation { id, .. } if id == CampaignId(4)
        ));
        assert_eq!(registry.projection().await.sequence, 1);
    }

    /// Wraps the ledger to hold the first `nextCampaignId` read and to
    /// misreport the campaign count.
    struct Scripted {
        inner: InMemoryLedger,
        hold_next: AtomicBool,
        entered: Notify,
        release: Notify,
        reported_count: std::sync::Mutex<Option<u64>>,
    }

    impl Scripted {
        fn new(inner: InMemoryLedger) -> Self {
            Self {
                inner,
                hold_next: AtomicBool::new(false),
                entered: Notify::new(),
                release: Notify::new(),
                reported_count: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ContractGateway for Scripted {
        async fn read(&self, call: ReadCall) -> std::result::Result<ReadValue, GatewayError> {
            if call == ReadCall::NextCampaignId {
                if self.hold_next.swap(false, Ordering::SeqCst) {
                    self.entered.notify_one();
                    self.release.notified().await;
                }
                let reported = *self.reported_count.lock().unwrap();
                if let Some(count) = reported {
                    return Ok(ReadValue::Count(count));
                }
            }
            self.inner.read(call).await
        }

        async fn write(
            &self,
            from: &Identity,
            call: WriteCall,
            value: Wei,
        ) -> std::result::Result<WriteReceipt, GatewayError> {
            self.inner.write(from, call, value).await
        }
    }

    #[tokio::test]
    async fn older_reload_is_discarded() {
        let ledger = seeded();
        let gateway = Arc::new(Scripted::new(ledger.clone()));
        gateway.hold_next.store(true, Ordering::SeqCst);
        let registry = Arc::new(CampaignRegistry::new(gateway.clone()));

        let slow = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.reload(Some(&alice())).await })
        };
        gateway.entered.notified().await;

        let fresh = registry.reload(Some(&bob())).await.unwrap();
        assert!(fresh.is_applied());

        gateway.release.notify_one();
        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale, ReloadOutcome::Superseded { sequence: 1, latest: 2 });

        let projection = registry.projection().await;
        assert_eq!(projection.sequence, 2);
        assert_eq!(projection.identity, Some(bob()));
    }

    #[tokio::test]
    async fn shrinking_campaign_count_is_rejected() {
        let ledger = seeded();
        let gateway = Arc::new(Scripted::new(ledger.clone()));
        let registry = CampaignRegistry::new(gateway.clone());
        registry.reload(None).await.unwrap();

        *gateway.reported_count.lock().unwrap() = Some(3);
        let err = registry.reload(None).await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::CampaignCountRegressed {
                previous: 5,
                reported: 3
            }
        );
        assert_eq!(registry.projection().await.len(), 5);
    }
}
