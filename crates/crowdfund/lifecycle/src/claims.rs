use crate::action::Action;
use crate::controller::CampaignLifecycleController;
use crate::error::Result;
use crowdfund_gateway::{WriteCall, WriteReceipt};
use crowdfund_policy::rules;
use crowdfund_registry::{RegistryError, ReloadOutcome};
use crowdfund_types::{CampaignId, GatewayError, StatusMessage, Wei};
use tracing::info;

/// One refund write within a claim batch.
#[derive(Debug, Clone)]
pub struct ClaimAttempt {
    pub campaign: CampaignId,
    pub outcome: std::result::Result<WriteReceipt, GatewayError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimSummary {
    NothingToClaim,
    AllSucceeded,
    Partial { succeeded: usize, failed: usize },
    AllFailed,
}

/// Result of a claim batch: every attempt in order, then the single reload.
#[derive(Debug, Clone)]
pub struct ClaimReport {
    pub attempts: Vec<ClaimAttempt>,
    /// `None` when nothing was submitted.
    pub reload: Option<std::result::Result<ReloadOutcome, RegistryError>>,
}

impl ClaimReport {
    pub fn summary(&self) -> ClaimSummary {
        let succeeded = self.attempts.iter().filter(|a| a.outcome.is_ok()).count();
        let failed = self.attempts.len() - succeeded;
        match (succeeded, failed) {
            (0, 0) => ClaimSummary::NothingToClaim,
            (_, 0) => ClaimSummary::AllSucceeded,
            (0, _) => ClaimSummary::AllFailed,
            (succeeded, failed) => ClaimSummary::Partial { succeeded, failed },
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &ClaimAttempt> {
        self.attempts.iter().filter(|a| a.outcome.is_err())
    }

    pub fn status(&self) -> StatusMessage {
        match self.summary() {
            ClaimSummary::NothingToClaim => StatusMessage::info("Nothing to claim."),
            ClaimSummary::AllSucceeded => StatusMessage::success(Action::ClaimRefunds.success_text()),
            ClaimSummary::Partial { succeeded, failed } => StatusMessage::error(format!(
                "Claimed {succeeded} of {} campaigns; {failed} failed. Please try again.",
                succeeded + failed
            )),
            ClaimSummary::AllFailed => StatusMessage::error(Action::ClaimRefunds.failure_text()),
        }
    }
}

impl CampaignLifecycleController {
    /// Refund the caller's investment in every cancelled campaign it runs.
    ///
    /// Writes go out one at a time and a failure does not stop the rest. The
    /// registry reloads once after the last attempt.
    pub async fn claim_refunds(&self) -> Result<ClaimReport> {
        let action = Action::ClaimRefunds;
        let caller = self.path.caller().await?;
        let projection = self.path.registry.projection().await;
        let targets = rules::claimable_campaigns(&projection, &caller);
        if targets.is_empty() {
            info!(identity = %caller, "Nothing to claim");
            return Ok(ClaimReport {
                attempts: Vec::new(),
                reload: None,
            });
        }

        info!(identity = %caller, campaigns = targets.len(), "Claiming refunds");
        let mut attempts = Vec::with_capacity(targets.len());
        for campaign in targets {
            let outcome = self
                .path
                .write(action, &caller, WriteCall::RefundInvestor(campaign), Wei::ZERO)
                .await;
            attempts.push(ClaimAttempt { campaign, outcome });
        }

        let reload = self.path.reload().await;
        let report = ClaimReport {
            attempts,
            reload: Some(reload),
        };
        info!(summary = ?report.summary(), "Claim batch finished");
        Ok(report)
    }
}
