//! Text rendering. Amounts turn into major units here and nowhere else.

use crate::app::{ContractOverview, DappView};
use colored::*;
use crowdfund_lifecycle::{ActionReceipt, ClaimReport};
use crowdfund_policy::RowActions;
use crowdfund_session::SessionSnapshot;
use crowdfund_types::{Campaign, Identity, StatusLevel, StatusMessage, Wei};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Table row for campaign display
#[derive(Debug, Tabled)]
struct CampaignRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Entrepreneur")]
    entrepreneur: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Raised")]
    raised: String,
    #[tabled(rename = "Backers")]
    backers: u64,
    #[tabled(rename = "Pledges Left")]
    pledges_left: u64,
    #[tabled(rename = "Your Pledges")]
    your_pledges: String,
    #[tabled(rename = "Actions")]
    actions: String,
}

impl CampaignRow {
    fn new(campaign: &Campaign, view: &DappView, actions: Option<RowActions>) -> Self {
        Self {
            id: campaign.id.0,
            entrepreneur: campaign.entrepreneur.to_string(),
            title: campaign.title.clone(),
            raised: eth(campaign.funds_raised),
            backers: campaign.pledges_count,
            pledges_left: campaign.pledges_left(),
            your_pledges: view
                .pledges_of(campaign.id)
                .map_or_else(|| "-".to_string(), |units| units.to_string()),
            actions: actions.map_or_else(|| "-".to_string(), action_list),
        }
    }
}

fn action_list(actions: RowActions) -> String {
    let enabled: Vec<&str> = [
        (actions.pledge, "pledge"),
        (actions.cancel, "cancel"),
        (actions.fulfill, "fulfill"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if enabled.is_empty() {
        "-".to_string()
    } else {
        enabled.join(", ")
    }
}

pub fn eth(amount: Wei) -> String {
    format!("{} ETH", amount.to_major_string())
}

fn identity_or_unknown(identity: Option<&Identity>) -> String {
    identity.map_or_else(|| "unknown".to_string(), Identity::to_string)
}

pub fn status(message: &StatusMessage) -> String {
    let marker = match message.level {
        StatusLevel::Success => "✓".green(),
        StatusLevel::Error => "✗".red(),
        StatusLevel::Info => "ℹ".blue(),
    };
    format!("{marker} {}", message.text)
}

pub fn warning(text: &str) -> String {
    format!("{} {text}", "⚠".yellow())
}

pub fn session(session: &SessionSnapshot) -> String {
    let mut out = match &session.current {
        None => status(&StatusMessage::connect_wallet()),
        Some(identity) => {
            let mut line = format!("Connected as {}", identity.to_string().bold());
            if session.is_privileged_owner {
                line.push_str(&format!(" {}", "(owner)".cyan()));
            }
            if session.is_banned {
                line.push_str(&format!(" {}", "(banned)".red()));
            }
            line
        }
    };
    if let Some(message) = session.status.as_ref().filter(|m| !m.is_persistent()) {
        out.push('\n');
        out.push_str(&status(message));
    }
    out
}

fn section(title: &str, rows: Vec<CampaignRow>) -> String {
    if rows.is_empty() {
        return format!("{}\n{}", title.bold(), "No campaigns".dimmed());
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    format!("{}\n{table}", title.bold())
}

/// Live, fulfilled and cancelled campaigns, in that order.
pub fn campaigns(view: &DappView) -> String {
    let projection = &view.projection;
    let live = projection
        .live()
        .map(|c| CampaignRow::new(c, view, Some(view.sheet.row(c.id))))
        .collect();
    let fulfilled = projection
        .fulfilled()
        .map(|c| CampaignRow::new(c, view, None))
        .collect();
    let cancelled = projection
        .cancelled()
        .map(|c| CampaignRow::new(c, view, None))
        .collect();

    let cancelled_title = if view.sheet.claim {
        format!("Cancelled Campaigns {}", "[claim available]".green())
    } else {
        "Cancelled Campaigns".to_string()
    };

    [
        section("Live Campaigns", live),
        section("Fulfilled Campaigns", fulfilled),
        section(&cancelled_title, cancelled),
    ]
    .join("\n\n")
}

pub fn overview(overview: &ContractOverview) -> String {
    let mut lines = vec![
        format!(
            "Current Address: {}",
            overview
                .current
                .as_ref()
                .map_or_else(|| "not connected".to_string(), Identity::to_string)
        ),
        format!(
            "Owner's Address: {}",
            identity_or_unknown(overview.owner.as_ref())
        ),
        format!("Contract Balance: {}", eth(overview.ledger_balance)),
        format!("Collected Fees: {}", eth(overview.collected_fees)),
    ];
    if let Some(message) = &overview.status {
        lines.push(status(message));
    }
    lines.join("\n")
}

pub fn receipt(receipt: &ActionReceipt) -> String {
    let mut out = format!(
        "{}\n  {} {}",
        status(&receipt.status()),
        "tx".dimmed(),
        receipt.receipt.tx_hash.dimmed()
    );
    if let Err(err) = &receipt.reload {
        out.push('\n');
        out.push_str(&status(&err.status()));
    }
    out
}

pub fn claim_report(report: &ClaimReport) -> String {
    let mut lines = vec![status(&report.status())];
    for attempt in &report.attempts {
        match &attempt.outcome {
            Ok(receipt) => lines.push(format!(
                "  {} campaign {} {}",
                "✓".green(),
                attempt.campaign,
                receipt.tx_hash.dimmed()
            )),
            Err(err) => lines.push(format!(
                "  {} campaign {}: {err}",
                "✗".red(),
                attempt.campaign
            )),
        }
    }
    if let Some(Err(err)) = &report.reload {
        lines.push(status(&err.status()));
    }
    lines.join("\n")
}
