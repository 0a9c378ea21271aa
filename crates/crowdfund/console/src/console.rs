use crate::app::Dapp;
use crate::commands::{self, Command, Parsed};
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::render;
use crowdfund_gateway::{InMemoryLedger, WalletProvider};
use crowdfund_lifecycle::{Action, ActionReceipt, LifecycleError};
use crowdfund_types::{CampaignId, Identity, StatusMessage, Wei};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Output of one console line.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub flow: Flow,
}

impl Reply {
    fn text(text: String) -> Self {
        Self {
            text,
            flow: Flow::Continue,
        }
    }
}

/// Line-oriented front end over a simulated ledger and wallet.
pub struct Console {
    dapp: Arc<Dapp>,
    ledger: InMemoryLedger,
}

impl Console {
    pub async fn start(config: &ConsoleConfig) -> Result<Self> {
        let ledger = config.build_ledger()?;
        Self::over(ledger, config).await
    }

    /// Run against an existing ledger, e.g. one a test prepared.
    pub async fn over(ledger: InMemoryLedger, config: &ConsoleConfig) -> Result<Self> {
        let dapp = Dapp::new(
            Arc::new(ledger.clone()),
            Arc::new(ledger.clone()),
            &config.client,
        );
        dapp.start().await?;
        Ok(Self {
            dapp: Arc::new(dapp),
            ledger,
        })
    }

    pub fn dapp(&self) -> &Arc<Dapp> {
        &self.dapp
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    /// Text shown when the console opens.
    pub async fn banner(&self) -> String {
        let view = self.dapp.view().await;
        format!(
            "{}\n\n{}",
            render::session(&view.session),
            render::campaigns(&view)
        )
    }

    pub async fn execute_line(&self, line: &str) -> Reply {
        match commands::parse(line) {
            Parsed::Empty => Reply::text(String::new()),
            Parsed::Help(text) | Parsed::Invalid(text) => Reply::text(text),
            Parsed::Command(Command::Quit) => Reply {
                text: String::new(),
                flow: Flow::Quit,
            },
            Parsed::Command(command) => {
                debug!(?command, "Executing console command");
                Reply::text(self.execute(command).await)
            }
        }
    }

    pub async fn execute(&self, command: Command) -> String {
        match command {
            Command::Accounts { accounts } if accounts.is_empty() => self.show_accounts().await,
            Command::Accounts { accounts } => self.switch_accounts(accounts).await,
            Command::Use { address } => self.use_account(&address).await,
            Command::Disconnect => self.switch_accounts(Vec::new()).await,
            Command::List => render::campaigns(&self.dapp.view().await),
            Command::Info => render::overview(&self.dapp.overview().await),
            Command::Reload => match self.dapp.reload().await {
                Ok(_) => render::campaigns(&self.dapp.view().await),
                Err(err) => render::status(&err.status()),
            },
            Command::Create {
                title,
                cost,
                pledges,
            } => {
                let pledge_cost = match Wei::from_major_str(&cost) {
                    Ok(amount) => amount,
                    Err(err) => {
                        let message = format!("Invalid pledge cost: {err}.");
                        return render::status(&StatusMessage::error(message));
                    }
                };
                let result = self
                    .dapp
                    .campaigns()
                    .create_campaign(&title, pledge_cost, pledges)
                    .await;
                written(Action::CreateCampaign, result)
            }
            Command::Pledge { id, units } => {
                let result = self.dapp.campaigns().pledge(CampaignId(id), units).await;
                written(Action::Pledge, result)
            }
            Command::Cancel { id } => {
                let result = self.dapp.campaigns().cancel(CampaignId(id)).await;
                written(Action::Cancel, result)
            }
            Command::Fulfill { id } => {
                let result = self.dapp.campaigns().fulfill(CampaignId(id)).await;
                written(Action::Fulfill, result)
            }
            Command::Claim => match self.dapp.campaigns().claim_refunds().await {
                Ok(report) => render::claim_report(&report),
                Err(err) => render::status(&err.status()),
            },
            Command::Withdraw => {
                written(Action::WithdrawFees, self.dapp.admin().withdraw_fees().await)
            }
            Command::ChangeOwner { address } => {
                let result = self.dapp.admin().change_owner(&address).await;
                written(Action::ChangeOwner, result)
            }
            Command::Ban { address } => {
                let result = self.dapp.admin().ban_entrepreneur(&address).await;
                written(Action::BanEntrepreneur, result)
            }
            Command::Destroy => {
                written(Action::DestroyContract, self.dapp.admin().destroy_contract().await)
            }
            Command::Quit => String::new(),
        }
    }

    async fn show_accounts(&self) -> String {
        match self.ledger.request_accounts().await {
            Ok(accounts) if accounts.is_empty() => render::status(&StatusMessage::connect_wallet()),
            Ok(accounts) => accounts
                .iter()
                .enumerate()
                .map(|(index, account)| {
                    let marker = if index == 0 { "*" } else { " " };
                    format!("{marker} {account}")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => render::status(&StatusMessage::error(err.to_string())),
        }
    }

    async fn use_account(&self, address: &str) -> String {
        let identity = match Identity::parse(address) {
            Ok(identity) => identity,
            Err(err) => {
                return render::status(&StatusMessage::error(format!("Invalid address: {err}.")))
            }
        };
        let mut accounts = self.ledger.request_accounts().await.unwrap_or_default();
        accounts.retain(|known| !identity.matches(known));
        accounts.insert(0, address.trim().to_string());
        self.switch_accounts(accounts).await
    }

    async fn switch_accounts(&self, accounts: Vec<String>) -> String {
        self.ledger.set_accounts(accounts);
        let reload = self.dapp.sync_identity().await;
        let mut out = render::session(&self.dapp.view().await.session);
        if let Some(Err(err)) = reload {
            out.push('\n');
            out.push_str(&render::status(&err.status()));
        }
        out
    }

    pub async fn shutdown(&self) {
        self.dapp.shutdown().await;
    }
}

/// Pending line, then the outcome. Refusals never reached the ledger and
/// get no pending line.
fn written(action: Action, result: std::result::Result<ActionReceipt, LifecycleError>) -> String {
    let settled = match result {
        Ok(receipt) => render::receipt(&receipt),
        Err(err @ LifecycleError::Write { .. }) => render::status(&err.status()),
        Err(err) => return render::status(&err.status()),
    };
    let pending = render::status(&StatusMessage::info(action.pending_text()));
    format!("{pending}\n{settled}")
}
