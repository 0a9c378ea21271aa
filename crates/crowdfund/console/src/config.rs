//! Console configuration file.
//!
//! ```toml
//! [client]
//! privileged_identity = "0x153dfef4355E823dCB0FCc76Efe942BefCa86477"
//! creation_fee = "0.02"
//!
//! [ledger]
//! owner = "0x00000000000000000000000000000000000000aa"
//! accounts = ["0xabc0000000000000000000000000000000000001"]
//!
//! [[ledger.campaigns]]
//! entrepreneur = "0xabc0000000000000000000000000000000000001"
//! title = "Community garden"
//! pledge_cost = "0.5"
//! pledges_needed = 4
//! pledges = [{ investor = "0xb0b0000000000000000000000000000000000002", units = 1 }]
//! ```

use crate::error::{ConsoleError, Result};
use crowdfund_gateway::InMemoryLedger;
use crowdfund_types::units::as_major;
use crowdfund_types::{ClientConfig, Identity, Wei};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub client: ClientConfig,
    pub ledger: LedgerSeed,
}

/// Initial state of the simulated ledger and wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSeed {
    pub owner: Identity,
    /// Wallet accounts, first one active. Kept raw, as a wallet reports them.
    pub accounts: Vec<String>,
    pub campaigns: Vec<SeedCampaign>,
}

impl Default for LedgerSeed {
    fn default() -> Self {
        Self {
            owner: ClientConfig::default().privileged_identity,
            accounts: Vec::new(),
            campaigns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCampaign {
    pub entrepreneur: Identity,
    pub title: String,
    #[serde(with = "as_major")]
    pub pledge_cost: Wei,
    pub pledges_needed: u64,
    #[serde(default)]
    pub pledges: Vec<SeedPledge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPledge {
    pub investor: Identity,
    pub units: u64,
}

impl ConsoleConfig {
    /// `<config_dir>/crowdfund/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crowdfund").join("config.toml"))
    }

    /// Load from `path`, or from the default location when none is given.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ConsoleError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| ConsoleError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), campaigns = config.ledger.campaigns.len(), "Config loaded");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Build the simulated ledger this config describes.
    pub fn build_ledger(&self) -> Result<InMemoryLedger> {
        let ledger = InMemoryLedger::new(self.ledger.owner.clone())
            .with_creation_fee(self.client.creation_fee);

        for seed in &self.ledger.campaigns {
            let invalid = |message: &str| ConsoleError::Seed {
                title: seed.title.clone(),
                message: message.to_string(),
            };
            if seed.pledge_cost.is_zero() || seed.pledges_needed == 0 {
                return Err(invalid("pledge cost and pledges needed must be positive"));
            }
            let id = ledger.seed_campaign(
                &seed.entrepreneur,
                &seed.title,
                seed.pledge_cost,
                seed.pledges_needed,
            );
            let mut pledged = 0u64;
            for pledge in &seed.pledges {
                pledged = pledged.saturating_add(pledge.units);
                if pledge.units == 0 || pledged > seed.pledges_needed {
                    return Err(invalid("pledges must be positive and fit the campaign"));
                }
                let amount = seed
                    .pledge_cost
                    .checked_mul(pledge.units)
                    .ok_or_else(|| invalid("pledge amount overflows"))?;
                ledger.seed_pledge(id, &pledge.investor, pledge.units, amount);
            }
        }

        ledger.set_accounts(self.ledger.accounts.iter().cloned());
        Ok(ledger)
    }
}
