//! Console command grammar.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "crowdfund", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the wallet's accounts, or replace them
    Accounts {
        /// New account list, first one active
        accounts: Vec<String>,
    },

    /// Make an account the active one
    Use { address: String },

    /// Lock the wallet
    Disconnect,

    /// Show campaigns
    #[command(alias = "ls")]
    List,

    /// Show contract owner, balance and collected fees
    Info,

    /// Reload campaigns
    Reload,

    /// Create a campaign (pledge cost in ETH)
    Create {
        title: String,
        cost: String,
        pledges: u64,
    },

    /// Pledge to a live campaign
    Pledge {
        id: u64,
        #[arg(default_value_t = 1)]
        units: u64,
    },

    /// Cancel a live campaign you run
    Cancel { id: u64 },

    /// Fulfill a fully pledged campaign you run
    Fulfill { id: u64 },

    /// Claim refunds from your cancelled campaigns
    Claim,

    /// Withdraw collected fees (owner)
    Withdraw,

    /// Transfer contract ownership (owner)
    ChangeOwner { address: String },

    /// Ban an entrepreneur (owner)
    Ban { address: String },

    /// Deactivate the contract (owner)
    Destroy,

    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Empty,
    Command(Command),
    /// Help text requested with `help` or `--help`.
    Help(String),
    Invalid(String),
}

/// Split `line` like a shell would and parse it.
pub fn parse(line: &str) -> Parsed {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Parsed::Empty;
    }
    let Some(words) = shlex::split(line) else {
        return Parsed::Invalid("Unbalanced quotes.".to_string());
    };
    match Line::try_parse_from(words) {
        Ok(parsed) => Parsed::Command(parsed.command),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            Parsed::Help(err.to_string())
        }
        Err(err) => Parsed::Invalid(err.to_string()),
    }
}
