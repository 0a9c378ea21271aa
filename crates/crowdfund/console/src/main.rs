//! `crowdfund` - console client for the crowdfunding contract.
//!
//! Runs against an in-process simulated ledger seeded from the config file.
//! Commands come from `--script` or, without one, from standard input.

use anyhow::Context;
use clap::Parser;
use crowdfund_console::{Console, ConsoleConfig, Flow};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "crowdfund", version, about = "Crowdfunding ledger client console")]
struct Cli {
    /// Configuration file (defaults to <config dir>/crowdfund/config.toml)
    #[arg(short, long, env = "CROWDFUND_CONFIG")]
    config: Option<PathBuf>,
    /// Run the commands in this file, then exit.
    #[arg(short, long, env = "CROWDFUND_SCRIPT")]
    script: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "CROWDFUND_LOG", default_value = "crowdfund=warn,warn")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log.clone()))
        .with_writer(std::io::stderr)
        .init();

    let config = ConsoleConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let console = Console::start(&config)
        .await
        .context("starting the crowdfund client")?;

    match &cli.script {
        Some(path) => {
            let script = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading script {}", path.display()))?;
            for line in script.lines() {
                if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                    println!("> {line}");
                }
                if emit(&console, line).await == Flow::Quit {
                    break;
                }
            }
        }
        None => {
            println!("{}\n", console.banner().await);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                print!("crowdfund> ");
                std::io::stdout().flush().context("writing prompt")?;
                let Some(line) = lines.next_line().await.context("reading command")? else {
                    break;
                };
                if emit(&console, &line).await == Flow::Quit {
                    break;
                }
            }
        }
    }

    console.shutdown().await;
    Ok(())
}

async fn emit(console: &Console, line: &str) -> Flow {
    let reply = console.execute_line(line).await;
    if !reply.text.is_empty() {
        println!("{}", reply.text);
    }
    reply.flow
}
