use std::future::Future;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vault_client::{
    RpcAccountSource, VaultTxnRecord, by_status, fetch_multisig_info, fetch_vault_txn,
    get_vault_txns, history, load_multisig, load_token_list, queued,
};
use vault_core::{RawStatus, TokenInfo};

#[path = "sol-vault/render.rs"]
mod render;

/// Squads vault inspector — decode and summarize multisig vault transactions
#[derive(Parser)]
#[command(name = "sol-vault", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(
        long,
        global = true,
        env = "SOLANA_RPC_URL",
        default_value = "https://api.mainnet-beta.solana.com"
    )]
    rpc_url: String,

    /// Squads multisig program
    #[arg(
        long,
        global = true,
        env = "SQUADS_PROGRAM_ID",
        default_value = "SQDS4ep65T869zMMBKyuUq6aD6EgTu8psMjkvj52pCf"
    )]
    program_id: Pubkey,

    /// Create key the multisig was derived from
    #[arg(long, short = 'k', global = true, env = "MULTISIG_CREATE_KEY")]
    create_key: Option<Pubkey>,

    /// Token list, as a file path or http(s) URL
    #[arg(long, global = true, env = "TOKEN_LIST")]
    token_list: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = Commitment::Confirmed)]
    commitment: Commitment,

    /// Give up after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(c: Commitment) -> Self {
        match c {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(Query),

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Commands that read the multisig over RPC.
#[derive(Subcommand)]
enum Query {
    /// List vault transactions, newest first
    List {
        /// Only transactions whose proposal has this status
        #[arg(long, short = 's')]
        status: Option<RawStatus>,
        /// Only transactions still collecting votes
        #[arg(long, conflicts_with_all = ["history", "status"])]
        queued: bool,
        /// Only transactions that left the queue
        #[arg(long, conflicts_with = "status")]
        history: bool,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single vault transaction
    Show {
        /// Transaction index (1-based)
        #[arg(long, short = 'i')]
        index: u64,
        #[arg(long)]
        json: bool,
    },

    /// Show multisig configuration and members
    State {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn with_timeout<F: Future>(secs: Option<u64>, fut: F) -> anyhow::Result<F::Output> {
    match secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), fut)
            .await
            .with_context(|| format!("timed out after {}s", secs)),
        None => Ok(fut.await),
    }
}

async fn tokens(location: Option<&str>) -> anyhow::Result<Vec<TokenInfo>> {
    match location {
        Some(location) => Ok(load_token_list(location).await?),
        None => {
            debug!("no token list configured");
            Ok(Vec::new())
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let query = match cli.command {
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sol-vault", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Query(query) => query,
    };

    init_tracing();

    let Some(create_key) = cli.create_key else {
        bail!("--create-key (or MULTISIG_CREATE_KEY) is required");
    };
    let source = RpcAccountSource::new(cli.rpc_url.clone(), cli.commitment.into());
    debug!(rpc = %source.url(), program = %cli.program_id, "using rpc endpoint");

    match query {
        Query::List { status, queued: only_queued, history: only_history, json } => {
            let tokens = tokens(cli.token_list.as_deref()).await?;
            let records = with_timeout(
                cli.timeout_secs,
                get_vault_txns(&source, &cli.program_id, &create_key, &tokens),
            )
            .await?
            .context("failed to load vault transactions")?;

            let selected: Vec<&VaultTxnRecord> = match (status, only_queued, only_history) {
                (Some(status), _, _) => by_status(&records, status),
                (None, true, _) => queued(&records),
                (None, false, true) => history(&records),
                (None, false, false) => records.iter().collect(),
            };

            if json {
                return print_json(&selected);
            }
            render::print_records(&selected);
        }

        Query::Show { index, json } => {
            let tokens = tokens(cli.token_list.as_deref()).await?;
            let record = with_timeout(cli.timeout_secs, async {
                let ctx = load_multisig(&source, &cli.program_id, &create_key).await?;
                if index == 0 || index > ctx.multisig.transaction_index {
                    bail!(
                        "index {} out of range (multisig has {} transactions)",
                        index,
                        ctx.multisig.transaction_index
                    );
                }
                Ok(fetch_vault_txn(&source, &ctx, index, &tokens).await?)
            })
            .await??;

            if json {
                return print_json(&record);
            }
            render::print_record(&record);
        }

        Query::State { json } => {
            let info = with_timeout(
                cli.timeout_secs,
                fetch_multisig_info(&source, &cli.program_id, &create_key),
            )
            .await?
            .context("failed to load multisig")?;

            if json {
                return print_json(&info);
            }
            render::print_multisig(&info);
        }
    }

    Ok(())
}
