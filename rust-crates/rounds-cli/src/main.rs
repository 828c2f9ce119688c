use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use fuels::types::ContractId;
use lottery_rounds::{
    LotteryReader,
    RoundId,
    store::{
        InMemoryRoundStore,
        RoundStore,
    },
    transport::gateway::{
        GatewayConfig,
        GatewayTransport,
    },
};
use serde_json::Value;
use std::{
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
    time::Duration,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use url::Url;

pub const DEFAULT_LOCAL_GATEWAY_URL: &str = "http://localhost:4000/";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "LOTTERY_GATEWAY_URL", default_value = DEFAULT_LOCAL_GATEWAY_URL)]
    gateway_url: Url,

    #[arg(short, long, env = "LOTTERY_CONTRACT_ID")]
    contract_id: String,

    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[arg(short, long)]
    tracing: bool,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current round id and the per-purchase ticket limit
    Current,
    /// Read a single round
    Round { id: String },
    /// Read several rounds in one batch
    Rounds {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Read the current round and the rounds before it
    Recent,
}

fn parse_contract_id_str(raw: &str) -> Result<ContractId> {
    let trimmed = raw.trim();
    let cleaned = trimmed.trim_start_matches("fuel");
    ContractId::from_str(cleaned)
        .map_err(|e| eyre!("Failed to parse contract id '{raw}': {e:?}"))
}

fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rounds.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| eyre!("failed to install tracing subscriber: {e}"))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| eyre!("failed to install tracing subscriber: {e}"))?;
            Ok(None)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).wrap_err("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = if args.tracing || args.log_dir.is_some() {
        init_tracing(args.log_dir.as_deref())?
    } else {
        None
    };

    let contract_id =
        parse_contract_id_str(&args.contract_id).wrap_err("parsing --contract-id")?;
    let config = GatewayConfig {
        base_url: args.gateway_url.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let transport = GatewayTransport::new(config).map_err(|e| eyre!("{e:#}"))?;
    tracing::info!("Reading lottery {} through gateway {}", contract_id, transport);
    let reader = LotteryReader::new(transport, contract_id);

    match args.command {
        Command::Current => {
            let info = reader.fetch_current_round_id_and_max_buy().await;
            print_json(&info)
        }
        Command::Round { id } => {
            let record = reader.fetch_round(&RoundId::from(id)).await;
            print_json(&record)
        }
        Command::Rounds { ids } => {
            let round_ids: Vec<RoundId> = ids.into_iter().map(RoundId::from).collect();
            let records = reader.fetch_rounds(&round_ids).await;
            print_json(&records)
        }
        Command::Recent => {
            let records = reader.fetch_recent_rounds().await;
            if records.is_empty() {
                tracing::warn!("current round id unavailable; nothing to show");
                return print_json(&Value::Array(Vec::new()));
            }
            let mut store = InMemoryRoundStore::new();
            store
                .upsert_rounds(records)
                .map_err(|e| eyre!("{e:#}"))?;
            let held = store.rounds().map_err(|e| eyre!("{e:#}"))?;
            print_json(&held)
        }
    }
}
