use clap::{ArgGroup, Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rta_engine::application::engine::SettlementEngine;
use rta_engine::application::price_cache::PriceCache;
use rta_engine::config::{EngineConfig, RetryPolicy};
use rta_engine::domain::instrument::{Instrument, default_catalogue};
use rta_engine::domain::order::Order;
use rta_engine::domain::ports::{OrderStoreRef, PaymentAuthorityRef};
use rta_engine::domain::strategy::StrategyBook;
use rta_engine::infrastructure::http_payment::HttpPaymentAuthority;
use rta_engine::infrastructure::in_memory::{InMemoryOrderStore, StaticPaymentAuthority};
use rta_engine::interfaces::csv::catalogue_reader::{read_instruments, read_payments};
use rta_engine::interfaces::csv::report_writer::ReportWriter;
use rta_engine::interfaces::csv::request_reader::{RequestReader, Submission};
use rta_engine::interfaces::fault::FaultInjector;
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Report {
    /// Succeeded holdings per owner and instrument, valued at current prices
    Holdings,
    /// Final snapshot of every order created
    Orders,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("authority")
        .required(true)
        .multiple(true)
        .args(["payments", "payment_gateway_url"])
))]
struct Cli {
    /// Funding requests CSV file (kind, owner, target, amount, payment)
    input: PathBuf,

    /// CSV of payment outcomes (payment, status) served in-process instead of a gateway
    #[arg(long)]
    payments: Option<PathBuf>,

    /// Base URL of the payment gateway queried for payment status
    #[arg(long, env = "PAYMENT_GATEWAY_URL")]
    payment_gateway_url: Option<String>,

    /// CSV of instruments (name, min, max) replacing the built-in fund catalogue
    #[arg(long)]
    instruments: Option<PathBuf>,

    /// JSON file of strategies replacing the built-in ones
    #[arg(long)]
    strategies: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Probability that an incoming request is rejected before reaching the engine
    #[arg(long, env = "ERROR_RATE", default_value_t = 0.1)]
    error_rate: f64,

    /// Seconds between price refreshes
    #[arg(long, env = "PRICE_REFRESH_SECS", default_value_t = 60)]
    price_refresh_secs: u64,

    /// Simulated clearing time of each settlement, in milliseconds
    #[arg(long, env = "SETTLEMENT_DELAY_MS", default_value_t = 5000)]
    settlement_delay_ms: u64,

    /// Payment-status attempts made after the first one fails
    #[arg(long, env = "PAYMENT_RETRY_COUNT", default_value_t = 2)]
    retry_count: u32,

    /// Pause between payment-status attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,

    /// Timeout of a single payment gateway request, in seconds
    #[arg(long, default_value_t = 10)]
    payment_timeout_secs: u64,

    /// How long to wait for submitted orders to settle before reporting, in seconds
    #[arg(long, default_value_t = 30)]
    wait_secs: u64,

    /// Report written to stdout
    #[arg(long, value_enum, default_value_t = Report::Holdings)]
    report: Report,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            price_refresh_interval: Duration::from_secs(self.price_refresh_secs),
            settlement_delay: Duration::from_millis(self.settlement_delay_ms),
            payment_retry: RetryPolicy {
                retries: self.retry_count,
                delay: Duration::from_millis(self.retry_delay_ms),
            },
            payment_timeout: Duration::from_secs(self.payment_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.engine_config();
    config.validate().into_diagnostic()?;
    let faults = FaultInjector::new(cli.error_rate).into_diagnostic()?;

    let orders = open_store(cli.db_path.as_deref())?;
    let authority: PaymentAuthorityRef = match (&cli.payments, &cli.payment_gateway_url) {
        (Some(path), _) => {
            let statuses = read_payments(File::open(path).into_diagnostic()?).into_diagnostic()?;
            Arc::new(StaticPaymentAuthority::with_statuses(statuses))
        }
        (None, Some(url)) => Arc::new(
            HttpPaymentAuthority::new(url.clone(), config.payment_timeout).into_diagnostic()?,
        ),
        (None, None) => miette::bail!("either --payments or --payment-gateway-url is required"),
    };
    let instruments: Vec<Instrument> = match &cli.instruments {
        Some(path) => read_instruments(File::open(path).into_diagnostic()?).into_diagnostic()?,
        None => default_catalogue(),
    };
    let strategies = match &cli.strategies {
        Some(path) => {
            StrategyBook::from_json(&std::fs::read_to_string(path).into_diagnostic()?)
                .into_diagnostic()?
        }
        None => StrategyBook::builtin().into_diagnostic()?,
    };

    let prices = PriceCache::new(instruments);
    let refresher = prices.spawn_refresher(config.price_refresh_interval);
    let engine = SettlementEngine::new(orders, authority, prices, strategies, &config);

    // Submit every request; settlement runs in the background
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    let mut submitted: Vec<Order> = Vec::new();
    for submission in reader.submissions() {
        let submission = match submission {
            Ok(submission) => submission,
            Err(e) => {
                warn!("Error reading request: {e}");
                continue;
            }
        };
        if faults.should_fail() {
            warn!(?submission, "Request failed: injected fault");
            continue;
        }
        let result = match submission {
            Submission::Order(request) => engine.submit_order(request).await.map(|o| vec![o]),
            Submission::Strategy(request) => engine.execute_strategy(request).await,
        };
        match result {
            Ok(orders) => submitted.extend(orders),
            Err(e) => error!("Error submitting request: {e}"),
        }
    }

    // Wait for settlements, bounded by the overall deadline
    let deadline = tokio::time::Instant::now() + Duration::from_secs(cli.wait_secs);
    let mut settled = Vec::with_capacity(submitted.len());
    for order in &submitted {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let latest = engine
            .await_terminal(&order.id, remaining)
            .await
            .into_diagnostic()?;
        if !latest.status.is_terminal() {
            warn!(order_id = %latest.id, "Order still submitted at report time");
        }
        settled.push(latest);
    }
    refresher.abort();

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Orders => writer.write_orders(&settled).into_diagnostic()?,
        Report::Holdings => {
            let owners: BTreeSet<&str> = settled.iter().map(|o| o.owner.as_str()).collect();
            let mut holdings = Vec::new();
            for owner in owners {
                for holding in engine.holdings(owner).await.into_diagnostic()? {
                    holdings.push((owner, holding));
                }
            }
            writer
                .write_holdings(holdings.iter().map(|(owner, h)| (*owner, h)))
                .into_diagnostic()?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&Path>) -> Result<OrderStoreRef> {
    use rta_engine::infrastructure::rocksdb::RocksDBStore;

    Ok(match db_path {
        Some(path) => Arc::new(RocksDBStore::open(path).into_diagnostic()?),
        None => Arc::new(InMemoryOrderStore::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&Path>) -> Result<OrderStoreRef> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Arc::new(InMemoryOrderStore::new()))
}
