use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{AlertEvent, Config};
use store::Store;
use triggers::GateConfig;
use watcher::{RefreshGroup, Refresher, Watcher};

#[derive(Parser)]
#[command(name = "macrowatch", about = "Argentina macro trigger monitor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema and register the series catalog.
    Initdb,
    /// Fetch fresh data from the providers and persist it.
    Refresh {
        /// Limit the pass to one group (fx, reserves, cpi, embi, ndf, policy).
        #[arg(long)]
        group: Option<RefreshGroup>,
    },
    /// Load a `date,value` CSV into a registered series (the route for
    /// series without a live provider, e.g. EMBI_AR, CDS_ARG_5Y_USD).
    Ingest {
        /// Registered series id.
        series: String,
        /// Path to the CSV file.
        path: PathBuf,
    },
    /// Evaluate the triggers against stored data and print the report.
    Evaluate,
    /// Run the periodic watcher with transition alerts.
    Watch,
    /// Serve the HTTP API.
    Serve,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    let store = Store::connect(&cfg.database_url)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to database: {e}"));
    store
        .init_schema()
        .await
        .unwrap_or_else(|e| panic!("Schema initialization failed: {e}"));

    match cli.command {
        Command::Initdb => {
            store
                .upsert_meta(common::REGISTRY)
                .await
                .unwrap_or_else(|e| panic!("Failed to register series catalog: {e}"));
            info!(series = common::REGISTRY.len(), "database initialized");
        }
        Command::Refresh { group } => {
            let router = Arc::new(providers::build_router(&cfg));
            let refresher = Refresher::new(router, store);
            let summary = match group {
                Some(g) => refresher.refresh_group(g).await,
                None => refresher.refresh_all().await,
            }
            .unwrap_or_else(|e| panic!("Refresh failed: {e}"));

            info!(points = summary.points_stored, "refresh complete");
            for (series, reason) in &summary.failures {
                warn!(series, reason, "series not refreshed");
            }
        }
        Command::Ingest { series, path } => {
            let stored = watcher::ingest::ingest_csv(&store, &series, &path)
                .await
                .unwrap_or_else(|e| panic!("Ingest failed: {e}"));
            info!(series, points = stored, "ingest complete");
        }
        Command::Evaluate => {
            let gates = load_gates(&cfg);
            let report = triggers::evaluate(&store, &gates)
                .await
                .unwrap_or_else(|e| panic!("Evaluation failed: {e}"));
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serializes")
            );
        }
        Command::Watch => {
            let gates = load_gates(&cfg);
            let router = Arc::new(providers::build_router(&cfg));
            let refresher = Refresher::new(router, store.clone());

            let (alert_tx, alert_rx) = mpsc::channel::<AlertEvent>(64);
            tokio::spawn(watcher::alerts::run_sink(alert_rx));

            let w = Watcher::new(
                refresher,
                store,
                gates,
                Duration::from_secs(cfg.watch_interval_secs),
                alert_tx,
            );
            tokio::spawn(w.run());

            tokio::signal::ctrl_c().await.expect("ctrl-c handler");
            info!("shutting down");
        }
        Command::Serve => {
            let gates = load_gates(&cfg);
            let state = api::AppState { store, gates };
            api::serve(state, cfg.api_port).await;
        }
    }
}

fn load_gates(cfg: &Config) -> GateConfig {
    GateConfig::load(&cfg.gates_config_path)
        .unwrap_or_else(|e| panic!("Failed to load gate thresholds: {e}"))
}
