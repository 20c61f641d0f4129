//! Batch runner: replays a decision log and scores a catalog per profile.
//!
//! ```text
//! taste-identity <catalog.json|yaml> <decisions.jsonl> <domain> [limit]
//! ```
//!
//! One JSON document per profile is written to stdout. Logs go to stderr.

use std::error::Error;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taste_identity::adapters::{
    FsIdentityStore, InMemoryDecisionLog, InMemoryIdentityStore, StaticCatalog, TelemetryQueue,
    TelemetryWorker, TracingTelemetrySink,
};
use taste_identity::application::{
    EvaluateCatalogHandler, EvaluateCatalogQuery, GetTasteReadingHandler, GetTasteReadingQuery,
    IdentityCoordinator, ReplayHistoryCommand, ReplayHistoryHandler,
};
use taste_identity::config::{AppConfig, LoggingConfig, PersistenceBackend};
use taste_identity::domain::foundation::CommandMetadata;
use taste_identity::domain::scoring::{Evaluator, ReinforcementUpdater};
use taste_identity::domain::taste::TasteDomain;
use taste_identity::ports::IdentityPersistence;

type BoxError = Box<dyn Error + Send + Sync>;

const USAGE: &str = "usage: taste-identity <catalog.json|yaml> <decisions.jsonl> <domain> [limit]";

struct Args {
    catalog: String,
    decisions: String,
    domain: TasteDomain,
    limit: Option<usize>,
}

fn parse_args() -> Result<Args, BoxError> {
    let mut args = std::env::args().skip(1);
    let (Some(catalog), Some(decisions), Some(domain)) = (args.next(), args.next(), args.next())
    else {
        return Err(USAGE.into());
    };
    let limit = args.next().map(|raw| raw.parse::<usize>()).transpose()?;

    Ok(Args {
        catalog,
        decisions,
        domain: domain.parse()?,
        limit,
    })
}

fn init_logging(logging: &LoggingConfig) -> Result<(), BoxError> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().try_init()?;
    } else {
        builder.compact().try_init()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_logging(&config.logging)?;
    let args = parse_args()?;

    let catalog = Arc::new(StaticCatalog::from_file(&args.catalog).await?);
    let decisions = Arc::new(InMemoryDecisionLog::from_jsonl_file(&args.decisions).await?);
    info!(
        items = catalog.len(),
        events = decisions.event_count().await,
        "Inputs loaded"
    );

    let persistence: Arc<dyn IdentityPersistence> = match config.persistence.backend {
        PersistenceBackend::Memory => Arc::new(InMemoryIdentityStore::new()),
        PersistenceBackend::Filesystem => {
            Arc::new(FsIdentityStore::new(&config.persistence.data_dir))
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (telemetry, worker) = if config.telemetry.enabled {
        let (queue, receiver) = TelemetryQueue::bounded(config.telemetry.queue_capacity);
        let worker = TelemetryWorker::new(receiver, Arc::new(TracingTelemetrySink::new()));
        (queue, Some(tokio::spawn(worker.run(shutdown_rx))))
    } else {
        (TelemetryQueue::disabled(), None)
    };

    let coordinator = Arc::new(
        IdentityCoordinator::new(persistence, catalog, decisions.clone())
            .with_evaluator(Evaluator::new(config.scoring.clone()))
            .with_updater(ReinforcementUpdater::new(config.reinforcement.clone()))
            .with_telemetry(telemetry)
            .with_settings(config.persistence.coordinator_settings()),
    );

    let replay = ReplayHistoryHandler::new(coordinator.clone());
    let evaluate = EvaluateCatalogHandler::new(coordinator.clone());
    let read = GetTasteReadingHandler::new(coordinator.clone());

    for profile_id in decisions.profiles().await {
        let metadata = CommandMetadata::new().with_source("batch");

        let outcome = match replay
            .handle(
                ReplayHistoryCommand {
                    profile_id: profile_id.clone(),
                    domain: args.domain,
                },
                metadata.clone(),
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(profile_id = %profile_id, error = %e, "Skipping profile");
                continue;
            }
        };

        let scored = evaluate
            .handle(
                EvaluateCatalogQuery {
                    profile_id: profile_id.clone(),
                    limit: args.limit,
                },
                metadata,
            )
            .await?;
        let reading = read
            .handle(GetTasteReadingQuery {
                profile_id: profile_id.clone(),
                display_name: profile_id.to_string(),
            })
            .await?;

        let report = json!({
            "profile_id": profile_id,
            "applied": outcome.applied,
            "skipped": outcome.skipped,
            "persisted": outcome.persisted,
            "reading": reading,
            "evaluations": scored.evaluations,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let _ = shutdown_tx.send(true);
    if let Some(worker) = worker {
        let stats = worker.await?;
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Telemetry drained"
        );
    }

    Ok(())
}
