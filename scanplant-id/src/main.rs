//! scanplant-id - Plant Identification Service
//!
//! Turns a captured photograph into a validated, persisted plant record:
//! species recognition, concurrent description/enrichment lookups, a
//! save-time moderation and payload-size gate, and reverse-geocoded location,
//! orchestrated as one session state machine.
//!
//! Integrates with capture clients via HTTP REST + SSE.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scanplant_common::config::{self, TomlConfig};
use scanplant_common::events::EventBus;
use scanplant_id::pipeline::IdentOrchestrator;
use scanplant_id::services::{EnrichmentResolver, KnowledgeBase, ModerationFilter};
use scanplant_id::AppState;

/// Default HTTP listen port
const DEFAULT_PORT: u16 = 5731;

#[derive(Debug, Parser)]
#[command(name = "scanplant-id", about = "ScanPlant identification service")]
struct Args {
    /// Data directory override (highest priority)
    #[arg(long)]
    data_dir: Option<String>,

    /// Listen port override
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Missing config file is not fatal; defaults apply
    let toml_config = TomlConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: {}; using default configuration", e);
        TomlConfig::default()
    });

    // Initialize tracing from the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(toml_config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);

    info!("Starting scanplant-id (Plant Identification) service");
    info!("Port: {}", port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve and create the data directory
    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), &toml_config);
    config::ensure_data_dir(&data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to initialize data directory: {}", e))?;

    let db_path = config::database_path(&data_dir);
    info!("Database: {}", db_path.display());

    let db_pool = scanplant_id::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);
    info!("Event bus initialized");

    // Injectable moderation denylist and knowledge base
    let moderation = match &toml_config.moderation {
        Some(m) => ModerationFilter::new(m.denylist.iter().cloned()),
        None => ModerationFilter::default(),
    };
    let enrichment = if toml_config.knowledge_base.is_empty() {
        EnrichmentResolver::default()
    } else {
        EnrichmentResolver::new(KnowledgeBase::new(
            toml_config
                .knowledge_base
                .iter()
                .cloned()
                .map(Into::into)
                .collect(),
        ))
    };

    let api_key = toml_config.resolve_plant_id_api_key();
    if api_key.is_none() {
        tracing::warn!("No Plant.id API key configured; identification requests will fail");
    }

    let orchestrator = Arc::new(
        IdentOrchestrator::new(db_pool.clone(), event_bus.clone(), api_key)
            .with_moderation(moderation.clone())
            .with_enrichment(enrichment),
    );

    let state = AppState::new(db_pool, event_bus, orchestrator, moderation);
    let app = scanplant_id::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
