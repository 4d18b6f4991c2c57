use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use linescout::analysis::Line;
use linescout::config::{Command, Config, StoreKind};
use linescout::dashboard::{self, AppState};
use linescout::db::{Database, ImportBundle};
use linescout::engine::{AnalysisEngine, AnalysisRequest};
use linescout::store::{CachedStore, FixtureStore, RestStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    if let Command::Import { path } = &config.command {
        let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let bundle: ImportBundle =
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;
        let db = Database::open(&config.database_path)?;
        let summary = db.import(&bundle)?;
        print_json(&summary)?;
        return Ok(());
    }

    let store = open_store(&config)?;
    info!("Fixture store: {} (cache TTL {}s)", store.name(), config.cache_ttl_secs);
    let engine = AnalysisEngine::new(store);

    match config.command.clone() {
        Command::Serve => {
            let app = dashboard::router(AppState {
                engine,
                default_season: config.default_season,
            });
            let addr: SocketAddr = config.dashboard_addr.parse()?;
            info!("Dashboard listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Command::Analyze {
            league,
            season,
            home,
            away,
            category,
            mode,
            direction,
            line,
        } => {
            let request = AnalysisRequest {
                league_id: league,
                season: season.unwrap_or(config.default_season),
                home_team_id: home,
                away_team_id: away,
                category: category.parse()?,
                mode: mode.parse()?,
                direction: direction.parse()?,
                line: line.as_deref().map(str::parse::<Line>).transpose()?,
            };
            let analysis = engine.analyze(request).await?;
            print_json(&analysis)?;
        }
        Command::Standings { league, season } => {
            let table = engine.standings(league, season.unwrap_or(config.default_season)).await?;
            print_json(&table)?;
        }
        Command::Import { .. } => {}
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<dyn FixtureStore>> {
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let store: Arc<dyn FixtureStore> = match config.store {
        StoreKind::Sqlite => {
            let db = Database::open(&config.database_path)?;
            info!("Database opened: {}", config.database_path);
            Arc::new(CachedStore::new(db, ttl))
        }
        StoreKind::Rest => {
            let url = config.rest_url.as_deref().unwrap_or_default();
            Arc::new(CachedStore::new(RestStore::new(url, config.rest_api_key.clone())?, ttl))
        }
    };
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
