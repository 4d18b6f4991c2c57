use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Football statistics dashboard: over/under hit-rates and suggested lines
#[derive(Parser, Debug, Clone)]
#[command(name = "linescout", version, about)]
pub struct Config {
    /// Fixture store backend
    #[arg(long, env = "STORE", value_enum, default_value = "sqlite", global = true)]
    pub store: StoreKind,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "linescout.db", global = true)]
    pub database_path: String,

    /// Project URL of the PostgREST-compatible API (e.g. https://xyz.supabase.co); tables are read under `rest/v1/`
    #[arg(long, env = "REST_URL", global = true)]
    pub rest_url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "REST_API_KEY", global = true)]
    pub rest_api_key: Option<String>,

    /// How long store lookups are cached, in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "900", global = true)]
    pub cache_ttl_secs: u64,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080", global = true)]
    pub dashboard_addr: String,

    /// Season used when a request does not name one
    #[arg(long, env = "DEFAULT_SEASON", default_value = "2024", global = true)]
    pub default_season: i32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Rest,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the JSON API
    Serve,

    /// Analyse an upcoming fixture and print the result as JSON
    Analyze {
        #[arg(long)]
        league: i64,
        #[arg(long)]
        season: Option<i32>,
        /// Home team id
        #[arg(long)]
        home: i64,
        /// Away team id
        #[arg(long)]
        away: i64,
        /// Category id, e.g. `corners` or `shots_on_target`
        #[arg(long, default_value = "corners")]
        category: String,
        /// `team`, `match` or `1x2`
        #[arg(long, default_value = "team")]
        mode: String,
        /// `for` or `against`
        #[arg(long, default_value = "for")]
        direction: String,
        /// Line to test against; the suggested line when omitted
        #[arg(long)]
        line: Option<String>,
    },

    /// Print the league table
    Standings {
        #[arg(long)]
        league: i64,
        #[arg(long)]
        season: Option<i32>,
    },

    /// Load leagues, teams, fixtures and averages from a JSON file into SQLite
    Import { path: PathBuf },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store == StoreKind::Rest && self.rest_url.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!("REST_URL is required when STORE=rest");
        }
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("cache_ttl_secs must be positive");
        }
        if self.dashboard_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("dashboard_addr is not a valid socket address: {}", self.dashboard_addr);
        }
        if matches!(self.command, Command::Import { .. }) && self.store != StoreKind::Sqlite {
            anyhow::bail!("import writes to SQLite; run it with STORE=sqlite");
        }
        Ok(())
    }
}
