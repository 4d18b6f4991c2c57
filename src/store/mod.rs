pub mod cache;
pub mod cached;
pub mod rest;

pub use cache::{Clock, SystemClock, TtlCache};
pub use cached::CachedStore;
pub use rest::RestStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::{Fixture, League, Team, TeamAverageStats, Venue};

/// Source of fixtures, statistics and precomputed averages.
#[async_trait]
pub trait FixtureStore: Send + Sync {
    /// All fixtures of `team_id` in a league season, newest first, with
    /// statistics embedded where the store has them.
    async fn list_fixtures(&self, team_id: i64, league_id: i64, season: i32) -> Result<Vec<Fixture>>;

    /// Precomputed averages for one venue context, or `None` when the store
    /// has none for this team.
    async fn team_averages(
        &self,
        team_id: i64,
        league_id: i64,
        season: i32,
        venue: Venue,
    ) -> Result<Option<TeamAverageStats>>;

    /// Every fixture of a league season, oldest first.
    async fn list_league_fixtures(&self, league_id: i64, season: i32) -> Result<Vec<Fixture>>;

    async fn get_team(&self, team_id: i64) -> Result<Option<Team>>;

    async fn list_leagues(&self) -> Result<Vec<League>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
