use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::cache::{Clock, SystemClock, TtlCache};
use super::FixtureStore;
use crate::db::models::{Fixture, League, Team, TeamAverageStats, Venue};

/// Default time-to-live for cached store responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Wraps a store so repeated lookups within the TTL are served from memory.
/// Failed lookups are never cached.
pub struct CachedStore<S> {
    inner: S,
    name: String,
    fixtures: TtlCache<Vec<Fixture>>,
    averages: TtlCache<Option<TeamAverageStats>>,
    league_fixtures: TtlCache<Vec<Fixture>>,
    teams: TtlCache<Option<Team>>,
    leagues: TtlCache<Vec<League>>,
}

impl<S: FixtureStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let name = format!("cached({})", inner.name());
        CachedStore {
            inner,
            name,
            fixtures: TtlCache::with_clock(ttl, clock.clone()),
            averages: TtlCache::with_clock(ttl, clock.clone()),
            league_fixtures: TtlCache::with_clock(ttl, clock.clone()),
            teams: TtlCache::with_clock(ttl, clock.clone()),
            leagues: TtlCache::with_clock(ttl, clock),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: FixtureStore> FixtureStore for CachedStore<S> {
    async fn list_fixtures(&self, team_id: i64, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let key = format!("team_fixtures:{}:{}:{}", team_id, league_id, season);
        if let Some(hit) = self.fixtures.get(&key).await {
            debug!("cache hit {}", key);
            return Ok(hit);
        }
        let fixtures = self.inner.list_fixtures(team_id, league_id, season).await?;
        self.fixtures.set(key, fixtures.clone()).await;
        Ok(fixtures)
    }

    async fn team_averages(
        &self,
        team_id: i64,
        league_id: i64,
        season: i32,
        venue: Venue,
    ) -> Result<Option<TeamAverageStats>> {
        let key = format!("team_averages:{}:{}:{}:{}", team_id, league_id, season, venue);
        if let Some(hit) = self.averages.get(&key).await {
            debug!("cache hit {}", key);
            return Ok(hit);
        }
        let averages = self.inner.team_averages(team_id, league_id, season, venue).await?;
        self.averages.set(key, averages.clone()).await;
        Ok(averages)
    }

    async fn list_league_fixtures(&self, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let key = format!("league_fixtures:{}:{}", league_id, season);
        if let Some(hit) = self.league_fixtures.get(&key).await {
            debug!("cache hit {}", key);
            return Ok(hit);
        }
        let fixtures = self.inner.list_league_fixtures(league_id, season).await?;
        self.league_fixtures.set(key, fixtures.clone()).await;
        Ok(fixtures)
    }

    async fn get_team(&self, team_id: i64) -> Result<Option<Team>> {
        let key = format!("team:{}", team_id);
        if let Some(hit) = self.teams.get(&key).await {
            return Ok(hit);
        }
        let team = self.inner.get_team(team_id).await?;
        self.teams.set(key, team.clone()).await;
        Ok(team)
    }

    async fn list_leagues(&self) -> Result<Vec<League>> {
        if let Some(hit) = self.leagues.get("leagues").await {
            return Ok(hit);
        }
        let leagues = self.inner.list_leagues().await?;
        self.leagues.set("leagues", leagues.clone()).await;
        Ok(leagues)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
