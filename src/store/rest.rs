//! PostgREST (Supabase-style) fixture store.
//!
//! Tables are read through `GET {base}/rest/v1/{table}` with the usual
//! `column=op.value` filters. Fixture rows carry team names inside a raw
//! `data` JSON blob; statistics live in a separate `match_statistics` table
//! and precomputed averages in `team_statistics`, with per-venue values in
//! its `home_stats` / `away_stats` JSON columns.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

use super::FixtureStore;
use crate::analysis::Category;
use crate::db::models::{
    Fixture, FixtureStatus, League, MatchStatistics, StatAverages, Team, TeamAverageStats, Venue,
};
use crate::error::StoreError;

#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base: Url,
    api_key: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(StoreError::from)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        info!("REST store at {}", base);
        Ok(RestStore { http, base, api_key })
    }

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut url = self.base.join(&format!("rest/v1/{}", table))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, filters: &[(&str, String)]) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table, filters)?;
        debug!("GET {}", url);

        let mut req = self.http.get(url.clone());
        if let Some(key) = &self.api_key {
            req = req
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }
        let resp = req.send().await.map_err(|source| StoreError::Request {
            url: url.to_string(),
            source,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                table: table.to_string(),
                status,
                body,
            });
        }

        resp.json::<Vec<T>>().await.map_err(|e| StoreError::Payload {
            table: table.to_string(),
            message: e.to_string(),
        })
    }

    /// Statistics rows for the given fixtures, keyed by fixture id.
    async fn statistics_for(&self, fixture_ids: &[i64]) -> Result<HashMap<i64, MatchStatistics>> {
        if fixture_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = fixture_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let rows: Vec<Value> = self
            .select("match_statistics", &[("select", "*".into()), ("fixture_id", format!("in.({})", ids))])
            .await?;

        let mut by_fixture = HashMap::new();
        for row in rows {
            if let Some(id) = row.get("fixture_id").and_then(Value::as_i64) {
                by_fixture.insert(id, statistics_from_row(row)?);
            }
        }
        Ok(by_fixture)
    }
}

#[async_trait]
impl FixtureStore for RestStore {
    async fn list_fixtures(&self, team_id: i64, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let rows: Vec<FixtureRow> = self
            .select(
                "fixtures",
                &[
                    ("select", "*".into()),
                    ("or", format!("(home_team_id.eq.{0},away_team_id.eq.{0})", team_id)),
                    ("league_id", format!("eq.{}", league_id)),
                    ("season", format!("eq.{}", season)),
                    ("order", "date.desc".into()),
                ],
            )
            .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut statistics = self.statistics_for(&ids).await?;
        let fixtures: Vec<Fixture> = rows
            .into_iter()
            .map(|row| {
                let stats = statistics.remove(&row.id);
                row.into_fixture(stats)
            })
            .collect();

        info!(
            "Loaded {} fixtures for team {} ({} with statistics)",
            fixtures.len(),
            team_id,
            fixtures.iter().filter(|f| f.statistics.is_some()).count()
        );
        Ok(fixtures)
    }

    async fn team_averages(
        &self,
        team_id: i64,
        league_id: i64,
        season: i32,
        venue: Venue,
    ) -> Result<Option<TeamAverageStats>> {
        let rows: Vec<Value> = self
            .select(
                "team_statistics",
                &[
                    ("select", "*".into()),
                    ("team_id", format!("eq.{}", team_id)),
                    ("league_id", format!("eq.{}", league_id)),
                    ("season", format!("eq.{}", season)),
                    ("limit", "1".into()),
                ],
            )
            .await?;
        Ok(rows.first().map(|row| averages_from_row(row, team_id, venue)))
    }

    async fn list_league_fixtures(&self, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let rows: Vec<FixtureRow> = self
            .select(
                "fixtures",
                &[
                    ("select", "*".into()),
                    ("league_id", format!("eq.{}", league_id)),
                    ("season", format!("eq.{}", season)),
                    ("order", "date.asc".into()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|row| row.into_fixture(None)).collect())
    }

    async fn get_team(&self, team_id: i64) -> Result<Option<Team>> {
        let rows: Vec<Team> = self
            .select(
                "teams",
                &[("select", "id,name,logo".into()), ("id", format!("eq.{}", team_id)), ("limit", "1".into())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_leagues(&self) -> Result<Vec<League>> {
        let rows: Vec<LeagueRow> = self
            .select("leagues", &[("select", "*".into()), ("order", "id.asc".into())])
            .await?;
        Ok(rows.into_iter().map(League::from).collect())
    }

    fn name(&self) -> &str {
        "rest"
    }
}

// ── Row types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FixtureRow {
    id: i64,
    date: DateTime<Utc>,
    league_id: i64,
    season: i32,
    #[serde(default)]
    round: Option<String>,
    home_team_id: i64,
    away_team_id: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    score_home: Option<i32>,
    #[serde(default)]
    score_away: Option<i32>,
    /// Raw provider payload, sometimes stored as a JSON string
    #[serde(default)]
    data: Option<Value>,
}

impl FixtureRow {
    fn into_fixture(self, statistics: Option<MatchStatistics>) -> Fixture {
        let data = self.data.as_ref().and_then(decode_json_column);
        let team = |side: &str, field: &str| -> Option<String> {
            data.as_ref()?
                .get("teams")?
                .get(side)?
                .get(field)?
                .as_str()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Fixture {
            id: self.id,
            date: self.date,
            league_id: self.league_id,
            season: self.season,
            round: self.round.or_else(|| {
                data.as_ref()
                    .and_then(|d| d.pointer("/league/round"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            }),
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            status: FixtureStatus::from_code(self.status.as_deref().unwrap_or("NS")),
            score_home: self.score_home,
            score_away: self.score_away,
            statistics,
            home_team_name: team("home", "name"),
            away_team_name: team("away", "name"),
            home_team_logo: team("home", "logo"),
            away_team_logo: team("away", "logo"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LeagueRow {
    id: i64,
    name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default, alias = "season")]
    current_season: Option<i32>,
}

impl From<LeagueRow> for League {
    fn from(row: LeagueRow) -> Self {
        League {
            id: row.id,
            name: row.name,
            country: row.country,
            logo: row.logo,
            current_season: row.current_season,
        }
    }
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

/// JSON columns come back either as objects or as JSON-encoded strings.
fn decode_json_column(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        Value::Object(_) => Some(value.clone()),
        _ => None,
    }
}

/// Null columns read as 0, like absent ones.
fn statistics_from_row(row: Value) -> Result<MatchStatistics, StoreError> {
    let Value::Object(mut map) = row else {
        return Err(StoreError::Payload {
            table: "match_statistics".to_string(),
            message: "row is not an object".to_string(),
        });
    };
    map.retain(|_, v| !v.is_null());
    serde_json::from_value(Value::Object(map)).map_err(|e| StoreError::Payload {
        table: "match_statistics".to_string(),
        message: e.to_string(),
    })
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Averages for one venue out of a `team_statistics` row. Each value is
/// looked up in the venue JSON first, then among the row's own columns,
/// and reads as 0 when neither has it.
fn averages_from_row(row: &Value, team_id: i64, venue: Venue) -> TeamAverageStats {
    let column = match venue {
        Venue::Home => "home_stats",
        Venue::Away => "away_stats",
    };
    let venue_stats = row.get(column).and_then(decode_json_column);
    let lookup = |key: &str| -> f64 {
        number(venue_stats.as_ref().and_then(|v| v.get(key)))
            .or_else(|| number(row.get(key)))
            .unwrap_or(0.0)
    };

    let mut averages = TeamAverageStats::new(team_id, venue);
    averages.matches = number(venue_stats.as_ref().and_then(|v| v.get("matches")))
        .map(|m| m.max(0.0) as u32);
    for category in Category::ALL {
        let stem = category.average_column();
        let mut values = StatAverages {
            for_avg: lookup(&format!("avg_{}", stem)),
            against_avg: lookup(&format!("avg_{}_against", stem)),
        };
        // Cards count yellow plus red, as they do per match
        if category == Category::Cards {
            values.for_avg += lookup("avg_red_cards");
            values.against_avg += lookup("avg_red_cards_against");
        }
        averages.set(category, values);
    }
    averages
}
