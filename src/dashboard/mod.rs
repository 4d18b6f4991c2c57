use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::analysis::{AnalysisMode, Category, Direction, Line};
use crate::db::models::League;
use crate::engine::{AnalysisEngine, AnalysisRequest, MatchAnalysis, TeamComparison};
use crate::league::{Matchday, Standing};

#[derive(Clone)]
pub struct AppState {
    pub engine: AnalysisEngine,
    /// Used when a request omits `season`
    pub default_season: i32,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Build the Axum router for the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/leagues", get(leagues_handler))
        .route("/api/leagues/:id/standings", get(standings_handler))
        .route("/api/leagues/:id/matchday", get(matchday_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/analysis", get(analysis_handler))
        .route("/api/compare", get(compare_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn bad_request(e: impl Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!("Request failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}

/// Parse an optional query value, falling back to `default` when absent.
fn parse_or<T>(raw: Option<&str>, default: T) -> Result<T, (StatusCode, String)>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map_err(bad_request),
        None => Ok(default),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<i32>,
    /// Matchday endpoint only; the most relevant matchday when absent
    pub number: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub league: i64,
    pub season: Option<i32>,
    pub home: i64,
    pub away: i64,
    pub category: Option<String>,
    pub mode: Option<String>,
    pub direction: Option<String>,
    pub line: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub league: i64,
    pub season: Option<i32>,
    pub home: i64,
    pub away: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub lower_is_better: bool,
}

/// GET /api/leagues
async fn leagues_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<League>> {
    state
        .engine
        .store()
        .list_leagues()
        .await
        .map(Json)
        .map_err(internal)
}

/// GET /api/leagues/:id/standings?season=2024
async fn standings_handler(
    State(state): State<Arc<AppState>>,
    Path(league_id): Path<i64>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult<Vec<Standing>> {
    let season = q.season.unwrap_or(state.default_season);
    state
        .engine
        .standings(league_id, season)
        .await
        .map(Json)
        .map_err(internal)
}

/// GET /api/leagues/:id/matchday?season=2024&number=12
async fn matchday_handler(
    State(state): State<Arc<AppState>>,
    Path(league_id): Path<i64>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult<Matchday> {
    let season = q.season.unwrap_or(state.default_season);
    state
        .engine
        .matchday(league_id, season, q.number, Utc::now())
        .await
        .map(Json)
        .map_err(internal)
}

/// GET /api/categories?mode=team
async fn categories_handler(Query(q): Query<CategoriesQuery>) -> ApiResult<Vec<CategoryInfo>> {
    let mode = parse_or(q.mode.as_deref(), AnalysisMode::TeamUnderOver)?;
    Ok(Json(
        mode.categories()
            .into_iter()
            .map(|c| CategoryInfo {
                id: c.id(),
                label: c.label(),
                lower_is_better: c.is_negative(),
            })
            .collect(),
    ))
}

/// GET /api/analysis?league=&season=&home=&away=&category=&mode=&direction=&line=
async fn analysis_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AnalysisQuery>,
) -> ApiResult<MatchAnalysis> {
    let request = analysis_request(&q, state.default_season)?;
    state.engine.analyze(request).await.map(Json).map_err(internal)
}

fn analysis_request(q: &AnalysisQuery, default_season: i32) -> Result<AnalysisRequest, (StatusCode, String)> {
    if q.home == q.away {
        return Err(bad_request("home and away must be different teams"));
    }
    let mode = parse_or(q.mode.as_deref(), AnalysisMode::TeamUnderOver)?;
    let category = parse_or(q.category.as_deref(), Category::Corners)?;
    if !mode.categories().contains(&category) {
        return Err(bad_request(format!("category '{}' is not available in {} mode", category, mode)));
    }
    let line = match q.line.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<Line>().map_err(bad_request)?),
        None => None,
    };
    Ok(AnalysisRequest {
        league_id: q.league,
        season: q.season.unwrap_or(default_season),
        home_team_id: q.home,
        away_team_id: q.away,
        category,
        mode,
        direction: parse_or(q.direction.as_deref(), Direction::For)?,
        line,
    })
}

/// GET /api/compare?league=&season=&home=&away=
async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CompareQuery>,
) -> ApiResult<TeamComparison> {
    if q.home == q.away {
        return Err(bad_request("home and away must be different teams"));
    }
    let season = q.season.unwrap_or(state.default_season);
    state
        .engine
        .compare(q.league, season, q.home, q.away)
        .await
        .map(Json)
        .map_err(internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Fixture, Team, TeamAverageStats, Venue};
    use crate::db::Database;
    use crate::store::FixtureStore;
    use crate::test_support::{corners, make_fixture, AWAY, HOME};
    use anyhow::anyhow;
    use async_trait::async_trait;

    fn state(db: Database) -> Arc<AppState> {
        Arc::new(AppState {
            engine: AnalysisEngine::new(Arc::new(db)),
            default_season: 2024,
        })
    }

    fn query(category: &str, mode: &str, line: Option<&str>) -> AnalysisQuery {
        AnalysisQuery {
            league: 135,
            season: None,
            home: HOME,
            away: AWAY,
            category: Some(category.into()),
            mode: Some(mode.into()),
            direction: None,
            line: line.map(str::to_string),
        }
    }

    #[test]
    fn test_analysis_request_defaults_and_validation() {
        let request = analysis_request(&query("corners", "team", Some("8")), 2023).unwrap();
        assert_eq!(request.season, 2023);
        assert_eq!(request.direction, Direction::For);
        assert_eq!(request.line.map(|l| l.value()), Some(8.5));

        let (status, message) = analysis_request(&query("goals", "team", None), 2024).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("goals"));
        assert!(analysis_request(&query("corners", "poker", None), 2024).is_err());
        assert!(analysis_request(&query("corners", "team", Some("-3")), 2024).is_err());
        assert!(analysis_request(&query("saves", "match", None), 2024).is_err());

        let mut same = query("corners", "team", None);
        same.away = HOME;
        assert!(analysis_request(&same, 2024).is_err());
    }

    #[tokio::test]
    async fn test_analysis_handler_returns_json() {
        let db = Database::open(":memory:").unwrap();
        for i in 1..=4 {
            db.upsert_fixture(&make_fixture(i, HOME, 300 + i, Some(corners(9, 2)))).unwrap();
        }
        let Json(analysis) = analysis_handler(State(state(db)), Query(query("corners", "team", Some("8.5"))))
            .await
            .unwrap();
        assert_eq!(analysis.home.stats.map(|s| s.over), Some(4));
        assert_eq!(analysis.request.season, 2024);
    }

    #[tokio::test]
    async fn test_categories_by_mode() {
        let Json(all) = categories_handler(Query(CategoriesQuery::default())).await.unwrap();
        let Json(matched) = categories_handler(Query(CategoriesQuery { mode: Some("match".into()) }))
            .await
            .unwrap();
        assert_eq!(all.len(), matched.len() + 1);
        assert!(!matched.iter().any(|c| c.id == "saves"));
        assert!(all.iter().any(|c| c.id == "fouls" && c.lower_is_better));

        let err = categories_handler(Query(CategoriesQuery { mode: Some("x".into()) })).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    struct FailingStore;

    #[async_trait]
    impl FixtureStore for FailingStore {
        async fn list_fixtures(&self, _: i64, _: i64, _: i32) -> anyhow::Result<Vec<Fixture>> {
            Err(anyhow!("connection refused"))
        }
        async fn team_averages(&self, _: i64, _: i64, _: i32, _: Venue) -> anyhow::Result<Option<TeamAverageStats>> {
            Err(anyhow!("connection refused"))
        }
        async fn list_league_fixtures(&self, _: i64, _: i32) -> anyhow::Result<Vec<Fixture>> {
            Err(anyhow!("connection refused"))
        }
        async fn get_team(&self, _: i64) -> anyhow::Result<Option<Team>> {
            Err(anyhow!("connection refused"))
        }
        async fn list_leagues(&self) -> anyhow::Result<Vec<League>> {
            Err(anyhow!("connection refused"))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_store_failures_are_internal_errors() {
        let state = Arc::new(AppState {
            engine: AnalysisEngine::new(Arc::new(FailingStore)),
            default_season: 2024,
        });
        let err = standings_handler(State(state.clone()), Path(135), Query(SeasonQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.1.contains("connection refused"));

        let err = leagues_handler(State(state)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
