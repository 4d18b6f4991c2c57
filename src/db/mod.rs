use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub mod models;
use models::*;

use crate::analysis::Category;
use crate::store::FixtureStore;

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path.
    /// `":memory:"` gives a throwaway database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("Failed to open database {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    // ── Leagues & teams ──────────────────────────────────────────────────────

    pub fn list_leagues(&self) -> Result<Vec<League>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, country, logo, current_season FROM leagues ORDER BY id",
        )?;
        let leagues = stmt
            .query_map([], map_league)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leagues)
    }

    pub fn get_team(&self, team_id: i64) -> Result<Option<Team>> {
        let conn = self.lock()?;
        let team = conn
            .query_row(
                "SELECT id, name, logo FROM teams WHERE id = ?1",
                params![team_id],
                map_team,
            )
            .optional()?;
        Ok(team)
    }

    // ── Fixtures ─────────────────────────────────────────────────────────────

    /// Insert or update a fixture, and its statistics when present.
    pub fn upsert_fixture(&self, fixture: &Fixture) -> Result<()> {
        let conn = self.lock()?;
        insert_fixture(&conn, fixture)
    }

    /// Fixtures of one team in a league season, newest first
    pub fn list_team_fixtures(&self, team_id: i64, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let conn = self.lock()?;
        let sql = format!(
            "{FIXTURE_SELECT}
             WHERE (f.home_team_id = ?1 OR f.away_team_id = ?1)
               AND f.league_id = ?2 AND f.season = ?3
             ORDER BY f.date DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let fixtures = stmt
            .query_map(params![team_id, league_id, season], map_fixture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fixtures)
    }

    /// Every fixture of a league season, oldest first
    pub fn list_league_fixtures(&self, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let conn = self.lock()?;
        let sql = format!(
            "{FIXTURE_SELECT}
             WHERE f.league_id = ?1 AND f.season = ?2
             ORDER BY f.date ASC, f.id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let fixtures = stmt
            .query_map(params![league_id, season], map_fixture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fixtures)
    }

    // ── Team averages ────────────────────────────────────────────────────────

    pub fn upsert_team_averages(&self, league_id: i64, season: i32, averages: &TeamAverageStats) -> Result<()> {
        let conn = self.lock()?;
        insert_team_averages(&conn, league_id, season, averages)
    }

    pub fn get_team_averages(
        &self,
        team_id: i64,
        league_id: i64,
        season: i32,
        venue: Venue,
    ) -> Result<Option<TeamAverageStats>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT category, avg_for, avg_against, matches FROM team_averages
             WHERE team_id = ?1 AND league_id = ?2 AND season = ?3 AND venue = ?4",
        )?;
        let rows = stmt
            .query_map(params![team_id, league_id, season, venue.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, Option<u32>>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut averages = TeamAverageStats::new(team_id, venue);
        for (category_id, for_avg, against_avg, matches) in rows {
            let Some(category) = Category::from_id(&category_id) else {
                warn!("Ignoring averages for unknown category '{}'", category_id);
                continue;
            };
            averages.set(category, StatAverages { for_avg, against_avg });
            averages.matches = averages.matches.or(matches);
        }
        Ok(Some(averages))
    }

    // ── Import ───────────────────────────────────────────────────────────────

    /// Load a bundle in a single transaction.
    pub fn import(&self, bundle: &ImportBundle) -> Result<ImportSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for league in &bundle.leagues {
            insert_league(&tx, league)?;
        }
        for team in &bundle.teams {
            insert_team(&tx, team)?;
        }
        let mut with_statistics = 0;
        for fixture in &bundle.fixtures {
            insert_fixture(&tx, fixture).with_context(|| format!("Failed to import fixture {}", fixture.id))?;
            if fixture.statistics.is_some() {
                with_statistics += 1;
            }
        }
        for entry in &bundle.team_averages {
            insert_team_averages(&tx, entry.league_id, entry.season, &entry.averages)?;
        }
        tx.commit()?;

        let summary = ImportSummary {
            leagues: bundle.leagues.len(),
            teams: bundle.teams.len(),
            fixtures: bundle.fixtures.len(),
            fixtures_with_statistics: with_statistics,
            team_averages: bundle.team_averages.len(),
        };
        info!(
            "Imported {} leagues, {} teams, {} fixtures ({} with statistics), {} average records",
            summary.leagues, summary.teams, summary.fixtures, summary.fixtures_with_statistics, summary.team_averages
        );
        Ok(summary)
    }
}

#[async_trait]
impl FixtureStore for Database {
    async fn list_fixtures(&self, team_id: i64, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        let fixtures = self.list_team_fixtures(team_id, league_id, season)?;
        debug!("sqlite: {} fixtures for team {}", fixtures.len(), team_id);
        Ok(fixtures)
    }

    async fn team_averages(
        &self,
        team_id: i64,
        league_id: i64,
        season: i32,
        venue: Venue,
    ) -> Result<Option<TeamAverageStats>> {
        self.get_team_averages(team_id, league_id, season, venue)
    }

    async fn list_league_fixtures(&self, league_id: i64, season: i32) -> Result<Vec<Fixture>> {
        Database::list_league_fixtures(self, league_id, season)
    }

    async fn get_team(&self, team_id: i64) -> Result<Option<Team>> {
        Database::get_team(self, team_id)
    }

    async fn list_leagues(&self) -> Result<Vec<League>> {
        Database::list_leagues(self)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

/// Contents of an `import` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportBundle {
    pub leagues: Vec<League>,
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
    pub team_averages: Vec<AveragesRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AveragesRecord {
    pub league_id: i64,
    pub season: i32,
    #[serde(flatten)]
    pub averages: TeamAverageStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub leagues: usize,
    pub teams: usize,
    pub fixtures: usize,
    pub fixtures_with_statistics: usize,
    pub team_averages: usize,
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn insert_league(conn: &Connection, league: &League) -> Result<()> {
    conn.execute(
        "INSERT INTO leagues (id, name, country, logo, current_season)
         VALUES (?1,?2,?3,?4,?5)
         ON CONFLICT(id) DO UPDATE SET
            name=excluded.name,
            country=excluded.country,
            logo=excluded.logo,
            current_season=excluded.current_season",
        params![league.id, league.name, league.country, league.logo, league.current_season],
    )?;
    Ok(())
}

fn insert_team(conn: &Connection, team: &Team) -> Result<()> {
    conn.execute(
        "INSERT INTO teams (id, name, logo) VALUES (?1,?2,?3)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, logo=excluded.logo",
        params![team.id, team.name, team.logo],
    )?;
    Ok(())
}

fn insert_fixture(conn: &Connection, f: &Fixture) -> Result<()> {
    // Names carried on the fixture seed the teams table without clobbering
    // names already imported.
    for (id, name, logo) in [
        (f.home_team_id, &f.home_team_name, &f.home_team_logo),
        (f.away_team_id, &f.away_team_name, &f.away_team_logo),
    ] {
        if let Some(name) = name {
            conn.execute(
                "INSERT INTO teams (id, name, logo) VALUES (?1,?2,?3) ON CONFLICT(id) DO NOTHING",
                params![id, name, logo],
            )?;
        }
    }

    conn.execute(
        "INSERT INTO fixtures (id, date, league_id, season, round, home_team_id,
                               away_team_id, status, score_home, score_away)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
         ON CONFLICT(id) DO UPDATE SET
            date=excluded.date,
            round=excluded.round,
            status=excluded.status,
            score_home=excluded.score_home,
            score_away=excluded.score_away",
        params![
            f.id,
            f.date,
            f.league_id,
            f.season,
            f.round,
            f.home_team_id,
            f.away_team_id,
            f.status.code(),
            f.score_home,
            f.score_away,
        ],
    )?;

    if let Some(s) = &f.statistics {
        conn.execute(
            "INSERT OR REPLACE INTO match_statistics (
                fixture_id, shots_home, shots_away, shots_on_target_home, shots_on_target_away,
                corners_home, corners_away, corners_ht_home, corners_ht_away,
                fouls_home, fouls_away, yellow_cards_home, yellow_cards_away,
                red_cards_home, red_cards_away, offsides_home, offsides_away,
                saves_home, saves_away
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)",
            params![
                f.id,
                s.shots_home,
                s.shots_away,
                s.shots_on_target_home,
                s.shots_on_target_away,
                s.corners_home,
                s.corners_away,
                s.corners_ht_home,
                s.corners_ht_away,
                s.fouls_home,
                s.fouls_away,
                s.yellow_cards_home,
                s.yellow_cards_away,
                s.red_cards_home,
                s.red_cards_away,
                s.offsides_home,
                s.offsides_away,
                s.saves_home,
                s.saves_away,
            ],
        )?;
    }
    Ok(())
}

fn insert_team_averages(conn: &Connection, league_id: i64, season: i32, averages: &TeamAverageStats) -> Result<()> {
    let venue = averages
        .venue
        .context("team averages must name a venue (home or away)")?;
    for (category, values) in &averages.categories {
        conn.execute(
            "INSERT INTO team_averages (team_id, league_id, season, venue, category,
                                        avg_for, avg_against, matches)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
             ON CONFLICT(team_id, league_id, season, venue, category) DO UPDATE SET
                avg_for=excluded.avg_for,
                avg_against=excluded.avg_against,
                matches=excluded.matches",
            params![
                averages.team_id,
                league_id,
                season,
                venue.as_str(),
                category.id(),
                values.for_avg,
                values.against_avg,
                averages.matches,
            ],
        )?;
    }
    Ok(())
}

const FIXTURE_SELECT: &str = "SELECT f.id, f.date, f.league_id, f.season, f.round,
        f.home_team_id, f.away_team_id, f.status, f.score_home, f.score_away,
        ht.name, awt.name, ht.logo, awt.logo,
        s.fixture_id,
        s.shots_home, s.shots_away, s.shots_on_target_home, s.shots_on_target_away,
        s.corners_home, s.corners_away, s.corners_ht_home, s.corners_ht_away,
        s.fouls_home, s.fouls_away, s.yellow_cards_home, s.yellow_cards_away,
        s.red_cards_home, s.red_cards_away, s.offsides_home, s.offsides_away,
        s.saves_home, s.saves_away
    FROM fixtures f
    LEFT JOIN teams ht ON ht.id = f.home_team_id
    LEFT JOIN teams awt ON awt.id = f.away_team_id
    LEFT JOIN match_statistics s ON s.fixture_id = f.id";

fn map_fixture(row: &rusqlite::Row) -> rusqlite::Result<Fixture> {
    let stats_fixture: Option<i64> = row.get(14)?;
    let statistics = match stats_fixture {
        Some(_) => Some(MatchStatistics {
            shots_home: row.get(15)?,
            shots_away: row.get(16)?,
            shots_on_target_home: row.get(17)?,
            shots_on_target_away: row.get(18)?,
            corners_home: row.get(19)?,
            corners_away: row.get(20)?,
            corners_ht_home: row.get(21)?,
            corners_ht_away: row.get(22)?,
            fouls_home: row.get(23)?,
            fouls_away: row.get(24)?,
            yellow_cards_home: row.get(25)?,
            yellow_cards_away: row.get(26)?,
            red_cards_home: row.get(27)?,
            red_cards_away: row.get(28)?,
            offsides_home: row.get(29)?,
            offsides_away: row.get(30)?,
            saves_home: row.get(31)?,
            saves_away: row.get(32)?,
        }),
        None => None,
    };
    let status: String = row.get(7)?;
    Ok(Fixture {
        id: row.get(0)?,
        date: row.get(1)?,
        league_id: row.get(2)?,
        season: row.get(3)?,
        round: row.get(4)?,
        home_team_id: row.get(5)?,
        away_team_id: row.get(6)?,
        status: FixtureStatus::from_code(&status),
        score_home: row.get(8)?,
        score_away: row.get(9)?,
        statistics,
        home_team_name: row.get(10)?,
        away_team_name: row.get(11)?,
        home_team_logo: row.get(12)?,
        away_team_logo: row.get(13)?,
    })
}

fn map_league(row: &rusqlite::Row) -> rusqlite::Result<League> {
    Ok(League {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        logo: row.get(3)?,
        current_season: row.get(4)?,
    })
}

fn map_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        logo: row.get(2)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS leagues (
    id             INTEGER PRIMARY KEY,
    name           TEXT    NOT NULL,
    country        TEXT,
    logo           TEXT,
    current_season INTEGER
);

CREATE TABLE IF NOT EXISTS teams (
    id   INTEGER PRIMARY KEY,
    name TEXT    NOT NULL,
    logo TEXT
);

CREATE TABLE IF NOT EXISTS fixtures (
    id           INTEGER PRIMARY KEY,
    date         TEXT    NOT NULL,
    league_id    INTEGER NOT NULL,
    season       INTEGER NOT NULL,
    round        TEXT,
    home_team_id INTEGER NOT NULL,
    away_team_id INTEGER NOT NULL,
    status       TEXT    NOT NULL,
    score_home   INTEGER,
    score_away   INTEGER
);

CREATE TABLE IF NOT EXISTS match_statistics (
    fixture_id           INTEGER PRIMARY KEY,
    shots_home           INTEGER NOT NULL DEFAULT 0,
    shots_away           INTEGER NOT NULL DEFAULT 0,
    shots_on_target_home INTEGER NOT NULL DEFAULT 0,
    shots_on_target_away INTEGER NOT NULL DEFAULT 0,
    corners_home         INTEGER NOT NULL DEFAULT 0,
    corners_away         INTEGER NOT NULL DEFAULT 0,
    corners_ht_home      INTEGER NOT NULL DEFAULT 0,
    corners_ht_away      INTEGER NOT NULL DEFAULT 0,
    fouls_home           INTEGER NOT NULL DEFAULT 0,
    fouls_away           INTEGER NOT NULL DEFAULT 0,
    yellow_cards_home    INTEGER NOT NULL DEFAULT 0,
    yellow_cards_away    INTEGER NOT NULL DEFAULT 0,
    red_cards_home       INTEGER NOT NULL DEFAULT 0,
    red_cards_away       INTEGER NOT NULL DEFAULT 0,
    offsides_home        INTEGER NOT NULL DEFAULT 0,
    offsides_away        INTEGER NOT NULL DEFAULT 0,
    saves_home           INTEGER NOT NULL DEFAULT 0,
    saves_away           INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (fixture_id) REFERENCES fixtures(id)
);

CREATE TABLE IF NOT EXISTS team_averages (
    team_id     INTEGER NOT NULL,
    league_id   INTEGER NOT NULL,
    season      INTEGER NOT NULL,
    venue       TEXT    NOT NULL,
    category    TEXT    NOT NULL,
    avg_for     REAL    NOT NULL,
    avg_against REAL    NOT NULL,
    matches     INTEGER,
    PRIMARY KEY (team_id, league_id, season, venue, category)
);

CREATE INDEX IF NOT EXISTS idx_fixtures_league ON fixtures(league_id, season);
CREATE INDEX IF NOT EXISTS idx_fixtures_home ON fixtures(home_team_id);
CREATE INDEX IF NOT EXISTS idx_fixtures_away ON fixtures(away_team_id);
"#;
