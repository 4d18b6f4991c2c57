//! League-level views: table, form guide, matchday picker and the
//! head-to-head comparison of two teams' averages.

pub mod compare;
pub mod matchday;
pub mod standings;

pub use compare::{compare_teams, CategoryComparison, ComparisonRow, ExpectedSplit};
pub use matchday::{matchday, matchday_number, optimal_matchday, Matchday};
pub use standings::{compute_standings, team_form, MatchResult, Standing, FORM_LENGTH};
