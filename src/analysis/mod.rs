//! Pure statistics core: everything here works on already-fetched data and
//! performs no I/O.

pub mod aggregate;
pub mod badge;
pub mod category;
pub mod expected;
pub mod extract;
pub mod line;
pub mod line_stats;
pub mod suggest;

pub use aggregate::{averages_from_fixtures, is_finished, match_total, played_at, MatchTotal};
pub use badge::{classify, Pick, Recommendation, Tier};
pub use category::{AnalysisMode, Category, Direction, Side};
pub use expected::expected_value;
pub use extract::{stat_value, stat_value_by_id};
pub use line::Line;
pub use line_stats::{line_stats, LineStatsResult};
pub use suggest::{suggest_lines, SuggestedLines};
