//! Football statistics for over/under and head-to-head betting markets:
//! per-category hit rates against a line, expected values, suggested lines
//! and value badges, served from SQLite or a PostgREST-style API.

pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod engine;
pub mod error;
pub mod league;
pub mod store;

#[cfg(test)]
mod test_support;
