use serde::Serialize;

use super::category::AnalysisMode;
use super::line::Line;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedLines {
    /// `None` in head-to-head mode, where only the percentage is shown
    pub main_line: Option<Line>,
    pub alternatives: Vec<Line>,
    pub expected_value: f64,
}

/// Half-integer main line closest to `expected_value`:
/// `frac <= 0.25` rounds down, `frac >= 0.75` rounds up, anything in
/// between goes to the nearest integer, and `.5` is added in every case.
pub fn main_line_for(expected_value: f64) -> Line {
    let floor = expected_value.floor();
    let frac = expected_value - floor;
    let base = if frac <= 0.25 {
        floor
    } else if frac >= 0.75 {
        expected_value.ceil()
    } else {
        expected_value.round()
    };
    Line::from_half(base + 0.5)
}

/// Suggested line plus neighbours for an expected value.
///
/// Returns `None` when there is nothing to suggest from: an expected value
/// of zero (no data), negative or not finite. Head-to-head always returns
/// a percentage-only suggestion.
pub fn suggest_lines(expected_value: f64, mode: AnalysisMode) -> Option<SuggestedLines> {
    if mode == AnalysisMode::HeadToHead {
        return Some(SuggestedLines {
            main_line: None,
            alternatives: Vec::new(),
            expected_value,
        });
    }
    if !expected_value.is_finite() || expected_value <= 0.0 {
        return None;
    }

    let main = main_line_for(expected_value);
    // Two whole steps either side; stepping down stops at the lowest line
    let below = main.step_down();
    let above = main.step_up();
    let mut alternatives = vec![below.step_down(), below, main, above, above.step_up()];
    alternatives.sort_by(|a, b| a.value().total_cmp(&b.value()));
    alternatives.dedup();

    Some(SuggestedLines {
        main_line: Some(main),
        alternatives,
        expected_value,
    })
}
