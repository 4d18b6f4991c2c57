//! Value badges: turns two hit percentages into tiered recommendations
//! with a suggested stake (percentage of bankroll).

use serde::Serialize;

use super::category::AnalysisMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Good,
    /// Win rate strongly favours one side while production is nearly even
    CounterPick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    Over,
    Under,
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub tier: Tier,
    pub pick: Pick,
    pub stake: Option<f64>,
}

/// Under/over stake for a hit rate `p`.
pub fn stake_under_over(p: f64) -> Option<f64> {
    match p {
        p if p >= 90.0 => Some(2.0),
        p if p >= 85.0 => Some(1.5),
        p if p >= 75.0 => Some(1.25),
        p if p >= 70.0 => Some(1.0),
        p if p >= 65.0 => Some(0.75),
        _ => None,
    }
}

/// Head-to-head stake for the gap between the two win rates.
pub fn stake_1x2(diff: f64) -> Option<f64> {
    match diff {
        d if d > 70.0 => Some(2.0),
        d if d > 60.0 => Some(1.5),
        d if d > 50.0 => Some(1.25),
        d if d > 40.0 => Some(1.0),
        d if d > 30.0 => Some(0.75),
        _ => None,
    }
}

/// Counter-pick stake for the relative gap between expected values.
pub fn stake_contra(expected_diff_pct: f64) -> Option<f64> {
    match expected_diff_pct {
        d if d < 10.0 => Some(0.5),
        d if d < 15.0 => Some(0.35),
        d if d < 20.0 => Some(0.2),
        _ => None,
    }
}

fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// All badges that apply to the pair `(pct_a, pct_b)`.
///
/// `pct_a` is the home side, `pct_b` the away side. Missing or non-finite
/// percentages read as 0. The expected values are only consulted for the
/// head-to-head counter-pick.
pub fn classify(
    pct_a: Option<f64>,
    pct_b: Option<f64>,
    mode: AnalysisMode,
    expected_a: Option<f64>,
    expected_b: Option<f64>,
) -> Vec<Recommendation> {
    let a = sanitize(pct_a);
    let b = sanitize(pct_b);

    match mode {
        AnalysisMode::TeamUnderOver | AnalysisMode::MatchUnderOver => {
            classify_under_over(a, b).into_iter().collect()
        }
        AnalysisMode::HeadToHead => classify_head_to_head(a, b, expected_a, expected_b),
    }
}

fn classify_under_over(a: f64, b: f64) -> Option<Recommendation> {
    let avg = (a + b) / 2.0;
    let (tier, pick, confidence) = if avg >= 75.0 {
        (Tier::Excellent, Pick::Over, avg)
    } else if avg <= 25.0 {
        (Tier::Excellent, Pick::Under, 100.0 - avg)
    } else if avg > 65.0 {
        (Tier::Good, Pick::Over, avg)
    } else if avg <= 35.0 {
        (Tier::Good, Pick::Under, 100.0 - avg)
    } else {
        return None;
    };
    Some(Recommendation {
        tier,
        pick,
        stake: stake_under_over(confidence),
    })
}

fn classify_head_to_head(a: f64, b: f64, expected_a: Option<f64>, expected_b: Option<f64>) -> Vec<Recommendation> {
    let mut badges = Vec::new();
    let favourite = if a >= b { Pick::Home } else { Pick::Away };
    let underdog = if a >= b { Pick::Away } else { Pick::Home };
    let (high, low) = (a.max(b), a.min(b));
    let diff = (a - b).abs();

    if high >= 75.0 && low <= 25.0 {
        badges.push(Recommendation {
            tier: Tier::Excellent,
            pick: favourite,
            stake: stake_1x2(diff),
        });
    } else if (65.0..75.0).contains(&high) && (25.0..=35.0).contains(&low) {
        badges.push(Recommendation {
            tier: Tier::Good,
            pick: favourite,
            stake: stake_1x2(diff),
        });
    }

    let regular_value = high >= 65.0 && low <= 35.0;
    if let (Some(ea), Some(eb)) = (expected_a, expected_b) {
        if ea.is_finite() && eb.is_finite() && ea != 0.0 && eb != 0.0 {
            let max = ea.max(eb);
            let min = ea.min(eb);
            let expected_diff_pct = if max > 0.0 { (max - min) / max * 100.0 } else { 100.0 };
            if !regular_value && expected_diff_pct < 20.0 && diff > 30.0 {
                badges.push(Recommendation {
                    tier: Tier::CounterPick,
                    pick: underdog,
                    stake: stake_contra(expected_diff_pct),
                });
            }
        }
    }

    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uo(a: f64, b: f64) -> Vec<Recommendation> {
        classify(Some(a), Some(b), AnalysisMode::TeamUnderOver, None, None)
    }

    #[test]
    fn test_high_average_is_excellent_over() {
        let badges = uo(80.0, 82.0);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].tier, Tier::Excellent);
        assert_eq!(badges[0].pick, Pick::Over);
        assert_relative_eq!(badges[0].stake.unwrap(), 1.25);
    }

    #[test]
    fn test_low_average_is_excellent_under_with_mirrored_stake() {
        let badges = uo(10.0, 8.0);
        assert_eq!(badges[0].tier, Tier::Excellent);
        assert_eq!(badges[0].pick, Pick::Under);
        // 100 - 9 = 91
        assert_relative_eq!(badges[0].stake.unwrap(), 2.0);
    }

    #[test]
    fn test_good_bands_and_their_edges() {
        let good_over = uo(70.0, 70.0);
        assert_eq!((good_over[0].tier, good_over[0].pick), (Tier::Good, Pick::Over));
        assert_relative_eq!(good_over[0].stake.unwrap(), 1.0);

        let good_under = uo(35.0, 35.0);
        assert_eq!((good_under[0].tier, good_under[0].pick), (Tier::Good, Pick::Under));
        assert_relative_eq!(good_under[0].stake.unwrap(), 0.75);

        assert!(uo(65.0, 65.0).is_empty());
        assert!(uo(50.0, 50.0).is_empty());
        assert_eq!(uo(25.0, 25.0)[0].tier, Tier::Excellent);
        assert_eq!(uo(75.0, 75.0)[0].tier, Tier::Excellent);
    }

    #[test]
    fn test_missing_or_nan_percentages_read_as_zero() {
        let badges = classify(None, Some(f64::NAN), AnalysisMode::MatchUnderOver, None, None);
        assert_eq!(badges[0].pick, Pick::Under);
        assert_relative_eq!(badges[0].stake.unwrap(), 2.0);
    }

    #[test]
    fn test_head_to_head_excellent_picks_the_favourite() {
        let badges = classify(Some(20.0), Some(85.0), AnalysisMode::HeadToHead, None, None);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].tier, Tier::Excellent);
        assert_eq!(badges[0].pick, Pick::Away);
        assert_relative_eq!(badges[0].stake.unwrap(), 1.5);
    }

    #[test]
    fn test_head_to_head_good_band() {
        let badges = classify(Some(70.0), Some(30.0), AnalysisMode::HeadToHead, None, None);
        assert_eq!(badges[0].tier, Tier::Good);
        assert_eq!(badges[0].pick, Pick::Home);
        assert_relative_eq!(badges[0].stake.unwrap(), 0.75);
    }

    #[test]
    fn test_counter_pick_when_production_is_even() {
        // 60 vs 20 is not a regular value case, but the win rates are far apart
        let badges = classify(Some(60.0), Some(20.0), AnalysisMode::HeadToHead, Some(5.0), Some(4.8));
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].tier, Tier::CounterPick);
        assert_eq!(badges[0].pick, Pick::Away);
        assert_relative_eq!(badges[0].stake.unwrap(), 0.5);
    }

    #[test]
    fn test_counter_pick_suppressed_for_regular_value_or_missing_expectations() {
        assert!(classify(Some(70.0), Some(30.0), AnalysisMode::HeadToHead, Some(5.0), Some(5.0))
            .iter()
            .all(|b| b.tier != Tier::CounterPick));
        assert!(classify(Some(60.0), Some(20.0), AnalysisMode::HeadToHead, Some(5.0), Some(0.0)).is_empty());
        assert!(classify(Some(60.0), Some(20.0), AnalysisMode::HeadToHead, None, Some(5.0)).is_empty());
        // production too uneven
        assert!(classify(Some(60.0), Some(20.0), AnalysisMode::HeadToHead, Some(10.0), Some(5.0)).is_empty());
    }

    #[test]
    fn test_stake_tables() {
        assert_eq!(stake_under_over(64.9), None);
        assert_eq!(stake_under_over(90.0), Some(2.0));
        assert_eq!(stake_1x2(30.0), None);
        assert_eq!(stake_1x2(70.5), Some(2.0));
        assert_eq!(stake_contra(12.0), Some(0.35));
        assert_eq!(stake_contra(20.0), None);
    }
}
