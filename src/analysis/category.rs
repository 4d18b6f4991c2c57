//! Closed sets the analysis is parameterised by: statistic category,
//! analysis mode, direction and side.
//!
//! Every category resolves through [`Category::fields`] to a pair of
//! accessors into [`MatchStatistics`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::models::MatchStatistics;
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Shots,
    ShotsOnTarget,
    Corners,
    CornersFirstHalf,
    Fouls,
    Cards,
    Offsides,
    Saves,
}

/// Home/away accessors for one category.
#[derive(Clone, Copy)]
pub struct SideFields {
    pub home: fn(&MatchStatistics) -> u32,
    pub away: fn(&MatchStatistics) -> u32,
}

impl SideFields {
    pub fn get(&self, stats: &MatchStatistics, side: Side) -> u32 {
        match side {
            Side::Home => (self.home)(stats),
            Side::Away => (self.away)(stats),
        }
    }
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Shots,
        Category::ShotsOnTarget,
        Category::Corners,
        Category::CornersFirstHalf,
        Category::Fouls,
        Category::Cards,
        Category::Offsides,
        Category::Saves,
    ];

    pub fn fields(self) -> SideFields {
        match self {
            Category::Shots => SideFields {
                home: |s| s.shots_home,
                away: |s| s.shots_away,
            },
            Category::ShotsOnTarget => SideFields {
                home: |s| s.shots_on_target_home,
                away: |s| s.shots_on_target_away,
            },
            Category::Corners => SideFields {
                home: |s| s.corners_home,
                away: |s| s.corners_away,
            },
            Category::CornersFirstHalf => SideFields {
                home: |s| s.corners_ht_home,
                away: |s| s.corners_ht_away,
            },
            Category::Fouls => SideFields {
                home: |s| s.fouls_home,
                away: |s| s.fouls_away,
            },
            Category::Cards => SideFields {
                home: MatchStatistics::cards_home,
                away: MatchStatistics::cards_away,
            },
            Category::Offsides => SideFields {
                home: |s| s.offsides_home,
                away: |s| s.offsides_away,
            },
            Category::Saves => SideFields {
                home: |s| s.saves_home,
                away: |s| s.saves_away,
            },
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Category::Shots => "shots",
            Category::ShotsOnTarget => "shots_on_target",
            Category::Corners => "corners",
            Category::CornersFirstHalf => "corners_first_half",
            Category::Fouls => "fouls",
            Category::Cards => "cards",
            Category::Offsides => "offsides",
            Category::Saves => "saves",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Shots => "Shots",
            Category::ShotsOnTarget => "Shots on target",
            Category::Corners => "Corners",
            Category::CornersFirstHalf => "First-half corners",
            Category::Fouls => "Fouls",
            Category::Cards => "Cards",
            Category::Offsides => "Offsides",
            Category::Saves => "Saves",
        }
    }

    /// Column stem used by precomputed average tables (`avg_<stem>`,
    /// `avg_<stem>_against`). For cards this is the yellow-card column; the
    /// red-card averages are added on top when reading.
    pub fn average_column(self) -> &'static str {
        match self {
            Category::Shots => "shots",
            Category::ShotsOnTarget => "shots_on_target",
            Category::Corners => "corners",
            Category::CornersFirstHalf => "corners_ht",
            Category::Fouls => "fouls",
            Category::Cards => "yellow_cards",
            Category::Offsides => "offsides",
            Category::Saves => "saves",
        }
    }

    /// Fewer is better for the side producing it.
    pub fn is_negative(self) -> bool {
        matches!(self, Category::Fouls | Category::Cards | Category::Offsides)
    }

    /// Accepts the canonical ids and the legacy dashboard ids. Unknown ids
    /// yield `None`.
    pub fn from_id(id: &str) -> Option<Category> {
        let category = match id.trim() {
            "shots" | "tiri" => Category::Shots,
            "shots_on_target" | "shotsOnTarget" | "tiriPorta" => Category::ShotsOnTarget,
            "corners" | "corner" => Category::Corners,
            "corners_first_half" | "firstHalfCorners" | "cornerPT" => Category::CornersFirstHalf,
            "fouls" | "falli" => Category::Fouls,
            "cards" | "cartellini" => Category::Cards,
            "offsides" | "fuorigioco" => Category::Offsides,
            "saves" | "parate" => Category::Saves,
            _ => return None,
        };
        Some(category)
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_id(s).ok_or_else(|| ParseError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// How a team's matches are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// One team's value against a line
    TeamUnderOver,
    /// Both sides' values summed against a line
    MatchUnderOver,
    /// The two sides compared directly (1X2 style), no line
    HeadToHead,
}

impl AnalysisMode {
    pub fn requires_line(self) -> bool {
        !matches!(self, AnalysisMode::HeadToHead)
    }

    /// Categories offered in this mode.
    pub fn categories(self) -> Vec<Category> {
        match self {
            AnalysisMode::MatchUnderOver => Category::ALL
                .into_iter()
                .filter(|c| *c != Category::Saves)
                .collect(),
            AnalysisMode::TeamUnderOver | AnalysisMode::HeadToHead => Category::ALL.to_vec(),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            AnalysisMode::TeamUnderOver => "team_under_over",
            AnalysisMode::MatchUnderOver => "match_under_over",
            AnalysisMode::HeadToHead => "head_to_head",
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "team_under_over" | "team" | "UO_SQUAD" => Ok(AnalysisMode::TeamUnderOver),
            "match_under_over" | "match" | "UO_MATCH" | "UO_PARTITA" => {
                Ok(AnalysisMode::MatchUnderOver)
            }
            "head_to_head" | "h2h" | "1x2" | "ONE_X_TWO" => Ok(AnalysisMode::HeadToHead),
            other => Err(ParseError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Produced by the team ("for") or conceded by it ("against").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    For,
    Against,
}

impl Direction {
    pub fn is_for(self) -> bool {
        self == Direction::For
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "for" | "performing" => Ok(Direction::For),
            "against" | "conceded" => Ok(Direction::Against),
            other => Err(ParseError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_round_trips_through_its_id() {
        for category in Category::ALL {
            assert_eq!(Category::from_id(category.id()), Some(category));
            assert_eq!(category.id().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_legacy_ids_are_accepted() {
        assert_eq!(Category::from_id("tiriPorta"), Some(Category::ShotsOnTarget));
        assert_eq!(Category::from_id("cornerPT"), Some(Category::CornersFirstHalf));
        assert_eq!(Category::from_id("cartellini"), Some(Category::Cards));
        assert_eq!(Category::from_id("corner"), Some(Category::Corners));
    }

    #[test]
    fn test_unknown_category_is_none() {
        assert_eq!(Category::from_id("goals"), None);
        assert!(matches!(
            "goals".parse::<Category>(),
            Err(ParseError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_cards_field_sums_yellow_and_red() {
        let stats = MatchStatistics {
            yellow_cards_home: 3,
            red_cards_home: 1,
            yellow_cards_away: 2,
            ..Default::default()
        };
        let fields = Category::Cards.fields();
        assert_eq!(fields.get(&stats, Side::Home), 4);
        assert_eq!(fields.get(&stats, Side::Away), 2);
    }

    #[test]
    fn test_match_mode_does_not_offer_saves() {
        assert!(!AnalysisMode::MatchUnderOver
            .categories()
            .contains(&Category::Saves));
        assert_eq!(AnalysisMode::HeadToHead.categories().len(), 8);
    }

    #[test]
    fn test_mode_parsing_accepts_legacy_names() {
        assert_eq!("UO_SQUAD".parse::<AnalysisMode>(), Ok(AnalysisMode::TeamUnderOver));
        assert_eq!("UO_PARTITA".parse::<AnalysisMode>(), Ok(AnalysisMode::MatchUnderOver));
        assert_eq!("ONE_X_TWO".parse::<AnalysisMode>(), Ok(AnalysisMode::HeadToHead));
        assert!("parlay".parse::<AnalysisMode>().is_err());
        assert!(!AnalysisMode::HeadToHead.requires_line());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("FOR".parse::<Direction>(), Ok(Direction::For));
        assert_eq!("against".parse::<Direction>(), Ok(Direction::Against));
        assert!("sideways".parse::<Direction>().is_err());
    }
}
