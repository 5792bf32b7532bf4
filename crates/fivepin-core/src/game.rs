//! Game variants and setup.
//!
//! Every variant runs the same scoring engine and turn manager; they differ
//! in rotation defaults, pairing, how long the session lasts and whether
//! finished games are recorded.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ball::SymbolTable;

/// Lane identifier.
pub type LaneId = u16;

/// Name used for the single practice bowler.
pub const PRACTICE_BOWLER: &str = "Practice";

/// How many games a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameLimit {
    /// Fixed number of games.
    Games(u32),
    /// Keep starting games until this many minutes have passed.
    Minutes(u32),
    /// Keep starting games until the session is ended.
    Unlimited,
}

impl GameLimit {
    /// Whether another game may start after `games_played` games and
    /// `elapsed` session time.
    pub fn allows_next(self, games_played: u32, elapsed: Duration) -> bool {
        match self {
            GameLimit::Games(total) => games_played < total,
            GameLimit::Minutes(minutes) => elapsed < Duration::from_secs(u64::from(minutes) * 60),
            GameLimit::Unlimited => true,
        }
    }
}

/// Closed set of game variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameKind {
    /// Open play on a single lane.
    Quick {
        /// Session length.
        limit: GameLimit,
    },
    /// League play, optionally alternating with a paired lane.
    League {
        /// Lane the team alternates with.
        paired_lane: Option<LaneId>,
        /// Games in the series.
        games: u32,
    },
    /// Timed practice; scores are shown but not recorded.
    Practice {
        /// Block length in minutes.
        minutes: u32,
    },
}

impl GameKind {
    /// Short label for logs and records.
    pub fn label(&self) -> &'static str {
        match self {
            GameKind::Quick { .. } => "quick",
            GameKind::League { .. } => "league",
            GameKind::Practice { .. } => "practice",
        }
    }

    /// Session length.
    pub fn limit(&self) -> GameLimit {
        match self {
            GameKind::Quick { limit } => *limit,
            GameKind::League { games, .. } => GameLimit::Games(*games),
            GameKind::Practice { minutes } => GameLimit::Minutes(*minutes),
        }
    }

    /// Lane the team alternates with, if any.
    pub fn paired_lane(&self) -> Option<LaneId> {
        match self {
            GameKind::League { paired_lane, .. } => *paired_lane,
            _ => None,
        }
    }

    /// Frames per turn when the settings do not say.
    pub fn default_frames_per_turn(&self) -> usize {
        match self {
            GameKind::League { .. } => 5,
            GameKind::Quick { .. } | GameKind::Practice { .. } => 1,
        }
    }

    /// Whether finished games go to the game log.
    pub fn records_games(&self) -> bool {
        !matches!(self, GameKind::Practice { .. })
    }
}

/// Per-session scoring settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameSettings {
    /// Consecutive frames before rotating; the variant default when unset.
    #[serde(default)]
    pub frames_per_turn: Option<usize>,
    /// First-ball pattern names.
    #[serde(default)]
    pub symbols: SymbolTable,
}

/// A bowler joining a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerEntry {
    /// Display name.
    pub name: String,
    /// Handicap added to the final score.
    #[serde(default)]
    pub handicap: u32,
}

impl BowlerEntry {
    /// Entry with no handicap.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), handicap: 0 }
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Variant.
    pub kind: GameKind,
    /// Bowlers in rotation order. Ignored for practice.
    #[serde(default)]
    pub bowlers: Vec<BowlerEntry>,
    /// Scoring settings.
    #[serde(default)]
    pub settings: GameSettings,
}

impl GameSetup {
    /// Quick game of `games` games.
    pub fn quick<I, S>(names: I, games: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(GameKind::Quick { limit: GameLimit::Games(games) }, names)
    }

    /// League series, optionally paired.
    pub fn league<I, S>(names: I, paired_lane: Option<LaneId>, games: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(GameKind::League { paired_lane, games }, names)
    }

    /// Practice block.
    pub fn practice(minutes: u32) -> Self {
        Self::with_kind(GameKind::Practice { minutes }, [PRACTICE_BOWLER])
    }

    /// Overrides frames per turn.
    #[must_use]
    pub fn frames_per_turn(mut self, frames: usize) -> Self {
        self.settings.frames_per_turn = Some(frames);
        self
    }

    /// Effective frames per turn.
    pub fn effective_frames_per_turn(&self) -> usize {
        self.settings.frames_per_turn.unwrap_or_else(|| self.kind.default_frames_per_turn())
    }

    fn with_kind<I, S>(kind: GameKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            bowlers: names.into_iter().map(BowlerEntry::new).collect(),
            settings: GameSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert!(GameLimit::Games(3).allows_next(2, Duration::ZERO));
        assert!(!GameLimit::Games(3).allows_next(3, Duration::ZERO));
        assert!(GameLimit::Minutes(30).allows_next(9, Duration::from_secs(29 * 60)));
        assert!(!GameLimit::Minutes(30).allows_next(1, Duration::from_secs(30 * 60)));
        assert!(GameLimit::Unlimited.allows_next(u32::MAX, Duration::MAX));
    }

    #[test]
    fn league_defaults_to_five_frames_per_turn() {
        let setup = GameSetup::league(["A", "B"], Some(4), 3);
        assert_eq!(setup.effective_frames_per_turn(), 5);
        assert_eq!(setup.kind.paired_lane(), Some(4));
        assert_eq!(setup.frames_per_turn(2).effective_frames_per_turn(), 2);
    }

    #[test]
    fn practice_is_not_recorded() {
        let setup = GameSetup::practice(30);
        assert!(!setup.kind.records_games());
        assert_eq!(setup.bowlers, vec![BowlerEntry::new(PRACTICE_BOWLER)]);
    }

    #[test]
    fn setup_deserializes_with_defaults() {
        let setup: GameSetup =
            serde_json::from_str(r#"{"kind":{"kind":"quick","limit":{"games":2}},"bowlers":[{"name":"Ann"}]}"#)
                .unwrap();
        assert_eq!(setup.kind, GameKind::Quick { limit: GameLimit::Games(2) });
        assert_eq!(setup.settings.symbols, SymbolTable::standard());
        assert_eq!(setup.effective_frames_per_turn(), 1);
    }
}
