//! Tactical catalog
//!
//! Fixed lookup tables for match events and the tactical responses a coach
//! can give to them. Every table is a `match` on a closed enum, so lookups
//! are infallible and allocation-free.
//!
//! - [`EventKind`]: what happened on the pitch, with its prompt and the
//!   ordered list of candidate responses
//! - [`TacticalResponse`]: what the coach can do about it, with its label,
//!   [`RiskTier`], and reward magnitude

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Maximum Damerau-Levenshtein distance for a typo suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

// ============================================================================
// Risk
// ============================================================================

/// How risky a tactical response is.
///
/// Riskier responses are scaled up by a larger multiplier when their reward
/// is folded into momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Conservative option
    Low,
    /// Balanced option
    Medium,
    /// Aggressive option
    High,
}

impl RiskTier {
    /// Lowercase name used in output and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Events
// ============================================================================

/// Category of a match event that asks the coach for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Free kick awarded to the home side
    FoulHome,
    /// Free kick conceded by the home side
    FoulAway,
    /// Corner for the home side
    CornerHome,
    /// Corner against the home side
    CornerAway,
    /// Opponent shot on target
    ShotOnTarget,
    /// Shot that went wide
    ShotOffTarget,
    /// Yellow card shown
    YellowCard,
    /// Red card shown
    RedCard,
    /// Tired player
    Substitution,
    /// Injured player
    Injury,
    /// Penalty awarded
    Penalty,
    /// Offside called
    Offside,
}

impl EventKind {
    /// Every event category, in catalog order.
    pub const ALL: [Self; 12] = [
        Self::FoulHome,
        Self::FoulAway,
        Self::CornerHome,
        Self::CornerAway,
        Self::ShotOnTarget,
        Self::ShotOffTarget,
        Self::YellowCard,
        Self::RedCard,
        Self::Substitution,
        Self::Injury,
        Self::Penalty,
        Self::Offside,
    ];

    /// Categories the clock raises on its own when no pool is configured.
    pub const SPONTANEOUS: [Self; 7] = [
        Self::FoulHome,
        Self::FoulAway,
        Self::CornerHome,
        Self::CornerAway,
        Self::ShotOnTarget,
        Self::YellowCard,
        Self::Substitution,
    ];

    /// Wire name (`FOUL_HOME`, `CORNER_AWAY`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FoulHome => "FOUL_HOME",
            Self::FoulAway => "FOUL_AWAY",
            Self::CornerHome => "CORNER_HOME",
            Self::CornerAway => "CORNER_AWAY",
            Self::ShotOnTarget => "SHOT_ON_TARGET",
            Self::ShotOffTarget => "SHOT_OFF_TARGET",
            Self::YellowCard => "YELLOW_CARD",
            Self::RedCard => "RED_CARD",
            Self::Substitution => "SUBSTITUTION",
            Self::Injury => "INJURY",
            Self::Penalty => "PENALTY",
            Self::Offside => "OFFSIDE",
        }
    }

    /// Question put to the coach.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::FoulHome => "Free kick to your side! How do you take it?",
            Self::FoulAway => "Foul against your side! How do you set up?",
            Self::CornerHome => "Corner to your side! Which routine?",
            Self::CornerAway => "Corner against! How do you defend it?",
            Self::ShotOnTarget => "Dangerous shot on goal! Reorganize the back line?",
            Self::ShotOffTarget => "Shot goes wide. How do you restart?",
            Self::YellowCard => "Yellow card! Protect the player?",
            Self::RedCard => "Red card! Reorganize the team?",
            Self::Substitution => "A player is tiring! Make a change?",
            Self::Injury => "Player injured! What now?",
            Self::Penalty => "Penalty! Who takes it?",
            Self::Offside => "Offside! Restart play?",
        }
    }

    /// Ordered candidate responses.
    #[must_use]
    pub const fn candidates(self) -> &'static [TacticalResponse] {
        use TacticalResponse as R;
        match self {
            Self::FoulHome | Self::Penalty => {
                &[R::QuickFreeKick, R::OrganizedAttack, R::ChangeFormation]
            }
            Self::FoulAway => &[R::HighPress, R::MidPress, R::LowBlock],
            Self::CornerHome => &[R::QuickFreeKick, R::OrganizedAttack, R::Substitute],
            Self::CornerAway => &[R::HighPress, R::LowBlock, R::ChangeFormation],
            Self::ShotOnTarget => &[R::HighPress, R::CounterAttack, R::Possession],
            Self::ShotOffTarget => &[R::QuickFreeKick, R::Possession, R::WingPlay],
            Self::YellowCard | Self::Injury => {
                &[R::Substitute, R::ChangeFormation, R::LowBlock]
            }
            Self::RedCard => &[R::ChangeFormation, R::LowBlock, R::Substitute],
            Self::Substitution => &[R::Substitute, R::ChangeFormation, R::HighPress],
            Self::Offside => &[R::QuickFreeKick, R::Possession, R::CounterAttack],
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| MatchError::UnknownEvent {
                input: s.to_string(),
                suggestion: suggest(&wanted, Self::ALL.iter().map(|k| k.as_str())),
            })
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A tactical response the coach can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TacticalResponse {
    HighPress,
    MidPress,
    LowBlock,
    CounterAttack,
    Possession,
    WingPlay,
    QuickFreeKick,
    OrganizedAttack,
    Substitute,
    ChangeFormation,
}

impl TacticalResponse {
    /// Every response, in catalog order.
    pub const ALL: [Self; 10] = [
        Self::HighPress,
        Self::MidPress,
        Self::LowBlock,
        Self::CounterAttack,
        Self::Possession,
        Self::WingPlay,
        Self::QuickFreeKick,
        Self::OrganizedAttack,
        Self::Substitute,
        Self::ChangeFormation,
    ];

    /// Wire name (`HIGH_PRESS`, `LOW_BLOCK`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighPress => "HIGH_PRESS",
            Self::MidPress => "MID_PRESS",
            Self::LowBlock => "LOW_BLOCK",
            Self::CounterAttack => "COUNTER_ATTACK",
            Self::Possession => "POSSESSION",
            Self::WingPlay => "WING_PLAY",
            Self::QuickFreeKick => "QUICK_FREE_KICK",
            Self::OrganizedAttack => "ORGANIZED_ATTACK",
            Self::Substitute => "SUBSTITUTE",
            Self::ChangeFormation => "CHANGE_FORMATION",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighPress => "High Press",
            Self::MidPress => "Mid Press",
            Self::LowBlock => "Low Block",
            Self::CounterAttack => "Counter-Attack",
            Self::Possession => "Keep Possession",
            Self::WingPlay => "Wing Play",
            Self::QuickFreeKick => "Quick Free Kick",
            Self::OrganizedAttack => "Organized Attack",
            Self::Substitute => "Substitute Player",
            Self::ChangeFormation => "Change Formation",
        }
    }

    /// Risk tier of this response.
    #[must_use]
    pub const fn risk(self) -> RiskTier {
        match self {
            Self::HighPress | Self::CounterAttack | Self::QuickFreeKick => RiskTier::High,
            Self::MidPress | Self::WingPlay | Self::Substitute | Self::ChangeFormation => {
                RiskTier::Medium
            }
            Self::LowBlock | Self::Possession | Self::OrganizedAttack => RiskTier::Low,
        }
    }

    /// Potential reward magnitude before risk scaling.
    #[must_use]
    pub const fn reward(self) -> u32 {
        match self {
            Self::HighPress | Self::ChangeFormation => 25,
            Self::MidPress | Self::OrganizedAttack => 15,
            Self::LowBlock => 10,
            Self::CounterAttack => 30,
            Self::Possession => 12,
            Self::WingPlay => 18,
            Self::QuickFreeKick => 35,
            Self::Substitute => 20,
        }
    }
}

impl std::fmt::Display for TacticalResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TacticalResponse {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| MatchError::UnknownResponse {
                input: s.to_string(),
                suggestion: suggest(&wanted, Self::ALL.iter().map(|r| r.as_str())),
            })
    }
}

/// Accepts `quick-free-kick`, `Quick Free Kick`, and `QUICK_FREE_KICK` alike.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Closest catalog name within [`MAX_SUGGESTION_DISTANCE`] edits.
fn suggest<'a>(input: &str, names: impl Iterator<Item = &'a str>) -> Option<String> {
    names
        .map(|name| (name, strsim::damerau_levenshtein(input, name)))
        .filter(|(_, dist)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

// ============================================================================
// Tests
// ============================================================================
