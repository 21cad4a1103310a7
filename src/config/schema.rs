//! Configuration schema
//!
//! Typed match configuration deserialized from YAML. Every section and
//! field has a default, so an empty mapping yields the standard
//! 5 / 2 / 5 minute match.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tactics::{EventKind, RiskTier};

// ============================================================================
// Root
// ============================================================================

/// Complete match configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Phase durations and clock speed
    pub clock: ClockConfig,

    /// Event generation and decision window
    pub decisions: DecisionConfig,

    /// Momentum arithmetic constants
    pub tuning: TuningConfig,

    /// RNG seed; a random seed is drawn when absent
    pub seed: Option<u64>,
}

impl MatchConfig {
    /// Builds the configuration for a built-in preset.
    #[must_use]
    pub fn preset(preset: MatchPreset) -> Self {
        match preset {
            MatchPreset::Standard => Self::default(),
            MatchPreset::Sprint => Self {
                clock: ClockConfig {
                    first_half: Duration::from_secs(90),
                    halftime: Duration::from_secs(30),
                    second_half: Duration::from_secs(90),
                    ..ClockConfig::default()
                },
                decisions: DecisionConfig {
                    window: Duration::from_secs(10),
                    event_margin: Duration::from_secs(10),
                    ..DecisionConfig::default()
                },
                ..Self::default()
            },
            MatchPreset::FullLength => Self {
                clock: ClockConfig {
                    first_half: Duration::from_secs(45 * 60),
                    halftime: Duration::from_secs(15 * 60),
                    second_half: Duration::from_secs(45 * 60),
                    ..ClockConfig::default()
                },
                ..Self::default()
            },
        }
    }
}

/// Built-in match presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MatchPreset {
    /// 5 minute halves, 2 minute break
    #[default]
    Standard,
    /// 90 second halves, 30 second break, short decision window
    Sprint,
    /// Regulation 45 minute halves, 15 minute break
    FullLength,
}

// ============================================================================
// Clock
// ============================================================================

/// Fastest supported simulation speed; one tick per microsecond.
pub const MAX_TIME_SCALE: u32 = 1_000_000;

/// Phase durations and simulation speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Length of the first half
    #[serde(with = "duration_format")]
    pub first_half: Duration,

    /// Length of the halftime break
    #[serde(with = "duration_format")]
    pub halftime: Duration,

    /// Length of the second half
    #[serde(with = "duration_format")]
    pub second_half: Duration,

    /// Simulated seconds per wall-clock second
    pub time_scale: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            first_half: Duration::from_secs(300),
            halftime: Duration::from_secs(120),
            second_half: Duration::from_secs(300),
            time_scale: 1,
        }
    }
}

impl ClockConfig {
    /// Length of the whole match in simulated seconds.
    #[must_use]
    pub const fn cycle_secs(&self) -> u64 {
        self.first_half.as_secs() + self.halftime.as_secs() + self.second_half.as_secs()
    }

    /// Wall-clock period of one simulated second, never zero.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.time_scale.clamp(1, MAX_TIME_SCALE)
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Event generation and decision window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionConfig {
    /// Time the coach has to answer an event
    #[serde(with = "duration_format")]
    pub window: Duration,

    /// Per-tick chance of raising an event inside the event window
    pub trigger_probability: f64,

    /// Quiet period at the start and end of each half
    #[serde(with = "duration_format")]
    pub event_margin: Duration,

    /// Categories drawn uniformly when an event fires on its own
    pub event_pool: Vec<EventKind>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15),
            trigger_probability: 0.2,
            event_margin: Duration::from_secs(30),
            event_pool: EventKind::SPONTANEOUS.to_vec(),
        }
    }
}

impl DecisionConfig {
    /// Decision window in whole simulated seconds.
    #[must_use]
    pub fn window_secs(&self) -> u32 {
        u32::try_from(self.window.as_secs()).unwrap_or(u32::MAX)
    }
}

// ============================================================================
// Tuning
// ============================================================================

/// Constants of the momentum formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningConfig {
    /// Reward scaling per risk tier
    pub risk_multipliers: RiskMultipliers,

    /// Bounds of the uniform noise applied to the scaled reward
    pub random_factor: FactorRange,

    /// Maximum deviation of the attack share from 0.5
    pub attack_ratio_spread: f64,

    /// Momentum lost on both gauges when a decision times out
    pub timeout_penalty: u8,

    /// Largest possession swing from a response without a stat effect
    pub possession_nudge: u8,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            risk_multipliers: RiskMultipliers::default(),
            random_factor: FactorRange::default(),
            attack_ratio_spread: 0.15,
            timeout_penalty: 5,
            possession_nudge: 5,
        }
    }
}

/// Reward multiplier for each [`RiskTier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        Self {
            low: 0.7,
            medium: 1.0,
            high: 1.3,
        }
    }
}

impl RiskMultipliers {
    /// Multiplier for the given tier.
    #[must_use]
    pub const fn for_tier(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }
}

/// Inclusive range for a uniform random factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorRange {
    pub min: f64,
    pub max: f64,
}

impl Default for FactorRange {
    fn default() -> Self {
        Self { min: 0.8, max: 1.2 }
    }
}

// ============================================================================
// Duration Format
// ============================================================================

/// Serde adapter accepting `"5m"`, `"90s"`, `"1m 30s"` or a bare number of
/// seconds, and writing durations back in the humantime format.
mod duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => humantime::parse_duration(text.trim())
                .map_err(|e| de::Error::custom(format!("invalid duration '{text}': {e}"))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
