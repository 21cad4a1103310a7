//! Match clock
//!
//! Maps elapsed simulated seconds onto a phase and an in-phase display
//! time. Nothing here is stored: every reading is recomputed from the
//! elapsed time and the configured phase lengths.

use serde::{Deserialize, Serialize};

use crate::config::schema::ClockConfig;

/// Phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Before kickoff
    #[default]
    NotStarted,
    /// First half in play
    FirstHalf,
    /// Halftime break
    Halftime,
    /// Second half in play
    SecondHalf,
    /// Full time, or the match was stopped
    Ended,
}

impl MatchPhase {
    /// Snake-case name used in logs, events, and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::FirstHalf => "first_half",
            Self::Halftime => "halftime",
            Self::SecondHalf => "second_half",
            Self::Ended => "ended",
        }
    }

    /// Whether the ball is in play during this phase.
    #[must_use]
    pub const fn is_in_play(self) -> bool {
        matches!(self, Self::FirstHalf | Self::SecondHalf)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase and display time derived from one elapsed-time sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Total simulated seconds since kickoff
    pub elapsed: u64,
    /// Phase the sample falls in
    pub phase: MatchPhase,
    /// Seconds since the start of `phase`
    pub display_time: u64,
}

/// Phase lengths in whole simulated seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchClock {
    first_half: u64,
    halftime: u64,
    second_half: u64,
}

impl MatchClock {
    /// Creates a clock from explicit phase lengths in seconds.
    #[must_use]
    pub const fn new(first_half: u64, halftime: u64, second_half: u64) -> Self {
        Self {
            first_half,
            halftime,
            second_half,
        }
    }

    /// Creates a clock from the configured durations.
    #[must_use]
    pub const fn from_config(config: &ClockConfig) -> Self {
        Self::new(
            config.first_half.as_secs(),
            config.halftime.as_secs(),
            config.second_half.as_secs(),
        )
    }

    /// Length of the whole match.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.first_half + self.halftime + self.second_half
    }

    /// Length of the half `phase` belongs to, or zero outside play.
    #[must_use]
    pub const fn half_length(&self, phase: MatchPhase) -> u64 {
        match phase {
            MatchPhase::FirstHalf => self.first_half,
            MatchPhase::SecondHalf => self.second_half,
            _ => 0,
        }
    }

    /// Reads the clock at `elapsed` simulated seconds after kickoff.
    ///
    /// Samples at or past the end of the second half read as
    /// [`MatchPhase::Ended`] with the full second half on the display.
    #[must_use]
    pub const fn read(&self, elapsed: u64) -> ClockReading {
        let cycle = self.cycle();
        if cycle == 0 || elapsed >= cycle {
            return ClockReading {
                elapsed,
                phase: MatchPhase::Ended,
                display_time: self.second_half,
            };
        }

        let match_time = elapsed % cycle;
        let (phase, display_time) = if match_time < self.first_half {
            (MatchPhase::FirstHalf, match_time)
        } else if match_time < self.first_half + self.halftime {
            (MatchPhase::Halftime, match_time - self.first_half)
        } else {
            (
                MatchPhase::SecondHalf,
                match_time - self.first_half - self.halftime,
            )
        };

        ClockReading {
            elapsed,
            phase,
            display_time,
        }
    }
}

/// Formats seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
