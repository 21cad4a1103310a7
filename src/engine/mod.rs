//! Match simulation.
//!
//! The engine is split the same way a match is watched:
//!
//! - [`clock`]: elapsed time to phase and display time
//! - [`state`]: the shared [`MatchState`] and its store
//! - [`decision`]: decision events and their options
//! - [`momentum`]: how a response moves the gauges
//! - [`simulator`]: the synchronous [`MatchEngine`]
//! - [`runner`]: the tokio driver around it

pub mod clock;
pub mod decision;
pub mod momentum;
pub mod runner;
pub mod simulator;
pub mod state;

pub use clock::{MatchClock, MatchPhase, format_clock};
pub use decision::{DecisionEvent, DecisionOption, EventId};
pub use momentum::{MomentumDelta, StatEffect};
pub use runner::MatchRunner;
pub use simulator::MatchEngine;
pub use state::{MatchState, MatchStatePatch, MatchStore, StateView, WatchStore};

use crate::tactics::{RiskTier, TacticalResponse};

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The second half ran out
    FullTime,
    /// Stopped before full time
    Stopped,
}

impl EndReason {
    /// Snake-case name used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::Stopped => "stopped",
        }
    }
}

/// A response folded into the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionResolution {
    pub event: DecisionEvent,
    pub response: TacticalResponse,
    pub risk: RiskTier,
    pub delta: MomentumDelta,
    pub effect: StatEffect,
}

/// A decision window that ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutResolution {
    pub event: Option<DecisionEvent>,
    pub attack_momentum: u8,
    pub defense_momentum: u8,
}

/// Something observers of a match should know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchNotice {
    /// Kickoff
    Started { state: MatchState },
    /// The clock crossed into a new phase
    PhaseChanged {
        from: MatchPhase,
        to: MatchPhase,
        elapsed: u64,
    },
    /// A decision is waiting for the coach
    DecisionRaised(DecisionEvent),
    /// The coach answered
    DecisionResolved(DecisionResolution),
    /// Nobody answered in time
    DecisionTimedOut(TimeoutResolution),
    /// The match is over
    Ended { reason: EndReason, state: MatchState },
}
