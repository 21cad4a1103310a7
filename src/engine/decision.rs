//! Decision events
//!
//! A [`DecisionEvent`] is raised when something happens on the pitch that
//! the coach must answer. It is consumed exactly once, either by a valid
//! response or by its window running out.

use serde::Serialize;

use crate::tactics::{EventKind, RiskTier, TacticalResponse};

use super::clock::MatchPhase;

/// Identifier of a decision event, unique within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// One candidate answer to a decision event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecisionOption {
    pub response: TacticalResponse,
    pub label: &'static str,
    pub risk: RiskTier,
    pub reward: u32,
}

impl From<TacticalResponse> for DecisionOption {
    fn from(response: TacticalResponse) -> Self {
        Self {
            response,
            label: response.label(),
            risk: response.risk(),
            reward: response.reward(),
        }
    }
}

/// A tactical decision awaiting the coach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub prompt: &'static str,
    /// In-phase time the event occurred at
    pub time: u64,
    pub phase: MatchPhase,
    pub options: Vec<DecisionOption>,
    /// Seconds allowed for a response
    pub timeout: u32,
}

impl DecisionEvent {
    /// Builds the event for `kind` from the tactical catalog.
    #[must_use]
    pub fn new(id: EventId, kind: EventKind, time: u64, phase: MatchPhase, timeout: u32) -> Self {
        Self {
            id,
            kind,
            prompt: kind.prompt(),
            time,
            phase,
            options: kind.candidates().iter().copied().map(DecisionOption::from).collect(),
            timeout,
        }
    }

    /// Looks up the option for `response`, if it is a candidate.
    #[must_use]
    pub fn option(&self, response: TacticalResponse) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.response == response)
    }
}
