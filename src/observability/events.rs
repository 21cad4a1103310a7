//! Match event log.
//!
//! Every [`MatchNotice`] can be written as one JSON line, tagged with its
//! `type` and a sequence number, so a match can be replayed or inspected
//! after the fact.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{DecisionEvent, EventId, MatchNotice, MatchPhase, MatchState};
use crate::error::MatchError;
use crate::tactics::{EventKind, RiskTier, TacticalResponse};

/// One line of the event log.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    MatchStarted {
        timestamp: DateTime<Utc>,
        /// Seconds allowed per decision
        decision_window: u32,
    },

    PhaseEntered {
        timestamp: DateTime<Utc>,
        from: MatchPhase,
        phase: MatchPhase,
        /// Simulated seconds since kickoff
        elapsed: u64,
    },

    DecisionRaised {
        timestamp: DateTime<Utc>,
        decision: DecisionEvent,
    },

    DecisionResolved {
        timestamp: DateTime<Utc>,
        event_id: EventId,
        kind: EventKind,
        response: TacticalResponse,
        risk: RiskTier,
        attack_delta: i32,
        defense_delta: i32,
    },

    DecisionTimedOut {
        timestamp: DateTime<Utc>,
        event_id: Option<EventId>,
        attack_momentum: u8,
        defense_momentum: u8,
    },

    /// An operation the engine refused
    DecisionRejected {
        timestamp: DateTime<Utc>,
        reason: &'static str,
        message: String,
    },

    MatchEnded {
        timestamp: DateTime<Utc>,
        reason: &'static str,
        state: MatchState,
    },
}

impl Event {
    /// Converts an engine notice, stamped with `timestamp`.
    #[must_use]
    pub fn from_notice(notice: &MatchNotice, timestamp: DateTime<Utc>) -> Self {
        match notice {
            MatchNotice::Started { state } => Self::MatchStarted {
                timestamp,
                decision_window: state.decision_time_left,
            },
            MatchNotice::PhaseChanged { from, to, elapsed } => Self::PhaseEntered {
                timestamp,
                from: *from,
                phase: *to,
                elapsed: *elapsed,
            },
            MatchNotice::DecisionRaised(event) => Self::DecisionRaised {
                timestamp,
                decision: event.clone(),
            },
            MatchNotice::DecisionResolved(r) => Self::DecisionResolved {
                timestamp,
                event_id: r.event.id,
                kind: r.event.kind,
                response: r.response,
                risk: r.risk,
                attack_delta: r.delta.attack,
                defense_delta: r.delta.defense,
            },
            MatchNotice::DecisionTimedOut(t) => Self::DecisionTimedOut {
                timestamp,
                event_id: t.event.as_ref().map(|e| e.id),
                attack_momentum: t.attack_momentum,
                defense_momentum: t.defense_momentum,
            },
            MatchNotice::Ended { reason, state } => Self::MatchEnded {
                timestamp,
                reason: reason.as_str(),
                state: state.clone(),
            },
        }
    }

    /// Records an operation the engine rejected.
    #[must_use]
    pub fn rejected(err: &MatchError, timestamp: DateTime<Utc>) -> Self {
        Self::DecisionRejected {
            timestamp,
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

/// Buffered JSONL writer for [`Event`]s.
///
/// Write failures are dropped; a broken event sink never stops a match.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Discards everything.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates (or truncates) `path` and writes events to it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let Ok(line) = serde_json::to_string(&Envelope { sequence, event }) else {
            return;
        };
        if let Ok(mut w) = self.writer.lock() {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Converts and emits an engine notice, stamped now.
    pub fn emit_notice(&self, notice: &MatchNotice) {
        self.emit(Event::from_notice(notice, Utc::now()));
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
