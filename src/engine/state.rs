//! Match state and the store it lives in
//!
//! [`MatchState`] is the single mutable record presentation layers read.
//! The engine is its only writer and goes through the [`MatchStore`]
//! contract with partial updates ([`MatchStatePatch`]). Consumers get a
//! read-only [`StateView`] backed by a `tokio::sync::watch` channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::clock::MatchPhase;

/// Upper bound of the momentum and possession gauges.
pub const GAUGE_MAX: u8 = 100;

/// Clamps a signed gauge value into `0..=100`.
#[must_use]
pub fn clamp_gauge(value: i32) -> u8 {
    u8::try_from(value.clamp(0, i32::from(GAUGE_MAX))).unwrap_or(GAUGE_MAX)
}

/// A per-side counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideStats {
    pub home: u32,
    pub away: u32,
}

impl SideStats {
    /// Returns a copy with the home counter incremented.
    #[must_use]
    pub const fn bump_home(self) -> Self {
        Self {
            home: self.home.saturating_add(1),
            away: self.away,
        }
    }
}

/// Everything presentation layers read about a match in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub home_score: u32,
    pub away_score: u32,
    /// Seconds since the start of the current phase
    pub current_time: u64,
    pub phase: MatchPhase,
    pub is_first_half: bool,
    pub attack_momentum: u8,
    pub defense_momentum: u8,
    /// Home possession percentage
    pub possession: u8,
    pub shots: SideStats,
    pub corners: SideStats,
    pub fouls: SideStats,
    pub is_decision_pending: bool,
    /// Seconds left to answer the pending decision
    pub decision_time_left: u32,
}

impl MatchState {
    /// State at kickoff for a given decision window.
    #[must_use]
    pub const fn kickoff(decision_window: u32) -> Self {
        Self {
            home_score: 0,
            away_score: 0,
            current_time: 0,
            phase: MatchPhase::FirstHalf,
            is_first_half: true,
            attack_momentum: 50,
            defense_momentum: 50,
            possession: 50,
            shots: SideStats { home: 0, away: 0 },
            corners: SideStats { home: 0, away: 0 },
            fouls: SideStats { home: 0, away: 0 },
            is_decision_pending: false,
            decision_time_left: decision_window,
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            phase: MatchPhase::NotStarted,
            ..Self::kickoff(0)
        }
    }
}

/// Partial update of a [`MatchState`]: only `Some` fields are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchStatePatch {
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub current_time: Option<u64>,
    pub phase: Option<MatchPhase>,
    pub is_first_half: Option<bool>,
    pub attack_momentum: Option<u8>,
    pub defense_momentum: Option<u8>,
    pub possession: Option<u8>,
    pub shots: Option<SideStats>,
    pub corners: Option<SideStats>,
    pub fouls: Option<SideStats>,
    pub is_decision_pending: Option<bool>,
    pub decision_time_left: Option<u32>,
}

impl MatchStatePatch {
    /// A patch that overwrites every field.
    #[must_use]
    pub fn replace(state: MatchState) -> Self {
        Self {
            home_score: Some(state.home_score),
            away_score: Some(state.away_score),
            current_time: Some(state.current_time),
            phase: Some(state.phase),
            is_first_half: Some(state.is_first_half),
            attack_momentum: Some(state.attack_momentum),
            defense_momentum: Some(state.defense_momentum),
            possession: Some(state.possession),
            shots: Some(state.shots),
            corners: Some(state.corners),
            fouls: Some(state.fouls),
            is_decision_pending: Some(state.is_decision_pending),
            decision_time_left: Some(state.decision_time_left),
        }
    }

    /// Merges the set fields onto `state`.
    pub fn apply(&self, state: &mut MatchState) {
        if let Some(v) = self.home_score {
            state.home_score = v;
        }
        if let Some(v) = self.away_score {
            state.away_score = v;
        }
        if let Some(v) = self.current_time {
            state.current_time = v;
        }
        if let Some(v) = self.phase {
            state.phase = v;
        }
        if let Some(v) = self.is_first_half {
            state.is_first_half = v;
        }
        if let Some(v) = self.attack_momentum {
            state.attack_momentum = v;
        }
        if let Some(v) = self.defense_momentum {
            state.defense_momentum = v;
        }
        if let Some(v) = self.possession {
            state.possession = v;
        }
        if let Some(v) = self.shots {
            state.shots = v;
        }
        if let Some(v) = self.corners {
            state.corners = v;
        }
        if let Some(v) = self.fouls {
            state.fouls = v;
        }
        if let Some(v) = self.is_decision_pending {
            state.is_decision_pending = v;
        }
        if let Some(v) = self.decision_time_left {
            state.decision_time_left = v;
        }
    }

    /// Whether applying this patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Source of truth for the match state.
///
/// The engine reads the full state and writes partial merges; nothing else
/// may write.
pub trait MatchStore: Send + Sync {
    /// Returns a snapshot of the current state.
    fn read(&self) -> MatchState;

    /// Merges `patch` into the current state.
    fn write(&self, patch: MatchStatePatch);
}

/// [`MatchStore`] over a `watch` channel so readers are notified of every
/// write.
#[derive(Debug)]
pub struct WatchStore {
    tx: watch::Sender<MatchState>,
}

impl WatchStore {
    /// Creates a store holding `MatchState::default()`.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MatchState::default());
        Self { tx }
    }

    /// Hands out a read-only view.
    #[must_use]
    pub fn view(&self) -> StateView {
        StateView {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for WatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStore for WatchStore {
    fn read(&self) -> MatchState {
        self.tx.borrow().clone()
    }

    fn write(&self, patch: MatchStatePatch) {
        if patch.is_empty() {
            return;
        }
        self.tx.send_modify(|state| patch.apply(state));
    }
}

/// Read-only handle on the match state.
#[derive(Debug, Clone)]
pub struct StateView {
    rx: watch::Receiver<MatchState>,
}

impl StateView {
    /// Latest state snapshot.
    #[must_use]
    pub fn current(&self) -> MatchState {
        self.rx.borrow().clone()
    }

    /// Waits for the next write and returns the new state.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<MatchState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Turns the view into a stream of snapshots, starting with the
    /// current one.
    #[must_use]
    pub fn into_stream(self) -> WatchStream<MatchState> {
        WatchStream::new(self.rx)
    }
}
