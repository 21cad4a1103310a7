//! Match engine
//!
//! The `MatchEngine` owns every mutation of a match: it reads the clock,
//! raises decision events, counts decision windows down, and folds
//! responses into the shared [`MatchState`]. It is synchronous and driven
//! by [`tick`](MatchEngine::tick) with the elapsed simulated time, so it can
//! be stepped deterministically in tests; [`MatchRunner`] drives it from a
//! tokio timer.
//!
//! [`MatchRunner`]: super::runner::MatchRunner

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::schema::MatchConfig;
use crate::error::MatchError;
use crate::observability::metrics;
use crate::tactics::{EventKind, TacticalResponse};

use super::clock::{ClockReading, MatchClock, MatchPhase, format_clock};
use super::decision::{DecisionEvent, EventId};
use super::momentum::{MomentumDelta, StatEffect, momentum_delta};
use super::state::{MatchState, MatchStatePatch, MatchStore};
use super::{DecisionResolution, EndReason, MatchNotice, TimeoutResolution};

/// Deterministic match simulation core.
///
/// Holds at most one pending [`DecisionEvent`]; a new one can only be
/// raised after the previous one was answered or expired.
pub struct MatchEngine {
    config: Arc<MatchConfig>,
    clock: MatchClock,
    store: Arc<dyn MatchStore>,
    rng: StdRng,
    running: bool,
    last_phase: MatchPhase,
    current_decision: Option<DecisionEvent>,
    next_event_id: u64,
}

impl MatchEngine {
    /// Creates an engine writing to `store` and drawing from `rng`.
    #[must_use]
    pub fn new(config: Arc<MatchConfig>, store: Arc<dyn MatchStore>, rng: StdRng) -> Self {
        Self {
            clock: MatchClock::from_config(&config.clock),
            config,
            store,
            rng,
            running: false,
            last_phase: MatchPhase::NotStarted,
            current_decision: None,
            next_event_id: 1,
        }
    }

    /// Creates an engine with an RNG seeded from `seed`.
    #[must_use]
    pub fn with_seed(config: Arc<MatchConfig>, store: Arc<dyn MatchStore>, seed: u64) -> Self {
        Self::new(config, store, StdRng::seed_from_u64(seed))
    }

    /// Resets the match to kickoff and starts it.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::AlreadyRunning`] if a match is in progress;
    /// the running match is left untouched.
    pub fn start_match(&mut self) -> Result<(), MatchError> {
        if self.running {
            return Err(self.reject(MatchError::AlreadyRunning));
        }

        let kickoff = MatchState::kickoff(self.window());
        metrics::set_momentum(kickoff.attack_momentum, kickoff.defense_momentum);
        metrics::set_possession(kickoff.possession);
        self.store.write(MatchStatePatch::replace(kickoff));

        self.running = true;
        self.current_decision = None;
        metrics::set_phase(MatchPhase::FirstHalf, Some(self.last_phase));
        self.last_phase = MatchPhase::FirstHalf;
        metrics::record_match_started();

        info!(
            first_half = %format_clock(self.clock.half_length(MatchPhase::FirstHalf)),
            cycle = self.clock.cycle(),
            "kickoff"
        );
        Ok(())
    }

    /// Stops the match and drops any pending decision.
    ///
    /// Returns the end notice, or `None` if no match was running.
    pub fn stop_match(&mut self) -> Option<MatchNotice> {
        if !self.running {
            debug!("stop requested with no match in progress");
            return None;
        }
        Some(self.finish(EndReason::Stopped))
    }

    /// Advances the match to `elapsed` simulated seconds after kickoff.
    ///
    /// Called once per simulated second. Returns what happened during the
    /// tick, in order.
    pub fn tick(&mut self, elapsed: u64) -> Vec<MatchNotice> {
        let mut notices = Vec::new();
        if !self.running {
            return notices;
        }

        let reading = self.clock.read(elapsed);
        if reading.phase == MatchPhase::Ended {
            notices.push(self.finish(EndReason::FullTime));
            return notices;
        }

        self.store.write(MatchStatePatch {
            current_time: Some(reading.display_time),
            phase: Some(reading.phase),
            is_first_half: Some(reading.phase == MatchPhase::FirstHalf),
            ..MatchStatePatch::default()
        });

        if reading.phase != self.last_phase {
            notices.push(self.enter_phase(reading));
        }

        if self.current_decision.is_some() {
            if let Some(expired) = self.count_down() {
                notices.push(MatchNotice::DecisionTimedOut(expired));
            }
        } else if reading.phase.is_in_play() && self.should_raise(reading) {
            if let Some(&kind) = self.config.decisions.event_pool.choose(&mut self.rng) {
                if let Ok(event) = self.raise(kind, reading) {
                    notices.push(MatchNotice::DecisionRaised(event));
                }
            }
        }

        notices
    }

    /// Raises a decision event of the given kind right now.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NotRunning`] outside a match and
    /// [`MatchError::DecisionPending`] while another decision is open.
    pub fn trigger_event(&mut self, kind: EventKind) -> Result<DecisionEvent, MatchError> {
        if !self.running {
            return Err(self.reject(MatchError::NotRunning));
        }
        let state = self.store.read();
        let reading = ClockReading {
            elapsed: 0,
            phase: state.phase,
            display_time: state.current_time,
        };
        self.raise(kind, reading)
    }

    /// Applies the coach's answer to the pending decision.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NoPendingDecision`] when nothing is pending and
    /// [`MatchError::InvalidResponse`] when `response` is not one of the
    /// event's candidates. The match state is untouched in both cases.
    pub fn process_decision(
        &mut self,
        response: TacticalResponse,
    ) -> Result<DecisionResolution, MatchError> {
        let Some(event) = self.current_decision.as_ref() else {
            return Err(self.reject(MatchError::NoPendingDecision));
        };
        let Some(option) = event.option(response).copied() else {
            let err = MatchError::InvalidResponse {
                response,
                kind: event.kind,
                event: event.id,
            };
            return Err(self.reject(err));
        };

        let tuning = &self.config.tuning;
        let delta = momentum_delta(&option, tuning, &mut self.rng);
        let effect = StatEffect::roll(response, tuning, &mut self.rng);

        let state = self.store.read();
        let (attack, defense) = delta.applied_to(&state);
        let mut patch = effect.patch(&state);
        patch.attack_momentum = Some(attack);
        patch.defense_momentum = Some(defense);
        patch.is_decision_pending = Some(false);
        patch.decision_time_left = Some(self.window());
        let possession = patch.possession.unwrap_or(state.possession);
        self.store.write(patch);

        let event = self
            .current_decision
            .take()
            .ok_or(MatchError::NoPendingDecision)?;

        info!(
            event = %event.id,
            kind = %event.kind,
            response = %response,
            risk = %option.risk,
            attack_delta = delta.attack,
            defense_delta = delta.defense,
            "decision resolved"
        );
        metrics::record_decision_resolved(response, option.risk);
        metrics::set_momentum(attack, defense);
        metrics::set_possession(possession);

        Ok(DecisionResolution {
            event,
            response,
            risk: option.risk,
            delta,
            effect,
        })
    }

    /// Expires decision `id` if it is still the pending one.
    ///
    /// Timers armed for a decision that was already answered find nothing
    /// to do and return `None`.
    pub fn expire_decision(&mut self, id: EventId) -> Option<TimeoutResolution> {
        match &self.current_decision {
            Some(event) if event.id == id => Some(self.resolve_timeout()),
            _ => {
                debug!(event = %id, "stale decision timer ignored");
                None
            }
        }
    }

    /// Snapshot of the match state.
    #[must_use]
    pub fn match_state(&self) -> MatchState {
        self.store.read()
    }

    /// Whether a match is in progress.
    #[must_use]
    pub const fn is_match_active(&self) -> bool {
        self.running
    }

    /// The decision awaiting an answer, if any.
    #[must_use]
    pub const fn current_decision(&self) -> Option<&DecisionEvent> {
        self.current_decision.as_ref()
    }

    /// Configuration the engine runs with.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Phase the engine last observed.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.last_phase
    }

    // ------------------------------------------------------------------------

    fn window(&self) -> u32 {
        self.config.decisions.window_secs()
    }

    fn reject(&self, err: MatchError) -> MatchError {
        warn!(reason = err.reason(), "{err}; ignoring");
        metrics::record_rejected(err.reason());
        err
    }

    fn enter_phase(&mut self, reading: ClockReading) -> MatchNotice {
        let from = self.last_phase;
        self.last_phase = reading.phase;
        match reading.phase {
            MatchPhase::Halftime => info!(elapsed = reading.elapsed, "end of the first half"),
            MatchPhase::SecondHalf => info!(elapsed = reading.elapsed, "second half under way"),
            phase => debug!(%phase, elapsed = reading.elapsed, "phase entered"),
        }
        metrics::set_phase(reading.phase, Some(from));
        MatchNotice::PhaseChanged {
            from,
            to: reading.phase,
            elapsed: reading.elapsed,
        }
    }

    /// Event window check followed by the per-tick trigger roll.
    fn should_raise(&mut self, reading: ClockReading) -> bool {
        let margin = self.config.decisions.event_margin.as_secs();
        let half = self.clock.half_length(reading.phase);
        let t = reading.display_time;
        if t < margin || t > half.saturating_sub(margin) {
            return false;
        }
        self.rng.random::<f64>() < self.config.decisions.trigger_probability
    }

    fn raise(
        &mut self,
        kind: EventKind,
        reading: ClockReading,
    ) -> Result<DecisionEvent, MatchError> {
        if let Some(pending) = &self.current_decision {
            let err = MatchError::DecisionPending { pending: pending.id };
            return Err(self.reject(err));
        }

        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        let event = DecisionEvent::new(
            id,
            kind,
            reading.display_time,
            reading.phase,
            self.window(),
        );

        self.store.write(MatchStatePatch {
            is_decision_pending: Some(true),
            decision_time_left: Some(event.timeout),
            ..MatchStatePatch::default()
        });
        self.current_decision = Some(event.clone());

        info!(
            event = %id,
            kind = %kind,
            at = %format_clock(reading.display_time),
            phase = %reading.phase,
            "{}",
            event.prompt
        );
        metrics::record_decision_raised(kind);
        Ok(event)
    }

    /// One second off the decision window; expires the decision at zero.
    fn count_down(&mut self) -> Option<TimeoutResolution> {
        let left = self.store.read().decision_time_left.saturating_sub(1);
        if left == 0 {
            return Some(self.resolve_timeout());
        }
        self.store.write(MatchStatePatch {
            decision_time_left: Some(left),
            ..MatchStatePatch::default()
        });
        None
    }

    fn resolve_timeout(&mut self) -> TimeoutResolution {
        let penalty = self.config.tuning.timeout_penalty;
        let state = self.store.read();
        let (attack, defense) = MomentumDelta::penalty(penalty).applied_to(&state);
        self.store.write(MatchStatePatch {
            attack_momentum: Some(attack),
            defense_momentum: Some(defense),
            is_decision_pending: Some(false),
            decision_time_left: Some(self.window()),
            ..MatchStatePatch::default()
        });

        let event = self.current_decision.take();
        let id = event.as_ref().map(|e| e.id);
        info!(event = ?id, penalty, "decision timed out; conservative default applied");
        metrics::record_decision_timed_out();
        metrics::set_momentum(attack, defense);

        TimeoutResolution {
            event,
            attack_momentum: attack,
            defense_momentum: defense,
        }
    }

    fn finish(&mut self, reason: EndReason) -> MatchNotice {
        self.running = false;
        if let Some(dropped) = self.current_decision.take() {
            debug!(event = %dropped.id, "pending decision discarded at end of match");
        }

        let mut patch = MatchStatePatch {
            phase: Some(MatchPhase::Ended),
            is_first_half: Some(false),
            is_decision_pending: Some(false),
            ..MatchStatePatch::default()
        };
        if reason == EndReason::FullTime {
            patch.current_time = Some(self.clock.half_length(MatchPhase::SecondHalf));
        }
        self.store.write(patch);

        metrics::set_phase(MatchPhase::Ended, Some(self.last_phase));
        self.last_phase = MatchPhase::Ended;

        let state = self.store.read();
        info!(
            reason = reason.as_str(),
            home = state.home_score,
            away = state.away_score,
            "match over"
        );
        MatchNotice::Ended { reason, state }
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("running", &self.running)
            .field("phase", &self.last_phase)
            .field("current_decision", &self.current_decision.as_ref().map(|e| e.id))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::WatchStore;
    use proptest::prelude::*;

    fn engine_with(probability: f64, seed: u64) -> (MatchEngine, Arc<WatchStore>) {
        let mut config = MatchConfig::default();
        config.decisions.trigger_probability = probability;
        let store = Arc::new(WatchStore::new());
        let engine = MatchEngine::with_seed(Arc::new(config), store.clone(), seed);
        (engine, store)
    }

    fn started(probability: f64) -> (MatchEngine, Arc<WatchStore>) {
        let (mut engine, store) = engine_with(probability, 7);
        engine.start_match().unwrap();
        (engine, store)
    }

    fn run_ticks(
        engine: &mut MatchEngine,
        range: std::ops::RangeInclusive<u64>,
    ) -> Vec<MatchNotice> {
        range.flat_map(|t| engine.tick(t)).collect()
    }

    #[test]
    fn test_start_resets_to_kickoff() {
        let (mut engine, store) = engine_with(0.0, 1);
        store.write(MatchStatePatch {
            home_score: Some(3),
            possession: Some(80),
            ..MatchStatePatch::default()
        });
        engine.start_match().unwrap();

        assert!(engine.is_match_active());
        assert_eq!(engine.match_state(), MatchState::kickoff(15));
        assert!(engine.current_decision().is_none());
    }

    #[test]
    fn test_double_start_keeps_elapsed_time() {
        let (mut engine, store) = started(0.0);
        run_ticks(&mut engine, 1..=50);
        assert_eq!(store.read().current_time, 50);

        assert_eq!(engine.start_match(), Err(MatchError::AlreadyRunning));
        assert_eq!(store.read().current_time, 50);
        assert!(engine.is_match_active());
    }

    #[test]
    fn test_halftime_reading_at_301() {
        let (mut engine, store) = started(0.0);
        let notices = run_ticks(&mut engine, 1..=301);

        let state = store.read();
        assert_eq!(state.phase, MatchPhase::Halftime);
        assert_eq!(state.current_time, 1);
        assert!(!state.is_first_half);
        assert!(notices.iter().any(|n| matches!(
            n,
            MatchNotice::PhaseChanged {
                from: MatchPhase::FirstHalf,
                to: MatchPhase::Halftime,
                elapsed: 300,
            }
        )));
    }

    #[test]
    fn test_full_time_stops_engine() {
        let (mut engine, store) = started(0.0);
        let notices = run_ticks(&mut engine, 1..=720);

        assert!(!engine.is_match_active());
        assert_eq!(engine.phase(), MatchPhase::Ended);
        let state = store.read();
        assert_eq!(state.phase, MatchPhase::Ended);
        assert_eq!(state.current_time, 300);
        assert!(matches!(
            notices.last(),
            Some(MatchNotice::Ended { reason: EndReason::FullTime, .. })
        ));

        // Further ticks are ignored
        assert!(engine.tick(721).is_empty());
    }

    #[test]
    fn test_event_window_respected() {
        let (mut engine, _) = started(1.0);
        assert!(run_ticks(&mut engine, 1..=29).is_empty());

        let notices = engine.tick(30);
        assert!(matches!(notices.as_slice(), [MatchNotice::DecisionRaised(e)] if e.time == 30));
    }

    #[test]
    fn test_no_events_late_in_half_or_at_halftime() {
        let (mut engine, _) = started(1.0);
        // Jump straight to the end of the first half
        assert!(engine.tick(271).is_empty());
        assert!(engine.tick(299).is_empty());
        let notices = run_ticks(&mut engine, 300..=419);
        assert!(
            !notices.iter().any(|n| matches!(n, MatchNotice::DecisionRaised(_))),
            "no decision may be raised at halftime"
        );
    }

    #[test]
    fn test_single_pending_decision() {
        let (mut engine, store) = started(1.0);
        engine.tick(30);
        let first = engine.current_decision().unwrap().id;

        let notices = run_ticks(&mut engine, 31..=40);
        assert!(!notices.iter().any(|n| matches!(n, MatchNotice::DecisionRaised(_))));
        assert_eq!(engine.current_decision().unwrap().id, first);
        assert!(store.read().is_decision_pending);

        let err = engine.trigger_event(EventKind::Penalty).unwrap_err();
        assert_eq!(err, MatchError::DecisionPending { pending: first });
    }

    #[test]
    fn test_timeout_after_exact_window() {
        let (mut engine, store) = started(1.0);
        engine.tick(30);
        assert_eq!(store.read().decision_time_left, 15);

        for (t, left) in (31..=44).zip((1..=14).rev()) {
            assert!(engine.tick(t).is_empty());
            assert_eq!(store.read().decision_time_left, left);
        }

        let notices = engine.tick(45);
        assert!(matches!(notices.as_slice(), [MatchNotice::DecisionTimedOut(_)]));
        let state = store.read();
        assert!(!state.is_decision_pending);
        assert_eq!(state.attack_momentum, 45);
        assert_eq!(state.defense_momentum, 45);
        assert_eq!(state.decision_time_left, 15);
        assert!(engine.current_decision().is_none());
    }

    #[test]
    fn test_timeout_penalty_clamps_at_zero() {
        let (mut engine, store) = started(0.0);
        store.write(MatchStatePatch {
            attack_momentum: Some(2),
            ..MatchStatePatch::default()
        });
        let event = engine.trigger_event(EventKind::Injury).unwrap();
        let resolution = engine.expire_decision(event.id).unwrap();
        assert_eq!(resolution.attack_momentum, 0);
        assert_eq!(resolution.defense_momentum, 45);
        assert_eq!(store.read().attack_momentum, 0);
    }

    #[test]
    fn test_invalid_response_leaves_state_unchanged() {
        let (mut engine, store) = started(0.0);
        engine.tick(60);
        engine.trigger_event(EventKind::FoulAway).unwrap();
        let before = store.read();

        let err = engine.process_decision(TacticalResponse::QuickFreeKick).unwrap_err();
        assert!(matches!(err, MatchError::InvalidResponse { kind: EventKind::FoulAway, .. }));
        assert_eq!(store.read(), before);
        assert!(engine.current_decision().is_some());
    }

    #[test]
    fn test_response_without_pending_decision() {
        let (mut engine, store) = started(0.0);
        let before = store.read();
        assert_eq!(
            engine.process_decision(TacticalResponse::LowBlock).unwrap_err(),
            MatchError::NoPendingDecision
        );
        assert_eq!(store.read(), before);
    }

    #[test]
    fn test_quick_free_kick_wins_home_corner() {
        let (mut engine, store) = started(0.0);
        engine.tick(60);
        engine.trigger_event(EventKind::FoulHome).unwrap();
        let before = store.read();

        let resolution = engine.process_decision(TacticalResponse::QuickFreeKick).unwrap();
        assert_eq!(resolution.event.kind, EventKind::FoulHome);
        assert_eq!(resolution.effect, StatEffect::HomeCorner);

        let after = store.read();
        assert_eq!(after.corners.home, before.corners.home + 1);
        assert_eq!(after.corners.away, before.corners.away);
        assert_eq!(after.fouls, before.fouls);
        assert_eq!(after.shots, before.shots);
        assert!(!after.is_decision_pending);
        assert!(after.attack_momentum > before.attack_momentum);
    }

    #[test]
    fn test_oversized_multiplier_keeps_momentum_in_range() {
        let mut config = MatchConfig::default();
        config.decisions.trigger_probability = 0.0;
        config.tuning.risk_multipliers.high = 1e300;
        let store = Arc::new(WatchStore::new());
        let mut engine = MatchEngine::with_seed(Arc::new(config), store.clone(), 13);
        engine.start_match().unwrap();

        engine.trigger_event(EventKind::FoulHome).unwrap();
        engine.process_decision(TacticalResponse::QuickFreeKick).unwrap();

        let state = store.read();
        assert!(state.attack_momentum >= 85 && state.attack_momentum <= 100);
        assert!(state.defense_momentum >= 85 && state.defense_momentum <= 100);
        assert_eq!(state.corners.home, 1);
    }

    #[test]
    fn test_high_press_and_counter_attack_effects() {
        let (mut engine, store) = started(0.0);
        engine.trigger_event(EventKind::ShotOnTarget).unwrap();
        engine.process_decision(TacticalResponse::HighPress).unwrap();
        assert_eq!(store.read().fouls.home, 1);

        engine.trigger_event(EventKind::ShotOnTarget).unwrap();
        engine.process_decision(TacticalResponse::CounterAttack).unwrap();
        assert_eq!(store.read().shots.home, 1);
        assert_eq!(store.read().shots.away, 0);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let (mut engine, store) = started(0.0);
        let first = engine.trigger_event(EventKind::CornerHome).unwrap();
        engine.process_decision(TacticalResponse::OrganizedAttack).unwrap();
        let second = engine.trigger_event(EventKind::CornerAway).unwrap();
        let before = store.read();

        assert!(engine.expire_decision(first.id).is_none());
        assert_eq!(store.read(), before);
        assert_eq!(engine.current_decision().unwrap().id, second.id);
        assert!(second.id > first.id);
    }

    #[test]
    fn test_trigger_requires_running_match() {
        let (mut engine, _) = engine_with(0.0, 1);
        assert_eq!(
            engine.trigger_event(EventKind::Offside).unwrap_err(),
            MatchError::NotRunning
        );
    }

    #[test]
    fn test_stop_clears_pending_decision() {
        let (mut engine, store) = started(0.0);
        engine.trigger_event(EventKind::RedCard).unwrap();

        let notice = engine.stop_match();
        assert!(matches!(notice, Some(MatchNotice::Ended { reason: EndReason::Stopped, .. })));
        assert!(!engine.is_match_active());
        assert!(engine.current_decision().is_none());
        let state = store.read();
        assert_eq!(state.phase, MatchPhase::Ended);
        assert!(!state.is_decision_pending);

        // Safe to call again
        assert!(engine.stop_match().is_none());
        // And the match can be restarted
        engine.start_match().unwrap();
        assert_eq!(store.read().phase, MatchPhase::FirstHalf);
    }

    #[test]
    fn test_same_seed_same_match() {
        fn play(seed: u64) -> Vec<(u64, EventKind)> {
            let (mut engine, _) = engine_with(0.2, seed);
            engine.start_match().unwrap();
            let mut raised = Vec::new();
            for t in 1..=720 {
                for notice in engine.tick(t) {
                    if let MatchNotice::DecisionRaised(event) = notice {
                        raised.push((t, event.kind));
                        let first = event.options[0].response;
                        engine.process_decision(first).unwrap();
                    }
                }
            }
            raised
        }

        let a = play(99);
        assert!(!a.is_empty());
        assert_eq!(a, play(99));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Ticks(u8),
        Respond(usize),
        RespondInvalid,
        Expire,
        Trigger(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u8..40).prop_map(Op::Ticks),
            (0usize..3).prop_map(Op::Respond),
            Just(Op::RespondInvalid),
            Just(Op::Expire),
            (0usize..EventKind::ALL.len()).prop_map(Op::Trigger),
        ]
    }

    proptest! {
        #[test]
        fn prop_gauges_bounded_and_single_pending(
            seed in any::<u64>(),
            ops in prop::collection::vec(op(), 1..80),
        ) {
            let (mut engine, store) = engine_with(0.5, seed);
            engine.start_match().unwrap();
            let mut elapsed = 0u64;

            for op in ops {
                match op {
                    Op::Ticks(n) => {
                        for _ in 0..n {
                            elapsed += 1;
                            engine.tick(elapsed);
                        }
                    }
                    Op::Respond(i) => {
                        let response = engine
                            .current_decision()
                            .and_then(|e| e.options.get(i))
                            .map(|o| o.response);
                        if let Some(response) = response {
                            prop_assert!(engine.process_decision(response).is_ok());
                        }
                    }
                    Op::RespondInvalid => {
                        let before = store.read();
                        let invalid = TacticalResponse::ALL.into_iter().find(|r| {
                            engine.current_decision().is_some_and(|e| e.option(*r).is_none())
                        });
                        if let Some(r) = invalid {
                            prop_assert!(engine.process_decision(r).is_err());
                            prop_assert_eq!(store.read(), before);
                        }
                    }
                    Op::Expire => {
                        if let Some(id) = engine.current_decision().map(|e| e.id) {
                            engine.expire_decision(id);
                        }
                    }
                    Op::Trigger(i) => {
                        let _ = engine.trigger_event(EventKind::ALL[i]);
                    }
                }

                let state = store.read();
                prop_assert!(state.attack_momentum <= 100);
                prop_assert!(state.defense_momentum <= 100);
                prop_assert!(state.possession <= 100);
                prop_assert_eq!(state.is_decision_pending, engine.current_decision().is_some());
            }
        }
    }
}
