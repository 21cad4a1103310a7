//! Async match driver
//!
//! [`MatchRunner`] puts a [`MatchEngine`] behind a mutex and drives it from
//! a tokio interval, one tick per simulated second. Each raised decision
//! gets its own timer task racing a child [`CancellationToken`] of the
//! match token, so stopping the match cancels every timer at once and a
//! resolved decision cancels only its own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::schema::MatchConfig;
use crate::error::MatchError;
use crate::tactics::{EventKind, TacticalResponse};

use super::decision::{DecisionEvent, EventId};
use super::simulator::MatchEngine;
use super::state::{MatchState, StateView, WatchStore};
use super::{DecisionResolution, MatchNotice};

/// Notices buffered per subscriber before it starts lagging.
const NOTICE_CAPACITY: usize = 1024;

struct ClockTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

struct DecisionTimer {
    id: EventId,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Tasks {
    clock: Option<ClockTask>,
    decision: Option<DecisionTimer>,
}

/// Runs a match in (scaled) real time.
///
/// Lock order is engine before tasks; notices are published with neither
/// lock held.
pub struct MatchRunner {
    engine: Mutex<MatchEngine>,
    store: Arc<WatchStore>,
    notices: broadcast::Sender<MatchNotice>,
    tasks: Mutex<Tasks>,
    tick_period: Duration,
    window: u32,
    cancel: CancellationToken,
}

impl MatchRunner {
    /// Creates a runner for `config` drawing from `rng`.
    #[must_use]
    pub fn new(config: Arc<MatchConfig>, rng: StdRng) -> Arc<Self> {
        let store = Arc::new(WatchStore::new());
        let tick_period = config.clock.tick_period();
        let window = config.decisions.window_secs();
        let engine = MatchEngine::new(config, store.clone(), rng);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Arc::new(Self {
            engine: Mutex::new(engine),
            store,
            notices,
            tasks: Mutex::new(Tasks::default()),
            tick_period,
            window,
            cancel: CancellationToken::new(),
        })
    }

    /// Creates a runner with an RNG seeded from `seed`.
    #[must_use]
    pub fn with_seed(config: Arc<MatchConfig>, seed: u64) -> Arc<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Kicks off and starts the match clock.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::AlreadyRunning`] while a match is in progress.
    pub fn start(self: &Arc<Self>) -> Result<(), MatchError> {
        let state = {
            let mut engine = self.engine();
            engine.start_match()?;
            engine.match_state()
        };
        self.publish(MatchNotice::Started { state });

        let token = self.cancel.child_token();
        let handle = self.spawn_clock(token.clone());
        let previous = self.tasks().clock.replace(ClockTask {
            cancel: token,
            handle: Some(handle),
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
        Ok(())
    }

    /// Stops the match, its clock, and any armed decision timer.
    ///
    /// Returns the end notice, or `None` if no match was running.
    pub fn stop(&self) -> Option<MatchNotice> {
        let notice = self.engine().stop_match();
        {
            let mut tasks = self.tasks();
            if let Some(timer) = tasks.decision.take() {
                timer.cancel.cancel();
            }
            if let Some(clock) = &tasks.clock {
                clock.cancel.cancel();
            }
        }
        if let Some(notice) = &notice {
            self.publish(notice.clone());
        }
        notice
    }

    /// Raises a decision now and arms its timeout.
    ///
    /// # Errors
    ///
    /// See [`MatchEngine::trigger_event`].
    pub fn trigger_event(self: &Arc<Self>, kind: EventKind) -> Result<DecisionEvent, MatchError> {
        let event = self.engine().trigger_event(kind)?;
        self.dispatch(MatchNotice::DecisionRaised(event.clone()));
        Ok(event)
    }

    /// Answers the pending decision and disarms its timeout.
    ///
    /// # Errors
    ///
    /// See [`MatchEngine::process_decision`].
    pub fn process_decision(
        &self,
        response: TacticalResponse,
    ) -> Result<DecisionResolution, MatchError> {
        let resolution = self.engine().process_decision(response)?;
        self.disarm_timer();
        self.publish(MatchNotice::DecisionResolved(resolution.clone()));
        Ok(resolution)
    }

    /// Snapshot of the match state.
    #[must_use]
    pub fn match_state(&self) -> MatchState {
        self.engine().match_state()
    }

    /// Whether a match is in progress.
    #[must_use]
    pub fn is_match_active(&self) -> bool {
        self.engine().is_match_active()
    }

    /// The decision awaiting an answer, if any.
    #[must_use]
    pub fn current_decision(&self) -> Option<DecisionEvent> {
        self.engine().current_decision().cloned()
    }

    /// Subscribes to match notices from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MatchNotice> {
        self.notices.subscribe()
    }

    /// Read-only view of the match state.
    #[must_use]
    pub fn view(&self) -> StateView {
        self.store.view()
    }

    /// Waits for the match clock task to exit.
    pub async fn finished(&self) {
        let handle = self.tasks().clock.as_mut().and_then(|c| c.handle.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "match clock task failed");
            }
        }
    }

    /// Stops the match and cancels every task the runner spawned.
    pub fn shutdown(&self) {
        self.stop();
        self.cancel.cancel();
    }

    // ------------------------------------------------------------------------

    fn engine(&self) -> MutexGuard<'_, MatchEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, notice: MatchNotice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }

    fn spawn_clock(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let runner = Arc::clone(self);
        let period = self.tick_period;
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            let mut elapsed = 0u64;
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("match clock cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        elapsed += 1;
                        if !runner.on_tick(&cancel, elapsed) {
                            debug!(elapsed, "match clock stopped");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Returns whether the clock should keep running.
    ///
    /// `cancel` belongs to the clock task that counted `elapsed`; a clock
    /// cancelled while waiting for the engine must not tick a restarted match.
    fn on_tick(self: &Arc<Self>, cancel: &CancellationToken, elapsed: u64) -> bool {
        let (notices, active) = {
            let mut engine = self.engine();
            if cancel.is_cancelled() {
                return false;
            }
            let notices = engine.tick(elapsed);
            (notices, engine.is_match_active())
        };
        for notice in notices {
            self.dispatch(notice);
        }
        active
    }

    fn dispatch(self: &Arc<Self>, notice: MatchNotice) {
        match &notice {
            MatchNotice::DecisionRaised(event) => self.arm_timer(event.id),
            MatchNotice::DecisionResolved(_)
            | MatchNotice::DecisionTimedOut(_)
            | MatchNotice::Ended { .. } => self.disarm_timer(),
            MatchNotice::Started { .. } | MatchNotice::PhaseChanged { .. } => {}
        }
        self.publish(notice);
    }

    fn arm_timer(self: &Arc<Self>, id: EventId) {
        let token = {
            let tasks = self.tasks();
            tasks
                .clock
                .as_ref()
                .map_or_else(|| self.cancel.child_token(), |c| c.cancel.child_token())
        };

        let runner = Arc::clone(self);
        let wait = self.tick_period * self.window;
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => debug!(event = %id, "decision timer disarmed"),
                () = time::sleep(wait) => runner.on_timer(id),
            }
        });

        let previous = self.tasks().decision.replace(DecisionTimer { id, cancel: token });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
        debug!(event = %id, wait = ?wait, "decision timer armed");
    }

    fn disarm_timer(&self) {
        if let Some(timer) = self.tasks().decision.take() {
            debug!(event = %timer.id, "disarming decision timer");
            timer.cancel.cancel();
        }
    }

    fn on_timer(self: &Arc<Self>, id: EventId) {
        let expired = self.engine().expire_decision(id);
        if let Some(expired) = expired {
            self.dispatch(MatchNotice::DecisionTimedOut(expired));
        }
    }
}

impl Drop for MatchRunner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{MAX_TIME_SCALE, MatchPreset};
    use crate::engine::{EndReason, MatchPhase};
    use futures_util::StreamExt;
    use tokio_test::{assert_err, assert_ok};

    fn quiet_config() -> MatchConfig {
        let mut config = MatchConfig::default();
        config.decisions.trigger_probability = 0.0;
        config
    }

    fn drain(rx: &mut broadcast::Receiver<MatchNotice>) -> Vec<MatchNotice> {
        let mut out = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            out.push(notice);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_reaches_halftime() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 1);
        assert_ok!(runner.start());

        time::sleep(Duration::from_millis(301_500)).await;

        let state = runner.match_state();
        assert_eq!(state.phase, MatchPhase::Halftime);
        assert_eq!(state.current_time, 1);
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_clock() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 1);
        assert_ok!(runner.start());
        time::sleep(Duration::from_millis(10_500)).await;

        assert_eq!(assert_err!(runner.start()), MatchError::AlreadyRunning);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runner.match_state().current_time, 11);
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sprint_match_runs_to_full_time() {
        let mut config = MatchConfig::preset(MatchPreset::Sprint);
        config.clock.time_scale = 10;
        let runner = MatchRunner::with_seed(Arc::new(config), 42);
        let mut rx = runner.subscribe();

        assert_ok!(runner.start());
        runner.finished().await;

        assert!(!runner.is_match_active());
        let state = runner.match_state();
        assert_eq!(state.phase, MatchPhase::Ended);
        assert!(!state.is_decision_pending);

        let notices = drain(&mut rx);
        assert!(matches!(notices.first(), Some(MatchNotice::Started { .. })));
        assert!(matches!(
            notices.last(),
            Some(MatchNotice::Ended { reason: EndReason::FullTime, .. })
        ));
        let phases: Vec<_> = notices
            .iter()
            .filter_map(|n| match n {
                MatchNotice::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![MatchPhase::Halftime, MatchPhase::SecondHalf]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_decision_times_out_once() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 3);
        let mut rx = runner.subscribe();
        assert_ok!(runner.start());
        let event = assert_ok!(runner.trigger_event(EventKind::Injury));

        time::sleep(Duration::from_millis(15_500)).await;

        let state = runner.match_state();
        assert!(!state.is_decision_pending);
        assert_eq!(state.attack_momentum, 45);
        assert_eq!(state.defense_momentum, 45);
        assert!(runner.current_decision().is_none());

        let timeouts: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|n| match n {
                MatchNotice::DecisionTimedOut(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(timeouts.len(), 1);
        assert_eq!(timeouts[0].event.as_ref().map(|e| e.id), Some(event.id));
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_answered_decision_never_times_out() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 5);
        let mut rx = runner.subscribe();
        assert_ok!(runner.start());
        assert_ok!(runner.trigger_event(EventKind::CornerAway));

        time::sleep(Duration::from_secs(3)).await;
        assert_ok!(runner.process_decision(TacticalResponse::LowBlock));
        time::sleep(Duration::from_secs(30)).await;

        let notices = drain(&mut rx);
        assert!(notices.iter().any(|n| matches!(n, MatchNotice::DecisionResolved(_))));
        assert!(!notices.iter().any(|n| matches!(n, MatchNotice::DecisionTimedOut(_))));
        assert!(!runner.match_state().is_decision_pending);
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_clock_and_timer() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 8);
        assert_ok!(runner.start());
        time::sleep(Duration::from_millis(5_500)).await;
        assert_ok!(runner.trigger_event(EventKind::Penalty));

        let notice = runner.stop();
        assert!(matches!(notice, Some(MatchNotice::Ended { reason: EndReason::Stopped, .. })));
        runner.finished().await;

        let before = runner.match_state();
        time::sleep(Duration::from_secs(60)).await;
        let after = runner.match_state();
        assert_eq!(before, after);
        assert_eq!(after.phase, MatchPhase::Ended);
        assert_eq!(after.current_time, 5);
        assert!(!after.is_decision_pending);
        assert!(runner.current_decision().is_none());

        assert!(runner.stop().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_streams_updates() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 2);
        let mut stream = runner.view().into_stream();
        assert_eq!(stream.next().await.unwrap().phase, MatchPhase::NotStarted);

        assert_ok!(runner.start());
        let kickoff = stream.next().await.unwrap();
        assert_eq!(kickoff.phase, MatchPhase::FirstHalf);

        let later = stream.next().await.unwrap();
        assert!(later.current_time >= 1);
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 4);
        assert_ok!(runner.start());
        time::sleep(Duration::from_millis(20_500)).await;
        runner.stop();
        runner.finished().await;

        assert_ok!(runner.start());
        time::sleep(Duration::from_millis(2_500)).await;
        let state = runner.match_state();
        assert_eq!(state.phase, MatchPhase::FirstHalf);
        assert_eq!(state.current_time, 2);
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_clock_cannot_tick_restarted_match() {
        let runner = MatchRunner::with_seed(Arc::new(quiet_config()), 6);
        assert_ok!(runner.start());
        let stale = runner.tasks().clock.as_ref().map(|c| c.cancel.clone()).unwrap();
        runner.stop();
        assert_ok!(runner.start());

        // The old clock reaching the engine lock after the restart
        assert!(!runner.on_tick(&stale, 400));
        let state = runner.match_state();
        assert_eq!(state.phase, MatchPhase::FirstHalf);
        assert_eq!(state.current_time, 0);
        assert!(runner.is_match_active());
        runner.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_time_scale_runs_to_full_time() {
        for scale in [MAX_TIME_SCALE, u32::MAX] {
            let mut config = quiet_config();
            config.clock.time_scale = scale;
            let runner = MatchRunner::with_seed(Arc::new(config), 11);

            assert_ok!(runner.start());
            runner.finished().await;

            let state = runner.match_state();
            assert_eq!(state.phase, MatchPhase::Ended, "time_scale {scale}");
            assert!(!runner.is_match_active());
        }
    }
}
