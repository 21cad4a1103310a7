//! The engine through the public library API, without the binary.

mod common;

use std::sync::Arc;
use std::time::Duration;

use kickoff::config::ConfigLoader;
use kickoff::engine::{EndReason, MatchEngine, MatchNotice, MatchPhase, MatchRunner, WatchStore};
use kickoff::tactics::{EventKind, TacticalResponse};

use common::fixture;

#[test]
fn fixture_match_played_tick_by_tick() {
    let loaded = ConfigLoader::with_defaults()
        .load(&fixture("quick_match.yaml"))
        .unwrap();
    assert!(loaded.warnings.is_empty());

    let store = Arc::new(WatchStore::new());
    let view = store.view();
    let mut engine = MatchEngine::with_seed(Arc::clone(&loaded.config), store, 7);
    engine.start_match().unwrap();

    let mut answered = 0;
    let mut ended = None;
    for elapsed in 1..=200 {
        for notice in engine.tick(elapsed) {
            match notice {
                MatchNotice::DecisionRaised(event) => {
                    let last = event.options.last().unwrap().response;
                    engine.process_decision(last).unwrap();
                    answered += 1;
                }
                MatchNotice::Ended { reason, .. } => ended = Some((elapsed, reason)),
                _ => {}
            }
        }
        let state = view.current();
        assert!(state.attack_momentum <= 100 && state.defense_momentum <= 100);
    }

    assert!(answered > 0);
    assert_eq!(ended, Some((130, EndReason::FullTime)));
    let state = view.current();
    assert_eq!(state.phase, MatchPhase::Ended);
    assert_eq!(state.current_time, 60);
}

#[tokio::test(start_paused = true)]
async fn runner_answers_through_the_arc_api() {
    let loaded = ConfigLoader::with_defaults()
        .load(&fixture("quick_match.yaml"))
        .unwrap();
    let mut config = (*loaded.config).clone();
    config.decisions.trigger_probability = 0.0;

    let runner = MatchRunner::with_seed(Arc::new(config), 1);
    runner.start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let event = runner.trigger_event(EventKind::FoulHome).unwrap();
    let before = runner.match_state();
    let resolution = runner.process_decision(TacticalResponse::QuickFreeKick).unwrap();
    assert_eq!(resolution.event.id, event.id);

    let after = runner.match_state();
    assert_eq!(after.corners.home, before.corners.home + 1);
    assert_eq!(after.corners.away, before.corners.away);

    runner.finished().await;
    assert_eq!(runner.match_state().phase, MatchPhase::Ended);
}
