//! Match metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops until
//! [`init_metrics`] installs the Prometheus recorder. Every label value
//! comes from a closed enum, so cardinality is bounded by the catalog.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::engine::clock::MatchPhase;
use crate::error::KickoffError;
use crate::tactics::{EventKind, RiskTier, TacticalResponse};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global Prometheus recorder.
///
/// With a port, metrics are served on `127.0.0.1:<port>/metrics`.
///
/// # Errors
///
/// Returns `KickoffError::Io` if the recorder or listener cannot be
/// installed.
pub fn init_metrics(port: Option<u16>) -> Result<(), KickoffError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics recorder already installed");
        return Ok(());
    }

    let builder = PrometheusBuilder::new();
    let installed = match port {
        Some(port) => builder.with_http_listener(([127, 0, 0, 1], port)).install(),
        None => builder.install_recorder().map(|_| ()),
    };
    installed.map_err(|e| KickoffError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    if let Some(port) = port {
        tracing::info!(port, "serving prometheus metrics");
    }
    Ok(())
}

fn describe_metrics() {
    describe_counter!("kickoff_matches_started_total", "Matches kicked off");
    describe_counter!(
        "kickoff_decisions_raised_total",
        "Decision events raised, by event kind"
    );
    describe_counter!(
        "kickoff_decisions_resolved_total",
        "Decisions answered, by response and risk"
    );
    describe_counter!(
        "kickoff_decisions_timed_out_total",
        "Decisions resolved by the conservative default"
    );
    describe_counter!(
        "kickoff_rejected_operations_total",
        "Engine operations ignored as invalid, by reason"
    );
    describe_gauge!("kickoff_momentum", "Momentum gauge per side (0-100)");
    describe_gauge!("kickoff_possession", "Home possession percentage");
    describe_gauge!("kickoff_match_phase", "Current match phase (1 = active)");
}

pub fn record_match_started() {
    counter!("kickoff_matches_started_total").increment(1);
}

pub fn record_decision_raised(kind: EventKind) {
    counter!("kickoff_decisions_raised_total", "event" => kind.as_str()).increment(1);
}

pub fn record_decision_resolved(response: TacticalResponse, risk: RiskTier) {
    counter!(
        "kickoff_decisions_resolved_total",
        "response" => response.as_str(),
        "risk" => risk.as_str(),
    )
    .increment(1);
}

pub fn record_decision_timed_out() {
    counter!("kickoff_decisions_timed_out_total").increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!("kickoff_rejected_operations_total", "reason" => reason).increment(1);
}

pub fn set_momentum(attack: u8, defense: u8) {
    gauge!("kickoff_momentum", "side" => "attack").set(f64::from(attack));
    gauge!("kickoff_momentum", "side" => "defense").set(f64::from(defense));
}

pub fn set_possession(possession: u8) {
    gauge!("kickoff_possession").set(f64::from(possession));
}

/// Sets the phase gauge, zeroing the previous phase's series.
pub fn set_phase(phase: MatchPhase, previous: Option<MatchPhase>) {
    if let Some(prev) = previous.filter(|p| *p != phase) {
        gauge!("kickoff_match_phase", "phase" => prev.as_str()).set(0.0);
    }
    gauge!("kickoff_match_phase", "phase" => phase.as_str()).set(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_match_started();
        record_decision_raised(EventKind::Offside);
        record_decision_resolved(TacticalResponse::WingPlay, RiskTier::Medium);
        record_decision_timed_out();
        record_rejected("no_pending_decision");
        set_momentum(10, 90);
        set_possession(55);
        set_phase(MatchPhase::SecondHalf, Some(MatchPhase::Halftime));
    }

    #[test]
    fn test_rendered_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_decision_raised(EventKind::Penalty);
            record_decision_raised(EventKind::Penalty);
            record_decision_resolved(TacticalResponse::QuickFreeKick, RiskTier::High);
            set_momentum(40, 60);
            set_phase(MatchPhase::Halftime, Some(MatchPhase::FirstHalf));
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"kickoff_decisions_raised_total{event="PENALTY"} 2"#));
        assert!(rendered.contains(r#"response="QUICK_FREE_KICK""#));
        assert!(rendered.contains(r#"kickoff_momentum{side="attack"} 40"#));
        assert!(rendered.contains(r#"kickoff_match_phase{phase="first_half"} 0"#));
        assert!(rendered.contains(r#"kickoff_match_phase{phase="halftime"} 1"#));
    }
}
