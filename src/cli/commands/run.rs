//! `kickoff run`
//!
//! Plays one match in scaled real time. Notices from the runner are
//! printed as commentary, written to the event log, and tallied for the
//! closing summary. Decisions are answered by the selected [`Responder`],
//! or typed on stdin in interactive mode.

use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tokio::io::Stdin;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::args::{OutputFormat, Responder, RunArgs};
use crate::config::{ConfigLoader, MatchConfig};
use crate::engine::{
    DecisionEvent, EndReason, MatchNotice, MatchPhase, MatchRunner, MatchState, format_clock,
};
use crate::error::{KickoffError, MatchError};
use crate::observability::{Event, EventEmitter, init_metrics};
use crate::tactics::{RiskTier, TacticalResponse};

/// Plays a match to full time or until `cancel` fires.
///
/// # Errors
///
/// Returns configuration errors, I/O errors opening the event log, or
/// a metrics endpoint that cannot be bound.
pub async fn run(
    args: &RunArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), KickoffError> {
    if args.format == OutputFormat::Json && args.events_file.as_deref() == Some(Path::new("-")) {
        return Err(KickoffError::Usage(
            "--events-file - and --format json both write to stdout".to_string(),
        ));
    }
    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
    }

    let mut config = resolve_config(args)?;
    if let Some(scale) = args.time_scale {
        config.clock.time_scale = scale;
    }
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);
    let config = Arc::new(config);

    let emitter = open_emitter(args.events_file.as_deref())?;
    let runner = MatchRunner::with_seed(Arc::clone(&config), seed);
    let mut notices = runner.subscribe();

    let mut session = Session {
        runner: Arc::clone(&runner),
        emitter,
        responder: args.responder,
        rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
        commentary: !quiet || args.responder == Responder::Interactive,
        tally: Tally::default(),
    };
    let mut stdin = (args.responder == Responder::Interactive)
        .then(|| FramedRead::new(tokio::io::stdin(), LinesCodec::new()));

    info!(
        seed,
        time_scale = config.clock.time_scale,
        responder = ?args.responder,
        "starting match"
    );
    runner.start()?;

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                info!("interrupted; stopping match");
                runner.stop();
                while let Ok(notice) = notices.try_recv() {
                    session.handle(&notice);
                }
                break;
            }
            received = notices.recv() => match received {
                Ok(notice) => {
                    session.handle(&notice);
                    if matches!(notice, MatchNotice::Ended { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "commentary fell behind"),
                Err(RecvError::Closed) => break,
            },
            line = next_line(&mut stdin), if stdin.is_some() => match line {
                Some(line) => session.answer_typed(&line),
                None => {
                    debug!("stdin closed; remaining decisions will time out");
                    stdin = None;
                }
            },
        }
    }

    runner.shutdown();
    runner.finished().await;

    let summary = MatchSummary::new(seed, &runner.match_state(), &session.tally);
    match args.format {
        OutputFormat::Human => print!("{}", summary.render()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<MatchConfig, KickoffError> {
    let Some(path) = &args.config else {
        let preset = args.preset.unwrap_or_default();
        debug!(?preset, "using built-in configuration");
        return Ok(MatchConfig::preset(preset));
    };

    info!(config = %path.display(), "loading configuration");
    let loaded = ConfigLoader::with_defaults().load(path)?;
    for warning in &loaded.warnings {
        warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(MatchConfig::clone(&loaded.config))
}

fn open_emitter(path: Option<&Path>) -> Result<EventEmitter, KickoffError> {
    match path {
        None => Ok(EventEmitter::noop()),
        Some(p) if p.as_os_str() == "-" => Ok(EventEmitter::stdout()),
        Some(p) => Ok(EventEmitter::from_file(p)?),
    }
}

async fn next_line(stdin: &mut Option<FramedRead<Stdin, LinesCodec>>) -> Option<String> {
    let lines = stdin.as_mut()?;
    match lines.next().await? {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "unreadable input line");
            Some(String::new())
        }
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    raised: u32,
    resolved: u32,
    timed_out: u32,
    rejected: u32,
    end: Option<EndReason>,
}

impl Tally {
    fn record(&mut self, notice: &MatchNotice) {
        match notice {
            MatchNotice::DecisionRaised(_) => self.raised += 1,
            MatchNotice::DecisionResolved(_) => self.resolved += 1,
            MatchNotice::DecisionTimedOut(_) => self.timed_out += 1,
            MatchNotice::Ended { reason, .. } => self.end = Some(*reason),
            MatchNotice::Started { .. } | MatchNotice::PhaseChanged { .. } => {}
        }
    }
}

struct Session {
    runner: Arc<MatchRunner>,
    emitter: EventEmitter,
    responder: Responder,
    rng: StdRng,
    commentary: bool,
    tally: Tally,
}

impl Session {
    fn handle(&mut self, notice: &MatchNotice) {
        self.emitter.emit_notice(notice);
        self.tally.record(notice);
        if self.commentary {
            println!("{}", commentary(notice));
        }
        if let MatchNotice::DecisionRaised(event) = notice {
            if let Some(response) = self.pick(event) {
                self.submit(response);
            }
        }
    }

    fn pick(&mut self, event: &DecisionEvent) -> Option<TacticalResponse> {
        pick_response(self.responder, event, &mut self.rng)
    }

    fn answer_typed(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        // Either an option number or a response name
        let parsed = match line.parse::<usize>() {
            Ok(n) => self
                .runner
                .current_decision()
                .ok_or(MatchError::NoPendingDecision)
                .and_then(|event| {
                    event
                        .options
                        .get(n.wrapping_sub(1))
                        .map(|o| o.response)
                        .ok_or_else(|| MatchError::UnknownResponse {
                            input: line.to_string(),
                            suggestion: None,
                        })
                }),
            Err(_) => line.parse::<TacticalResponse>(),
        };
        match parsed {
            Ok(response) => self.submit(response),
            Err(e) => self.reject(&e),
        }
    }

    fn submit(&mut self, response: TacticalResponse) {
        if let Err(e) = self.runner.process_decision(response) {
            self.reject(&e);
        }
    }

    fn reject(&mut self, err: &MatchError) {
        self.tally.rejected += 1;
        self.emitter.emit(Event::rejected(err, chrono::Utc::now()));
        eprintln!("  ! {err}");
    }
}

const fn risk_rank(risk: RiskTier) -> u8 {
    match risk {
        RiskTier::Low => 0,
        RiskTier::Medium => 1,
        RiskTier::High => 2,
    }
}

/// Chooses an answer for `event`, or `None` when a person (or nobody) is
/// answering.
fn pick_response(
    responder: Responder,
    event: &DecisionEvent,
    rng: &mut StdRng,
) -> Option<TacticalResponse> {
    let options = &event.options;
    let chosen = match responder {
        Responder::Interactive | Responder::None => None,
        Responder::First => options.first(),
        Responder::Safest => options.iter().min_by_key(|o| risk_rank(o.risk)),
        Responder::Boldest => options.iter().max_by_key(|o| (risk_rank(o.risk), o.reward)),
        Responder::Random => options.choose(rng),
    };
    chosen.map(|o| o.response)
}

fn commentary(notice: &MatchNotice) -> String {
    match notice {
        MatchNotice::Started { .. } => "Kickoff!".to_string(),
        MatchNotice::PhaseChanged { to, .. } => match to {
            MatchPhase::Halftime => "Half time.".to_string(),
            MatchPhase::SecondHalf => "The second half is under way.".to_string(),
            other => format!("Now: {other}"),
        },
        MatchNotice::DecisionRaised(event) => {
            let mut out = format!(
                "[{} {}] {} ({}s to answer)",
                short_phase(event.phase),
                format_clock(event.time),
                event.prompt,
                event.timeout
            );
            for (i, o) in event.options.iter().enumerate() {
                out.push_str(&format!(
                    "\n  {}) {:<17} {} [{} risk, +{}]",
                    i + 1,
                    o.response.as_str(),
                    o.label,
                    o.risk,
                    o.reward
                ));
            }
            out
        }
        MatchNotice::DecisionResolved(r) => format!(
            "  -> {}: attack {:+}, defense {:+}",
            r.response.label(),
            r.delta.attack,
            r.delta.defense
        ),
        MatchNotice::DecisionTimedOut(t) => format!(
            "  -> no answer in time; momentum drops to {}/{}",
            t.attack_momentum, t.defense_momentum
        ),
        MatchNotice::Ended { reason, .. } => match reason {
            EndReason::FullTime => "Full time!".to_string(),
            EndReason::Stopped => "Match stopped.".to_string(),
        },
    }
}

const fn short_phase(phase: MatchPhase) -> &'static str {
    match phase {
        MatchPhase::FirstHalf => "1H",
        MatchPhase::SecondHalf => "2H",
        MatchPhase::Halftime => "HT",
        MatchPhase::NotStarted | MatchPhase::Ended => "--",
    }
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Serialize)]
struct MatchSummary {
    seed: u64,
    result: &'static str,
    home_score: u32,
    away_score: u32,
    attack_momentum: u8,
    defense_momentum: u8,
    possession: u8,
    shots: [u32; 2],
    corners: [u32; 2],
    fouls: [u32; 2],
    decisions_raised: u32,
    decisions_resolved: u32,
    decisions_timed_out: u32,
    rejected_inputs: u32,
}

impl MatchSummary {
    fn new(seed: u64, state: &MatchState, tally: &Tally) -> Self {
        Self {
            seed,
            result: tally.end.unwrap_or(EndReason::Stopped).as_str(),
            home_score: state.home_score,
            away_score: state.away_score,
            attack_momentum: state.attack_momentum,
            defense_momentum: state.defense_momentum,
            possession: state.possession,
            shots: [state.shots.home, state.shots.away],
            corners: [state.corners.home, state.corners.away],
            fouls: [state.fouls.home, state.fouls.away],
            decisions_raised: tally.raised,
            decisions_resolved: tally.resolved,
            decisions_timed_out: tally.timed_out,
            rejected_inputs: tally.rejected,
        }
    }

    fn render(&self) -> String {
        let possession = u32::from(self.possession);
        format!(
            "\n{:-^40}\n\
             {:<20}{:>8} - {}\n\
             {:<20}{:>8} / {}\n\
             {:<20}{:>7}% - {}%\n\
             {:<20}{:>8} - {}\n\
             {:<20}{:>8} - {}\n\
             {:<20}{:>8} - {}\n\
             {:<20}{:>8} resolved, {} timed out (of {})\n\
             {:<20}{:>8}\n",
            format!(" {} ", self.result.replace('_', " ")),
            "score",
            self.home_score,
            self.away_score,
            "momentum (att/def)",
            self.attack_momentum,
            self.defense_momentum,
            "possession",
            possession,
            100 - possession.min(100),
            "shots",
            self.shots[0],
            self.shots[1],
            "corners",
            self.corners[0],
            self.corners[1],
            "fouls",
            self.fouls[0],
            self.fouls[1],
            "decisions",
            self.decisions_resolved,
            self.decisions_timed_out,
            self.decisions_raised,
            "seed",
            self.seed,
        )
    }
}
