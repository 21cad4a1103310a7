//! Configuration validation
//!
//! Semantic checks on a deserialized [`MatchConfig`]. Validation collects
//! ALL issues instead of stopping at the first one so a user can fix a
//! config file in one pass.

use crate::config::schema::{ClockConfig, DecisionConfig, MAX_TIME_SCALE, MatchConfig, TuningConfig};
use crate::error::{Severity, ValidationIssue};

/// Largest allowed deviation of the attack share from 0.5.
const MAX_ATTACK_RATIO_SPREAD: f64 = 0.5;

/// Largest allowed risk multiplier.
const MAX_RISK_MULTIPLIER: f64 = 10.0;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &MatchConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_clock(&config.clock);
        self.validate_decisions(&config.decisions, &config.clock);
        self.validate_tuning(&config.tuning);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_clock(&mut self, clock: &ClockConfig) {
        for (path, value) in [
            ("clock.first_half", clock.first_half),
            ("clock.second_half", clock.second_half),
        ] {
            if value.as_secs() == 0 {
                self.error(path, "must be at least one second");
            }
        }

        if clock.time_scale == 0 {
            self.error("clock.time_scale", "must be greater than zero");
        } else if clock.time_scale > MAX_TIME_SCALE {
            self.error(
                "clock.time_scale",
                &format!("must be at most {MAX_TIME_SCALE}, got {}", clock.time_scale),
            );
        }
    }

    fn validate_decisions(&mut self, decisions: &DecisionConfig, clock: &ClockConfig) {
        let window = decisions.window.as_secs();
        if window == 0 {
            self.error("decisions.window", "must be at least one second");
        }

        let p = decisions.trigger_probability;
        if !(0.0..=1.0).contains(&p) {
            self.error(
                "decisions.trigger_probability",
                &format!("must be between 0 and 1, got {p}"),
            );
        }

        if decisions.event_pool.is_empty() {
            self.error("decisions.event_pool", "must name at least one event");
        }

        let shortest_half = clock.first_half.min(clock.second_half).as_secs();
        let margin = decisions.event_margin.as_secs();
        if shortest_half > 0 && margin.saturating_mul(2) >= shortest_half {
            self.warning(
                "decisions.event_margin",
                &format!(
                    "{margin}s margin leaves no event window in a {shortest_half}s half; \
                     events will only be raised explicitly"
                ),
            );
        }

        if shortest_half > 0 && window > shortest_half {
            self.warning(
                "decisions.window",
                &format!("{window}s window is longer than a {shortest_half}s half"),
            );
        }
    }

    fn validate_tuning(&mut self, tuning: &TuningConfig) {
        let m = &tuning.risk_multipliers;
        for (path, value) in [
            ("tuning.risk_multipliers.low", m.low),
            ("tuning.risk_multipliers.medium", m.medium),
            ("tuning.risk_multipliers.high", m.high),
        ] {
            if !value.is_finite() || value <= 0.0 {
                self.error(path, &format!("must be a positive number, got {value}"));
            } else if value > MAX_RISK_MULTIPLIER {
                self.error(
                    path,
                    &format!("must be at most {MAX_RISK_MULTIPLIER}, got {value}"),
                );
            }
        }

        let range = tuning.random_factor;
        if !range.min.is_finite() || !range.max.is_finite() || range.min < 0.0 {
            self.error(
                "tuning.random_factor",
                "bounds must be finite and non-negative",
            );
        } else if range.min > range.max {
            self.error(
                "tuning.random_factor",
                &format!("min {} is greater than max {}", range.min, range.max),
            );
        }

        let spread = tuning.attack_ratio_spread;
        if !(0.0..=MAX_ATTACK_RATIO_SPREAD).contains(&spread) {
            self.error(
                "tuning.attack_ratio_spread",
                &format!("must be between 0 and {MAX_ATTACK_RATIO_SPREAD}, got {spread}"),
            );
        }

        if tuning.timeout_penalty > 100 {
            self.warning(
                "tuning.timeout_penalty",
                "exceeds the momentum scale; a timeout will always empty both gauges",
            );
        }
    }

    fn error(&mut self, path: &str, message: &str) {
        self.errors.push(issue(path, message, Severity::Error));
    }

    fn warning(&mut self, path: &str, message: &str) {
        self.warnings.push(issue(path, message, Severity::Warning));
    }
}

fn issue(path: &str, message: &str, severity: Severity) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: message.to_string(),
        severity,
    }
}

// ============================================================================
// Tests
// ============================================================================
