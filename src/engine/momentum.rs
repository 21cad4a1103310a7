//! Momentum and statistic arithmetic
//!
//! Folds a chosen [`DecisionOption`] into the match gauges:
//!
//! ```text
//! total   = round(reward * risk_multiplier * U(min, max))
//! ratio   = 0.5 + U(-spread, spread)
//! attack  = round(total * ratio)
//! defense = round(total * (1 - ratio))
//! ```
//!
//! `total` is capped at the full gauge range before the split.

use rand::Rng;

use crate::config::schema::TuningConfig;
use crate::tactics::TacticalResponse;

use super::decision::DecisionOption;
use super::state::{MatchState, MatchStatePatch, clamp_gauge};

/// Largest move a single decision can make on a gauge.
const GAUGE_RANGE: f64 = 100.0;

/// Signed change to the two momentum gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MomentumDelta {
    pub attack: i32,
    pub defense: i32,
}

impl MomentumDelta {
    /// Both gauges lose `penalty`.
    #[must_use]
    pub fn penalty(penalty: u8) -> Self {
        let p = -i32::from(penalty);
        Self {
            attack: p,
            defense: p,
        }
    }

    /// Applies the delta to `state`'s gauges, clamped to `0..=100`.
    #[must_use]
    pub fn applied_to(self, state: &MatchState) -> (u8, u8) {
        (
            clamp_gauge(i32::from(state.attack_momentum).saturating_add(self.attack)),
            clamp_gauge(i32::from(state.defense_momentum).saturating_add(self.defense)),
        )
    }
}

/// Computes the momentum change for a chosen option.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn momentum_delta<R: Rng + ?Sized>(
    option: &DecisionOption,
    tuning: &TuningConfig,
    rng: &mut R,
) -> MomentumDelta {
    let base = f64::from(option.reward) * tuning.risk_multipliers.for_tier(option.risk);
    let factor = rng.random_range(tuning.random_factor.min..=tuning.random_factor.max);
    let total = (base * factor).round().clamp(0.0, GAUGE_RANGE);

    let spread = tuning.attack_ratio_spread;
    let ratio = 0.5 + rng.random_range(-spread..=spread);

    MomentumDelta {
        attack: (total * ratio).round() as i32,
        defense: (total * (1.0 - ratio)).round() as i32,
    }
}

/// Statistic change that accompanies a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatEffect {
    /// Pressing high concedes fouls
    HomeFoul,
    /// Countering produces a shot
    HomeShot,
    /// A quick restart wins a corner
    HomeCorner,
    /// Possession swings by the given points
    Possession(i32),
    /// No counter changes
    Unchanged,
}

impl StatEffect {
    /// Picks the effect for `response`, rolling the possession swing when
    /// the response has no dedicated counter.
    #[must_use]
    pub fn roll<R: Rng + ?Sized>(
        response: TacticalResponse,
        tuning: &TuningConfig,
        rng: &mut R,
    ) -> Self {
        match response {
            TacticalResponse::HighPress => Self::HomeFoul,
            TacticalResponse::CounterAttack => Self::HomeShot,
            TacticalResponse::QuickFreeKick => Self::HomeCorner,
            TacticalResponse::Substitute => Self::Unchanged,
            _ => {
                let nudge = i32::from(tuning.possession_nudge);
                Self::Possession(rng.random_range(-nudge..=nudge))
            }
        }
    }

    /// Partial update writing this effect on top of `state`.
    #[must_use]
    pub fn patch(self, state: &MatchState) -> MatchStatePatch {
        let mut patch = MatchStatePatch::default();
        match self {
            Self::HomeFoul => patch.fouls = Some(state.fouls.bump_home()),
            Self::HomeShot => patch.shots = Some(state.shots.bump_home()),
            Self::HomeCorner => patch.corners = Some(state.corners.bump_home()),
            Self::Possession(swing) => {
                patch.possession = Some(clamp_gauge(i32::from(state.possession) + swing));
            }
            Self::Unchanged => {}
        }
        patch
    }
}
