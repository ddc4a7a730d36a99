// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Constraint Enforcement
//
// Clamps candidate closes and wicks to stage limits and to the universal OHLC
// invariants. Nothing here fails: every out-of-range value is pulled back in.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Pre-bonding ceiling as a multiple of the bonding cap. Unreachable in practice.
pub const PRE_BONDING_CEILING_MULTIPLE: f64 = 1000.0;

/// Widest wick overshoot above the post-bonding ceiling.
pub const MAX_WICK_OVERSHOOT: f64 = 0.01;

/// Post-bonding price floor as a fraction of the ceiling.
pub const POST_BONDING_FLOOR_FRACTION: f64 = 1e-4;

/// Minimum intraday swing as a fraction of the current cap (pre-bonding).
const SWING_CAP_FRACTION: f64 = 0.05;
const SWING_BODY_MULTIPLE: f64 = 1.5;

// ---------------------------------------------------------------------------
// StageLimits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageLimits {
    /// Closes and lows never go below this.
    pub floor: f64,
    /// Closes never go above this.
    pub ceiling: f64,
    /// Highs never go above this.
    pub wick_ceiling: f64,
    /// Bound high/low to `max(1.5 * body, 5% of cap)` around the open.
    pub swing_clamp: bool,
}

impl StageLimits {
    pub fn pre_bonding(initial_cap: f64, bonding_cap: f64) -> Self {
        let ceiling = bonding_cap * PRE_BONDING_CEILING_MULTIPLE;
        Self {
            floor: initial_cap,
            ceiling,
            wick_ceiling: ceiling,
            swing_clamp: true,
        }
    }

    /// Hard close ceiling with a wick allowance of at most 1% above it.
    pub fn post_bonding(ceiling: f64, wick_overshoot: f64) -> Self {
        let overshoot = wick_overshoot.clamp(0.0, MAX_WICK_OVERSHOOT);
        Self {
            floor: ceiling * POST_BONDING_FLOOR_FRACTION,
            ceiling,
            wick_ceiling: ceiling * (1.0 + overshoot),
            swing_clamp: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ConstraintEnforcer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintEnforcer {
    pub limits: StageLimits,
}

impl ConstraintEnforcer {
    pub fn new(limits: StageLimits) -> Self {
        Self { limits }
    }

    pub fn clamp_close(&self, candidate: f64) -> f64 {
        if !candidate.is_finite() {
            return if candidate == f64::INFINITY {
                self.limits.ceiling
            } else {
                self.limits.floor
            };
        }
        candidate.clamp(self.limits.floor, self.limits.ceiling)
    }

    /// Bound raw wick extremes. `cap` is the cap the candle opened at.
    /// Returns `(high, low)` satisfying the OHLC invariants for `open`/`close`.
    pub fn clamp_wicks(&self, open: f64, close: f64, cap: f64, high: f64, low: f64) -> (f64, f64) {
        let mut high = high;
        let mut low = low;

        if self.limits.swing_clamp {
            let body = (close - open).abs();
            let max_swing = (SWING_BODY_MULTIPLE * body).max(SWING_CAP_FRACTION * cap);
            high = high.min(open + max_swing);
            low = low.max(open - max_swing);
        }

        high = high.min(self.limits.wick_ceiling);
        low = low.max(self.limits.floor);

        // Universal invariants last so nothing above can break them.
        let high = high.max(open).max(close);
        let low = low.min(open).min(close).max(0.0);
        (high, low)
    }
}
