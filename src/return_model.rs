// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Return Models

//! Per-step return models.
//!
//! Each step combines a Gaussian shock with momentum and memory filters, a
//! cyclic term and a mean-reversion term. The filters live in the
//! [`GenerationContext`] and are updated with the total return after every
//! step.

use crate::context::GenerationContext;
use crate::phase::PhaseDescriptor;
use crate::random::RandomSource;
use crate::types::VolatilityLevel;

const MOMENTUM_WEIGHT: f64 = 0.2;
const MEMORY_WEIGHT: f64 = 0.05;
const CYCLE_FREQUENCY: f64 = 0.05;
const CYCLE_AMPLITUDE: f64 = 0.2;

/// Pre-bonding zone target as a fraction of the bonding cap.
pub const ZONE_TARGET_FRACTION: f64 = 0.4;
/// Above `expected * 1.5` the price counts as broken out for that step.
pub const BREAKOUT_MULTIPLE: f64 = 1.5;
const ZONE_REVERSION_SPEED: f64 = 0.008;

const ORGANIC_VOLATILITY: [f64; 4] = [0.01, 0.02, 0.035, 0.05];
const ORGANIC_REVERSION_SPEED: f64 = 0.05;
const ORGANIC_CYCLE_AMPLITUDE: f64 = 0.1;

/// Individual terms of one step's return.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReturnComponents {
    pub drift: f64,
    pub shock: f64,
    pub momentum: f64,
    pub memory: f64,
    pub cycle: f64,
    pub reversion: f64,
}

impl ReturnComponents {
    pub fn total(&self) -> f64 {
        self.drift + self.shock + self.momentum + self.memory + self.cycle + self.reversion
    }
}

// ─── Pre-Bonding ────────────────────────────────────────────────────────────

/// Random walk with momentum, memory, a cycle and zone-aware mean reversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreBondingModel {
    pub initial_cap: f64,
    pub zone_target: f64,
    pub volatility: VolatilityLevel,
}

impl PreBondingModel {
    pub fn new(initial_cap: f64, bonding_cap: f64, volatility: VolatilityLevel) -> Self {
        Self {
            initial_cap,
            zone_target: bonding_cap * ZONE_TARGET_FRACTION,
            volatility,
        }
    }

    /// Linear path from the initial cap to the zone target.
    pub fn expected_cap(&self, progress: f64) -> f64 {
        self.initial_cap + (self.zone_target - self.initial_cap) * progress
    }

    /// Pull toward the expected cap, or nothing if the price is above the
    /// breakout threshold on this step. Not latched: a price that falls back
    /// under the threshold is pulled again on the next step.
    pub fn reversion(&self, progress: f64, current_cap: f64) -> f64 {
        let expected = self.expected_cap(progress);
        if current_cap > expected * BREAKOUT_MULTIPLE {
            return 0.0;
        }
        (expected - current_cap) / current_cap.abs() * ZONE_REVERSION_SPEED
    }

    pub fn components(
        &self,
        progress: f64,
        phase: &PhaseDescriptor,
        ctx: &GenerationContext,
        rng: &mut dyn RandomSource,
    ) -> ReturnComponents {
        let base_vol = self.volatility.pre_bonding() * phase.volatility_multiplier;
        ReturnComponents {
            drift: phase.drift_bias,
            shock: rng.gaussian() * base_vol,
            momentum: ctx.momentum * MOMENTUM_WEIGHT,
            memory: ctx.memory * MEMORY_WEIGHT,
            cycle: (ctx.step as f64 * CYCLE_FREQUENCY).sin() * base_vol * CYCLE_AMPLITUDE,
            reversion: self.reversion(progress, ctx.current_cap),
        }
    }

    /// Draw the step's total return and fold it into the context filters.
    pub fn next_return(
        &self,
        progress: f64,
        phase: &PhaseDescriptor,
        ctx: &mut GenerationContext,
        rng: &mut dyn RandomSource,
    ) -> f64 {
        let total = self.components(progress, phase, ctx, rng).total();
        ctx.absorb_return(total);
        total
    }
}

// ─── Post-Bonding Organic ───────────────────────────────────────────────────

/// Reversion toward the bonding ceiling plus a small upward drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrganicModel {
    pub ceiling: f64,
    pub base_vol: f64,
    pub drift: f64,
}

impl OrganicModel {
    /// `drift` and `volatility_multiplier` come from the scenario phase.
    pub fn new(ceiling: f64, volatility: VolatilityLevel, drift: f64, volatility_multiplier: f64) -> Self {
        Self {
            ceiling,
            base_vol: volatility.pick(ORGANIC_VOLATILITY) * volatility_multiplier,
            drift,
        }
    }

    pub fn components(&self, ctx: &GenerationContext, rng: &mut dyn RandomSource) -> ReturnComponents {
        ReturnComponents {
            drift: self.drift,
            shock: rng.gaussian() * self.base_vol,
            momentum: ctx.momentum * MOMENTUM_WEIGHT,
            memory: ctx.memory * MEMORY_WEIGHT,
            cycle: (ctx.step as f64 * CYCLE_FREQUENCY).sin() * self.base_vol * ORGANIC_CYCLE_AMPLITUDE,
            reversion: (self.ceiling - ctx.current_cap) / ctx.current_cap.abs() * ORGANIC_REVERSION_SPEED,
        }
    }

    pub fn next_return(&self, ctx: &mut GenerationContext, rng: &mut dyn RandomSource) -> f64 {
        let total = self.components(ctx, rng).total();
        ctx.absorb_return(total);
        total
    }
}
