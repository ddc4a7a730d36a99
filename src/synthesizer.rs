// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Candle Synthesis

//! Turns `(open, total_return)` into a full OHLCV record.
//!
//! The open is always the context's current cap, so consecutive candles from
//! one context are continuous by construction. Stage limits and the OHLC
//! invariants are applied through the [`ConstraintEnforcer`].

use crate::constraints::{ConstraintEnforcer, StageLimits};
use crate::context::GenerationContext;
use crate::random::RandomSource;
use crate::types::Candle;

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Wick length as a multiple of the body, drawn uniformly from `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WickProfile {
    pub min: f64,
    pub max: f64,
}

impl WickProfile {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProfile {
    /// Volume gain per unit of absolute return.
    pub sensitivity: f64,
    /// Gaussian noise as a fraction of the volume.
    pub noise: f64,
    /// Absolute volume floor.
    pub floor: f64,
    /// Decay of the running volume average.
    pub decay: f64,
}

impl VolumeProfile {
    pub fn pre_bonding(initial_cap: f64) -> Self {
        Self { sensitivity: 10.0, noise: 0.3, floor: initial_cap * 1e-3, decay: 0.98 }
    }

    pub fn organic(ceiling: f64) -> Self {
        Self { sensitivity: 8.0, noise: 0.25, floor: ceiling * 1e-4, decay: 0.99 }
    }

    /// Default for scenario segments that do not tune their own volume.
    pub fn post_bonding(ceiling: f64) -> Self {
        Self { sensitivity: 8.0, noise: 0.3, floor: ceiling * 1e-5, decay: 0.98 }
    }
}

// ---------------------------------------------------------------------------
// CandleStep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeShape {
    /// `avg * (1 + |r| * k) * (1 + noise) * boost`
    Reactive { boost: f64 },
    /// `avg * multiple`, no noise and no return sensitivity.
    Baseline { multiple: f64 },
}

/// What a return model hands the synthesizer for one candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleStep {
    pub total_return: f64,
    pub volume: VolumeShape,
    /// Wick probe above the close, e.g. a rejected breakout attempt.
    pub high_probe: Option<f64>,
}

impl CandleStep {
    pub fn new(total_return: f64) -> Self {
        Self {
            total_return,
            volume: VolumeShape::Reactive { boost: 1.0 },
            high_probe: None,
        }
    }

    /// Step whose close lands on `target` from `open`.
    pub fn toward(open: f64, target: f64) -> Self {
        Self::new(target / open - 1.0)
    }

    pub fn with_volume_boost(mut self, boost: f64) -> Self {
        self.volume = VolumeShape::Reactive { boost };
        self
    }

    pub fn with_baseline_volume(mut self, multiple: f64) -> Self {
        self.volume = VolumeShape::Baseline { multiple };
        self
    }

    pub fn with_high_probe(mut self, level: f64) -> Self {
        self.high_probe = Some(level);
        self
    }
}

// ---------------------------------------------------------------------------
// CandleSynthesizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleSynthesizer {
    pub enforcer: ConstraintEnforcer,
    pub wicks: WickProfile,
    pub volume: VolumeProfile,
}

impl CandleSynthesizer {
    pub fn new(limits: StageLimits, wicks: WickProfile, volume: VolumeProfile) -> Self {
        Self {
            enforcer: ConstraintEnforcer::new(limits),
            wicks,
            volume,
        }
    }

    pub fn with_wicks(mut self, wicks: WickProfile) -> Self {
        self.wicks = wicks;
        self
    }

    pub fn limits(&self) -> &StageLimits {
        &self.enforcer.limits
    }

    /// Emit one candle and advance the context past it.
    pub fn synthesize(
        &self,
        ctx: &mut GenerationContext,
        step: CandleStep,
        rng: &mut dyn RandomSource,
    ) -> Candle {
        let open = ctx.current_cap;
        let close = self.enforcer.clamp_close(open * (1.0 + step.total_return));

        let body = (close - open).abs();
        let mut raw_high = open.max(close) + body * rng.uniform(self.wicks.min, self.wicks.max);
        let raw_low = open.min(close) - body * rng.uniform(self.wicks.min, self.wicks.max);
        if let Some(probe) = step.high_probe {
            raw_high = raw_high.max(probe);
        }
        let (high, low) = self.enforcer.clamp_wicks(open, close, open, raw_high, raw_low);

        let volume = self.volume_for(ctx.volume_avg, &step, rng);
        ctx.absorb_volume(volume, self.volume.decay);
        ctx.current_cap = close;
        ctx.step += 1;

        Candle::new(open, high, low, close, volume)
    }

    fn volume_for(&self, avg: f64, step: &CandleStep, rng: &mut dyn RandomSource) -> f64 {
        let raw = match step.volume {
            VolumeShape::Reactive { boost } => {
                let reaction = 1.0 + step.total_return.abs() * self.volume.sensitivity;
                let noise = 1.0 + rng.gaussian() * self.volume.noise;
                avg * reaction * noise * boost
            }
            VolumeShape::Baseline { multiple } => avg * multiple,
        };
        if raw.is_finite() {
            raw.max(self.volume.floor)
        } else {
            self.volume.floor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    fn post_synth(ceiling: f64) -> CandleSynthesizer {
        CandleSynthesizer::new(
            StageLimits::post_bonding(ceiling, 0.005),
            WickProfile::new(0.5, 1.3),
            VolumeProfile::post_bonding(ceiling),
        )
    }

    #[test]
    fn open_follows_previous_close() {
        let synth = post_synth(1_000.0);
        let mut ctx = GenerationContext::new(900.0);
        let mut rng = SeededRandom::new(1);
        let a = synth.synthesize(&mut ctx, CandleStep::new(0.02), &mut rng);
        let b = synth.synthesize(&mut ctx, CandleStep::new(-0.05), &mut rng);
        assert_eq!(a.open, 900.0);
        assert_eq!(b.open, a.close);
        assert_eq!(ctx.current_cap, b.close);
        assert_eq!(ctx.step, 2);
    }

    #[test]
    fn close_never_exceeds_post_ceiling() {
        let synth = post_synth(1_000.0);
        let mut ctx = GenerationContext::new(990.0);
        let mut rng = SeededRandom::new(2);
        for _ in 0..200 {
            let c = synth.synthesize(&mut ctx, CandleStep::new(0.5), &mut rng);
            assert!(c.close <= 1_000.0);
            assert!(c.high <= 1_000.0 * 1.005 + 1e-9);
            assert!(c.check().is_ok());
        }
    }

    #[test]
    fn high_probe_leaves_rejection_wick() {
        let synth = post_synth(1_000.0);
        let mut ctx = GenerationContext::new(995.0);
        let mut rng = SeededRandom::new(3);
        let c = synth.synthesize(&mut ctx, CandleStep::new(0.0).with_high_probe(1_004.0), &mut rng);
        assert_eq!(c.close, 995.0);
        assert!(c.high >= 1_004.0);
    }

    #[test]
    fn crash_return_floors_close() {
        let synth = post_synth(1_000.0);
        let mut ctx = GenerationContext::new(500.0);
        let mut rng = SeededRandom::new(4);
        let c = synth.synthesize(&mut ctx, CandleStep::new(-3.0), &mut rng);
        assert!(c.close > 0.0);
        assert!(c.low >= 0.0);
    }

    #[test]
    fn baseline_volume_tracks_average() {
        let synth = post_synth(1_000.0);
        let mut ctx = GenerationContext::new(500.0);
        ctx.volume_avg = 40.0;
        let mut rng = SeededRandom::new(5);
        let c = synth.synthesize(&mut ctx, CandleStep::new(0.0).with_baseline_volume(7.5), &mut rng);
        assert_eq!(c.volume, 300.0);
        assert!((ctx.volume_avg - (40.0 * 0.98 + 300.0 * 0.02)).abs() < 1e-9);
    }

    #[test]
    fn volume_never_below_floor() {
        let synth = post_synth(1_000.0);
        let mut ctx = GenerationContext::new(500.0);
        ctx.volume_avg = 1e-9;
        let mut rng = SeededRandom::new(6);
        for _ in 0..50 {
            let c = synth.synthesize(&mut ctx, CandleStep::new(0.01), &mut rng);
            assert!(c.volume >= synth.volume.floor);
        }
    }

    #[test]
    fn toward_lands_on_target() {
        let step = CandleStep::toward(800.0, 100.0);
        assert!((800.0 * (1.0 + step.total_return) - 100.0).abs() < 1e-9);
    }
}
