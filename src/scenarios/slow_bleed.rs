// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Slow Bleed Scenario
//
// Steady decline toward 10-20% of the starting cap. The per-step decline grows
// linearly with progress, occasional single-candle relief rallies interrupt
// it, and volume dries up as the chart bleeds out.

use super::{spans, Allocation, ScenarioDescriptor, ScenarioGenerator, ScenarioInput, ScenarioPhase, ScenarioRun};
use crate::constraints::StageLimits;
use crate::phase::PhaseSchedule;
use crate::random::RandomSource;
use crate::synthesizer::{CandleStep, CandleSynthesizer, VolumeProfile, WickProfile};
use crate::types::ScenarioKind;

const PHASES: [ScenarioPhase; 1] = [ScenarioPhase::new("bleed", 1.0, 0.0, 1.0)];

const VOLATILITY: [f64; 4] = [0.005, 0.01, 0.018, 0.025];
const TARGET_RANGE: (f64, f64) = (0.10, 0.20);
const ACCELERATION: f64 = 2.0;

const RELIEF_CHANCE: f64 = 0.08;
const RELIEF_RANGE: (f64, f64) = (0.01, 0.04);
const RELIEF_VOLUME_BOOST: f64 = 1.8;
/// Volume at the end of the bleed relative to its start.
const VOLUME_FADE: f64 = 0.7;
const WICK_OVERSHOOT: f64 = 0.005;

#[derive(Debug, Clone, Copy, Default)]
pub struct SlowBleed;

impl SlowBleed {
    /// Base per-step log decline so that the accelerating schedule, net of the
    /// expected relief rallies, lands on `target_ratio` after `num_candles`.
    pub fn base_decline(target_ratio: f64, num_candles: usize) -> f64 {
        if num_candles == 0 {
            return 0.0;
        }
        let weight: f64 = (0..num_candles)
            .map(|i| 1.0 + ACCELERATION * PhaseSchedule::progress(i, num_candles))
            .sum();
        let expected_relief = RELIEF_CHANCE * (RELIEF_RANGE.0 + RELIEF_RANGE.1) / 2.0;
        (-target_ratio.ln() + expected_relief * num_candles as f64) / weight
    }
}

impl ScenarioGenerator for SlowBleed {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::SlowBleed
    }

    fn descriptor(&self) -> ScenarioDescriptor {
        ScenarioDescriptor {
            kind: self.kind(),
            phases: &PHASES,
            allocation: Allocation::Shares,
        }
    }

    fn generate(&self, input: &ScenarioInput, rng: &mut dyn RandomSource) -> ScenarioRun {
        let n = input.num_candles;
        let [bleed] = PHASES;
        let base_vol = input.volatility.pick(VOLATILITY);
        let synth = CandleSynthesizer::new(
            StageLimits::post_bonding(input.ceiling, WICK_OVERSHOOT),
            WickProfile::new(0.5, 1.1),
            VolumeProfile::post_bonding(input.ceiling),
        );

        let target_ratio = rng.uniform(TARGET_RANGE.0, TARGET_RANGE.1);
        let base = Self::base_decline(target_ratio, n);

        let mut ctx = input.context();
        let mut candles = Vec::with_capacity(n);
        for i in 0..n {
            let progress = PhaseSchedule::progress(i, n);
            let mut log_return = bleed.drift - base * (1.0 + ACCELERATION * progress)
                + rng.gaussian() * base_vol * bleed.volatility_multiplier;
            let mut boost = 1.0 - VOLUME_FADE * progress;
            if rng.chance(RELIEF_CHANCE) {
                log_return += rng.uniform(RELIEF_RANGE.0, RELIEF_RANGE.1);
                boost *= RELIEF_VOLUME_BOOST;
            }
            let r = log_return.exp() - 1.0;
            ctx.absorb_return(r);
            candles.push(synth.synthesize(&mut ctx, CandleStep::new(r).with_volume_boost(boost), rng));
        }

        ScenarioRun {
            candles,
            phases: spans(&[(PHASES[0].name, n)]),
            volume_avg: ctx.volume_avg,
        }
    }
}
