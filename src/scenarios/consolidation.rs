// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Consolidation Breakout Scenario
//
// 70% ranging inside a tightening +/-10% band around the starting cap, then a
// one-directional breakout on rising volume. The breakout direction is drawn
// once when the scenario starts.

use super::{spans, Allocation, ScenarioDescriptor, ScenarioGenerator, ScenarioInput, ScenarioPhase, ScenarioRun};
use crate::constraints::StageLimits;
use crate::phase::PhaseSchedule;
use crate::random::RandomSource;
use crate::synthesizer::{CandleStep, CandleSynthesizer, VolumeProfile, WickProfile};
use crate::types::ScenarioKind;

const PHASES: [ScenarioPhase; 2] = [
    ScenarioPhase::new("consolidation", 0.7, 0.0, 1.0),
    ScenarioPhase::new("breakout", 0.3, 0.004, 1.5),
];

pub const BAND_WIDTH: f64 = 0.10;

const VOLATILITY: [f64; 4] = [0.006, 0.012, 0.02, 0.03];
const CENTERING_SPEED: f64 = 0.1;
const OSCILLATION_FREQUENCY: f64 = 0.3;
const OSCILLATION_AMPLITUDE: f64 = 0.01;
/// Fraction of the band's noise removed by the end of the range.
const TIGHTENING: f64 = 0.5;
const BREAKOUT_ACCELERATION: f64 = 3.0;
const WICK_OVERSHOOT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakoutDirection {
    Up,
    Down,
}

impl BreakoutDirection {
    pub fn sign(&self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationBreakout;

impl ScenarioGenerator for ConsolidationBreakout {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ConsolidationBreakout
    }

    fn descriptor(&self) -> ScenarioDescriptor {
        ScenarioDescriptor {
            kind: self.kind(),
            phases: &PHASES,
            allocation: Allocation::Shares,
        }
    }

    fn generate(&self, input: &ScenarioInput, rng: &mut dyn RandomSource) -> ScenarioRun {
        let ceiling = input.ceiling;
        let base_vol = input.volatility.pick(VOLATILITY);
        let synth = CandleSynthesizer::new(
            StageLimits::post_bonding(ceiling, WICK_OVERSHOOT),
            WickProfile::new(0.5, 1.2),
            VolumeProfile::post_bonding(ceiling),
        );

        let direction = if rng.chance(0.5) { BreakoutDirection::Up } else { BreakoutDirection::Down };
        let counts = self.descriptor().allocate(input.num_candles, rng);
        let (range_len, breakout_len) = (counts[0], counts[1]);

        let center = input.start_cap.min(ceiling);
        let band_low = center * (1.0 - BAND_WIDTH);
        let band_high = center * (1.0 + BAND_WIDTH);

        let mut ctx = input.context();
        let mut candles = Vec::with_capacity(input.num_candles);

        let range = &PHASES[0];
        for i in 0..range_len {
            let tighten = 1.0 - TIGHTENING * PhaseSchedule::progress(i, range_len);
            let cap = ctx.current_cap;
            let r = (center - cap) / cap * CENTERING_SPEED
                + (i as f64 * OSCILLATION_FREQUENCY).sin() * OSCILLATION_AMPLITUDE * tighten
                + rng.gaussian() * base_vol * range.volatility_multiplier * tighten;
            ctx.absorb_return(r);

            let target = (cap * (1.0 + r)).clamp(band_low, band_high);
            let step = CandleStep::toward(cap, target).with_volume_boost(0.7 * tighten);
            candles.push(synth.synthesize(&mut ctx, step, rng));
        }

        let breakout = &PHASES[1];
        for i in 0..breakout_len {
            let progress = PhaseSchedule::progress(i, breakout_len);
            let drift = direction.sign() * breakout.drift * (1.0 + BREAKOUT_ACCELERATION * progress);
            let r = drift + rng.gaussian() * base_vol * breakout.volatility_multiplier;
            ctx.absorb_return(r);

            let open = ctx.current_cap;
            let mut step = CandleStep::new(r).with_volume_boost(1.5 + 2.0 * progress);
            if open * (1.0 + r) > ceiling {
                step = step.with_high_probe(ceiling * rng.uniform(1.0, 1.0 + WICK_OVERSHOOT));
            }
            candles.push(synth.synthesize(&mut ctx, step, rng));
        }

        ScenarioRun {
            candles,
            phases: spans(&[(range.name, range_len), (breakout.name, breakout_len)]),
            volume_avg: ctx.volume_avg,
        }
    }
}
