// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Pump and Dump Scenario
//
// accumulation -> pump -> distribution -> dump. The pump slows once within 5%
// of the ceiling, and any candle that would close through the ceiling is
// rejected back under it with a wick probing above.

use super::{spans, Allocation, ScenarioDescriptor, ScenarioGenerator, ScenarioInput, ScenarioPhase, ScenarioRun};
use crate::constraints::StageLimits;
use crate::random::RandomSource;
use crate::synthesizer::{CandleStep, CandleSynthesizer, VolumeProfile, WickProfile};
use crate::types::ScenarioKind;

const PHASES: [ScenarioPhase; 4] = [
    ScenarioPhase::new("accumulation", 0.25, 0.002, 0.6),
    ScenarioPhase::new("pump", 0.25, 0.02, 1.2),
    ScenarioPhase::new("distribution", 0.15, -0.002, 0.8),
    ScenarioPhase::new("dump", 0.35, -0.015, 1.3),
];

const VOLATILITY: [f64; 4] = [0.015, 0.03, 0.045, 0.065];
const VOLUME_BOOST: [f64; 4] = [1.0, 2.0, 1.2, 1.5];

const MOMENTUM_WEIGHT: f64 = 0.1;
const DECELERATION_ZONE: f64 = 0.95;
const DECELERATION_FACTOR: f64 = 0.2;
const WICK_OVERSHOOT: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default)]
pub struct PumpDump;

impl ScenarioGenerator for PumpDump {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::PumpDump
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
            WickProfile::new(0.5, 1.3),
            VolumeProfile::post_bonding(ceiling),
        );

        let counts = self.descriptor().allocate(input.num_candles, rng);
        let mut ctx = input.context();
        let mut candles = Vec::with_capacity(input.num_candles);

        for (idx, (phase, &count)) in PHASES.iter().zip(&counts).enumerate() {
            let is_pump = idx == 1;
            for _ in 0..count {
                let mut drift = phase.drift;
                if is_pump && ctx.current_cap >= ceiling * DECELERATION_ZONE {
                    drift *= DECELERATION_FACTOR;
                }
                let r = drift
                    + rng.gaussian() * base_vol * phase.volatility_multiplier
                    + ctx.momentum * MOMENTUM_WEIGHT;
                ctx.absorb_return(r);

                let open = ctx.current_cap;
                let step = if open * (1.0 + r) > ceiling {
                    // rejected at the ceiling: small pullback, wick above
                    let target = (ceiling * rng.uniform(0.995, 1.005)).min(ceiling);
                    let probe = ceiling * rng.uniform(1.0, 1.0 + WICK_OVERSHOOT);
                    CandleStep::toward(open, target).with_high_probe(probe)
                } else {
                    CandleStep::new(r)
                };
                candles.push(synth.synthesize(&mut ctx, step.with_volume_boost(VOLUME_BOOST[idx]), rng));
            }
        }

        let named: Vec<(&'static str, usize)> =
            PHASES.iter().map(|p| p.name).zip(counts.iter().copied()).collect();
        ScenarioRun {
            candles,
            phases: spans(&named),
            volume_avg: ctx.volume_avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::types::VolatilityLevel;

    fn input(start_cap: f64, volatility: VolatilityLevel) -> ScenarioInput {
        ScenarioInput {
            start_cap,
            ceiling: 100_000.0,
            num_candles: 1000,
            volatility,
            volume_avg: 5_000.0,
        }
    }

    #[test]
    fn phases_cover_every_candle() {
        let run = PumpDump.generate(&input(100_000.0, VolatilityLevel::Medium), &mut SeededRandom::new(31));
        assert_eq!(run.candles.len(), 1000);
        let names: Vec<&str> = run.phases.iter().map(|p| p.name).collect();
        assert_eq!(names, ["accumulation", "pump", "distribution", "dump"]);
        assert_eq!(run.phases.iter().map(|p| p.len).sum::<usize>(), 1000);
    }

    #[test]
    fn ceiling_rejections_stay_within_allowance() {
        for seed in 0..10 {
            let run = PumpDump.generate(&input(90_000.0, VolatilityLevel::Extreme), &mut SeededRandom::new(seed));
            for c in &run.candles {
                assert!(c.close <= 100_000.0);
                assert!(c.high <= 100_000.0 * 1.01 + 1e-6);
            }
        }
    }

    #[test]
    fn dump_ends_well_below_peak() {
        let run = PumpDump.generate(&input(100_000.0, VolatilityLevel::Low), &mut SeededRandom::new(32));
        let last = run.candles.last().unwrap().close;
        assert!(last < 50_000.0, "final close {last}");
    }
}
