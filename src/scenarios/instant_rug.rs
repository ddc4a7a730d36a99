// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Instant Rug Scenario
//
// A short mild climb, one candle losing 85-95% on a volume spike, then a
// flat dead chart on minimal volume.

use super::{spans, Allocation, ScenarioDescriptor, ScenarioGenerator, ScenarioInput, ScenarioPhase, ScenarioRun};
use crate::constraints::StageLimits;
use crate::random::RandomSource;
use crate::synthesizer::{CandleStep, CandleSynthesizer, VolumeProfile, WickProfile};
use crate::types::ScenarioKind;

// Counts come from the drawn rug index, not from shares. The rug drift is
// the mean one-candle drop.
const PHASES: [ScenarioPhase; 3] = [
    ScenarioPhase::new("pre_rug", 0.0, 0.003, 1.0),
    ScenarioPhase::new("rug", 0.0, -0.9, 0.0),
    ScenarioPhase::new("dead", 1.0, 0.0, 1.0),
];

/// Rug index drawn from `[RUG_INDEX_MIN, RUG_INDEX_MAX]`.
pub const RUG_INDEX_MIN: usize = 10;
pub const RUG_INDEX_MAX: usize = 29;

const VOLATILITY: [f64; 4] = [0.01, 0.02, 0.03, 0.04];
const PRE_RUG_RETURN_LIMIT: f64 = 0.2;
const DROP_SPREAD: f64 = 0.05;
const SPIKE_RANGE: (f64, f64) = (5.0, 10.0);

const DEAD_NOISE: f64 = 0.001;
const DEAD_RETURN_LIMIT: f64 = 0.005;
const DEAD_VOLUME_RANGE: (f64, f64) = (0.01, 0.05);
const WICK_OVERSHOOT: f64 = 0.005;

#[derive(Debug, Clone, Copy, Default)]
pub struct InstantRug;

impl InstantRug {
    /// Candle counts for `[pre_rug, rug, dead]`.
    pub fn plan(rug_index: usize, num_candles: usize) -> [usize; 3] {
        if num_candles == 0 {
            return [0, 0, 0];
        }
        let pre = rug_index.min(num_candles - 1);
        [pre, 1, num_candles - pre - 1]
    }
}

impl ScenarioGenerator for InstantRug {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::InstantRug
    }

    fn descriptor(&self) -> ScenarioDescriptor {
        ScenarioDescriptor {
            kind: self.kind(),
            phases: &PHASES,
            allocation: Allocation::RugIndex { min: RUG_INDEX_MIN, max: RUG_INDEX_MAX },
        }
    }

    fn generate(&self, input: &ScenarioInput, rng: &mut dyn RandomSource) -> ScenarioRun {
        let counts = self.descriptor().allocate(input.num_candles, rng);
        let (pre, rug, dead) = (counts[0], counts[1], counts[2]);
        let [pre_rug_phase, rug_phase, dead_phase] = PHASES;
        let base_vol = input.volatility.pick(VOLATILITY);
        let synth = CandleSynthesizer::new(
            StageLimits::post_bonding(input.ceiling, WICK_OVERSHOOT),
            WickProfile::new(0.4, 1.0),
            VolumeProfile::post_bonding(input.ceiling),
        );
        let rug_synth = synth.with_wicks(WickProfile::new(0.02, 0.1));
        let dead_synth = synth.with_wicks(WickProfile::new(0.2, 0.8));

        let mut ctx = input.context();
        let mut candles = Vec::with_capacity(input.num_candles);

        for _ in 0..pre {
            let r = (pre_rug_phase.drift + rng.gaussian() * base_vol * pre_rug_phase.volatility_multiplier)
                .clamp(-PRE_RUG_RETURN_LIMIT, PRE_RUG_RETURN_LIMIT);
            ctx.absorb_return(r);
            candles.push(synth.synthesize(&mut ctx, CandleStep::new(r), rng));
        }

        for _ in 0..rug {
            let drop = -rug_phase.drift + rng.uniform(-DROP_SPREAD, DROP_SPREAD);
            let spike = rng.uniform(SPIKE_RANGE.0, SPIKE_RANGE.1);
            let step = CandleStep::new(-drop).with_baseline_volume(spike);
            ctx.absorb_return(-drop);
            candles.push(rug_synth.synthesize(&mut ctx, step, rng));
        }

        for _ in 0..dead {
            let r = (dead_phase.drift + rng.gaussian() * DEAD_NOISE * dead_phase.volatility_multiplier)
                .clamp(-DEAD_RETURN_LIMIT, DEAD_RETURN_LIMIT);
            let multiple = rng.uniform(DEAD_VOLUME_RANGE.0, DEAD_VOLUME_RANGE.1);
            candles.push(dead_synth.synthesize(&mut ctx, CandleStep::new(r).with_baseline_volume(multiple), rng));
        }

        ScenarioRun {
            candles,
            phases: spans(&[
                (pre_rug_phase.name, pre),
                (rug_phase.name, rug),
                (dead_phase.name, dead),
            ]),
            volume_avg: ctx.volume_avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::types::VolatilityLevel;

    fn input(volatility: VolatilityLevel) -> ScenarioInput {
        ScenarioInput {
            start_cap: 100_000.0,
            ceiling: 100_000.0,
            num_candles: 700,
            volatility,
            volume_avg: 5_000.0,
        }
    }

    #[test]
    fn plan_conserves_count() {
        assert_eq!(InstantRug::plan(17, 700), [17, 1, 682]);
        assert_eq!(InstantRug::plan(17, 5), [4, 1, 0]);
        assert_eq!(InstantRug::plan(17, 0), [0, 0, 0]);
    }

    #[test]
    fn single_rug_candle_then_flat() {
        for seed in 0..20 {
            let run = InstantRug.generate(&input(VolatilityLevel::Extreme), &mut SeededRandom::new(seed));
            let drops: Vec<usize> = run
                .candles
                .iter()
                .enumerate()
                .filter(|(_, c)| c.change_ratio() <= 0.15)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(drops.len(), 1, "seed {seed}");
            let r = drops[0];
            assert!((RUG_INDEX_MIN..=RUG_INDEX_MAX).contains(&r));
            assert_eq!(run.phases[1].start, r);
            for c in &run.candles[r + 1..] {
                assert!((c.change_ratio() - 1.0).abs() < 0.01);
            }
        }
    }

    #[test]
    fn rug_drop_centred_on_phase_drift() {
        for seed in 0..30 {
            let run = InstantRug.generate(&input(VolatilityLevel::Low), &mut SeededRandom::new(seed));
            let loss = 1.0 - run.candles[run.phases[1].start].change_ratio();
            assert!((loss + PHASES[1].drift).abs() <= DROP_SPREAD + 1e-9, "seed {seed}: loss {loss}");
        }
    }

    #[test]
    fn spans_follow_descriptor_allocation() {
        for seed in 0..10 {
            let run = InstantRug.generate(&input(VolatilityLevel::High), &mut SeededRandom::new(seed));
            let counts = InstantRug.descriptor().allocate(700, &mut SeededRandom::new(seed));
            let lens: Vec<usize> = run.phases.iter().map(|p| p.len).collect();
            assert_eq!(lens, counts);
        }
    }

    #[test]
    fn rug_candle_spikes_volume() {
        let run = InstantRug.generate(&input(VolatilityLevel::Medium), &mut SeededRandom::new(41));
        let r = run.phases[1].start;
        let before = run.candles[r - 1].volume;
        let spike = run.candles[r].volume;
        let after = run.candles[r + 5].volume;
        assert!(spike > before * 2.0, "spike {spike} vs {before}");
        assert!(after < spike * 0.1);
    }
}
