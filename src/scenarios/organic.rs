// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Organic Scenario
//
// Single regime: reversion toward the bonding ceiling, a small upward drift
// and a low-amplitude cycle. The close is clamped to the ceiling.

use super::{spans, Allocation, ScenarioDescriptor, ScenarioGenerator, ScenarioInput, ScenarioPhase, ScenarioRun};
use crate::constraints::StageLimits;
use crate::random::RandomSource;
use crate::return_model::OrganicModel;
use crate::synthesizer::{CandleStep, CandleSynthesizer, VolumeProfile, WickProfile};
use crate::types::ScenarioKind;

const PHASES: [ScenarioPhase; 1] = [ScenarioPhase::new("organic", 1.0, 0.0005, 1.0)];

const WICK_OVERSHOOT: f64 = 0.005;

#[derive(Debug, Clone, Copy, Default)]
pub struct Organic;

impl ScenarioGenerator for Organic {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Organic
    }

    fn descriptor(&self) -> ScenarioDescriptor {
        ScenarioDescriptor {
            kind: self.kind(),
            phases: &PHASES,
            allocation: Allocation::Shares,
        }
    }

    fn generate(&self, input: &ScenarioInput, rng: &mut dyn RandomSource) -> ScenarioRun {
        let [phase] = PHASES;
        let model = OrganicModel::new(input.ceiling, input.volatility, phase.drift, phase.volatility_multiplier);
        let synth = CandleSynthesizer::new(
            StageLimits::post_bonding(input.ceiling, WICK_OVERSHOOT),
            WickProfile::new(0.4, 1.0),
            VolumeProfile::organic(input.ceiling),
        );

        let mut ctx = input.context();
        let mut candles = Vec::with_capacity(input.num_candles);
        for _ in 0..input.num_candles {
            let r = model.next_return(&mut ctx, rng);
            candles.push(synth.synthesize(&mut ctx, CandleStep::new(r), rng));
        }

        ScenarioRun {
            candles,
            phases: spans(&[(phase.name, input.num_candles)]),
            volume_avg: ctx.volume_avg,
        }
    }
}
