// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Weighted Scenario Mix
//
// Caller-side batching policy. The engine's own random choice is uniform;
// batches that want a realistic spread of outcomes draw the scenario here
// and pass it in as a fixed choice.

use bonding_chart_engine::{RandomSource, ScenarioKind};

/// instant_rug 20%, pump_dump 25%, organic 25%, slow_bleed 15%, consolidation 15%
const SCENARIO_CDF: [f64; 5] = [0.20, 0.45, 0.70, 0.85, 1.00];

const MIX_ORDER: [ScenarioKind; 5] = [
    ScenarioKind::InstantRug,
    ScenarioKind::PumpDump,
    ScenarioKind::Organic,
    ScenarioKind::SlowBleed,
    ScenarioKind::ConsolidationBreakout,
];

/// CDF lookup on one unit draw from the chart's stream.
pub fn select_scenario(rng: &mut dyn RandomSource) -> ScenarioKind {
    let u = rng.next_unit();
    for (kind, &threshold) in MIX_ORDER.iter().zip(SCENARIO_CDF.iter()) {
        if u < threshold {
            return *kind;
        }
    }
    MIX_ORDER[MIX_ORDER.len() - 1]
}
