// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Bench Cases
//
// One case per scenario as a full chart, a pre-only extreme-volatility case
// for the discovery segment, a post-only random case, and the weighted mix.

use bonding_chart_engine::{ChartType, ScenarioChoice, ScenarioKind, VolatilityLevel};

// ─── Case Configuration ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Passed to the engine as-is.
    Engine(ScenarioChoice),
    /// Drawn from the weighted mix, then passed as a fixed choice.
    WeightedMix,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: &'static str,
    pub label: &'static str,
    pub chart_type: ChartType,
    pub selection: Selection,
    /// Overrides the CLI volatility when set.
    pub volatility: Option<VolatilityLevel>,
    pub criteria: PassCriteria,
}

#[derive(Debug, Clone)]
pub struct PassCriteria {
    /// Minimum share of runs passing their per-chart audit.
    pub min_pass_rate: f64,
    /// Minimum share of runs whose pre-bonding segment closes at or above
    /// twice the bonding cap at least once.
    pub min_breakout_share: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            min_pass_rate: 1.0,
            min_breakout_share: None,
        }
    }
}

impl Case {
    fn scenario(name: &'static str, label: &'static str, kind: ScenarioKind) -> Self {
        Self {
            name,
            label,
            chart_type: ChartType::Full,
            selection: Selection::Engine(ScenarioChoice::Fixed(kind)),
            volatility: None,
            criteria: PassCriteria::default(),
        }
    }

    pub fn matches(&self, filter: &str) -> bool {
        let f = filter.to_lowercase();
        self.name.to_lowercase().contains(&f) || self.label.to_lowercase().contains(&f)
    }

    /// Chart type with the CLI override applied to scenario cases.
    pub fn chart_type_with(&self, override_type: Option<ChartType>) -> ChartType {
        match (self.selection, override_type) {
            (Selection::Engine(ScenarioChoice::Fixed(_)), Some(t)) => t,
            _ => self.chart_type,
        }
    }
}

pub fn cases() -> Vec<Case> {
    vec![
        Case::scenario("FULL_ORGANIC", "Full / organic", ScenarioKind::Organic),
        Case::scenario("FULL_PUMP_DUMP", "Full / pump_dump", ScenarioKind::PumpDump),
        Case::scenario("FULL_INSTANT_RUG", "Full / instant_rug", ScenarioKind::InstantRug),
        Case::scenario("FULL_SLOW_BLEED", "Full / slow_bleed", ScenarioKind::SlowBleed),
        Case::scenario(
            "FULL_CONSOLIDATION",
            "Full / consolidation_breakout",
            ScenarioKind::ConsolidationBreakout,
        ),
        Case {
            name: "PRE_EXTREME",
            label: "Pre-only / extreme discovery",
            chart_type: ChartType::Pre,
            selection: Selection::Engine(ScenarioChoice::Random),
            volatility: Some(VolatilityLevel::Extreme),
            criteria: PassCriteria {
                min_breakout_share: Some(0.01),
                ..PassCriteria::default()
            },
        },
        Case {
            name: "POST_RANDOM",
            label: "Post-only / uniform random",
            chart_type: ChartType::Post,
            selection: Selection::Engine(ScenarioChoice::Random),
            volatility: None,
            criteria: PassCriteria::default(),
        },
        Case {
            name: "MIX_WEIGHTED",
            label: "Full / weighted mix",
            chart_type: ChartType::Full,
            selection: Selection::WeightedMix,
            volatility: None,
            criteria: PassCriteria::default(),
        },
    ]
}
