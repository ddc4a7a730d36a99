// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Post-Bonding Scenarios

//! Post-bonding scenario generators.
//!
//! Each scenario is a small state machine over named sub-phases. The phases
//! take fixed shares of the candle count in order, with the rounding
//! remainder going to the last phase so no candle is dropped or duplicated.
//! Instant rug sizes its phases from a drawn rug index instead.

pub mod consolidation;
pub mod instant_rug;
pub mod organic;
pub mod pump_dump;
pub mod slow_bleed;

use serde::Serialize;
use tracing::debug;

use crate::context::GenerationContext;
use crate::random::RandomSource;
use crate::types::{Candle, ScenarioChoice, ScenarioKind, VolatilityLevel};

pub use consolidation::ConsolidationBreakout;
pub use instant_rug::InstantRug;
pub use organic::Organic;
pub use pump_dump::PumpDump;
pub use slow_bleed::SlowBleed;

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioPhase {
    pub name: &'static str,
    /// Share of the scenario's candles under [`Allocation::Shares`].
    pub share: f64,
    /// Per-step drift added on top of the scenario's own schedule.
    pub drift: f64,
    /// Scales the scenario's base volatility.
    pub volatility_multiplier: f64,
}

impl ScenarioPhase {
    pub const fn new(name: &'static str, share: f64, drift: f64, volatility_multiplier: f64) -> Self {
        Self { name, share, drift, volatility_multiplier }
    }
}

/// How a scenario splits its candle count across its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Allocation {
    /// Fixed shares, remainder to the last phase. Draws nothing.
    Shares,
    /// `[pre_rug, rug, dead]` with the rug index drawn uniformly from
    /// `[min, max]`. Phase shares are ignored.
    RugIndex { min: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioDescriptor {
    pub kind: ScenarioKind,
    pub phases: &'static [ScenarioPhase],
    pub allocation: Allocation,
}

impl ScenarioDescriptor {
    /// Per-phase candle counts summing to `num_candles`. Only
    /// [`Allocation::RugIndex`] consumes a draw from `rng`.
    pub fn allocate(&self, num_candles: usize, rng: &mut dyn RandomSource) -> Vec<usize> {
        match self.allocation {
            Allocation::Shares => {
                let shares: Vec<f64> = self.phases.iter().map(|p| p.share).collect();
                allocate_counts(&shares, num_candles)
            }
            Allocation::RugIndex { min, max } => {
                InstantRug::plan(rng.uniform_int(min, max), num_candles).to_vec()
            }
        }
    }
}

/// Split `total` by `shares`: every phase but the last gets `floor(share * total)`,
/// the last takes whatever remains. The counts always sum to `total`.
pub fn allocate_counts(shares: &[f64], total: usize) -> Vec<usize> {
    if shares.is_empty() {
        return Vec::new();
    }
    let mut counts = Vec::with_capacity(shares.len());
    let mut assigned = 0usize;
    for share in &shares[..shares.len() - 1] {
        let count = ((share.max(0.0) * total as f64).floor() as usize).min(total - assigned);
        assigned += count;
        counts.push(count);
    }
    counts.push(total - assigned);
    counts
}

// ---------------------------------------------------------------------------
// Generator capability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioInput {
    pub start_cap: f64,
    /// Closes never exceed this.
    pub ceiling: f64,
    pub num_candles: usize,
    pub volatility: VolatilityLevel,
    /// Running volume average carried over from the previous segment.
    pub volume_avg: f64,
}

impl ScenarioInput {
    pub fn context(&self) -> GenerationContext {
        let mut ctx = GenerationContext::new(self.start_cap);
        ctx.volume_avg = self.volume_avg;
        ctx
    }
}

/// Contiguous run of candles belonging to one sub-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSpan {
    pub name: &'static str,
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRun {
    pub candles: Vec<Candle>,
    pub phases: Vec<PhaseSpan>,
    /// Running volume average after the last candle.
    pub volume_avg: f64,
}

pub(crate) fn spans(named_counts: &[(&'static str, usize)]) -> Vec<PhaseSpan> {
    let mut start = 0;
    named_counts
        .iter()
        .map(|&(name, len)| {
            let span = PhaseSpan { name, start, len };
            start += len;
            span
        })
        .collect()
}

/// One post-bonding regime.
pub trait ScenarioGenerator {
    fn kind(&self) -> ScenarioKind;

    fn descriptor(&self) -> ScenarioDescriptor;

    /// Produce exactly `input.num_candles` continuous candles starting at
    /// `input.start_cap`, never closing above `input.ceiling`. The start cap
    /// may sit above the ceiling when pre-bonding overshot; the first
    /// candle then opens there and closes at or below the ceiling.
    fn generate(&self, input: &ScenarioInput, rng: &mut dyn RandomSource) -> ScenarioRun;
}

static ORGANIC: Organic = Organic;
static PUMP_DUMP: PumpDump = PumpDump;
static INSTANT_RUG: InstantRug = InstantRug;
static SLOW_BLEED: SlowBleed = SlowBleed;
static CONSOLIDATION_BREAKOUT: ConsolidationBreakout = ConsolidationBreakout;

pub fn generator(kind: ScenarioKind) -> &'static dyn ScenarioGenerator {
    match kind {
        ScenarioKind::Organic => &ORGANIC,
        ScenarioKind::PumpDump => &PUMP_DUMP,
        ScenarioKind::InstantRug => &INSTANT_RUG,
        ScenarioKind::SlowBleed => &SLOW_BLEED,
        ScenarioKind::ConsolidationBreakout => &CONSOLIDATION_BREAKOUT,
    }
}

/// Resolve a caller choice. `Random` is a uniform draw over the five kinds
/// from the chart's seeded stream.
pub fn resolve(choice: ScenarioChoice, rng: &mut dyn RandomSource) -> ScenarioKind {
    let kind = match choice {
        ScenarioChoice::Fixed(kind) => kind,
        ScenarioChoice::Random => {
            ScenarioKind::ALL[rng.uniform_int(0, ScenarioKind::ALL.len() - 1)]
        }
    };
    debug!(%choice, scenario = %kind, "scenario resolved");
    kind
}
