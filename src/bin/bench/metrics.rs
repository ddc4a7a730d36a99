// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Chart Audit
//
// Per-chart checks run on every bench chart: OHLC invariants, continuity,
// timestamp spacing, the post-bonding ceiling and wick allowance, and the
// instant-rug shape.

use bonding_chart_engine::scenarios::instant_rug::{RUG_INDEX_MAX, RUG_INDEX_MIN};
use bonding_chart_engine::{ChartResult, EngineConfig, ScenarioKind};

/// Wick allowance above the ceiling.
const WICK_ALLOWANCE: f64 = 1.01;
/// A rug candle closes at or below this fraction of its open.
const RUG_RATIO: f64 = 0.15;
/// Dead-chart candles stay within this of flat.
const DEAD_BAND: f64 = 0.01;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Default)]
pub struct ChartAudit {
    pub invariant_violations: u32,
    pub continuity_breaks: u32,
    pub timestamp_gaps: u32,
    pub ceiling_breaches: u32,
    pub wick_breaches: u32,
    /// `None` unless the chart ran the instant-rug scenario.
    pub rug_shape_ok: Option<bool>,
    /// Highest pre-bonding close divided by the bonding cap.
    pub pre_bonding_max_ratio: f64,
}

impl ChartAudit {
    pub fn of(chart: &ChartResult, config: &EngineConfig) -> Self {
        let mut audit = Self::default();

        for timed in &chart.data {
            if timed.candle.check().is_err() {
                audit.invariant_violations += 1;
            }
        }

        let interval = i64::from(config.candle_interval_secs);
        for pair in chart.data.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if (next.candle.open - prev.candle.close).abs() > EPS * prev.candle.close.abs().max(1.0) {
                audit.continuity_breaks += 1;
            }
            if next.time - prev.time != interval {
                audit.timestamp_gaps += 1;
            }
        }

        audit.pre_bonding_max_ratio = chart
            .pre_bonding()
            .iter()
            .map(|t| t.candle.close / config.bonding_cap)
            .fold(0.0, f64::max);

        if let Some(ceiling) = chart.metadata.ceiling {
            for (i, timed) in chart.post_bonding().iter().enumerate() {
                if timed.candle.close > ceiling * (1.0 + EPS) {
                    audit.ceiling_breaches += 1;
                }
                if i == 0 && opens_above(timed.candle.open, ceiling) {
                    continue;
                }
                if timed.candle.high > ceiling * WICK_ALLOWANCE * (1.0 + EPS) {
                    audit.wick_breaches += 1;
                }
            }
        }

        if chart.scenario == Some(ScenarioKind::InstantRug) {
            audit.rug_shape_ok = Some(rug_shape_ok(chart, config.bonding_cap));
        }

        audit
    }

    pub fn passes(&self) -> bool {
        self.invariant_violations == 0
            && self.continuity_breaks == 0
            && self.timestamp_gaps == 0
            && self.ceiling_breaches == 0
            && self.wick_breaches == 0
            && self.rug_shape_ok.unwrap_or(true)
    }
}

/// The bonding candle of a chart whose pre-bonding run overshot the cap opens
/// (and peaks) above it. It is the only post-bonding candle exempt from the
/// wick allowance and from the rug count.
fn opens_above(open: f64, ceiling: f64) -> bool {
    open > ceiling * (1.0 + EPS)
}

/// Exactly one candle losing 85%+ inside the rug window, flat afterwards.
fn rug_shape_ok(chart: &ChartResult, ceiling: f64) -> bool {
    let post = chart.post_bonding();
    let drops: Vec<usize> = post
        .iter()
        .enumerate()
        .filter(|(i, t)| !(*i == 0 && opens_above(t.candle.open, ceiling)))
        .filter(|(_, t)| t.candle.change_ratio() <= RUG_RATIO)
        .map(|(i, _)| i)
        .collect();

    let [rug] = drops.as_slice() else {
        return false;
    };
    if !(RUG_INDEX_MIN..=RUG_INDEX_MAX).contains(rug) {
        return false;
    }
    post[rug + 1..]
        .iter()
        .all(|t| (t.candle.change_ratio() - 1.0).abs() < DEAD_BAND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonding_chart_engine::{ChartAssembler, ChartType, GenerateOptions, VolatilityLevel};

    fn chart(chart_type: ChartType, kind: ScenarioKind, seed: u64) -> ChartResult {
        let options = GenerateOptions::new(chart_type, kind.into(), VolatilityLevel::High);
        ChartAssembler::default().generate_at(&options, seed, 1_700_000_000)
    }

    #[test]
    fn generated_charts_pass_audit() {
        let config = EngineConfig::default();
        for kind in ScenarioKind::ALL {
            let c = chart(ChartType::Full, kind, 9);
            let audit = ChartAudit::of(&c, &config);
            assert!(audit.passes(), "{kind}: {audit:?}");
        }
    }

    #[test]
    fn tampered_chart_fails_audit() {
        let config = EngineConfig::default();
        let mut c = chart(ChartType::Post, ScenarioKind::Organic, 10);
        c.data[5].candle.open *= 1.5;
        c.data[7].time += 1;
        let audit = ChartAudit::of(&c, &config);
        assert!(audit.continuity_breaks >= 1);
        assert!(audit.timestamp_gaps >= 1);
        assert!(!audit.passes());
    }

    #[test]
    fn overshooting_pre_bonding_still_passes_audit() {
        let config = EngineConfig::default();
        for kind in ScenarioKind::ALL {
            for seed in 0..15 {
                let options = GenerateOptions::new(ChartType::Full, kind.into(), VolatilityLevel::Extreme);
                let c = ChartAssembler::default().generate_at(&options, seed, 1_700_000_000);
                let bonding = c.post_bonding()[0].candle;
                assert!(bonding.close <= config.bonding_cap);
                let audit = ChartAudit::of(&c, &config);
                assert!(audit.passes(), "{kind} seed {seed}: {audit:?}");
            }
        }
    }

    #[test]
    fn raised_high_after_bonding_candle_is_a_wick_breach() {
        let config = EngineConfig::default();
        let mut c = chart(ChartType::Post, ScenarioKind::Organic, 12);
        c.data[0].candle.open = 150_000.0;
        c.data[0].candle.high = 150_000.0;
        c.data[3].candle.high = 150_000.0;
        let audit = ChartAudit::of(&c, &config);
        assert_eq!(audit.wick_breaches, 1);
    }

    #[test]
    fn rug_shape_checked_only_for_rugs() {
        let config = EngineConfig::default();
        let rug = ChartAudit::of(&chart(ChartType::Post, ScenarioKind::InstantRug, 11), &config);
        assert_eq!(rug.rug_shape_ok, Some(true));
        let organic = ChartAudit::of(&chart(ChartType::Post, ScenarioKind::Organic, 11), &config);
        assert_eq!(organic.rug_shape_ok, None);
    }
}
