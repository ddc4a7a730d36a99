// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Monte Carlo Runs
//
// Each case runs N times with seeds base..base+N; every chart is audited
// and the per-run results are aggregated into mean/std/95% CI stats.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use bonding_chart_engine::{
    ChartAssembler, ChartResult, ChartType, GenerateOptions, ScenarioChoice, SeededRandom,
    VolatilityLevel,
};
use tracing::{debug, warn};

use crate::cases::{Case, Selection};
use crate::metrics::ChartAudit;
use crate::mix;
use crate::report::*;
use crate::time_series;

/// Shared settings for every run of a bench invocation.
pub struct RunSettings<'a> {
    pub assembler: &'a ChartAssembler,
    pub volatility: VolatilityLevel,
    pub chart_type: Option<ChartType>,
    pub end_time: i64,
    pub dump_dir: Option<&'a Path>,
}

/// Generate one chart for `case` from `seed`.
pub fn generate(case: &Case, settings: &RunSettings<'_>, seed: u64) -> ChartResult {
    let mut rng = SeededRandom::new(seed);
    let scenario = match case.selection {
        Selection::Engine(choice) => choice,
        Selection::WeightedMix => ScenarioChoice::Fixed(mix::select_scenario(&mut rng)),
    };
    let options = GenerateOptions::new(
        case.chart_type_with(settings.chart_type),
        scenario,
        case.volatility.unwrap_or(settings.volatility),
    );
    settings.assembler.generate_with(&options, &mut rng, seed, settings.end_time)
}

/// Run a single case iteration with a specific seed.
pub fn run_single(case: &Case, settings: &RunSettings<'_>, seed: u64) -> BenchResult {
    let start = Instant::now();
    let chart = generate(case, settings, seed);
    let elapsed_us = start.elapsed().as_micros();

    let audit = ChartAudit::of(&chart, settings.assembler.config());
    if !audit.passes() {
        warn!(case = case.name, seed, ?audit, "chart failed audit");
    }

    if let Some(dir) = settings.dump_dir {
        let path = dir
            .join(case.name.to_lowercase())
            .join(format!("seed-{}.jsonl", seed));
        if let Err(e) = time_series::write_jsonl(&chart, &path) {
            warn!(path = %path.display(), error = %e, "failed to write candle dump");
        }
    }

    let meta = &chart.metadata;
    let post = chart.post_bonding();
    let outcome_ratio = match (post.first(), post.last()) {
        (Some(first), Some(last)) => last.candle.close / first.candle.open,
        _ => meta.final_cap / meta.start_cap,
    };

    BenchResult {
        case: case.name.to_string(),
        seed,
        pass: audit.passes(),
        chart_type: chart.chart_type.to_string(),
        scenario: chart.scenario.map(|k| k.to_string()),
        total_candles: meta.total_candles,
        bonding_index: chart.bonding_index,
        start_cap: meta.start_cap,
        final_cap: meta.final_cap,
        peak_cap: meta.peak_cap,
        min_cap: meta.min_cap,
        avg_volume: meta.avg_volume,
        ceiling: meta.ceiling,
        outcome_ratio,
        pre_bonding_max_ratio: audit.pre_bonding_max_ratio,
        invariant_violations: audit.invariant_violations,
        continuity_breaks: audit.continuity_breaks,
        timestamp_gaps: audit.timestamp_gaps,
        ceiling_breaches: audit.ceiling_breaches,
        wick_breaches: audit.wick_breaches,
        rug_shape_ok: audit.rug_shape_ok,
        elapsed_us,
    }
}

/// Run Monte Carlo: N runs of a case, aggregate stats.
pub fn run_monte_carlo(
    case: &Case,
    settings: &RunSettings<'_>,
    n_runs: usize,
    base_seed: u64,
) -> MonteCarloReport {
    let results: Vec<BenchResult> = (0..n_runs)
        .map(|i| run_single(case, settings, base_seed + i as u64))
        .collect();
    debug!(case = case.name, runs = n_runs, "case complete");
    aggregate(case, results)
}

/// Aggregate individual runs into a MonteCarloReport.
pub fn aggregate(case: &Case, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let share = |count: usize| if n == 0 { 0.0 } else { count as f64 / n as f64 };

    let pass_rate = share(results.iter().filter(|r| r.pass).count());
    let breakout_share = share(results.iter().filter(|r| r.pre_bonding_max_ratio >= 2.0).count());

    let mut passed = n > 0 && pass_rate >= case.criteria.min_pass_rate;
    if let Some(min_share) = case.criteria.min_breakout_share {
        if breakout_share < min_share {
            passed = false;
        }
    }

    let mut scenario_counts = BTreeMap::new();
    for r in &results {
        let key = r.scenario.clone().unwrap_or_else(|| "none".to_string());
        *scenario_counts.entry(key).or_insert(0) += 1;
    }

    MonteCarloReport {
        case_name: case.name.to_string(),
        label: case.label.to_string(),
        n_runs: n,
        pass_rate,
        breakout_share,
        passed,
        scenario_counts,
        total_candles: Stats::of(&results, |r| r.total_candles as f64),
        outcome_ratio: Stats::of(&results, |r| r.outcome_ratio),
        peak_cap: Stats::of(&results, |r| r.peak_cap),
        min_cap: Stats::of(&results, |r| r.min_cap),
        avg_volume: Stats::of(&results, |r| r.avg_volume),
        pre_bonding_max_ratio: Stats::of(&results, |r| r.pre_bonding_max_ratio),
        elapsed_us: Stats::of(&results, |r| r.elapsed_us as f64),
        individual_runs: results,
    }
}
