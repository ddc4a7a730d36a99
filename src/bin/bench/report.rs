// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Bench Report Types
//
// Structured output: per-run results, per-case Monte Carlo aggregation and
// the top-level report written to bench-results/.

use std::collections::BTreeMap;

use bonding_chart_engine::{stats, EngineConfig};
use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = stats::mean(samples);
        let std_dev = stats::std_dev(samples);
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn of<T>(results: &[T], metric: impl Fn(&T) -> f64) -> Self {
        Self::from_samples(&results.iter().map(metric).collect::<Vec<_>>())
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub case: String,
    pub seed: u64,
    pub pass: bool,
    pub chart_type: String,
    pub scenario: Option<String>,
    pub total_candles: usize,
    pub bonding_index: Option<usize>,
    pub start_cap: f64,
    pub final_cap: f64,
    pub peak_cap: f64,
    pub min_cap: f64,
    pub avg_volume: f64,
    pub ceiling: Option<f64>,
    /// final / start of the post-bonding segment, or of the whole chart when pre-only.
    pub outcome_ratio: f64,
    pub pre_bonding_max_ratio: f64,
    pub invariant_violations: u32,
    pub continuity_breaks: u32,
    pub timestamp_gaps: u32,
    pub ceiling_breaches: u32,
    pub wick_breaches: u32,
    pub rug_shape_ok: Option<bool>,
    pub elapsed_us: u128,
}

// ─── Monte Carlo Report (per-case aggregation) ──────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub case_name: String,
    pub label: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    /// Share of runs with a pre-bonding close at or above twice the bonding cap.
    pub breakout_share: f64,
    pub passed: bool,
    pub scenario_counts: BTreeMap<String, usize>,
    pub total_candles: Stats,
    pub outcome_ratio: Stats,
    pub peak_cap: Stats,
    pub min_cap: Stats,
    pub avg_volume: Stats,
    pub pre_bonding_max_ratio: Stats,
    pub elapsed_us: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_case: usize,
    pub base_seed: u64,
    pub volatility: String,
    pub config: EngineConfig,
    pub summary: Summary,
    pub cases: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
