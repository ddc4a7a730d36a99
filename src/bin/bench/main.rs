// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Bench Runner
//
// Monte Carlo validation over seeds and cases, per-chart audit trail.
//
// Usage:
//   cargo run --release --bin bench                          # All cases (30 runs each)
//   cargo run --release --bin bench -- --runs 5              # Quick mode
//   cargo run --release --bin bench -- RUG                   # Filter by name
//   cargo run --release --bin bench -- --volatility extreme  # Volatility for scenario cases
//   cargo run --release --bin bench -- --chart-type post     # Chart type for scenario cases
//   cargo run --release --bin bench -- --mix                 # Weighted mix case only
//   cargo run --release --bin bench -- --config engine.json  # Custom engine config
//   cargo run --release --bin bench -- --dump                # JSONL candle dumps
//   cargo run --release --bin bench -- --seed 42 --verbose   # Custom base seed, debug logs

mod cases;
mod logging;
mod metrics;
mod mix;
mod monte_carlo;
mod report;
mod time_series;

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bonding_chart_engine::{ChartAssembler, ChartType, EngineConfig, VolatilityLevel};
use tracing::{error, info};

use cases::{cases, Case, Selection};
use monte_carlo::RunSettings;
use report::*;

const RESULTS_DIR: &str = "bench-results";

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    volatility: VolatilityLevel,
    chart_type: Option<ChartType>,
    mix_only: bool,
    config: Option<PathBuf>,
    dump: bool,
    verbose: bool,
    filter: Option<String>,
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        volatility: VolatilityLevel::Medium,
        chart_type: None,
        mix_only: false,
        config: None,
        dump: false,
        verbose: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i).cloned().ok_or_else(|| format!("{flag} needs a value"))
        };
        match flag {
            "--runs" => cli.runs = value()?.parse::<usize>().map_err(|e| format!("--runs: {e}"))?,
            "--seed" => cli.seed = value()?.parse::<u64>().map_err(|e| format!("--seed: {e}"))?,
            "--volatility" => cli.volatility = value()?.parse::<VolatilityLevel>().map_err(|e| format!("{e}"))?,
            "--chart-type" => cli.chart_type = Some(value()?.parse::<ChartType>().map_err(|e| format!("{e}"))?),
            "--config" => cli.config = Some(PathBuf::from(value()?)),
            "--mix" => cli.mix_only = true,
            "--dump" => cli.dump = true,
            "--verbose" => cli.verbose = true,
            arg if !arg.starts_with('-') => cli.filter = Some(arg.to_string()),
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(cli)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            EngineConfig::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
        }
    }
}

fn selected_cases(cli: &CliArgs) -> Vec<Case> {
    cases()
        .into_iter()
        .filter(|c| !cli.mix_only || c.selection == Selection::WeightedMix)
        .filter(|c| cli.filter.as_deref().map_or(true, |f| c.matches(f)))
        .collect()
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };
    logging::init_logging(cli.verbose);

    let assembler = match load_config(cli.config.as_deref()).and_then(|c| {
        ChartAssembler::new(c).map_err(|e| e.to_string())
    }) {
        Ok(assembler) => assembler,
        Err(msg) => {
            error!("invalid engine config: {msg}");
            std::process::exit(2);
        }
    };

    let to_run = selected_cases(&cli);
    if to_run.is_empty() {
        error!("no cases match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let timestamp = now.as_millis().to_string();
    let dump_dir = cli
        .dump
        .then(|| Path::new(RESULTS_DIR).join(format!("candles-{timestamp}")));

    let settings = RunSettings {
        assembler: &assembler,
        volatility: cli.volatility,
        chart_type: cli.chart_type,
        end_time: now.as_secs() as i64,
        dump_dir: dump_dir.as_deref(),
    };

    info!(
        runs = cli.runs,
        seed = cli.seed,
        volatility = %cli.volatility,
        cases = to_run.len(),
        "bonding chart bench"
    );
    println!("\n  Bonding Chart Bench");
    println!("  PRNG: ChaCha8Rng | Runs/case: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  {:<32} {:>5} {:>7} {:>14} {:>10} {:>8} {:>8}",
        "Case", "Pass%", "Candles", "Outcome", "PreMax", "Brk%", "Time");
    println!("  {}", "-".repeat(92));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::with_capacity(to_run.len());

    for case in &to_run {
        let report = monte_carlo::run_monte_carlo(case, &settings, cli.runs, cli.seed);

        let outcome = &report.outcome_ratio;
        let outcome_ci = (outcome.ci_upper - outcome.ci_lower) / 2.0;
        let status = if report.passed { "PASS" } else { "FAIL" };

        println!("  {:<32} {:>4}% {:>7.0} {:>7.3}±{:<6.3} {:>9.2}x {:>7.1}% {:>6.0}us  {}",
            report.label,
            (report.pass_rate * 100.0) as u32,
            report.total_candles.mean,
            outcome.mean, outcome_ci,
            report.pre_bonding_max_ratio.max,
            report.breakout_share * 100.0,
            report.elapsed_us.mean,
            status,
        );

        mc_reports.push(report);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(92));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_start.elapsed().as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_case: cli.runs,
        base_seed: cli.seed,
        volatility: cli.volatility.to_string(),
        config: assembler.config().clone(),
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        cases: mc_reports,
    };

    match write_report(&report, &timestamp) {
        Ok(path) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => error!("failed to write bench report: {e}"),
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn write_report(report: &BenchReport, timestamp: &str) -> std::io::Result<PathBuf> {
    let dir = Path::new(RESULTS_DIR);
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(&path, json)?;
    Ok(path)
}
