// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Chart Assembly

//! Orchestrates one chart: the pre-bonding segment, then the chosen
//! post-bonding scenario, then timestamps and metadata.
//!
//! All price-path randomness is drawn from the single [`RandomSource`]
//! passed in, in a fixed order: scenario resolution, pre-bonding candle
//! count and candles, post-bonding candle count and candles. The chart id
//! is the only unseeded value in a [`ChartResult`].

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use crate::config::{ConfigError, EngineConfig};
use crate::constraints::StageLimits;
use crate::context::GenerationContext;
use crate::phase::PhaseSchedule;
use crate::random::{self, RandomSource, SeededRandom};
use crate::return_model::PreBondingModel;
use crate::scenarios::{self, PhaseSpan, ScenarioInput};
use crate::synthesizer::{CandleStep, CandleSynthesizer, VolumeProfile, WickProfile};
use crate::types::{
    Candle, ChartResult, GenerateOptions, Metadata, ScenarioKind, TimedCandle, VolatilityLevel,
};

const PRE_BONDING_WICKS: WickProfile = WickProfile::new(0.5, 1.3);

/// Output of the pre-bonding stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PreBondingRun {
    pub candles: Vec<Candle>,
    /// Context after the last candle, for the post-bonding segment to continue from.
    pub context: GenerationContext,
}

/// Output of the post-bonding stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PostBondingRun {
    pub kind: ScenarioKind,
    pub ceiling: f64,
    pub candles: Vec<Candle>,
    pub phases: Vec<PhaseSpan>,
}

#[derive(Debug, Clone, Default)]
pub struct ChartAssembler {
    config: EngineConfig,
}

impl ChartAssembler {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate with a fresh seeded stream, timestamps ending now.
    /// Native targets only; wasm callers pass their own clock to [`Self::generate_at`].
    pub fn generate(&self, options: &GenerateOptions, seed: u64) -> ChartResult {
        self.generate_at(options, seed, now_secs())
    }

    /// Generate with a fresh seeded stream, timestamps ending at `end_time` (unix seconds).
    pub fn generate_at(&self, options: &GenerateOptions, seed: u64, end_time: i64) -> ChartResult {
        let mut rng = SeededRandom::new(seed);
        self.generate_with(options, &mut rng, seed, end_time)
    }

    /// Generate from a caller-supplied stream. `seed` is recorded on the
    /// result only.
    pub fn generate_with(
        &self,
        options: &GenerateOptions,
        rng: &mut dyn RandomSource,
        seed: u64,
        end_time: i64,
    ) -> ChartResult {
        debug!(
            seed,
            chart_type = %options.chart_type,
            scenario = %options.scenario,
            volatility = %options.volatility,
            "generating chart"
        );

        let kind = options
            .chart_type
            .has_post_bonding()
            .then(|| scenarios::resolve(options.scenario, rng));

        let pre = options
            .chart_type
            .has_pre_bonding()
            .then(|| self.pre_bonding(options.volatility, rng));

        let post = kind.map(|kind| {
            let context = match &pre {
                Some(run) => GenerationContext::continue_from(&run.context),
                None => GenerationContext::new(self.config.bonding_cap),
            };
            self.post_bonding(kind, options.volatility, &context, rng)
        });

        let mut candles = Vec::new();
        let mut bonding_index = None;
        if let Some(run) = pre {
            candles.extend(run.candles);
        }
        let ceiling = post.as_ref().map(|run| run.ceiling);
        if let Some(run) = post {
            bonding_index = Some(candles.len());
            candles.extend(run.candles);
        }

        let metadata = Metadata::from_candles(&candles, ceiling);
        let data = timestamp(&candles, end_time, self.config.candle_interval_secs);

        debug!(
            candles = metadata.total_candles,
            final_cap = metadata.final_cap,
            peak_cap = metadata.peak_cap,
            "chart assembled"
        );

        ChartResult {
            id: random::chart_id(),
            seed,
            chart_type: options.chart_type,
            scenario: kind,
            volatility: options.volatility,
            bonding_index,
            data,
            metadata,
        }
    }

    /// Price discovery from the initial cap. Floored at the initial cap and
    /// effectively unbounded above.
    pub fn pre_bonding(&self, volatility: VolatilityLevel, rng: &mut dyn RandomSource) -> PreBondingRun {
        let cfg = &self.config;
        let count = rng.uniform_int(
            cfg.pre_bonding_candles.min as usize,
            cfg.pre_bonding_candles.max as usize,
        );

        let model = PreBondingModel::new(cfg.initial_cap, cfg.bonding_cap, volatility);
        let synth = CandleSynthesizer::new(
            StageLimits::pre_bonding(cfg.initial_cap, cfg.bonding_cap),
            PRE_BONDING_WICKS,
            VolumeProfile::pre_bonding(cfg.initial_cap),
        );
        let schedule = PhaseSchedule::pre_bonding();

        let mut ctx = GenerationContext::new(cfg.initial_cap);
        let mut candles = Vec::with_capacity(count);
        let mut current_phase = None;

        for i in 0..count {
            let progress = PhaseSchedule::progress(i, count);
            let phase = schedule.lookup(progress);
            if current_phase != Some(phase.name) {
                trace!(phase = phase.name, index = i, cap = ctx.current_cap, "pre-bonding phase");
                current_phase = Some(phase.name);
            }
            let r = model.next_return(progress, phase, &mut ctx, rng);
            candles.push(synth.synthesize(&mut ctx, CandleStep::new(r), rng));
        }

        debug!(candles = count, final_cap = ctx.current_cap, "pre-bonding segment complete");
        PreBondingRun { candles, context: ctx }
    }

    /// Run `kind` from `context.current_cap` under the bonding cap. A
    /// pre-bonding run that finished above the cap gives a bonding candle that
    /// opens (and peaks) there and closes at or below the cap.
    pub fn post_bonding(
        &self,
        kind: ScenarioKind,
        volatility: VolatilityLevel,
        context: &GenerationContext,
        rng: &mut dyn RandomSource,
    ) -> PostBondingRun {
        let cfg = &self.config;
        let start_cap = context.current_cap;
        let ceiling = cfg.bonding_cap;
        let num_candles = rng.uniform_int(
            cfg.post_bonding_candles.min as usize,
            cfg.post_bonding_candles.max as usize,
        );

        let input = ScenarioInput {
            start_cap,
            ceiling,
            num_candles,
            volatility,
            volume_avg: context.volume_avg,
        };
        let run = scenarios::generator(kind).generate(&input, rng);
        debug!(
            scenario = %kind,
            candles = num_candles,
            ceiling,
            phases = ?run.phases,
            "post-bonding segment complete"
        );

        PostBondingRun {
            kind,
            ceiling,
            candles: run.candles,
            phases: run.phases,
        }
    }
}

/// Evenly spaced timestamps with the last candle at `end_time`.
pub fn timestamp(candles: &[Candle], end_time: i64, interval_secs: u32) -> Vec<TimedCandle> {
    let n = candles.len() as i64;
    let interval = i64::from(interval_secs);
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| TimedCandle {
            time: end_time - (n - 1 - i as i64) * interval,
            candle: *candle,
        })
        .collect()
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartType, ScenarioChoice};

    const END: i64 = 1_700_000_000;

    fn options(chart_type: ChartType, scenario: ScenarioChoice) -> GenerateOptions {
        GenerateOptions::new(chart_type, scenario, VolatilityLevel::Medium)
    }

    #[test]
    fn timestamps_end_at_anchor() {
        let c = Candle { open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1.0 };
        let timed = timestamp(&[c, c, c], END, 60);
        let times: Vec<i64> = timed.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![END - 120, END - 60, END]);
    }

    #[test]
    fn pre_only_chart_has_no_scenario() {
        let assembler = ChartAssembler::default();
        let chart = assembler.generate_at(&options(ChartType::Pre, ScenarioChoice::Random), 1, END);
        assert_eq!(chart.scenario, None);
        assert_eq!(chart.bonding_index, None);
        assert_eq!(chart.metadata.ceiling, None);
        assert!((150..=400).contains(&chart.data.len()));
        assert_eq!(chart.data[0].candle.open, 5_000.0);
    }

    #[test]
    fn post_only_chart_starts_at_bonding_cap() {
        let assembler = ChartAssembler::default();
        let chart = assembler.generate_at(
            &options(ChartType::Post, ScenarioKind::Organic.into()),
            2,
            END,
        );
        assert_eq!(chart.scenario, Some(ScenarioKind::Organic));
        assert_eq!(chart.bonding_index, Some(0));
        assert_eq!(chart.data[0].candle.open, 100_000.0);
        assert!((500..=1500).contains(&chart.data.len()));
    }

    #[test]
    fn full_chart_joins_segments_continuously() {
        let assembler = ChartAssembler::default();
        let chart = assembler.generate_at(
            &options(ChartType::Full, ScenarioKind::PumpDump.into()),
            3,
            END,
        );
        let idx = chart.bonding_index.unwrap();
        assert!((150..=400).contains(&idx));
        assert_eq!(chart.data[idx].candle.open, chart.data[idx - 1].candle.close);
        assert_eq!(chart.pre_bonding().len() + chart.post_bonding().len(), chart.data.len());
    }

    #[test]
    fn overshoot_is_pulled_under_bonding_cap() {
        let assembler = ChartAssembler::default();
        let ctx = GenerationContext::new(250_000.0);
        for kind in ScenarioKind::ALL {
            for seed in 0..5 {
                let mut rng = SeededRandom::new(seed);
                let run = assembler.post_bonding(kind, VolatilityLevel::Extreme, &ctx, &mut rng);
                assert_eq!(run.ceiling, 100_000.0);
                assert_eq!(run.candles[0].open, 250_000.0);
                assert_eq!(run.candles[0].high, 250_000.0);
                for (i, c) in run.candles.iter().enumerate() {
                    assert!(c.close <= 100_000.0, "{kind} seed {seed} candle {i}: close {}", c.close);
                    if i > 0 {
                        assert!(c.high <= 101_000.0 + 1e-6, "{kind} seed {seed} candle {i}: high {}", c.high);
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig { initial_cap: -1.0, ..EngineConfig::default() };
        assert!(ChartAssembler::new(config).is_err());
    }

    #[test]
    fn custom_counts_respected() {
        let config = EngineConfig {
            pre_bonding_candles: crate::config::CountRange::new(20, 20),
            post_bonding_candles: crate::config::CountRange::new(30, 30),
            ..EngineConfig::default()
        };
        let assembler = ChartAssembler::new(config).unwrap();
        let chart = assembler.generate_at(&GenerateOptions::default(), 5, END);
        assert_eq!(chart.data.len(), 50);
        assert_eq!(chart.bonding_index, Some(20));
    }
}
