// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Type Definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::stats;

// ─── Candle ─────────────────────────────────────────────────────────────────

/// One OHLCV record. Immutable once emitted by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A broken OHLC invariant. Seeing one of these means the engine has a bug.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("non-finite field in candle")]
    NonFinite,
    #[error("non-positive price (open {open}, close {close})")]
    NonPositivePrice { open: f64, close: f64 },
    #[error("high {high} below body top {body_top}")]
    HighBelowBody { high: f64, body_top: f64 },
    #[error("low {low} above body bottom {body_bottom}")]
    LowAboveBody { low: f64, body_bottom: f64 },
    #[error("negative low {0}")]
    NegativeLow(f64),
    #[error("non-positive volume {0}")]
    NonPositiveVolume(f64),
}

impl Candle {
    /// Build a candle, panicking if the OHLC invariants do not hold.
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        let candle = Self { open, high, low, close, volume };
        if let Err(violation) = candle.check() {
            panic!("candle invariant violated: {violation} ({candle:?})");
        }
        candle
    }

    pub fn check(&self) -> Result<(), InvariantViolation> {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(InvariantViolation::NonFinite);
        }
        if self.open <= 0.0 || self.close <= 0.0 {
            return Err(InvariantViolation::NonPositivePrice {
                open: self.open,
                close: self.close,
            });
        }
        if self.high < self.body_top() {
            return Err(InvariantViolation::HighBelowBody {
                high: self.high,
                body_top: self.body_top(),
            });
        }
        if self.low > self.body_bottom() {
            return Err(InvariantViolation::LowAboveBody {
                low: self.low,
                body_bottom: self.body_bottom(),
            });
        }
        if self.low < 0.0 {
            return Err(InvariantViolation::NegativeLow(self.low));
        }
        if self.volume <= 0.0 {
            return Err(InvariantViolation::NonPositiveVolume(self.volume));
        }
        Ok(())
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// close / open
    pub fn change_ratio(&self) -> f64 {
        self.close / self.open
    }
}

/// Candle with its display timestamp (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedCandle {
    pub time: i64,
    #[serde(flatten)]
    pub candle: Candle,
}

// ─── Option Enums ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// Pre-bonding segment followed by a post-bonding scenario.
    #[default]
    Full,
    Pre,
    Post,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }

    pub fn has_pre_bonding(&self) -> bool {
        matches!(self, Self::Full | Self::Pre)
    }

    pub fn has_post_bonding(&self) -> bool {
        matches!(self, Self::Full | Self::Post)
    }
}

impl FromStr for ChartType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            _ => Err(ConfigError::UnknownChartType(s.to_string())),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Low,
    #[default]
    Medium,
    High,
    Extreme,
}

impl VolatilityLevel {
    pub const ALL: [VolatilityLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Extreme];

    /// Per-step volatility for the pre-bonding stage.
    pub fn pre_bonding(&self) -> f64 {
        self.pick([0.08, 0.15, 0.25, 0.35])
    }

    /// Select this level's entry from a `[low, medium, high, extreme]` table.
    pub fn pick(&self, table: [f64; 4]) -> f64 {
        match self {
            Self::Low => table[0],
            Self::Medium => table[1],
            Self::High => table[2],
            Self::Extreme => table[3],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl FromStr for VolatilityLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "extreme" => Ok(Self::Extreme),
            _ => Err(ConfigError::UnknownVolatility(s.to_string())),
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five post-bonding regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Organic,
    PumpDump,
    InstantRug,
    SlowBleed,
    #[serde(alias = "consolidation")]
    ConsolidationBreakout,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 5] = [
        Self::Organic,
        Self::PumpDump,
        Self::InstantRug,
        Self::SlowBleed,
        Self::ConsolidationBreakout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organic => "organic",
            Self::PumpDump => "pump_dump",
            Self::InstantRug => "instant_rug",
            Self::SlowBleed => "slow_bleed",
            Self::ConsolidationBreakout => "consolidation_breakout",
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organic" => Ok(Self::Organic),
            "pump_dump" => Ok(Self::PumpDump),
            "instant_rug" => Ok(Self::InstantRug),
            "slow_bleed" => Ok(Self::SlowBleed),
            "consolidation" | "consolidation_breakout" => Ok(Self::ConsolidationBreakout),
            _ => Err(ConfigError::UnknownScenario(s.to_string())),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenario requested by the caller. `Random` draws uniformly from the
/// five kinds using the chart's seeded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScenarioChoice {
    #[default]
    Random,
    Fixed(ScenarioKind),
}

impl FromStr for ScenarioChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(Self::Random);
        }
        s.parse().map(Self::Fixed)
    }
}

impl TryFrom<String> for ScenarioChoice {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScenarioChoice> for String {
    fn from(choice: ScenarioChoice) -> Self {
        choice.to_string()
    }
}

impl fmt::Display for ScenarioChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Fixed(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl From<ScenarioKind> for ScenarioChoice {
    fn from(kind: ScenarioKind) -> Self {
        Self::Fixed(kind)
    }
}

/// Caller options for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    pub chart_type: ChartType,
    pub scenario: ScenarioChoice,
    pub volatility: VolatilityLevel,
}

impl GenerateOptions {
    pub fn new(chart_type: ChartType, scenario: ScenarioChoice, volatility: VolatilityLevel) -> Self {
        Self { chart_type, scenario, volatility }
    }
}

// ─── Chart Output ───────────────────────────────────────────────────────────

/// Summary over a finished candle sequence. Peak and min reduce over closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub start_cap: f64,
    pub final_cap: f64,
    pub peak_cap: f64,
    pub min_cap: f64,
    pub total_candles: usize,
    pub avg_volume: f64,
    /// Post-bonding ceiling in force, if the chart has a post-bonding segment.
    pub ceiling: Option<f64>,
}

impl Metadata {
    pub fn from_candles<'a, I>(candles: I, ceiling: Option<f64>) -> Self
    where
        I: IntoIterator<Item = &'a Candle>,
    {
        let mut start_cap = 0.0;
        let mut final_cap = 0.0;
        let mut peak_cap = f64::NEG_INFINITY;
        let mut min_cap = f64::INFINITY;
        let mut volumes = Vec::new();

        for (i, candle) in candles.into_iter().enumerate() {
            if i == 0 {
                start_cap = candle.open;
            }
            final_cap = candle.close;
            peak_cap = peak_cap.max(candle.close);
            min_cap = min_cap.min(candle.close);
            volumes.push(candle.volume);
        }

        if volumes.is_empty() {
            peak_cap = 0.0;
            min_cap = 0.0;
        }

        Self {
            start_cap,
            final_cap,
            peak_cap,
            min_cap,
            total_candles: volumes.len(),
            avg_volume: stats::mean(&volumes),
            ceiling,
        }
    }
}

/// One generated chart. `data` is in time order and is not modified after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResult {
    /// Cosmetic identifier drawn from an unseeded source; not reproducible.
    pub id: String,
    pub seed: u64,
    pub chart_type: ChartType,
    /// Ground-truth post-bonding label. `None` for pre-only charts.
    pub scenario: Option<ScenarioKind>,
    pub volatility: VolatilityLevel,
    /// Index of the first post-bonding candle.
    pub bonding_index: Option<usize>,
    pub data: Vec<TimedCandle>,
    pub metadata: Metadata,
}

impl ChartResult {
    pub fn candles(&self) -> impl Iterator<Item = &Candle> + '_ {
        self.data.iter().map(|c| &c.candle)
    }

    pub fn pre_bonding(&self) -> &[TimedCandle] {
        let end = self.bonding_index.unwrap_or(self.data.len());
        &self.data[..end]
    }

    pub fn post_bonding(&self) -> &[TimedCandle] {
        match self.bonding_index {
            Some(start) => &self.data[start..],
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_accepts_valid_candle() {
        let c = Candle { open: 10.0, high: 12.0, low: 9.0, close: 11.0, volume: 5.0 };
        assert!(c.check().is_ok());
    }

    #[test]
    fn check_rejects_high_below_close() {
        let c = Candle { open: 10.0, high: 10.5, low: 9.0, close: 11.0, volume: 5.0 };
        assert!(matches!(c.check(), Err(InvariantViolation::HighBelowBody { .. })));
    }

    #[test]
    fn check_rejects_zero_volume() {
        let c = Candle { open: 10.0, high: 10.0, low: 10.0, close: 10.0, volume: 0.0 };
        assert_eq!(c.check(), Err(InvariantViolation::NonPositiveVolume(0.0)));
    }

    #[test]
    #[should_panic(expected = "candle invariant violated")]
    fn new_panics_on_low_above_body() {
        Candle::new(10.0, 12.0, 10.5, 11.0, 1.0);
    }

    #[test]
    fn scenario_names_parse_with_alias() {
        assert_eq!("consolidation".parse::<ScenarioKind>().unwrap(), ScenarioKind::ConsolidationBreakout);
        assert_eq!("PUMP_DUMP".parse::<ScenarioKind>().unwrap(), ScenarioKind::PumpDump);
        for kind in ScenarioKind::ALL {
            assert_eq!(kind.as_str().parse::<ScenarioKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_scenario_fails_fast() {
        let err = "moon".parse::<ScenarioChoice>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownScenario(ref s) if s == "moon"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: GenerateOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, GenerateOptions::default());
        assert_eq!(opts.chart_type, ChartType::Full);
        assert_eq!(opts.scenario, ScenarioChoice::Random);
        assert_eq!(opts.volatility, VolatilityLevel::Medium);

        let opts: GenerateOptions = serde_json::from_str(
            r#"{"chartType":"post","scenario":"consolidation","volatility":"extreme"}"#,
        )
        .unwrap();
        assert_eq!(opts.chart_type, ChartType::Post);
        assert_eq!(opts.scenario, ScenarioChoice::Fixed(ScenarioKind::ConsolidationBreakout));
        assert_eq!(opts.volatility, VolatilityLevel::Extreme);
    }

    #[test]
    fn options_reject_unknown_scenario() {
        let res: Result<GenerateOptions, _> = serde_json::from_str(r#"{"scenario":"sideways"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn metadata_reduces_over_closes() {
        let candles = [
            Candle { open: 10.0, high: 15.0, low: 9.0, close: 12.0, volume: 2.0 },
            Candle { open: 12.0, high: 13.0, low: 7.0, close: 8.0, volume: 4.0 },
            Candle { open: 8.0, high: 9.5, low: 7.5, close: 9.0, volume: 6.0 },
        ];
        let meta = Metadata::from_candles(&candles, Some(20.0));
        assert_eq!(meta.start_cap, 10.0);
        assert_eq!(meta.final_cap, 9.0);
        assert_eq!(meta.peak_cap, 12.0);
        assert_eq!(meta.min_cap, 8.0);
        assert_eq!(meta.total_candles, 3);
        assert_eq!(meta.avg_volume, 4.0);
        assert_eq!(meta.ceiling, Some(20.0));
    }

    #[test]
    fn timed_candle_serializes_flat() {
        let tc = TimedCandle {
            time: 60,
            candle: Candle { open: 1.0, high: 2.0, low: 0.5, close: 1.5, volume: 3.0 },
        };
        let json = serde_json::to_value(tc).unwrap();
        assert_eq!(json["time"], 60);
        assert_eq!(json["open"], 1.0);
        assert_eq!(json["volume"], 3.0);
    }
}
