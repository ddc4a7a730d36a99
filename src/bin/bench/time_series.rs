// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - JSONL Candle Dump
//
// One JSON line per candle for external plotting and analysis.

use std::io::Write;
use std::path::Path;

use bonding_chart_engine::ChartResult;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CandleSnapshot {
    pub index: usize,
    pub time: i64,
    pub segment: &'static str,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl CandleSnapshot {
    pub fn from_chart(chart: &ChartResult) -> Vec<Self> {
        let bonding = chart.bonding_index.unwrap_or(chart.data.len());
        chart
            .data
            .iter()
            .enumerate()
            .map(|(index, timed)| Self {
                index,
                time: timed.time,
                segment: if index < bonding { "pre" } else { "post" },
                open: timed.candle.open,
                high: timed.candle.high,
                low: timed.candle.low,
                close: timed.candle.close,
                volume: timed.candle.volume,
            })
            .collect()
    }
}

/// Write all candles of `chart` to a JSONL file, creating parent directories.
pub fn write_jsonl(chart: &ChartResult, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for snapshot in CandleSnapshot::from_chart(chart) {
        let line = serde_json::to_string(&snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(file, "{}", line)?;
    }
    file.flush()
}
