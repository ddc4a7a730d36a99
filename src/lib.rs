// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine

//! Synthetic OHLCV market-cap charts for bonding-curve tokens: a free
//! pre-bonding discovery segment followed by one of five labelled
//! post-bonding scenarios. Generation is reproducible from a seed.

pub mod assembler;
pub mod config;
pub mod constraints;
pub mod context;
pub mod phase;
pub mod random;
pub mod return_model;
pub mod scenarios;
pub mod stats;
pub mod synthesizer;
pub mod types;

pub use assembler::ChartAssembler;
pub use config::{ConfigError, CountRange, EngineConfig};
pub use random::{RandomSource, SeededRandom};
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Generate a chart with the default configuration and a fresh seed.
pub fn generate(options: &GenerateOptions) -> ChartResult {
    generate_with_seed(options, random::entropy_seed())
}

/// Generate a chart with the default configuration. Identical seeds and
/// options give identical candles.
pub fn generate_with_seed(options: &GenerateOptions, seed: u64) -> ChartResult {
    ChartAssembler::default().generate(options, seed)
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct ChartGenerator {
    assembler: ChartAssembler,
}

#[wasm_bindgen]
impl ChartGenerator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self { assembler: ChartAssembler::default() }
    }

    /// Build from a JSON engine config. Missing fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<ChartGenerator, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = EngineConfig::from_json(json).map_err(to_js_error)?;
        let assembler = ChartAssembler::new(config).map_err(to_js_error)?;
        Ok(Self { assembler })
    }

    /// `options` is `{ chartType?, scenario?, volatility? }`; `end_time_secs`
    /// is the unix time of the last candle. `seed` is a JS number and must be
    /// a safe integer so it survives the round trip back into the result.
    pub fn generate(&self, options: JsValue, seed: f64, end_time_secs: f64) -> Result<JsValue, JsValue> {
        let seed = seed_from_js(seed).map_err(|msg| JsValue::from_str(&msg))?;
        let options: GenerateOptions = if options.is_undefined() || options.is_null() {
            GenerateOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        let chart = self.assembler.generate_at(&options, seed, end_time_secs as i64);
        Ok(chart.serialize(&js_serializer())?)
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        Ok(self.assembler.config().serialize(&js_serializer())?)
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// `Number.MAX_SAFE_INTEGER`.
const MAX_SAFE_SEED: f64 = 9_007_199_254_740_991.0;

fn seed_from_js(seed: f64) -> Result<u64, String> {
    if !(seed.is_finite() && seed >= 0.0 && seed.fract() == 0.0 && seed <= MAX_SAFE_SEED) {
        return Err(format!("seed must be an integer in [0, 2^53 - 1], got {seed}"));
    }
    Ok(seed as u64)
}

/// Plain objects and `null` for absent fields, as `JSON.parse` would give.
fn js_serializer() -> serde_wasm_bindgen::Serializer {
    serde_wasm_bindgen::Serializer::json_compatible()
}

fn to_js_error(err: ConfigError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
