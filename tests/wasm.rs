// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - WASM Surface Tests

#![cfg(target_arch = "wasm32")]

use bonding_chart_engine::{ChartGenerator, ChartResult, ScenarioKind};
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn js_object(value: serde_json::Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

#[wasm_bindgen_test]
fn generate_returns_chart_object() {
    let generator = ChartGenerator::new();
    let options = js_object(serde_json::json!({
        "chartType": "post",
        "scenario": "instant_rug",
        "volatility": "low",
    }));
    let value = generator.generate(options, 7.0, 1_700_000_000.0).unwrap();
    let chart: ChartResult = serde_wasm_bindgen::from_value(value).unwrap();
    assert_eq!(chart.scenario, Some(ScenarioKind::InstantRug));
    assert_eq!(chart.data.last().unwrap().time, 1_700_000_000);
}

#[wasm_bindgen_test]
fn undefined_options_use_defaults() {
    let generator = ChartGenerator::new();
    let value = generator.generate(JsValue::UNDEFINED, 1.0, 1_700_000_000.0).unwrap();
    let chart: ChartResult = serde_wasm_bindgen::from_value(value).unwrap();
    assert!(chart.bonding_index.is_some());
}

#[wasm_bindgen_test]
fn unknown_scenario_is_an_error() {
    let generator = ChartGenerator::new();
    let options = js_object(serde_json::json!({ "scenario": "moonshot" }));
    assert!(generator.generate(options, 1.0, 0.0).is_err());
    assert!(generator.generate(JsValue::UNDEFINED, -1.0, 0.0).is_err());
    assert!(generator.generate(JsValue::UNDEFINED, 1e20, 0.0).is_err());
}

#[wasm_bindgen_test]
fn invalid_config_rejected() {
    assert!(ChartGenerator::with_config(r#"{"initialCap": -5}"#).is_err());
    assert!(ChartGenerator::with_config(r#"{"bondingCap": 250000}"#).is_ok());
}
