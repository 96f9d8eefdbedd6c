// Python-bindinger. Bygges kun med `--features python` (maturin).

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::payload::{build_archive_json as build_archive_json_core, default_config_json, run_engine_json};

// ──────────────────────────────────────────────────────────────────────────────
// HJELPERE
// ──────────────────────────────────────────────────────────────────────────────

/// Godta både str og dict/objekt: objekter serialiseres via Python sin json.dumps.
fn payload_to_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    if let Ok(s) = payload.extract::<&str>() {
        return Ok(s.to_owned());
    }
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    json_mod
        .call_method1("dumps", (payload,))
        .and_then(|o| o.extract::<String>())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize payload with json.dumps: {e}")))
}

/// Returnér som Python-objekt (dict) via json.loads (unngår pyo3 serde-feature).
fn json_to_py(py: Python<'_>, out: &str) -> PyResult<PyObject> {
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    let obj = json_mod
        .call_method1("loads", (out,))
        .map_err(|e| PyValueError::new_err(format!("internal JSON parse error via json.loads: {e}")))?;
    Ok(obj.into_py(py))
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-FUNKSJONER
// ──────────────────────────────────────────────────────────────────────────────

/// {athletes, scouts, config?} → {reference_year, baselines, insights, alerts}
#[pyfunction]
fn run_engine(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    let json_in = payload_to_json(py, payload)?;
    let out = run_engine_json(&json_in).map_err(|e| PyValueError::new_err(e.to_string()))?;
    json_to_py(py, &out)
}

/// Streng-variant for testing: JSON inn, JSON ut.
#[pyfunction]
fn run_engine_str(json_in: &str) -> PyResult<String> {
    run_engine_json(json_in).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// {season, athletes, ratings, events} → sesongarkiv (dict)
#[pyfunction]
fn build_archive(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    let json_in = payload_to_json(py, payload)?;
    let out = build_archive_json_core(&json_in).map_err(|e| PyValueError::new_err(e.to_string()))?;
    json_to_py(py, &out)
}

#[pyfunction]
fn default_config(py: Python<'_>) -> PyResult<PyObject> {
    let out = default_config_json().map_err(|e| PyValueError::new_err(e.to_string()))?;
    json_to_py(py, &out)
}

/// Prometheus tekstformat for motorens tellere.
#[pyfunction]
fn metrics_text() -> PyResult<String> {
    crate::metrics::gather_metrics().map_err(|e| PyValueError::new_err(e.to_string()))
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn squadpower_core(_py: Python, m: &PyModule) -> PyResult<()> {
    // 1-arg: OBJECT → core → JSON → dict
    m.add_function(wrap_pyfunction!(run_engine, m)?)?;
    m.add_function(wrap_pyfunction!(build_archive, m)?)?;

    // Eksplisitt streng-variant for testing
    m.add_function(wrap_pyfunction!(run_engine_str, m)?)?;

    m.add_function(wrap_pyfunction!(default_config, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}
