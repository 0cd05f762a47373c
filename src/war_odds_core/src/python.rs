use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_HOUSE_EDGE, DEFAULT_UNIT_VALUE, ENGINE_VERSION};
use crate::engine::OddsEngine;
use crate::error::EngineError;
use crate::payout;
use crate::random::seeded_rng;
use crate::source::InMemoryFactionSource;

fn to_py_err(err: EngineError) -> PyErr {
    match err {
        EngineError::Contract(e) => PyValueError::new_err(e.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Odds engine over an in-memory roster.
///
/// Quotes and health reports are returned as JSON strings.
#[pyclass(name = "OddsEngine")]
pub struct PyOddsEngine {
    engine: OddsEngine<InMemoryFactionSource>,
}

#[pymethods]
impl PyOddsEngine {
    /// Build from a `{"factions": [...]}` roster and an optional TOML config.
    #[new]
    #[pyo3(signature = (roster_json, config_toml = None))]
    fn new(roster_json: &str, config_toml: Option<&str>) -> PyResult<Self> {
        let config = match config_toml {
            Some(text) => EngineConfig::from_toml_str(text)
                .map_err(|e| PyValueError::new_err(format!("Invalid config: {}", e)))?,
            None => EngineConfig::default(),
        };
        let source = InMemoryFactionSource::from_json(roster_json).map_err(to_py_err)?;
        let engine = OddsEngine::new(config, source)
            .map_err(|e| PyValueError::new_err(format!("Invalid config: {}", e)))?;

        Ok(PyOddsEngine { engine })
    }

    /// Quote a matchup. Pass a seed for a reproducible variance draw.
    #[pyo3(signature = (faction_a, faction_b, seed = None))]
    fn calculate_odds(&self, faction_a: &str, faction_b: &str, seed: Option<u64>) -> PyResult<String> {
        let mut rng = seeded_rng(seed);
        let quote = self
            .engine
            .calculate_odds(&faction_a.into(), &faction_b.into(), &mut rng)
            .map_err(to_py_err)?;
        to_json(&quote)
    }

    /// Reprice the betting unit used for payout examples.
    fn set_unit_value(&mut self, unit_value: i64) -> PyResult<()> {
        let unit_value = u64::try_from(unit_value).unwrap_or(0);
        self.engine
            .set_unit_value(unit_value)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn health(&self) -> PyResult<String> {
        to_json(&self.engine.health())
    }
}

/// Total return and profit for a winning stake.
#[pyfunction]
fn calculate_payout(stake: i64, decimal_odds: f64) -> PyResult<(u64, u64)> {
    let payout = payout::checked_stake(stake)
        .and_then(|stake| payout::calculate_payout(stake, decimal_odds))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((payout.total_return, payout.profit))
}

/// Python module definition
#[pymodule]
fn war_odds_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyOddsEngine>()?;
    m.add_function(wrap_pyfunction!(calculate_payout, m)?)?;

    m.add("VERSION", ENGINE_VERSION)?;
    m.add("DEFAULT_HOUSE_EDGE", DEFAULT_HOUSE_EDGE)?;
    m.add("DEFAULT_UNIT_VALUE", DEFAULT_UNIT_VALUE)?;

    Ok(())
}
