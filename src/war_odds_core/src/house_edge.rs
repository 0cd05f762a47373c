use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, ContractError, EngineError};

/// Probabilities after the operator margin is added.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedProbabilities {
    pub implied_a: f64,
    pub implied_b: f64,
    /// `implied_a + implied_b - 1`; below the target edge when the ceiling bit
    pub realized_edge: f64,
    /// Whether both sides were scaled down to respect the ceiling
    pub scaled: bool,
}

/// Inflate a pair of true probabilities by `1 + edge`.
///
/// If the larger side would exceed `max_implied`, both sides are scaled by
/// the same factor, preserving their ratio, and the realized edge shrinks
/// accordingly.
///
/// A negative edge is a configuration error; probabilities outside `(0, 1)`
/// are a contract violation by the previous stage.
pub fn apply_house_edge(
    prob_a: f64,
    prob_b: f64,
    edge: f64,
    max_implied: f64,
) -> Result<ImpliedProbabilities, EngineError> {
    if !edge.is_finite() || edge < 0.0 {
        return Err(ConfigError::NegativeHouseEdge(edge).into());
    }
    for value in [prob_a, prob_b] {
        if !(value > 0.0 && value < 1.0) {
            return Err(ContractError::ProbabilityOutOfRange {
                stage: "house edge",
                value,
            }
            .into());
        }
    }

    let overround = 1.0 + edge;
    let mut implied_a = prob_a * overround;
    let mut implied_b = prob_b * overround;

    let largest = implied_a.max(implied_b);
    let scaled = largest > max_implied;
    if scaled {
        let factor = max_implied / largest;
        implied_a *= factor;
        implied_b *= factor;
    }

    let realized_edge = implied_a + implied_b - 1.0;

    debug!(
        target_edge = edge,
        realized_edge,
        implied_a,
        implied_b,
        scaled,
        "house edge applied"
    );

    Ok(ImpliedProbabilities {
        implied_a,
        implied_b,
        realized_edge,
        scaled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_matchup() {
        let implied = apply_house_edge(0.5, 0.5, 0.06, 0.9).unwrap();
        assert!((implied.implied_a - 0.53).abs() < 1e-12);
        assert!((implied.implied_b - 0.53).abs() < 1e-12);
        assert!((implied.realized_edge - 0.06).abs() < 1e-12);
        assert!(!implied.scaled);
    }

    #[test]
    fn test_ceiling_scales_both_sides() {
        let implied = apply_house_edge(0.85, 0.15, 0.06, 0.90).unwrap();

        assert!(implied.scaled);
        assert!((implied.implied_a - 0.90).abs() < 1e-12);
        // Ratio between the sides survives scaling
        assert!((implied.implied_a / implied.implied_b - 0.85 / 0.15).abs() < 1e-9);
        assert!(implied.realized_edge < 0.06);
        assert!(implied.realized_edge > 0.0);
        assert!(
            (implied.implied_a + implied.implied_b - (1.0 + implied.realized_edge)).abs() < 1e-12
        );
    }

    #[test]
    fn test_zero_edge() {
        let implied = apply_house_edge(0.3, 0.7, 0.0, 0.9).unwrap();
        assert!((implied.realized_edge).abs() < 1e-12);
    }

    #[test]
    fn test_negative_edge_is_config_error() {
        let err = apply_house_edge(0.5, 0.5, -0.02, 0.9).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::NegativeHouseEdge(_))));
    }

    #[test]
    fn test_out_of_range_probability_is_contract_error() {
        for (a, b) in [(1.0, 0.0), (0.0, 1.0), (f64::NAN, 0.5), (1.2, -0.2)] {
            let err = apply_house_edge(a, b, 0.06, 0.9).unwrap_err();
            assert!(matches!(
                err,
                EngineError::Contract(ContractError::ProbabilityOutOfRange { .. })
            ));
        }
    }
}
