use crate::config::OddsMode;
use crate::constants::{EVEN_MONEY, MIN_DECIMAL_ODDS};
use crate::error::ContractError;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decimal odds for an implied probability: `1 / p` rounded to two places.
///
/// Probabilities outside `(0, 1)` are a contract violation. The result is
/// never below [`MIN_DECIMAL_ODDS`], so it is always strictly above 1.0.
pub fn to_decimal_odds(implied_prob: f64) -> Result<f64, ContractError> {
    if !(implied_prob > 0.0 && implied_prob < 1.0) {
        return Err(ContractError::ProbabilityOutOfRange {
            stage: "odds quantizer",
            value: implied_prob,
        });
    }

    Ok(round2(1.0 / implied_prob).max(MIN_DECIMAL_ODDS))
}

/// Snap ideal odds to the nearest ladder entry.
///
/// When two entries are equally close, the one nearer even money wins.
/// Returns `None` for an empty ladder.
pub fn snap_to_ladder(ideal: f64, ladder: &[f64]) -> Option<f64> {
    const TIE: f64 = 1e-9;

    ladder.iter().copied().reduce(|best, candidate| {
        let best_diff = (ideal - best).abs();
        let candidate_diff = (ideal - candidate).abs();

        if candidate_diff < best_diff - TIE {
            candidate
        } else if (candidate_diff - best_diff).abs() <= TIE
            && (candidate - EVEN_MONEY).abs() < (best - EVEN_MONEY).abs()
        {
            candidate
        } else {
            best
        }
    })
}

/// Displayed odds for an implied probability under the given mode.
pub fn quote_odds(implied_prob: f64, mode: OddsMode, ladder: &[f64]) -> Result<f64, ContractError> {
    let precise = to_decimal_odds(implied_prob)?;

    match mode {
        OddsMode::Precise => Ok(precise),
        // Validated configs never reach here with an empty ladder
        OddsMode::Ladder => Ok(snap_to_ladder(1.0 / implied_prob, ladder).unwrap_or(precise)),
    }
}
