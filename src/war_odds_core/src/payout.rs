use serde::Serialize;

use crate::config::EngineConfig;
use crate::constants::WHOLE_RETURN_TOLERANCE;
use crate::error::ContractError;

/// Settlement of a winning bet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub stake: u64,
    pub odds: f64,
    /// `round(stake * odds)`
    pub total_return: u64,
    /// `total_return - stake`
    pub profit: u64,
}

/// Illustrative stake/return pair attached to a quote.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingExample {
    /// Stake in betting units
    pub units: u64,
    /// Stake in currency
    pub stake: u64,
    pub total_return: u64,
    pub profit: u64,
    /// False when the unit return had to be rounded
    pub exact: bool,
}

/// Payout for a winning stake at the given decimal odds.
///
/// A zero stake or odds not strictly above 1.0 are caller errors.
pub fn calculate_payout(stake: u64, decimal_odds: f64) -> Result<Payout, ContractError> {
    if stake == 0 {
        return Err(ContractError::InvalidStake(0));
    }
    if !(decimal_odds.is_finite() && decimal_odds > 1.0) {
        return Err(ContractError::InvalidOdds(decimal_odds));
    }

    let total_return = (stake as f64 * decimal_odds).round() as u64;

    Ok(Payout {
        stake,
        odds: decimal_odds,
        total_return,
        profit: total_return.saturating_sub(stake),
    })
}

/// Convert a signed stake from an untyped caller, rejecting zero and negatives.
pub fn checked_stake(stake: i64) -> Result<u64, ContractError> {
    match u64::try_from(stake) {
        Ok(s) if s > 0 => Ok(s),
        _ => Err(ContractError::InvalidStake(stake)),
    }
}

fn returns_whole_units(units: u64, odds: f64) -> bool {
    let ideal = units as f64 * odds;
    (ideal - ideal.round()).abs() < WHOLE_RETURN_TOLERANCE
}

fn example(units: u64, odds: f64, unit_value: u64, exact: bool) -> Result<BettingExample, ContractError> {
    let payout = calculate_payout(units.saturating_mul(unit_value), odds)?;
    Ok(BettingExample {
        units,
        stake: payout.stake,
        total_return: payout.total_return,
        profit: payout.profit,
        exact,
    })
}

/// Up to `config.max_examples` examples over the configured stake sizes.
///
/// Stakes whose unit return is whole are preferred. When none is, a single
/// approximate example for the smallest configured stake is returned.
pub fn betting_examples(odds: f64, config: &EngineConfig) -> Result<Vec<BettingExample>, ContractError> {
    let mut examples = Vec::with_capacity(config.max_examples);

    for &units in &config.stake_units {
        if examples.len() == config.max_examples {
            break;
        }
        if returns_whole_units(units, odds) {
            examples.push(example(units, odds, config.unit_value, true)?);
        }
    }

    if examples.is_empty() {
        let units = config.stake_units.iter().copied().min().unwrap_or(1);
        examples.push(example(units, odds, config.unit_value, false)?);
    }

    Ok(examples)
}

/// Every whole-unit stake from 1 to `max_units` that returns whole units.
pub fn clean_bets(odds: f64, max_units: u64, unit_value: u64) -> Result<Vec<BettingExample>, ContractError> {
    if !(odds.is_finite() && odds > 1.0) {
        return Err(ContractError::InvalidOdds(odds));
    }

    (1..=max_units)
        .filter(|&units| returns_whole_units(units, odds))
        .map(|units| example(units, odds, unit_value, true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout() {
        let payout = calculate_payout(1_000_000, 2.50).unwrap();
        assert_eq!(payout.total_return, 2_500_000);
        assert_eq!(payout.profit, 1_500_000);
    }

    #[test]
    fn test_payout_rounds() {
        let payout = calculate_payout(3, 1.89).unwrap();
        assert_eq!(payout.total_return, 6);
        assert_eq!(payout.profit, 3);
    }

    #[test]
    fn test_zero_stake_rejected() {
        assert_eq!(calculate_payout(0, 2.0), Err(ContractError::InvalidStake(0)));
    }

    #[test]
    fn test_signed_stake() {
        assert_eq!(checked_stake(500), Ok(500));
        assert_eq!(checked_stake(0), Err(ContractError::InvalidStake(0)));
        assert_eq!(checked_stake(-250), Err(ContractError::InvalidStake(-250)));
    }

    #[test]
    fn test_bad_odds_rejected() {
        for odds in [1.0, 0.5, -2.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                calculate_payout(10, odds),
                Err(ContractError::InvalidOdds(_))
            ));
        }
    }

    #[test]
    fn test_examples_prefer_whole_returns() {
        let config = EngineConfig::default();
        let examples = betting_examples(2.50, &config).unwrap();

        // 1 unit returns 2.5; 2, 10 return whole units; 3 and 5 do not
        let units: Vec<u64> = examples.iter().map(|e| e.units).collect();
        assert_eq!(units, vec![2, 10]);
        assert!(examples.iter().all(|e| e.exact));
        assert_eq!(examples[0].total_return, 5);
    }

    #[test]
    fn test_examples_capped() {
        let config = EngineConfig::default();
        let examples = betting_examples(2.0, &config).unwrap();
        assert_eq!(examples.len(), config.max_examples);
        assert_eq!(examples[0].units, 1);
        assert_eq!(examples[0].total_return, 2);
    }

    #[test]
    fn test_examples_fallback_is_approximate() {
        let config = EngineConfig::default();
        let examples = betting_examples(1.89, &config).unwrap();

        assert_eq!(examples.len(), 1);
        assert!(!examples[0].exact);
        assert_eq!(examples[0].units, 1);
        assert_eq!(examples[0].total_return, 2);
    }

    #[test]
    fn test_examples_in_currency() {
        let config = EngineConfig {
            unit_value: 1_000,
            ..EngineConfig::default()
        };
        let examples = betting_examples(3.0, &config).unwrap();
        assert_eq!(examples[0].stake, 1_000);
        assert_eq!(examples[0].total_return, 3_000);
        assert_eq!(examples[0].profit, 2_000);
    }

    #[test]
    fn test_clean_bets() {
        let bets = clean_bets(1.25, 10, 1).unwrap();
        let units: Vec<u64> = bets.iter().map(|b| b.units).collect();
        assert_eq!(units, vec![4, 8]);
    }

    #[test]
    fn test_clean_bets_invalid_odds() {
        assert_eq!(clean_bets(1.0, 0, 1), Err(ContractError::InvalidOdds(1.0)));
    }
}
