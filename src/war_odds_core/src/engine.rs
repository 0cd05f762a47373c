use chrono::Utc;
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{EngineConfig, OddsMode, ProbabilityModel, Profile};
use crate::constants::{ENGINE_VERSION, EVEN_MONEY};
use crate::error::{ConfigError, EngineError};
use crate::faction::{FactionId, FactionSnapshot};
use crate::house_edge::apply_house_edge;
use crate::odds::quote_odds;
use crate::payout::betting_examples;
use crate::power_rating::power_breakdown;
use crate::quote::{OddsQuote, QuoteMetadata, SideQuote};
use crate::random::{seeded_rng, RandomSource};
use crate::source::FactionSource;
use crate::win_prob::{
    confidence, estimate_win_probability, perturb_and_clamp, probability_confidence, weighted_blend_probability,
};

/// Odds engine bound to a validated config and a faction source.
///
/// Quoting is a pure function of the two snapshots, the config and one draw
/// from the caller's random source, so one engine can serve any number of
/// threads without locking.
#[derive(Debug)]
pub struct OddsEngine<S> {
    config: EngineConfig,
    source: S,
}

/// Static description of an engine instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineHealth {
    pub version: &'static str,
    pub profile: Profile,
    pub house_edge: f64,
    pub odds_mode: OddsMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ladder: Option<Vec<f64>>,
    /// Currency value of one betting unit
    pub unit_value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factions_loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,
}

impl<S: FactionSource> OddsEngine<S> {
    /// Fails fast on an invalid config.
    pub fn new(config: EngineConfig, source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            profile = ?config.profile,
            house_edge = config.house_edge,
            odds_mode = ?config.odds_mode,
            "odds engine ready"
        );
        Ok(OddsEngine { config, source })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reprice the betting unit used for payout examples.
    ///
    /// Takes `&mut self`; engines shared across threads are rebuilt with a
    /// new config instead.
    pub fn set_unit_value(&mut self, unit_value: u64) -> Result<(), ConfigError> {
        if unit_value == 0 {
            return Err(ConfigError::InvalidValue {
                field: "unit_value",
                reason: "must be positive".to_string(),
            });
        }
        info!(
            previous = self.config.unit_value,
            unit_value, "betting unit repriced"
        );
        self.config.unit_value = unit_value;
        Ok(())
    }

    /// Quote a matchup by faction id.
    ///
    /// If either faction is unknown to the source, an even-money placeholder
    /// flagged as `fallback` is returned instead of an error.
    pub fn calculate_odds<R: RandomSource + ?Sized>(
        &self,
        faction_a: &FactionId,
        faction_b: &FactionId,
        rng: &mut R,
    ) -> Result<OddsQuote, EngineError> {
        let a = self.source.get_faction(faction_a);
        let b = self.source.get_faction(faction_b);

        match (a, b) {
            (Some(a), Some(b)) => self.quote_snapshots(&a, &b, rng),
            (a, b) => {
                warn!(
                    faction_a = %faction_a,
                    faction_b = %faction_b,
                    found_a = a.is_some(),
                    found_b = b.is_some(),
                    "missing faction data, quoting fallback odds"
                );
                let name_a = a.map(|f| f.name);
                let name_b = b.map(|f| f.name);
                self.fallback_quote(faction_a, name_a, faction_b, name_b)
            }
        }
    }

    /// Quote a matchup from already-resolved snapshots.
    pub fn quote_snapshots<R: RandomSource + ?Sized>(
        &self,
        a: &FactionSnapshot,
        b: &FactionSnapshot,
        rng: &mut R,
    ) -> Result<OddsQuote, EngineError> {
        let config = &self.config;

        let breakdown_a = power_breakdown(a, config);
        let breakdown_b = power_breakdown(b, config);
        let rating_a = breakdown_a.rating();
        let rating_b = breakdown_b.rating();

        // Confidence and power ratio describe whichever model set the price
        let (probability, confidence_score, power_ratio) = match config.model {
            ProbabilityModel::PowerRatio => (
                estimate_win_probability(rating_a, rating_b, config, rng),
                confidence(rating_a, rating_b),
                (rating_b > 0.0).then(|| rating_a / rating_b),
            ),
            ProbabilityModel::WeightedBlend(weights) => {
                let raw = weighted_blend_probability(a, b, &weights, config);
                (perturb_and_clamp(raw, config, rng), probability_confidence(raw), None)
            }
        };

        let implied = apply_house_edge(
            probability.prob_a,
            probability.prob_b,
            config.house_edge,
            config.max_implied_probability,
        )?;

        let odds_a = quote_odds(implied.implied_a, config.odds_mode, &config.ladder)?;
        let odds_b = quote_odds(implied.implied_b, config.odds_mode, &config.ladder)?;

        let metadata = QuoteMetadata {
            target_house_edge: config.house_edge,
            realized_house_edge: implied.realized_edge,
            quoted_overround: 1.0 / odds_a + 1.0 / odds_b - 1.0,
            total_implied_probability: implied.implied_a + implied.implied_b,
            confidence: confidence_score,
            power_ratio,
            profile: config.profile,
            odds_mode: config.odds_mode,
            fallback: false,
            timestamp: Utc::now(),
            version: ENGINE_VERSION,
        };

        info!(
            faction_a = %a.id,
            faction_b = %b.id,
            odds_a,
            odds_b,
            true_a = probability.prob_a,
            true_b = probability.prob_b,
            realized_edge = implied.realized_edge,
            confidence = metadata.confidence,
            "odds quoted"
        );

        Ok(OddsQuote {
            side_a: SideQuote {
                faction_id: a.id.clone(),
                name: a.name.clone(),
                decimal_odds: odds_a,
                implied_probability: implied.implied_a,
                true_probability: probability.prob_a,
                power_rating: Some(rating_a),
                breakdown: Some(breakdown_a),
                betting_examples: betting_examples(odds_a, config)?,
            },
            side_b: SideQuote {
                faction_id: b.id.clone(),
                name: b.name.clone(),
                decimal_odds: odds_b,
                implied_probability: implied.implied_b,
                true_probability: probability.prob_b,
                power_rating: Some(rating_b),
                breakdown: Some(breakdown_b),
                betting_examples: betting_examples(odds_b, config)?,
            },
            metadata,
        })
    }

    /// Even-money placeholder used when faction data is unavailable.
    ///
    /// Both sides carry 2.00 odds with true and implied probability 0.5, so
    /// the realized edge is zero.
    pub fn fallback_quote(
        &self,
        faction_a: &FactionId,
        name_a: Option<String>,
        faction_b: &FactionId,
        name_b: Option<String>,
    ) -> Result<OddsQuote, EngineError> {
        let examples = betting_examples(EVEN_MONEY, &self.config)?;
        let side = |id: &FactionId, name: Option<String>| SideQuote {
            faction_id: id.clone(),
            name: name.unwrap_or_else(|| "Unknown Faction".to_string()),
            decimal_odds: EVEN_MONEY,
            implied_probability: 0.5,
            true_probability: 0.5,
            power_rating: None,
            breakdown: None,
            betting_examples: examples.clone(),
        };

        Ok(OddsQuote {
            side_a: side(faction_a, name_a),
            side_b: side(faction_b, name_b),
            metadata: QuoteMetadata {
                target_house_edge: self.config.house_edge,
                realized_house_edge: 0.0,
                quoted_overround: 0.0,
                total_implied_probability: 1.0,
                confidence: 0,
                power_ratio: None,
                profile: self.config.profile,
                odds_mode: self.config.odds_mode,
                fallback: true,
                timestamp: Utc::now(),
                version: ENGINE_VERSION,
            },
        })
    }

    /// Quote many matchups in parallel.
    ///
    /// Each pair draws from its own generator, seeded from a master stream,
    /// so a given seed reproduces the whole batch regardless of scheduling.
    pub fn calculate_odds_batch(
        &self,
        pairs: &[(FactionId, FactionId)],
        seed: Option<u64>,
    ) -> Vec<Result<OddsQuote, EngineError>> {
        let mut master = seeded_rng(seed);
        let seeds: Vec<u64> = pairs.iter().map(|_| master.gen::<u64>()).collect();

        pairs
            .par_iter()
            .zip(seeds)
            .map(|((a, b), pair_seed)| {
                let mut rng = seeded_rng(Some(pair_seed));
                self.calculate_odds(a, b, &mut rng)
            })
            .collect()
    }

    pub fn health(&self) -> EngineHealth {
        EngineHealth {
            version: ENGINE_VERSION,
            profile: self.config.profile,
            house_edge: self.config.house_edge,
            odds_mode: self.config.odds_mode,
            ladder: (self.config.odds_mode == OddsMode::Ladder).then(|| self.config.ladder.clone()),
            unit_value: self.config.unit_value,
            factions_loaded: self.source.faction_count(),
            cache_size: self.source.cached_entries(),
        }
    }
}
