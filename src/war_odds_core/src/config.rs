//! Engine configuration.
//!
//! A config starts from a named [`Profile`] and may override any field from
//! TOML. Validation happens once, when the engine is built; the per-call
//! stages assume a validated config.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::{
    CLEAN_ODDS_LADDER, DEEP_POSITION_MULTIPLIER, DEFAULT_HOUSE_EDGE, DEFAULT_UNIT_VALUE,
    DEFAULT_VARIANCE, EMPTY_ROSTER_EFFICIENCY, FULL_ROSTER, MAX_EXAMPLES, MEMBER_STEPS,
    POSITION_BREAKPOINTS, RANK_MULTIPLIERS, SMALL_ROSTER_BASE, SMALL_ROSTER_SLOPE, STAKE_UNITS,
};
use crate::error::ConfigError;
use crate::faction::Rank;

/// Named deployment profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Power-ratio model, `[0.15, 0.85]` band, precise odds.
    #[default]
    Balanced,
    /// Power-ratio model, wide `[0.05, 0.95]` band, currency-denominated examples.
    Professional,
    /// Weighted-blend model, narrow `[0.20, 0.80]` band, odds snapped to the clean ladder.
    Decimal,
}

/// Output format for decimal odds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsMode {
    /// `1 / p` rounded to two places
    #[default]
    Precise,
    /// Nearest value on the clean odds ladder
    Ladder,
}

/// Component weights for the weighted-blend model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub rank: f64,
    pub respect: f64,
    pub members: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        BlendWeights {
            rank: 0.50,
            respect: 0.35,
            members: 0.15,
        }
    }
}

/// How two factions are turned into a raw win probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbabilityModel {
    /// `ratingA / (ratingA + ratingB)`
    #[default]
    PowerRatio,
    /// Weighted mix of rank, respect and roster shares
    WeightedBlend(BlendWeights),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionBreakpoint {
    pub max_position: u32,
    pub multiplier: f64,
}

/// Step function over leaderboard position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionScale {
    /// Ascending by `max_position`
    pub breakpoints: Vec<PositionBreakpoint>,
    pub deep_multiplier: f64,
}

impl Default for PositionScale {
    fn default() -> Self {
        PositionScale {
            breakpoints: POSITION_BREAKPOINTS
                .iter()
                .map(|&(max_position, multiplier)| PositionBreakpoint {
                    max_position,
                    multiplier,
                })
                .collect(),
            deep_multiplier: DEEP_POSITION_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberStep {
    pub min_members: u32,
    pub efficiency: f64,
}

/// Roster-size efficiency curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberScale {
    pub full_roster: u32,
    /// Descending by `min_members`, all below `full_roster`
    pub steps: Vec<MemberStep>,
    pub small_base: f64,
    pub small_slope: f64,
    pub empty_efficiency: f64,
}

impl Default for MemberScale {
    fn default() -> Self {
        MemberScale {
            full_roster: FULL_ROSTER,
            steps: MEMBER_STEPS
                .iter()
                .map(|&(min_members, efficiency)| MemberStep {
                    min_members,
                    efficiency,
                })
                .collect(),
            small_base: SMALL_ROSTER_BASE,
            small_slope: SMALL_ROSTER_SLOPE,
            empty_efficiency: EMPTY_ROSTER_EFFICIENCY,
        }
    }
}

pub fn default_rank_multipliers() -> BTreeMap<Rank, f64> {
    RANK_MULTIPLIERS.iter().copied().collect()
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub profile: Profile,
    /// Overround added to the true probabilities (0.06 = 6%)
    pub house_edge: f64,
    pub probability_floor: f64,
    pub probability_ceiling: f64,
    /// Largest implied probability a quote may carry
    pub max_implied_probability: f64,
    /// Maximum symmetric perturbation of the true probability
    pub variance: f64,
    pub model: ProbabilityModel,
    pub rank_multipliers: BTreeMap<Rank, f64>,
    pub position_scale: PositionScale,
    pub member_scale: MemberScale,
    pub odds_mode: OddsMode,
    pub ladder: Vec<f64>,
    /// Example stake sizes, in betting units
    pub stake_units: Vec<u64>,
    /// Currency value of one betting unit
    pub unit_value: u64,
    pub max_examples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::for_profile(Profile::Balanced)
    }
}

impl EngineConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let base = EngineConfig {
            profile,
            house_edge: DEFAULT_HOUSE_EDGE,
            probability_floor: 0.15,
            probability_ceiling: 0.85,
            max_implied_probability: 0.90,
            variance: DEFAULT_VARIANCE,
            model: ProbabilityModel::PowerRatio,
            rank_multipliers: default_rank_multipliers(),
            position_scale: PositionScale::default(),
            member_scale: MemberScale::default(),
            odds_mode: OddsMode::Precise,
            ladder: CLEAN_ODDS_LADDER.to_vec(),
            stake_units: STAKE_UNITS.to_vec(),
            unit_value: 1,
            max_examples: MAX_EXAMPLES,
        };

        match profile {
            Profile::Balanced => base,
            Profile::Professional => EngineConfig {
                probability_floor: 0.05,
                probability_ceiling: 0.95,
                max_implied_probability: 0.97,
                unit_value: DEFAULT_UNIT_VALUE,
                ..base
            },
            Profile::Decimal => EngineConfig {
                probability_floor: 0.20,
                probability_ceiling: 0.80,
                max_implied_probability: 0.80,
                model: ProbabilityModel::WeightedBlend(BlendWeights::default()),
                odds_mode: OddsMode::Ladder,
                ..base
            },
        }
    }

    /// Parse a TOML document: an optional `profile` plus field overrides.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source).map_err(ConfigError::Parse)?;
        let config = file.into_config();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&source)
    }

    /// Clamp band actually applied to side A, chosen so that side B = 1 - A
    /// also stays inside `[floor, ceiling]`.
    pub fn effective_band(&self) -> (f64, f64) {
        let (floor, ceiling) = (self.probability_floor, self.probability_ceiling);
        if (floor + ceiling - 1.0).abs() < 1e-9 {
            return (floor, ceiling);
        }
        (
            floor.max(1.0 - ceiling),
            ceiling.min(1.0 - floor),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.house_edge.is_finite() || self.house_edge < 0.0 {
            return Err(ConfigError::NegativeHouseEdge(self.house_edge));
        }

        let (floor, ceiling) = (self.probability_floor, self.probability_ceiling);
        let band_ok = floor > 0.0 && ceiling < 1.0 && floor < ceiling && floor <= 0.5 && ceiling >= 0.5;
        if !band_ok {
            return Err(ConfigError::InvalidProbabilityBand { floor, ceiling });
        }

        if !(self.max_implied_probability > 0.0 && self.max_implied_probability < 1.0) {
            return Err(ConfigError::InvalidImpliedCeiling(self.max_implied_probability));
        }

        // Scaling below the clamp ceiling would push the realized edge negative
        let (_, high) = self.effective_band();
        if self.max_implied_probability < high {
            return Err(ConfigError::ImpliedCeilingBelowBand {
                max_implied: self.max_implied_probability,
                ceiling: high,
            });
        }

        if !(self.variance >= 0.0 && self.variance < 0.5) {
            return Err(ConfigError::InvalidVariance(self.variance));
        }

        if let ProbabilityModel::WeightedBlend(w) = self.model {
            let weights = [w.rank, w.respect, w.members];
            if weights.iter().any(|v| !v.is_finite() || *v < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
                return Err(invalid("model", "blend weights must be non-negative with a positive sum"));
            }
        }

        self.validate_rank_multipliers()?;
        self.validate_position_scale()?;
        self.validate_member_scale()?;
        self.validate_ladder()?;

        if self.stake_units.is_empty() || self.stake_units.contains(&0) {
            return Err(invalid("stake_units", "must be a non-empty list of positive stakes"));
        }
        if self.unit_value == 0 {
            return Err(invalid("unit_value", "must be positive"));
        }
        if self.max_examples == 0 {
            return Err(invalid("max_examples", "must be at least 1"));
        }

        Ok(())
    }

    fn validate_rank_multipliers(&self) -> Result<(), ConfigError> {
        if !self.rank_multipliers.contains_key(&Rank::Unranked) {
            return Err(invalid("rank_multipliers", "missing the Unranked entry"));
        }

        // BTreeMap iterates in tier order
        let mut previous = 0.0;
        for (rank, &multiplier) in &self.rank_multipliers {
            if !(multiplier.is_finite() && multiplier > 0.0) {
                return Err(invalid("rank_multipliers", format!("{rank} has multiplier {multiplier}")));
            }
            if multiplier < previous {
                return Err(invalid("rank_multipliers", format!("{rank} is weaker than a lower tier")));
            }
            previous = multiplier;
        }
        Ok(())
    }

    fn validate_position_scale(&self) -> Result<(), ConfigError> {
        let scale = &self.position_scale;
        let ascending = scale
            .breakpoints
            .windows(2)
            .all(|pair| pair[0].max_position < pair[1].max_position);
        if !ascending {
            return Err(invalid("position_scale", "breakpoints must be strictly ascending"));
        }

        let multipliers = scale.breakpoints.iter().map(|b| b.multiplier);
        if multipliers
            .chain(std::iter::once(scale.deep_multiplier))
            .any(|m| !(m.is_finite() && m > 0.0))
        {
            return Err(invalid("position_scale", "multipliers must be positive"));
        }
        Ok(())
    }

    fn validate_member_scale(&self) -> Result<(), ConfigError> {
        let scale = &self.member_scale;
        if scale.full_roster == 0 {
            return Err(invalid("member_scale", "full_roster must be positive"));
        }

        let descending = scale
            .steps
            .windows(2)
            .all(|pair| pair[0].min_members > pair[1].min_members);
        if !descending || scale.steps.iter().any(|s| s.min_members >= scale.full_roster) {
            return Err(invalid(
                "member_scale",
                "steps must be strictly descending and below full_roster",
            ));
        }

        let efficiencies = scale.steps.iter().map(|s| s.efficiency);
        if efficiencies
            .chain([scale.small_base, scale.empty_efficiency])
            .any(|e| !(e.is_finite() && e > 0.0))
            || !(scale.small_slope.is_finite() && scale.small_slope >= 0.0)
        {
            return Err(invalid("member_scale", "efficiencies must be positive"));
        }
        Ok(())
    }

    fn validate_ladder(&self) -> Result<(), ConfigError> {
        if self.odds_mode == OddsMode::Ladder && self.ladder.is_empty() {
            return Err(ConfigError::EmptyLadder);
        }

        let mut previous = 1.0;
        for (index, &value) in self.ladder.iter().enumerate() {
            if !(value.is_finite() && value > previous) {
                return Err(ConfigError::InvalidLadder { index, value });
            }
            previous = value;
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// On-disk shape: a profile plus optional overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    profile: Profile,
    house_edge: Option<f64>,
    probability_floor: Option<f64>,
    probability_ceiling: Option<f64>,
    max_implied_probability: Option<f64>,
    variance: Option<f64>,
    model: Option<ProbabilityModel>,
    rank_multipliers: Option<BTreeMap<Rank, f64>>,
    position_scale: Option<PositionScale>,
    member_scale: Option<MemberScale>,
    odds_mode: Option<OddsMode>,
    ladder: Option<Vec<f64>>,
    stake_units: Option<Vec<u64>>,
    unit_value: Option<u64>,
    max_examples: Option<usize>,
}

impl ConfigFile {
    fn into_config(self) -> EngineConfig {
        let mut config = EngineConfig::for_profile(self.profile);

        if let Some(v) = self.house_edge {
            config.house_edge = v;
        }
        if let Some(v) = self.probability_floor {
            config.probability_floor = v;
        }
        if let Some(v) = self.probability_ceiling {
            config.probability_ceiling = v;
        }
        if let Some(v) = self.max_implied_probability {
            config.max_implied_probability = v;
        }
        if let Some(v) = self.variance {
            config.variance = v;
        }
        if let Some(v) = self.model {
            config.model = v;
        }
        if let Some(table) = self.rank_multipliers {
            // Partial tables override only the tiers they name
            config.rank_multipliers.extend(table);
        }
        if let Some(v) = self.position_scale {
            config.position_scale = v;
        }
        if let Some(v) = self.member_scale {
            config.member_scale = v;
        }
        if let Some(v) = self.odds_mode {
            config.odds_mode = v;
        }
        if let Some(v) = self.ladder {
            config.ladder = v;
        }
        if let Some(v) = self.stake_units {
            config.stake_units = v;
        }
        if let Some(v) = self.unit_value {
            config.unit_value = v;
        }
        if let Some(v) = self.max_examples {
            config.max_examples = v;
        }

        config
    }
}
