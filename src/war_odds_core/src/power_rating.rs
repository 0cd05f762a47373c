use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{EngineConfig, MemberScale, PositionScale};
use crate::constants::RESPECT_SCALE;
use crate::faction::{FactionSnapshot, Rank};

/// The four sub-scores behind a power rating.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerBreakdown {
    pub respect_score: f64,
    pub rank_multiplier: f64,
    pub position_multiplier: f64,
    pub member_efficiency: f64,
}

impl PowerBreakdown {
    pub fn rating(&self) -> f64 {
        self.respect_score * self.rank_multiplier * self.position_multiplier * self.member_efficiency
    }
}

/// Compute a faction's power rating.
///
/// The sub-scores multiply, so a faction weak in any one dimension is
/// penalized overall. Missing or invalid attributes take their defaults;
/// the result is always finite and strictly positive.
pub fn compute_power_rating(faction: &FactionSnapshot, config: &EngineConfig) -> f64 {
    power_breakdown(faction, config).rating()
}

pub fn power_breakdown(faction: &FactionSnapshot, config: &EngineConfig) -> PowerBreakdown {
    let breakdown = PowerBreakdown {
        respect_score: faction.effective_respect() / RESPECT_SCALE,
        rank_multiplier: rank_multiplier(faction.effective_rank(), &config.rank_multipliers),
        position_multiplier: position_multiplier(faction.effective_position(), &config.position_scale),
        member_efficiency: member_efficiency(faction.effective_members(), &config.member_scale),
    };

    debug!(
        faction = %faction.id,
        name = %faction.name,
        respect_score = breakdown.respect_score,
        rank_multiplier = breakdown.rank_multiplier,
        position_multiplier = breakdown.position_multiplier,
        member_efficiency = breakdown.member_efficiency,
        rating = breakdown.rating(),
        "power rating"
    );

    breakdown
}

/// Ranks absent from the table use the `Unranked` multiplier.
pub fn rank_multiplier(rank: Rank, table: &BTreeMap<Rank, f64>) -> f64 {
    table
        .get(&rank)
        .or_else(|| table.get(&Rank::Unranked))
        .copied()
        .unwrap_or(crate::constants::RANK_MULTIPLIERS[0].1)
}

pub fn position_multiplier(position: u32, scale: &PositionScale) -> f64 {
    scale
        .breakpoints
        .iter()
        .find(|b| position <= b.max_position)
        .map_or(scale.deep_multiplier, |b| b.multiplier)
}

/// Saturates at a full roster; small rosters degrade linearly.
pub fn member_efficiency(members: u32, scale: &MemberScale) -> f64 {
    if members == 0 {
        return scale.empty_efficiency;
    }
    if members >= scale.full_roster {
        return 1.0;
    }

    scale
        .steps
        .iter()
        .find(|s| members >= s.min_members)
        .map_or_else(
            || scale.small_base + (members as f64 / 100.0) * scale.small_slope,
            |s| s.efficiency,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOOR_POWER_RATING;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_rating_is_product_of_sub_scores() {
        let faction = FactionSnapshot::new("1", "Elite")
            .with_respect(10_000_000.0)
            .with_rank(Rank::DiamondIII)
            .with_members(100)
            .with_position(5);

        let rating = compute_power_rating(&faction, &config());
        assert!((rating - 10.0 * 1.5 * 1.2 * 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_all_defaults_yield_floor_rating() {
        let faction = FactionSnapshot::new("2", "Ghost")
            .with_respect(0.0)
            .with_members(0);

        let rating = compute_power_rating(&faction, &config());
        assert!((rating - FLOOR_POWER_RATING).abs() < 1e-12);
    }

    #[test]
    fn test_missing_respect_equals_one_million() {
        let missing = FactionSnapshot::new("3", "A").with_rank(Rank::GoldI);
        let explicit = missing.clone().with_respect(1_000_000.0);

        assert_eq!(
            compute_power_rating(&missing, &config()),
            compute_power_rating(&explicit, &config())
        );
    }

    #[test]
    fn test_position_breakpoints() {
        let scale = PositionScale::default();
        assert_eq!(position_multiplier(1, &scale), 1.20);
        assert_eq!(position_multiplier(20, &scale), 1.20);
        assert_eq!(position_multiplier(21, &scale), 1.10);
        assert_eq!(position_multiplier(100, &scale), 1.05);
        assert_eq!(position_multiplier(200, &scale), 1.00);
        assert_eq!(position_multiplier(300, &scale), 0.95);
        assert_eq!(position_multiplier(1000, &scale), 0.85);
        assert_eq!(position_multiplier(1001, &scale), 0.70);
    }

    #[test]
    fn test_member_efficiency_curve() {
        let scale = MemberScale::default();
        assert_eq!(member_efficiency(0, &scale), 0.10);
        assert!((member_efficiency(20, &scale) - 0.64).abs() < 1e-12);
        assert!((member_efficiency(49, &scale) - 0.698).abs() < 1e-12);
        assert_eq!(member_efficiency(50, &scale), 0.80);
        assert_eq!(member_efficiency(75, &scale), 0.85);
        assert_eq!(member_efficiency(99, &scale), 0.95);
        assert_eq!(member_efficiency(100, &scale), 1.0);
        assert_eq!(member_efficiency(250, &scale), 1.0);
    }

    #[test]
    fn test_member_efficiency_never_decreases() {
        let scale = MemberScale::default();
        let mut previous = 0.0;
        for members in 0..=150 {
            let efficiency = member_efficiency(members, &scale);
            assert!(efficiency >= previous, "efficiency dropped at {members}");
            previous = efficiency;
        }
    }

    #[test]
    fn test_rank_missing_from_table_uses_unranked() {
        let mut table = BTreeMap::new();
        table.insert(Rank::Unranked, 0.02);
        table.insert(Rank::Gold, 0.4);

        assert_eq!(rank_multiplier(Rank::Gold, &table), 0.4);
        assert_eq!(rank_multiplier(Rank::DiamondII, &table), 0.02);
    }
}
