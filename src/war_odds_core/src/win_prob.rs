use serde::Serialize;
use tracing::debug;

use crate::config::{BlendWeights, EngineConfig};
use crate::faction::FactionSnapshot;
use crate::power_rating::rank_multiplier;
use crate::random::RandomSource;

/// Complementary win probabilities for a matchup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinProbability {
    pub prob_a: f64,
    pub prob_b: f64,
    /// Side A before variance and clamping
    pub raw_a: f64,
    pub perturbation: f64,
}

impl WinProbability {
    pub const EVEN: WinProbability = WinProbability {
        prob_a: 0.5,
        prob_b: 0.5,
        raw_a: 0.5,
        perturbation: 0.0,
    };
}

/// Probability that faction A beats faction B given their power ratings.
///
/// `ratingA / (ratingA + ratingB)`, perturbed by at most `config.variance`
/// and clamped into the configured band. Only side A is clamped; side B is
/// always `1 - A`. Two zero ratings carry no information and return exactly
/// 50/50 without drawing from `rng`. Negative or non-finite ratings count
/// as zero.
pub fn estimate_win_probability<R: RandomSource + ?Sized>(
    rating_a: f64,
    rating_b: f64,
    config: &EngineConfig,
    rng: &mut R,
) -> WinProbability {
    let a = sanitize_rating(rating_a);
    let b = sanitize_rating(rating_b);

    if a + b == 0.0 {
        debug!("both ratings are zero, using 50/50 split");
        return WinProbability::EVEN;
    }

    perturb_and_clamp(a / (a + b), config, rng)
}

fn sanitize_rating(rating: f64) -> f64 {
    if rating.is_finite() && rating > 0.0 {
        rating
    } else {
        0.0
    }
}

/// Apply market noise to a raw probability and clamp it into the band.
pub fn perturb_and_clamp<R: RandomSource + ?Sized>(
    raw_a: f64,
    config: &EngineConfig,
    rng: &mut R,
) -> WinProbability {
    let perturbation = if config.variance > 0.0 {
        (rng.next_float() - 0.5) * 2.0 * config.variance
    } else {
        0.0
    };

    let (low, high) = config.effective_band();
    let prob_a = (raw_a + perturbation).clamp(low, high);
    let prob_b = 1.0 - prob_a;

    debug!(raw_a, perturbation, prob_a, prob_b, "win probability");

    WinProbability {
        prob_a,
        prob_b,
        raw_a,
        perturbation,
    }
}

/// Raw probability from a weighted mix of rank, respect and roster shares.
///
/// Respect enters through its cube root so that very large respect gaps do
/// not swamp the other components.
pub fn weighted_blend_probability(
    a: &FactionSnapshot,
    b: &FactionSnapshot,
    weights: &BlendWeights,
    config: &EngineConfig,
) -> f64 {
    let rank_share = share(
        rank_multiplier(a.effective_rank(), &config.rank_multipliers),
        rank_multiplier(b.effective_rank(), &config.rank_multipliers),
    );
    let respect_share = share(a.effective_respect().cbrt(), b.effective_respect().cbrt());
    let member_share = share(
        roster_capacity(a.effective_members()),
        roster_capacity(b.effective_members()),
    );

    let total = weights.rank + weights.respect + weights.members;
    let blended =
        (rank_share * weights.rank + respect_share * weights.respect + member_share * weights.members) / total;

    debug!(
        rank_share,
        respect_share,
        member_share,
        blended,
        "weighted blend"
    );

    blended
}

/// `x / (x + y)`, or 0.5 when both are zero.
fn share(x: f64, y: f64) -> f64 {
    let total = x + y;
    if total > 0.0 {
        x / total
    } else {
        0.5
    }
}

/// Linear up to 25 members, square-root growth past that.
fn roster_capacity(members: u32) -> f64 {
    let members = members as f64;
    if members <= 25.0 {
        members
    } else {
        25.0 + (members - 25.0).sqrt() * 2.0
    }
}

/// How lopsided a matchup is, 0 (even) to 100.
///
/// `min(100, round(|ln(ratingA / ratingB)| * 30))`. A single zero rating is
/// maximally lopsided; two zero ratings are even.
pub fn confidence(rating_a: f64, rating_b: f64) -> u8 {
    let a = sanitize_rating(rating_a);
    let b = sanitize_rating(rating_b);

    match (a > 0.0, b > 0.0) {
        (false, false) => 0,
        (true, false) | (false, true) => 100,
        (true, true) => ((a / b).ln().abs() * 30.0).round().min(100.0) as u8,
    }
}

/// How far a priced probability sits from even money, 0 to 100.
///
/// `round(|p - 0.5| * 200)`, used when the price does not come from a
/// rating ratio.
pub fn probability_confidence(prob_a: f64) -> u8 {
    if !prob_a.is_finite() {
        return 0;
    }
    ((prob_a - 0.5).abs() * 200.0).round().min(100.0) as u8
}
