use crate::faction::Rank;

/// Respect assumed when a faction reports none (rating baseline of 1.0)
pub const DEFAULT_RESPECT: f64 = 1_000_000.0;

/// Respect is divided by this before it enters the power rating
pub const RESPECT_SCALE: f64 = 1_000_000.0;

/// Headcount assumed when a faction reports none
pub const DEFAULT_MEMBERS: u32 = 50;

/// Leaderboard position assumed for unranked factions
pub const DEFAULT_POSITION: u32 = 2000;

/// Default operator margin (6%)
pub const DEFAULT_HOUSE_EDGE: f64 = 0.06;

/// Maximum symmetric perturbation applied to the true probability (±1.5 points)
pub const DEFAULT_VARIANCE: f64 = 0.015;

/// Smallest decimal odds ever displayed
pub const MIN_DECIMAL_ODDS: f64 = 1.01;

/// Currency value of one betting unit (one Xanax at the reference market price)
pub const DEFAULT_UNIT_VALUE: u64 = 744_983;

/// Stake sizes, in betting units, used for payout examples
pub const STAKE_UNITS: [u64; 5] = [1, 2, 3, 5, 10];

/// Number of payout examples attached to a quote side
pub const MAX_EXAMPLES: usize = 3;

/// Rounding slack (in units) under which a return counts as whole
pub const WHOLE_RETURN_TOLERANCE: f64 = 0.01;

/// Rating of a faction with every field defaulted:
/// 1.0 respect score, Unranked, position 2000, 50 members.
pub const FLOOR_POWER_RATING: f64 = 1.0 * 0.02 * 0.70 * 0.80;

pub const ENGINE_VERSION: &str = "4.1";

/// Rank multipliers, weakest tier first
pub const RANK_MULTIPLIERS: [(Rank, f64); 21] = [
    (Rank::Unranked, 0.02),
    (Rank::Bronze, 0.03),
    (Rank::BronzeI, 0.05),
    (Rank::BronzeII, 0.08),
    (Rank::BronzeIII, 0.10),
    (Rank::Silver, 0.15),
    (Rank::SilverI, 0.20),
    (Rank::SilverII, 0.25),
    (Rank::SilverIII, 0.30),
    (Rank::Gold, 0.40),
    (Rank::GoldI, 0.45),
    (Rank::GoldII, 0.50),
    (Rank::GoldIII, 0.60),
    (Rank::Platinum, 0.80),
    (Rank::PlatinumI, 0.85),
    (Rank::PlatinumII, 0.90),
    (Rank::PlatinumIII, 1.00),
    (Rank::Diamond, 1.20),
    (Rank::DiamondI, 1.30),
    (Rank::DiamondII, 1.40),
    (Rank::DiamondIII, 1.50),
];

/// (max position, multiplier) pairs, best bucket first
pub const POSITION_BREAKPOINTS: [(u32, f64); 6] = [
    (20, 1.20),
    (50, 1.10),
    (100, 1.05),
    (200, 1.00),
    (500, 0.95),
    (1000, 0.85),
];

/// Multiplier for positions past the last breakpoint
pub const DEEP_POSITION_MULTIPLIER: f64 = 0.70;

/// Headcount at which member efficiency saturates
pub const FULL_ROSTER: u32 = 100;

/// (min members, efficiency) steps below a full roster, largest first
pub const MEMBER_STEPS: [(u32, f64); 4] = [(90, 0.95), (80, 0.90), (70, 0.85), (50, 0.80)];

/// Efficiency of a small roster is `SMALL_ROSTER_BASE + members / 100 * SMALL_ROSTER_SLOPE`
pub const SMALL_ROSTER_BASE: f64 = 0.60;
pub const SMALL_ROSTER_SLOPE: f64 = 0.20;

/// Efficiency of an empty roster
pub const EMPTY_ROSTER_EFFICIENCY: f64 = 0.10;

/// Odds that pay whole units on small whole-unit stakes
pub const CLEAN_ODDS_LADDER: [f64; 22] = [
    1.25, 1.33, 1.50, 1.67, 1.75, 1.80, 1.90, 2.00, 2.10, 2.20, 2.30, 2.40, 2.50, 2.60, 2.70,
    2.80, 2.90, 3.00, 3.25, 3.50, 4.00, 5.00,
];

/// Odds that snapped ladders break ties toward
pub const EVEN_MONEY: f64 = 2.00;
