//! War Odds Core - betting odds for two-faction ranked wars.
//!
//! Faction snapshots are reduced to a power rating, turned into a clamped
//! win probability, marked up by the house edge and quoted as decimal odds
//! with illustrative payouts. Python bindings are available behind the
//! `python` feature.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod faction;
pub mod house_edge;
pub mod odds;
pub mod payout;
pub mod power_rating;
pub mod quote;
pub mod random;
pub mod source;
pub mod win_prob;

#[cfg(feature = "python")]
mod python;

pub use config::{BlendWeights, EngineConfig, OddsMode, ProbabilityModel, Profile};
pub use engine::{EngineHealth, OddsEngine};
pub use error::{ConfigError, ContractError, EngineError, Result};
pub use faction::{FactionId, FactionSnapshot, Rank};
pub use house_edge::{apply_house_edge, ImpliedProbabilities};
pub use odds::{quote_odds, snap_to_ladder, to_decimal_odds};
pub use payout::{betting_examples, calculate_payout, checked_stake, clean_bets, BettingExample, Payout};
pub use power_rating::{compute_power_rating, power_breakdown, PowerBreakdown};
pub use quote::{OddsQuote, QuoteMetadata, SideQuote};
pub use random::{seeded_rng, FixedSource, RandomSource};
pub use source::{CachedFactionSource, FactionSource, InMemoryFactionSource};
pub use win_prob::{confidence, estimate_win_probability, probability_confidence, WinProbability};
