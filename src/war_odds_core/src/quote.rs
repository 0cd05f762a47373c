use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{OddsMode, Profile};
use crate::faction::FactionId;
use crate::payout::BettingExample;
use crate::power_rating::PowerBreakdown;

/// One side of a published quote.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideQuote {
    pub faction_id: FactionId,
    pub name: String,
    /// Displayed decimal odds, always > 1.0
    pub decimal_odds: f64,
    /// Probability including the house edge
    pub implied_probability: f64,
    /// Edge-free probability after variance and clamping
    pub true_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<PowerBreakdown>,
    pub betting_examples: Vec<BettingExample>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMetadata {
    pub target_house_edge: f64,
    /// Edge carried by the implied probabilities; below target when the
    /// implied-probability ceiling forced a rescale
    pub realized_house_edge: f64,
    /// Edge encoded by the displayed (rounded or snapped) odds
    pub quoted_overround: f64,
    pub total_implied_probability: f64,
    /// 0 (even matchup) to 100 (lopsided)
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_ratio: Option<f64>,
    pub profile: Profile,
    pub odds_mode: OddsMode,
    pub fallback: bool,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// Published odds for a two-faction matchup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsQuote {
    pub side_a: SideQuote,
    pub side_b: SideQuote,
    pub metadata: QuoteMetadata,
}

impl OddsQuote {
    pub fn side(&self, id: &FactionId) -> Option<&SideQuote> {
        [&self.side_a, &self.side_b]
            .into_iter()
            .find(|side| &side.faction_id == id)
    }

    pub fn is_fallback(&self) -> bool {
        self.metadata.fallback
    }
}
