use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::{DEFAULT_MEMBERS, DEFAULT_POSITION, DEFAULT_RESPECT};

/// Faction identifier. Rosters carry either integers or strings; both
/// normalize to the same textual id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawFactionId", into = "String")]
pub struct FactionId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFactionId {
    Number(u64),
    Text(String),
}

impl From<RawFactionId> for FactionId {
    fn from(raw: RawFactionId) -> Self {
        match raw {
            RawFactionId::Number(n) => FactionId(n.to_string()),
            RawFactionId::Text(s) => FactionId(s.trim().to_string()),
        }
    }
}

impl From<FactionId> for String {
    fn from(id: FactionId) -> Self {
        id.0
    }
}

impl FactionId {
    pub fn new(id: impl Into<String>) -> Self {
        FactionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactionId {
    fn from(s: &str) -> Self {
        FactionId(s.to_string())
    }
}

impl From<u64> for FactionId {
    fn from(n: u64) -> Self {
        FactionId(n.to_string())
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ranked-war tier, weakest first. The derived ordering is the tier ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    #[default]
    Unranked,
    Bronze,
    BronzeI,
    BronzeII,
    BronzeIII,
    Silver,
    SilverI,
    SilverII,
    SilverIII,
    Gold,
    GoldI,
    GoldII,
    GoldIII,
    Platinum,
    PlatinumI,
    PlatinumII,
    PlatinumIII,
    Diamond,
    DiamondI,
    DiamondII,
    DiamondIII,
}

impl Rank {
    pub const ALL: [Rank; 21] = [
        Rank::Unranked,
        Rank::Bronze,
        Rank::BronzeI,
        Rank::BronzeII,
        Rank::BronzeIII,
        Rank::Silver,
        Rank::SilverI,
        Rank::SilverII,
        Rank::SilverIII,
        Rank::Gold,
        Rank::GoldI,
        Rank::GoldII,
        Rank::GoldIII,
        Rank::Platinum,
        Rank::PlatinumI,
        Rank::PlatinumII,
        Rank::PlatinumIII,
        Rank::Diamond,
        Rank::DiamondI,
        Rank::DiamondII,
        Rank::DiamondIII,
    ];

    /// Display label as it appears in game data, e.g. "Gold II".
    pub fn label(self) -> &'static str {
        match self {
            Rank::Unranked => "Unranked",
            Rank::Bronze => "Bronze",
            Rank::BronzeI => "Bronze I",
            Rank::BronzeII => "Bronze II",
            Rank::BronzeIII => "Bronze III",
            Rank::Silver => "Silver",
            Rank::SilverI => "Silver I",
            Rank::SilverII => "Silver II",
            Rank::SilverIII => "Silver III",
            Rank::Gold => "Gold",
            Rank::GoldI => "Gold I",
            Rank::GoldII => "Gold II",
            Rank::GoldIII => "Gold III",
            Rank::Platinum => "Platinum",
            Rank::PlatinumI => "Platinum I",
            Rank::PlatinumII => "Platinum II",
            Rank::PlatinumIII => "Platinum III",
            Rank::Diamond => "Diamond",
            Rank::DiamondI => "Diamond I",
            Rank::DiamondII => "Diamond II",
            Rank::DiamondIII => "Diamond III",
        }
    }

    /// Parse a tier label. Matching ignores case and extra whitespace;
    /// anything unrecognised is `Unranked`.
    pub fn from_label(label: &str) -> Rank {
        let normalized: Vec<String> = label
            .split_whitespace()
            .map(|part| part.to_ascii_lowercase())
            .collect();
        let normalized = normalized.join(" ");

        Rank::ALL
            .into_iter()
            .find(|rank| rank.label().to_ascii_lowercase() == normalized)
            .unwrap_or(Rank::Unranked)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Rank::from_label(&label))
    }
}

/// Faction attributes as supplied by the roster.
///
/// Missing or non-positive numeric fields are not errors; the accessors
/// substitute documented defaults so the engine always works with
/// finite, positive values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionSnapshot {
    pub id: FactionId,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub respect: Option<f64>,

    #[serde(default)]
    pub rank: Option<Rank>,

    #[serde(default)]
    pub members: Option<i64>,

    /// Leaderboard position, 1 = best
    #[serde(default)]
    pub position: Option<i64>,
}

fn default_name() -> String {
    "Unknown Faction".to_string()
}

impl FactionSnapshot {
    /// Snapshot with only an id; every attribute takes its default.
    pub fn new(id: impl Into<FactionId>, name: impl Into<String>) -> Self {
        FactionSnapshot {
            id: id.into(),
            name: name.into(),
            respect: None,
            rank: None,
            members: None,
            position: None,
        }
    }

    pub fn with_respect(mut self, respect: f64) -> Self {
        self.respect = Some(respect);
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_members(mut self, members: i64) -> Self {
        self.members = Some(members);
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn effective_respect(&self) -> f64 {
        match self.respect {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => DEFAULT_RESPECT,
        }
    }

    pub fn effective_rank(&self) -> Rank {
        self.rank.unwrap_or_default()
    }

    pub fn effective_members(&self) -> u32 {
        match self.members {
            Some(m) if m > 0 => u32::try_from(m).unwrap_or(u32::MAX),
            _ => DEFAULT_MEMBERS,
        }
    }

    pub fn effective_position(&self) -> u32 {
        match self.position {
            Some(p) if p > 0 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => DEFAULT_POSITION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::Unranked < Rank::Bronze);
        assert!(Rank::BronzeIII < Rank::Silver);
        assert!(Rank::GoldI < Rank::GoldIII);
        assert!(Rank::PlatinumIII < Rank::Diamond);
        assert_eq!(Rank::ALL.iter().max(), Some(&Rank::DiamondIII));
    }

    #[test]
    fn test_rank_label_roundtrip() {
        for rank in Rank::ALL {
            assert_eq!(Rank::from_label(rank.label()), rank);
        }
    }

    #[test]
    fn test_rank_parse_is_lenient() {
        assert_eq!(Rank::from_label("  diamond   iii "), Rank::DiamondIII);
        assert_eq!(Rank::from_label("Mythic"), Rank::Unranked);
        assert_eq!(Rank::from_label(""), Rank::Unranked);
    }

    #[test]
    fn test_defaults_applied() {
        let faction = FactionSnapshot::new("7", "Empty")
            .with_respect(0.0)
            .with_members(0)
            .with_position(-3);

        assert_eq!(faction.effective_respect(), DEFAULT_RESPECT);
        assert_eq!(faction.effective_members(), DEFAULT_MEMBERS);
        assert_eq!(faction.effective_position(), DEFAULT_POSITION);
        assert_eq!(faction.effective_rank(), Rank::Unranked);
    }

    #[test]
    fn test_nan_respect_defaults() {
        let faction = FactionSnapshot::new("1", "Broken").with_respect(f64::NAN);
        assert_eq!(faction.effective_respect(), DEFAULT_RESPECT);
    }

    #[test]
    fn test_deserialize_numeric_id_and_sparse_fields() {
        let json = r#"{"id": 9001, "rank": "Gold II", "members": 42}"#;
        let faction: FactionSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(faction.id, FactionId::new("9001"));
        assert_eq!(faction.name, "Unknown Faction");
        assert_eq!(faction.rank, Some(Rank::GoldII));
        assert_eq!(faction.members, Some(42));
        assert_eq!(faction.respect, None);
    }

    #[test]
    fn test_deserialize_unknown_rank() {
        let json = r#"{"id": "abc", "name": "X", "rank": "Obsidian"}"#;
        let faction: FactionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(faction.rank, Some(Rank::Unranked));
    }

    #[test]
    fn test_serialize_rank_as_label() {
        let faction = FactionSnapshot::new(12u64, "Twelve").with_rank(Rank::SilverII);
        let json = serde_json::to_value(&faction).unwrap();
        assert_eq!(json["rank"], "Silver II");
        assert_eq!(json["id"], "12");
    }
}
