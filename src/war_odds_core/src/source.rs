//! Faction lookup collaborators.
//!
//! The engine never performs I/O itself; it asks a [`FactionSource`] for
//! already-resolved snapshots. Storage, freshness and caching live here.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::faction::{FactionId, FactionSnapshot};

/// Default lifetime of a cached snapshot
pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;

pub trait FactionSource: Send + Sync {
    /// `None` when the faction is unknown.
    fn get_faction(&self, id: &FactionId) -> Option<FactionSnapshot>;

    /// Number of factions known to the source, when it can tell cheaply.
    fn faction_count(&self) -> Option<usize> {
        None
    }

    /// Snapshots currently held by a caching layer, if there is one.
    fn cached_entries(&self) -> Option<usize> {
        None
    }
}

impl<S: FactionSource + ?Sized> FactionSource for Arc<S> {
    fn get_faction(&self, id: &FactionId) -> Option<FactionSnapshot> {
        (**self).get_faction(id)
    }

    fn faction_count(&self) -> Option<usize> {
        (**self).faction_count()
    }

    fn cached_entries(&self) -> Option<usize> {
        (**self).cached_entries()
    }
}

/// Roster document as exported by the faction fetcher.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Roster {
    factions: Vec<FactionSnapshot>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Snapshots held in memory, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFactionSource {
    factions: HashMap<FactionId, FactionSnapshot>,
}

impl InMemoryFactionSource {
    pub fn new(factions: impl IntoIterator<Item = FactionSnapshot>) -> Self {
        InMemoryFactionSource {
            factions: factions.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }

    /// Parse a `{ "factions": [...] }` roster document.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let roster: Roster = serde_json::from_str(json)?;
        debug!(
            factions = roster.factions.len(),
            last_updated = roster.last_updated.as_deref().unwrap_or("unknown"),
            "loaded faction roster"
        );
        Ok(Self::new(roster.factions))
    }

    pub fn insert(&mut self, faction: FactionSnapshot) {
        self.factions.insert(faction.id.clone(), faction);
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }
}

impl FactionSource for InMemoryFactionSource {
    fn get_faction(&self, id: &FactionId) -> Option<FactionSnapshot> {
        self.factions.get(id).cloned()
    }

    fn faction_count(&self) -> Option<usize> {
        Some(self.factions.len())
    }
}

#[derive(Clone, Debug)]
struct CachedEntry {
    snapshot: FactionSnapshot,
    fetched_at: DateTime<Utc>,
}

/// Read-through cache with a time-to-live in front of another source.
///
/// Lookups take a shared lock; only misses take the write lock. Unknown
/// factions are not cached.
#[derive(Debug)]
pub struct CachedFactionSource<S> {
    inner: S,
    entries: RwLock<HashMap<FactionId, CachedEntry>>,
    ttl: Duration,
}

impl<S: FactionSource> CachedFactionSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        CachedFactionSource {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_default_ttl(inner: S) -> Self {
        Self::new(inner, Duration::seconds(DEFAULT_CACHE_TTL_SECS))
    }

    fn fresh(&self, id: &FactionId, now: DateTime<Utc>) -> Option<FactionSnapshot> {
        let entries = self.entries.read();
        let entry = entries.get(id)?;

        if entry.fetched_at + self.ttl <= now {
            return None;
        }

        Some(entry.snapshot.clone())
    }

    /// Drop every cached snapshot.
    pub fn clear(&self) {
        self.entries.write().clear();
        debug!("faction cache cleared");
    }

    /// Drop expired snapshots, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at + self.ttl > now);
        before - entries.len()
    }

    /// Number of cached snapshots, including expired ones not yet evicted.
    pub fn cached(&self) -> usize {
        self.entries.read().len()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: FactionSource> FactionSource for CachedFactionSource<S> {
    fn get_faction(&self, id: &FactionId) -> Option<FactionSnapshot> {
        let now = Utc::now();

        if let Some(snapshot) = self.fresh(id, now) {
            trace!(faction = %id, "faction cache hit");
            return Some(snapshot);
        }

        trace!(faction = %id, "faction cache miss");
        let Some(snapshot) = self.inner.get_faction(id) else {
            if self.entries.write().remove(id).is_some() {
                debug!(faction = %id, "dropped stale snapshot for vanished faction");
            }
            return None;
        };

        self.entries.write().insert(
            id.clone(),
            CachedEntry {
                snapshot: snapshot.clone(),
                fetched_at: now,
            },
        );

        Some(snapshot)
    }

    fn faction_count(&self) -> Option<usize> {
        self.inner.faction_count()
    }

    fn cached_entries(&self) -> Option<usize> {
        Some(self.cached())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Rank;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ROSTER: &str = r#"{
        "lastUpdated": "2025-06-01T00:00:00Z",
        "factions": [
            {"id": 8151, "name": "Reapers", "respect": 12500000, "rank": "Diamond II", "members": 98, "position": 14},
            {"id": "42", "name": "Sparse"}
        ]
    }"#;

    /// Counts lookups that reach the underlying store.
    struct CountingSource {
        inner: InMemoryFactionSource,
        hits: AtomicUsize,
    }

    impl FactionSource for CountingSource {
        fn get_faction(&self, id: &FactionId) -> Option<FactionSnapshot> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.inner.get_faction(id)
        }
    }

    fn counting() -> CountingSource {
        CountingSource {
            inner: InMemoryFactionSource::from_json(ROSTER).unwrap(),
            hits: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_roster_parsing() {
        let source = InMemoryFactionSource::from_json(ROSTER).unwrap();
        assert_eq!(source.len(), 2);

        let reapers = source.get_faction(&FactionId::new("8151")).unwrap();
        assert_eq!(reapers.rank, Some(Rank::DiamondII));
        assert_eq!(reapers.members, Some(98));

        let sparse = source.get_faction(&"42".into()).unwrap();
        assert_eq!(sparse.respect, None);
    }

    #[test]
    fn test_bad_roster_is_error() {
        assert!(matches!(
            InMemoryFactionSource::from_json("{\"factions\": 3}"),
            Err(EngineError::Roster(_))
        ));
    }

    #[test]
    fn test_unknown_faction() {
        let source = InMemoryFactionSource::from_json(ROSTER).unwrap();
        assert!(source.get_faction(&"999".into()).is_none());
    }

    #[test]
    fn test_cache_serves_repeat_lookups() {
        let cache = CachedFactionSource::with_default_ttl(counting());
        let id = FactionId::new("8151");

        assert!(cache.get_faction(&id).is_some());
        assert!(cache.get_faction(&id).is_some());
        assert!(cache.get_faction(&id).is_some());

        assert_eq!(cache.inner().hits.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached(), 1);
    }

    #[test]
    fn test_zero_ttl_always_refetches() {
        let cache = CachedFactionSource::new(counting(), Duration::zero());
        let id = FactionId::new("8151");

        cache.get_faction(&id);
        cache.get_faction(&id);

        assert_eq!(cache.inner().hits.load(Ordering::SeqCst), 2);
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.cached(), 0);
    }

    #[test]
    fn test_misses_not_cached() {
        let cache = CachedFactionSource::with_default_ttl(counting());
        let id = FactionId::new("404");

        assert!(cache.get_faction(&id).is_none());
        assert!(cache.get_faction(&id).is_none());

        assert_eq!(cache.inner().hits.load(Ordering::SeqCst), 2);
        assert_eq!(cache.cached(), 0);
    }

    #[test]
    fn test_clear() {
        let cache = CachedFactionSource::with_default_ttl(counting());
        cache.get_faction(&"42".into());
        assert_eq!(cache.cached(), 1);

        cache.clear();
        assert_eq!(cache.cached(), 0);
    }

    #[test]
    fn test_concurrent_reads() {
        let cache = Arc::new(CachedFactionSource::with_default_ttl(counting()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_faction(&"8151".into()).is_some())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.cached(), 1);
    }

    /// Source whose roster can change between lookups.
    struct ShrinkingSource {
        roster: RwLock<InMemoryFactionSource>,
    }

    impl FactionSource for ShrinkingSource {
        fn get_faction(&self, id: &FactionId) -> Option<FactionSnapshot> {
            self.roster.read().get_faction(id)
        }
    }

    #[test]
    fn test_expired_entry_dropped_when_faction_vanishes() {
        let source = ShrinkingSource {
            roster: RwLock::new(InMemoryFactionSource::from_json(ROSTER).unwrap()),
        };
        let cache = CachedFactionSource::new(source, Duration::zero());
        let id = FactionId::new("8151");

        assert!(cache.get_faction(&id).is_some());
        assert_eq!(cache.cached(), 1);

        *cache.inner().roster.write() = InMemoryFactionSource::default();

        assert!(cache.get_faction(&id).is_none());
        assert_eq!(cache.cached(), 0);
    }

    #[test]
    fn test_cached_entries_reported() {
        let cache = CachedFactionSource::with_default_ttl(counting());
        assert_eq!(cache.cached_entries(), Some(0));
        cache.get_faction(&"42".into());
        assert_eq!(cache.cached_entries(), Some(1));
        assert_eq!(cache.inner().cached_entries(), None);
    }
}
