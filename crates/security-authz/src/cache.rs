//! Security cache
//!
//! Holds rule entries per level and settled access per (user, level).
//!
//! Every invalidation bumps a generation counter. Loaders read the
//! generation before reading rules and pass it back when inserting; an
//! insert carrying an older generation is rejected, so an entry computed
//! from rules that were invalidated meanwhile never lands in the cache.

use dashmap::DashMap;
use parking_lot::RwLock;
use security_model::UserReference;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::access::SecurityAccessEntry;
use crate::error::AuthorizationResult;
use crate::hierarchy::SecurityReference;
use crate::rule::SecurityRuleEntry;

/// What an invalidation removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationScope {
    /// The level and everything below it. The farm root clears everything.
    Entity(SecurityReference),
    /// Every access entry of a user.
    User(UserReference),
    /// The whole cache.
    All,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub rejected_inserts: u64,
    pub evictions: u64,
    pub rule_entries: usize,
    pub access_entries: usize,
    pub generation: u64,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Storage for rule entries and settled access.
pub trait SecurityCache: Send + Sync {
    /// Current generation, to be read before loading.
    fn generation(&self) -> u64;

    fn get_rules(&self, reference: &SecurityReference) -> AuthorizationResult<Option<Arc<SecurityRuleEntry>>>;

    /// Insert a rule entry loaded at `generation`.
    ///
    /// Returns `false` when the entry was rejected as stale.
    fn put_rules(&self, entry: Arc<SecurityRuleEntry>, generation: u64) -> AuthorizationResult<bool>;

    fn get_access(
        &self,
        user: &UserReference,
        reference: &SecurityReference,
    ) -> AuthorizationResult<Option<Arc<SecurityAccessEntry>>>;

    /// Insert an access entry settled at `generation`.
    ///
    /// Returns `false` when the entry was rejected as stale.
    fn put_access(&self, entry: Arc<SecurityAccessEntry>, generation: u64) -> AuthorizationResult<bool>;

    fn invalidate(&self, scope: &InvalidationScope);

    fn stats(&self) -> CacheStats;
}

type AccessKey = (UserReference, SecurityReference);

/// In-process security cache backed by `DashMap`.
pub struct MemorySecurityCache {
    rules: DashMap<SecurityReference, Arc<SecurityRuleEntry>>,
    access: DashMap<AccessKey, Arc<SecurityAccessEntry>>,
    generation: AtomicU64,
    /// Inserts hold it shared, invalidations exclusively.
    guard: RwLock<()>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    rejected: AtomicU64,
    evictions: AtomicU64,
}

impl MemorySecurityCache {
    /// Create a cache holding up to `capacity` entries per map.
    pub fn new(capacity: usize) -> Self {
        Self {
            rules: DashMap::new(),
            access: DashMap::new(),
            generation: AtomicU64::new(0),
            guard: RwLock::new(()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn record<T>(&self, found: Option<T>) -> Option<T> {
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn is_stale(&self, generation: u64) -> bool {
        if self.generation.load(Ordering::Acquire) != generation {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Drop about a tenth of the map when it is full.
    fn evict<K, V>(&self, map: &DashMap<K, V>)
    where
        K: Eq + std::hash::Hash,
    {
        if map.len() < self.capacity {
            return;
        }
        let to_remove = (self.capacity / 10).max(1);
        let mut removed = 0;
        map.retain(|_, _| {
            if removed < to_remove {
                removed += 1;
                false
            } else {
                true
            }
        });
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        debug!(removed, capacity = self.capacity, "Evicted security cache entries");
    }
}

impl Default for MemorySecurityCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl SecurityCache for MemorySecurityCache {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn get_rules(&self, reference: &SecurityReference) -> AuthorizationResult<Option<Arc<SecurityRuleEntry>>> {
        Ok(self.record(self.rules.get(reference).map(|entry| Arc::clone(entry.value()))))
    }

    fn put_rules(&self, entry: Arc<SecurityRuleEntry>, generation: u64) -> AuthorizationResult<bool> {
        let _shared = self.guard.read();
        if self.is_stale(generation) {
            return Ok(false);
        }
        self.evict(&self.rules);
        self.rules.insert(entry.reference().clone(), entry);
        Ok(true)
    }

    fn get_access(
        &self,
        user: &UserReference,
        reference: &SecurityReference,
    ) -> AuthorizationResult<Option<Arc<SecurityAccessEntry>>> {
        let key = (user.clone(), reference.clone());
        Ok(self.record(self.access.get(&key).map(|entry| Arc::clone(entry.value()))))
    }

    fn put_access(&self, entry: Arc<SecurityAccessEntry>, generation: u64) -> AuthorizationResult<bool> {
        let _shared = self.guard.read();
        if self.is_stale(generation) {
            return Ok(false);
        }
        self.evict(&self.access);
        self.access
            .insert((entry.user().clone(), entry.reference().clone()), entry);
        Ok(true)
    }

    fn invalidate(&self, scope: &InvalidationScope) {
        let _exclusive = self.guard.write();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        match scope {
            InvalidationScope::Entity(reference) if reference.is_farm() => {
                self.rules.clear();
                self.access.clear();
            }
            InvalidationScope::Entity(reference) => {
                self.rules.retain(|level, _| !level.is_within(reference));
                self.access.retain(|(_, level), _| !level.is_within(reference));
            }
            InvalidationScope::User(user) => {
                self.access.retain(|(owner, _), _| owner != user);
            }
            InvalidationScope::All => {
                self.rules.clear();
                self.access.clear();
            }
        }

        debug!(scope = ?scope, generation, "Invalidated security cache");
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            rejected_inserts: self.rejected.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rule_entries: self.rules.len(),
            access_entries: self.access.len(),
            generation: self.generation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::SecurityAccess;
    use crate::hierarchy::{DefaultSecurityHierarchy, SecurityHierarchy};
    use security_model::EntityReference;

    fn level(entity: &EntityReference) -> SecurityReference {
        DefaultSecurityHierarchy::new("xwiki").security_reference(entity).unwrap()
    }

    fn access(user: &str, reference: &SecurityReference) -> Arc<SecurityAccessEntry> {
        Arc::new(SecurityAccessEntry::new(
            UserReference::new(user),
            reference.clone(),
            SecurityAccess::default(),
        ))
    }

    #[test]
    fn test_put_and_get() {
        let cache = MemorySecurityCache::new(100);
        let space = level(&EntityReference::wiki("dev").space("Main"));

        let generation = cache.generation();
        assert!(cache
            .put_rules(Arc::new(SecurityRuleEntry::empty(space.clone())), generation)
            .unwrap());
        assert!(cache.put_access(access("Alice", &space), generation).unwrap());

        assert!(cache.get_rules(&space).unwrap().is_some());
        assert!(cache
            .get_access(&UserReference::new("Alice"), &space)
            .unwrap()
            .is_some());
        assert!(cache
            .get_access(&UserReference::new("Bob"), &space)
            .unwrap()
            .is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_stale_insert_is_rejected() {
        let cache = MemorySecurityCache::new(100);
        let space = level(&EntityReference::wiki("dev").space("Main"));

        let generation = cache.generation();
        cache.invalidate(&InvalidationScope::All);

        assert!(!cache.put_access(access("Alice", &space), generation).unwrap());
        assert!(cache
            .get_access(&UserReference::new("Alice"), &space)
            .unwrap()
            .is_none());
        assert_eq!(cache.stats().rejected_inserts, 1);
    }

    #[test]
    fn test_entity_invalidation_covers_descendants_only() {
        let cache = MemorySecurityCache::new(100);
        let wiki = EntityReference::wiki("dev");
        let main = level(&wiki.space("Main"));
        let page = level(&wiki.space("Main").document("Page"));
        let other = level(&wiki.space("Other"));

        let generation = cache.generation();
        for reference in [&main, &page, &other] {
            cache.put_access(access("Alice", reference), generation).unwrap();
        }

        cache.invalidate(&InvalidationScope::Entity(main.clone()));

        let alice = UserReference::new("Alice");
        assert!(cache.get_access(&alice, &main).unwrap().is_none());
        assert!(cache.get_access(&alice, &page).unwrap().is_none());
        assert!(cache.get_access(&alice, &other).unwrap().is_some());
    }

    #[test]
    fn test_farm_invalidation_clears_everything() {
        let cache = MemorySecurityCache::new(100);
        let hierarchy = DefaultSecurityHierarchy::new("xwiki");
        let page = level(&EntityReference::wiki("dev").space("Main").document("Page"));

        cache.put_access(access("Alice", &page), cache.generation()).unwrap();
        cache.invalidate(&InvalidationScope::Entity(hierarchy.farm()));

        assert_eq!(cache.stats().access_entries, 0);
        assert_eq!(cache.stats().generation, 1);
    }

    #[test]
    fn test_user_invalidation() {
        let cache = MemorySecurityCache::new(100);
        let space = level(&EntityReference::wiki("dev").space("Main"));

        let generation = cache.generation();
        cache.put_access(access("Alice", &space), generation).unwrap();
        cache.put_access(access("Bob", &space), generation).unwrap();

        cache.invalidate(&InvalidationScope::User(UserReference::new("Alice")));

        assert!(cache
            .get_access(&UserReference::new("Alice"), &space)
            .unwrap()
            .is_none());
        assert!(cache
            .get_access(&UserReference::new("Bob"), &space)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_capacity_eviction() {
        let cache = MemorySecurityCache::new(20);
        let wiki = EntityReference::wiki("dev");

        let generation = cache.generation();
        for i in 0..50 {
            let reference = level(&wiki.space(format!("Space{}", i)));
            cache.put_access(access("Alice", &reference), generation).unwrap();
        }

        let stats = cache.stats();
        assert!(stats.access_entries <= 20);
        assert!(stats.evictions > 0);
    }
}
