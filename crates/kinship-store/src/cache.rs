//! Read-through caching for member stores.
//!
//! Wraps any [`MemberStore`] with LRU caches for member lookups and child
//! lists, each entry expiring after a time-to-live. Spousal links and
//! founders are always read from the inner store.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use kinship::{Member, MemberId, SpousalLink};
use kinship_engine::{MemberStore, StoreResult};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{trace, warn};

/// Configuration for [`CachedStore`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum entries per cache (members and child lists are sized
    /// separately).
    pub max_entries: usize,
    /// Time-to-live for cached entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(300),
        }
    }
}

/// A cached value with expiration tracking.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

type Slot<T> = Mutex<LruCache<MemberId, CacheEntry<T>>>;

/// Thread-safe read-through cache in front of a [`MemberStore`].
///
/// Absent members are cached too, so callers must [`invalidate`] every
/// member they write, or [`clear`] after bulk changes.
///
/// [`invalidate`]: CachedStore::invalidate
/// [`clear`]: CachedStore::clear
///
/// # Example
///
/// ```ignore
/// use kinship_engine::GenealogyEngine;
/// use kinship_store::{CacheConfig, CachedStore, InMemoryStore};
///
/// let cached = CachedStore::new(store, CacheConfig::default());
/// let engine = GenealogyEngine::new(&cached);
/// engine.build_tree(None)?;
///
/// let stats = cached.stats();
/// println!("{} hits, {} misses", stats.hits, stats.misses);
/// ```
pub struct CachedStore<S> {
    inner: S,
    members: Slot<Option<Member>>,
    children: Slot<Vec<Member>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: MemberStore> CachedStore<S> {
    /// Wraps `inner` with the given configuration.
    pub fn new(inner: S, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            members: Mutex::new(LruCache::new(capacity)),
            children: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Wraps `inner` with the default configuration.
    pub fn with_defaults(inner: S) -> Self {
        Self::new(inner, CacheConfig::default())
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the wrapped store for writing. Invalidate what you change.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps the store, dropping the caches.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Drops everything cached about `id`. Call it after writing the member.
    ///
    /// Removes the member entry, the member's child list and the child lists
    /// of every parent on either the cached record or the stored one, so a
    /// new child shows up under its parents. When a write moves a member
    /// between parents and the old record was never cached, invalidate the
    /// old parents as well.
    pub fn invalidate(&self, id: MemberId) {
        let cached = self.members.lock().pop(&id).and_then(|entry| entry.value);
        let stored = match self.inner.get_member(id) {
            Ok(member) => member,
            Err(err) => {
                warn!(member = id, error = %err, "fresh read failed, dropping every child list");
                self.children.lock().clear();
                return;
            }
        };

        let mut children = self.children.lock();
        children.pop(&id);
        for member in cached.iter().chain(stored.iter()) {
            for (_, parent) in member.parent_ids() {
                children.pop(&parent);
            }
        }
        trace!(member = id, "cache invalidated");
    }

    /// Clears both caches. Hit and miss counters are kept.
    pub fn clear(&self) {
        self.members.lock().clear();
        self.children.lock().clear();
    }

    /// Removes expired entries from both caches.
    pub fn cleanup_expired(&self) {
        purge(&self.members, self.ttl);
        purge(&self.children, self.ttl);
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (member_entries, expired_members) = count(&self.members, self.ttl);
        let (children_entries, expired_children) = count(&self.children, self.ttl);
        CacheStats {
            member_entries,
            children_entries,
            expired_entries: expired_members + expired_children,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn read_through<T: Clone>(
        &self,
        slot: &Slot<T>,
        id: MemberId,
        load: impl FnOnce() -> StoreResult<T>,
    ) -> StoreResult<T> {
        {
            let mut cache = slot.lock();
            if let Some(entry) = cache.get(&id) {
                if !entry.is_expired(self.ttl) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(entry.value.clone());
                }
                cache.pop(&id);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // The lock is not held across the inner read; a concurrent miss on
        // the same key loads twice and the last write wins.
        let value = load()?;
        slot.lock().put(id, CacheEntry::new(value.clone()));
        Ok(value)
    }
}

fn purge<T: Clone>(slot: &Slot<T>, ttl: Duration) {
    let mut cache = slot.lock();
    let expired: Vec<MemberId> = cache
        .iter()
        .filter(|(_, entry)| entry.is_expired(ttl))
        .map(|(&id, _)| id)
        .collect();
    for id in expired {
        cache.pop(&id);
    }
}

fn count<T: Clone>(slot: &Slot<T>, ttl: Duration) -> (usize, usize) {
    let cache = slot.lock();
    let expired = cache
        .iter()
        .filter(|(_, entry)| entry.is_expired(ttl))
        .count();
    (cache.len(), expired)
}

impl<S: MemberStore> MemberStore for CachedStore<S> {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        self.read_through(&self.members, id, || self.inner.get_member(id))
    }

    fn list_children(&self, parent_id: MemberId) -> StoreResult<Vec<Member>> {
        self.read_through(&self.children, parent_id, || self.inner.list_children(parent_id))
    }

    fn list_spousal_links(&self, member_id: MemberId) -> StoreResult<Vec<SpousalLink>> {
        self.inner.list_spousal_links(member_id)
    }

    fn get_spousal_link(&self, a: MemberId, b: MemberId) -> StoreResult<Option<SpousalLink>> {
        self.inner.get_spousal_link(a, b)
    }

    fn list_founders(&self) -> StoreResult<Vec<Member>> {
        self.inner.list_founders()
    }
}

impl<S> std::fmt::Debug for CachedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedStore")
            .field("members", &self.members.lock().len())
            .field("children", &self.children.lock().len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Statistics about the cache state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached member lookups, including absent members.
    pub member_entries: usize,
    /// Cached child lists.
    pub children_entries: usize,
    /// Entries past their TTL that have not been purged yet.
    pub expired_entries: usize,
    /// Reads served from the cache.
    pub hits: u64,
    /// Reads forwarded to the inner store.
    pub misses: u64,
}
