//! Decision caching for authorization.
//!
//! Caches policy decisions to avoid repeating directory lookups for the same
//! request. The key covers every input the evaluator reads from the actor and
//! the application; facts held by the directory are covered by the TTL only,
//! so keep it short or call [`DecisionCache::invalidate_application`] when
//! affiliations or supervisor profiles change.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use placement_core::{
    Actor, ApplicationId, ApplicationStatus, InternshipApplication, OpportunityHost, Role,
    StudentId, SupervisorId, UserId,
};

use crate::decision::{Action, PolicyDecision};

/// Configuration for the decision cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Time-to-live for cached decisions.
    pub ttl: Duration,
    /// Whether to cache deny decisions.
    pub cache_denies: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(30),
            cache_denies: false,
        }
    }
}

impl CacheConfig {
    /// Create a production cache configuration.
    pub fn production() -> Self {
        Self {
            max_entries: 50_000,
            ttl: Duration::from_secs(10),
            cache_denies: false,
        }
    }

    /// Create a development cache configuration.
    pub fn development() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(5),
            cache_denies: true,
        }
    }

    /// Disable caching.
    pub fn disabled() -> Self {
        Self {
            max_entries: 0,
            ttl: Duration::ZERO,
            cache_denies: false,
        }
    }

    /// Whether this configuration caches anything at all.
    pub fn is_enabled(&self) -> bool {
        self.max_entries > 0 && !self.ttl.is_zero()
    }
}

/// Cache key derived from the evaluation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    actor: UserId,
    roles: BTreeSet<Role>,
    application: ApplicationId,
    student: StudentId,
    host: OpportunityHost,
    status: ApplicationStatus,
    institution_supervisor: Option<SupervisorId>,
    employer_supervisor: Option<SupervisorId>,
    action: Action,
}

impl CacheKey {
    fn new(actor: &Actor, application: &InternshipApplication, action: Action) -> Self {
        Self {
            actor: actor.id,
            roles: actor.roles.clone(),
            application: application.id,
            student: application.student_id,
            host: application.opportunity().host(),
            status: application.status,
            institution_supervisor: application.institution_supervisor_id,
            employer_supervisor: application.employer_supervisor_id,
            action,
        }
    }
}

/// Cached decision entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached decision.
    decision: PolicyDecision,
    /// When the entry was created.
    created_at: Instant,
}

impl CacheEntry {
    fn new(decision: PolicyDecision) -> Self {
        Self {
            decision,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub size: usize,
    /// Number of evictions due to capacity or expiry.
    pub evictions: u64,
}

/// Decision cache for authorization.
#[derive(Debug)]
pub struct DecisionCache {
    /// Cache configuration.
    config: CacheConfig,
    /// Cached decisions.
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    /// Cache hit counter.
    hits: AtomicU64,
    /// Cache miss counter.
    misses: AtomicU64,
    /// Eviction counter.
    evictions: AtomicU64,
}

impl DecisionCache {
    /// Create a new decision cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Get a cached decision for the given inputs.
    pub fn get(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        action: Action,
    ) -> Option<PolicyDecision> {
        if !self.config.is_enabled() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let key = CacheKey::new(actor, application, action);
        let entries = self.entries.read();

        if let Some(entry) = entries.get(&key) {
            if !entry.is_expired(self.config.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.decision.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a decision into the cache.
    pub fn insert(
        &self,
        actor: &Actor,
        application: &InternshipApplication,
        action: Action,
        decision: &PolicyDecision,
    ) {
        if !self.config.is_enabled() {
            return;
        }

        let key = CacheKey::new(actor, application, action);
        let entry = CacheEntry::new(decision.clone());

        let mut entries = self.entries.write();

        // Evict expired entries if we're at capacity
        if entries.len() >= self.config.max_entries {
            self.evict_expired(&mut entries);
        }

        // If still at capacity, evict oldest entries
        while entries.len() >= self.config.max_entries {
            if let Some(oldest_key) = Self::find_oldest(&entries) {
                entries.remove(&oldest_key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            } else {
                break;
            }
        }

        entries.insert(key, entry);
    }

    /// Check if a decision should be cached.
    pub fn should_cache(&self, decision: &PolicyDecision) -> bool {
        if !self.config.is_enabled() {
            return false;
        }
        decision.allowed || self.config.cache_denies
    }

    /// Drop every cached decision about one application.
    pub fn invalidate_application(&self, application: ApplicationId) {
        self.entries.write().retain(|k, _| k.application != application);
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: entries.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<CacheKey, CacheEntry>) {
        let ttl = self.config.ttl;
        let before = entries.len();
        entries.retain(|_, v| !v.is_expired(ttl));
        let evicted = before - entries.len();
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
    }

    fn find_oldest(entries: &HashMap<CacheKey, CacheEntry>) -> Option<CacheKey> {
        entries
            .iter()
            .min_by_key(|(_, v)| v.created_at)
            .map(|(k, _)| k.clone())
    }
}
