//! # Cache Loader
//!
//! Fills the security cache on a miss: reads the rules of every level from
//! the entity up to the farm root, expands the user's groups, settles and
//! caches the outcome.
//!
//! ## Flow
//!
//! ```text
//! generation ← cache.generation()
//! chain      ← hierarchy.chain(entity)
//! for level in chain:   cached rules │ empty (no enabled right) │ reader.read(level)
//! groups     ← expand(groups_of_user(user)) transitively
//! access     ← settler.settle(user, groups, rule entries)
//! cache.put_access(access, generation)
//! ```
//!
//! Every insert carries the generation read first, so the cache drops what
//! was loaded across an invalidation.

use security_model::{GroupReference, UserReference};
use security_rights::RightRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::access::SecurityAccessEntry;
use crate::cache::SecurityCache;
use crate::error::AuthorizationResult;
use crate::hierarchy::{SecurityHierarchy, SecurityReference};
use crate::rule::SecurityRuleEntry;
use crate::settler::AuthorizationSettler;
use crate::source::{GroupSource, SecurityRuleReader};

/// Loads settled access into the cache.
pub trait SecurityCacheLoader: Send + Sync {
    /// Settle and cache the access of `user` on the level `entity`.
    ///
    /// # Errors
    ///
    /// Any failure of the rule reader, group source, hierarchy or cache.
    fn load(&self, user: &UserReference, entity: &SecurityReference) -> AuthorizationResult<Arc<SecurityAccessEntry>>;
}

/// Loader built on a rule reader, a group source and a settler.
pub struct DefaultSecurityCacheLoader {
    registry: Arc<RightRegistry>,
    cache: Arc<dyn SecurityCache>,
    hierarchy: Arc<dyn SecurityHierarchy>,
    reader: Arc<dyn SecurityRuleReader>,
    groups: Arc<dyn GroupSource>,
    settler: Arc<dyn AuthorizationSettler>,
}

impl DefaultSecurityCacheLoader {
    pub fn new(
        registry: Arc<RightRegistry>,
        cache: Arc<dyn SecurityCache>,
        hierarchy: Arc<dyn SecurityHierarchy>,
        reader: Arc<dyn SecurityRuleReader>,
        groups: Arc<dyn GroupSource>,
        settler: Arc<dyn AuthorizationSettler>,
    ) -> Self {
        Self {
            registry,
            cache,
            hierarchy,
            reader,
            groups,
            settler,
        }
    }

    /// Rule entries of the chain, reading and caching the missing ones.
    fn load_rules(
        &self,
        chain: &[SecurityReference],
        generation: u64,
    ) -> AuthorizationResult<Vec<Arc<SecurityRuleEntry>>> {
        let snapshot = self.registry.snapshot();
        let mut entries = Vec::with_capacity(chain.len());

        for level in chain {
            if let Some(entry) = self.cache.get_rules(level)? {
                entries.push(entry);
                continue;
            }

            if snapshot.enabled_rights_for(level.kind()).is_empty() && !level.is_farm() {
                entries.push(Arc::new(SecurityRuleEntry::empty(level.clone())));
                continue;
            }

            let entry = Arc::new(self.reader.read(level)?);
            if !self.cache.put_rules(Arc::clone(&entry), generation)? {
                debug!(level = %level, "Rejected stale rule entry");
            }
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Every group the user belongs to, directly or through other groups.
    fn load_groups(&self, user: &UserReference) -> AuthorizationResult<Vec<GroupReference>> {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();
        let mut branch = Vec::new();

        let direct = self.groups.groups_of_user(user)?;
        self.expand_groups(direct, &mut branch, &mut seen, &mut collected)?;
        Ok(collected)
    }

    fn expand_groups(
        &self,
        groups: Vec<GroupReference>,
        branch: &mut Vec<GroupReference>,
        seen: &mut HashSet<GroupReference>,
        collected: &mut Vec<GroupReference>,
    ) -> AuthorizationResult<()> {
        for group in groups {
            if branch.contains(&group) {
                debug!(group = %group, "Ignoring cyclic group membership");
                continue;
            }
            if !seen.insert(group.clone()) {
                continue;
            }

            collected.push(group.clone());
            let parents = self.groups.groups_of_group(&group)?;
            branch.push(group);
            self.expand_groups(parents, branch, seen, collected)?;
            branch.pop();
        }
        Ok(())
    }
}

impl SecurityCacheLoader for DefaultSecurityCacheLoader {
    fn load(&self, user: &UserReference, entity: &SecurityReference) -> AuthorizationResult<Arc<SecurityAccessEntry>> {
        let generation = self.cache.generation();

        let chain = self.hierarchy.chain(entity)?;
        let rules = self.load_rules(&chain, generation)?;
        let groups = self.load_groups(user)?;

        let entry = Arc::new(self.settler.settle(user, &groups, &rules)?);
        if !self.cache.put_access(Arc::clone(&entry), generation)? {
            debug!(user = %user, level = %entry.reference(), "Rejected stale access entry");
        }

        debug!(
            user = %user,
            entity = %entity,
            bound = %entry.reference(),
            groups = groups.len(),
            "Loaded security access"
        );
        Ok(entry)
    }
}
