//! In-memory rule store.
//!
//! Implements [`SecurityRuleReader`] and [`GroupSource`] over hash maps.
//! Suitable for single-process applications and testing.

use parking_lot::RwLock;
use security_model::{EntityReference, GroupReference, UserReference};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{AuthorizationError, AuthorizationResult};
use crate::hierarchy::SecurityReference;
use crate::rule::{SecurityRule, SecurityRuleEntry};
use crate::source::{GroupSource, SecurityRuleReader};

/// Rules and memberships held in memory.
///
/// Mutations do not touch any cache; callers invalidate the authorization
/// manager after changing rules or memberships.
pub struct MemoryRuleStore {
    /// Rules per entity
    rules: RwLock<HashMap<EntityReference, Vec<SecurityRule>>>,
    /// Direct groups of users
    user_groups: RwLock<HashMap<UserReference, Vec<GroupReference>>>,
    /// Direct groups of groups
    group_groups: RwLock<HashMap<GroupReference, Vec<GroupReference>>>,
    /// Number of rule reads served
    reads: AtomicU64,
    /// Simulated outage
    unavailable: AtomicBool,
}

impl std::fmt::Debug for MemoryRuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRuleStore")
            .field("entities", &self.rules.read().len())
            .field("reads", &self.read_count())
            .finish()
    }
}

impl MemoryRuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
            user_groups: RwLock::new(HashMap::new()),
            group_groups: RwLock::new(HashMap::new()),
            reads: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Attach a rule to an entity.
    pub fn add_rule(&self, entity: &EntityReference, rule: SecurityRule) {
        self.rules.write().entry(entity.clone()).or_default().push(rule);
    }

    /// Replace every rule of an entity.
    pub fn set_rules(&self, entity: &EntityReference, rules: Vec<SecurityRule>) {
        let mut map = self.rules.write();
        if rules.is_empty() {
            map.remove(entity);
        } else {
            map.insert(entity.clone(), rules);
        }
    }

    /// Remove every rule of an entity.
    pub fn clear_rules(&self, entity: &EntityReference) {
        self.rules.write().remove(entity);
    }

    /// Make `user` a direct member of `group`.
    pub fn add_user_to_group(&self, user: &UserReference, group: &GroupReference) {
        push_unique(self.user_groups.write().entry(user.clone()).or_default(), group);
    }

    /// Make `member` a direct member of `group`.
    pub fn add_group_to_group(&self, member: &GroupReference, group: &GroupReference) {
        push_unique(self.group_groups.write().entry(member.clone()).or_default(), group);
    }

    /// Remove `user` from `group`.
    pub fn remove_user_from_group(&self, user: &UserReference, group: &GroupReference) {
        if let Some(groups) = self.user_groups.write().get_mut(user) {
            groups.retain(|g| g != group);
        }
    }

    /// Number of rule reads served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Make every read fail, or recover.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn check_available(&self) -> AuthorizationResult<()> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(AuthorizationError::RuleStore("memory store unavailable".to_string()));
        }
        Ok(())
    }
}

fn push_unique(groups: &mut Vec<GroupReference>, group: &GroupReference) {
    if !groups.contains(group) {
        groups.push(group.clone());
    }
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityRuleReader for MemoryRuleStore {
    fn read(&self, reference: &SecurityReference) -> AuthorizationResult<SecurityRuleEntry> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::Relaxed);

        let rules = self.rules.read().get(reference.entity()).cloned().unwrap_or_default();
        Ok(SecurityRuleEntry::new(reference.clone(), rules))
    }
}

impl GroupSource for MemoryRuleStore {
    fn groups_of_user(&self, user: &UserReference) -> AuthorizationResult<Vec<GroupReference>> {
        self.check_available()
            .map_err(|e| AuthorizationError::GroupSource(e.to_string()))?;
        Ok(self.user_groups.read().get(user).cloned().unwrap_or_default())
    }

    fn groups_of_group(&self, group: &GroupReference) -> AuthorizationResult<Vec<GroupReference>> {
        self.check_available()
            .map_err(|e| AuthorizationError::GroupSource(e.to_string()))?;
        Ok(self.group_groups.read().get(group).cloned().unwrap_or_default())
    }
}
