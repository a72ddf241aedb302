//! Settled access
//!
//! The outcome of settlement: which rights a user holds on a level.

use chrono::{DateTime, Utc};
use security_model::UserReference;
use security_rights::{Right, RightSet, RightsSnapshot, RuleState};

use crate::hierarchy::SecurityReference;

/// Allowed and denied rights for one user on one level.
///
/// The two sets are disjoint. A right present in neither is undetermined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityAccess {
    allowed: RightSet,
    denied: RightSet,
}

impl SecurityAccess {
    /// Build an access from two sets; `denied` loses rights also in `allowed`.
    pub fn new(allowed: RightSet, denied: RightSet) -> Self {
        Self {
            allowed,
            denied: denied - allowed,
        }
    }

    /// Access made only of each right's default state.
    pub fn defaults(snapshot: &RightsSnapshot) -> Self {
        let allowed = snapshot.default_allowed();
        Self::new(allowed, snapshot.all() - allowed)
    }

    /// State of a right in this access.
    ///
    /// The illegal right is always denied.
    pub fn get(&self, right: &Right) -> RuleState {
        if right.is_illegal() {
            RuleState::Deny
        } else if self.allowed.contains(right) {
            RuleState::Allow
        } else if self.denied.contains(right) {
            RuleState::Deny
        } else {
            RuleState::Undetermined
        }
    }

    pub fn allowed(&self) -> RightSet {
        self.allowed
    }

    pub fn denied(&self) -> RightSet {
        self.denied
    }
}

/// Settled access cached for a user on the level it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityAccessEntry {
    user: UserReference,
    reference: SecurityReference,
    access: SecurityAccess,
    settled_at: DateTime<Utc>,
}

impl SecurityAccessEntry {
    pub fn new(user: UserReference, reference: SecurityReference, access: SecurityAccess) -> Self {
        Self {
            user,
            reference,
            access,
            settled_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &UserReference {
        &self.user
    }

    /// Level the entry is bound to.
    pub fn reference(&self) -> &SecurityReference {
        &self.reference
    }

    pub fn access(&self) -> &SecurityAccess {
        &self.access
    }

    /// When the access was settled.
    pub fn settled_at(&self) -> DateTime<Utc> {
        self.settled_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use security_rights::{standard, RightRegistry};

    #[test]
    fn test_defaults_follow_registry() {
        let registry = RightRegistry::new();
        let access = SecurityAccess::defaults(&registry.snapshot());

        assert_eq!(access.get(&registry.resolve(standard::VIEW)), RuleState::Allow);
        assert_eq!(access.get(&registry.resolve(standard::EDIT)), RuleState::Deny);
        assert_eq!(access.get(&registry.resolve(standard::PROGRAM)), RuleState::Deny);
        assert_eq!(access.get(&Right::illegal()), RuleState::Deny);
    }

    #[test]
    fn test_allowed_wins_over_denied() {
        let registry = RightRegistry::new();
        let edit = registry.resolve(standard::EDIT);
        let set: RightSet = [&edit].into_iter().collect();

        let access = SecurityAccess::new(set, set);
        assert_eq!(access.get(&edit), RuleState::Allow);
        assert!(access.denied().is_empty());
    }

    #[test]
    fn test_undetermined_right() {
        let registry = RightRegistry::new();
        let access = SecurityAccess::default();
        assert_eq!(access.get(&registry.resolve(standard::VIEW)), RuleState::Undetermined);
    }
}
