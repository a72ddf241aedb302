//! # Settlement
//!
//! Reduces the rules of a chain of levels to a single access for one user.
//!
//! For every level, nearest first:
//! 1. Only rules matching the user or one of their groups apply.
//! 2. Only rights enabled for the level kind are considered.
//! 3. A right both allowed and denied at the same level takes its
//!    tie-break policy.
//! 4. Overridable rights keep the decision of the nearest level that made
//!    one; non-overridable rights keep the decision of the outermost level.
//!
//! Rights decided nowhere take their default state. Implied rights are not
//! expanded.

use security_model::{GroupReference, UserReference};
use security_rights::{RightRegistry, RightSet, RuleState};
use std::sync::Arc;

use crate::access::{SecurityAccess, SecurityAccessEntry};
use crate::error::{AuthorizationError, AuthorizationResult};
use crate::rule::SecurityRuleEntry;

/// Computes access from a rule chain.
pub trait AuthorizationSettler: Send + Sync {
    /// Settle the rules in `rule_chain` (nearest level first) for a user.
    ///
    /// The returned entry is bound to the nearest level carrying rules, or
    /// to the last level of the chain when none do.
    ///
    /// # Errors
    ///
    /// Returns `Hierarchy` when the chain is empty.
    fn settle(
        &self,
        user: &UserReference,
        groups: &[GroupReference],
        rule_chain: &[Arc<SecurityRuleEntry>],
    ) -> AuthorizationResult<SecurityAccessEntry>;
}

/// Settler working on right sets from the registry snapshot.
pub struct DefaultAuthorizationSettler {
    registry: Arc<RightRegistry>,
}

impl DefaultAuthorizationSettler {
    pub fn new(registry: Arc<RightRegistry>) -> Self {
        Self { registry }
    }
}

impl AuthorizationSettler for DefaultAuthorizationSettler {
    fn settle(
        &self,
        user: &UserReference,
        groups: &[GroupReference],
        rule_chain: &[Arc<SecurityRuleEntry>],
    ) -> AuthorizationResult<SecurityAccessEntry> {
        let root = rule_chain
            .last()
            .ok_or_else(|| AuthorizationError::Hierarchy(format!("empty rule chain for {}", user)))?;
        let bound = rule_chain
            .iter()
            .find(|entry| !entry.is_empty())
            .unwrap_or(root)
            .reference()
            .clone();

        let snapshot = self.registry.snapshot();
        let overridable = snapshot.overridable();
        let tie_allowed = snapshot.tie_allowed();

        let mut allowed = RightSet::new();
        let mut denied = RightSet::new();

        for entry in rule_chain {
            let enabled = snapshot.enabled_rights_for(entry.reference().kind());
            let mut level_allowed = RightSet::new();
            let mut level_denied = RightSet::new();

            for rule in entry.rules().iter().filter(|rule| rule.matches(user, groups)) {
                let rights = rule.rights() & enabled;
                match rule.state() {
                    RuleState::Allow => {
                        level_allowed.add_all(&rights);
                    }
                    RuleState::Deny => {
                        level_denied.add_all(&rights);
                    }
                    RuleState::Undetermined => {}
                }
            }

            let ties = level_allowed & level_denied;
            let level_allowed = (level_allowed - ties) | (ties & tie_allowed);
            let level_denied = (level_denied - ties) | (ties - tie_allowed);
            let level_decided = level_allowed | level_denied;

            // nearest decision sticks
            let fresh = (level_decided & overridable) - (allowed | denied);
            allowed.add_all(&(level_allowed & fresh));
            denied.add_all(&(level_denied & fresh));

            // outermost decision replaces nearer ones
            let pinned = level_decided - overridable;
            allowed.subtract_all(&pinned);
            denied.subtract_all(&pinned);
            allowed.add_all(&(level_allowed & pinned));
            denied.add_all(&(level_denied & pinned));
        }

        let undecided = snapshot.all() - (allowed | denied);
        allowed.add_all(&(undecided & snapshot.default_allowed()));
        denied.add_all(&(undecided - snapshot.default_allowed()));

        Ok(SecurityAccessEntry::new(
            user.clone(),
            bound,
            SecurityAccess::new(allowed, denied),
        ))
    }
}
