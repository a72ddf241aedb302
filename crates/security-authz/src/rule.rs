//! Security rules attached to a level.

use security_model::{GroupReference, Subject, UserReference};
use security_rights::{Right, RightSet, RuleState};

use crate::hierarchy::SecurityReference;

/// A rule granting or denying a set of rights to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    subject: Subject,
    rights: RightSet,
    state: RuleState,
}

impl SecurityRule {
    /// Create a rule for a single right.
    pub fn new(subject: impl Into<Subject>, right: &Right, state: RuleState) -> Self {
        let mut rights = RightSet::new();
        rights.add(right);
        Self::for_rights(subject, rights, state)
    }

    /// Create a rule for a set of rights.
    pub fn for_rights(subject: impl Into<Subject>, rights: RightSet, state: RuleState) -> Self {
        Self {
            subject: subject.into(),
            rights,
            state,
        }
    }

    /// Allow `right` to the subject.
    pub fn allow(subject: impl Into<Subject>, right: &Right) -> Self {
        Self::new(subject, right, RuleState::Allow)
    }

    /// Deny `right` to the subject.
    pub fn deny(subject: impl Into<Subject>, right: &Right) -> Self {
        Self::new(subject, right, RuleState::Deny)
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn rights(&self) -> RightSet {
        self.rights
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    /// Check whether the rule applies to the user or one of their groups.
    pub fn matches(&self, user: &UserReference, groups: &[GroupReference]) -> bool {
        self.subject.matches(user, groups)
    }
}

/// Every rule declared directly on one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRuleEntry {
    reference: SecurityReference,
    rules: Vec<SecurityRule>,
}

impl SecurityRuleEntry {
    pub fn new(reference: SecurityReference, rules: Vec<SecurityRule>) -> Self {
        Self { reference, rules }
    }

    /// An entry for a level without rules.
    pub fn empty(reference: SecurityReference) -> Self {
        Self::new(reference, Vec::new())
    }

    pub fn reference(&self) -> &SecurityReference {
        &self.reference
    }

    pub fn rules(&self) -> &[SecurityRule] {
        &self.rules
    }

    /// An empty entry contributes nothing to settlement.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
