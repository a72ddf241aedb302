//! # Rule States
//!
//! The tri-state outcome of evaluating one right.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating a right at one level, or overall.
///
/// - **Allow**: the right is granted
/// - **Deny**: the right is refused
/// - **Undetermined**: nothing decided the right (yet)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// Right granted.
    Allow,

    /// Right refused.
    Deny,

    /// No decision.
    #[default]
    Undetermined,
}

impl RuleState {
    /// Get the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleState::Allow => "allow",
            RuleState::Deny => "deny",
            RuleState::Undetermined => "undetermined",
        }
    }

    /// Parse a state from its string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use security_rights::RuleState;
    ///
    /// assert_eq!(RuleState::parse("ALLOW"), Some(RuleState::Allow));
    /// assert_eq!(RuleState::parse("denied"), Some(RuleState::Deny));
    /// assert_eq!(RuleState::parse("maybe"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "allow" | "allowed" | "grant" => Some(RuleState::Allow),
            "deny" | "denied" | "refuse" => Some(RuleState::Deny),
            "undetermined" | "none" => Some(RuleState::Undetermined),
            _ => None,
        }
    }

    /// Whether this state is Allow or Deny.
    pub fn is_determined(&self) -> bool {
        !matches!(self, RuleState::Undetermined)
    }

    /// Whether this state grants the right.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RuleState::Allow)
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        assert_eq!(RuleState::parse("allow"), Some(RuleState::Allow));
        assert_eq!(RuleState::parse("Deny"), Some(RuleState::Deny));
        assert_eq!(RuleState::parse("undetermined"), Some(RuleState::Undetermined));
        assert_eq!(RuleState::parse(""), None);
    }

    #[test]
    fn test_state_predicates() {
        assert!(RuleState::Allow.is_determined());
        assert!(RuleState::Deny.is_determined());
        assert!(!RuleState::Undetermined.is_determined());
        assert!(RuleState::Allow.is_allowed());
        assert!(!RuleState::Deny.is_allowed());
        assert_eq!(RuleState::default(), RuleState::Undetermined);
    }
}
