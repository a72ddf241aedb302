//! # Rights
//!
//! Registered rights and the descriptions they are registered from.
//! A right combines a name with the policies used to settle it.

use security_model::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::set::RightSet;
use crate::state::RuleState;

/// Name reserved for the sentinel returned for unknown rights.
pub const ILLEGAL_RIGHT_NAME: &str = "illegal";

/// Description of a right to register.
///
/// Descriptions are plain data: they can be built in code or deserialized
/// from configuration. Implied rights are referenced by name and must already
/// be registered when the description is defined.
///
/// # Example
///
/// ```
/// use security_model::EntityKind;
/// use security_rights::{RightDescription, RuleState};
///
/// let publish = RightDescription::new("publish", RuleState::Deny, RuleState::Deny)
///     .implies(["view"])
///     .targets([EntityKind::Wiki, EntityKind::Space])
///     .implied_by(["admin"]);
///
/// assert_eq!(publish.name, "publish");
/// assert!(publish.inheritance_override_policy);
/// assert!(!publish.read_only);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RightDescription {
    /// Unique name of the right.
    pub name: String,

    /// State used when no rule anywhere decides the right.
    pub default_state: RuleState,

    /// State used when rules at one level conflict.
    pub tie_resolution_policy: RuleState,

    /// Whether a more specific level may override a less specific one.
    #[serde(default = "default_override")]
    pub inheritance_override_policy: bool,

    /// Names of the rights implied by this right.
    #[serde(default)]
    pub implied_rights: Vec<String>,

    /// Kinds of entity the right is enabled on; empty means everywhere.
    #[serde(default)]
    pub targeted_kinds: Vec<EntityKind>,

    /// Whether the right may be exercised while the system is read-only.
    #[serde(default)]
    pub read_only: bool,

    /// Names of existing rights that should imply this new right.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implied_by: Vec<String>,
}

fn default_override() -> bool {
    true
}

impl RightDescription {
    /// Create a description with the mandatory policies.
    ///
    /// The right is overridable, not read-only, implies nothing and is
    /// enabled everywhere until configured otherwise.
    pub fn new(name: impl Into<String>, default_state: RuleState, tie_resolution_policy: RuleState) -> Self {
        Self {
            name: name.into(),
            default_state,
            tie_resolution_policy,
            inheritance_override_policy: true,
            implied_rights: Vec::new(),
            targeted_kinds: Vec::new(),
            read_only: false,
            implied_by: Vec::new(),
        }
    }

    /// Set the inheritance override policy.
    pub fn inheritance_override(mut self, overridable: bool) -> Self {
        self.inheritance_override_policy = overridable;
        self
    }

    /// Add implied rights by name.
    pub fn implies<I, S>(mut self, rights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implied_rights.extend(rights.into_iter().map(Into::into));
        self
    }

    /// Restrict the right to the given entity kinds.
    pub fn targets<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = EntityKind>,
    {
        self.targeted_kinds.extend(kinds);
        self
    }

    /// Set the read-only flag.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Add existing rights that should imply this right.
    pub fn implied_by<I, S>(mut self, rights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implied_by.extend(rights.into_iter().map(Into::into));
        self
    }

    /// Targeted kinds, sorted and deduplicated.
    pub fn normalized_targets(&self) -> Vec<EntityKind> {
        let mut kinds = self.targeted_kinds.clone();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

#[derive(Debug)]
struct RightData {
    ordinal: Option<u8>,
    name: String,
    default_state: RuleState,
    tie_resolution_policy: RuleState,
    inheritance_override_policy: bool,
    implied_rights: RightSet,
    targeted_kinds: Vec<EntityKind>,
    read_only: bool,
}

/// A registered right.
///
/// Rights are immutable and cheap to clone: clones share the same
/// allocation, which is what [`Right::same_as`] checks. Two rights are equal
/// when they carry the same ordinal and name.
#[derive(Clone)]
pub struct Right {
    data: Arc<RightData>,
}

impl Right {
    /// Build a right from a validated description.
    ///
    /// Only the registry assigns ordinals, so this stays crate-private.
    pub(crate) fn from_description(ordinal: u8, description: &RightDescription, implied_rights: RightSet) -> Self {
        Self {
            data: Arc::new(RightData {
                ordinal: Some(ordinal),
                name: description.name.clone(),
                default_state: description.default_state,
                tie_resolution_policy: description.tie_resolution_policy,
                inheritance_override_policy: description.inheritance_override_policy,
                implied_rights,
                targeted_kinds: description.normalized_targets(),
                read_only: description.read_only,
            }),
        }
    }

    /// The sentinel right returned for unknown names.
    ///
    /// It has no ordinal, is denied by default, is enabled nowhere and is
    /// never a member of any [`RightSet`].
    pub fn illegal() -> Self {
        Self {
            data: Arc::new(RightData {
                ordinal: None,
                name: ILLEGAL_RIGHT_NAME.to_string(),
                default_state: RuleState::Deny,
                tie_resolution_policy: RuleState::Deny,
                inheritance_override_policy: false,
                implied_rights: RightSet::new(),
                targeted_kinds: Vec::new(),
                read_only: false,
            }),
        }
    }

    /// Registry-assigned ordinal, `None` for the illegal right.
    pub fn ordinal(&self) -> Option<usize> {
        self.data.ordinal.map(usize::from)
    }

    /// Name of the right.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Whether this is the illegal sentinel.
    pub fn is_illegal(&self) -> bool {
        self.data.ordinal.is_none()
    }

    /// State used when nothing decides the right.
    pub fn default_state(&self) -> RuleState {
        self.data.default_state
    }

    /// State used when rules at one level conflict.
    pub fn tie_resolution_policy(&self) -> RuleState {
        self.data.tie_resolution_policy
    }

    /// Whether a more specific level may override a less specific one.
    pub fn inheritance_override_policy(&self) -> bool {
        self.data.inheritance_override_policy
    }

    /// Rights this right declared as implied when it was registered.
    ///
    /// Later `implied_by` cascades are tracked by the registry snapshot,
    /// see `RightsSnapshot::implied_rights`.
    pub fn declared_implied_rights(&self) -> RightSet {
        self.data.implied_rights
    }

    /// Kinds the right was registered for; empty means everywhere.
    pub fn targeted_kinds(&self) -> &[EntityKind] {
        &self.data.targeted_kinds
    }

    /// Whether the right may be exercised while the system is read-only.
    pub fn is_read_only(&self) -> bool {
        self.data.read_only
    }

    /// Whether both handles point at the same registered instance.
    pub fn same_as(&self, other: &Right) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Compare everything but name, ordinal and implied rights.
    pub(crate) fn has_policies_of(&self, description: &RightDescription) -> bool {
        self.data.default_state == description.default_state
            && self.data.tie_resolution_policy == description.tie_resolution_policy
            && self.data.inheritance_override_policy == description.inheritance_override_policy
            && self.data.read_only == description.read_only
            && self.data.targeted_kinds == description.normalized_targets()
    }
}

impl PartialEq for Right {
    fn eq(&self, other: &Self) -> bool {
        self.data.ordinal == other.data.ordinal && self.data.name == other.data.name
    }
}

impl Eq for Right {}

impl Hash for Right {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.ordinal.hash(state);
        self.data.name.hash(state);
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data.name)
    }
}

impl fmt::Debug for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Right")
            .field("name", &self.data.name)
            .field("ordinal", &self.data.ordinal)
            .finish()
    }
}
