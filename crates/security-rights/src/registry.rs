//! # Right Registry
//!
//! The catalog of registered rights. Registration is append-only: writers
//! are serialized by a mutex and publish a new immutable [`RightsSnapshot`],
//! readers only ever clone the current snapshot pointer.

use parking_lot::{Mutex, RwLock};
use security_model::EntityKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{RightsError, RightsResult};
use crate::right::{Right, RightDescription, ILLEGAL_RIGHT_NAME};
use crate::set::{RightSet, RIGHT_CAPACITY};
use crate::standard;
use crate::state::RuleState;

/// An immutable view of the registry at one point in time.
///
/// Besides the rights themselves, a snapshot precomputes the sets the
/// settler works with (default-allowed, tie-allowed, overridable, per-kind
/// enabled rights), so settling a decision is pure bit arithmetic.
#[derive(Debug, Clone)]
pub struct RightsSnapshot {
    rights: Vec<Right>,
    by_name: HashMap<String, usize>,
    enabled: [RightSet; EntityKind::COUNT],
    implied: Vec<RightSet>,
    all: RightSet,
    default_allowed: RightSet,
    tie_allowed: RightSet,
    overridable: RightSet,
    read_only: RightSet,
    illegal: Right,
}

impl RightsSnapshot {
    fn empty(illegal: Right) -> Self {
        Self {
            rights: Vec::new(),
            by_name: HashMap::new(),
            enabled: [RightSet::new(); EntityKind::COUNT],
            implied: Vec::new(),
            all: RightSet::new(),
            default_allowed: RightSet::new(),
            tie_allowed: RightSet::new(),
            overridable: RightSet::new(),
            read_only: RightSet::new(),
            illegal,
        }
    }

    /// Copy of this snapshot with one more right.
    fn with_right(&self, right: &Right, implied_by: &RightSet) -> Self {
        let mut next = self.clone();
        let ordinal = self.rights.len();

        next.rights.push(right.clone());
        next.by_name.insert(right.name().to_lowercase(), ordinal);
        next.implied.push(right.declared_implied_rights());

        if right.targeted_kinds().is_empty() {
            for set in next.enabled.iter_mut() {
                set.add(right);
            }
        } else {
            for kind in right.targeted_kinds() {
                if *kind == EntityKind::Wiki {
                    // the farm root is the main wiki
                    next.enabled[EntityKind::Farm.index()].add(right);
                }
                next.enabled[kind.index()].add(right);
            }
        }

        for implier in implied_by.iter() {
            if let Some(set) = next.implied.get_mut(implier) {
                set.add(right);
            }
        }

        next.all.add(right);
        if right.default_state() == RuleState::Allow {
            next.default_allowed.add(right);
        }
        if right.tie_resolution_policy() == RuleState::Allow {
            next.tie_allowed.add(right);
        }
        if right.inheritance_override_policy() {
            next.overridable.add(right);
        }
        if right.is_read_only() {
            next.read_only.add(right);
        }

        next
    }

    /// Look up a right by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Right> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|ordinal| self.rights.get(*ordinal))
    }

    /// Look up a right by name, returning the illegal right when unknown.
    pub fn resolve(&self, name: &str) -> Right {
        self.get(name).cloned().unwrap_or_else(|| self.illegal.clone())
    }

    /// Look up a right by ordinal.
    pub fn by_ordinal(&self, ordinal: usize) -> Option<&Right> {
        self.rights.get(ordinal)
    }

    /// All registered rights, by ordinal.
    pub fn rights(&self) -> &[Right] {
        &self.rights
    }

    /// Registered rights that are members of `set`, ascending.
    pub fn rights_in<'a>(&'a self, set: &RightSet) -> impl Iterator<Item = &'a Right> + 'a {
        set.iter().filter_map(move |ordinal| self.rights.get(ordinal))
    }

    /// Names of all registered rights.
    pub fn names(&self) -> Vec<&str> {
        self.rights.iter().map(Right::name).collect()
    }

    /// Number of registered rights.
    pub fn len(&self) -> usize {
        self.rights.len()
    }

    /// Check if no right is registered.
    pub fn is_empty(&self) -> bool {
        self.rights.is_empty()
    }

    /// Rights applicable at the given level.
    pub fn enabled_rights_for(&self, kind: EntityKind) -> RightSet {
        self.enabled[kind.index()]
    }

    /// Rights implied by `right`, including later `implied_by` cascades.
    pub fn implied_rights(&self, right: &Right) -> RightSet {
        right
            .ordinal()
            .and_then(|ordinal| self.implied.get(ordinal).copied())
            .unwrap_or_default()
    }

    /// Every registered right.
    pub fn all(&self) -> RightSet {
        self.all
    }

    /// Rights whose default state is Allow.
    pub fn default_allowed(&self) -> RightSet {
        self.default_allowed
    }

    /// Rights resolving same-level conflicts to Allow.
    pub fn tie_allowed(&self) -> RightSet {
        self.tie_allowed
    }

    /// Rights a more specific level may override.
    pub fn overridable(&self) -> RightSet {
        self.overridable
    }

    /// Rights usable while the system is read-only.
    pub fn read_only_rights(&self) -> RightSet {
        self.read_only
    }

    /// The illegal sentinel right.
    pub fn illegal(&self) -> &Right {
        &self.illegal
    }

    /// Check whether `right` belongs to this snapshot (same ordinal and name).
    pub fn is_registered(&self, right: &Right) -> bool {
        self.registered(right).is_some()
    }

    /// The registered instance matching `right` by ordinal and name.
    ///
    /// Policies are read from the returned instance, never from the handle.
    pub fn registered(&self, right: &Right) -> Option<&Right> {
        right
            .ordinal()
            .and_then(|ordinal| self.rights.get(ordinal))
            .filter(|registered| *registered == right)
    }

    fn resolve_names(&self, names: &[String], context: &str, owner: &str) -> RightsResult<RightSet> {
        let mut set = RightSet::new();
        for name in names {
            let right = self.get(name).ok_or_else(|| {
                RightsError::invalid(format!(
                    "Unknown right [{}] in {} of right [{}]",
                    name, context, owner
                ))
            })?;
            set.add(right);
        }
        Ok(set)
    }
}

/// Process-wide catalog of rights.
///
/// A registry is constructed explicitly and shared by `Arc` with every
/// component that needs it.
///
/// # Example
///
/// ```
/// use security_rights::{standard, RightDescription, RightRegistry, RuleState};
///
/// let registry = RightRegistry::new();
/// assert_eq!(registry.len(), 8);
///
/// let publish = registry
///     .define(&RightDescription::new("publish", RuleState::Deny, RuleState::Deny))
///     .unwrap();
/// assert_eq!(publish.ordinal(), Some(8));
///
/// // identical re-registration returns the same right
/// let again = registry
///     .define(&RightDescription::new("publish", RuleState::Deny, RuleState::Deny))
///     .unwrap();
/// assert!(again.same_as(&publish));
///
/// assert!(registry.resolve("no-such-right").is_illegal());
/// assert_eq!(registry.resolve("VIEW").name(), standard::VIEW);
/// ```
#[derive(Debug)]
pub struct RightRegistry {
    /// Serializes writers.
    write_lock: Mutex<()>,
    /// Current published snapshot.
    snapshot: RwLock<Arc<RightsSnapshot>>,
}

impl RightRegistry {
    /// Create a registry seeded with the standard rights.
    pub fn new() -> Self {
        let registry = Self::empty();
        for description in standard::descriptions() {
            let defined = registry.define(&description);
            debug_assert!(defined.is_ok(), "standard right {} rejected", description.name);
        }
        registry
    }

    /// Create a registry without any right.
    pub fn empty() -> Self {
        Self {
            write_lock: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(RightsSnapshot::empty(Right::illegal()))),
        }
    }

    /// Current snapshot of the registry.
    ///
    /// The snapshot never changes; later registrations publish a new one.
    pub fn snapshot(&self) -> Arc<RightsSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Register a right.
    ///
    /// # Arguments
    ///
    /// * `description` - The right to register
    ///
    /// # Returns
    ///
    /// The registered right, or the already registered one when an identical
    /// definition exists.
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` when the name is empty or reserved, when a policy
    /// is `Undetermined`, when an implied right is unknown, when a different
    /// right with the same name exists, or when the registry is full.
    pub fn define(&self, description: &RightDescription) -> RightsResult<Right> {
        check_description(description)?;

        let _guard = self.write_lock.lock();
        let current = self.snapshot();

        let implied = current.resolve_names(&description.implied_rights, "implied rights", &description.name)?;

        if let Some(existing) = current.get(&description.name) {
            if existing.has_policies_of(description) && existing.declared_implied_rights() == implied {
                debug!(right = %existing, "Right already registered with the same definition");
                return Ok(existing.clone());
            }
            return Err(RightsError::invalid(format!(
                "Duplicate name for right [{}] with a different definition",
                description.name
            )));
        }

        let ordinal = current.len();
        if ordinal >= RIGHT_CAPACITY {
            return Err(RightsError::invalid(format!(
                "Cannot register right [{}]: the registry already holds {} rights",
                description.name, RIGHT_CAPACITY
            )));
        }

        let implied_by = current.resolve_names(&description.implied_by, "implied-by rights", &description.name)?;

        // ordinal < RIGHT_CAPACITY == 64 always fits in u8
        let right = Right::from_description(ordinal as u8, description, implied);
        let next = current.with_right(&right, &implied_by);
        *self.snapshot.write() = Arc::new(next);

        info!(right = %right, ordinal, "Registered right");
        Ok(right)
    }

    /// Look up a right by name, returning the illegal right when unknown.
    pub fn resolve(&self, name: &str) -> Right {
        self.snapshot().resolve(name)
    }

    /// Rights applicable at the given level.
    pub fn enabled_rights_for(&self, kind: EntityKind) -> RightSet {
        self.snapshot().enabled_rights_for(kind)
    }

    /// Number of registered rights.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Check if no right is registered.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Names of all registered rights.
    pub fn all_rights_as_strings(&self) -> Vec<String> {
        self.snapshot().names().into_iter().map(str::to_string).collect()
    }

    /// The standard rights, when the registry was seeded with them.
    pub fn standard_rights(&self) -> Vec<Right> {
        let snapshot = self.snapshot();
        standard::names()
            .iter()
            .filter_map(|name| snapshot.get(name).cloned())
            .collect()
    }
}

impl Default for RightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn check_description(description: &RightDescription) -> RightsResult<()> {
    let name = description.name.trim();
    if name.is_empty() {
        return Err(RightsError::invalid("Right name must not be empty"));
    }
    if name.len() != description.name.len() {
        return Err(RightsError::invalid(format!(
            "Right name [{}] has surrounding whitespace",
            description.name
        )));
    }
    if name.eq_ignore_ascii_case(ILLEGAL_RIGHT_NAME) {
        return Err(RightsError::invalid(format!(
            "Right name [{}] is reserved",
            ILLEGAL_RIGHT_NAME
        )));
    }
    if !description.default_state.is_determined() {
        return Err(RightsError::invalid(format!(
            "Invalid default state [{}] for right [{}]",
            description.default_state, description.name
        )));
    }
    if !description.tie_resolution_policy.is_determined() {
        return Err(RightsError::invalid(format!(
            "Invalid tie resolution policy [{}] for right [{}]",
            description.tie_resolution_policy, description.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RuleState::{Allow, Deny, Undetermined};

    #[test]
    fn test_standard_rights_order() {
        let registry = RightRegistry::new();
        let names = registry.all_rights_as_strings();
        assert_eq!(
            names,
            vec!["login", "view", "edit", "delete", "register", "comment", "programming", "admin"]
        );
        for (ordinal, right) in registry.standard_rights().iter().enumerate() {
            assert_eq!(right.ordinal(), Some(ordinal));
        }
    }

    #[test]
    fn test_standard_policies() {
        let registry = RightRegistry::new();

        let view = registry.resolve(standard::VIEW);
        assert_eq!(view.default_state(), Allow);
        assert_eq!(view.tie_resolution_policy(), Allow);
        assert!(view.is_read_only());

        let edit = registry.resolve(standard::EDIT);
        assert_eq!(edit.default_state(), Deny);
        assert_eq!(edit.tie_resolution_policy(), Deny);
        assert!(edit.inheritance_override_policy());
        assert!(!edit.is_read_only());

        let admin = registry.resolve(standard::ADMIN);
        assert_eq!(admin.default_state(), Deny);
        assert_eq!(admin.tie_resolution_policy(), Allow);
        assert!(!admin.inheritance_override_policy());
        assert!(admin.is_read_only());

        let register = registry.resolve(standard::REGISTER);
        assert!(!register.is_read_only());
    }

    #[test]
    fn test_implied_rights_of_standard_rights() {
        let registry = RightRegistry::new();
        let snapshot = registry.snapshot();

        let program = snapshot.resolve(standard::PROGRAM);
        let implied: Vec<&str> = snapshot
            .rights_in(&snapshot.implied_rights(&program))
            .map(Right::name)
            .collect();
        assert_eq!(implied, vec!["login", "view", "edit", "delete", "register", "comment"]);

        let admin = snapshot.resolve(standard::ADMIN);
        assert_eq!(snapshot.implied_rights(&admin).len(), 7);
        assert!(snapshot.implied_rights(&admin).contains(&program));
    }

    #[test]
    fn test_enabled_rights_per_kind() {
        let registry = RightRegistry::new();
        let snapshot = registry.snapshot();
        let login = snapshot.resolve(standard::LOGIN);
        let view = snapshot.resolve(standard::VIEW);
        let program = snapshot.resolve(standard::PROGRAM);
        let admin = snapshot.resolve(standard::ADMIN);

        let farm = snapshot.enabled_rights_for(EntityKind::Farm);
        assert!(farm.contains(&program));
        assert!(farm.contains(&login), "wiki rights are enabled on the farm root");
        assert!(farm.contains(&admin));

        let wiki = snapshot.enabled_rights_for(EntityKind::Wiki);
        assert!(!wiki.contains(&program));
        assert!(wiki.contains(&admin));

        let space = snapshot.enabled_rights_for(EntityKind::Space);
        assert!(space.contains(&admin));
        assert!(!space.contains(&login));

        let document = snapshot.enabled_rights_for(EntityKind::Document);
        assert!(document.contains(&view));
        assert!(!document.contains(&admin));
    }

    #[test]
    fn test_unrestricted_right_is_enabled_everywhere() {
        let registry = RightRegistry::new();
        let custom = registry
            .define(&RightDescription::new("custom", Allow, Allow))
            .unwrap();

        for kind in EntityKind::all() {
            assert!(registry.enabled_rights_for(kind).contains(&custom), "{}", kind);
        }
    }

    #[test]
    fn test_idempotent_registration() {
        let registry = RightRegistry::new();
        let description = RightDescription::new("publish", Deny, Allow)
            .implies([standard::VIEW])
            .targets([EntityKind::Space]);

        let first = registry.define(&description).unwrap();
        let size = registry.len();
        let second = registry.define(&description).unwrap();

        assert!(first.same_as(&second));
        assert_eq!(registry.len(), size);
    }

    #[test]
    fn test_conflicting_registration() {
        let registry = RightRegistry::new();
        registry
            .define(&RightDescription::new("publish", Deny, Allow))
            .unwrap();

        let err = registry
            .define(&RightDescription::new("publish", Allow, Allow))
            .unwrap_err();
        assert!(matches!(err, RightsError::InvalidDefinition(_)));

        let err = registry
            .define(&RightDescription::new("Publish", Deny, Allow).implies([standard::VIEW]))
            .unwrap_err();
        assert!(matches!(err, RightsError::InvalidDefinition(_)));
    }

    #[test]
    fn test_invalid_descriptions() {
        let registry = RightRegistry::new();

        for description in [
            RightDescription::new("", Allow, Allow),
            RightDescription::new("  ", Allow, Allow),
            RightDescription::new("illegal", Allow, Allow),
            RightDescription::new("a", Undetermined, Allow),
            RightDescription::new("b", Allow, Undetermined),
            RightDescription::new("c", Allow, Allow).implies(["unknown"]),
            RightDescription::new("d", Allow, Allow).implied_by(["unknown"]),
        ] {
            let err = registry.define(&description).unwrap_err();
            assert!(matches!(err, RightsError::InvalidDefinition(_)), "{:?}", description);
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_padded_names_are_rejected() {
        let registry = RightRegistry::new();

        for name in [" view", "view ", "\tcustom"] {
            let err = registry
                .define(&RightDescription::new(name, Allow, Allow).read_only(true))
                .unwrap_err();
            assert!(matches!(err, RightsError::InvalidDefinition(_)), "{:?}", name);
        }
        assert_eq!(registry.len(), 8);
        assert!(registry.snapshot().get(" view").is_none());
    }

    #[test]
    fn test_capacity() {
        let registry = RightRegistry::empty();
        for i in 0..RIGHT_CAPACITY {
            let right = registry
                .define(&RightDescription::new(format!("right-{}", i), Allow, Allow))
                .unwrap();
            assert_eq!(right.ordinal(), Some(i));
        }
        assert_eq!(registry.len(), 64);

        let err = registry
            .define(&RightDescription::new("one-too-many", Allow, Allow))
            .unwrap_err();
        assert!(matches!(err, RightsError::InvalidDefinition(_)));

        // re-registering an existing right still works when full
        assert!(registry
            .define(&RightDescription::new("right-0", Allow, Allow))
            .is_ok());
    }

    #[test]
    fn test_implied_by_cascade() {
        let registry = RightRegistry::new();
        let before = registry.snapshot();
        let admin = registry.resolve(standard::ADMIN);

        let publish = registry
            .define(&RightDescription::new("publish", Deny, Deny).implied_by([standard::ADMIN]))
            .unwrap();

        let after = registry.snapshot();
        assert!(after.implied_rights(&admin).contains(&publish));
        assert!(!before.implied_rights(&admin).contains(&publish));
        assert!(!admin.declared_implied_rights().contains(&publish));
    }

    #[test]
    fn test_resolve_unknown_is_illegal() {
        let registry = RightRegistry::new();
        let right = registry.resolve("teleport");
        assert!(right.is_illegal());
        assert!(!registry.snapshot().is_registered(&right));
        for kind in EntityKind::all() {
            assert!(!registry.enabled_rights_for(kind).contains(&right));
        }
    }

    #[test]
    fn test_snapshot_is_stable_across_registration() {
        let registry = RightRegistry::new();
        let before = registry.snapshot();
        registry
            .define(&RightDescription::new("publish", Deny, Deny))
            .unwrap();

        assert_eq!(before.len(), 8);
        assert!(before.get("publish").is_none());
        assert_eq!(registry.snapshot().len(), 9);
    }

    #[test]
    fn test_policy_sets() {
        let registry = RightRegistry::new();
        let snapshot = registry.snapshot();
        let view = snapshot.resolve(standard::VIEW);
        let edit = snapshot.resolve(standard::EDIT);
        let admin = snapshot.resolve(standard::ADMIN);

        assert!(snapshot.default_allowed().contains(&view));
        assert!(!snapshot.default_allowed().contains(&edit));
        assert!(snapshot.tie_allowed().contains(&admin));
        assert!(!snapshot.tie_allowed().contains(&edit));
        assert!(snapshot.overridable().contains(&edit));
        assert!(!snapshot.overridable().contains(&admin));
        assert!(snapshot.read_only_rights().contains(&view));
        assert!(!snapshot.read_only_rights().contains(&edit));
        assert_eq!(snapshot.all().len(), 8);
    }
}
