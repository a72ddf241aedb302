//! # Authorization Manager
//!
//! Public entry point answering "may this user exercise this right on this
//! entity".
//!
//! ## Resolution Order
//!
//! 1. No user: deny.
//! 2. Illegal or unregistered right: deny, even for the super-admin.
//! 3. Super-admin: allow without touching rules or cache.
//! 4. Read-only mode: deny rights that are not read-only-safe.
//! 5. Ancestor walk, nearest level first, over the security cache; misses
//!    go to the cache loader.
//!
//! Every failure while resolving denies access.

use security_model::{EntityReference, UserReference};
use security_rights::{Right, RightDescription, RightRegistry, RightsSnapshot, RuleState};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::access::{SecurityAccess, SecurityAccessEntry};
use crate::cache::{CacheStats, InvalidationScope, MemorySecurityCache, SecurityCache};
use crate::config::AuthorizationConfig;
use crate::error::{AuthorizationError, AuthorizationResult};
use crate::hierarchy::{DefaultSecurityHierarchy, SecurityHierarchy};
use crate::loader::{DefaultSecurityCacheLoader, SecurityCacheLoader};
use crate::read_only::{ReadOnlyGate, ReadOnlySwitch};
use crate::settler::DefaultAuthorizationSettler;
use crate::source::{GroupSource, SecurityRuleReader};

#[cfg(feature = "memory")]
use crate::memory::MemoryRuleStore;

const MISSING_USER: &str = "<missing>";

/// Collaborators of the authorization manager.
///
/// The loader must write into the same cache the manager reads from.
pub struct AuthorizationComponents {
    pub cache: Arc<dyn SecurityCache>,
    pub loader: Arc<dyn SecurityCacheLoader>,
    pub hierarchy: Arc<dyn SecurityHierarchy>,
    pub read_only: Arc<dyn ReadOnlyGate>,
}

impl AuthorizationComponents {
    /// Default collaborators over an in-process cache.
    pub fn defaults(
        config: &AuthorizationConfig,
        registry: &Arc<RightRegistry>,
        reader: Arc<dyn SecurityRuleReader>,
        groups: Arc<dyn GroupSource>,
    ) -> Self {
        let cache = Arc::new(MemorySecurityCache::new(config.cache_capacity));
        Self::with_cache(config, registry, cache, reader, groups)
    }

    /// Default collaborators over the given cache.
    pub fn with_cache(
        config: &AuthorizationConfig,
        registry: &Arc<RightRegistry>,
        cache: Arc<dyn SecurityCache>,
        reader: Arc<dyn SecurityRuleReader>,
        groups: Arc<dyn GroupSource>,
    ) -> Self {
        let hierarchy: Arc<dyn SecurityHierarchy> = Arc::new(DefaultSecurityHierarchy::new(config.main_wiki.clone()));
        let settler = Arc::new(DefaultAuthorizationSettler::new(Arc::clone(registry)));
        let loader = Arc::new(DefaultSecurityCacheLoader::new(
            Arc::clone(registry),
            Arc::clone(&cache),
            Arc::clone(&hierarchy),
            reader,
            groups,
            settler,
        ));

        Self {
            cache,
            loader,
            hierarchy,
            read_only: Arc::new(ReadOnlySwitch::new(config.read_only)),
        }
    }
}

/// Outcome of a decision; denials carry their reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Granted,
    Denied(&'static str),
}

/// Hierarchical authorization manager.
///
/// # Example
///
/// ```
/// use security_authz::{AuthorizationConfig, AuthorizationManager, MemoryRuleStore, SecurityRule};
/// use security_model::{EntityReference, UserReference};
/// use security_rights::{standard, RightRegistry};
/// use std::sync::Arc;
///
/// let registry = Arc::new(RightRegistry::new());
/// let store = Arc::new(MemoryRuleStore::new());
/// let manager = AuthorizationManager::in_memory(
///     AuthorizationConfig::default(),
///     Arc::clone(&registry),
///     Arc::clone(&store),
/// )
/// .unwrap();
///
/// let alice = UserReference::new("Alice");
/// let page = EntityReference::wiki("xwiki").space("Main").document("WebHome");
/// let edit = registry.resolve(standard::EDIT);
///
/// assert!(!manager.has_access(&edit, Some(&alice), &page));
///
/// store.add_rule(&page, SecurityRule::allow(alice.clone(), &edit));
/// manager.invalidate_entity(&page).unwrap();
///
/// assert!(manager.has_access(&edit, Some(&alice), &page));
/// ```
pub struct AuthorizationManager {
    config: AuthorizationConfig,
    registry: Arc<RightRegistry>,
    cache: Arc<dyn SecurityCache>,
    loader: Arc<dyn SecurityCacheLoader>,
    hierarchy: Arc<dyn SecurityHierarchy>,
    read_only: Arc<dyn ReadOnlyGate>,
}

impl std::fmt::Debug for AuthorizationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationManager")
            .field("config", &self.config)
            .field("rights", &self.registry.len())
            .finish()
    }
}

impl AuthorizationManager {
    /// Create a manager with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns `Config` when the configuration is invalid.
    pub fn new(
        config: AuthorizationConfig,
        registry: Arc<RightRegistry>,
        reader: Arc<dyn SecurityRuleReader>,
        groups: Arc<dyn GroupSource>,
    ) -> AuthorizationResult<Self> {
        let components = AuthorizationComponents::defaults(&config, &registry, reader, groups);
        Self::with_components(config, registry, components)
    }

    /// Create a manager from explicit collaborators.
    pub fn with_components(
        config: AuthorizationConfig,
        registry: Arc<RightRegistry>,
        components: AuthorizationComponents,
    ) -> AuthorizationResult<Self> {
        config.validate()?;
        info!(
            main_wiki = %config.main_wiki,
            rights = registry.len(),
            read_only = components.read_only.is_read_only(),
            "Authorization manager initialized"
        );

        Ok(Self {
            config,
            registry,
            cache: components.cache,
            loader: components.loader,
            hierarchy: components.hierarchy,
            read_only: components.read_only,
        })
    }

    /// Create a manager reading rules and groups from an in-memory store.
    #[cfg(feature = "memory")]
    pub fn in_memory(
        config: AuthorizationConfig,
        registry: Arc<RightRegistry>,
        store: Arc<MemoryRuleStore>,
    ) -> AuthorizationResult<Self> {
        Self::new(config, registry, store.clone(), store)
    }

    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RightRegistry> {
        &self.registry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Check whether `user` holds `right` on `entity`.
    ///
    /// Never fails: a missing user, an illegal right or any resolution
    /// failure denies access.
    ///
    /// # Arguments
    ///
    /// * `right` - Right to check
    /// * `user` - User to check for, `None` when unknown
    /// * `entity` - Entity the right is exercised on
    pub fn has_access(&self, right: &Right, user: Option<&UserReference>, entity: &EntityReference) -> bool {
        match self.decide(right, user, entity) {
            Ok(Verdict::Granted) => true,
            Ok(Verdict::Denied(_)) => false,
            Err(e) => {
                error!(
                    user = %display_user(user),
                    right = %right,
                    entity = %entity,
                    error = %e,
                    "Failed to resolve access, denying"
                );
                false
            }
        }
    }

    /// Same decision as [`has_access`](Self::has_access), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied`; when the decision could not be made, the
    /// failure is attached as its source.
    pub fn check_access(
        &self,
        right: &Right,
        user: Option<&UserReference>,
        entity: &EntityReference,
    ) -> AuthorizationResult<()> {
        let denied = |reason: &str, cause: Option<AuthorizationError>| AuthorizationError::AccessDenied {
            user: display_user(user),
            entity: entity.to_string(),
            right: right.name().to_string(),
            reason: Some(reason.to_string()),
            cause: cause.map(Box::new),
        };

        match self.decide(right, user, entity) {
            Ok(Verdict::Granted) => Ok(()),
            Ok(Verdict::Denied(reason)) => Err(denied(reason, None)),
            Err(e) => {
                error!(
                    user = %display_user(user),
                    right = %right,
                    entity = %entity,
                    error = %e,
                    "Failed to resolve access, denying"
                );
                Err(denied("resolution failure", Some(e)))
            }
        }
    }

    /// Register a right and drop every cached decision.
    ///
    /// Registering an identical description again returns the existing
    /// right.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for malformed or conflicting
    /// descriptions and when the registry is full.
    pub fn register(&self, description: &RightDescription) -> AuthorizationResult<Right> {
        let right = self.registry.define(description)?;
        self.cache.invalidate(&InvalidationScope::Entity(self.hierarchy.farm()));
        Ok(right)
    }

    /// Drop cached entries in `scope`.
    pub fn invalidate(&self, scope: &InvalidationScope) {
        self.cache.invalidate(scope);
    }

    /// Drop cached entries of an entity and everything below it.
    ///
    /// To be called after the rules of `entity` change.
    pub fn invalidate_entity(&self, entity: &EntityReference) -> AuthorizationResult<()> {
        let reference = self.hierarchy.security_reference(entity)?;
        self.cache.invalidate(&InvalidationScope::Entity(reference));
        Ok(())
    }

    /// Drop cached access of a user, e.g. after a membership change.
    pub fn invalidate_user(&self, user: &UserReference) {
        self.cache.invalidate(&InvalidationScope::User(user.clone()));
    }

    /// Names of every registered right.
    pub fn all_rights(&self) -> Vec<String> {
        self.registry.all_rights_as_strings()
    }

    fn decide(&self, right: &Right, user: Option<&UserReference>, entity: &EntityReference) -> AuthorizationResult<Verdict> {
        let Some(user) = user else {
            info!(right = %right, entity = %entity, "Access denied: missing user");
            return Ok(Verdict::Denied("missing user"));
        };

        let snapshot = self.registry.snapshot();
        let Some(right) = snapshot.registered(right) else {
            info!(user = %user, right = %right, entity = %entity, "Access denied: illegal right");
            return Ok(Verdict::Denied("illegal right"));
        };

        if user.is_named(&self.config.superadmin_name) {
            debug!(user = %user, right = %right, entity = %entity, "Access granted to super-admin");
            return Ok(Verdict::Granted);
        }

        if !right.is_read_only() && self.read_only.is_read_only() {
            info!(user = %user, right = %right, entity = %entity, "Access denied: read-only mode");
            return Ok(Verdict::Denied("read-only"));
        }

        let entry = self.get_access(user, entity, &snapshot)?;
        match entry.access().get(right) {
            RuleState::Allow => {
                debug!(user = %user, right = %right, entity = %entity, level = %entry.reference(), "Access granted");
                Ok(Verdict::Granted)
            }
            state => {
                info!(
                    user = %user,
                    right = %right,
                    entity = %entity,
                    level = %entry.reference(),
                    state = %state,
                    "Access denied"
                );
                Ok(Verdict::Denied("rules"))
            }
        }
    }

    /// Settled access of `user` on `entity`, from the cache or the loader.
    fn get_access(
        &self,
        user: &UserReference,
        entity: &EntityReference,
        snapshot: &RightsSnapshot,
    ) -> AuthorizationResult<Arc<SecurityAccessEntry>> {
        let start = self.hierarchy.security_reference(entity)?;
        let chain = self.hierarchy.chain(&start)?;
        let root = chain.len().saturating_sub(1);

        for (depth, level) in chain.iter().enumerate() {
            let is_root = depth == root;
            if !is_root && snapshot.enabled_rights_for(level.kind()).is_empty() {
                continue;
            }

            let Some(rules) = self.cache.get_rules(level)? else {
                return self.loader.load(user, &start);
            };
            if rules.is_empty() && !is_root {
                continue;
            }

            return match self.cache.get_access(user, level)? {
                Some(access) => Ok(access),
                None => self.loader.load(user, level),
            };
        }

        warn!(user = %user, entity = %entity, "No security level resolved, using default access");
        Ok(Arc::new(SecurityAccessEntry::new(
            user.clone(),
            self.hierarchy.farm(),
            SecurityAccess::defaults(snapshot),
        )))
    }
}

fn display_user(user: Option<&UserReference>) -> String {
    user.map_or_else(|| MISSING_USER.to_string(), ToString::to_string)
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::rule::SecurityRule;
    use security_model::EntityKind;
    use security_rights::standard;

    fn manager() -> (AuthorizationManager, Arc<MemoryRuleStore>) {
        let store = Arc::new(MemoryRuleStore::new());
        let manager = AuthorizationManager::in_memory(
            AuthorizationConfig::default(),
            Arc::new(RightRegistry::new()),
            Arc::clone(&store),
        )
        .unwrap();
        (manager, store)
    }

    fn page() -> EntityReference {
        EntityReference::wiki("xwiki").space("Main").document("WebHome")
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let store = Arc::new(MemoryRuleStore::new());
        let config = AuthorizationConfig {
            superadmin_name: String::new(),
            ..Default::default()
        };
        let result = AuthorizationManager::in_memory(config, Arc::new(RightRegistry::new()), store);
        assert!(matches!(result, Err(AuthorizationError::Config(_))));
    }

    #[test]
    fn test_missing_user_is_denied_without_cache() {
        let (manager, store) = manager();
        let view = manager.registry().resolve(standard::VIEW);

        assert!(!manager.has_access(&view, None, &page()));
        let err = manager.check_access(&view, None, &page()).unwrap_err();
        assert_eq!(err.reason(), Some("missing user"));
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_defaults_without_rules() {
        let (manager, _) = manager();
        let alice = UserReference::new("Alice");

        assert!(manager.has_access(&manager.registry().resolve(standard::VIEW), Some(&alice), &page()));
        assert!(!manager.has_access(&manager.registry().resolve(standard::EDIT), Some(&alice), &page()));
    }

    #[test]
    fn test_second_check_is_served_from_cache() {
        let (manager, store) = manager();
        let alice = UserReference::new("Alice");
        let view = manager.registry().resolve(standard::VIEW);

        assert!(manager.has_access(&view, Some(&alice), &page()));
        let reads = store.read_count();
        assert!(manager.has_access(&view, Some(&alice), &page()));
        assert_eq!(store.read_count(), reads);
        assert!(manager.cache_stats().hits > 0);
    }

    #[test]
    fn test_check_access_reports_rules_denial() {
        let (manager, _) = manager();
        let alice = UserReference::new("Alice");
        let edit = manager.registry().resolve(standard::EDIT);

        let err = manager.check_access(&edit, Some(&alice), &page()).unwrap_err();
        assert!(err.is_access_denied());
        assert!(!err.is_infrastructure_failure());
        assert_eq!(err.reason(), Some("rules"));
    }

    #[test]
    fn test_register_targets_new_kind() {
        let (manager, store) = manager();
        let alice = UserReference::new("Alice");
        let space = page().parent().unwrap().clone();

        let publish = manager
            .register(
                &RightDescription::new("publish", RuleState::Deny, RuleState::Deny)
                    .targets([EntityKind::Space]),
            )
            .unwrap();
        store.add_rule(&space, SecurityRule::allow(alice.clone(), &publish));
        manager.invalidate_entity(&space).unwrap();

        assert!(manager.has_access(&publish, Some(&alice), &page()));
        assert!(manager.all_rights().contains(&"publish".to_string()));
    }
}
