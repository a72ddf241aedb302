//! # Security Authz
//!
//! This crate provides the authorization manager of the security engine.
//!
//! ## Overview
//!
//! The security-authz crate handles:
//! - **Hierarchy**: Documents, spaces, wikis and the farm root
//! - **Rules**: Allow/deny rules per level, for users and groups
//! - **Settlement**: Reducing a chain of rules to one access per user
//! - **Caching**: Rule entries per level, settled access per (user, level)
//! - **Gates**: Super-admin bypass and read-only mode
//!
//! ## Architecture
//!
//! ```text
//! has_access(right, user, entity)
//!      │
//!      ├─ missing user / illegal right ──→ deny
//!      ├─ super-admin ───────────────────→ allow
//!      ├─ read-only gate ────────────────→ deny writes
//!      └─ ancestor walk ──→ SecurityCache ──miss──→ SecurityCacheLoader
//!                                                     ├─ SecurityRuleReader
//!                                                     ├─ GroupSource
//!                                                     └─ AuthorizationSettler
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use security_authz::{AuthorizationConfig, AuthorizationManager, MemoryRuleStore, SecurityRule};
//! use security_model::{EntityReference, GroupReference, UserReference};
//! use security_rights::{standard, RightRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(RightRegistry::new());
//! let store = Arc::new(MemoryRuleStore::new());
//! let manager = AuthorizationManager::in_memory(
//!     AuthorizationConfig::default(),
//!     Arc::clone(&registry),
//!     Arc::clone(&store),
//! )
//! .unwrap();
//!
//! let bob = UserReference::new("Bob");
//! let editors = GroupReference::new("Editors");
//! let space = EntityReference::wiki("xwiki").space("Sandbox");
//!
//! store.add_user_to_group(&bob, &editors);
//! store.add_rule(&space, SecurityRule::allow(editors, &registry.resolve(standard::EDIT)));
//!
//! let page = space.document("WebHome");
//! assert!(manager.has_access(&registry.resolve(standard::EDIT), Some(&bob), &page));
//! assert!(!manager.has_access(&registry.resolve(standard::DELETE), Some(&bob), &page));
//! ```
//!
//! ## Cache Coherence
//!
//! The cache never invalidates itself. Whoever changes rules or group
//! memberships calls [`AuthorizationManager::invalidate_entity`],
//! [`AuthorizationManager::invalidate_user`] or
//! [`AuthorizationManager::invalidate`]. Registering a right clears the
//! whole cache.

pub mod access;
pub mod cache;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod loader;
pub mod manager;
pub mod read_only;
pub mod rule;
pub mod settler;
pub mod source;

#[cfg(feature = "memory")]
pub mod memory;

// Re-export main types for convenience
pub use access::{SecurityAccess, SecurityAccessEntry};
pub use cache::{CacheStats, InvalidationScope, MemorySecurityCache, SecurityCache};
pub use config::{AuthorizationConfig, ConfigError};
pub use error::{AuthorizationError, AuthorizationResult};
pub use hierarchy::{DefaultSecurityHierarchy, SecurityHierarchy, SecurityReference, MAX_HIERARCHY_DEPTH};
pub use loader::{DefaultSecurityCacheLoader, SecurityCacheLoader};
pub use manager::{AuthorizationComponents, AuthorizationManager};
pub use read_only::{ReadOnlyGate, ReadOnlySwitch};
pub use rule::{SecurityRule, SecurityRuleEntry};
pub use settler::{AuthorizationSettler, DefaultAuthorizationSettler};
pub use source::{GroupSource, SecurityRuleReader};

#[cfg(feature = "memory")]
pub use memory::MemoryRuleStore;
