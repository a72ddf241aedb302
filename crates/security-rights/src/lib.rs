//! # Security Rights
//!
//! This crate provides the rights catalog of the security engine.
//!
//! ## Overview
//!
//! The security-rights crate handles:
//! - **Rule states**: Allow, Deny, Undetermined
//! - **Rights**: Named rights with default, tie-break and inheritance policies
//! - **Right sets**: 64-bit vectors indexed by right ordinal
//! - **Registry**: Append-only catalog publishing immutable snapshots
//!
//! ## Architecture
//!
//! ```text
//! RightDescription ──define──→ RightRegistry ──snapshot──→ RightsSnapshot
//!                                   │                        ├─ rights by ordinal
//!                                   └─ resolve(name)         ├─ enabled rights per kind
//!                                                            └─ policy sets (RightSet)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use security_model::EntityKind;
//! use security_rights::{standard, RightDescription, RightRegistry, RuleState};
//!
//! let registry = RightRegistry::new();
//!
//! // Standard rights are available by name
//! let edit = registry.resolve(standard::EDIT);
//! assert_eq!(edit.default_state(), RuleState::Deny);
//!
//! // Extensions register their own rights
//! let publish = registry
//!     .define(
//!         &RightDescription::new("publish", RuleState::Deny, RuleState::Deny)
//!             .targets([EntityKind::Space]),
//!     )
//!     .unwrap();
//! assert!(registry.enabled_rights_for(EntityKind::Space).contains(&publish));
//! assert!(!registry.enabled_rights_for(EntityKind::Document).contains(&publish));
//! ```
//!
//! ## Implied Rights
//!
//! Implied rights are metadata: `programming` implies `view`, but settling
//! an Allow for `programming` does not grant `view`. Callers that want the
//! expansion read `RightsSnapshot::implied_rights`.

pub mod error;
pub mod registry;
pub mod right;
pub mod set;
pub mod standard;
pub mod state;

// Re-export main types for convenience
pub use error::{RightsError, RightsResult};
pub use registry::{RightRegistry, RightsSnapshot};
pub use right::{Right, RightDescription, ILLEGAL_RIGHT_NAME};
pub use set::{Ordinals, RightSet, RIGHT_CAPACITY};
pub use state::RuleState;
