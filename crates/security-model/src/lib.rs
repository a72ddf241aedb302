//! # Security Model
//!
//! Identifiers consumed by the security engine: entity references arranged
//! in the wiki model hierarchy, and the users and groups rules are written
//! for.
//!
//! ## Overview
//!
//! The security-model crate handles:
//! - **Entity kinds**: Farm, Wiki, Space, Document
//! - **Entity references**: Immutable, parent-linked references
//! - **Principals**: Users, groups, and rule subjects
//!
//! ## Architecture
//!
//! ```text
//! Wiki ("xwiki")
//!   └─ Space ("Main")
//!        ├─ Space ("Sub")
//!        │    └─ Document ("Page")
//!        └─ Document ("WebHome")
//! ```
//!
//! The model hierarchy above is *not* the security hierarchy: in the
//! security hierarchy the main wiki is the farm root and every other wiki
//! hangs below it. Mapping one onto the other is the job of the
//! authorization crate's hierarchy provider.
//!
//! ## Usage
//!
//! ```rust
//! use security_model::{EntityKind, EntityReference, UserReference};
//!
//! let page = EntityReference::wiki("xwiki").space("Main").document("WebHome");
//! assert_eq!(page.kind(), EntityKind::Document);
//! assert_eq!(page.to_string(), "xwiki:Main.WebHome");
//!
//! let user = UserReference::new("Alice");
//! assert!(!user.is_named("superadmin"));
//! ```

pub mod entity;
pub mod principal;

// Re-export main types for convenience
pub use entity::{EntityKind, EntityReference};
pub use principal::{GroupReference, Subject, UserReference};
