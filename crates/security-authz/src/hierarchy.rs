//! Security hierarchy
//!
//! Maps model entities onto security levels. The main wiki plays the role
//! of the farm, every other wiki hangs below it, and spaces and documents
//! keep their model parents.

use security_model::{EntityKind, EntityReference};
use std::fmt;

use crate::error::{AuthorizationError, AuthorizationResult};

/// Longest chain a hierarchy may produce before it is considered cyclic.
pub const MAX_HIERARCHY_DEPTH: usize = 256;

/// An entity paired with the kind it has for security purposes.
///
/// The kind differs from the model kind only for the main wiki, which is
/// seen as the farm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecurityReference {
    entity: EntityReference,
    kind: EntityKind,
}

impl SecurityReference {
    /// Wrap an entity with an explicit security kind.
    pub fn new(entity: EntityReference, kind: EntityKind) -> Self {
        Self { entity, kind }
    }

    /// The wrapped model entity.
    pub fn entity(&self) -> &EntityReference {
        &self.entity
    }

    /// Security kind of the level.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Whether this is the farm root.
    pub fn is_farm(&self) -> bool {
        self.kind == EntityKind::Farm
    }

    /// Check whether this level is `other` or lies below it.
    ///
    /// Everything lies below the farm.
    pub fn is_within(&self, other: &SecurityReference) -> bool {
        other.is_farm() || self.entity.is_within(&other.entity)
    }
}

impl fmt::Display for SecurityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_farm() {
            write!(f, "farm({})", self.entity)
        } else {
            self.entity.fmt(f)
        }
    }
}

/// Navigation over security levels.
pub trait SecurityHierarchy: Send + Sync {
    /// Security level of a model entity.
    fn security_reference(&self, entity: &EntityReference) -> AuthorizationResult<SecurityReference>;

    /// Parent level, `None` for the farm root.
    fn parent(&self, reference: &SecurityReference) -> AuthorizationResult<Option<SecurityReference>>;

    /// The farm root.
    fn farm(&self) -> SecurityReference;

    /// Levels from `start` up to the farm root, nearest first.
    ///
    /// # Errors
    ///
    /// Returns `Hierarchy` when the chain exceeds [`MAX_HIERARCHY_DEPTH`].
    fn chain(&self, start: &SecurityReference) -> AuthorizationResult<Vec<SecurityReference>> {
        let mut chain = vec![start.clone()];
        let mut current = start.clone();
        while let Some(parent) = self.parent(&current)? {
            if chain.len() >= MAX_HIERARCHY_DEPTH {
                return Err(AuthorizationError::Hierarchy(format!(
                    "chain from {} exceeds {} levels",
                    start, MAX_HIERARCHY_DEPTH
                )));
            }
            chain.push(parent.clone());
            current = parent;
        }
        Ok(chain)
    }
}

/// Hierarchy of a single farm whose root is the main wiki.
#[derive(Debug, Clone)]
pub struct DefaultSecurityHierarchy {
    main_wiki: String,
}

impl DefaultSecurityHierarchy {
    /// Create a hierarchy rooted at `main_wiki`.
    pub fn new(main_wiki: impl Into<String>) -> Self {
        Self {
            main_wiki: main_wiki.into(),
        }
    }

    /// Identifier of the main wiki.
    pub fn main_wiki(&self) -> &str {
        &self.main_wiki
    }

    fn is_main_wiki(&self, entity: &EntityReference) -> bool {
        entity.kind() == EntityKind::Wiki && entity.name().eq_ignore_ascii_case(&self.main_wiki)
    }
}

impl SecurityHierarchy for DefaultSecurityHierarchy {
    fn security_reference(&self, entity: &EntityReference) -> AuthorizationResult<SecurityReference> {
        if self.is_main_wiki(entity) {
            return Ok(self.farm());
        }
        match entity.kind() {
            EntityKind::Farm => Err(AuthorizationError::Hierarchy(format!(
                "entity {} cannot carry the farm kind",
                entity
            ))),
            kind => Ok(SecurityReference::new(entity.clone(), kind)),
        }
    }

    fn parent(&self, reference: &SecurityReference) -> AuthorizationResult<Option<SecurityReference>> {
        match reference.kind() {
            EntityKind::Farm => Ok(None),
            EntityKind::Wiki => Ok(Some(self.farm())),
            EntityKind::Space | EntityKind::Document => match reference.entity().parent() {
                Some(parent) => self.security_reference(parent).map(Some),
                None => Err(AuthorizationError::Hierarchy(format!(
                    "{} {} has no parent",
                    reference.kind(),
                    reference
                ))),
            },
        }
    }

    fn farm(&self) -> SecurityReference {
        SecurityReference::new(EntityReference::wiki(self.main_wiki.clone()), EntityKind::Farm)
    }
}
