//! # Entities
//!
//! Entity kinds and parent-linked entity references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kinds of entity a right can be enabled on.
///
/// `Farm` only exists in the security hierarchy: it is the root that stands
/// for the whole installation (the main wiki).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The farm root (main wiki).
    Farm,
    /// A wiki.
    Wiki,
    /// A space, possibly nested in another space.
    Space,
    /// A document.
    Document,
}

impl EntityKind {
    /// Number of entity kinds.
    pub const COUNT: usize = 4;

    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Farm => "farm",
            EntityKind::Wiki => "wiki",
            EntityKind::Space => "space",
            EntityKind::Document => "document",
        }
    }

    /// Parse a kind from its string representation (case-insensitive).
    ///
    /// # Example
    ///
    /// ```
    /// use security_model::EntityKind;
    ///
    /// assert_eq!(EntityKind::parse("space"), Some(EntityKind::Space));
    /// assert_eq!(EntityKind::parse("main"), Some(EntityKind::Farm));
    /// assert_eq!(EntityKind::parse("attachment"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "farm" | "main" | "mainwiki" => Some(EntityKind::Farm),
            "wiki" => Some(EntityKind::Wiki),
            "space" => Some(EntityKind::Space),
            "document" | "doc" | "page" => Some(EntityKind::Document),
            _ => None,
        }
    }

    /// Get all kinds, root first.
    pub fn all() -> [EntityKind; EntityKind::COUNT] {
        [
            EntityKind::Farm,
            EntityKind::Wiki,
            EntityKind::Space,
            EntityKind::Document,
        ]
    }

    /// Dense index of the kind, usable for fixed-size per-kind tables.
    pub fn index(&self) -> usize {
        match self {
            EntityKind::Farm => 0,
            EntityKind::Wiki => 1,
            EntityKind::Space => 2,
            EntityKind::Document => 3,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct EntityNode {
    kind: EntityKind,
    name: String,
    parent: Option<EntityReference>,
}

/// An immutable reference to a wiki, space or document.
///
/// References share their ancestors, so cloning is cheap and building a
/// child never copies the parent chain. Equality and hashing cover the whole
/// chain: `a:Main.Page` and `b:Main.Page` are different references.
///
/// # Example
///
/// ```
/// use security_model::{EntityKind, EntityReference};
///
/// let wiki = EntityReference::wiki("dev");
/// let page = wiki.space("Main").space("Sub").document("Page");
///
/// assert_eq!(page.parent().map(|p| p.name()), Some("Sub"));
/// assert_eq!(page.containing_wiki(), &wiki);
/// assert!(page.is_within(&wiki));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityReference {
    node: Arc<EntityNode>,
}

impl EntityReference {
    fn with_parent(kind: EntityKind, name: impl Into<String>, parent: Option<EntityReference>) -> Self {
        Self {
            node: Arc::new(EntityNode {
                kind,
                name: name.into(),
                parent,
            }),
        }
    }

    /// Create a reference to a wiki.
    pub fn wiki(name: impl Into<String>) -> Self {
        Self::with_parent(EntityKind::Wiki, name, None)
    }

    /// Create a reference to a space below this wiki or space.
    pub fn space(&self, name: impl Into<String>) -> Self {
        Self::with_parent(EntityKind::Space, name, Some(self.clone()))
    }

    /// Create a reference to a document below this space.
    pub fn document(&self, name: impl Into<String>) -> Self {
        Self::with_parent(EntityKind::Document, name, Some(self.clone()))
    }

    /// Model kind of the entity (never `Farm`).
    pub fn kind(&self) -> EntityKind {
        self.node.kind
    }

    /// Local name of the entity.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Parent in the model hierarchy, `None` for wikis.
    pub fn parent(&self) -> Option<&EntityReference> {
        self.node.parent.as_ref()
    }

    /// The wiki this entity lives in (itself for a wiki).
    pub fn containing_wiki(&self) -> &EntityReference {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Iterate over this entity and its model ancestors, nearest first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Check whether `other` is this entity or one of its model ancestors.
    pub fn is_within(&self, other: &EntityReference) -> bool {
        self.ancestors().any(|reference| reference == other)
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chain: Vec<&EntityReference> = self.ancestors().collect();
        chain.reverse();

        let mut first_local = true;
        for reference in chain {
            match reference.kind() {
                EntityKind::Wiki | EntityKind::Farm => {
                    write!(f, "{}:", reference.name())?;
                }
                EntityKind::Space | EntityKind::Document => {
                    if !first_local {
                        f.write_str(".")?;
                    }
                    f.write_str(reference.name())?;
                    first_local = false;
                }
            }
        }
        Ok(())
    }
}

/// Iterator over an entity and its model ancestors.
pub struct Ancestors<'a> {
    next: Option<&'a EntityReference>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a EntityReference;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
