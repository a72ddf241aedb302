//! # Principals
//!
//! Users and groups that security rules are written for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a user.
///
/// A user without a wiki is a global user (defined on the main wiki).
///
/// # Example
///
/// ```
/// use security_model::UserReference;
///
/// let admin = UserReference::new("SuperAdmin");
/// assert!(admin.is_named("superadmin"));
///
/// let local = UserReference::local("dev", "Bob");
/// assert_eq!(local.wiki(), Some("dev"));
/// assert_eq!(local.to_string(), "dev:Bob");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserReference {
    /// Wiki the user is defined on; `None` for global users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
    /// User name.
    pub name: String,
}

impl UserReference {
    /// Create a global user reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            wiki: None,
            name: name.into(),
        }
    }

    /// Create a user reference local to a wiki.
    pub fn local(wiki: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            wiki: Some(wiki.into()),
            name: name.into(),
        }
    }

    /// Wiki the user is defined on, if local.
    pub fn wiki(&self) -> Option<&str> {
        self.wiki.as_deref()
    }

    /// Whether this is a global user.
    pub fn is_global(&self) -> bool {
        self.wiki.is_none()
    }

    /// Case-insensitive name comparison, ignoring the wiki.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for UserReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wiki {
            Some(wiki) => write!(f, "{}:{}", wiki, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Reference to a group of users (and possibly other groups).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupReference {
    /// Wiki the group is defined on; `None` for global groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
    /// Group name.
    pub name: String,
}

impl GroupReference {
    /// Create a global group reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            wiki: None,
            name: name.into(),
        }
    }

    /// Create a group reference local to a wiki.
    pub fn local(wiki: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            wiki: Some(wiki.into()),
            name: name.into(),
        }
    }

    /// Whether this is a global group.
    pub fn is_global(&self) -> bool {
        self.wiki.is_none()
    }
}

impl fmt::Display for GroupReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wiki {
            Some(wiki) => write!(f, "{}:{}", wiki, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// The subject a security rule applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Subject {
    /// A single user.
    User(UserReference),
    /// Every member of a group (transitively).
    Group(GroupReference),
}

impl Subject {
    /// Check whether the subject is the user or one of the given groups.
    ///
    /// # Example
    ///
    /// ```
    /// use security_model::{GroupReference, Subject, UserReference};
    ///
    /// let alice = UserReference::new("Alice");
    /// let editors = GroupReference::new("Editors");
    ///
    /// assert!(Subject::User(alice.clone()).matches(&alice, &[]));
    /// assert!(Subject::Group(editors.clone()).matches(&alice, &[editors]));
    /// assert!(!Subject::Group(GroupReference::new("Admins")).matches(&alice, &[]));
    /// ```
    pub fn matches(&self, user: &UserReference, groups: &[GroupReference]) -> bool {
        match self {
            Subject::User(subject) => subject == user,
            Subject::Group(subject) => groups.contains(subject),
        }
    }
}

impl From<UserReference> for Subject {
    fn from(user: UserReference) -> Self {
        Subject::User(user)
    }
}

impl From<GroupReference> for Subject {
    fn from(group: GroupReference) -> Self {
        Subject::Group(group)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::User(user) => write!(f, "user {}", user),
            Subject::Group(group) => write!(f, "group {}", group),
        }
    }
}
