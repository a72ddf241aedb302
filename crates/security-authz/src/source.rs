//! Sources the authorization manager reads from.
//!
//! Rule storage and group membership live outside this crate; they are
//! consumed through these traits.

use security_model::{GroupReference, UserReference};

use crate::error::AuthorizationResult;
use crate::hierarchy::SecurityReference;
use crate::rule::SecurityRuleEntry;

/// Reads the rules declared directly on a level.
pub trait SecurityRuleReader: Send + Sync {
    /// Rules of the level, an empty entry when it has none.
    ///
    /// # Errors
    ///
    /// Returns `RuleStore` when the backing store fails.
    fn read(&self, reference: &SecurityReference) -> AuthorizationResult<SecurityRuleEntry>;
}

/// Lists direct group memberships.
pub trait GroupSource: Send + Sync {
    /// Groups the user is a direct member of.
    fn groups_of_user(&self, user: &UserReference) -> AuthorizationResult<Vec<GroupReference>>;

    /// Groups the group is a direct member of.
    fn groups_of_group(&self, group: &GroupReference) -> AuthorizationResult<Vec<GroupReference>>;
}
