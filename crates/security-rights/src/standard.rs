//! # Standard Rights
//!
//! The rights every registry built with [`RightRegistry::new`] starts with,
//! in ordinal order.
//!
//! | Right | Default | Tie | Overridable | Enabled on | Read-only safe |
//! |-------|---------|-----|-------------|------------|----------------|
//! | login | allow | allow | yes | wiki | yes |
//! | view | allow | allow | yes | wiki, space, document | yes |
//! | edit | deny | deny | yes | wiki, space, document | no |
//! | delete | deny | deny | yes | wiki, space, document | no |
//! | register | allow | allow | yes | wiki | no |
//! | comment | deny | deny | yes | wiki, space, document | no |
//! | programming | deny | allow | no | farm | yes |
//! | admin | deny | allow | no | wiki, space | yes |
//!
//! [`RightRegistry::new`]: crate::RightRegistry::new

use security_model::EntityKind;

use crate::right::RightDescription;
use crate::state::RuleState::{Allow, Deny};

/// Log in to a wiki.
pub const LOGIN: &str = "login";
/// View an entity.
pub const VIEW: &str = "view";
/// Modify an entity.
pub const EDIT: &str = "edit";
/// Delete an entity.
pub const DELETE: &str = "delete";
/// Register a new account on a wiki.
pub const REGISTER: &str = "register";
/// Comment on an entity.
pub const COMMENT: &str = "comment";
/// Run privileged scripts on the farm.
pub const PROGRAM: &str = "programming";
/// Administer a wiki or space.
pub const ADMIN: &str = "admin";

const CONTENT_KINDS: [EntityKind; 3] = [EntityKind::Wiki, EntityKind::Space, EntityKind::Document];

/// Descriptions of the standard rights, in registration order.
pub fn descriptions() -> Vec<RightDescription> {
    vec![
        RightDescription::new(LOGIN, Allow, Allow)
            .targets([EntityKind::Wiki])
            .read_only(true),
        RightDescription::new(VIEW, Allow, Allow)
            .targets(CONTENT_KINDS)
            .read_only(true),
        RightDescription::new(EDIT, Deny, Deny).targets(CONTENT_KINDS),
        RightDescription::new(DELETE, Deny, Deny).targets(CONTENT_KINDS),
        RightDescription::new(REGISTER, Allow, Allow).targets([EntityKind::Wiki]),
        RightDescription::new(COMMENT, Deny, Deny).targets(CONTENT_KINDS),
        RightDescription::new(PROGRAM, Deny, Allow)
            .inheritance_override(false)
            .implies([LOGIN, VIEW, EDIT, DELETE, REGISTER, COMMENT])
            .targets([EntityKind::Farm])
            .read_only(true),
        RightDescription::new(ADMIN, Deny, Allow)
            .inheritance_override(false)
            .implies([LOGIN, VIEW, EDIT, DELETE, REGISTER, COMMENT, PROGRAM])
            .targets([EntityKind::Wiki, EntityKind::Space])
            .read_only(true),
    ]
}

/// Names of the standard rights, in registration order.
pub fn names() -> [&'static str; 8] {
    [LOGIN, VIEW, EDIT, DELETE, REGISTER, COMMENT, PROGRAM, ADMIN]
}
