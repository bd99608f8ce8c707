//! # Session
//!
//! The signed-in user. Authentication itself happens outside the
//! back-end; services only need the id (for `closedBy`/`reopenedBy`)
//! and the role (for the owner-only checks).

use serde::{Deserialize, Serialize};

use salon_core::{Role, StaffMember};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Session {
            user_id: user_id.into(),
            name: name.into(),
            role,
        }
    }

    /// Session for a staff record loaded from the `users` collection.
    pub fn from_user(user: &StaffMember) -> Self {
        Session::new(user.id.clone(), user.name.clone(), user.role)
    }

    /// True for the owner role.
    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}
