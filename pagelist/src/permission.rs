use core::fmt;

use crate::{Collection, ListContext};

/// A mutation the user is attempting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Answers whether an action is allowed in a list context.
///
/// The store consults this before calling the source. A `false` answer is a user-facing
/// refusal, not an error.
pub trait PermissionGate {
    fn can_perform(&self, action: Action, context: &ListContext) -> bool;
}

impl<F> PermissionGate for F
where
    F: Fn(Action, &ListContext) -> bool,
{
    fn can_perform(&self, action: Action, context: &ListContext) -> bool {
        self(action, context)
    }
}

/// A member's role within a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl Role {
    pub fn allows(self, action: Action) -> bool {
        match self {
            Self::Owner | Self::Admin => true,
            Self::Member => matches!(action, Action::Create | Action::Update),
            Self::Viewer => false,
        }
    }
}

/// Read-only view of who is signed in and which team is selected.
///
/// Passed down explicitly to whatever needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionContext {
    pub user_id: String,
    pub team_id: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, team_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            team_id: team_id.into(),
            role,
        }
    }

    pub fn list_context(&self, collection: Collection) -> ListContext {
        ListContext::new(self.team_id.clone(), collection)
    }
}

impl PermissionGate for SessionContext {
    fn can_perform(&self, action: Action, context: &ListContext) -> bool {
        context.team_id == self.team_id && self.role.allows(action)
    }
}
