//! Role and member lookups.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

/// Access to the chat service's roles and members.
#[async_trait]
pub trait Permissions: Send + Sync {
    /// Whether the requester holds the elevated role in `scope_id`.
    async fn has_elevated_role(&self, requester_id: &str, scope_id: &str) -> bool;

    /// Find a member's id by display name, for reassigning authors.
    async fn find_member(&self, scope_id: &str, display_name: &str) -> Option<String>;
}

/// Fixed admin and member lists, for the console front end and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    admins: HashSet<String>,
    members: HashMap<String, String>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elevated in every scope.
    pub fn with_admin(mut self, user_id: impl Into<String>) -> Self {
        self.admins.insert(user_id.into());
        self
    }

    pub fn with_member(mut self, display_name: &str, user_id: impl Into<String>) -> Self {
        self.members.insert(display_name.to_lowercase(), user_id.into());
        self
    }
}

#[async_trait]
impl Permissions for StaticPermissions {
    async fn has_elevated_role(&self, requester_id: &str, _scope_id: &str) -> bool {
        self.admins.contains(requester_id)
    }

    async fn find_member(&self, _scope_id: &str, display_name: &str) -> Option<String> {
        self.members.get(&display_name.to_lowercase()).cloned()
    }
}
