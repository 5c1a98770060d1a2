use std::collections::HashSet;

use lectern_types::UserId;

/// Identity collaborator: decides who may edit locked text versions.
pub trait Authorizer: Send + Sync {
    fn is_privileged(&self, user: Option<&UserId>) -> bool;
}

/// A fixed set of privileged users, or everyone.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    privileged: HashSet<UserId>,
    everyone: bool,
}

impl StaticAuthorizer {
    /// Nobody is privileged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everybody, including anonymous callers, is privileged.
    pub fn open() -> Self {
        Self {
            privileged: HashSet::new(),
            everyone: true,
        }
    }

    pub fn with_privileged(mut self, user: UserId) -> Self {
        self.privileged.insert(user);
        self
    }
}

impl Authorizer for StaticAuthorizer {
    fn is_privileged(&self, user: Option<&UserId>) -> bool {
        self.everyone || user.is_some_and(|u| self.privileged.contains(u))
    }
}
