//! Team directory and identity provider backed by process memory.
//!
//! Populated at startup from the node's seed file, or directly by tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{TeamId, UserId};
use std::collections::HashMap;

use crate::domain::TeamProfile;
use crate::ports::{IdentityProvider, TeamDirectory};

/// Mutable team registry.
#[derive(Default)]
pub struct InMemoryTeamDirectory {
    teams: RwLock<HashMap<TeamId, TeamProfile>>,
}

impl InMemoryTeamDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a team.
    pub fn register(&self, profile: TeamProfile) {
        self.teams.write().insert(profile.id, profile);
    }

    /// Create and register a team captained by `captain`.
    pub fn create_team(&self, name: impl Into<String>, captain: UserId) -> TeamProfile {
        let profile = TeamProfile {
            id: TeamId::new(),
            name: name.into(),
            captain,
        };
        self.register(profile.clone());
        profile
    }

    /// Number of registered teams.
    pub fn len(&self) -> usize {
        self.teams.read().len()
    }

    /// Whether no team is registered.
    pub fn is_empty(&self) -> bool {
        self.teams.read().is_empty()
    }
}

impl TeamDirectory for InMemoryTeamDirectory {
    fn team(&self, id: TeamId) -> Option<TeamProfile> {
        self.teams.read().get(&id).cloned()
    }
}

/// Bearer-token to user lookup table.
#[derive(Default)]
pub struct StaticIdentityProvider {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl StaticIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `user`.
    pub fn register(&self, token: impl Into<String>, user: UserId) {
        self.tokens.write().insert(token.into(), user);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, credential: &str) -> Option<UserId> {
        let credential = credential.trim();
        if credential.is_empty() {
            return None;
        }
        self.tokens.read().get(credential).copied()
    }
}
