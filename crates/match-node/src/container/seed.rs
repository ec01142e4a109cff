//! # Seed File
//!
//! Users (bearer token to user id) and teams (name and captain) known to the
//! node. Loaded once at startup into the identity provider and the team
//! directory.
//!
//! ```json
//! {
//!   "users": [{ "token": "alice-token", "id": "5f0c..." }],
//!   "teams": [{ "id": "9a1e...", "name": "Northside", "captain": "5f0c..." }]
//! }
//! ```
//!
//! A team without `id` gets a fresh one, logged at startup.

use match_consensus::{InMemoryTeamDirectory, StaticIdentityProvider, TeamProfile};
use serde::Deserialize;
use shared_types::{TeamId, UserId};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Seed loading errors.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid seed JSON.
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two users share a token.
    #[error("Token is assigned to more than one user")]
    DuplicateToken,

    /// A team names a captain that is not a seeded user.
    #[error("Team {team:?} has unknown captain {captain}")]
    UnknownCaptain {
        /// Team name.
        team: String,
        /// Captain id.
        captain: UserId,
    },
}

/// One user and the token it authenticates with.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    /// Bearer token.
    pub token: String,
    /// User id.
    pub id: UserId,
}

/// One team.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedTeam {
    /// Fixed id; generated when absent.
    #[serde(default)]
    pub id: Option<TeamId>,
    /// Display name.
    pub name: String,
    /// User who acts for the team.
    pub captain: UserId,
}

/// Parsed seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    /// Known users.
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Known teams.
    #[serde(default)]
    pub teams: Vec<SeedTeam>,
}

impl SeedFile {
    /// Read and check a seed file.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse and check seed JSON.
    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        let seed: SeedFile = serde_json::from_str(raw)?;
        seed.check()?;
        Ok(seed)
    }

    fn check(&self) -> Result<(), SeedError> {
        let mut tokens = HashSet::new();
        if !self.users.iter().all(|u| tokens.insert(u.token.trim())) {
            return Err(SeedError::DuplicateToken);
        }

        let users: HashSet<UserId> = self.users.iter().map(|u| u.id).collect();
        match self.teams.iter().find(|t| !users.contains(&t.captain)) {
            Some(team) => Err(SeedError::UnknownCaptain {
                team: team.name.clone(),
                captain: team.captain,
            }),
            None => Ok(()),
        }
    }

    /// Register every user and team. Returns the stored team profiles.
    pub fn apply(
        &self,
        directory: &InMemoryTeamDirectory,
        identity: &StaticIdentityProvider,
    ) -> Vec<TeamProfile> {
        for user in &self.users {
            identity.register(user.token.trim(), user.id);
        }

        let teams: Vec<TeamProfile> = self
            .teams
            .iter()
            .map(|team| {
                let profile = TeamProfile {
                    id: team.id.unwrap_or_else(TeamId::new),
                    name: team.name.clone(),
                    captain: team.captain,
                };
                directory.register(profile.clone());
                info!(team = %profile.id, name = %profile.name, captain = %profile.captain, "Seeded team");
                profile
            })
            .collect();

        info!(users = self.users.len(), teams = teams.len(), "Seed applied");
        teams
    }
}
