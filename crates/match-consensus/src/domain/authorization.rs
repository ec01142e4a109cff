//! # Authorization Guard
//!
//! Pure role checks against a snapshot of the entity being acted on. Every
//! mutating operation runs one of these before it touches the store.

use shared_types::UserId;
use std::fmt;
use tracing::debug;

use super::entities::{MatchRequest, MatchResult, TeamProfile};
use super::errors::ConsensusError;

/// Role an operation requires of its caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The challenging side (its captain, before a request exists).
    Challenger,
    /// The challenged side.
    Opponent,
    /// Either side of the request.
    EitherParticipant,
    /// The participant who did not report the outcome.
    ReporterCounterpart,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Challenger => "challenger",
            Role::Opponent => "opponent",
            Role::EitherParticipant => "participant",
            Role::ReporterCounterpart => "reporter counterpart",
        };
        f.write_str(name)
    }
}

/// What the caller is acting on.
#[derive(Clone, Copy, Debug)]
pub enum AuthSubject<'a> {
    /// A team, before any request exists.
    Team(&'a TeamProfile),
    /// A match request.
    Request(&'a MatchRequest),
    /// A reported outcome with its parent request.
    Outcome {
        /// Parent request
        request: &'a MatchRequest,
        /// Reported result
        result: &'a MatchResult,
    },
}

/// Stateless role checker.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Create a guard.
    pub fn new() -> Self {
        Self
    }

    /// Check that `actor` holds `role` on `subject`.
    ///
    /// `ReporterCounterpart` fails `Unauthorized` for outsiders and
    /// `SelfVerification` for the reporter.
    pub fn authorize(
        &self,
        actor: UserId,
        subject: AuthSubject<'_>,
        role: Role,
    ) -> Result<(), ConsensusError> {
        let outcome = match (subject, role) {
            (AuthSubject::Team(team), Role::Challenger) => {
                if team.captain == actor {
                    Ok(())
                } else {
                    Err(ConsensusError::Unauthorized(format!(
                        "user does not represent team {}",
                        team.id
                    )))
                }
            }
            (AuthSubject::Team(team), role) => Err(ConsensusError::Unauthorized(format!(
                "role {role} cannot be held on team {}",
                team.id
            ))),

            (AuthSubject::Request(request), role)
            | (AuthSubject::Outcome { request, .. }, role)
                if role != Role::ReporterCounterpart =>
            {
                Self::check_request_role(actor, request, role)
            }

            (AuthSubject::Outcome { request, result }, _) => {
                if !request.is_participant(actor) {
                    Err(ConsensusError::Unauthorized(format!(
                        "user is not a participant of match {}",
                        request.id
                    )))
                } else if result.reporter_user == actor {
                    Err(ConsensusError::SelfVerification)
                } else {
                    Ok(())
                }
            }

            (AuthSubject::Request(request), _) => Err(ConsensusError::Unauthorized(format!(
                "match {} has no reported outcome to verify",
                request.id
            ))),
        };

        debug!(
            actor = %actor,
            role = %role,
            allowed = outcome.is_ok(),
            "Authorization decision"
        );
        outcome
    }

    fn check_request_role(
        actor: UserId,
        request: &MatchRequest,
        role: Role,
    ) -> Result<(), ConsensusError> {
        let allowed = match role {
            Role::Challenger => request.challenger_user == actor,
            Role::Opponent => request.opponent_user == actor,
            Role::EitherParticipant => request.is_participant(actor),
            Role::ReporterCounterpart => false,
        };
        if allowed {
            Ok(())
        } else {
            let holder = match role {
                Role::EitherParticipant => "a participant".to_string(),
                _ => format!("the {role}"),
            };
            Err(ConsensusError::Unauthorized(format!(
                "user is not {holder} of match {}",
                request.id
            )))
        }
    }
}
