//! # Match Events
//!
//! Every notification the consensus engine emits. Each participant-facing
//! event names the single user it is addressed to.

use serde::{Deserialize, Serialize};
use shared_types::{
    MatchDecision, MatchRequestId, MatchResultId, TeamId, UserId, VerificationDecision,
};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    // =========================================================================
    // NEGOTIATION
    // =========================================================================
    /// A challenge was issued. Addressed to the opponent representative.
    MatchProposed {
        request_id: MatchRequestId,
        challenger_team: TeamId,
        opponent_team: TeamId,
        match_type: String,
        recipient: UserId,
    },

    /// The opponent accepted or declined. Addressed to the challenger.
    MatchResponded {
        request_id: MatchRequestId,
        decision: MatchDecision,
        recipient: UserId,
    },

    /// One participant marked the match as played. Addressed to the other one.
    MatchCompleted {
        request_id: MatchRequestId,
        completed_by: UserId,
        recipient: UserId,
    },

    // =========================================================================
    // OUTCOME
    // =========================================================================
    /// An outcome was reported. Addressed to the counter-party who must verify it.
    OutcomeReported {
        request_id: MatchRequestId,
        result_id: MatchResultId,
        winner_team: TeamId,
        recipient: UserId,
    },

    /// The counter-party confirmed or disputed. Addressed to the reporter.
    OutcomeVerified {
        request_id: MatchRequestId,
        result_id: MatchResultId,
        decision: VerificationDecision,
        recipient: UserId,
    },

    // =========================================================================
    // STATISTICS
    // =========================================================================
    /// A team's aggregate changed after a confirmed outcome.
    StatisticsUpdated {
        team_id: TeamId,
        wins: u32,
        losses: u32,
        total_matches: u32,
        win_rate: f64,
    },
}

impl MatchEvent {
    /// Topic this event is published under.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::MatchProposed { .. }
            | Self::MatchResponded { .. }
            | Self::MatchCompleted { .. } => EventTopic::Negotiation,
            Self::OutcomeReported { .. } | Self::OutcomeVerified { .. } => EventTopic::Outcome,
            Self::StatisticsUpdated { .. } => EventTopic::Statistics,
        }
    }

    /// The user this event is addressed to, if it is participant-facing.
    #[must_use]
    pub fn recipient(&self) -> Option<UserId> {
        match self {
            Self::MatchProposed { recipient, .. }
            | Self::MatchResponded { recipient, .. }
            | Self::MatchCompleted { recipient, .. }
            | Self::OutcomeReported { recipient, .. }
            | Self::OutcomeVerified { recipient, .. } => Some(*recipient),
            Self::StatisticsUpdated { .. } => None,
        }
    }

    /// The match request this event concerns, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<MatchRequestId> {
        match self {
            Self::MatchProposed { request_id, .. }
            | Self::MatchResponded { request_id, .. }
            | Self::MatchCompleted { request_id, .. }
            | Self::OutcomeReported { request_id, .. }
            | Self::OutcomeVerified { request_id, .. } => Some(*request_id),
            Self::StatisticsUpdated { .. } => None,
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Proposal, response and completion events.
    Negotiation,
    /// Report and verification events.
    Outcome,
    /// Team aggregate updates.
    Statistics,
    /// Wildcard.
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to subscribe to. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only deliver events addressed to this user.
    pub recipient: Option<UserId>,
}

impl EventFilter {
    /// Create a filter that matches all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            recipient: None,
        }
    }

    /// Create a filter for everything addressed to one user.
    #[must_use]
    pub fn for_recipient(user: UserId) -> Self {
        Self {
            topics: Vec::new(),
            recipient: Some(user),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MatchEvent) -> bool {
        let topic_ok = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let recipient_ok = match self.recipient {
            None => true,
            Some(user) => event.recipient() == Some(user),
        };

        topic_ok && recipient_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposed(recipient: UserId) -> MatchEvent {
        MatchEvent::MatchProposed {
            request_id: MatchRequestId::new(),
            challenger_team: TeamId::new(),
            opponent_team: TeamId::new(),
            match_type: "scrim".to_string(),
            recipient,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(proposed(UserId::new()).topic(), EventTopic::Negotiation);

        let stats = MatchEvent::StatisticsUpdated {
            team_id: TeamId::new(),
            wins: 1,
            losses: 0,
            total_matches: 1,
            win_rate: 1.0,
        };
        assert_eq!(stats.topic(), EventTopic::Statistics);
        assert!(stats.recipient().is_none());
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&proposed(UserId::new())));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Outcome]);
        assert!(!filter.matches(&proposed(UserId::new())));

        let reported = MatchEvent::OutcomeReported {
            request_id: MatchRequestId::new(),
            result_id: MatchResultId::new(),
            winner_team: TeamId::new(),
            recipient: UserId::new(),
        };
        assert!(filter.matches(&reported));
    }

    #[test]
    fn test_filter_by_recipient() {
        let me = UserId::new();
        let filter = EventFilter::for_recipient(me);
        assert!(filter.matches(&proposed(me)));
        assert!(!filter.matches(&proposed(UserId::new())));
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_value(proposed(UserId::new())).unwrap();
        assert_eq!(json["type"], "match_proposed");
        assert_eq!(json["match_type"], "scrim");
    }
}
