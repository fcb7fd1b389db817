//! Tournament error types.

use super::models::{MatchNumber, ParticipantId, TournamentId};
use crate::db::timeouts::TimeoutError;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Fewer than two confirmed entrants
    #[error("Insufficient participants: need at least 2, have {0}")]
    InsufficientParticipants(usize),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Match {0} not found")]
    MatchNotFound(MatchNumber),

    #[error("Match {0} is already completed")]
    MatchCompleted(MatchNumber),

    /// A correction would change who plays a match that already started
    #[error("Cannot change the winner of match {match_number}: match {next} already started")]
    DownstreamDecided {
        match_number: MatchNumber,
        next: MatchNumber,
    },

    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    #[error("Participant {0} already registered")]
    AlreadyRegistered(ParticipantId),

    #[error("Bracket already generated")]
    BracketAlreadyGenerated,

    #[error("Bracket not generated yet")]
    BracketNotGenerated,

    /// Sets must be reported in lockstep
    #[error("Score arrays differ in length: team1 has {team1}, team2 has {team2}")]
    InvalidScores { team1: usize, team2: usize },

    #[error("Winner {winner} does not occupy a slot in match {match_number}")]
    WinnerNotInMatch {
        match_number: MatchNumber,
        winner: ParticipantId,
    },

    /// Save rejected because the stored version moved on
    #[error("Concurrent modification of tournament {id}: expected version {expected}")]
    VersionConflict { id: TournamentId, expected: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TournamentError {
    /// Whether the error is a persistence failure rather than a domain error
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            TournamentError::VersionConflict { .. }
                | TournamentError::Database(_)
                | TournamentError::Timeout(_)
                | TournamentError::Serialization(_)
        )
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Database(_)
            | TournamentError::Timeout(_)
            | TournamentError::Serialization(_) => "Internal server error".to_string(),
            TournamentError::VersionConflict { .. } => {
                "Tournament was modified concurrently, please retry".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for TournamentError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => TournamentError::Timeout(duration),
            TimeoutError::Database(e) => TournamentError::Database(e),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
