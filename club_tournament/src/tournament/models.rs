//! Tournament data models for bracket play.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament ID type
pub type TournamentId = i64;

/// Match number within a tournament (1-indexed, unique per bracket)
pub type MatchNumber = u32;

/// Points awarded for a round-robin win
pub const POINTS_PER_WIN: u32 = 3;

/// Display label used for every round-robin match
pub const ROUND_ROBIN_LABEL: &str = "Round Robin";

/// Placeholder team name for an unfilled slot
pub const TBD: &str = "TBD";

/// Opaque participant identity.
///
/// Compared by string equality only, so it survives any serialization
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
    /// Knockout bracket, losers are out
    SingleElimination,
    /// Everyone plays everyone once
    RoundRobin,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::SingleElimination => "single-elimination",
            Modality::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration state of a roster entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationStatus {
    /// Waiting for approval
    Pending,
    /// Approved, will be placed in the bracket
    Confirmed,
    /// Turned down
    Rejected,
}

/// Roster entry for a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant identity
    pub id: ParticipantId,
    /// Display name
    pub team_name: String,
    /// Seed assigned when the bracket was built
    pub seed: Option<u32>,
    /// Registration state
    pub status: RegistrationStatus,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

impl Participant {
    /// Create a pending roster entry
    pub fn new(id: impl Into<ParticipantId>, team_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            team_name: team_name.into(),
            seed: None,
            status: RegistrationStatus::Pending,
            registered_at: Utc::now(),
        }
    }

    /// Create an already confirmed roster entry
    pub fn confirmed(id: impl Into<ParticipantId>, team_name: impl Into<String>) -> Self {
        Self {
            status: RegistrationStatus::Confirmed,
            ..Self::new(id, team_name)
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }
}

/// Seeded bracket entry for single elimination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededEntry {
    pub id: ParticipantId,
    pub team_name: String,
    pub seed: u32,
}

/// Standings row for round robin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub id: ParticipantId,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
}

impl StandingEntry {
    pub fn new(id: ParticipantId, team_name: String) -> Self {
        Self {
            id,
            team_name,
            wins: 0,
            losses: 0,
            points: 0,
        }
    }
}

/// Bracket descriptor, one variant per modality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Bracket {
    SingleElimination {
        rounds: u32,
        participants: Vec<SeededEntry>,
    },
    RoundRobin {
        participants: Vec<StandingEntry>,
    },
}

impl Bracket {
    pub fn modality(&self) -> Modality {
        match self {
            Bracket::SingleElimination { .. } => Modality::SingleElimination,
            Bracket::RoundRobin { .. } => Modality::RoundRobin,
        }
    }

    /// Number of entrants placed in the bracket
    pub fn participant_count(&self) -> usize {
        match self {
            Bracket::SingleElimination { participants, .. } => participants.len(),
            Bracket::RoundRobin { participants } => participants.len(),
        }
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    /// Elimination match whose slots are not both filled yet
    Waiting,
    /// Both sides known, ready to play
    Pending,
    /// Being played
    InProgress,
    /// Result reported
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Waiting => "waiting",
            MatchStatus::Pending => "pending",
            MatchStatus::InProgress => "in-progress",
            MatchStatus::Completed => "completed",
        }
    }
}

/// One side of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSlot {
    /// Occupant, `None` while the slot is a placeholder
    pub participant_id: Option<ParticipantId>,
    pub team_name: String,
    /// Per-set scores
    pub score: Vec<u32>,
}

impl MatchSlot {
    /// Placeholder slot waiting to be filled
    pub fn tbd() -> Self {
        Self {
            participant_id: None,
            team_name: TBD.to_string(),
            score: Vec::new(),
        }
    }

    pub fn occupied(id: ParticipantId, team_name: String) -> Self {
        Self {
            participant_id: Some(id),
            team_name,
            score: Vec::new(),
        }
    }

    pub fn is_filled(&self) -> bool {
        self.participant_id.is_some()
    }

    pub fn is_occupied_by(&self, id: &ParticipantId) -> bool {
        self.participant_id.as_ref() == Some(id)
    }

    /// Place a participant into this slot
    pub fn fill(&mut self, id: ParticipantId, team_name: String) {
        self.participant_id = Some(id);
        self.team_name = team_name;
    }
}

/// A scheduled contest between two slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Display label ("Final", "Round Robin", ...)
    pub round: String,
    /// Elimination round, 1-indexed
    pub round_number: Option<u32>,
    pub match_number: MatchNumber,
    pub team1: MatchSlot,
    pub team2: MatchSlot,
    pub winner: Option<ParticipantId>,
    pub status: MatchStatus,
    /// Match that receives this match's winner
    pub next_match_number: Option<MatchNumber>,
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Whether the match is playable or being played
    pub fn is_active(&self) -> bool {
        matches!(self.status, MatchStatus::Pending | MatchStatus::InProgress)
    }
}

/// Tournament lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentState {
    /// Accepting registrations, no bracket yet
    Registration,
    /// Bracket generated, matches being played
    InProgress,
    /// Every match completed
    Completed,
}

impl TournamentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentState::Registration => "registration",
            TournamentState::InProgress => "in-progress",
            TournamentState::Completed => "completed",
        }
    }
}

/// Tournament aggregate, persisted as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub modality: Modality,
    pub state: TournamentState,
    /// Roster including unconfirmed entries
    pub participants: Vec<Participant>,
    pub bracket: Option<Bracket>,
    pub matches: Vec<Match>,
    /// Optimistic concurrency counter, bumped on every save
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a tournament in the registration state
    pub fn new(id: TournamentId, name: impl Into<String>, modality: Modality) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            modality,
            state: TournamentState::Registration,
            participants: Vec::new(),
            bracket: None,
            matches: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roster entries that may be placed in the bracket, in registration order
    pub fn confirmed_participants(&self) -> Vec<Participant> {
        self.participants
            .iter()
            .filter(|p| p.is_confirmed())
            .cloned()
            .collect()
    }

    pub fn find_match(&self, match_number: MatchNumber) -> Option<&Match> {
        self.matches.iter().find(|m| m.match_number == match_number)
    }

    pub fn find_participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }
}

/// Summary row for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub modality: Modality,
    pub state: TournamentState,
    pub registered_count: usize,
    pub match_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Tournament> for TournamentSummary {
    fn from(t: &Tournament) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            modality: t.modality,
            state: t.state,
            registered_count: t.participants.len(),
            match_count: t.matches.len(),
            created_at: t.created_at,
        }
    }
}
