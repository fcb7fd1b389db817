//! Tournament module for bracket play.
//!
//! This module provides:
//! - Roster registration and approval
//! - Bracket generation for single elimination and round robin
//! - Match progression with winner propagation and standings
//! - Progress and standings snapshots
//!
//! ## Example
//!
//! ```no_run
//! use club_tournament::db::InMemoryTournamentRepository;
//! use club_tournament::tournament::{
//!     ManagerConfig, Modality, RegistrationStatus, TournamentManager,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Arc::new(InMemoryTournamentRepository::new());
//!     let manager = TournamentManager::new(repo, ManagerConfig::default());
//!
//!     let cup = manager
//!         .create_tournament("Beach Cup", Modality::SingleElimination)
//!         .await?;
//!
//!     for (id, team) in [("t1", "Sand Sharks"), ("t2", "Net Ninjas")] {
//!         manager
//!             .register_participant(cup.id, id.into(), team.to_string())
//!             .await?;
//!         manager
//!             .set_participant_status(cup.id, id.into(), RegistrationStatus::Confirmed)
//!             .await?;
//!     }
//!
//!     let cup = manager.generate_bracket(cup.id).await?;
//!     println!("{} matches scheduled", cup.matches.len());
//!
//!     Ok(())
//! }
//! ```

pub mod bracket;
pub mod errors;
pub mod manager;
pub mod models;
pub mod progression;
pub mod stats;

pub use bracket::{BuiltBracket, build_bracket, round_name};
pub use errors::{TournamentError, TournamentResult};
pub use manager::{DEFAULT_MAX_CONFLICT_RETRIES, ManagerConfig, TournamentManager};
pub use models::{
    Bracket, Match, MatchNumber, MatchSlot, MatchStatus, Modality, Participant, ParticipantId,
    RegistrationStatus, SeededEntry, StandingEntry, Tournament, TournamentId, TournamentState,
    TournamentSummary,
};
pub use progression::{MatchReport, ResultOutcome, report_result, start_match};
pub use stats::{TournamentStats, get_stats};
