//! # Club Tournament
//!
//! Bracket generation and match progression for club tournaments.
//!
//! A tournament collects a roster, and once registrations are confirmed the
//! bracket builder lays out every match for the chosen modality. Results are
//! then reported match by match: elimination winners move forward into their
//! next match, round-robin results update the standings table.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Data model, bracket builder, progression engine, stats
//!   and the [`TournamentManager`] that ties them to storage
//! - [`db`]: PostgreSQL pool, versioned tournament repository and an
//!   in-memory repository
//!
//! ## Example
//!
//! ```
//! use club_tournament::tournament::{build_bracket, Modality, Participant};
//!
//! let roster = vec![
//!     Participant::confirmed("a", "Aces"),
//!     Participant::confirmed("b", "Blockers"),
//!     Participant::confirmed("c", "Diggers"),
//!     Participant::confirmed("d", "Setters"),
//! ];
//!
//! let built = build_bracket(Modality::SingleElimination, &roster).unwrap();
//! assert_eq!(built.matches.len(), 3);
//! ```

/// Database pool and tournament persistence.
pub mod db;

/// Tournament data model and engine.
pub mod tournament;

pub use tournament::{TournamentError, TournamentManager, TournamentResult};
