//! HTTP server for club tournaments.
//!
//! Exposes the [`club_tournament`] manager over a JSON API. Storage is
//! PostgreSQL by default or an in-memory repository for local runs.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
