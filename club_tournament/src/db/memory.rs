//! In-memory tournament storage with the same version semantics as the
//! PostgreSQL repository. Used by tests and by servers started without a
//! database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::repository::TournamentRepository;
use crate::tournament::{
    Modality, Tournament, TournamentError, TournamentId, TournamentResult, TournamentSummary,
};

pub struct InMemoryTournamentRepository {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
    next_id: AtomicI64,
}

impl Default for InMemoryTournamentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn create(&self, name: &str, modality: Modality) -> TournamentResult<Tournament> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tournament = Tournament::new(id, name, modality);
        self.tournaments
            .write()
            .await
            .insert(id, tournament.clone());
        Ok(tournament)
    }

    async fn load(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.tournaments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    async fn list(&self) -> TournamentResult<Vec<TournamentSummary>> {
        let tournaments = self.tournaments.read().await;
        let mut summaries: Vec<_> = tournaments.values().map(TournamentSummary::from).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }

    async fn save(&self, tournament: &Tournament) -> TournamentResult<Tournament> {
        let mut tournaments = self.tournaments.write().await;
        let stored = tournaments
            .get_mut(&tournament.id)
            .ok_or(TournamentError::TournamentNotFound(tournament.id))?;

        if stored.version != tournament.version {
            return Err(TournamentError::VersionConflict {
                id: tournament.id,
                expected: tournament.version,
            });
        }

        let mut updated = tournament.clone();
        updated.version += 1;
        updated.updated_at = Utc::now();
        *stored = updated.clone();

        Ok(updated)
    }
}
