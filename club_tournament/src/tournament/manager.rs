//! Tournament manager: roster workflow, bracket generation and result
//! reporting on top of a [`TournamentRepository`].

use super::bracket::build_bracket;
use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Bracket, Match, MatchNumber, Modality, Participant, ParticipantId, RegistrationStatus,
    Tournament, TournamentId, TournamentState, TournamentSummary,
};
use super::progression::{self, MatchReport, ResultOutcome};
use super::stats::{self, TournamentStats};
use crate::db::TournamentRepository;
use std::sync::Arc;

/// Default number of times a mutation is re-run after a version conflict
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Re-runs of the load-mutate-save cycle after a version conflict
    pub max_conflict_retries: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn TournamentRepository>,
    config: ManagerConfig,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(repo: Arc<dyn TournamentRepository>, config: ManagerConfig) -> Self {
        Self { repo, config }
    }

    /// Create a new tournament open for registration
    pub async fn create_tournament(
        &self,
        name: &str,
        modality: Modality,
    ) -> TournamentResult<Tournament> {
        let tournament = self.repo.create(name, modality).await?;
        log::info!(
            "Created {} tournament {} ({})",
            modality,
            tournament.id,
            tournament.name
        );
        Ok(tournament)
    }

    /// Get a tournament with its roster, bracket and matches
    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.repo.load(id).await
    }

    /// List all tournaments
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentSummary>> {
        self.repo.list().await
    }

    /// Add a pending roster entry
    ///
    /// # Errors
    ///
    /// * `TournamentError::AlreadyRegistered` - id already on the roster
    /// * `TournamentError::BracketAlreadyGenerated` - roster is frozen
    pub async fn register_participant(
        &self,
        id: TournamentId,
        participant_id: ParticipantId,
        team_name: String,
    ) -> TournamentResult<Participant> {
        let (_, participant) = self
            .mutate(id, |t| {
                ensure_registration_open(t)?;
                if t.find_participant(&participant_id).is_some() {
                    return Err(TournamentError::AlreadyRegistered(participant_id.clone()));
                }

                let participant = Participant::new(participant_id.clone(), team_name.clone());
                t.participants.push(participant.clone());
                Ok(participant)
            })
            .await?;

        Ok(participant)
    }

    /// Confirm or reject a roster entry
    ///
    /// # Errors
    ///
    /// * `TournamentError::ParticipantNotFound` - id not on the roster
    /// * `TournamentError::BracketAlreadyGenerated` - roster is frozen
    pub async fn set_participant_status(
        &self,
        id: TournamentId,
        participant_id: ParticipantId,
        status: RegistrationStatus,
    ) -> TournamentResult<Participant> {
        let (_, participant) = self
            .mutate(id, |t| {
                ensure_registration_open(t)?;
                let participant = t
                    .participants
                    .iter_mut()
                    .find(|p| p.id == participant_id)
                    .ok_or_else(|| TournamentError::ParticipantNotFound(participant_id.clone()))?;

                participant.status = status;
                Ok(participant.clone())
            })
            .await?;

        Ok(participant)
    }

    /// Build the bracket from the confirmed roster and start the tournament
    ///
    /// # Errors
    ///
    /// * `TournamentError::InsufficientParticipants` - fewer than two confirmed
    /// * `TournamentError::BracketAlreadyGenerated` - bracket exists
    pub async fn generate_bracket(&self, id: TournamentId) -> TournamentResult<Tournament> {
        let (tournament, ()) = self
            .mutate(id, |t| {
                ensure_registration_open(t)?;

                let confirmed = t.confirmed_participants();
                let built = build_bracket(t.modality, &confirmed)?;

                if let Bracket::SingleElimination { participants, .. } = &built.bracket {
                    for entry in participants {
                        if let Some(p) = t.participants.iter_mut().find(|p| p.id == entry.id) {
                            p.seed = Some(entry.seed);
                        }
                    }
                }

                t.bracket = Some(built.bracket);
                t.matches = built.matches;
                t.state = TournamentState::InProgress;
                Ok(())
            })
            .await?;

        log::info!(
            "Generated {} bracket for tournament {}: {} participants, {} matches",
            tournament.modality,
            tournament.id,
            tournament
                .bracket
                .as_ref()
                .map_or(0, Bracket::participant_count),
            tournament.matches.len()
        );

        Ok(tournament)
    }

    /// Mark a match as in progress
    pub async fn start_match(
        &self,
        id: TournamentId,
        match_number: MatchNumber,
    ) -> TournamentResult<Match> {
        let (tournament, ()) = self
            .mutate(id, |t| progression::start_match(t, match_number))
            .await?;

        tournament
            .find_match(match_number)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(match_number))
    }

    /// Record a match result, propagate the winner and update standings
    pub async fn report_result(
        &self,
        id: TournamentId,
        match_number: MatchNumber,
        report: MatchReport,
    ) -> TournamentResult<(Tournament, ResultOutcome)> {
        let (tournament, outcome) = self
            .mutate(id, |t| progression::report_result(t, match_number, &report))
            .await?;

        log::info!(
            "Tournament {}: match {} won by {}",
            id,
            match_number,
            report.winner_id
        );
        if outcome.tournament_completed {
            log::info!("Tournament {} completed", id);
        }

        Ok((tournament, outcome))
    }

    /// Current progress snapshot
    pub async fn get_stats(&self, id: TournamentId) -> TournamentResult<TournamentStats> {
        let tournament = self.repo.load(id).await?;
        Ok(stats::get_stats(&tournament))
    }

    /// Run a load-mutate-save cycle, re-running it from a fresh load when the
    /// save hits a version conflict. Domain and storage errors are returned
    /// as-is.
    async fn mutate<T, F>(&self, id: TournamentId, mutation: F) -> TournamentResult<(Tournament, T)>
    where
        F: Fn(&mut Tournament) -> TournamentResult<T> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            let mut tournament = self.repo.load(id).await?;
            let value = mutation(&mut tournament)?;

            match self.repo.save(&tournament).await {
                Ok(stored) => return Ok((stored, value)),
                Err(TournamentError::VersionConflict { .. })
                    if attempt < self.config.max_conflict_retries =>
                {
                    attempt += 1;
                    log::warn!(
                        "Version conflict on tournament {}, retrying ({}/{})",
                        id,
                        attempt,
                        self.config.max_conflict_retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn ensure_registration_open(tournament: &Tournament) -> TournamentResult<()> {
    if tournament.bracket.is_some() || tournament.state != TournamentState::Registration {
        return Err(TournamentError::BracketAlreadyGenerated);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryTournamentRepository;
    use crate::tournament::models::MatchStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn manager() -> TournamentManager {
        TournamentManager::new(
            Arc::new(InMemoryTournamentRepository::new()),
            ManagerConfig::default(),
        )
    }

    async fn confirmed_tournament(
        mgr: &TournamentManager,
        modality: Modality,
        names: &[&str],
    ) -> TournamentId {
        let t = mgr.create_tournament("Club Cup", modality).await.unwrap();
        for name in names {
            mgr.register_participant(t.id, (*name).into(), format!("Team {}", name))
                .await
                .unwrap();
            mgr.set_participant_status(t.id, (*name).into(), RegistrationStatus::Confirmed)
                .await
                .unwrap();
        }
        t.id
    }

    fn win(winner: &str) -> MatchReport {
        MatchReport {
            team1_score: vec![25, 25],
            team2_score: vec![17, 23],
            winner_id: winner.into(),
        }
    }

    #[tokio::test]
    async fn test_only_confirmed_participants_are_placed() {
        let mgr = manager();
        let id = confirmed_tournament(&mgr, Modality::SingleElimination, &["A", "B", "C"]).await;
        mgr.register_participant(id, "D".into(), "Team D".to_string())
            .await
            .unwrap();
        mgr.register_participant(id, "E".into(), "Team E".to_string())
            .await
            .unwrap();
        mgr.set_participant_status(id, "E".into(), RegistrationStatus::Rejected)
            .await
            .unwrap();

        let t = mgr.generate_bracket(id).await.unwrap();

        assert_eq!(t.state, TournamentState::InProgress);
        assert_eq!(t.bracket.as_ref().unwrap().participant_count(), 3);
        assert_eq!(t.find_participant(&"A".into()).unwrap().seed, Some(1));
        assert_eq!(t.find_participant(&"C".into()).unwrap().seed, Some(3));
        assert_eq!(t.find_participant(&"D".into()).unwrap().seed, None);
    }

    #[tokio::test]
    async fn test_generate_requires_two_confirmed() {
        let mgr = manager();
        let id = confirmed_tournament(&mgr, Modality::RoundRobin, &["A"]).await;
        mgr.register_participant(id, "B".into(), "Team B".to_string())
            .await
            .unwrap();

        let err = mgr.generate_bracket(id).await.unwrap_err();
        assert!(matches!(err, TournamentError::InsufficientParticipants(1)));

        // Nothing was persisted
        let t = mgr.get_tournament(id).await.unwrap();
        assert!(t.bracket.is_none());
        assert!(t.matches.is_empty());
        assert_eq!(t.state, TournamentState::Registration);
    }

    #[tokio::test]
    async fn test_bracket_generated_once() {
        let mgr = manager();
        let id = confirmed_tournament(&mgr, Modality::RoundRobin, &["A", "B"]).await;
        mgr.generate_bracket(id).await.unwrap();

        let err = mgr.generate_bracket(id).await.unwrap_err();
        assert!(matches!(err, TournamentError::BracketAlreadyGenerated));

        let err = mgr
            .register_participant(id, "C".into(), "Team C".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::BracketAlreadyGenerated));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let mgr = manager();
        let id = confirmed_tournament(&mgr, Modality::RoundRobin, &["A"]).await;

        let err = mgr
            .register_participant(id, "A".into(), "Other".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::AlreadyRegistered(_)));
    }

    #[tokio::test]
    async fn test_unknown_participant_and_tournament() {
        let mgr = manager();
        let id = confirmed_tournament(&mgr, Modality::RoundRobin, &["A"]).await;

        let err = mgr
            .set_participant_status(id, "Z".into(), RegistrationStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::ParticipantNotFound(_)));

        let err = mgr.get_stats(404).await.unwrap_err();
        assert!(matches!(err, TournamentError::TournamentNotFound(404)));
    }

    #[tokio::test]
    async fn test_full_elimination_flow() {
        let mgr = manager();
        let id =
            confirmed_tournament(&mgr, Modality::SingleElimination, &["A", "B", "C", "D"]).await;
        mgr.generate_bracket(id).await.unwrap();

        let started = mgr.start_match(id, 1).await.unwrap();
        assert_eq!(started.status, MatchStatus::InProgress);

        let (_, outcome) = mgr.report_result(id, 1, win("A")).await.unwrap();
        assert_eq!(outcome.advanced_to, Some(3));
        let (_, outcome) = mgr.report_result(id, 2, win("D")).await.unwrap();
        assert!(outcome.next_match_ready);
        let (t, outcome) = mgr.report_result(id, 3, win("D")).await.unwrap();
        assert!(outcome.tournament_completed);
        assert_eq!(t.state, TournamentState::Completed);

        let stats = mgr.get_stats(id).await.unwrap();
        assert_eq!(stats.completed_matches, 3);
        assert_eq!(stats.current_round, "Completed");
        assert_eq!(stats.champion, Some("D".into()));
    }

    /// Repository whose first saves fail with a version conflict
    struct ConflictingRepository {
        inner: InMemoryTournamentRepository,
        conflicts_left: AtomicU32,
    }

    #[async_trait]
    impl TournamentRepository for ConflictingRepository {
        async fn create(&self, name: &str, modality: Modality) -> TournamentResult<Tournament> {
            self.inner.create(name, modality).await
        }

        async fn load(&self, id: TournamentId) -> TournamentResult<Tournament> {
            self.inner.load(id).await
        }

        async fn list(&self) -> TournamentResult<Vec<TournamentSummary>> {
            self.inner.list().await
        }

        async fn save(&self, tournament: &Tournament) -> TournamentResult<Tournament> {
            let left = self.conflicts_left.load(Ordering::SeqCst);
            if left > 0 {
                self.conflicts_left.store(left - 1, Ordering::SeqCst);
                return Err(TournamentError::VersionConflict {
                    id: tournament.id,
                    expected: tournament.version,
                });
            }
            self.inner.save(tournament).await
        }
    }

    #[tokio::test]
    async fn test_conflicts_are_retried() {
        let repo = Arc::new(ConflictingRepository {
            inner: InMemoryTournamentRepository::new(),
            conflicts_left: AtomicU32::new(2),
        });
        let mgr = TournamentManager::new(repo, ManagerConfig::default());

        let t = mgr
            .create_tournament("Cup", Modality::RoundRobin)
            .await
            .unwrap();
        let p = mgr
            .register_participant(t.id, "A".into(), "Team A".to_string())
            .await
            .unwrap();
        assert_eq!(p.status, RegistrationStatus::Pending);
        assert_eq!(mgr.get_tournament(t.id).await.unwrap().participants.len(), 1);
    }

    #[tokio::test]
    async fn test_conflicts_surface_after_retries() {
        let repo = Arc::new(ConflictingRepository {
            inner: InMemoryTournamentRepository::new(),
            conflicts_left: AtomicU32::new(10),
        });
        let mgr = TournamentManager::new(
            repo,
            ManagerConfig {
                max_conflict_retries: 1,
            },
        );

        let t = mgr
            .create_tournament("Cup", Modality::RoundRobin)
            .await
            .unwrap();
        let err = mgr
            .register_participant(t.id, "A".into(), "Team A".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::VersionConflict { .. }));
        assert!(err.is_persistence_failure());
        assert!(mgr.get_tournament(t.id).await.unwrap().participants.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_results_are_not_lost() {
        let mgr = manager();
        let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let id = confirmed_tournament(&mgr, Modality::SingleElimination, &names).await;
        mgr.generate_bracket(id).await.unwrap();

        let mgr = Arc::new(TournamentManager::new(
            mgr.repo.clone(),
            ManagerConfig {
                max_conflict_retries: 50,
            },
        ));
        let winners = [(1, "A"), (2, "C"), (3, "E"), (4, "G")];
        let handles: Vec<_> = winners
            .iter()
            .map(|&(number, winner)| {
                let mgr = mgr.clone();
                tokio::spawn(async move { mgr.report_result(id, number, win(winner)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let t = mgr.get_tournament(id).await.unwrap();
        let semis: Vec<_> = [5, 6].iter().map(|n| t.find_match(*n).unwrap()).collect();
        assert!(semis.iter().all(|m| m.status == MatchStatus::Pending));
        assert_eq!(get_filled(&t), 4);
        assert_eq!(t.version, 1 + 16 + 4);
    }

    fn get_filled(t: &Tournament) -> usize {
        t.matches
            .iter()
            .filter(|m| m.round_number == Some(2))
            .map(|m| m.team1.is_filled() as usize + m.team2.is_filled() as usize)
            .sum()
    }
}
