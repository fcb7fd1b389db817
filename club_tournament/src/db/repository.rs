//! Repository trait for tournament persistence and its PostgreSQL
//! implementation.
//!
//! A tournament is saved as one unit: roster, bracket and matches are written
//! in a single statement guarded by the version that was loaded.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::time::Duration;

use super::timeouts::with_timeout;
use crate::tournament::{
    Modality, Tournament, TournamentError, TournamentId, TournamentResult, TournamentState,
    TournamentSummary,
};

/// Trait for tournament storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create an empty tournament in the registration state
    async fn create(&self, name: &str, modality: Modality) -> TournamentResult<Tournament>;

    /// Load a tournament
    ///
    /// # Errors
    ///
    /// * `TournamentError::TournamentNotFound` - unknown id
    async fn load(&self, id: TournamentId) -> TournamentResult<Tournament>;

    /// List all tournaments, newest first
    async fn list(&self) -> TournamentResult<Vec<TournamentSummary>>;

    /// Store a tournament if its stored version still equals
    /// `tournament.version`, returning the row as stored, with the bumped
    /// version and the storage timestamp.
    ///
    /// # Errors
    ///
    /// * `TournamentError::VersionConflict` - someone saved in between
    /// * `TournamentError::TournamentNotFound` - unknown id
    async fn save(&self, tournament: &Tournament) -> TournamentResult<Tournament>;
}

/// Default PostgreSQL implementation of `TournamentRepository`
pub struct PgTournamentRepository {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: String) -> TournamentResult<T> {
    Ok(serde_json::from_value(serde_json::Value::String(value))?)
}

fn tournament_from_row(row: &PgRow) -> TournamentResult<Tournament> {
    let modality: Modality = parse_enum(row.get("modality"))?;
    let state: TournamentState = parse_enum(row.get("state"))?;

    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        modality,
        state,
        participants: serde_json::from_value(row.get("participants"))?,
        bracket: row
            .get::<Option<serde_json::Value>, _>("bracket")
            .map(serde_json::from_value)
            .transpose()?,
        matches: serde_json::from_value(row.get("matches"))?,
        version: row.get("version"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    })
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn create(&self, name: &str, modality: Modality) -> TournamentResult<Tournament> {
        let row = with_timeout(
            self.statement_timeout,
            sqlx::query(
                r#"
                INSERT INTO tournaments (name, modality, state)
                VALUES ($1, $2, $3)
                RETURNING id, name, modality, state, participants, bracket, matches,
                          version, created_at, updated_at
                "#,
            )
            .bind(name)
            .bind(modality.as_str())
            .bind(TournamentState::Registration.as_str())
            .fetch_one(&self.pool),
        )
        .await?;

        tournament_from_row(&row)
    }

    async fn load(&self, id: TournamentId) -> TournamentResult<Tournament> {
        let row = with_timeout(
            self.statement_timeout,
            sqlx::query(
                r#"
                SELECT id, name, modality, state, participants, bracket, matches,
                       version, created_at, updated_at
                FROM tournaments
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(TournamentError::TournamentNotFound(id))?;

        tournament_from_row(&row)
    }

    async fn list(&self) -> TournamentResult<Vec<TournamentSummary>> {
        let rows = with_timeout(
            self.statement_timeout,
            sqlx::query(
                r#"
                SELECT id, name, modality, state, participants, bracket, matches,
                       version, created_at, updated_at
                FROM tournaments
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|row| tournament_from_row(row).map(|t| TournamentSummary::from(&t)))
            .collect()
    }

    async fn save(&self, tournament: &Tournament) -> TournamentResult<Tournament> {
        let participants = serde_json::to_value(&tournament.participants)?;
        let bracket = tournament
            .bracket
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let matches = serde_json::to_value(&tournament.matches)?;

        let row = with_timeout(
            self.statement_timeout,
            sqlx::query(
                r#"
                UPDATE tournaments
                SET name = $1, state = $2, participants = $3, bracket = $4, matches = $5,
                    version = version + 1, updated_at = NOW()
                WHERE id = $6 AND version = $7
                RETURNING id, name, modality, state, participants, bracket, matches,
                          version, created_at, updated_at
                "#,
            )
            .bind(&tournament.name)
            .bind(tournament.state.as_str())
            .bind(participants)
            .bind(bracket)
            .bind(matches)
            .bind(tournament.id)
            .bind(tournament.version)
            .fetch_optional(&self.pool),
        )
        .await?;

        if let Some(row) = row {
            return tournament_from_row(&row);
        }

        // Distinguish a stale version from a missing row
        let exists = with_timeout(
            self.statement_timeout,
            sqlx::query("SELECT 1 FROM tournaments WHERE id = $1")
                .bind(tournament.id)
                .fetch_optional(&self.pool),
        )
        .await?;

        match exists {
            Some(_) => Err(TournamentError::VersionConflict {
                id: tournament.id,
                expected: tournament.version,
            }),
            None => Err(TournamentError::TournamentNotFound(tournament.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enum_uses_wire_names() {
        let modality: Modality = parse_enum("single-elimination".to_string()).unwrap();
        assert_eq!(modality, Modality::SingleElimination);

        let state: TournamentState = parse_enum("in-progress".to_string()).unwrap();
        assert_eq!(state, TournamentState::InProgress);
    }

    #[test]
    fn test_parse_enum_rejects_unknown_values() {
        let err = parse_enum::<Modality>("double-elimination".to_string()).unwrap_err();
        assert!(matches!(err, TournamentError::Serialization(_)));
    }
}
