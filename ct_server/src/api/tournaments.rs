//! Tournament API handlers.
//!
//! Endpoints for the tournament lifecycle:
//! - Creating and listing tournaments
//! - Registering teams and confirming or rejecting them
//! - Generating the bracket from the confirmed roster
//! - Starting matches and reporting results
//! - Reading progress statistics
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Autumn Open", "modality": "single-elimination"}'
//! ```
//!
//! Report a result:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/1/matches/3/result \
//!   -H "Content-Type: application/json" \
//!   -d '{"team1_score": [25, 23, 15], "team2_score": [20, 25, 11], "winner_id": "aces"}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use club_tournament::tournament::{
    Match, MatchNumber, MatchReport, Modality, Participant, ParticipantId, RegistrationStatus,
    Tournament, TournamentError, TournamentId, TournamentStats, TournamentSummary,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::request_id::RequestId;
use crate::{logging, metrics};

/// Longest accepted tournament or team name
pub const MAX_NAME_LEN: usize = 120;

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub modality: Modality,
}

#[derive(Debug, Deserialize)]
pub struct RegisterParticipantRequest {
    pub participant_id: ParticipantId,
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RegistrationStatus,
}

#[derive(Debug, Serialize)]
pub struct ReportResultResponse {
    #[serde(rename = "match")]
    pub played: Match,
    pub advanced_to: Option<MatchNumber>,
    pub next_match_ready: bool,
    pub tournament_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a tournament error
pub fn status_for(error: &TournamentError) -> StatusCode {
    match error {
        TournamentError::TournamentNotFound(_)
        | TournamentError::MatchNotFound(_)
        | TournamentError::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::InsufficientParticipants(_)
        | TournamentError::InvalidScores { .. }
        | TournamentError::WinnerNotInMatch { .. } => StatusCode::BAD_REQUEST,
        TournamentError::AlreadyRegistered(_)
        | TournamentError::BracketAlreadyGenerated
        | TournamentError::BracketNotGenerated
        | TournamentError::MatchCompleted(_)
        | TournamentError::DownstreamDecided { .. }
        | TournamentError::VersionConflict { .. } => StatusCode::CONFLICT,
        TournamentError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        TournamentError::Database(_) | TournamentError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Convert a manager error into a response, logging persistence failures
fn api_error(
    request_id: &RequestId,
    operation: &str,
    tournament_id: TournamentId,
    error: TournamentError,
) -> ApiError {
    if error.is_persistence_failure() {
        logging::log_persistence_failure(
            request_id.as_str(),
            operation,
            tournament_id,
            &error.to_string(),
        );
    }
    if matches!(error, TournamentError::VersionConflict { .. }) {
        metrics::version_conflicts_total(operation);
    }

    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.client_message(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn validate_name(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(bad_request(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// List all tournaments, newest first.
///
/// Returns `200 OK` with an array of summaries:
/// ```json
/// [
///   {
///     "id": 1,
///     "name": "Autumn Open",
///     "modality": "single-elimination",
///     "state": "in-progress",
///     "registered_count": 8,
///     "match_count": 7,
///     "created_at": "2026-10-19T09:00:00Z"
///   }
/// ]
/// ```
pub async fn list_tournaments(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    state
        .manager
        .list_tournaments()
        .await
        .map(Json)
        .map_err(|e| api_error(&request_id, "list_tournaments", 0, e))
}

/// Create a tournament open for registration.
///
/// # Errors
///
/// - `400 Bad Request`: Empty or overlong name
pub async fn create_tournament(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let name = validate_name("name", &request.name)?;

    let tournament = state
        .manager
        .create_tournament(&name, request.modality)
        .await
        .map_err(|e| api_error(&request_id, "create_tournament", 0, e))?;

    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Get a tournament with its roster, bracket and matches.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
pub async fn get_tournament(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    state
        .manager
        .get_tournament(id)
        .await
        .map(Json)
        .map_err(|e| api_error(&request_id, "get_tournament", id, e))
}

/// Register a team. New entries start as pending.
///
/// # Errors
///
/// - `400 Bad Request`: Empty participant id or team name
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Already registered, or bracket already generated
pub async fn register_participant(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<TournamentId>,
    Json(request): Json<RegisterParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    if request.participant_id.as_str().trim().is_empty() {
        return Err(bad_request("participant_id must not be empty"));
    }
    let team_name = validate_name("team_name", &request.team_name)?;

    let participant = state
        .manager
        .register_participant(id, request.participant_id, team_name)
        .await
        .map_err(|e| api_error(&request_id, "register_participant", id, e))?;

    Ok((StatusCode::CREATED, Json(participant)))
}

/// Confirm or reject a registered team.
///
/// ```json
/// {"status": "confirmed"}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Tournament or participant doesn't exist
/// - `409 Conflict`: Bracket already generated
pub async fn set_participant_status(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((id, participant_id)): Path<(TournamentId, String)>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Participant>, ApiError> {
    state
        .manager
        .set_participant_status(id, ParticipantId::new(participant_id), request.status)
        .await
        .map(Json)
        .map_err(|e| api_error(&request_id, "set_participant_status", id, e))
}

/// Generate the bracket from the confirmed roster.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Bracket already generated
/// - `400 Bad Request`: Fewer than two confirmed teams
pub async fn generate_bracket(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    let tournament = state
        .manager
        .generate_bracket(id)
        .await
        .map_err(|e| api_error(&request_id, "generate_bracket", id, e))?;

    metrics::brackets_generated_total(tournament.modality.as_str());
    Ok(Json(tournament))
}

/// Mark a match as in progress.
///
/// # Errors
///
/// - `404 Not Found`: Tournament or match doesn't exist
/// - `409 Conflict`: Match already completed
pub async fn start_match(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((id, match_number)): Path<(TournamentId, MatchNumber)>,
) -> Result<Json<Match>, ApiError> {
    state
        .manager
        .start_match(id, match_number)
        .await
        .map(Json)
        .map_err(|e| api_error(&request_id, "start_match", id, e))
}

/// Report a match result.
///
/// Reporting an already completed match replaces its result.
/// Changing its winner is refused once the next match has started.
///
/// # Errors
///
/// - `404 Not Found`: Tournament or match doesn't exist
/// - `409 Conflict`: Bracket not generated, the winner changes after the
///   next match started, or concurrent update after retries
/// - `400 Bad Request`: Score arrays differ in length, or winner is
///   not in the match
pub async fn report_result(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((id, match_number)): Path<(TournamentId, MatchNumber)>,
    Json(report): Json<MatchReport>,
) -> Result<Json<ReportResultResponse>, ApiError> {
    let (tournament, outcome) = state
        .manager
        .report_result(id, match_number, report)
        .await
        .map_err(|e| api_error(&request_id, "report_result", id, e))?;

    metrics::results_reported_total(tournament.modality.as_str());
    if outcome.tournament_completed {
        metrics::tournaments_completed_total();
    }
    tracing::debug!(
        request_id = %request_id,
        tournament_id = id,
        match_number = match_number,
        "Result recorded"
    );

    let played = tournament
        .find_match(match_number)
        .cloned()
        .ok_or_else(|| {
            api_error(
                &request_id,
                "report_result",
                id,
                TournamentError::MatchNotFound(match_number),
            )
        })?;

    Ok(Json(ReportResultResponse {
        played,
        advanced_to: outcome.advanced_to,
        next_match_ready: outcome.next_match_ready,
        tournament_completed: outcome.tournament_completed,
    }))
}

/// Progress snapshot: match counts, current round, standings and champion.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
pub async fn get_stats(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<TournamentId>,
) -> Result<Json<TournamentStats>, ApiError> {
    state
        .manager
        .get_stats(id)
        .await
        .map(Json)
        .map_err(|e| api_error(&request_id, "get_stats", id, e))
}
