//! Match progression: starting matches, recording results, moving winners
//! forward and keeping round-robin standings.
//!
//! Every operation works on copies of the match list and bracket and only
//! writes them back once all updates succeeded, so a failed call leaves the
//! tournament untouched.

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Bracket, Match, MatchNumber, MatchSlot, MatchStatus, POINTS_PER_WIN, ParticipantId,
    StandingEntry, Tournament, TournamentState,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Result of a match as reported by an administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Per-set scores for team1
    pub team1_score: Vec<u32>,
    /// Per-set scores for team2
    pub team2_score: Vec<u32>,
    /// Authoritative winner, not cross-checked against the scores
    pub winner_id: ParticipantId,
}

/// What a reported result changed besides the match itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultOutcome {
    /// Downstream match that received the winner, if any
    pub advanced_to: Option<MatchNumber>,
    /// Whether the downstream match became playable
    pub next_match_ready: bool,
    /// Whether this result completed the tournament
    pub tournament_completed: bool,
}

/// Mark a match as being played.
///
/// No ordering is enforced on waiting or pending matches; a completed match
/// cannot be restarted since its winner is already recorded.
pub fn start_match(tournament: &mut Tournament, match_number: MatchNumber) -> TournamentResult<()> {
    let m = tournament
        .matches
        .iter_mut()
        .find(|m| m.match_number == match_number)
        .ok_or(TournamentError::MatchNotFound(match_number))?;

    if m.is_completed() {
        return Err(TournamentError::MatchCompleted(match_number));
    }

    m.status = MatchStatus::InProgress;
    tournament.updated_at = Utc::now();
    Ok(())
}

/// Record a result and apply its consequences to the bracket.
///
/// Reporting a match that is already completed replaces the earlier result:
/// the previous winner is swapped out downstream and round-robin standings
/// are corrected before the new result is applied. A different winner is
/// refused once the downstream match has started.
pub fn report_result(
    tournament: &mut Tournament,
    match_number: MatchNumber,
    report: &MatchReport,
) -> TournamentResult<ResultOutcome> {
    if report.team1_score.len() != report.team2_score.len() {
        return Err(TournamentError::InvalidScores {
            team1: report.team1_score.len(),
            team2: report.team2_score.len(),
        });
    }

    let mut bracket = tournament
        .bracket
        .clone()
        .ok_or(TournamentError::BracketNotGenerated)?;
    let mut matches = tournament.matches.clone();

    let index = matches
        .iter()
        .position(|m| m.match_number == match_number)
        .ok_or(TournamentError::MatchNotFound(match_number))?;

    let (winner_slot, loser_slot) = {
        let m = &matches[index];
        if m.team1.is_occupied_by(&report.winner_id) {
            (m.team1.clone(), m.team2.clone())
        } else if m.team2.is_occupied_by(&report.winner_id) {
            (m.team2.clone(), m.team1.clone())
        } else {
            return Err(TournamentError::WinnerNotInMatch {
                match_number,
                winner: report.winner_id.clone(),
            });
        }
    };

    let previous = matches[index]
        .is_completed()
        .then(|| previous_result(&matches[index]))
        .flatten();

    let winner_changed = previous
        .as_ref()
        .is_some_and(|(old_winner, _)| old_winner != &report.winner_id);
    if let Some(next) = matches[index].next_match_number.filter(|_| winner_changed) {
        let downstream = matches
            .iter()
            .find(|m| m.match_number == next)
            .ok_or(TournamentError::MatchNotFound(next))?;
        if matches!(
            downstream.status,
            MatchStatus::InProgress | MatchStatus::Completed
        ) {
            return Err(TournamentError::DownstreamDecided { match_number, next });
        }
    }

    {
        let m = &mut matches[index];
        m.team1.score = report.team1_score.clone();
        m.team2.score = report.team2_score.clone();
        m.winner = Some(report.winner_id.clone());
        m.status = MatchStatus::Completed;
    }

    let mut outcome = ResultOutcome {
        advanced_to: None,
        next_match_ready: false,
        tournament_completed: false,
    };

    match &mut bracket {
        Bracket::SingleElimination { .. } => {
            if let Some(next) = matches[index].next_match_number {
                let replaced = previous.as_ref().map(|(winner, _)| winner);
                outcome.next_match_ready =
                    advance_winner(&mut matches, next, &winner_slot, replaced)?;
                outcome.advanced_to = Some(next);
            }
        }
        Bracket::RoundRobin { participants } => {
            if let Some((old_winner, old_loser)) = &previous {
                revert_standing(participants, old_winner, old_loser.as_ref());
            }
            apply_standing(
                participants,
                &report.winner_id,
                loser_slot.participant_id.as_ref(),
            );
        }
    }

    outcome.tournament_completed = matches.iter().all(Match::is_completed);

    tournament.matches = matches;
    tournament.bracket = Some(bracket);
    if outcome.tournament_completed {
        tournament.state = TournamentState::Completed;
    }
    tournament.updated_at = Utc::now();

    Ok(outcome)
}

/// Winner and loser ids recorded on a completed match
fn previous_result(m: &Match) -> Option<(ParticipantId, Option<ParticipantId>)> {
    let winner = m.winner.clone()?;
    let loser = if m.team1.is_occupied_by(&winner) {
        m.team2.participant_id.clone()
    } else {
        m.team1.participant_id.clone()
    };
    Some((winner, loser))
}

/// Place the winner into the downstream match, returning whether that match
/// became playable.
fn advance_winner(
    matches: &mut [Match],
    next: MatchNumber,
    winner: &MatchSlot,
    replaced: Option<&ParticipantId>,
) -> TournamentResult<bool> {
    let target = matches
        .iter_mut()
        .find(|m| m.match_number == next)
        .ok_or(TournamentError::MatchNotFound(next))?;

    let Some(winner_id) = winner.participant_id.clone() else {
        return Ok(false);
    };

    let already_placed =
        target.team1.is_occupied_by(&winner_id) || target.team2.is_occupied_by(&winner_id);

    let slot = if already_placed {
        None
    } else if replaced.is_some_and(|old| target.team1.is_occupied_by(old)) {
        Some(&mut target.team1)
    } else if replaced.is_some_and(|old| target.team2.is_occupied_by(old)) {
        Some(&mut target.team2)
    } else if !target.team1.is_filled() {
        Some(&mut target.team1)
    } else if !target.team2.is_filled() {
        Some(&mut target.team2)
    } else {
        log::warn!(
            "Match {} has no free slot for winner {}",
            target.match_number,
            winner_id
        );
        None
    };

    if let Some(slot) = slot {
        slot.fill(winner_id, winner.team_name.clone());
    }

    let ready = target.team1.is_filled() && target.team2.is_filled();
    if ready && target.status == MatchStatus::Waiting {
        target.status = MatchStatus::Pending;
    }

    Ok(ready)
}

fn apply_standing(
    standings: &mut [StandingEntry],
    winner: &ParticipantId,
    loser: Option<&ParticipantId>,
) {
    if let Some(entry) = standings.iter_mut().find(|s| &s.id == winner) {
        entry.wins += 1;
        entry.points += POINTS_PER_WIN;
    }
    if let Some(entry) = loser.and_then(|l| standings.iter_mut().find(|s| &s.id == l)) {
        entry.losses += 1;
    }
}

fn revert_standing(
    standings: &mut [StandingEntry],
    winner: &ParticipantId,
    loser: Option<&ParticipantId>,
) {
    if let Some(entry) = standings.iter_mut().find(|s| &s.id == winner) {
        entry.wins = entry.wins.saturating_sub(1);
        entry.points = entry.points.saturating_sub(POINTS_PER_WIN);
    }
    if let Some(entry) = loser.and_then(|l| standings.iter_mut().find(|s| &s.id == l)) {
        entry.losses = entry.losses.saturating_sub(1);
    }
}
