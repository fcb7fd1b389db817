//! Read-only tournament snapshots.

use super::models::{Bracket, MatchStatus, ParticipantId, StandingEntry, Tournament};
use serde::{Deserialize, Serialize};

/// Label reported once no match is left to play
pub const COMPLETED_LABEL: &str = "Completed";

/// Snapshot of tournament progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentStats {
    pub total_participants: usize,
    pub total_matches: usize,
    pub completed_matches: usize,
    pub pending_matches: usize,
    pub in_progress_matches: usize,
    /// Elimination matches still waiting for an opponent
    pub waiting_matches: usize,
    /// Round label of the first playable match, or "Completed"
    pub current_round: String,
    /// Sorted standings, empty for elimination brackets
    pub standings: Vec<StandingEntry>,
    /// Overall winner once decided
    pub champion: Option<ParticipantId>,
}

/// Compute a stats snapshot. Pure: repeated calls on the same tournament
/// return identical results.
pub fn get_stats(tournament: &Tournament) -> TournamentStats {
    let count = |status: MatchStatus| {
        tournament
            .matches
            .iter()
            .filter(|m| m.status == status)
            .count()
    };

    let current_round = tournament
        .matches
        .iter()
        .find(|m| m.is_active())
        .map(|m| m.round.clone())
        .unwrap_or_else(|| COMPLETED_LABEL.to_string());

    let (total_participants, standings, champion) = match &tournament.bracket {
        Some(Bracket::SingleElimination { participants, .. }) => {
            let champion = tournament
                .matches
                .iter()
                .find(|m| m.next_match_number.is_none())
                .and_then(|m| m.winner.clone());
            (participants.len(), Vec::new(), champion)
        }
        Some(Bracket::RoundRobin { participants }) => {
            let standings = sorted_standings(participants);
            let all_played = tournament.matches.iter().all(|m| m.is_completed());
            let champion = all_played
                .then(|| standings.first().map(|s| s.id.clone()))
                .flatten();
            (participants.len(), standings, champion)
        }
        None => (tournament.confirmed_participants().len(), Vec::new(), None),
    };

    TournamentStats {
        total_participants,
        total_matches: tournament.matches.len(),
        completed_matches: count(MatchStatus::Completed),
        pending_matches: count(MatchStatus::Pending),
        in_progress_matches: count(MatchStatus::InProgress),
        waiting_matches: count(MatchStatus::Waiting),
        current_round,
        standings,
        champion,
    }
}

/// Standings ordered by points, then wins, both descending. Remaining ties
/// keep bracket order.
pub fn sorted_standings(participants: &[StandingEntry]) -> Vec<StandingEntry> {
    let mut standings = participants.to_vec();
    standings.sort_by(|a, b| b.points.cmp(&a.points).then(b.wins.cmp(&a.wins)));
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::bracket::build_bracket;
    use crate::tournament::models::{Modality, Participant, TournamentState};
    use crate::tournament::progression::{MatchReport, report_result, start_match};

    fn tournament(modality: Modality, names: &[&str]) -> Tournament {
        let mut t = Tournament::new(1, "Club Cup", modality);
        t.participants = names
            .iter()
            .map(|n| Participant::confirmed(*n, format!("Team {}", n)))
            .collect();
        let built = build_bracket(modality, &t.confirmed_participants()).unwrap();
        t.bracket = Some(built.bracket);
        t.matches = built.matches;
        t.state = TournamentState::InProgress;
        t
    }

    fn win(winner: &str) -> MatchReport {
        MatchReport {
            team1_score: vec![25, 25],
            team2_score: vec![21, 19],
            winner_id: winner.into(),
        }
    }

    fn entry(id: &str, wins: u32, points: u32) -> StandingEntry {
        StandingEntry {
            id: id.into(),
            team_name: id.to_string(),
            wins,
            losses: 0,
            points,
        }
    }

    #[test]
    fn test_fresh_elimination_bracket() {
        let t = tournament(Modality::SingleElimination, &["A", "B", "C", "D"]);
        let stats = get_stats(&t);

        assert_eq!(stats.total_participants, 4);
        assert_eq!(stats.total_matches, 3);
        assert_eq!(stats.completed_matches, 0);
        assert_eq!(stats.pending_matches, 2);
        assert_eq!(stats.waiting_matches, 1);
        assert_eq!(stats.in_progress_matches, 0);
        assert_eq!(stats.current_round, "Semifinals");
        assert!(stats.standings.is_empty());
        assert_eq!(stats.champion, None);
    }

    #[test]
    fn test_current_round_follows_storage_order() {
        let mut t = tournament(Modality::SingleElimination, &["A", "B", "C", "D"]);

        report_result(&mut t, 1, &win("A")).unwrap();
        assert_eq!(get_stats(&t).current_round, "Semifinals");

        start_match(&mut t, 2).unwrap();
        let stats = get_stats(&t);
        assert_eq!(stats.current_round, "Semifinals");
        assert_eq!(stats.in_progress_matches, 1);

        report_result(&mut t, 2, &win("D")).unwrap();
        assert_eq!(get_stats(&t).current_round, "Final");

        report_result(&mut t, 3, &win("D")).unwrap();
        let stats = get_stats(&t);
        assert_eq!(stats.current_round, COMPLETED_LABEL);
        assert_eq!(stats.completed_matches, 3);
        assert_eq!(stats.champion, Some("D".into()));
    }

    #[test]
    fn test_stats_are_idempotent() {
        let mut t = tournament(Modality::RoundRobin, &["A", "B", "C", "D"]);
        report_result(&mut t, 1, &win("B")).unwrap();

        assert_eq!(get_stats(&t), get_stats(&t));
    }

    #[test]
    fn test_round_robin_standings_and_champion() {
        let mut t = tournament(Modality::RoundRobin, &["A", "B", "C"]);

        report_result(&mut t, 1, &win("B")).unwrap(); // A-B
        assert_eq!(get_stats(&t).champion, None);
        report_result(&mut t, 2, &win("C")).unwrap(); // A-C
        report_result(&mut t, 3, &win("B")).unwrap(); // B-C

        let stats = get_stats(&t);
        let order: Vec<_> = stats.standings.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(stats.standings[0].points, 6);
        assert_eq!(stats.current_round, COMPLETED_LABEL);
        assert_eq!(stats.champion, Some("B".into()));
    }

    #[test]
    fn test_sorting_breaks_point_ties_by_wins() {
        let sorted = sorted_standings(&[entry("a", 1, 3), entry("b", 2, 3), entry("c", 3, 9)]);
        let order: Vec<_> = sorted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_stats_before_bracket() {
        let mut t = Tournament::new(1, "Open", Modality::RoundRobin);
        t.participants = vec![
            Participant::confirmed("a", "Aces"),
            Participant::new("b", "Blockers"),
        ];

        let stats = get_stats(&t);
        assert_eq!(stats.total_participants, 1);
        assert_eq!(stats.total_matches, 0);
        assert_eq!(stats.current_round, COMPLETED_LABEL);
    }
}
