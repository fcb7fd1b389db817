//! Bracket generation for each modality.
//!
//! The builder is a pure function of the modality and the confirmed roster:
//! it never filters the roster and never touches persistence. Callers pass
//! only confirmed entrants, in the order seeds should be assigned.

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Bracket, Match, MatchNumber, MatchSlot, MatchStatus, Modality, Participant, ROUND_ROBIN_LABEL,
    SeededEntry, StandingEntry,
};

/// Minimum entrants for any bracket
pub const MIN_PARTICIPANTS: usize = 2;

/// Output of the bracket builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBracket {
    pub bracket: Bracket,
    pub matches: Vec<Match>,
}

/// Build the bracket descriptor and the full match list for a roster.
///
/// # Errors
///
/// * `TournamentError::InsufficientParticipants` - fewer than two entrants
pub fn build_bracket(
    modality: Modality,
    confirmed: &[Participant],
) -> TournamentResult<BuiltBracket> {
    if confirmed.len() < MIN_PARTICIPANTS {
        return Err(TournamentError::InsufficientParticipants(confirmed.len()));
    }

    let built = match modality {
        Modality::SingleElimination => single_elimination(confirmed),
        Modality::RoundRobin => round_robin(confirmed),
    };

    log::debug!(
        "Built {} bracket for {} participants with {} matches",
        modality,
        confirmed.len(),
        built.matches.len()
    );

    Ok(built)
}

/// Number of rounds needed to reduce `n` entrants to one: `ceil(log2(n))`
pub fn total_rounds(n: usize) -> u32 {
    n.max(1).next_power_of_two().trailing_zeros()
}

/// Display label for a round, counted from the end of the bracket
pub fn round_name(round_number: u32, total_rounds: u32) -> String {
    match total_rounds + 1 - round_number {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        3 => "Quarterfinals".to_string(),
        4 => "Round of 16".to_string(),
        _ => format!("Round {}", round_number),
    }
}

fn single_elimination(confirmed: &[Participant]) -> BuiltBracket {
    let rounds = total_rounds(confirmed.len());
    let participants: Vec<SeededEntry> = confirmed
        .iter()
        .enumerate()
        .map(|(i, p)| SeededEntry {
            id: p.id.clone(),
            team_name: p.team_name.clone(),
            seed: i as u32 + 1,
        })
        .collect();

    // Slots past the roster stay TBD; nothing advances a lone entrant.
    let slot_at = |index: usize| {
        participants
            .get(index)
            .map(|entry| MatchSlot::occupied(entry.id.clone(), entry.team_name.clone()))
            .unwrap_or_else(MatchSlot::tbd)
    };

    let mut matches = Vec::with_capacity((1usize << rounds) - 1);
    let mut next_number: MatchNumber = 1;
    let mut matches_in_round = (1usize << rounds) / 2;

    for round_number in 1..=rounds {
        let first_of_next_round = next_number + matches_in_round as MatchNumber;
        let label = round_name(round_number, rounds);

        for position in 0..matches_in_round {
            let (team1, team2, status) = if round_number == 1 {
                (
                    slot_at(position * 2),
                    slot_at(position * 2 + 1),
                    MatchStatus::Pending,
                )
            } else {
                (MatchSlot::tbd(), MatchSlot::tbd(), MatchStatus::Waiting)
            };

            let next_match_number = (round_number < rounds)
                .then(|| first_of_next_round + (position / 2) as MatchNumber);

            matches.push(Match {
                round: label.clone(),
                round_number: Some(round_number),
                match_number: next_number + position as MatchNumber,
                team1,
                team2,
                winner: None,
                status,
                next_match_number,
            });
        }

        next_number = first_of_next_round;
        matches_in_round /= 2;
    }

    BuiltBracket {
        bracket: Bracket::SingleElimination {
            rounds,
            participants,
        },
        matches,
    }
}

fn round_robin(confirmed: &[Participant]) -> BuiltBracket {
    let n = confirmed.len();
    let mut matches = Vec::with_capacity(n * (n - 1) / 2);
    let mut match_number: MatchNumber = 1;

    for i in 0..n {
        for j in (i + 1)..n {
            let (home, away) = (&confirmed[i], &confirmed[j]);
            matches.push(Match {
                round: ROUND_ROBIN_LABEL.to_string(),
                round_number: None,
                match_number,
                team1: MatchSlot::occupied(home.id.clone(), home.team_name.clone()),
                team2: MatchSlot::occupied(away.id.clone(), away.team_name.clone()),
                winner: None,
                status: MatchStatus::Pending,
                next_match_number: None,
            });
            match_number += 1;
        }
    }

    let participants = confirmed
        .iter()
        .map(|p| StandingEntry::new(p.id.clone(), p.team_name.clone()))
        .collect();

    BuiltBracket {
        bracket: Bracket::RoundRobin { participants },
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::{ParticipantId, TBD};

    fn roster(names: &[&str]) -> Vec<Participant> {
        names
            .iter()
            .map(|n| Participant::confirmed(*n, format!("Team {}", n)))
            .collect()
    }

    fn slot_id(slot: &MatchSlot) -> Option<&str> {
        slot.participant_id.as_ref().map(ParticipantId::as_str)
    }

    #[test]
    fn test_total_rounds() {
        assert_eq!(total_rounds(2), 1);
        assert_eq!(total_rounds(3), 2);
        assert_eq!(total_rounds(4), 2);
        assert_eq!(total_rounds(5), 3);
        assert_eq!(total_rounds(8), 3);
        assert_eq!(total_rounds(16), 4);
        assert_eq!(total_rounds(17), 5);
    }

    #[test]
    fn test_round_names() {
        assert_eq!(round_name(5, 5), "Final");
        assert_eq!(round_name(4, 5), "Semifinals");
        assert_eq!(round_name(3, 5), "Quarterfinals");
        assert_eq!(round_name(2, 5), "Round of 16");
        assert_eq!(round_name(1, 5), "Round 1");
        assert_eq!(round_name(1, 1), "Final");
    }

    #[test]
    fn test_single_participant_is_rejected() {
        let err = build_bracket(Modality::SingleElimination, &roster(&["A"])).unwrap_err();
        assert!(matches!(err, TournamentError::InsufficientParticipants(1)));

        let err = build_bracket(Modality::RoundRobin, &[]).unwrap_err();
        assert!(matches!(err, TournamentError::InsufficientParticipants(0)));
    }

    #[test]
    fn test_four_player_single_elimination() {
        let built =
            build_bracket(Modality::SingleElimination, &roster(&["A", "B", "C", "D"])).unwrap();
        let m = &built.matches;

        assert_eq!(m.len(), 3);

        assert_eq!(m[0].match_number, 1);
        assert_eq!(slot_id(&m[0].team1), Some("A"));
        assert_eq!(slot_id(&m[0].team2), Some("B"));
        assert_eq!(m[0].next_match_number, Some(3));
        assert_eq!(m[0].status, MatchStatus::Pending);
        assert_eq!(m[0].round, "Semifinals");

        assert_eq!(m[1].match_number, 2);
        assert_eq!(slot_id(&m[1].team1), Some("C"));
        assert_eq!(slot_id(&m[1].team2), Some("D"));
        assert_eq!(m[1].next_match_number, Some(3));

        assert_eq!(m[2].match_number, 3);
        assert_eq!(m[2].round, "Final");
        assert_eq!(m[2].round_number, Some(2));
        assert_eq!(m[2].status, MatchStatus::Waiting);
        assert!(!m[2].team1.is_filled());
        assert!(!m[2].team2.is_filled());
        assert_eq!(m[2].next_match_number, None);
    }

    #[test]
    fn test_eight_player_feeds_pair_into_next_round() {
        let built = build_bracket(
            Modality::SingleElimination,
            &roster(&["A", "B", "C", "D", "E", "F", "G", "H"]),
        )
        .unwrap();
        let next: Vec<_> = built.matches.iter().map(|m| m.next_match_number).collect();

        assert_eq!(
            next,
            vec![
                Some(5),
                Some(5),
                Some(6),
                Some(6),
                Some(7),
                Some(7),
                None
            ]
        );
        assert_eq!(built.matches[0].round, "Quarterfinals");
    }

    #[test]
    fn test_seeds_follow_roster_order() {
        let built =
            build_bracket(Modality::SingleElimination, &roster(&["C", "A", "B"])).unwrap();

        let Bracket::SingleElimination {
            rounds,
            participants,
        } = built.bracket
        else {
            panic!("expected single elimination bracket");
        };

        assert_eq!(rounds, 2);
        let seeds: Vec<_> = participants
            .iter()
            .map(|e| (e.id.as_str().to_string(), e.seed))
            .collect();
        assert_eq!(
            seeds,
            vec![
                ("C".to_string(), 1),
                ("A".to_string(), 2),
                ("B".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_non_power_of_two_leaves_tbd_slots() {
        let built = build_bracket(
            Modality::SingleElimination,
            &roster(&["A", "B", "C", "D", "E"]),
        )
        .unwrap();
        let m = &built.matches;

        // 8-slot bracket: 4 + 2 + 1
        assert_eq!(m.len(), 7);
        assert_eq!(slot_id(&m[2].team1), Some("E"));
        assert!(!m[2].team2.is_filled());
        assert_eq!(m[2].team2.team_name, TBD);
        assert!(!m[3].team1.is_filled());
        assert!(!m[3].team2.is_filled());
        assert!(m[..4].iter().all(|m| m.status == MatchStatus::Pending));
        assert!(m[4..].iter().all(|m| m.status == MatchStatus::Waiting));
    }

    #[test]
    fn test_two_players_play_a_final() {
        let built = build_bracket(Modality::SingleElimination, &roster(&["A", "B"])).unwrap();
        assert_eq!(built.matches.len(), 1);
        assert_eq!(built.matches[0].round, "Final");
        assert_eq!(built.matches[0].status, MatchStatus::Pending);
        assert_eq!(built.matches[0].next_match_number, None);
    }

    #[test]
    fn test_three_player_round_robin() {
        let built = build_bracket(Modality::RoundRobin, &roster(&["A", "B", "C"])).unwrap();
        let pairs: Vec<_> = built
            .matches
            .iter()
            .map(|m| (slot_id(&m.team1).unwrap(), slot_id(&m.team2).unwrap()))
            .collect();

        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
        assert!(built.matches.iter().all(|m| m.status == MatchStatus::Pending));
        assert!(built.matches.iter().all(|m| m.round == ROUND_ROBIN_LABEL));
        assert!(built.matches.iter().all(|m| m.next_match_number.is_none()));
        let numbers: Vec<_> = built.matches.iter().map(|m| m.match_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_round_robin_standings_start_at_zero() {
        let built = build_bracket(Modality::RoundRobin, &roster(&["A", "B", "C", "D"])).unwrap();
        let Bracket::RoundRobin { participants } = built.bracket else {
            panic!("expected round robin bracket");
        };

        assert_eq!(participants.len(), 4);
        assert!(
            participants
                .iter()
                .all(|s| s.wins == 0 && s.losses == 0 && s.points == 0)
        );
    }
}
