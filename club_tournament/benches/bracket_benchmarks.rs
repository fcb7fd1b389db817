use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use club_tournament::tournament::{
    MatchReport, Modality, Participant, Tournament, TournamentState, build_bracket, get_stats,
    report_result,
};
use std::hint::black_box;

fn roster(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| Participant::confirmed(format!("team{}", i), format!("Team {}", i)))
        .collect()
}

/// Helper to create a tournament with a generated bracket
fn setup_tournament(modality: Modality, n: usize) -> Tournament {
    let mut t = Tournament::new(1, "Bench Cup", modality);
    t.participants = roster(n);
    let built = build_bracket(modality, &t.participants).unwrap();
    t.bracket = Some(built.bracket);
    t.matches = built.matches;
    t.state = TournamentState::InProgress;
    t
}

/// Play every match in order, team1 always winning
fn play_all(t: &mut Tournament) {
    for i in 0..t.matches.len() {
        let m = &t.matches[i];
        let Some(winner) = m.team1.participant_id.clone() else {
            continue;
        };
        let number = m.match_number;
        let report = MatchReport {
            team1_score: vec![25, 25, 25],
            team2_score: vec![20, 22, 18],
            winner_id: winner,
        };
        report_result(t, number, &report).unwrap();
    }
}

fn bench_build_elimination(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_single_elimination");

    for n in [8, 64, 256].iter() {
        let participants = roster(*n);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_teams", n)),
            &participants,
            |b, p| {
                b.iter(|| build_bracket(Modality::SingleElimination, black_box(p)));
            },
        );
    }

    group.finish();
}

fn bench_build_round_robin(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_round_robin");

    for n in [8, 32, 64].iter() {
        let participants = roster(*n);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_teams", n)),
            &participants,
            |b, p| {
                b.iter(|| build_bracket(Modality::RoundRobin, black_box(p)));
            },
        );
    }

    group.finish();
}

fn bench_play_through(c: &mut Criterion) {
    let mut group = c.benchmark_group("play_through");

    for (modality, n) in [(Modality::SingleElimination, 64), (Modality::RoundRobin, 16)] {
        let t = setup_tournament(modality, n);
        group.bench_with_input(
            BenchmarkId::new(modality.as_str(), format!("{}_teams", n)),
            &t,
            |b, t| {
                b.iter(|| {
                    let mut t = t.clone();
                    play_all(&mut t);
                    t
                });
            },
        );
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut t = setup_tournament(Modality::RoundRobin, 32);
    play_all(&mut t);

    c.bench_function("stats_round_robin_32_teams", |b| {
        b.iter(|| get_stats(black_box(&t)));
    });
}

criterion_group!(
    bracket_generation,
    bench_build_elimination,
    bench_build_round_robin,
);

criterion_group!(progression, bench_play_through, bench_stats);

criterion_main!(bracket_generation, progression);
