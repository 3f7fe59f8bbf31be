//! Points table: results and net run rate derived from completed matches.
//!
//! Standings are never stored. They are recomputed from a tournament's teams
//! and matches whenever the caller needs them, so the function below is pure
//! and cheap to call on every refresh.

use crate::{Match, MatchStatus, Team, WinnerOutcome};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const POINTS_FOR_WIN: u32 = 2;
pub const POINTS_FOR_TIE: u32 = 1;
pub const POINTS_FOR_NO_RESULT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team_id: String,
    pub name: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub no_result: u32,
    pub points: u32,
    /// Average per-match run rate difference, rounded to two decimals.
    pub net_run_rate: f64,
}

impl TeamStanding {
    fn new(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            name: team.name.clone(),
            played: 0,
            won: 0,
            lost: 0,
            tied: 0,
            no_result: 0,
            points: 0,
            net_run_rate: 0.0,
        }
    }
}

/// Build the ranked points table for one tournament.
///
/// Only `Completed` matches count. A completed match naming a team that is
/// not in `teams` is skipped entirely. The output holds exactly one row per
/// input team, ordered by points then net run rate, both descending; rows
/// equal on both keep their input order.
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<TeamStanding> {
    let mut table: Vec<TeamStanding> = teams.iter().map(TeamStanding::new).collect();
    let index: HashMap<&str, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    for game in matches.iter().filter(|m| m.status == MatchStatus::Completed) {
        let (Some(&t1), Some(&t2)) = (
            index.get(game.team1_id.as_str()),
            index.get(game.team2_id.as_str()),
        ) else {
            debug!("skipping match {}: team not in roster", game.id);
            continue;
        };
        if t1 == t2 {
            debug!("skipping match {}: both sides are the same team", game.id);
            continue;
        }

        table[t1].played += 1;
        table[t2].played += 1;

        match game.winner() {
            Some(WinnerOutcome::Tie) => {
                for i in [t1, t2] {
                    table[i].tied += 1;
                    table[i].points += POINTS_FOR_TIE;
                }
            }
            Some(WinnerOutcome::NoResult) => {
                for i in [t1, t2] {
                    table[i].no_result += 1;
                    table[i].points += POINTS_FOR_NO_RESULT;
                }
            }
            Some(WinnerOutcome::TeamWin(id)) if *id == game.team1_id => {
                record_win(&mut table, t1, t2)
            }
            Some(WinnerOutcome::TeamWin(id)) if *id == game.team2_id => {
                record_win(&mut table, t2, t1)
            }
            _ => {}
        }

        if let Some((team1_delta, team2_delta)) = run_rate_deltas(game) {
            table[t1].net_run_rate += team1_delta;
            table[t2].net_run_rate += team2_delta;
        }
    }

    for row in &mut table {
        if row.played > 0 {
            row.net_run_rate = round2(row.net_run_rate / f64::from(row.played));
        }
    }

    table.sort_by(|a, b| {
        b.points.cmp(&a.points).then_with(|| {
            b.net_run_rate
                .partial_cmp(&a.net_run_rate)
                .unwrap_or(Ordering::Equal)
        })
    });
    table
}

fn record_win(table: &mut [TeamStanding], winner: usize, loser: usize) {
    table[winner].won += 1;
    table[winner].points += POINTS_FOR_WIN;
    table[loser].lost += 1;
}

/// Per-match run rate difference for (team1, team2). Needs both innings.
/// The inning whose batting team is team1 is team1's; the other is team2's.
fn run_rate_deltas(game: &Match) -> Option<(f64, f64)> {
    let (first, second) = (game.inning1.as_ref()?, game.inning2.as_ref()?);
    let (team1_inning, team2_inning) = if first.team_id == game.team1_id {
        (first, second)
    } else {
        (second, first)
    };

    let delta = |own_runs: u32, own_overs: f64, opp_runs: u32, opp_overs: f64| {
        if own_overs > 0.0 {
            let opp_overs = if opp_overs > 0.0 { opp_overs } else { 1.0 };
            f64::from(own_runs) / own_overs - f64::from(opp_runs) / opp_overs
        } else {
            0.0
        }
    };

    Some((
        delta(
            team1_inning.runs,
            team1_inning.overs,
            team2_inning.runs,
            team2_inning.overs,
        ),
        delta(
            team2_inning.runs,
            team2_inning.overs,
            team1_inning.runs,
            team1_inning.overs,
        ),
    ))
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Fold -0.0 into 0.0 so it displays and compares like an even record.
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Inning, MatchResult};

    fn team(id: &str) -> Team {
        Team {
            id: id.into(),
            name: format!("Team {}", id.to_uppercase()),
            tournament_id: "t".into(),
            ..Default::default()
        }
    }

    fn inning(team_id: &str, runs: u32, wickets: u8, overs: f64) -> Inning {
        Inning {
            team_id: team_id.into(),
            runs,
            wickets,
            overs,
            ended: true,
            balls: Vec::new(),
        }
    }

    fn completed(
        id: &str,
        team1: &str,
        team2: &str,
        innings: Option<(Inning, Inning)>,
        result: Option<MatchResult>,
    ) -> Match {
        let (inning1, inning2) = match innings {
            Some((a, b)) => (Some(a), Some(b)),
            None => (None, None),
        };
        Match {
            id: id.into(),
            tournament_id: "t".into(),
            team1_id: team1.into(),
            team2_id: team2.into(),
            status: MatchStatus::Completed,
            inning1,
            inning2,
            result,
            ..Default::default()
        }
    }

    fn row<'a>(table: &'a [TeamStanding], id: &str) -> &'a TeamStanding {
        table.iter().find(|r| r.team_id == id).expect("row per team")
    }

    fn season() -> (Vec<Team>, Vec<Match>) {
        let teams = vec![team("a"), team("b"), team("c"), team("d")];
        let matches = vec![
            completed(
                "m1",
                "a",
                "b",
                Some((inning("a", 180, 6, 20.0), inning("b", 150, 10, 20.0))),
                Some(MatchResult::team_win("a")),
            ),
            completed(
                "m2",
                "c",
                "a",
                Some((inning("c", 150, 8, 20.0), inning("a", 151, 4, 19.2))),
                Some(MatchResult::team_win("a")),
            ),
            completed(
                "m3",
                "b",
                "c",
                Some((inning("b", 160, 10, 20.0), inning("c", 160, 10, 20.0))),
                Some(MatchResult::tie()),
            ),
            completed("m4", "d", "b", None, Some(MatchResult::no_result())),
            Match {
                id: "m5".into(),
                team1_id: "c".into(),
                team2_id: "d".into(),
                status: MatchStatus::Live,
                inning1: Some(inning("c", 40, 1, 5.0)),
                ..Default::default()
            },
            completed(
                "m6",
                "a",
                "ghost",
                Some((inning("a", 200, 2, 20.0), inning("ghost", 10, 10, 5.0))),
                Some(MatchResult::team_win("a")),
            ),
        ];
        (teams, matches)
    }

    #[test]
    fn simple_win_awards_two_points_and_orders_winner_first() {
        let teams = vec![team("a"), team("b")];
        let matches = vec![completed(
            "m1",
            "a",
            "b",
            Some((inning("a", 180, 6, 20.0), inning("b", 150, 10, 20.0))),
            Some(MatchResult::team_win("a")),
        )];
        let table = compute_standings(&teams, &matches);

        assert_eq!(table[0].team_id, "a");
        assert_eq!(table[1].team_id, "b");
        let a = row(&table, "a");
        assert_eq!((a.played, a.won, a.points), (1, 1, 2));
        assert!((a.net_run_rate - 1.5).abs() < 1e-9);
        let b = row(&table, "b");
        assert_eq!((b.played, b.lost, b.points), (1, 1, 0));
        assert!((b.net_run_rate + 1.5).abs() < 1e-9);
    }

    #[test]
    fn tie_gives_one_point_each_and_level_run_rate() {
        let teams = vec![team("a"), team("b")];
        let matches = vec![completed(
            "m1",
            "a",
            "b",
            Some((inning("a", 160, 10, 20.0), inning("b", 160, 10, 20.0))),
            Some(MatchResult::tie()),
        )];
        let table = compute_standings(&teams, &matches);
        for r in &table {
            assert_eq!((r.played, r.tied, r.points), (1, 1, 1));
            assert_eq!(r.net_run_rate, 0.0);
        }
    }

    #[test]
    fn unknown_team_reference_contributes_nothing() {
        let teams = vec![team("a"), team("b")];
        let matches = vec![completed(
            "m1",
            "a",
            "ghost",
            Some((inning("a", 200, 2, 20.0), inning("ghost", 10, 10, 5.0))),
            Some(MatchResult::team_win("a")),
        )];
        let table = compute_standings(&teams, &matches);
        assert_eq!(table.len(), 2);
        for r in &table {
            assert_eq!(r.played, 0);
            assert_eq!(r.points, 0);
            assert_eq!(r.net_run_rate, 0.0);
        }
    }

    #[test]
    fn innings_are_matched_to_teams_by_batting_side() {
        // team2 batted first here; its runs must not be credited to team1.
        let teams = vec![team("a"), team("b")];
        let matches = vec![completed(
            "m1",
            "a",
            "b",
            Some((inning("b", 100, 10, 20.0), inning("a", 101, 2, 10.0))),
            Some(MatchResult::team_win("a")),
        )];
        let table = compute_standings(&teams, &matches);
        let a = row(&table, "a");
        assert!((a.net_run_rate - 5.1).abs() < 1e-9); // 10.1 - 5.0
        let b = row(&table, "b");
        assert!((b.net_run_rate + 5.1).abs() < 1e-9);
    }

    #[test]
    fn zero_overs_opponent_counts_as_one_over() {
        let teams = vec![team("a"), team("b")];
        let matches = vec![completed(
            "m1",
            "a",
            "b",
            Some((inning("a", 60, 0, 6.0), inning("b", 0, 0, 0.0))),
            Some(MatchResult::team_win("a")),
        )];
        let table = compute_standings(&teams, &matches);
        // a: 60/6 - 0/1 = 10; b has no overs and gains nothing.
        assert_eq!(row(&table, "a").net_run_rate, 10.0);
        assert_eq!(row(&table, "b").net_run_rate, 0.0);
    }

    #[test]
    fn completed_match_without_result_counts_as_played_only() {
        let teams = vec![team("a"), team("b")];
        let matches = vec![completed("m1", "a", "b", None, None)];
        let table = compute_standings(&teams, &matches);
        for r in &table {
            assert_eq!(r.played, 1);
            assert_eq!(r.won + r.lost + r.tied + r.no_result, 0);
            assert_eq!(r.points, 0);
        }
    }

    #[test]
    fn teams_without_matches_still_get_a_row() {
        let teams = vec![team("a"), team("b"), team("c")];
        let table = compute_standings(&teams, &[]);
        assert_eq!(table.len(), 3);
        let ids: Vec<&str> = table.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn season_table_obeys_conservation_and_points_law() {
        let (teams, matches) = season();
        let table = compute_standings(&teams, &matches);

        assert_eq!(table.len(), teams.len());
        for r in &table {
            assert_eq!(r.won + r.lost + r.tied + r.no_result, r.played, "{}", r.team_id);
            assert_eq!(r.points, 2 * r.won + r.tied + r.no_result, "{}", r.team_id);
        }
        let counted = matches
            .iter()
            .filter(|m| m.status == MatchStatus::Completed)
            .filter(|m| m.team1_id != "ghost" && m.team2_id != "ghost")
            .count() as u32;
        assert_eq!(table.iter().map(|r| r.played).sum::<u32>(), 2 * counted);

        let a = row(&table, "a");
        assert_eq!((a.played, a.won, a.points), (2, 2, 4));
        let d = row(&table, "d");
        assert_eq!((d.played, d.no_result, d.points, d.net_run_rate), (1, 1, 1, 0.0));
    }

    #[test]
    fn season_table_is_sorted_by_points_then_run_rate() {
        let (teams, matches) = season();
        let table = compute_standings(&teams, &matches);
        for pair in table.windows(2) {
            let (x, y) = (&pair[0], &pair[1]);
            assert!(
                x.points > y.points
                    || (x.points == y.points && x.net_run_rate >= y.net_run_rate),
                "{x:?} ranked above {y:?}"
            );
        }
        assert_eq!(table[0].team_id, "a");
    }

    #[test]
    fn recomputing_gives_identical_output() {
        let (teams, matches) = season();
        assert_eq!(
            compute_standings(&teams, &matches),
            compute_standings(&teams, &matches)
        );
    }
}
