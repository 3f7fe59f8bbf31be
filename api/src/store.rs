//! Persistence seam. Core rules never touch storage directly; they are handed
//! records by a `TournamentStore` and return new ones to write back.

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::lifecycle::{self, MatchEdit, NewMatch};
use crate::{Match, Player, Team, Tournament, TournamentFormat};
use chrono::NaiveDate;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const SECRET_CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Editable tournament fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetails {
    pub name: String,
    pub format: TournamentFormat,
    pub logo: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl TournamentDetails {
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("tournament name is required"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && end < start
        {
            return Err(CoreError::validation("end date is before start date"));
        }
        Ok(())
    }

    fn apply_to(self, tournament: &mut Tournament) {
        tournament.name = self.name.trim().to_string();
        tournament.format = self.format;
        tournament.logo = self.logo;
        tournament.start_date = self.start_date;
        tournament.end_date = self.end_date;
        tournament.location = self.location;
        tournament.description = self.description;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub created_by: String,
    pub details: TournamentDetails,
    /// Generated when absent.
    pub secret_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamDetails {
    pub name: String,
    pub short_name: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetails {
    pub name: String,
    pub role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub image: Option<String>,
}

/// CRUD over tournaments and everything they own.
///
/// Implementations must leave the stored record untouched when they return
/// `Err`.
pub trait TournamentStore {
    fn tournament(&self, id: &str) -> CoreResult<Tournament>;
    fn find_by_code(&self, code: &str) -> CoreResult<Tournament>;
    fn list_tournaments_for_owner(&self, owner: &str) -> Vec<Tournament>;
    /// Id of the tournament that owns the given entity.
    fn tournament_id_of(&self, kind: EntityKind, id: &str) -> CoreResult<String>;

    fn create_tournament(&mut self, new: NewTournament) -> CoreResult<Tournament>;
    fn update_tournament(&mut self, id: &str, details: TournamentDetails) -> CoreResult<Tournament>;
    fn delete_tournament(&mut self, id: &str) -> CoreResult<()>;

    fn add_team(&mut self, tournament_id: &str, details: TeamDetails) -> CoreResult<Team>;
    fn update_team(&mut self, team_id: &str, details: TeamDetails) -> CoreResult<Team>;
    /// Removes the team and its players. Matches referencing it are kept.
    fn delete_team(&mut self, team_id: &str) -> CoreResult<()>;

    fn add_player(&mut self, team_id: &str, details: PlayerDetails) -> CoreResult<Player>;
    fn update_player(&mut self, player_id: &str, details: PlayerDetails) -> CoreResult<Player>;
    fn delete_player(&mut self, player_id: &str) -> CoreResult<()>;

    fn create_match(&mut self, new: NewMatch) -> CoreResult<Match>;
    fn update_match(&mut self, match_id: &str, edits: &[MatchEdit]) -> CoreResult<Match>;
    fn delete_match(&mut self, match_id: &str) -> CoreResult<()>;
}

/// Random six-character upper-case base-36 access code.
pub fn generate_secret_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SECRET_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("could not access snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory store. Serializes as a JSON snapshot of every tournament.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    tournaments: Vec<Tournament>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let store: MemoryStore = serde_json::from_str(&content)?;
        debug!(
            "loaded {} tournament(s) from {}",
            store.tournaments.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn tournaments(&self) -> &[Tournament] {
        &self.tournaments
    }

    fn next_id(&mut self, prefix: &str) -> String {
        // Snapshots edited by hand may already use the counter's next value.
        loop {
            self.next_id += 1;
            let id = format!("{prefix}-{}", self.next_id);
            if !self.id_in_use(&id) {
                return id;
            }
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.tournaments.iter().any(|t| {
            t.id == id
                || t.matches.iter().any(|m| m.id == id)
                || t.teams
                    .iter()
                    .any(|team| team.id == id || team.players.iter().any(|p| p.id == id))
        })
    }

    fn code_in_use(&self, code: &str) -> bool {
        self.tournaments.iter().any(|t| t.matches_code(code))
    }

    fn unique_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code = generate_secret_code(&mut rng);
            if !self.code_in_use(&code) {
                return code;
            }
            debug!("secret code collision on {code}, regenerating");
        }
    }

    fn tournament_mut(&mut self, id: &str) -> CoreResult<&mut Tournament> {
        self.tournaments
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Tournament, id))
    }

    fn team_mut(&mut self, team_id: &str) -> CoreResult<&mut Team> {
        self.tournaments
            .iter_mut()
            .flat_map(|t| t.teams.iter_mut())
            .find(|team| team.id == team_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Team, team_id))
    }

    fn player_mut(&mut self, player_id: &str) -> CoreResult<&mut Player> {
        self.tournaments
            .iter_mut()
            .flat_map(|t| t.teams.iter_mut())
            .flat_map(|team| team.players.iter_mut())
            .find(|p| p.id == player_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Player, player_id))
    }

    fn tournament_with_match(&mut self, match_id: &str) -> CoreResult<&mut Tournament> {
        self.tournaments
            .iter_mut()
            .find(|t| t.find_match(match_id).is_some())
            .ok_or_else(|| CoreError::not_found(EntityKind::Match, match_id))
    }
}

fn check_team_name(tournament: &Tournament, name: &str, skip_id: Option<&str>) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("team name is required"));
    }
    let taken = tournament
        .teams
        .iter()
        .filter(|t| Some(t.id.as_str()) != skip_id)
        .any(|t| t.name.trim().eq_ignore_ascii_case(name.trim()));
    if taken {
        return Err(CoreError::validation(format!(
            "a team named {} already exists",
            name.trim()
        )));
    }
    Ok(())
}

fn check_player_name(details: &PlayerDetails) -> CoreResult<()> {
    if details.name.trim().is_empty() {
        return Err(CoreError::validation("player name is required"));
    }
    Ok(())
}

fn fill_player(player: &mut Player, details: PlayerDetails) {
    player.name = details.name.trim().to_string();
    player.role = details.role;
    player.batting_style = details.batting_style;
    player.bowling_style = details.bowling_style;
    player.image = details.image;
}

impl TournamentStore for MemoryStore {
    fn tournament(&self, id: &str) -> CoreResult<Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(EntityKind::Tournament, id))
    }

    fn find_by_code(&self, code: &str) -> CoreResult<Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.matches_code(code))
            .cloned()
            .ok_or_else(|| CoreError::not_found(EntityKind::Tournament, code.trim()))
    }

    fn list_tournaments_for_owner(&self, owner: &str) -> Vec<Tournament> {
        self.tournaments
            .iter()
            .filter(|t| t.created_by == owner)
            .cloned()
            .collect()
    }

    fn tournament_id_of(&self, kind: EntityKind, id: &str) -> CoreResult<String> {
        let owner = self.tournaments.iter().find(|t| match kind {
            EntityKind::Tournament => t.id == id,
            EntityKind::Team => t.find_team(id).is_some(),
            EntityKind::Player => t
                .teams
                .iter()
                .any(|team| team.players.iter().any(|p| p.id == id)),
            EntityKind::Match => t.find_match(id).is_some(),
        });
        owner
            .map(|t| t.id.clone())
            .ok_or_else(|| CoreError::not_found(kind, id))
    }

    fn create_tournament(&mut self, new: NewTournament) -> CoreResult<Tournament> {
        new.details.validate()?;
        if new.created_by.trim().is_empty() {
            return Err(CoreError::validation("tournament owner is required"));
        }
        let secret_code = match new.secret_code {
            Some(code) => {
                let code = code.trim().to_uppercase();
                if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(CoreError::validation("secret code must be alphanumeric"));
                }
                if self.code_in_use(&code) {
                    return Err(CoreError::validation("secret code is already in use"));
                }
                code
            }
            None => self.unique_code(),
        };

        let mut tournament = Tournament {
            id: self.next_id("tournament"),
            created_by: new.created_by,
            secret_code,
            ..Default::default()
        };
        new.details.apply_to(&mut tournament);
        debug!("created tournament {} ({})", tournament.id, tournament.name);
        self.tournaments.push(tournament.clone());
        Ok(tournament)
    }

    fn update_tournament(&mut self, id: &str, details: TournamentDetails) -> CoreResult<Tournament> {
        details.validate()?;
        let tournament = self.tournament_mut(id)?;
        details.apply_to(tournament);
        Ok(tournament.clone())
    }

    fn delete_tournament(&mut self, id: &str) -> CoreResult<()> {
        let before = self.tournaments.len();
        self.tournaments.retain(|t| t.id != id);
        if self.tournaments.len() == before {
            return Err(CoreError::not_found(EntityKind::Tournament, id));
        }
        debug!("deleted tournament {id} with its teams and matches");
        Ok(())
    }

    fn add_team(&mut self, tournament_id: &str, details: TeamDetails) -> CoreResult<Team> {
        check_team_name(&self.tournament(tournament_id)?, &details.name, None)?;
        let team = Team {
            id: self.next_id("team"),
            name: details.name.trim().to_string(),
            short_name: details.short_name.filter(|s| !s.trim().is_empty()),
            logo: details.logo,
            tournament_id: tournament_id.to_string(),
            players: Vec::new(),
        };
        self.tournament_mut(tournament_id)?.teams.push(team.clone());
        Ok(team)
    }

    fn update_team(&mut self, team_id: &str, details: TeamDetails) -> CoreResult<Team> {
        let tournament_id = self.tournament_id_of(EntityKind::Team, team_id)?;
        check_team_name(&self.tournament(&tournament_id)?, &details.name, Some(team_id))?;
        let team = self.team_mut(team_id)?;
        team.name = details.name.trim().to_string();
        team.short_name = details.short_name.filter(|s| !s.trim().is_empty());
        team.logo = details.logo;
        Ok(team.clone())
    }

    fn delete_team(&mut self, team_id: &str) -> CoreResult<()> {
        let tournament_id = self.tournament_id_of(EntityKind::Team, team_id)?;
        let tournament = self.tournament_mut(&tournament_id)?;
        tournament.teams.retain(|t| t.id != team_id);
        let orphaned = tournament
            .matches
            .iter()
            .filter(|m| m.involves(team_id))
            .count();
        if orphaned > 0 {
            debug!("team {team_id} deleted, {orphaned} match(es) still reference it");
        }
        Ok(())
    }

    fn add_player(&mut self, team_id: &str, details: PlayerDetails) -> CoreResult<Player> {
        check_player_name(&details)?;
        self.team_mut(team_id)?;
        let mut player = Player {
            id: self.next_id("player"),
            ..Default::default()
        };
        fill_player(&mut player, details);
        self.team_mut(team_id)?.players.push(player.clone());
        Ok(player)
    }

    fn update_player(&mut self, player_id: &str, details: PlayerDetails) -> CoreResult<Player> {
        check_player_name(&details)?;
        let player = self.player_mut(player_id)?;
        fill_player(player, details);
        Ok(player.clone())
    }

    fn delete_player(&mut self, player_id: &str) -> CoreResult<()> {
        let tournament_id = self.tournament_id_of(EntityKind::Player, player_id)?;
        let tournament = self.tournament_mut(&tournament_id)?;
        for team in tournament.teams.iter_mut() {
            team.players.retain(|p| p.id != player_id);
        }
        Ok(())
    }

    fn create_match(&mut self, new: NewMatch) -> CoreResult<Match> {
        let teams = self.tournament(&new.tournament_id)?.teams;
        lifecycle::validate_teams(&new.team1_id, &new.team2_id, &teams)?;
        let id = self.next_id("match");
        let tournament_id = new.tournament_id.clone();
        let game = new.into_match(id, &teams)?;
        self.tournament_mut(&tournament_id)?.matches.push(game.clone());
        debug!("created match {} in {tournament_id}", game.id);
        Ok(game)
    }

    fn update_match(&mut self, match_id: &str, edits: &[MatchEdit]) -> CoreResult<Match> {
        let tournament = self.tournament_with_match(match_id)?;
        let current = tournament
            .find_match(match_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Match, match_id))?;
        let updated = lifecycle::apply_edits(current, edits, &tournament.teams)?;
        tournament.merge_match(updated.clone());
        debug!(
            "match {match_id} updated with {} edit(s), now {}",
            edits.len(),
            updated.status.label()
        );
        Ok(updated)
    }

    fn delete_match(&mut self, match_id: &str) -> CoreResult<()> {
        let tournament = self.tournament_with_match(match_id)?;
        tournament.matches.retain(|m| m.id != match_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{InningNumber, InningScore};
    use crate::{MatchStatus, WinnerOutcome};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn league(store: &mut MemoryStore) -> (Tournament, Team, Team) {
        let tournament = store
            .create_tournament(NewTournament {
                created_by: "owner".into(),
                details: TournamentDetails {
                    name: "Summer Cup".into(),
                    ..Default::default()
                },
                secret_code: None,
            })
            .unwrap();
        let a = store
            .add_team(&tournament.id, TeamDetails { name: "Avengers".into(), ..Default::default() })
            .unwrap();
        let b = store
            .add_team(&tournament.id, TeamDetails { name: "Blasters".into(), ..Default::default() })
            .unwrap();
        (tournament, a, b)
    }

    fn fixture(tournament: &Tournament, a: &Team, b: &Team) -> NewMatch {
        NewMatch {
            tournament_id: tournament.id.clone(),
            team1_id: a.id.clone(),
            team2_id: b.id.clone(),
            ..Default::default()
        }
    }

    #[test]
    fn generated_codes_are_six_base36_uppercase() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let code = generate_secret_code(&mut rng);
            assert_eq!(code.len(), SECRET_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn code_lookup_ignores_case() {
        let mut store = MemoryStore::new();
        let (tournament, ..) = league(&mut store);
        let found = store
            .find_by_code(&tournament.secret_code.to_lowercase())
            .unwrap();
        assert_eq!(found.id, tournament.id);
        assert!(matches!(
            store.find_by_code("nope00"),
            Err(CoreError::NotFound { kind: EntityKind::Tournament, .. })
        ));
    }

    #[test]
    fn explicit_code_collision_is_rejected() {
        let mut store = MemoryStore::new();
        let (tournament, ..) = league(&mut store);
        let err = store
            .create_tournament(NewTournament {
                created_by: "someone".into(),
                details: TournamentDetails { name: "Other".into(), ..Default::default() },
                secret_code: Some(tournament.secret_code.to_lowercase()),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(store.tournaments().len(), 1);
    }

    #[test]
    fn same_team_match_is_not_stored() {
        let mut store = MemoryStore::new();
        let (tournament, a, _) = league(&mut store);
        let err = store.create_match(fixture(&tournament, &a, &a)).unwrap_err();
        assert_eq!(err, CoreError::validation("teams must differ"));
        assert!(store.tournament(&tournament.id).unwrap().matches.is_empty());
    }

    #[test]
    fn rejected_edit_leaves_stored_match_unchanged() {
        let mut store = MemoryStore::new();
        let (tournament, a, b) = league(&mut store);
        let game = store.create_match(fixture(&tournament, &a, &b)).unwrap();
        let err = store.update_match(&game.id, &[MatchEdit::Transition(MatchStatus::Completed)]);
        assert!(err.is_err());
        let stored = store.tournament(&tournament.id).unwrap();
        assert_eq!(stored.matches[0], game);
    }

    #[test]
    fn full_match_flows_into_standings() {
        let mut store = MemoryStore::new();
        let (tournament, a, b) = league(&mut store);
        let game = store.create_match(fixture(&tournament, &a, &b)).unwrap();
        store
            .update_match(
                &game.id,
                &[
                    MatchEdit::Transition(MatchStatus::Live),
                    MatchEdit::RecordScore(
                        InningNumber::First,
                        InningScore { runs: 180, wickets: 6, overs: 20.0 },
                    ),
                    MatchEdit::EndInning(InningNumber::First),
                    MatchEdit::StartSecondInning,
                    MatchEdit::RecordScore(
                        InningNumber::Second,
                        InningScore { runs: 150, wickets: 10, overs: 20.0 },
                    ),
                    MatchEdit::Transition(MatchStatus::Completed),
                ],
            )
            .unwrap();

        let stored = store.tournament(&tournament.id).unwrap();
        assert_eq!(stored.matches[0].winner(), Some(&WinnerOutcome::TeamWin(a.id.clone())));
        let table = stored.standings();
        assert_eq!(table[0].team_id, a.id);
        assert_eq!(table[0].points, 2);
        assert_eq!(table[0].net_run_rate, 1.5);
    }

    #[test]
    fn deleting_team_removes_players_but_keeps_matches() {
        let mut store = MemoryStore::new();
        let (tournament, a, b) = league(&mut store);
        let player = store
            .add_player(&a.id, PlayerDetails { name: "Rahul".into(), ..Default::default() })
            .unwrap();
        store.create_match(fixture(&tournament, &a, &b)).unwrap();

        store.delete_team(&a.id).unwrap();
        let stored = store.tournament(&tournament.id).unwrap();
        assert_eq!(stored.teams.len(), 1);
        assert_eq!(stored.matches.len(), 1);
        assert!(store.tournament_id_of(EntityKind::Player, &player.id).is_err());
    }

    #[test]
    fn duplicate_team_names_are_rejected() {
        let mut store = MemoryStore::new();
        let (tournament, a, _) = league(&mut store);
        let dup = store.add_team(&tournament.id, TeamDetails { name: " avengers ".into(), ..Default::default() });
        assert!(matches!(dup, Err(CoreError::Validation(_))));
        let renamed = store
            .update_team(&a.id, TeamDetails { name: "Avengers".into(), short_name: Some("AVG".into()), ..Default::default() })
            .unwrap();
        assert_eq!(renamed.abbrev(), "AVG");
    }

    #[test]
    fn deleting_tournament_cascades() {
        let mut store = MemoryStore::new();
        let (tournament, a, b) = league(&mut store);
        let game = store.create_match(fixture(&tournament, &a, &b)).unwrap();
        store.delete_tournament(&tournament.id).unwrap();
        assert!(store.tournament_id_of(EntityKind::Match, &game.id).is_err());
        assert!(store.list_tournaments_for_owner("owner").is_empty());
        assert!(store.delete_tournament(&tournament.id).is_err());
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let mut store = MemoryStore::new();
        league(&mut store);
        let path = std::env::temp_dir().join(format!("crictui-store-{}.json", std::process::id()));
        store.save(&path).unwrap();
        let loaded = MemoryStore::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, store);
    }

    #[test]
    fn missing_snapshot_is_an_io_error() {
        let err = MemoryStore::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
