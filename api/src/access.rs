//! Owner checks. Viewers holding only the secret code read; the tournament's
//! creator is the only identity allowed to write.

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::lifecycle::{MatchEdit, NewMatch};
use crate::store::{NewTournament, PlayerDetails, TeamDetails, TournamentDetails, TournamentStore};
use crate::{Match, Player, Team, Tournament};
use log::warn;

pub trait AccessControl {
    fn is_owner(&self, user_id: &str, tournament_id: &str) -> bool;
}

impl<S: TournamentStore + ?Sized> AccessControl for S {
    fn is_owner(&self, user_id: &str, tournament_id: &str) -> bool {
        !user_id.is_empty()
            && self
                .tournament(tournament_id)
                .is_ok_and(|t| t.created_by == user_id)
    }
}

/// Write access to a store on behalf of one user. Every mutation is checked
/// against the owning tournament before the store sees it.
pub struct AdminSession<'a, S: TournamentStore> {
    store: &'a mut S,
    user_id: String,
}

impl<'a, S: TournamentStore> AdminSession<'a, S> {
    pub fn new(store: &'a mut S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &*self.store
    }

    fn authorize(&self, kind: EntityKind, id: &str) -> CoreResult<()> {
        let tournament_id = self.store.tournament_id_of(kind, id)?;
        if self.store.is_owner(&self.user_id, &tournament_id) {
            Ok(())
        } else {
            warn!("{} tried to modify {kind} {id} without owning it", self.user_id);
            Err(CoreError::Permission(format!(
                "only the organizer of tournament {tournament_id} can change it"
            )))
        }
    }

    pub fn create_tournament(&mut self, mut new: NewTournament) -> CoreResult<Tournament> {
        if self.user_id.is_empty() {
            return Err(CoreError::Permission("sign in to create a tournament".into()));
        }
        new.created_by = self.user_id.clone();
        self.store.create_tournament(new)
    }

    pub fn my_tournaments(&self) -> Vec<Tournament> {
        self.store.list_tournaments_for_owner(&self.user_id)
    }

    pub fn update_tournament(&mut self, id: &str, details: TournamentDetails) -> CoreResult<Tournament> {
        self.authorize(EntityKind::Tournament, id)?;
        self.store.update_tournament(id, details)
    }

    pub fn delete_tournament(&mut self, id: &str) -> CoreResult<()> {
        self.authorize(EntityKind::Tournament, id)?;
        self.store.delete_tournament(id)
    }

    pub fn add_team(&mut self, tournament_id: &str, details: TeamDetails) -> CoreResult<Team> {
        self.authorize(EntityKind::Tournament, tournament_id)?;
        self.store.add_team(tournament_id, details)
    }

    pub fn update_team(&mut self, team_id: &str, details: TeamDetails) -> CoreResult<Team> {
        self.authorize(EntityKind::Team, team_id)?;
        self.store.update_team(team_id, details)
    }

    pub fn delete_team(&mut self, team_id: &str) -> CoreResult<()> {
        self.authorize(EntityKind::Team, team_id)?;
        self.store.delete_team(team_id)
    }

    pub fn add_player(&mut self, team_id: &str, details: PlayerDetails) -> CoreResult<Player> {
        self.authorize(EntityKind::Team, team_id)?;
        self.store.add_player(team_id, details)
    }

    pub fn update_player(&mut self, player_id: &str, details: PlayerDetails) -> CoreResult<Player> {
        self.authorize(EntityKind::Player, player_id)?;
        self.store.update_player(player_id, details)
    }

    pub fn delete_player(&mut self, player_id: &str) -> CoreResult<()> {
        self.authorize(EntityKind::Player, player_id)?;
        self.store.delete_player(player_id)
    }

    pub fn create_match(&mut self, new: NewMatch) -> CoreResult<Match> {
        self.authorize(EntityKind::Tournament, &new.tournament_id)?;
        self.store.create_match(new)
    }

    pub fn update_match(&mut self, match_id: &str, edits: &[MatchEdit]) -> CoreResult<Match> {
        self.authorize(EntityKind::Match, match_id)?;
        self.store.update_match(match_id, edits)
    }

    pub fn delete_match(&mut self, match_id: &str) -> CoreResult<()> {
        self.authorize(EntityKind::Match, match_id)?;
        self.store.delete_match(match_id)
    }
}
