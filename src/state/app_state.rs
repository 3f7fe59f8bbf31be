use crate::app::MenuItem;
use crate::state::scoring::ScoringState;
use cricket_api::{Match, Team, TeamStanding, Tournament};

// ---------------------------------------------------------------------------
// Tournament state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TournamentState {
    pub tournament: Option<Tournament>,
    /// Recomputed whenever the tournament changes.
    pub standings: Vec<TeamStanding>,
    pub selected_match: usize,
    pub selected_team: usize,
    pub last_updated: Option<String>,
}

impl TournamentState {
    /// Store a freshly loaded tournament, keeping the current selections
    /// pointed at the same match and team when they still exist.
    pub fn load(&mut self, mut tournament: Tournament, loaded_at: String) {
        let match_id = self.selected_match().map(|m| m.id.clone());
        let team_id = self.selected_team().map(|t| t.id.clone());

        // Remote rows cannot say an inning was closed before the next one
        // starts, so flags seen earlier in this session are kept.
        if let Some(previous) = self.tournament.as_ref() {
            for game in &mut tournament.matches {
                if let Some(known) = previous.find_match(&game.id) {
                    game.keep_inning_flags(known);
                }
            }
        }
        tournament
            .matches
            .sort_by_key(|m| (m.date.is_none(), m.date, m.time));
        self.selected_match = match_id
            .and_then(|id| tournament.matches.iter().position(|m| m.id == id))
            .unwrap_or(0);
        self.selected_team = team_id
            .and_then(|id| tournament.teams.iter().position(|t| t.id == id))
            .unwrap_or(0);

        self.standings = tournament.standings();
        self.tournament = Some(tournament);
        self.last_updated = Some(loaded_at);
    }

    pub fn merge_match(&mut self, game: Match) {
        if let Some(t) = &mut self.tournament {
            t.merge_match(game);
            self.standings = t.standings();
        }
    }

    pub fn matches(&self) -> &[Match] {
        self.tournament
            .as_ref()
            .map(|t| t.matches.as_slice())
            .unwrap_or(&[])
    }

    pub fn teams(&self) -> &[Team] {
        self.tournament
            .as_ref()
            .map(|t| t.teams.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches().get(self.selected_match)
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.teams().get(self.selected_team)
    }

    pub fn select_next_match(&mut self) {
        let max = self.matches().len().saturating_sub(1);
        self.selected_match = (self.selected_match + 1).min(max);
    }

    pub fn select_prev_match(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    pub fn select_next_team(&mut self) {
        let max = self.teams().len().saturating_sub(1);
        self.selected_team = (self.selected_team + 1).min(max);
    }

    pub fn select_prev_team(&mut self) {
        self.selected_team = self.selected_team.saturating_sub(1);
    }

    pub fn is_owner(&self, user_id: Option<&str>) -> bool {
        match (self.tournament.as_ref(), user_id) {
            (Some(t), Some(user)) => !user.is_empty() && t.created_by == user,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub status: Option<String>,
    pub tournament: TournamentState,
    pub scoring: Option<ScoringState>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
