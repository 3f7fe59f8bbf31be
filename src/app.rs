use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::NetworkRequest;
use crate::state::scoring::ScoringState;
use chrono::Local;
use cricket_api::{CoreResult, Match, MatchStatus, Tournament};
use log::{debug, info};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    PointsTable,
    Teams,
    Scoring,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_tournament_loaded(&mut self, tournament: Tournament) {
        self.state.last_error = None;
        self.state
            .tournament
            .load(tournament, Local::now().format("%H:%M").to_string());

        // Follow remote updates unless the scorer has edits in flight.
        let refreshed = self.state.scoring.as_ref().and_then(|scoring| {
            if scoring.is_dirty() {
                return None;
            }
            let id = scoring.match_id();
            self.state.tournament.matches().iter().find(|m| m.id == id).cloned()
        });
        if let Some(game) = refreshed {
            let teams = self.state.tournament.teams().to_vec();
            self.state.scoring = Some(ScoringState::new(game, teams));
        }
    }

    pub fn on_match_saved(&mut self, game: Match) {
        info!("saved match {}", game.id);
        self.state.last_error = None;
        self.state.status = Some(format!("saved at {}", Local::now().format("%H:%M:%S")));
        if self
            .state
            .scoring
            .as_ref()
            .is_some_and(|s| s.match_id() == game.id)
        {
            let teams = self.state.tournament.teams().to_vec();
            self.state.scoring = Some(ScoringState::new(game.clone(), teams));
        }
        self.state.tournament.merge_match(game);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Navigation, delegated to TournamentState
    // -----------------------------------------------------------------------

    pub fn match_down(&mut self) {
        self.state.tournament.select_next_match();
    }

    pub fn match_up(&mut self) {
        self.state.tournament.select_prev_match();
    }

    pub fn team_down(&mut self) {
        self.state.tournament.select_next_team();
    }

    pub fn team_up(&mut self) {
        self.state.tournament.select_prev_team();
    }

    // -----------------------------------------------------------------------
    // Scoring
    // -----------------------------------------------------------------------

    pub fn is_owner(&self) -> bool {
        self.state
            .tournament
            .is_owner(self.settings.user_id.as_deref())
    }

    /// Open the selected match on the Scoring tab. Viewers get a read-only
    /// notice instead.
    pub fn open_scoring(&mut self) {
        let Some(game) = self.state.tournament.selected_match().cloned() else {
            return;
        };
        if !self.is_owner() {
            self.state.last_error =
                Some("read-only: only the tournament organizer can score matches".to_string());
            return;
        }
        let keep_draft = self
            .state
            .scoring
            .as_ref()
            .is_some_and(|s| s.match_id() == game.id);
        if !keep_draft {
            debug!("scoring match {}", game.id);
            let teams = self.state.tournament.teams().to_vec();
            self.state.scoring = Some(ScoringState::new(game, teams));
        }
        self.update_tab(MenuItem::Scoring);
    }

    /// Run one scoring action; refusals end up on the status line and leave
    /// the draft untouched.
    pub fn score(&mut self, action: impl FnOnce(&mut ScoringState) -> CoreResult<()>) {
        let Some(scoring) = self.state.scoring.as_mut() else {
            return;
        };
        match action(scoring) {
            Ok(()) => {
                self.state.last_error = None;
                self.state.status = None;
            }
            Err(err) => self.state.last_error = Some(err.to_string()),
        }
    }

    pub fn go_live(&mut self) {
        self.score(|s| s.transition(MatchStatus::Live));
    }

    pub fn complete_match(&mut self) {
        self.score(|s| s.transition(MatchStatus::Completed));
    }

    pub fn abandon_match(&mut self) {
        self.score(|s| s.transition(MatchStatus::Abandoned));
    }

    pub fn discard_scoring(&mut self) {
        if let Some(scoring) = self.state.scoring.as_mut() {
            scoring.discard();
            self.state.last_error = None;
            self.state.status = Some("changes discarded".to_string());
        }
    }

    /// Request persisting the pending edits, if there are any.
    pub fn save_request(&mut self) -> Option<NetworkRequest> {
        let Some((current, edits)) = self.state.scoring.as_ref().and_then(|s| s.pending()) else {
            self.state.status = Some("nothing to save".to_string());
            return None;
        };
        self.state.status = Some("saving...".to_string());
        Some(NetworkRequest::SaveMatch {
            current,
            teams: self.state.tournament.teams().to_vec(),
            edits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_api::{MatchEdit, Team};

    fn tournament() -> Tournament {
        Tournament {
            id: "t1".into(),
            name: "Cup".into(),
            created_by: "owner".into(),
            teams: ["a", "b"]
                .into_iter()
                .map(|id| Team { id: id.into(), name: id.into(), ..Default::default() })
                .collect(),
            matches: vec![Match {
                id: "m1".into(),
                team1_id: "a".into(),
                team2_id: "b".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn app(user: Option<&str>) -> App {
        let mut app = App::new(AppSettings {
            user_id: user.map(String::from),
            ..Default::default()
        });
        app.on_tournament_loaded(tournament());
        app
    }

    #[test]
    fn viewers_cannot_open_scoring() {
        let mut app = app(Some("viewer"));
        app.open_scoring();
        assert!(app.state.scoring.is_none());
        assert_eq!(app.state.active_tab, MenuItem::Matches);
        assert!(app.state.last_error.as_deref().unwrap().starts_with("read-only"));
    }

    #[test]
    fn owner_scores_and_saves() {
        let mut app = app(Some("owner"));
        app.open_scoring();
        assert_eq!(app.state.active_tab, MenuItem::Scoring);

        app.score(|s| s.adjust_runs(4));
        assert!(app.state.last_error.is_some());

        app.go_live();
        app.score(|s| s.adjust_runs(4));
        assert!(app.state.last_error.is_none());

        let Some(NetworkRequest::SaveMatch { current, edits, teams }) = app.save_request() else {
            panic!("expected a save request");
        };
        assert_eq!(current.status, MatchStatus::Upcoming);
        assert_eq!(teams.len(), 2);
        assert_eq!(edits[0], MatchEdit::Transition(MatchStatus::Live));
    }

    #[test]
    fn nothing_to_save_without_edits() {
        let mut app = app(Some("owner"));
        app.open_scoring();
        assert!(app.save_request().is_none());
    }

    #[test]
    fn saved_match_resets_draft_and_standings() {
        let mut app = app(Some("owner"));
        app.open_scoring();
        app.go_live();
        let saved = app.state.scoring.as_ref().unwrap().draft.clone();
        app.on_match_saved(saved);

        let scoring = app.state.scoring.as_ref().unwrap();
        assert!(!scoring.is_dirty());
        assert!(scoring.original.is_live());
        assert!(app.state.tournament.matches()[0].is_live());
    }

    #[test]
    fn refresh_keeps_unsaved_draft() {
        let mut app = app(Some("owner"));
        app.open_scoring();
        app.go_live();
        app.on_tournament_loaded(tournament());
        assert!(app.state.scoring.as_ref().unwrap().is_dirty());
    }

    #[test]
    fn ended_inning_survives_refresh_after_save() {
        let mut app = app(Some("owner"));
        app.open_scoring();
        app.go_live();
        app.score(|s| s.end_inning());
        let saved = app.state.scoring.as_ref().unwrap().draft.clone();
        app.on_match_saved(saved.clone());

        // Remote reload: same innings, closed flag not stored.
        let mut refreshed = tournament();
        let mut game = saved;
        game.inning1.as_mut().unwrap().ended = false;
        refreshed.matches = vec![game];
        app.on_tournament_loaded(refreshed);

        let scoring = app.state.scoring.as_ref().unwrap();
        assert!(!scoring.is_dirty());
        assert!(scoring.affordances().can_start_second);
        app.score(|s| s.start_second_inning());
        assert!(app.state.last_error.is_none());
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app(None);
        app.update_tab(MenuItem::PointsTable);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::PointsTable);
    }
}
