use crate::state::network::LoadingState;
use cricket_api::{Match, MatchEdit, Team, Tournament};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTournament,
    /// Periodic reload; failures are logged but do not replace the view.
    RefreshTournament,
    SaveMatch {
        current: Match,
        teams: Vec<Team>,
        edits: Vec<MatchEdit>,
    },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TournamentLoaded { tournament: Tournament },
    MatchSaved { game: Match },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
