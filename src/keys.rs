use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut request = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => guard.update_tab(MenuItem::PointsTable),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Teams),
        (_, Char('4'), _) => guard.update_tab(MenuItem::Scoring),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Matches
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => guard.match_down(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.match_up(),
        (MenuItem::Matches, KeyCode::Enter, _) => guard.open_scoring(),

        // Teams
        (MenuItem::Teams | MenuItem::PointsTable, Char('j') | KeyCode::Down, _) => {
            guard.team_down()
        }
        (MenuItem::Teams | MenuItem::PointsTable, Char('k') | KeyCode::Up, _) => guard.team_up(),

        // Scoring
        (MenuItem::Scoring, Char('+') | Char('='), _) => guard.score(|s| s.adjust_runs(1)),
        (MenuItem::Scoring, Char('-'), _) => guard.score(|s| s.adjust_runs(-1)),
        (MenuItem::Scoring, Char('b'), _) => guard.score(|s| s.adjust_runs(4)),
        (MenuItem::Scoring, Char('s'), _) => guard.score(|s| s.adjust_runs(6)),
        (MenuItem::Scoring, Char('w'), _) => guard.score(|s| s.adjust_wickets(1)),
        (MenuItem::Scoring, Char('W'), _) => guard.score(|s| s.adjust_wickets(-1)),
        (MenuItem::Scoring, Char('.'), _) => guard.score(|s| s.adjust_balls(1)),
        (MenuItem::Scoring, Char(','), _) => guard.score(|s| s.adjust_balls(-1)),
        (MenuItem::Scoring, Char('e'), _) => guard.score(|s| s.end_inning()),
        (MenuItem::Scoring, Char('n'), _) => guard.score(|s| s.start_second_inning()),
        (MenuItem::Scoring, Char('l'), _) => guard.go_live(),
        (MenuItem::Scoring, Char('c'), _) => guard.complete_match(),
        (MenuItem::Scoring, Char('a'), _) => guard.abandon_match(),
        (MenuItem::Scoring, Char('t'), _) => guard.score(|s| s.cycle_winner()),
        (MenuItem::Scoring, KeyCode::Enter, _) => request = guard.save_request(),
        (MenuItem::Scoring, KeyCode::Esc, _) => guard.discard_scoring(),

        // Global
        (_, Char('r'), _) => request = Some(NetworkRequest::LoadTournament),
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}
