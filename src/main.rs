mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::components::points_table;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{Backend, LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use cricket_api::{TeamStanding, TournamentFormat};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use serde::Serialize;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Version,
    Tui { code: String },
    Standings { code: String, json: bool },
}

#[derive(Serialize)]
struct StandingsExport<'a> {
    tournament: &'a str,
    format: TournamentFormat,
    standings: &'a [TeamStanding],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    let settings = AppSettings::load();
    let code = match command {
        Command::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        Command::Version => {
            println!("crictui {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Standings { code, json } => return print_standings(&settings, &code, json).await,
        Command::Tui { code } => code,
    };

    // Fail on a missing backend before the terminal is taken over.
    let backend = Backend::from_settings(&settings)?;

    better_panic::install();

    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let refresh_period = settings.refresh_period;
    let user_id = settings.user_id.clone();
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(backend, code, user_id, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic reload so viewers follow live scoring
    let periodic_updater = PeriodicRefresher::new(network_req_tx.clone(), refresh_period);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger tournament load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut code = None;
    let mut standings = false;
    let mut json = false;

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-s" | "--standings" => standings = true,
            "--json" => json = true,
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {flag}")),
            value if code.is_none() => code = Some(value.trim().to_string()),
            extra => return Err(format!("Unexpected argument: {extra}")),
        }
    }

    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return Err("Missing tournament code".to_string());
    };
    if json && !standings {
        return Err("--json only applies to --standings".to_string());
    }

    Ok(if standings {
        Command::Standings { code, json }
    } else {
        Command::Tui { code }
    })
}

fn usage_text() -> &'static str {
    "crictui - cricket tournament scores and points table

Usage:
  crictui <CODE>                      open the tournament with this access code
  crictui --standings <CODE> [--json] print the points table and exit
  crictui --help
  crictui --version

Environment:
  CRICTUI_API_URL           Base URL of the hosted backend
  CRICTUI_API_KEY           Public API key sent with every request
  CRICTUI_ACCESS_TOKEN      Bearer token for the signed-in organizer
  CRICTUI_USER_ID           Organizer identity; enables scoring for own tournaments
  CRICTUI_TOURNAMENT_JSON   Path to a local tournament snapshot (overrides the API)
  CRICTUI_REFRESH_SECS      Reload period in seconds (default 30)
  CRICTUI_LOG               Log level for the log pane (error, warn, info, debug)"
}

async fn print_standings(settings: &AppSettings, code: &str, json: bool) -> anyhow::Result<()> {
    let mut backend = Backend::from_settings(settings)?;
    let tournament = backend.load_tournament(code).await?;
    let standings = tournament.standings();

    if json {
        let export = StandingsExport {
            tournament: &tournament.name,
            format: tournament.format,
            standings: &standings,
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
    } else {
        println!("{} ({})\n", tournament.name, tournament.format.label());
        print!("{}", points_table::to_text(&standings));
    }
    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadTournament).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::TournamentLoaded { tournament } => {
            let mut guard = app.lock().await;
            guard.on_tournament_loaded(tournament);
        }
        NetworkResponse::MatchSaved { game } => {
            let mut guard = app.lock().await;
            guard.on_match_saved(game);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn code_opens_the_tui() {
        assert_eq!(parse(&["ABC123"]), Ok(Command::Tui { code: "ABC123".into() }));
    }

    #[test]
    fn standings_flag_in_any_position() {
        let expected = Command::Standings { code: "ABC123".into(), json: true };
        assert_eq!(parse(&["--standings", "ABC123", "--json"]), Ok(expected));
        let expected = Command::Standings { code: "ABC123".into(), json: false };
        assert_eq!(parse(&["ABC123", "-s"]), Ok(expected));
    }

    #[test]
    fn help_wins_over_everything() {
        assert_eq!(parse(&["ABC123", "--help"]), Ok(Command::Help));
        assert_eq!(parse(&["-V"]), Ok(Command::Version));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["A", "B"]).is_err());
        assert!(parse(&["ABC123", "--json"]).is_err());
        assert!(parse(&["  "]).is_err());
    }
}
