use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use anyhow::{Context, bail};
use cricket_api::access::AdminSession;
use cricket_api::client::SupabaseClient;
use cricket_api::store::{MemoryStore, TournamentStore};
use cricket_api::{Match, MatchEdit, Team, Tournament};
use log::{debug, error, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Where tournaments are read from and saved to.
pub enum Backend {
    /// JSON snapshot on disk, re-read on every load so outside edits show up.
    Snapshot { path: PathBuf, store: MemoryStore },
    Remote(SupabaseClient),
}

impl Backend {
    pub fn from_settings(settings: &AppSettings) -> anyhow::Result<Self> {
        if let Some(path) = settings.tournament_json.clone() {
            let store = MemoryStore::load(&path)
                .with_context(|| format!("could not load {}", path.display()))?;
            return Ok(Backend::Snapshot { path, store });
        }
        let Some(url) = settings.api_url.as_deref() else {
            bail!("set CRICTUI_API_URL or CRICTUI_TOURNAMENT_JSON to choose a backend");
        };
        let mut client = SupabaseClient::new(url, settings.api_key.clone());
        if let Some(token) = settings.access_token.clone() {
            client = client.with_access_token(token);
        }
        Ok(Backend::Remote(client))
    }

    pub async fn load_tournament(&mut self, code: &str) -> anyhow::Result<Tournament> {
        match self {
            Backend::Snapshot { path, store } => {
                *store = MemoryStore::load(&*path)?;
                Ok(store.find_by_code(code)?)
            }
            Backend::Remote(client) => Ok(client.fetch_tournament_by_code(code).await?),
        }
    }

    pub async fn save_match(
        &mut self,
        user_id: &str,
        current: &Match,
        teams: &[Team],
        edits: &[MatchEdit],
    ) -> anyhow::Result<Match> {
        match self {
            Backend::Snapshot { path, store } => {
                let saved = AdminSession::new(store, user_id).update_match(&current.id, edits)?;
                store.save(&*path)?;
                Ok(saved)
            }
            Backend::Remote(client) => Ok(client.update_match(current, teams, edits).await?),
        }
    }
}

pub struct NetworkWorker {
    backend: Backend,
    code: String,
    user_id: String,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        backend: Backend,
        code: String,
        user_id: Option<String>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            backend,
            code,
            user_id: user_id.unwrap_or_default(),
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let quiet = matches!(request, NetworkRequest::RefreshTournament);
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadTournament | NetworkRequest::RefreshTournament => {
                    self.handle_load_tournament().await
                }
                NetworkRequest::SaveMatch { current, teams, edits } => {
                    self.handle_save_match(current, teams, edits).await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = match result {
                Ok(response) => response,
                Err(err) if quiet => {
                    warn!("background refresh failed: {err:#}");
                    continue;
                }
                Err(err) => NetworkResponse::Error { message: format!("{err:#}") },
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_tournament(&mut self) -> anyhow::Result<NetworkResponse> {
        debug!("loading tournament {}", self.code);
        let tournament = self.backend.load_tournament(&self.code).await?;
        Ok(NetworkResponse::TournamentLoaded { tournament })
    }

    async fn handle_save_match(
        &mut self,
        current: Match,
        teams: Vec<Team>,
        edits: Vec<MatchEdit>,
    ) -> anyhow::Result<NetworkResponse> {
        debug!("saving {} edit(s) to match {}", edits.len(), current.id);
        let game = self
            .backend
            .save_match(&self.user_id, &current, &teams, &edits)
            .await?;
        Ok(NetworkResponse::MatchSaved { game })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
