use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`.
    pub api_url: Option<String>,
    pub api_key: String,
    pub access_token: Option<String>,
    /// Identity used for owner checks. Scoring is disabled without it.
    pub user_id: Option<String>,
    /// Local snapshot; takes precedence over the remote backend.
    pub tournament_json: Option<PathBuf>,
    pub refresh_period: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: None,
            api_key: String::new(),
            access_token: None,
            user_id: None,
            tournament_json: None,
            refresh_period: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let refresh_secs = var("CRICTUI_REFRESH_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REFRESH_SECS);

        Self {
            full_screen: false,
            log_level: var("CRICTUI_LOG").and_then(|v| v.parse::<LevelFilter>().ok()),
            api_url: var("CRICTUI_API_URL"),
            api_key: var("CRICTUI_API_KEY").unwrap_or_default(),
            access_token: var("CRICTUI_ACCESS_TOKEN"),
            user_id: var("CRICTUI_USER_ID"),
            tournament_json: var("CRICTUI_TOURNAMENT_JSON").map(PathBuf::from),
            refresh_period: Duration::from_secs(refresh_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.refresh_period, Duration::from_secs(30));
        assert!(s.api_url.is_none());
        assert!(s.log_level.is_none());
    }

    #[test]
    fn reads_backend_and_identity() {
        let s = settings(&[
            ("CRICTUI_API_URL", "https://x.supabase.co"),
            ("CRICTUI_API_KEY", "anon"),
            ("CRICTUI_USER_ID", " owner "),
            ("CRICTUI_LOG", "debug"),
            ("CRICTUI_REFRESH_SECS", "5"),
        ]);
        assert_eq!(s.api_url.as_deref(), Some("https://x.supabase.co"));
        assert_eq!(s.user_id.as_deref(), Some("owner"));
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
        assert_eq!(s.refresh_period, Duration::from_secs(5));
    }

    #[test]
    fn bad_values_fall_back() {
        let s = settings(&[
            ("CRICTUI_REFRESH_SECS", "0"),
            ("CRICTUI_LOG", "loud"),
            ("CRICTUI_ACCESS_TOKEN", "   "),
        ]);
        assert_eq!(s.refresh_period, Duration::from_secs(30));
        assert!(s.log_level.is_none());
        assert!(s.access_token.is_none());
    }
}
