/// Hosted backend row shapes, as returned by its REST interface.
/// These map to the domain types through the functions in client.rs.
use serde::{Deserialize, Serialize};

/// Stored in `matches.winner_id` instead of a team id.
pub const WINNER_TIE: &str = "tie";
pub const WINNER_NO_RESULT: &str = "no-result";

// ---------------------------------------------------------------------------
// Read side: rows with their embedded children
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DbTournament {
    pub id: String,
    pub name: String,
    pub format: Option<String>,
    pub logo_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub secret_code: String,
    #[serde(default)]
    pub teams: Vec<DbTeam>,
    #[serde(default)]
    pub matches: Vec<DbMatch>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DbTeam {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub tournament_id: String,
    #[serde(default)]
    pub players: Vec<DbPlayer>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DbPlayer {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DbMatch {
    pub id: String,
    #[serde(default)]
    pub tournament_id: String,
    pub team1_id: String,
    pub team2_id: String,
    pub match_date: Option<String>,
    pub match_time: Option<String>,
    pub venue: Option<String>,
    pub status: Option<String>,
    /// A team id, or one of the tie / no-result sentinels.
    pub winner_id: Option<String>,
    pub win_margin: Option<u32>,
    pub win_margin_type: Option<String>,
    #[serde(default)]
    pub innings: Vec<DbInnings>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DbInnings {
    pub id: Option<String>,
    #[serde(default)]
    pub match_id: String,
    pub team_id: String,
    pub is_first_innings: bool,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub wickets: u8,
    #[serde(default)]
    pub overs: f64,
}

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Body of a `PATCH /matches`. Every column is written so cleared values
/// (e.g. a removed result) reach the backend as nulls.
#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct DbMatchPatch {
    pub team1_id: String,
    pub team2_id: String,
    pub match_date: Option<String>,
    pub match_time: Option<String>,
    pub venue: Option<String>,
    pub status: String,
    pub winner_id: Option<String>,
    pub win_margin: Option<u32>,
    pub win_margin_type: Option<String>,
}

/// Body of an innings upsert keyed on `(match_id, is_first_innings)`.
#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct DbInningsWrite {
    pub match_id: String,
    pub team_id: String,
    pub is_first_innings: bool,
    pub runs: u32,
    pub wickets: u8,
    pub overs: f64,
}
