pub mod access;
pub mod client;
pub mod error;
pub mod lifecycle;
pub mod overs;
pub mod standings;
pub mod store;
pub mod supabase;

pub use error::{CoreError, CoreResult, EntityKind};
pub use lifecycle::{InningNumber, InningScore, MatchEdit, NewMatch};
pub use standings::{TeamStanding, compute_standings};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types, independent of the backend wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub format: TournamentFormat,
    pub logo: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Owner of the tournament; the only identity allowed to write to it.
    pub created_by: String,
    pub secret_code: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl Tournament {
    /// Case-insensitive exact comparison against the shared access code.
    pub fn matches_code(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty() && self.secret_code.eq_ignore_ascii_case(code)
    }

    pub fn find_team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn find_match_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == match_id)
    }

    /// Display name for a team id, falling back to the id for stale references.
    pub fn team_name<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.find_team(team_id)
            .map(|t| t.name.as_str())
            .unwrap_or(team_id)
    }

    /// Replace a match in place after a save or refresh. Unknown ids are appended.
    pub fn merge_match(&mut self, update: Match) {
        match self.find_match_mut(&update.id) {
            Some(existing) => *existing = update,
            None => self.matches.push(update),
        }
    }

    pub fn standings(&self) -> Vec<TeamStanding> {
        compute_standings(&self.teams, &self.matches)
    }

    /// Invitation text handed to viewers along with the access code.
    pub fn share_message(&self, url: &str) -> String {
        format!(
            "You're invited to view the \"{}\" cricket tournament!\n\nAccess it here: {url}\n\nEnter code: {}",
            self.name, self.secret_code
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    Knockout,
    #[default]
    League,
    GroupKnockout,
}

impl TournamentFormat {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentFormat::Knockout => "Knockout",
            TournamentFormat::League => "League",
            TournamentFormat::GroupKnockout => "Group Knockout",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub logo: Option<String>,
    pub tournament_id: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    /// Short label for narrow columns: the short name, or the first two letters.
    pub fn abbrev(&self) -> String {
        match self.short_name.as_deref() {
            Some(short) if !short.trim().is_empty() => short.to_string(),
            _ => self.name.chars().take(2).collect::<String>().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Upcoming,
    Live,
    Completed,
    Abandoned,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Upcoming => "Upcoming",
            MatchStatus::Live => "LIVE",
            MatchStatus::Completed => "Completed",
            MatchStatus::Abandoned => "Abandoned",
        }
    }

    /// Compact tag for list rows.
    pub fn tag(&self) -> &'static str {
        match self {
            MatchStatus::Upcoming => "UPC",
            MatchStatus::Live => "LIVE",
            MatchStatus::Completed => "FNL",
            MatchStatus::Abandoned => "ABD",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub tournament_id: String,
    pub team1_id: String,
    pub team2_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub venue: Option<String>,
    pub status: MatchStatus,
    pub inning1: Option<Inning>,
    pub inning2: Option<Inning>,
    pub result: Option<MatchResult>,
}

impl Match {
    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    pub fn opponent_of(&self, team_id: &str) -> Option<&str> {
        if self.team1_id == team_id {
            Some(&self.team2_id)
        } else if self.team2_id == team_id {
            Some(&self.team1_id)
        } else {
            None
        }
    }

    pub fn winner(&self) -> Option<&WinnerOutcome> {
        self.result.as_ref().map(|r| &r.winner)
    }

    /// The inning batted by `team_id`, if it has started.
    pub fn inning_of(&self, team_id: &str) -> Option<&Inning> {
        [self.inning1.as_ref(), self.inning2.as_ref()]
            .into_iter()
            .flatten()
            .find(|i| i.team_id == team_id)
    }

    /// Keep closed-inning flags already known for this match. A closed inning
    /// never reopens, so flags are only ever added.
    pub fn keep_inning_flags(&mut self, known: &Match) {
        let pairs = [
            (self.inning1.as_mut(), known.inning1.as_ref()),
            (self.inning2.as_mut(), known.inning2.as_ref()),
        ];
        for (inning, known) in pairs {
            if let (Some(inning), Some(known)) = (inning, known)
                && inning.team_id == known.team_id
            {
                inning.ended |= known.ended;
            }
        }
    }

    /// "TBD" without a date, otherwise the date with the start time when known.
    pub fn schedule_label(&self) -> String {
        let Some(date) = self.date else {
            return "TBD".to_string();
        };
        match self.time {
            Some(time) => format!("{}, {}", date.format("%d %b %Y"), time.format("%H:%M")),
            None => date.format("%d %b %Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inning {
    pub team_id: String,
    pub runs: u32,
    pub wickets: u8,
    /// Overs in cricket notation: 19.2 is nineteen overs and two balls.
    pub overs: f64,
    /// Set by the scorer; the next inning cannot start before this.
    #[serde(default)]
    pub ended: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub balls: Vec<BallDetail>,
}

impl Inning {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            ..Self::default()
        }
    }

    pub fn score(&self) -> InningScore {
        InningScore {
            runs: self.runs,
            wickets: self.wickets,
            overs: self.overs,
        }
    }

    /// "180/6 (20 ov)"
    pub fn score_line(&self) -> String {
        format!("{}/{} ({} ov)", self.runs, self.wickets, self.overs)
    }
}

/// Per-delivery detail. Stored and carried, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BallDetail {
    pub over: u32,
    pub ball: u8,
    pub runs: u32,
    #[serde(default)]
    pub wicket: bool,
    pub wicket_type: Option<String>,
    pub bowler_id: Option<String>,
    pub batsman_id: Option<String>,
    pub commentary: Option<String>,
}

/// Who won. Ties and washouts are their own variants instead of reserved ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team_id", rename_all = "snake_case")]
pub enum WinnerOutcome {
    TeamWin(String),
    Tie,
    NoResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginType {
    Runs,
    Wickets,
}

impl MarginType {
    pub fn unit(&self, margin: u32) -> &'static str {
        match (self, margin) {
            (MarginType::Runs, 1) => "run",
            (MarginType::Runs, _) => "runs",
            (MarginType::Wickets, 1) => "wicket",
            (MarginType::Wickets, _) => "wickets",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: WinnerOutcome,
    pub margin: Option<u32>,
    pub margin_type: Option<MarginType>,
    pub summary: Option<String>,
}

impl MatchResult {
    pub fn tie() -> Self {
        Self {
            winner: WinnerOutcome::Tie,
            margin: None,
            margin_type: None,
            summary: Some("Match tied".to_string()),
        }
    }

    pub fn no_result() -> Self {
        Self {
            winner: WinnerOutcome::NoResult,
            margin: None,
            margin_type: None,
            summary: Some("No result".to_string()),
        }
    }

    pub fn team_win(team_id: impl Into<String>) -> Self {
        Self {
            winner: WinnerOutcome::TeamWin(team_id.into()),
            margin: None,
            margin_type: None,
            summary: None,
        }
    }

    /// The stored summary, or one rebuilt from winner and margin.
    pub fn describe(&self, tournament: &Tournament) -> String {
        if let Some(summary) = self.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            return summary.to_string();
        }
        match &self.winner {
            WinnerOutcome::Tie => "Match tied".to_string(),
            WinnerOutcome::NoResult => "No result".to_string(),
            WinnerOutcome::TeamWin(team_id) => {
                let name = tournament.team_name(team_id);
                match (self.margin, self.margin_type) {
                    (Some(margin), Some(kind)) => {
                        format!("{name} won by {margin} {}", kind.unit(margin))
                    }
                    _ => format!("{name} won"),
                }
            }
        }
    }
}
