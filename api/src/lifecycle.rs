//! Match lifecycle: which status moves are legal, which inning may be scored,
//! and how a winner is derived when a match is completed without one.
//!
//! Every operation takes the current record by reference and returns a new
//! one, so a rejected edit can never leave a half-updated match behind.

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::{Inning, MarginType, Match, MatchResult, MatchStatus, Team, WinnerOutcome, overs};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const MAX_WICKETS: u8 = 10;

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Abandoned)
    }

    /// Statuses reachable in one step. Staying put is always allowed and not listed.
    pub fn allowed_transitions(self) -> &'static [MatchStatus] {
        match self {
            MatchStatus::Upcoming => &[MatchStatus::Live, MatchStatus::Abandoned],
            MatchStatus::Live => &[MatchStatus::Completed, MatchStatus::Abandoned],
            MatchStatus::Completed | MatchStatus::Abandoned => &[],
        }
    }

    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        self == next || self.allowed_transitions().contains(&next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InningNumber {
    First,
    Second,
}

impl InningNumber {
    pub fn ordinal(&self) -> u8 {
        match self {
            InningNumber::First => 1,
            InningNumber::Second => 2,
        }
    }
}

/// The editable part of an inning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InningScore {
    pub runs: u32,
    pub wickets: u8,
    pub overs: f64,
}

impl InningScore {
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> CoreResult<()> {
        if self.wickets > MAX_WICKETS {
            return Err(CoreError::validation(format!(
                "wickets must be between 0 and {MAX_WICKETS}, got {}",
                self.wickets
            )));
        }
        if !overs::is_valid(self.overs) {
            return Err(CoreError::validation(format!(
                "overs must be non-negative with at most 5 balls after the point, got {}",
                self.overs
            )));
        }
        Ok(())
    }
}

/// A single change requested by the scorer. Edits are applied in order and
/// the whole batch is accepted or rejected together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEdit {
    Transition(MatchStatus),
    RecordScore(InningNumber, InningScore),
    EndInning(InningNumber),
    StartSecondInning,
    SetResult(MatchResult),
    ClearResult,
    Reschedule {
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        venue: Option<String>,
    },
    ChangeTeams {
        team1_id: String,
        team2_id: String,
    },
}

/// Fixture details for a match that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: String,
    pub team1_id: String,
    pub team2_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub venue: Option<String>,
}

impl NewMatch {
    /// Validate against the tournament roster and build an upcoming match.
    pub fn into_match(self, id: impl Into<String>, teams: &[Team]) -> CoreResult<Match> {
        validate_teams(&self.team1_id, &self.team2_id, teams)?;
        Ok(Match {
            id: id.into(),
            tournament_id: self.tournament_id,
            team1_id: self.team1_id,
            team2_id: self.team2_id,
            date: self.date,
            time: self.time,
            venue: self.venue.filter(|v| !v.trim().is_empty()),
            status: MatchStatus::Upcoming,
            inning1: None,
            inning2: None,
            result: None,
        })
    }
}

/// Both sides must be chosen, different, and registered in the tournament.
pub fn validate_teams(team1_id: &str, team2_id: &str, teams: &[Team]) -> CoreResult<()> {
    if team1_id.trim().is_empty() || team2_id.trim().is_empty() {
        return Err(CoreError::validation("both teams must be selected"));
    }
    if team1_id == team2_id {
        return Err(CoreError::validation("teams must differ"));
    }
    for id in [team1_id, team2_id] {
        if !teams.iter().any(|t| t.id == id) {
            return Err(CoreError::not_found(EntityKind::Team, id));
        }
    }
    Ok(())
}

/// The inning currently open for scoring, if any. Only live matches have one;
/// once the second inning exists the first is frozen.
pub fn active_inning(game: &Match) -> Option<InningNumber> {
    if game.status != MatchStatus::Live {
        return None;
    }
    match (&game.inning1, &game.inning2) {
        (_, Some(second)) => (!second.ended).then_some(InningNumber::Second),
        (Some(first), None) => (!first.ended).then_some(InningNumber::First),
        (None, None) => None,
    }
}

/// What a scoring screen should enable for this match right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringAffordances {
    pub can_go_live: bool,
    pub can_edit_first: bool,
    pub can_edit_second: bool,
    pub can_end_inning: bool,
    pub can_start_second: bool,
    pub can_set_result: bool,
    pub can_complete: bool,
    pub can_abandon: bool,
}

pub fn affordances(game: &Match) -> ScoringAffordances {
    let active = active_inning(game);
    ScoringAffordances {
        can_go_live: game.status.allowed_transitions().contains(&MatchStatus::Live),
        can_edit_first: active == Some(InningNumber::First),
        can_edit_second: active == Some(InningNumber::Second),
        can_end_inning: active.is_some(),
        can_start_second: can_start_second_inning(game),
        can_set_result: matches!(game.status, MatchStatus::Live | MatchStatus::Completed),
        can_complete: game
            .status
            .allowed_transitions()
            .contains(&MatchStatus::Completed),
        can_abandon: game
            .status
            .allowed_transitions()
            .contains(&MatchStatus::Abandoned),
    }
}

fn can_start_second_inning(game: &Match) -> bool {
    game.status == MatchStatus::Live
        && game.inning2.is_none()
        && game.inning1.as_ref().is_some_and(|i| i.ended)
}

/// Move a match to `next`.
///
/// Going live opens the first inning with team1 batting. Completing without
/// an explicit winner derives one from the innings when both exist.
/// Abandoning never implies a winner.
pub fn transition(game: &Match, next: MatchStatus, teams: &[Team]) -> CoreResult<Match> {
    if game.status == next {
        return Ok(game.clone());
    }
    if !game.status.can_transition_to(next) {
        return Err(CoreError::validation(format!(
            "cannot move match from {} to {}",
            game.status.label(),
            next.label()
        )));
    }

    let mut updated = game.clone();
    updated.status = next;
    match next {
        MatchStatus::Live => {
            if updated.inning1.is_none() {
                updated.inning1 = Some(Inning::new(updated.team1_id.clone()));
            }
        }
        MatchStatus::Completed => {
            for inning in [updated.inning1.as_mut(), updated.inning2.as_mut()]
                .into_iter()
                .flatten()
            {
                inning.ended = true;
            }
            if updated.result.is_none() {
                updated.result = derive_result(&updated, teams);
            }
        }
        MatchStatus::Abandoned | MatchStatus::Upcoming => {}
    }
    Ok(updated)
}

/// Winner and margin from the two innings; `None` unless both exist.
///
/// A side that batted second and passed the target wins by the wickets it had
/// left; a side that defended wins by the run difference; level totals tie.
pub fn derive_result(game: &Match, teams: &[Team]) -> Option<MatchResult> {
    let first = game.inning1.as_ref()?;
    let second = game.inning2.as_ref()?;
    let name_of = |team_id: &str| {
        teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| team_id.to_string())
    };

    let (winner, margin, kind) = match first.runs.cmp(&second.runs) {
        Ordering::Greater => (first, first.runs - second.runs, MarginType::Runs),
        Ordering::Less => (
            second,
            u32::from(MAX_WICKETS.saturating_sub(second.wickets)),
            MarginType::Wickets,
        ),
        Ordering::Equal => return Some(MatchResult::tie()),
    };

    Some(MatchResult {
        winner: WinnerOutcome::TeamWin(winner.team_id.clone()),
        margin: Some(margin),
        margin_type: Some(kind),
        summary: Some(format!(
            "{} won by {margin} {}",
            name_of(&winner.team_id),
            kind.unit(margin)
        )),
    })
}

/// Overwrite the score of `inning`, which must be the active one.
pub fn record_score(game: &Match, inning: InningNumber, score: InningScore) -> CoreResult<Match> {
    score.validate()?;
    ensure_active(game, inning)?;

    let mut updated = game.clone();
    let target = inning_mut(&mut updated, inning)
        .ok_or_else(|| CoreError::validation(format!("inning {} has not started", inning.ordinal())))?;
    target.runs = score.runs;
    target.wickets = score.wickets;
    target.overs = score.overs;
    Ok(updated)
}

/// Close the active inning. This is the only way to unlock the second inning.
pub fn end_inning(game: &Match, inning: InningNumber) -> CoreResult<Match> {
    ensure_active(game, inning)?;
    let mut updated = game.clone();
    if let Some(target) = inning_mut(&mut updated, inning) {
        target.ended = true;
    }
    Ok(updated)
}

/// Open the second inning for whichever side did not bat first.
pub fn start_second_inning(game: &Match) -> CoreResult<Match> {
    if !can_start_second_inning(game) {
        return Err(CoreError::validation(
            "the second inning can only start on a live match after the first inning has ended",
        ));
    }
    let mut updated = game.clone();
    let batting = updated
        .inning1
        .as_ref()
        .and_then(|first| updated.opponent_of(&first.team_id))
        .unwrap_or(&updated.team2_id)
        .to_string();
    updated.inning2 = Some(Inning::new(batting));
    Ok(updated)
}

/// Record an explicit result. The named winner must be one of the two sides.
pub fn set_result(game: &Match, result: MatchResult) -> CoreResult<Match> {
    if !matches!(game.status, MatchStatus::Live | MatchStatus::Completed) {
        return Err(CoreError::validation(format!(
            "a result cannot be set on a match that is {}",
            game.status.label()
        )));
    }
    if let WinnerOutcome::TeamWin(team_id) = &result.winner
        && !game.involves(team_id)
    {
        return Err(CoreError::validation(format!(
            "winner {team_id} is not playing in this match"
        )));
    }
    let mut updated = game.clone();
    updated.result = Some(result);
    Ok(updated)
}

/// Apply a batch of edits atomically; `game` is left untouched on error.
pub fn apply_edits(game: &Match, edits: &[MatchEdit], teams: &[Team]) -> CoreResult<Match> {
    let mut current = game.clone();
    for edit in edits {
        current = apply_edit(&current, edit, teams)?;
    }
    Ok(current)
}

fn apply_edit(game: &Match, edit: &MatchEdit, teams: &[Team]) -> CoreResult<Match> {
    match edit {
        MatchEdit::Transition(next) => transition(game, *next, teams),
        MatchEdit::RecordScore(inning, score) => record_score(game, *inning, *score),
        MatchEdit::EndInning(inning) => end_inning(game, *inning),
        MatchEdit::StartSecondInning => start_second_inning(game),
        MatchEdit::SetResult(result) => set_result(game, result.clone()),
        MatchEdit::ClearResult => {
            if game.status != MatchStatus::Live {
                return Err(CoreError::validation(
                    "the result can only be cleared while the match is live",
                ));
            }
            let mut updated = game.clone();
            updated.result = None;
            Ok(updated)
        }
        MatchEdit::Reschedule { date, time, venue } => {
            if game.status.is_terminal() {
                return Err(CoreError::validation(format!(
                    "a {} match cannot be rescheduled",
                    game.status.label()
                )));
            }
            let mut updated = game.clone();
            updated.date = *date;
            updated.time = *time;
            updated.venue = venue.clone().filter(|v| !v.trim().is_empty());
            Ok(updated)
        }
        MatchEdit::ChangeTeams { team1_id, team2_id } => {
            validate_teams(team1_id, team2_id, teams)?;
            if game.status != MatchStatus::Upcoming {
                return Err(CoreError::validation(
                    "teams can only be changed before the match starts",
                ));
            }
            let mut updated = game.clone();
            updated.team1_id = team1_id.clone();
            updated.team2_id = team2_id.clone();
            Ok(updated)
        }
    }
}

fn ensure_active(game: &Match, inning: InningNumber) -> CoreResult<()> {
    if active_inning(game) == Some(inning) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "inning {} is not open for scoring",
            inning.ordinal()
        )))
    }
}

fn inning_mut(game: &mut Match, inning: InningNumber) -> Option<&mut Inning> {
    match inning {
        InningNumber::First => game.inning1.as_mut(),
        InningNumber::Second => game.inning2.as_mut(),
    }
}
