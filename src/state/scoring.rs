//! Local draft of the match being scored. Every key press is validated by the
//! lifecycle rules immediately; the accumulated edits are sent on save.

use cricket_api::lifecycle::{self, ScoringAffordances};
use cricket_api::{
    CoreError, CoreResult, InningNumber, InningScore, Match, MatchEdit, MatchResult, MatchStatus,
    Team, WinnerOutcome, overs,
};

#[derive(Debug, Clone)]
pub struct ScoringState {
    /// The match as last loaded from the backend.
    pub original: Match,
    pub draft: Match,
    pub edits: Vec<MatchEdit>,
    teams: Vec<Team>,
}

impl ScoringState {
    pub fn new(game: Match, teams: Vec<Team>) -> Self {
        Self {
            draft: game.clone(),
            original: game,
            edits: Vec::new(),
            teams,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.original.id
    }

    pub fn is_dirty(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn affordances(&self) -> ScoringAffordances {
        lifecycle::affordances(&self.draft)
    }

    pub fn active_inning(&self) -> Option<InningNumber> {
        lifecycle::active_inning(&self.draft)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Drop unsaved edits.
    pub fn discard(&mut self) {
        self.draft = self.original.clone();
        self.edits.clear();
    }

    pub fn adjust_runs(&mut self, delta: i32) -> CoreResult<()> {
        self.adjust_score(|score| {
            score.runs = score.runs.saturating_add_signed(delta);
            Ok(())
        })
    }

    pub fn adjust_wickets(&mut self, delta: i8) -> CoreResult<()> {
        self.adjust_score(|score| {
            score.wickets = score.wickets.saturating_add_signed(delta);
            Ok(())
        })
    }

    pub fn adjust_balls(&mut self, delta: i32) -> CoreResult<()> {
        self.adjust_score(|score| {
            score.overs = overs::add_balls(score.overs, delta)
                .ok_or_else(|| CoreError::validation("stored overs are not in cricket notation"))?;
            Ok(())
        })
    }

    pub fn end_inning(&mut self) -> CoreResult<()> {
        let inning = self.require_active()?;
        self.push(MatchEdit::EndInning(inning))
    }

    pub fn start_second_inning(&mut self) -> CoreResult<()> {
        self.push(MatchEdit::StartSecondInning)
    }

    pub fn transition(&mut self, next: MatchStatus) -> CoreResult<()> {
        self.push(MatchEdit::Transition(next))
    }

    /// Step through the possible results: none, team1, team2, tie, no result.
    /// "None" is skipped once the match is completed since a result can no
    /// longer be cleared then.
    pub fn cycle_winner(&mut self) -> CoreResult<()> {
        let draft = &self.draft;
        let t1 = WinnerOutcome::TeamWin(draft.team1_id.clone());
        let t2 = WinnerOutcome::TeamWin(draft.team2_id.clone());
        let order = [None, Some(t1), Some(t2), Some(WinnerOutcome::Tie), Some(WinnerOutcome::NoResult)];
        let current = draft.winner().cloned();
        let position = order.iter().position(|o| *o == current).unwrap_or(0);
        let clearable = draft.status == MatchStatus::Live;

        let next = order
            .iter()
            .cycle()
            .skip(position + 1)
            .take(order.len())
            .find(|o| o.is_some() || clearable)
            .cloned()
            .flatten();

        let edit = match next {
            None => MatchEdit::ClearResult,
            Some(outcome) => MatchEdit::SetResult(self.result_for(outcome)),
        };
        self.push(edit)
    }

    /// Edits to send along with the match they apply to.
    pub fn pending(&self) -> Option<(Match, Vec<MatchEdit>)> {
        self.is_dirty()
            .then(|| (self.original.clone(), self.edits.clone()))
    }

    fn result_for(&self, outcome: WinnerOutcome) -> MatchResult {
        match outcome {
            WinnerOutcome::Tie => MatchResult::tie(),
            WinnerOutcome::NoResult => MatchResult::no_result(),
            WinnerOutcome::TeamWin(team_id) => lifecycle::derive_result(&self.draft, &self.teams)
                .filter(|derived| derived.winner == WinnerOutcome::TeamWin(team_id.clone()))
                .unwrap_or_else(|| MatchResult::team_win(team_id)),
        }
    }

    fn require_active(&self) -> CoreResult<InningNumber> {
        self.active_inning()
            .ok_or_else(|| CoreError::validation("no inning is open for scoring"))
    }

    fn adjust_score(&mut self, change: impl FnOnce(&mut InningScore) -> CoreResult<()>) -> CoreResult<()> {
        let inning = self.require_active()?;
        let mut score = match inning {
            InningNumber::First => self.draft.inning1.as_ref(),
            InningNumber::Second => self.draft.inning2.as_ref(),
        }
        .map(|i| i.score())
        .unwrap_or_default();
        change(&mut score)?;
        self.push(MatchEdit::RecordScore(inning, score))
    }

    /// Validate one edit against the draft and record it. Consecutive score
    /// changes to the same inning collapse into one edit.
    fn push(&mut self, edit: MatchEdit) -> CoreResult<()> {
        self.draft = lifecycle::apply_edits(&self.draft, std::slice::from_ref(&edit), &self.teams)?;
        let merged = match (self.edits.last_mut(), &edit) {
            (Some(MatchEdit::RecordScore(last, score)), MatchEdit::RecordScore(inning, new_score))
                if last == inning =>
            {
                *score = *new_score;
                true
            }
            _ => false,
        };
        if !merged {
            self.edits.push(edit);
        }
        Ok(())
    }
}
