use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::points_table::PointsTable;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::scoring::ScoringState;
use crate::ui::layout::LayoutAreas;
use cricket_api::{InningNumber, Match, MatchStatus, Tournament};

static TABS: &[&str; 4] = &["Matches", "Points Table", "Teams", "Scoring"];

const HELP_TEXT: &str = "\
Navigation
  1-4        switch tab          ?  help       Esc  close help
  j/k        move selection      r  reload     f    full screen
  \"          toggle logs         q  quit

Matches
  Enter      score the selected match (organizer only)

Scoring
  l          go live             c  complete   a    abandon
  + / -      runs +1 / -1        b  four       s    six
  w / W      wicket +1 / -1      . / ,  ball +1 / -1
  e          end inning          n  start second inning
  t          cycle result        Enter  save   Esc  discard";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::PointsTable => draw_points_table(f, layout.main, app),
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Scoring => draw_scoring(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main, app),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status(f, layout.status, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Matches => 0,
        MenuItem::PointsTable => 1,
        MenuItem::Teams => 2,
        MenuItem::Scoring => 3,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let title = match app.state.tournament.tournament.as_ref() {
        Some(t) => format!("{} [{}]  Help: ? ", t.name, t.secret_code),
        None => "Help: ? ".to_string(),
    };
    let help = Paragraph::new(title)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Body shown until the first load completes.
fn draw_placeholder(f: &mut Frame, area: Rect, app: &App) {
    let msg = match app.state.last_error.as_deref() {
        Some(err) => format!("Tournament load failed:\n{err}"),
        None => "Loading tournament...".to_string(),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn status_color(status: MatchStatus) -> Color {
    match status {
        MatchStatus::Upcoming => Color::Gray,
        MatchStatus::Live => Color::Red,
        MatchStatus::Completed => Color::Green,
        MatchStatus::Abandoned => Color::DarkGray,
    }
}

fn team_label(tournament: &Tournament, team_id: &str) -> String {
    tournament
        .find_team(team_id)
        .map(|t| t.abbrev())
        .unwrap_or_else(|| "TBD".to_string())
}

fn innings_summary(tournament: &Tournament, game: &Match) -> String {
    [game.inning1.as_ref(), game.inning2.as_ref()]
        .into_iter()
        .flatten()
        .map(|i| format!("{} {}", team_label(tournament, &i.team_id), i.score_line()))
        .collect::<Vec<_>>()
        .join("  ")
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(tournament) = app.state.tournament.tournament.as_ref() else {
        draw_placeholder(f, inner, app);
        return;
    };
    if tournament.matches.is_empty() {
        f.render_widget(
            Paragraph::new("No matches scheduled")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let selected = app.state.tournament.selected_match;
    let mut lines = Vec::new();
    for (idx, game) in tournament.matches.iter().enumerate() {
        let marker = if idx == selected { "> " } else { "  " };
        let row_style = if idx == selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, row_style),
            Span::styled(
                format!("{:<4} ", game.status.tag()),
                Style::default().fg(status_color(game.status)),
            ),
            Span::styled(
                format!(
                    "{} vs {}",
                    team_label(tournament, &game.team1_id),
                    team_label(tournament, &game.team2_id)
                ),
                row_style,
            ),
            Span::styled(
                format!("  {}", game.schedule_label()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(
                game.venue
                    .as_deref()
                    .map(|v| format!(" @ {v}"))
                    .unwrap_or_default(),
            ),
        ]));

        let scores = innings_summary(tournament, game);
        if !scores.is_empty() {
            lines.push(Line::from(format!("        {scores}")));
        }
        if let Some(result) = game.result.as_ref() {
            lines.push(Line::styled(
                format!("        {}", result.describe(tournament)),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    // Keep the selected match on screen.
    let selected_line = tournament
        .matches
        .iter()
        .take(selected)
        .map(|m| {
            1 + usize::from(m.inning1.is_some() || m.inning2.is_some()) + usize::from(m.result.is_some())
        })
        .sum::<usize>();
    let scroll = selected_line.saturating_sub(inner.height.saturating_sub(3) as usize) as u16;

    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn draw_points_table(f: &mut Frame, area: Rect, app: &App) {
    let Some(tournament) = app.state.tournament.tournament.as_ref() else {
        let block = default_border(Color::White).title(" Points Table ");
        let inner = block.inner(area);
        f.render_widget(block, area);
        draw_placeholder(f, inner, app);
        return;
    };

    let block = default_border(Color::White)
        .title(format!(" Points Table - {} ", tournament.format.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    f.render_widget(
        PointsTable {
            rows: &app.state.tournament.standings,
            highlight: app.state.tournament.selected_team().map(|t| t.id.as_str()),
        },
        inner,
    );
}

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(area);

    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    let Some(tournament) = app.state.tournament.tournament.as_ref() else {
        draw_placeholder(f, inner, app);
        return;
    };

    let selected = app.state.tournament.selected_team;
    let lines: Vec<Line> = tournament
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let label = format!("{:<4} {}", team.abbrev(), team.name);
            if idx == selected {
                Line::styled(format!("> {label}"), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Line::from(format!("  {label}"))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    let Some(team) = app.state.tournament.selected_team() else {
        f.render_widget(default_border(Color::DarkGray).title(" Squad "), detail_area);
        return;
    };
    let block = default_border(Color::DarkGray).title(format!(" {} ", team.name));
    let inner = block.inner(detail_area);
    f.render_widget(block, detail_area);

    let mut lines = Vec::new();
    if team.players.is_empty() {
        lines.push(Line::styled("No players yet", Style::default().fg(Color::DarkGray)));
    }
    for player in &team.players {
        let detail = [
            player.role.as_deref(),
            player.batting_style.as_deref(),
            player.bowling_style.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
        lines.push(Line::from(vec![
            Span::raw(player.name.clone()),
            Span::styled(format!("  {detail}"), Style::default().fg(Color::DarkGray)),
        ]));
    }

    lines.push(Line::from(""));
    let played: Vec<&Match> = tournament
        .matches
        .iter()
        .filter(|m| m.involves(&team.id))
        .collect();
    lines.push(Line::styled("Fixtures", Style::default().add_modifier(Modifier::BOLD)));
    for game in played {
        let opponent = game
            .opponent_of(&team.id)
            .map(|id| tournament.team_name(id))
            .unwrap_or("TBD");
        let outcome = game
            .result
            .as_ref()
            .map(|r| r.describe(tournament))
            .unwrap_or_else(|| game.status.label().to_string());
        lines.push(Line::from(format!("vs {opponent}  {}  {outcome}", game.schedule_label())));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn inning_lines(
    tournament: Option<&Tournament>,
    scoring: &ScoringState,
    number: InningNumber,
) -> Line<'static> {
    let game = &scoring.draft;
    let inning = match number {
        InningNumber::First => game.inning1.as_ref(),
        InningNumber::Second => game.inning2.as_ref(),
    };
    let active = scoring.active_inning() == Some(number);
    let label = format!("Inning {}: ", number.ordinal());

    let Some(inning) = inning else {
        return Line::from(vec![
            Span::raw(label),
            Span::styled("not started", Style::default().fg(Color::DarkGray)),
        ]);
    };
    let name = tournament
        .map(|t| t.team_name(&inning.team_id).to_string())
        .unwrap_or_else(|| inning.team_id.clone());
    let state = if active {
        Span::styled("  batting", Style::default().fg(Color::Red))
    } else if inning.ended {
        Span::styled("  ended", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw("")
    };
    Line::from(vec![
        Span::raw(label),
        Span::styled(
            format!("{name} {}", inning.score_line()),
            if active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            },
        ),
        state,
    ])
}

fn draw_scoring(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Scoring ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(scoring) = app.state.scoring.as_ref() else {
        let msg = if app.is_owner() {
            "Select a match on the Matches tab and press Enter to score it"
        } else {
            "Read-only: scoring is limited to the tournament organizer"
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let tournament = app.state.tournament.tournament.as_ref();
    let game = &scoring.draft;
    let name = |id: &str| {
        tournament
            .map(|t| t.team_name(id).to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} vs {}", name(&game.team1_id), name(&game.team2_id)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", game.status.label()),
                Style::default().fg(status_color(game.status)),
            ),
        ]),
        Line::styled(game.schedule_label(), Style::default().fg(Color::DarkGray)),
        Line::from(""),
        inning_lines(tournament, scoring, InningNumber::First),
        inning_lines(tournament, scoring, InningNumber::Second),
        Line::from(""),
    ];

    let result = match (game.result.as_ref(), tournament) {
        (Some(result), Some(t)) => result.describe(t),
        (Some(_), None) => "result set".to_string(),
        (None, _) => "no result yet".to_string(),
    };
    lines.push(Line::styled(format!("Result: {result}"), Style::default().fg(Color::Yellow)));
    lines.push(Line::from(""));

    let can = scoring.affordances();
    let mut hints = Vec::new();
    if can.can_go_live {
        hints.push("l=go live");
    }
    if can.can_edit_first || can.can_edit_second {
        hints.extend(["+/-=runs", "b=4", "s=6", "w/W=wicket", "./,=ball"]);
    }
    if can.can_end_inning {
        hints.push("e=end inning");
    }
    if can.can_start_second {
        hints.push("n=second inning");
    }
    if can.can_set_result {
        hints.push("t=result");
    }
    if can.can_complete {
        hints.push("c=complete");
    }
    if can.can_abandon {
        hints.push("a=abandon");
    }
    if !hints.is_empty() {
        lines.push(Line::styled(
            format!("Keys: {}", hints.join("  ")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let pending = if scoring.is_dirty() {
        Span::styled(
            format!("{} unsaved change(s): Enter=save  Esc=discard", scoring.edits.len()),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled("All changes saved", Style::default().fg(Color::Green))
    };
    lines.push(Line::from(pending));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut text = String::new();
    if let Some(t) = app.state.tournament.tournament.as_ref() {
        text.push_str(&format!("{} ({})\n", t.name, t.format.label()));
        if let Some(location) = t.location.as_deref() {
            text.push_str(&format!("{location}\n"));
        }
        if let (Some(start), Some(end)) = (t.start_date, t.end_date) {
            text.push_str(&format!("{} to {}\n", start.format("%d %b %Y"), end.format("%d %b %Y")));
        }
        if let Some(description) = t.description.as_deref() {
            text.push_str(&format!("{description}\n"));
        }
        let role = if app.is_owner() { "organizer" } else { "viewer" };
        text.push_str(&format!("Signed in as {role}\n\n"));
    }
    text.push_str(HELP_TEXT);

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan));
    f.render_widget(logs, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = app.state.last_error.as_deref() {
        Line::styled(format!(" {err}"), Style::default().fg(Color::Red))
    } else {
        let mut parts = Vec::new();
        if let Some(status) = app.state.status.as_deref() {
            parts.push(status.to_string());
        }
        if let Some(updated) = app.state.tournament.last_updated.as_deref() {
            parts.push(format!("updated {updated}"));
        }
        if !app.is_owner() {
            parts.push("read-only".to_string());
        }
        Line::styled(format!(" {}", parts.join(" | ")), Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
