use cricket_api::TeamStanding;
use tui::buffer::Buffer;
use tui::layout::{Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Cell, Row, Table, Widget};

pub const HEADERS: [&str; 9] = ["#", "Team", "M", "W", "L", "T", "NR", "Pts", "NRR"];

/// Ranked points table. Rows arrive already sorted.
pub struct PointsTable<'a> {
    pub rows: &'a [TeamStanding],
    /// Team to emphasise, e.g. the one selected on the Teams tab.
    pub highlight: Option<&'a str>,
}

pub fn format_nrr(nrr: f64) -> String {
    format!("{nrr:+.2}")
}

fn cells(rank: usize, row: &TeamStanding) -> [String; 9] {
    [
        rank.to_string(),
        row.name.clone(),
        row.played.to_string(),
        row.won.to_string(),
        row.lost.to_string(),
        row.tied.to_string(),
        row.no_result.to_string(),
        row.points.to_string(),
        format_nrr(row.net_run_rate),
    ]
}

impl Widget for PointsTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.rows.is_empty() {
            Line::from("No teams yet")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows = self.rows.iter().enumerate().map(|(idx, row)| {
            let style = if self.highlight == Some(row.team_id.as_str()) {
                Style::default().fg(Color::Yellow)
            } else if row.net_run_rate < 0.0 {
                Style::default().fg(Color::Gray)
            } else {
                Style::default()
            };
            Row::new(cells(idx + 1, row).map(Cell::from)).style(style)
        });

        let widths = [
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(7),
        ];

        Widget::render(Table::new(rows, widths).header(header).column_spacing(1), area, buf);
    }
}

/// Plain-text rendering for `--standings`.
pub fn to_text(rows: &[TeamStanding]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);

    let mut out = format!(
        "{:>3}  {:<name_width$}  {:>3} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7}\n",
        HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3], HEADERS[4], HEADERS[5], HEADERS[6], HEADERS[7], HEADERS[8],
    );
    for (idx, row) in rows.iter().enumerate() {
        let c = cells(idx + 1, row);
        out.push_str(&format!(
            "{:>3}  {:<name_width$}  {:>3} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7}\n",
            c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8],
        ));
    }
    out
}
