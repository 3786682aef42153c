use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::{App, AppState};
use faktor::partition::color_index_of;

const HORIZONTAL_MARGIN: u16 = 5;

/// The original game's CSS palette: gray, maroon, red, fuchsia, green,
/// navy, teal, orange, olive, rebeccapurple.
pub const PALETTE: [Color; 10] = [
    Color::Rgb(128, 128, 128),
    Color::Rgb(128, 0, 0),
    Color::Rgb(255, 0, 0),
    Color::Rgb(255, 0, 255),
    Color::Rgb(0, 128, 0),
    Color::Rgb(0, 0, 128),
    Color::Rgb(0, 128, 128),
    Color::Rgb(255, 165, 0),
    Color::Rgb(128, 128, 0),
    Color::Rgb(102, 51, 153),
];

/// Display color of a number, fixed by the partition hash.
pub fn color_of(number: u32) -> Color {
    PALETTE[color_index_of(number) as usize]
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Landing => render_landing(self, area, buf),
            AppState::Quiz => render_quiz(self, area, buf),
            AppState::Done => render_done(self, area, buf),
        }
    }
}

fn centered_chunks(area: Rect, heights: &[u16]) -> std::rc::Rc<[Rect]> {
    let used: u16 = heights.iter().sum();
    let pad = area.height.saturating_sub(used) / 2;

    let mut constraints = Vec::with_capacity(heights.len() + 2);
    constraints.push(Constraint::Length(pad));
    constraints.extend(heights.iter().map(|&h| Constraint::Length(h)));
    constraints.push(Constraint::Min(0));

    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(constraints)
        .split(area)
}

fn input_line(app: &App) -> Line<'_> {
    Line::from(vec![
        Span::styled("> ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            app.input.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])
}

fn render_landing(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = centered_chunks(area, &[2, 2, 1]);

    Paragraph::new(app.message.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    if !app.level_summary.is_empty() {
        let summary = app
            .level_summary
            .iter()
            .map(|(level, count)| format!("level {level}: {count}"))
            .join("   ");
        Paragraph::new(Span::styled(
            summary,
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    Paragraph::new(input_line(app))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_quiz(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = &app.session else {
        return;
    };
    let Some(number) = session.current_number() else {
        return;
    };

    if app.flash_active() {
        buf.set_style(area, Style::default().bg(Color::Rgb(80, 0, 0)));
    }

    let chunks = centered_chunks(area, &[3, 1, 2, 1]);

    Paragraph::new(Span::styled(
        number.to_string(),
        Style::default()
            .fg(color_of(number))
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("Remaining: {}", session.remaining().len() + 1),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(input_line(app))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if !app.message.is_empty() {
        Paragraph::new(Span::styled(
            app.message.as_str(),
            Style::default().fg(Color::Red),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);
    }
}

fn render_done(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = &app.session else {
        return;
    };

    let chunks = centered_chunks(area, &[2, 2, 2]);

    Paragraph::new(Span::styled(
        "Done!",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(format!(
        "You factored {} numbers with {} errors.",
        session.initial_count(),
        session.error_count()
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(r)estart (esc)ape",
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}
