//! Status bar with the selected path, messages and keybindings

use crate::inspect::{Language, RenderMode};
use crate::table::LoadState;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Data needed to render the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub is_error: bool,
    /// Display form of the selected node's path
    pub path: Option<String>,
    pub load_state: &'a LoadState,
    pub language: Language,
    pub render_mode: RenderMode,
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bar = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let badge_bg = match data.load_state {
        LoadState::Failed(_) => DEFAULT_THEME.error,
        LoadState::InFlight => DEFAULT_THEME.secondary,
        _ if data.is_error => DEFAULT_THEME.error,
        _ => DEFAULT_THEME.primary,
    };
    let badge = match data.load_state {
        LoadState::NotStarted => " IDLE ",
        LoadState::InFlight => " LOADING ",
        LoadState::Completed => " READY ",
        LoadState::Failed(_) => " LOAD FAILED ",
    };

    let mut left_spans = vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", bar.fg(DEFAULT_THEME.comment)),
    ];
    if let Some(path) = data.path {
        left_spans.push(Span::styled(format!("{} ", path), bar.fg(DEFAULT_THEME.type_name)));
    }
    left_spans.push(Span::styled(
        format!(" {} ", data.message),
        bar.fg(if data.is_error {
            DEFAULT_THEME.error
        } else {
            DEFAULT_THEME.fg
        }),
    ));

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(bar)
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    let mode = match data.render_mode {
        RenderMode::Raw => "raw",
        RenderMode::Rich => "rich",
    };
    let mut right_spans = Vec::new();
    for (i, (key, desc)) in [
        ("⇥", "focus"),
        ("↵", "expand"),
        ("s", "sort"),
        ("c", "copy"),
        ("d", "docs"),
        ("r", "reload"),
        ("q", "quit"),
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            right_spans.push(Span::styled("│", sep_style));
        }
        right_spans.push(Span::styled(format!(" {} ", key), key_style));
        right_spans.push(Span::styled(format!(" {} ", desc), desc_style));
    }
    right_spans.push(Span::styled("│", sep_style));
    right_spans.push(Span::styled(
        format!(" {:?}/{} ", data.language, mode),
        bar.fg(DEFAULT_THEME.secondary),
    ));

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(bar)
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
