//! Documentation popup for the selected field or type

use crate::inspect::Documentation;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render `doc` in a box centered over `area`
pub fn render_docs_popup(frame: &mut Frame, area: Rect, name: &str, doc: &Documentation) {
    let popup = centered(area, 60, 50);

    let heading = Style::default()
        .fg(DEFAULT_THEME.primary)
        .add_modifier(Modifier::BOLD);
    let body = Style::default().fg(DEFAULT_THEME.fg);

    let mut lines = vec![Line::from(Span::styled(doc.summary.clone(), body))];
    if let Some(remarks) = &doc.remarks {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Remarks", heading)));
        lines.push(Line::from(Span::styled(remarks.clone(), body)));
    }
    if !doc.parameters.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Parameters", heading)));
        for (param, text) in &doc.parameters {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", param), Style::default().fg(DEFAULT_THEME.secondary)),
                Span::styled(text.clone(), body),
            ]));
        }
    }
    if let Some(returns) = &doc.returns {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Returns", heading)));
        lines.push(Line::from(Span::styled(returns.clone(), body)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "esc to close",
        Style::default().fg(DEFAULT_THEME.comment),
    )));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!(" {} ", name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DEFAULT_THEME.border_focused)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
