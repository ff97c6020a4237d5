//! Inspector tree pane
//!
//! Draws the lines produced by the struct inspector: address column,
//! indentation by depth, expand marker, label, value and a right-aligned
//! type annotation. Only the slice of lines that fits the pane is turned
//! into list items.

use crate::inspect::{MemberTag, NodeKind, RenderMode, TreeLine};
use crate::memory::Value;
use crate::table::scroll_to_reveal;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for the tree pane
#[derive(Debug, Default)]
pub struct TreeScrollState {
    pub offset: usize,
}

/// Data needed to render the tree pane
pub struct TreeRenderData<'a> {
    pub lines: &'a [TreeLine],
    pub selected: usize,
    pub render_mode: RenderMode,
}

/// Width of the address column including its trailing space
const ADDR_WIDTH: usize = 11;

/// Render the inspector tree pane
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    data: TreeRenderData,
    is_focused: bool,
    scroll_state: &mut TreeScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Inspector ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let content_width = area.width.saturating_sub(2) as usize;
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if data.lines.is_empty() {
        let empty = ListItem::new("(nothing to inspect)").style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(List::new(vec![empty]).block(block), area);
        return;
    }

    // Keep the selection visible, then clamp to the last page
    scroll_state.offset = scroll_to_reveal(scroll_state.offset, visible_height, data.selected);
    let max_scroll = data.lines.len().saturating_sub(visible_height);
    scroll_state.offset = scroll_state.offset.min(max_scroll);

    let items: Vec<ListItem> = data
        .lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(i, line)| {
            let item = ListItem::new(tree_line(line, content_width, data.render_mode));
            if i == data.selected && is_focused {
                item.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Build the spans of one tree line
fn tree_line(line: &TreeLine, content_width: usize, mode: RenderMode) -> Line<'static> {
    let addr_text = match line.address {
        Some(addr) if line.kind != NodeKind::RawBytes => format!("0x{:08x} ", addr),
        _ => " ".repeat(ADDR_WIDTH),
    };
    let indent = "  ".repeat(line.depth);
    let marker = match line.kind {
        NodeKind::Branch { open: true } => "▾ ",
        NodeKind::Branch { open: false } => "▸ ",
        _ => "  ",
    };

    let mut spans = vec![
        Span::styled(addr_text, Style::default().fg(DEFAULT_THEME.comment)),
        Span::raw(indent),
        Span::styled(marker, Style::default().fg(DEFAULT_THEME.comment)),
    ];
    if !line.label.is_empty() {
        spans.push(Span::styled(line.label.clone(), Style::default().fg(DEFAULT_THEME.fg)));
        if !line.text.is_empty() {
            spans.push(Span::styled(": ", Style::default().fg(DEFAULT_THEME.fg)));
        }
    }
    if !line.text.is_empty() {
        spans.push(Span::styled(line.text.clone(), value_style(line, mode)));
    }

    if let Some(tag) = line.tag {
        let style = match tag {
            MemberTag::Active => Style::default().fg(DEFAULT_THEME.success),
            MemberTag::Inactive => Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::DIM),
            MemberTag::Union => Style::default().fg(DEFAULT_THEME.secondary),
        };
        spans.push(Span::styled(format!(" [{}]", tag.label()), style));
    }
    if line.doc_key.is_some() || line.type_docs.is_some() {
        spans.push(Span::styled(" ?", Style::default().fg(DEFAULT_THEME.primary)));
    }

    // Right-align the type annotation when it fits
    let type_str = &line.type_name;
    if !type_str.is_empty() {
        let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let type_width = type_str.chars().count();
        if left_width + type_width < content_width {
            let padding = content_width - left_width - type_width;
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::styled(
                type_str.clone(),
                Style::default().fg(DEFAULT_THEME.type_name),
            ));
        }
    }

    Line::from(spans)
}

fn value_style(line: &TreeLine, mode: RenderMode) -> Style {
    match line.kind {
        NodeKind::InvalidPointer => {
            return Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::DIM)
        }
        NodeKind::Cyclic => {
            return Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::ITALIC)
        }
        NodeKind::DepthLimit | NodeKind::Ellipsis { .. } | NodeKind::RawBytes => {
            return Style::default().fg(DEFAULT_THEME.comment)
        }
        NodeKind::Branch { .. } | NodeKind::Leaf => {}
    }
    if mode == RenderMode::Raw {
        return Style::default().fg(DEFAULT_THEME.fg);
    }
    let color = match &line.value {
        Some(Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Null) => DEFAULT_THEME.number,
        Some(Value::Bool(_)) => DEFAULT_THEME.keyword,
        Some(Value::Char(_) | Value::Text(_)) => DEFAULT_THEME.string,
        Some(Value::Enum { .. }) => DEFAULT_THEME.type_name,
        Some(Value::Pointer(_)) => DEFAULT_THEME.secondary,
        None => DEFAULT_THEME.comment,
    };
    Style::default().fg(color)
}
