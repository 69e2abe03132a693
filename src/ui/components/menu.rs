use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub locked: bool,
}

impl MenuItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            locked: false,
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// Vertical list of choices with a highlighted selection. Locked items are
/// drawn dimmed.
pub struct Menu<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(title: &'a str, subtitle: &'a str, items: Vec<MenuItem>, theme: &'a Theme) -> Self {
        Self {
            title,
            subtitle,
            items,
            selected: 0,
            theme,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }
}

/// Wrapping cursor movement over `len` entries.
pub fn step(selected: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (selected + 1) % len
    } else if selected == 0 {
        len - 1
    } else {
        selected - 1
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(self.subtitle, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        // Keep the selection on screen when the list is taller than the area.
        let rows = (layout[1].height / 2).max(1) as usize;
        let first = self.selected.saturating_sub(rows - 1);

        let mut lines = Vec::new();
        for (i, item) in self.items.iter().enumerate().skip(first).take(rows) {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let lock = if item.locked { " (locked)" } else { "" };
            let label_text = format!(" {indicator} [{}] {}{lock}", item.key, item.label);

            let label_style = if item.locked {
                Style::default().fg(colors.locked())
            } else if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(label_text, label_style)));
            lines.push(Line::from(Span::styled(
                format!("     {}", item.description),
                Style::default().fg(if item.locked {
                    colors.locked()
                } else {
                    colors.text_pending()
                }),
            )));
        }
        Paragraph::new(lines).render(layout[1], buf);
    }
}
