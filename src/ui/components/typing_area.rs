use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// Prompt, highlighted target and the player's input buffer.
pub struct TypingArea<'a> {
    prompt: &'a str,
    category: &'a str,
    target: &'a str,
    confirmed_len: usize,
    input: &'a str,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(
        prompt: &'a str,
        category: &'a str,
        target: &'a str,
        confirmed_len: usize,
        input: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            prompt,
            category,
            target,
            confirmed_len,
            input,
            theme,
        }
    }
}

/// Split `target` into the confirmed prefix, the character under the cursor
/// and the rest.
fn split_target(target: &str, confirmed_len: usize) -> (String, Option<char>, String) {
    let mut chars = target.chars();
    let done: String = chars.by_ref().take(confirmed_len).collect();
    let cursor = chars.next();
    let rest: String = chars.collect();
    (done, cursor, rest)
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = if self.category.is_empty() {
            String::new()
        } else {
            format!(" {} ", self.category)
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(2),
                Constraint::Min(2),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            self.prompt,
            Style::default()
                .fg(colors.prompt())
                .add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: false })
        .render(layout[0], buf);

        let (done, cursor, rest) = split_target(self.target, self.confirmed_len);
        let mut spans = vec![Span::styled(done, Style::default().fg(colors.text_correct()))];
        if let Some(ch) = cursor {
            spans.push(Span::styled(
                ch.to_string(),
                Style::default()
                    .fg(colors.text_cursor_fg())
                    .bg(colors.text_cursor_bg()),
            ));
        }
        spans.push(Span::styled(rest, Style::default().fg(colors.text_pending())));
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.accent())),
            Span::styled(self.input, Style::default().fg(colors.fg())),
            Span::styled(
                "_",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ]))
        .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_target() {
        assert_eq!(
            split_target("cat", 1),
            ("c".to_string(), Some('a'), "t".to_string())
        );
        assert_eq!(
            split_target("cat", 0),
            (String::new(), Some('c'), "at".to_string())
        );
        assert_eq!(split_target("cat", 3), ("cat".to_string(), None, String::new()));
    }

    #[test]
    fn test_split_target_multibyte() {
        assert_eq!(
            split_target("ねこ", 1),
            ("ね".to_string(), Some('こ'), String::new())
        );
    }
}
