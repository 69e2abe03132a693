use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Bordered one-line gauge, used for monster HP and remaining time.
pub struct ProgressBar<'a> {
    pub title: String,
    pub caption: String,
    pub ratio: f64,
    pub fill: Color,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(title: &str, ratio: f64, fill: Color, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            caption: format!("{:.0}%", ratio.clamp(0.0, 1.0) * 100.0),
            ratio: ratio.clamp(0.0, 1.0),
            fill,
            theme,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(self.fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let caption_len = self.caption.chars().count() as u16;
        let caption_x = inner.x + inner.width.saturating_sub(caption_len) / 2;
        buf.set_stringn(
            caption_x,
            inner.y,
            &self.caption,
            inner.width as usize,
            Style::default().fg(colors.fg()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_clamped() {
        let theme = Theme::default();
        let bar = ProgressBar::new("HP", 1.7, Color::Red, &theme);
        assert_eq!(bar.ratio, 1.0);
        assert_eq!(bar.caption, "100%");
        let bar = ProgressBar::new("HP", -0.2, Color::Red, &theme).caption("0 / 30");
        assert_eq!(bar.ratio, 0.0);
        assert_eq!(bar.caption, "0 / 30");
    }
}
