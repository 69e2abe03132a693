use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use typequiz::session::result::{RunEnd, RunResult};

use crate::ui::theme::Theme;

/// Result screen shown after a committed run.
pub struct Dashboard<'a> {
    pub result: &'a RunResult,
    pub rank: &'a str,
    pub experience: u64,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(result: &'a RunResult, rank: &'a str, experience: u64, theme: &'a Theme) -> Self {
        Self {
            result,
            rank,
            experience,
            theme,
        }
    }
}

fn verdict(result: &RunResult) -> &'static str {
    match (result.cleared(), result.end) {
        (true, _) => "CLEAR!",
        (false, RunEnd::TimeUp) => "TIME UP",
        (false, _) => "FAILED",
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;

        let block = Block::bordered()
            .title(format!(" {} ", result.course_name))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let verdict_color = if result.cleared() {
            colors.success()
        } else {
            colors.error()
        };
        Paragraph::new(Line::from(Span::styled(
            verdict(result),
            Style::default()
                .fg(verdict_color)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let score_line = Line::from(vec![
            Span::styled("  Score:     ", Style::default().fg(colors.fg())),
            Span::styled(
                result.score.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  (clear at {})", result.clear_threshold),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let completed_line = Line::from(vec![
            Span::styled("  Completed: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} / {}", result.problems_completed, result.problems_total),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("  ({} perfect)", result.perfect_problems),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(completed_line).render(layout[2], buf);

        let accuracy = result.accuracy();
        let acc_color = if accuracy >= 95.0 {
            colors.success()
        } else if accuracy >= 85.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled("  Accuracy:  ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{accuracy:.1}%"),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} typed)", result.typed),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[3], buf);

        let miss_line = Line::from(vec![
            Span::styled("  Misses:    ", Style::default().fg(colors.fg())),
            Span::styled(
                result.misses.to_string(),
                Style::default().fg(if result.misses == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]);
        Paragraph::new(miss_line).render(layout[4], buf);

        let rank_line = Line::from(vec![
            Span::styled("  Rank:      ", Style::default().fg(colors.fg())),
            Span::styled(
                self.rank,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} exp)", self.experience),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(rank_line).render(layout[5], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [Enter] Home  [q] Quit",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[7], buf);
    }
}
