use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use topicdeck::session::{DeckView, StatusKind};

use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    view: &'a DeckView,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(view: &'a DeckView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(inner);

        // Vertically center the question text
        let text_width = layout[0].width.max(1) as usize;
        let text_lines = self.view.question.chars().count().div_ceil(text_width).max(1) as u16;
        let pad = layout[0].height.saturating_sub(text_lines) / 2;
        let question_area = Rect {
            y: layout[0].y + pad,
            height: layout[0].height - pad,
            ..layout[0]
        };

        Paragraph::new(Line::from(Span::styled(
            self.view.question.as_str(),
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(question_area, buf);

        if let Some(ref status) = self.view.status {
            let color = match status.kind {
                StatusKind::Info => colors.warning(),
                StatusKind::Success => colors.success(),
                StatusKind::Error => colors.error(),
            };
            Paragraph::new(Line::from(Span::styled(
                status.message.as_str(),
                Style::default().fg(color),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[1], buf);
        }
    }
}
