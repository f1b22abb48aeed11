use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use topicdeck::session::TagPicker;

use crate::ui::theme::Theme;

pub struct TagList<'a> {
    picker: &'a TagPicker,
    theme: &'a Theme,
}

impl<'a> TagList<'a> {
    pub fn new(picker: &'a TagPicker, theme: &'a Theme) -> Self {
        Self { picker, theme }
    }
}

impl Widget for TagList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Topics ")
            .title_top(Line::from(format!(" {} ", self.picker.badge())).right_aligned())
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.picker.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No tags found. Check the question source.",
                Style::default().fg(colors.warning()),
            )))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            " Draw questions tagged with any of:",
            Style::default().fg(colors.muted()),
        )))
        .render(layout[0], buf);

        // Keep the cursor row visible when the list is taller than the area
        let visible = layout[1].height as usize;
        let offset = if visible == 0 {
            0
        } else {
            self.picker.cursor.saturating_sub(visible - 1)
        };

        let lines: Vec<Line> = self
            .picker
            .universe
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, tag)| {
                let is_cursor = i == self.picker.cursor;
                let is_checked = self.picker.is_selected(tag);
                let indicator = if is_cursor { ">" } else { " " };
                let mark = if is_checked { "[x]" } else { "[ ]" };

                let mark_style = Style::default().fg(if is_checked {
                    colors.checked()
                } else {
                    colors.muted()
                });
                let label_style = Style::default()
                    .fg(if is_cursor { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_cursor {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });

                Line::from(vec![
                    Span::styled(format!(" {indicator} "), label_style),
                    Span::styled(mark, mark_style),
                    Span::styled(format!(" {tag}"), label_style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(layout[1], buf);
    }
}
