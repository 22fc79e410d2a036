use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::input::TypingSession;
use crate::session::tokenizer::{CharState, Word};
use crate::ui::theme::Theme;

pub struct TypingArea<'a> {
    session: &'a TypingSession,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a TypingSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

/// Flatten words into display cells, with a separator cell between words.
/// Separators are `None`; they carry no state of their own.
fn render_cells(words: &[Word]) -> Vec<(char, Option<CharState>)> {
    let mut cells = Vec::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            cells.push((' ', None));
        }
        cells.extend(word.characters.iter().map(|c| (c.ch, Some(c.state))));
    }
    cells
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let spans: Vec<Span> = render_cells(self.session.words())
            .into_iter()
            .map(|(ch, state)| {
                let style = match state {
                    Some(CharState::Correct) => Style::default().fg(colors.text_correct()),
                    Some(CharState::Incorrect) => Style::default()
                        .fg(colors.text_incorrect())
                        .bg(colors.text_incorrect_bg())
                        .add_modifier(Modifier::UNDERLINED),
                    Some(CharState::Current) => Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg()),
                    Some(CharState::Inactive) | None => {
                        Style::default().fg(colors.text_pending())
                    }
                };
                Span::styled(ch.to_string(), style)
            })
            .collect();

        let mut title = String::from(" Type ");
        if self.session.death_mode() {
            title.push_str("[death] ");
        }
        if self.session.repeat_mode() {
            title.push_str("[repeat] ");
        }

        let border = if self.session.is_finished() {
            colors.success()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
