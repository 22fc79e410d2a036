use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Successful quotes towards the next level.
pub struct LevelProgressBar<'a> {
    level: u32,
    done: u32,
    required: u32,
    theme: &'a Theme,
}

impl<'a> LevelProgressBar<'a> {
    pub fn new(level: u32, done: u32, required: u32, theme: &'a Theme) -> Self {
        Self {
            level,
            done,
            required,
            theme,
        }
    }

    fn ratio(&self) -> f64 {
        if self.required == 0 {
            return 1.0;
        }
        (self.done as f64 / self.required as f64).clamp(0.0, 1.0)
    }

    fn label(&self) -> String {
        format!("{}/{} quotes", self.done, self.required)
    }
}

impl Widget for LevelProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Level {} ", self.level))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let label = self.label();

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}
