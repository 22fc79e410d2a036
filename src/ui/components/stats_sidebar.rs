use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::levels::GameLevel;
use crate::engine::progression::{ProgressUpdate, UserProgress};
use crate::session::stats::TypingStats;
use crate::ui::theme::Theme;

pub struct StatsSidebar<'a> {
    pub stats: &'a TypingStats,
    pub progress: &'a UserProgress,
    pub params: GameLevel,
    pub wpm_threshold: Option<f64>,
    pub attempts_remaining: u32,
    pub failures: u32,
    pub last_update: Option<&'a ProgressUpdate>,
    pub theme: &'a Theme,
}

impl StatsSidebar<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.fg());
        let value = Style::default().fg(colors.accent());
        let row = |name: &str, v: String| {
            Line::from(vec![
                Span::styled(format!("{name:<12}"), label),
                Span::styled(v, value),
            ])
        };

        let target = match self.wpm_threshold {
            Some(t) => format!("{t:.0}"),
            None => "-".to_string(),
        };
        let baseline = match self.progress.baseline_wpm {
            Some(b) => format!("{b:.0}"),
            None => "-".to_string(),
        };

        let mut lines = vec![
            row("WPM", format!("{:.0}", self.stats.wpm)),
            row("Accuracy", format!("{:.0}%", self.stats.accuracy)),
            row("Correct", self.stats.correct_chars.to_string()),
            row("Errors", self.stats.incorrect_chars.to_string()),
            row("Time", format!("{:.1}s", self.stats.elapsed_secs)),
            Line::default(),
            row("Baseline", baseline),
            row("Target WPM", target),
            row("Target acc", format!("{:.0}%", self.params.accuracy_threshold)),
            row("Attempts", self.attempts_remaining.to_string()),
            row("Deaths", self.failures.to_string()),
        ];

        if let Some(update) = self.last_update {
            let (text, color) = if update.successful {
                ("passed", colors.success())
            } else {
                ("not yet", colors.warning())
            };
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::styled(format!("{:<12}", "Last quote"), label),
                Span::styled(text, Style::default().fg(color)),
            ]));
        }
        lines
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Stats ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(self.lines()).block(block).render(area, buf);
    }
}
