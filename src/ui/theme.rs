use ratatui::style::Color;

/// The built-in palette. Colours are fixed; there is no theme file.
#[derive(Clone, Debug)]
pub struct Theme {
    pub colors: ThemeColors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColors {
    pub bg: &'static str,
    pub fg: &'static str,
    pub text_correct: &'static str,
    pub text_incorrect: &'static str,
    pub text_incorrect_bg: &'static str,
    pub text_pending: &'static str,
    pub text_cursor_bg: &'static str,
    pub text_cursor_fg: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
    pub bar_filled: &'static str,
    pub bar_empty: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub success: &'static str,
}

const DEFAULT_COLORS: ThemeColors = ThemeColors {
    bg: "#1e1e2e",
    fg: "#cdd6f4",
    text_correct: "#a6e3a1",
    text_incorrect: "#f38ba8",
    text_incorrect_bg: "#45273a",
    text_pending: "#585b70",
    text_cursor_bg: "#f5e0dc",
    text_cursor_fg: "#1e1e2e",
    accent: "#89b4fa",
    border: "#45475a",
    bar_filled: "#89b4fa",
    bar_empty: "#313244",
    error: "#f38ba8",
    warning: "#f9e2af",
    success: "#a6e3a1",
};

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ThemeColors::default(),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        DEFAULT_COLORS
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(self.fg) }
    pub fn text_correct(&self) -> Color { Self::parse_color(self.text_correct) }
    pub fn text_incorrect(&self) -> Color { Self::parse_color(self.text_incorrect) }
    pub fn text_incorrect_bg(&self) -> Color { Self::parse_color(self.text_incorrect_bg) }
    pub fn text_pending(&self) -> Color { Self::parse_color(self.text_pending) }
    pub fn text_cursor_bg(&self) -> Color { Self::parse_color(self.text_cursor_bg) }
    pub fn text_cursor_fg(&self) -> Color { Self::parse_color(self.text_cursor_fg) }
    pub fn accent(&self) -> Color { Self::parse_color(self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(self.border) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(self.bar_empty) }
    pub fn error(&self) -> Color { Self::parse_color(self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(self.success) }
}
