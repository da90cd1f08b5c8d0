//! Theme colors for the TUI
//! Built-in palette, optionally overridden from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Active borders, highlights
    pub danger: Color,           // Errors
    pub success: Color,          // Save action
    pub warning: Color,          // Status messages
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, placeholders
    pub bg_selected: Color,      // Selected row background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Table headers, field labels
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Defaults with any valid config overrides applied. Invalid colors are
    /// logged and ignored.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            ("accent", &config.accent, &mut theme.accent),
            ("danger", &config.danger, &mut theme.danger),
            ("success", &config.success, &mut theme.success),
            ("warning", &config.warning, &mut theme.warning),
            ("text", &config.text, &mut theme.text),
            ("text_dim", &config.text_dim, &mut theme.text_dim),
            ("bg_selected", &config.bg_selected, &mut theme.bg_selected),
            ("inactive", &config.inactive, &mut theme.inactive),
            ("header", &config.header, &mut theme.header),
        ];

        for (name, value, slot) in overrides {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring invalid theme color {} = {:?}", name, value),
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
