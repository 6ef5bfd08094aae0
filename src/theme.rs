//! Theme colors for the UI, with overrides from the `[colors]` config table

use ratatui::style::Color;

use crate::config::ColorOverrides;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active cell border, key hints
    pub danger: Color,      // Rejection, lockout
    pub success: Color,     // Accepted code
    pub warning: Color,     // Status messages, pending verification
    pub text: Color,        // Primary text (entered digits)
    pub text_dim: Color,    // Placeholders, hints
    pub bg_selected: Color, // Focused cell background
    pub inactive: Color,    // Idle cell borders
    pub header: Color,      // Prompt title
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback palette
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(245, 194, 231),
        }
    }
}

impl Theme {
    /// Build the theme, applying any hex overrides from the config
    pub fn load(overrides: Option<&ColorOverrides>) -> Self {
        let mut theme = Self::default();
        if let Some(colors) = overrides {
            theme.apply(colors);
        }
        theme
    }

    fn apply(&mut self, colors: &ColorOverrides) {
        let slots: [(&Option<String>, &mut Color); 9] = [
            (&colors.accent, &mut self.accent),
            (&colors.danger, &mut self.danger),
            (&colors.success, &mut self.success),
            (&colors.warning, &mut self.warning),
            (&colors.text, &mut self.text),
            (&colors.text_dim, &mut self.text_dim),
            (&colors.bg_selected, &mut self.bg_selected),
            (&colors.inactive, &mut self.inactive),
            (&colors.header, &mut self.header),
        ];

        for (value, slot) in slots {
            if let Some(s) = value {
                match Self::parse_hex_color(s) {
                    Some(color) => *slot = color,
                    // Bad values keep the default rather than failing startup
                    None => tracing::warn!("Ignoring invalid color '{}' in config", s),
                }
            }
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

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
