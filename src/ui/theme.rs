use std::fs;
use std::path::Path;

use log::warn;
use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME: &str = "terminal-default";

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_correct: String,
    pub text_pending: String,
    pub text_cursor_bg: String,
    pub text_cursor_fg: String,
    pub prompt: String,
    pub accent: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_empty: String,
    pub hp_bar: String,
    pub time_bar: String,
    pub locked: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// Look the theme up in the user's theme dir first, then in the bundled
    /// set.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("typequiz").join("themes").join(&filename);
            if let Some(theme) = Self::load_file(&user_path) {
                return Some(theme);
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        Self::parse(content)
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let theme = Self::parse(&content);
        if theme.is_none() {
            warn!("Ignoring malformed theme {}", path.display());
        }
        theme
    }

    fn parse(content: &str) -> Option<Self> {
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(DEFAULT_THEME).unwrap_or_else(|| Self {
            name: DEFAULT_THEME.to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1c1c1c".to_string(),
            fg: "#d0d0d0".to_string(),
            text_correct: "#87d787".to_string(),
            text_pending: "#767676".to_string(),
            text_cursor_bg: "#d0d0d0".to_string(),
            text_cursor_fg: "#1c1c1c".to_string(),
            prompt: "#87afd7".to_string(),
            accent: "#ffaf5f".to_string(),
            border: "#4e4e4e".to_string(),
            header_bg: "#303030".to_string(),
            header_fg: "#d0d0d0".to_string(),
            bar_empty: "#303030".to_string(),
            hp_bar: "#d75f5f".to_string(),
            time_bar: "#5fafd7".to_string(),
            locked: "#4e4e4e".to_string(),
            error: "#ff5f5f".to_string(),
            warning: "#ffd75f".to_string(),
            success: "#87d787".to_string(),
        }
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

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_correct(&self) -> Color { Self::parse_color(&self.text_correct) }
    pub fn text_pending(&self) -> Color { Self::parse_color(&self.text_pending) }
    pub fn text_cursor_bg(&self) -> Color { Self::parse_color(&self.text_cursor_bg) }
    pub fn text_cursor_fg(&self) -> Color { Self::parse_color(&self.text_cursor_fg) }
    pub fn prompt(&self) -> Color { Self::parse_color(&self.prompt) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn hp_bar(&self) -> Color { Self::parse_color(&self.hp_bar) }
    pub fn time_bar(&self) -> Color { Self::parse_color(&self.time_bar) }
    pub fn locked(&self) -> Color { Self::parse_color(&self.locked) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("#fff"), Color::White);
        assert_eq!(ThemeColors::parse_color("#gggggg"), Color::White);
    }

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&DEFAULT_THEME.to_string()));
        for name in names {
            let theme = Theme::load(&name).unwrap();
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_partial_theme_fills_defaults() {
        let theme = Theme::parse("name = \"mono\"\n[colors]\nfg = \"#ffffff\"\n").unwrap();
        assert_eq!(theme.colors.fg(), Color::Rgb(255, 255, 255));
        assert_eq!(theme.colors.hp_bar, ThemeColors::default().hp_bar);
    }

    #[test]
    fn test_unknown_theme() {
        assert!(Theme::load("no-such-theme").is_none());
    }
}
