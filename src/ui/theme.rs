//! # Theme System
//!
//! Color themes for the monitor console.
//!
//! Rendering code never hardcodes a `ratatui::style::Color`; it reads the
//! semantic fields of the active [`Theme`]. The theme is chosen with
//! `--theme` or the `theme` key of the config file.
//!
//! ## Built-in Themes
//!
//! - **Catppuccin Mocha** (default)
//! - **Nord**
//! - **Solarized Dark**

use ratatui::style::Color;

/// Colors used by the console, grouped by semantic role.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,

    /// Background for panels and modals.
    pub bg: Color,
    /// Field labels, grid cells.
    pub fg: Color,
    /// Hints, footer, hidden columns in the column menu.
    pub fg_dim: Color,

    /// Focused borders and the sidebar cursor.
    pub accent: Color,
    /// Selected values and the page indicator.
    pub secondary: Color,

    pub success: Color,
    /// Validation failures and network errors.
    pub error: Color,

    /// Background of the highlighted grid row.
    pub selection_bg: Color,
}

impl Theme {
    /// All built-in themes in display order.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }

    /// Resolve a configured name, falling back to the default theme.
    pub fn resolve(name: &str) -> &'static Theme {
        Self::by_name(name).unwrap_or_else(|| {
            tracing::warn!(theme = name, "unknown theme, using default");
            Self::default_theme()
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in theme definitions
// ---------------------------------------------------------------------------

static BUILT_IN_THEMES: [Theme; 3] = [
    // 0 - Catppuccin Mocha (default)
    Theme {
        name: "Catppuccin Mocha",
        bg: Color::Rgb(30, 30, 46),           // base
        fg: Color::Rgb(205, 214, 244),        // text
        fg_dim: Color::Rgb(108, 112, 134),    // overlay0
        accent: Color::Rgb(137, 180, 250),    // blue
        secondary: Color::Rgb(249, 226, 175), // yellow
        success: Color::Rgb(166, 227, 161),   // green
        error: Color::Rgb(243, 139, 168),     // red
        selection_bg: Color::Rgb(69, 71, 90), // surface1
    },
    // 1 - Nord
    Theme {
        name: "Nord",
        bg: Color::Rgb(46, 52, 64),
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208),    // frost
        secondary: Color::Rgb(235, 203, 139), // yellow
        success: Color::Rgb(163, 190, 140),
        error: Color::Rgb(191, 97, 106),
        selection_bg: Color::Rgb(67, 76, 94),
    },
    // 2 - Solarized Dark
    Theme {
        name: "Solarized Dark",
        bg: Color::Rgb(0, 43, 54),
        fg: Color::Rgb(131, 148, 150),
        fg_dim: Color::Rgb(88, 110, 117),
        accent: Color::Rgb(38, 139, 210),   // blue
        secondary: Color::Rgb(181, 137, 0), // yellow
        success: Color::Rgb(133, 153, 0),
        error: Color::Rgb(220, 50, 47),
        selection_bg: Color::Rgb(7, 54, 66),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_themes_count() {
        assert_eq!(Theme::all().len(), 3);
    }

    #[test]
    fn test_default_is_mocha() {
        assert_eq!(Theme::default_theme().name, "Catppuccin Mocha");
    }

    #[test]
    fn test_by_name_case_insensitive() {
        assert!(Theme::by_name("catppuccin mocha").is_some());
        assert!(Theme::by_name("SOLARIZED DARK").is_some());
        assert!(Theme::by_name("dracula").is_none());
        assert!(Theme::by_name("nonexistent").is_none());
    }

    #[test]
    fn test_resolve_unknown_falls_back() {
        assert_eq!(Theme::resolve("nonexistent"), Theme::default_theme());
        assert_eq!(Theme::resolve("nord").name, "Nord");
    }

    #[test]
    fn test_all_themes_have_distinct_names() {
        let names: Vec<&str> = Theme::all().iter().map(|t| t.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "duplicate theme names found");
    }
}
