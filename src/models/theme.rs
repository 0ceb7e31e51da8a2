// ============================================================================
// Enum : Theme
// ============================================================================
// Préférence clair / sombre, persistée sous la clé "theme-preference"
// La palette ratatui de chaque thème est définie ici pour que l'UI
// n'ait qu'à demander `app.theme.palette()`.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

/// Thème de l'interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

/// Couleurs utilisées par les écrans
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
}

impl Theme {
    /// Valeur stockée
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Bascule clair ↔ sombre
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Color::Reset,
                text: Color::White,
                muted: Color::Gray,
                border: Color::Cyan,
                accent: Color::Blue,
                positive: Color::Green,
                negative: Color::Red,
                warning: Color::Yellow,
            },
            Theme::Light => Palette {
                background: Color::White,
                text: Color::Black,
                muted: Color::DarkGray,
                border: Color::Blue,
                accent: Color::Blue,
                positive: Color::Rgb(0, 128, 0),
                negative: Color::Rgb(178, 34, 34),
                warning: Color::Rgb(184, 134, 11),
            },
        }
    }
}

impl Default for Theme {
    /// Un terminal est le plus souvent sombre
    fn default() -> Self {
        Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    /// Seules les valeurs exactes "light" et "dark" sont acceptées
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("Thème inconnu : {}", other),
        }
    }
}
