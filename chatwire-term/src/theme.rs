//! Light/dark palettes for the terminal view.

use chatwire_client::Color as IdentityColor;
use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette {
                text: Color::Rgb { r: 220, g: 220, b: 220 },
                system: Color::Rgb { r: 140, g: 140, b: 150 },
                own: Color::Rgb { r: 130, g: 200, b: 255 },
                status: Color::Rgb { r: 250, g: 200, b: 90 },
            },
            Self::Light => Palette {
                text: Color::Rgb { r: 30, g: 30, b: 30 },
                system: Color::Rgb { r: 110, g: 110, b: 120 },
                own: Color::Rgb { r: 20, g: 90, b: 180 },
                status: Color::Rgb { r: 160, g: 100, b: 0 },
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Foreground colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub system: Color,
    pub own: Color,
    pub status: Color,
}

/// Terminal color for an identity's HSL color.
pub fn identity_color(color: IdentityColor) -> Color {
    let (r, g, b) = color.to_rgb();
    Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_serialized_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            theme: Theme,
        }
        let parsed: Wrapper = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(parsed.theme, Theme::Light);
        let text = toml::to_string(&Wrapper { theme: Theme::Dark }).unwrap();
        assert!(text.contains("\"dark\""));
    }

    #[test]
    fn test_identity_color_matches_rgb() {
        let color = IdentityColor::from_hue(0);
        assert_eq!(identity_color(color), Color::Rgb { r: 209, g: 71, b: 71 });
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
    }
}
