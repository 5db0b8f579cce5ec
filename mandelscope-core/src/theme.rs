use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The fixed set of color themes a session can be rendered with.
///
/// The camelCase identifiers double as the on-disk spelling in session files
/// and preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorTheme {
    /// Binary membership: interior white, everything else black.
    BlackWhite,
    /// Gray intensity proportional to escape time.
    #[default]
    GreyScale,
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

impl ColorTheme {
    /// All themes in cycling order.
    pub const ALL: [ColorTheme; 8] = [
        Self::BlackWhite,
        Self::GreyScale,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Cyan,
        Self::Magenta,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            Self::BlackWhite => "blackWhite",
            Self::GreyScale => "greyScale",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
        }
    }

    /// Base color of the theme. Single-hue themes light exactly the
    /// channels that are non-zero here.
    pub fn base_rgb(self) -> [u8; 3] {
        match self {
            Self::BlackWhite => [255, 255, 255],
            Self::GreyScale => [0, 0, 0],
            Self::Red => [255, 0, 0],
            Self::Green => [0, 255, 0],
            Self::Blue => [0, 0, 255],
            Self::Yellow => [255, 255, 0],
            Self::Cyan => [0, 255, 255],
            Self::Magenta => [255, 0, 255],
        }
    }

    /// The theme after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ColorTheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.identifier() == s)
            .ok_or_else(|| CoreError::UnknownTheme(s.to_string()))
    }
}
