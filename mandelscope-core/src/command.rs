use crate::bounds::Bounds;
use crate::theme::ColorTheme;

/// One reversible user action.
///
/// Every variant carries copies of the values on both sides of the
/// transition, so later changes to the live model cannot alter an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Pan { old: Bounds, new: Bounds },
    Zoom { old: Bounds, new: Bounds },
    ColorChange { old: ColorTheme, new: ColorTheme },
    IterationChange { old: u32, new: u32 },
    /// Show or hide the magnification overlay. Self-inverse.
    ToggleOverlay,
}

impl Command {
    /// The command that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Pan { old, new } => Self::Pan { old: new, new: old },
            Self::Zoom { old, new } => Self::Zoom { old: new, new: old },
            Self::ColorChange { old, new } => Self::ColorChange { old: new, new: old },
            Self::IterationChange { old, new } => Self::IterationChange { old: new, new: old },
            Self::ToggleOverlay => Self::ToggleOverlay,
        }
    }

    /// Whether applying this command invalidates the escape grid.
    /// Theme and overlay changes only affect how the grid is painted.
    pub fn affects_grid(self) -> bool {
        matches!(
            self,
            Self::Pan { .. } | Self::Zoom { .. } | Self::IterationChange { .. }
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pan { .. } => "Pan",
            Self::Zoom { .. } => "Zoom",
            Self::ColorChange { .. } => "Color",
            Self::IterationChange { .. } => "Iterations",
            Self::ToggleOverlay => "ToggleOverlay",
        }
    }
}
