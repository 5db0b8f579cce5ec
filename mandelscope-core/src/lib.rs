pub mod bounds;
pub mod command;
pub mod complex;
pub mod error;
pub mod history;
pub mod mandelbrot;
pub mod params;
pub mod theme;
pub mod transform;
pub mod viewport;

// Re-export primary types for convenience.
pub use bounds::Bounds;
pub use command::Command;
pub use complex::Complex;
pub use error::CoreError;
pub use history::CommandHistory;
pub use mandelbrot::Mandelbrot;
pub use params::{EscapeParams, COLOR_MAX_VALUE};
pub use theme::ColorTheme;
pub use transform::{pan_bounds, zoom_bounds, zoom_selection, GestureMode, PixelPoint, Selection};
pub use viewport::ViewportModel;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
