use mandelscope_core::{ColorTheme, ViewportModel, COLOR_MAX_VALUE};
use rayon::prelude::*;

use crate::buffer::RgbBuffer;
use crate::grid::EscapeGrid;

/// Scale a raw escape time into a `0..=255` channel value.
#[inline]
pub fn scaled_value(iterations: u32, color_scale: f64) -> u8 {
    (iterations as f64 * color_scale)
        .round()
        .clamp(0.0, COLOR_MAX_VALUE) as u8
}

/// Color of one pixel.
///
/// Interior pixels are special-cased per theme; everything else is linear in
/// `scaled`:
///
/// - `BlackWhite`: interior white, exterior black.
/// - `GreyScale`: interior black, exterior `(v, v, v)`.
/// - single hues: interior black, exterior `v` on the theme's lit channels.
pub fn color_for(theme: ColorTheme, scaled: u8, is_interior: bool) -> [u8; 3] {
    match theme {
        ColorTheme::BlackWhite => {
            if is_interior {
                [255, 255, 255]
            } else {
                [0, 0, 0]
            }
        }
        _ if is_interior => [0, 0, 0],
        ColorTheme::GreyScale => [scaled, scaled, scaled],
        hue => hue.base_rgb().map(|channel| if channel == 0 { 0 } else { scaled }),
    }
}

/// Maps escape times of one viewport to colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMapper {
    theme: ColorTheme,
    color_scale: f64,
    max_iterations: u32,
}

impl ColorMapper {
    pub fn new(theme: ColorTheme, max_iterations: u32) -> Self {
        Self {
            theme,
            color_scale: COLOR_MAX_VALUE / max_iterations.max(1) as f64,
            max_iterations,
        }
    }

    pub fn for_viewport(viewport: &ViewportModel) -> Self {
        Self {
            theme: viewport.color_theme(),
            color_scale: viewport.color_scale(),
            max_iterations: viewport.max_iterations(),
        }
    }

    pub fn theme(&self) -> ColorTheme {
        self.theme
    }

    #[inline]
    pub fn color(&self, iterations: u32) -> [u8; 3] {
        color_for(
            self.theme,
            scaled_value(iterations, self.color_scale),
            iterations >= self.max_iterations,
        )
    }

    /// Colorize an entire grid into an RGB buffer.
    pub fn colorize(&self, grid: &EscapeGrid) -> RgbBuffer {
        let mut pixels = vec![0u8; grid.cells().len() * 3];
        pixels
            .par_chunks_mut(3)
            .zip(grid.cells().par_iter())
            .for_each(|(pixel, &iterations)| {
                pixel.copy_from_slice(&self.color(iterations));
            });
        RgbBuffer {
            width: grid.width(),
            height: grid.height(),
            pixels,
        }
    }
}
