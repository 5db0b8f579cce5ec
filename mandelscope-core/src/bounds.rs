use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// A rectangle of the complex plane mapped onto the pixel grid.
///
/// Pixel `(0, 0)` maps to `(min_re, min_im)`; increasing pixel-x moves
/// towards `max_re` and increasing pixel-y towards `max_im`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_re: f64,
    pub max_re: f64,
    pub min_im: f64,
    pub max_im: f64,
}

impl Bounds {
    /// The view a fresh session starts from. Magnification is measured
    /// against the area of this rectangle.
    pub const INITIAL: Self = Self {
        min_re: -2.0,
        max_re: 1.0,
        min_im: -1.5,
        max_im: 1.5,
    };

    /// Create bounds, rejecting non-finite or non-increasing edges.
    pub fn new(min_re: f64, max_re: f64, min_im: f64, max_im: f64) -> crate::Result<Self> {
        let bounds = Self {
            min_re,
            max_re,
            min_im,
            max_im,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let edges = [self.min_re, self.max_re, self.min_im, self.max_im];
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(CoreError::InvalidBounds {
                reason: format!("edges must be finite, got {self}"),
            });
        }
        if self.max_re <= self.min_re {
            return Err(CoreError::InvalidBounds {
                reason: format!("max_re {} must exceed min_re {}", self.max_re, self.min_re),
            });
        }
        if self.max_im <= self.min_im {
            return Err(CoreError::InvalidBounds {
                reason: format!("max_im {} must exceed min_im {}", self.max_im, self.min_im),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn real_span(&self) -> f64 {
        self.max_re - self.min_re
    }

    #[inline]
    pub fn imag_span(&self) -> f64 {
        self.max_im - self.min_im
    }

    pub fn area(&self) -> f64 {
        self.real_span() * self.imag_span()
    }

    /// Ratio of the initial view's area to this one's.
    pub fn magnification(&self) -> f64 {
        Self::INITIAL.area() / self.area()
    }

    /// Complex-plane units per pixel along each axis for a square grid of
    /// side `resolution`.
    #[inline]
    pub fn pixel_scale(&self, resolution: u32) -> (f64, f64) {
        let side = resolution as f64;
        (self.real_span() / side, self.imag_span() / side)
    }

    /// Map a (possibly fractional) pixel coordinate to the complex plane by
    /// linear interpolation over a `width × height` grid.
    #[inline]
    pub fn pixel_to_complex(&self, x: f64, y: f64, width: u32, height: u32) -> Complex {
        Complex::new(
            self.min_re + x * self.real_span() / width as f64,
            self.min_im + y * self.imag_span() / height as f64,
        )
    }

    /// Shift every edge by the same offset; the spans are untouched.
    pub fn translated(&self, d_re: f64, d_im: f64) -> Self {
        Self {
            min_re: self.min_re + d_re,
            max_re: self.max_re + d_re,
            min_im: self.min_im + d_im,
            max_im: self.max_im + d_im,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] × [{}, {}]i",
            self.min_re, self.max_re, self.min_im, self.max_im
        )
    }
}
