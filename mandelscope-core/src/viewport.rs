use crate::bounds::Bounds;
use crate::error::CoreError;
use crate::params::EscapeParams;
use crate::theme::ColorTheme;

/// The mutable state of one exploration session.
///
/// Magnification and color scale are derived: the former is refreshed on
/// every bounds change, the latter is computed from `max_iterations` on
/// demand, so neither can drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportModel {
    bounds: Bounds,
    params: EscapeParams,
    color_theme: ColorTheme,
    magnification: f64,
}

impl ViewportModel {
    pub fn new(params: EscapeParams, color_theme: ColorTheme) -> Self {
        Self {
            bounds: Bounds::INITIAL,
            params,
            color_theme,
            magnification: 1.0,
        }
    }

    /// Rebuild a model from stored values, checking every invariant.
    ///
    /// Magnification is taken as given rather than recomputed.
    pub fn restore(
        bounds: Bounds,
        params: EscapeParams,
        color_theme: ColorTheme,
        magnification: f64,
    ) -> crate::Result<Self> {
        bounds.validate()?;
        let params = EscapeParams::new(params.max_iterations, params.radius_squared)?;
        if !magnification.is_finite() || magnification <= 0.0 {
            return Err(CoreError::InvalidMagnification(magnification));
        }
        Ok(Self {
            bounds,
            params,
            color_theme,
            magnification,
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn params(&self) -> EscapeParams {
        self.params
    }

    pub fn max_iterations(&self) -> u32 {
        self.params.max_iterations
    }

    pub fn radius_squared(&self) -> f64 {
        self.params.radius_squared
    }

    pub fn color_theme(&self) -> ColorTheme {
        self.color_theme
    }

    pub fn magnification(&self) -> f64 {
        self.magnification
    }

    pub fn color_scale(&self) -> f64 {
        self.params.color_scale()
    }

    /// Move to new bounds and refresh the magnification against the
    /// initial view.
    pub fn set_bounds(&mut self, bounds: Bounds) -> crate::Result<()> {
        bounds.validate()?;
        self.bounds = bounds;
        self.magnification = bounds.magnification();
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) -> crate::Result<()> {
        self.params = self.params.with_max_iterations(max_iterations)?;
        Ok(())
    }

    pub fn set_color_theme(&mut self, theme: ColorTheme) {
        self.color_theme = theme;
    }

    /// Text for the magnification overlay.
    pub fn magnification_label(&self) -> String {
        format!("Current magnification: {}x", self.magnification)
    }
}

impl Default for ViewportModel {
    fn default() -> Self {
        Self::new(EscapeParams::default(), ColorTheme::default())
    }
}
