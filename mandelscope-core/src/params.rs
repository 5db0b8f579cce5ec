use crate::error::CoreError;

/// Brightest channel value a scaled iteration count can reach.
pub const COLOR_MAX_VALUE: f64 = 255.0;

/// Parameters controlling escape-time iteration.
///
/// Both fields are validated on construction and on deserialization, so a
/// value of this type never carries a zero iteration cap or a non-positive
/// radius.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EscapeParams {
    /// Maximum number of iterations before declaring a point interior.
    pub max_iterations: u32,

    /// Bailout threshold compared against `|z|²`.
    pub radius_squared: f64,
}

/// Deserialization goes through [`EscapeParams::new`] so preferences files
/// cannot smuggle in invalid values.
impl<'de> serde::Deserialize<'de> for EscapeParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            max_iterations: u32,
            radius_squared: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.max_iterations, raw.radius_squared).map_err(serde::de::Error::custom)
    }
}

impl EscapeParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
    pub const DEFAULT_RADIUS_SQUARED: f64 = 4.0;

    pub fn new(max_iterations: u32, radius_squared: f64) -> crate::Result<Self> {
        validate_max_iterations(max_iterations)?;
        if radius_squared <= 0.0 || !radius_squared.is_finite() {
            return Err(CoreError::InvalidRadiusSquared(radius_squared));
        }
        Ok(Self {
            max_iterations,
            radius_squared,
        })
    }

    /// Factor turning a raw iteration count into a `0..=255` channel value.
    #[inline]
    pub fn color_scale(&self) -> f64 {
        COLOR_MAX_VALUE / self.max_iterations as f64
    }

    /// Return a copy with a different, validated `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> crate::Result<Self> {
        validate_max_iterations(max_iterations)?;
        Ok(Self {
            max_iterations,
            ..self
        })
    }
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            radius_squared: Self::DEFAULT_RADIUS_SQUARED,
        }
    }
}

fn validate_max_iterations(max_iterations: u32) -> crate::Result<()> {
    if max_iterations < 1 {
        return Err(CoreError::InvalidMaxIterations(max_iterations));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        let p = EscapeParams::default();
        assert_eq!(p.max_iterations, 100);
        assert!((p.radius_squared - 4.0).abs() < f64::EPSILON);
        assert!((p.color_scale() - 2.55).abs() < 1e-12);
    }

    #[test]
    fn color_scale_for_fifty_iterations() {
        let p = EscapeParams::new(50, 4.0).unwrap();
        assert!((p.color_scale() - 5.1).abs() < 1e-12);
    }

    #[test]
    fn invalid_max_iterations() {
        assert_eq!(
            EscapeParams::new(0, 4.0),
            Err(CoreError::InvalidMaxIterations(0))
        );
        assert!(EscapeParams::default().with_max_iterations(0).is_err());
    }

    #[test]
    fn invalid_radius_squared() {
        assert!(EscapeParams::new(100, 0.0).is_err());
        assert!(EscapeParams::new(100, -4.0).is_err());
        assert!(EscapeParams::new(100, f64::NAN).is_err());
        assert!(EscapeParams::new(100, f64::INFINITY).is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: EscapeParams =
            serde_json::from_str(r#"{"max_iterations":250,"radius_squared":9.0}"#).unwrap();
        assert_eq!(ok.max_iterations, 250);

        let bad = serde_json::from_str::<EscapeParams>(
            r#"{"max_iterations":0,"radius_squared":4.0}"#,
        );
        assert!(bad.is_err());
    }
}
