use crate::complex::Complex;
use crate::params::EscapeParams;

/// The Mandelbrot iteration `z_{n+1} = z_n² + c`, starting from `z₀ = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mandelbrot {
    params: EscapeParams,
}

impl Mandelbrot {
    pub fn new(params: EscapeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EscapeParams {
        &self.params
    }

    /// Escape time of `c`: the index `n` of the first `z_n` whose `|z_n|²`
    /// exceeds the threshold, or `max_iterations` if none up to
    /// `z_max_iterations` does.
    ///
    /// The result always lies in `0..=max_iterations`.
    pub fn escape_time(&self, c: Complex) -> u32 {
        let max_iter = self.params.max_iterations;
        let radius_sq = self.params.radius_squared;

        // Orbits of points in M stay within |z| <= 2, so the closed-form
        // checks only agree with iteration when the threshold is at least 4.
        if radius_sq >= 4.0 && (in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im)) {
            return max_iter;
        }

        let mut z = Complex::ZERO;
        for n in 1..=max_iter {
            z = z.square() + c;
            if z.norm_sq() > radius_sq {
                return n;
            }
        }
        max_iter
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new(EscapeParams::default())
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}
