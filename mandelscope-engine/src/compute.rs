use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use mandelscope_core::{Bounds, CoreError, EscapeParams, Mandelbrot};

use crate::grid::EscapeGrid;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Tracks the current computation generation for cancellation and progress.
///
/// Advancing the generation tells every in-flight computation started under
/// an older generation to stop at its next row boundary.
#[derive(Debug)]
pub struct ComputeCancel {
    generation: AtomicU64,
    rows_done: AtomicUsize,
    rows_total: AtomicUsize,
}

impl ComputeCancel {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            rows_done: AtomicUsize::new(0),
            rows_total: AtomicUsize::new(0),
        }
    }

    /// Cancel whatever is running and return the new generation.
    pub fn cancel(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn reset_progress(&self, total: usize) {
        self.rows_total.store(total, Ordering::Relaxed);
        self.rows_done.store(0, Ordering::Relaxed);
    }

    fn inc_progress(&self) {
        self.rows_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Rows finished so far as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.rows_done.load(Ordering::Relaxed),
            self.rows_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for ComputeCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Grid computation
// ---------------------------------------------------------------------------

fn check_inputs(width: u32, height: u32, bounds: &Bounds, params: &EscapeParams) -> crate::Result<()> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height }.into());
    }
    bounds.validate()?;
    EscapeParams::new(params.max_iterations, params.radius_squared)?;
    Ok(())
}

#[inline]
fn fill_row(mandelbrot: &Mandelbrot, bounds: &Bounds, width: u32, height: u32, y: usize, row: &mut [u32]) {
    for (x, cell) in row.iter_mut().enumerate() {
        let c = bounds.pixel_to_complex(x as f64, y as f64, width, height);
        *cell = mandelbrot.escape_time(c);
    }
}

/// Compute the escape-time grid of `bounds` at `width × height` pixels.
///
/// Pure and deterministic: identical inputs always give an identical grid.
/// Rows are computed in parallel via Rayon; each cell only depends on its
/// own coordinate, so the split does not affect the result.
pub fn compute(
    width: u32,
    height: u32,
    bounds: &Bounds,
    params: &EscapeParams,
) -> crate::Result<EscapeGrid> {
    check_inputs(width, height, bounds, params)?;
    let start = Instant::now();
    let mandelbrot = Mandelbrot::new(*params);

    let mut data = vec![0u32; width as usize * height as usize];
    data.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| fill_row(&mandelbrot, bounds, width, height, y, row));

    debug!(
        width,
        height,
        max_iter = params.max_iterations,
        elapsed_ms = start.elapsed().as_millis(),
        "Grid computed"
    );
    Ok(EscapeGrid::from_computed(
        width,
        height,
        params.max_iterations,
        data,
    ))
}

/// Like [`compute`], but gives up as soon as `cancel` moves past
/// `generation`. Returns `Ok(None)` when cancelled.
pub fn compute_cancellable(
    width: u32,
    height: u32,
    bounds: &Bounds,
    params: &EscapeParams,
    cancel: &ComputeCancel,
    generation: u64,
) -> crate::Result<Option<EscapeGrid>> {
    check_inputs(width, height, bounds, params)?;
    let start = Instant::now();
    let mandelbrot = Mandelbrot::new(*params);
    cancel.reset_progress(height as usize);

    let mut data = vec![0u32; width as usize * height as usize];
    let finished = data
        .par_chunks_mut(width as usize)
        .enumerate()
        .try_for_each(|(y, row)| {
            if cancel.generation() != generation {
                return Err(());
            }
            fill_row(&mandelbrot, bounds, width, height, y, row);
            cancel.inc_progress();
            Ok(())
        })
        .is_ok();

    // A late cancel after the last row still marks the result stale.
    if !finished || cancel.generation() != generation {
        debug!(generation, "Grid computation cancelled");
        return Ok(None);
    }

    debug!(
        width,
        height,
        generation,
        elapsed_ms = start.elapsed().as_millis(),
        "Grid computed"
    );
    Ok(Some(EscapeGrid::from_computed(
        width,
        height,
        params.max_iterations,
        data,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_requested_shape() {
        let grid = compute(40, 30, &Bounds::INITIAL, &EscapeParams::default()).unwrap();
        assert_eq!(grid.width(), 40);
        assert_eq!(grid.height(), 30);
        assert_eq!(grid.cells().len(), 40 * 30);
        assert_eq!(grid.max_iterations(), 100);
    }

    #[test]
    fn cells_within_cap() {
        let params = EscapeParams::new(17, 4.0).unwrap();
        let grid = compute(64, 64, &Bounds::INITIAL, &params).unwrap();
        assert!(grid.cells().iter().all(|&n| n <= 17));
        assert!(grid.cells().iter().any(|&n| n == 17));
        assert!(grid.cells().iter().any(|&n| n < 17));
    }

    #[test]
    fn parallel_matches_sequential() {
        let bounds = Bounds::new(-0.75, -0.73, 0.1, 0.12).unwrap();
        let params = EscapeParams::new(300, 4.0).unwrap();
        let grid = compute(50, 50, &bounds, &params).unwrap();

        let m = Mandelbrot::new(params);
        for y in 0..50 {
            for x in 0..50 {
                let c = bounds.pixel_to_complex(x as f64, y as f64, 50, 50);
                assert_eq!(grid.get(x, y), m.escape_time(c));
            }
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let p = EscapeParams::default();
        assert!(compute(0, 10, &Bounds::INITIAL, &p).is_err());
        let flat = Bounds {
            min_re: 0.0,
            max_re: 0.0,
            min_im: 0.0,
            max_im: 1.0,
        };
        assert!(compute(10, 10, &flat, &p).is_err());
    }

    #[test]
    fn cancellable_completes_when_left_alone() {
        let cancel = ComputeCancel::new();
        let gen = cancel.generation();
        let p = EscapeParams::default();
        let grid = compute_cancellable(32, 32, &Bounds::INITIAL, &p, &cancel, gen)
            .unwrap()
            .unwrap();
        assert_eq!(grid, compute(32, 32, &Bounds::INITIAL, &p).unwrap());
        assert_eq!(cancel.progress(), (32, 32));
    }

    #[test]
    fn stale_generation_yields_nothing() {
        let cancel = ComputeCancel::new();
        let stale = cancel.generation();
        cancel.cancel();
        let out = compute_cancellable(
            32,
            32,
            &Bounds::INITIAL,
            &EscapeParams::default(),
            &cancel,
            stale,
        )
        .unwrap();
        assert!(out.is_none());
    }
}
