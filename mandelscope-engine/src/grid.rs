use mandelscope_core::CoreError;

/// Escape times for a full frame, row-major, one cell per pixel.
///
/// Every cell lies in `0..=max_iterations`. A grid is built whole, either
/// by [`compute`](crate::compute) or by the session codec, and replaced
/// whole; there is no way to edit individual cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeGrid {
    width: u32,
    height: u32,
    max_iterations: u32,
    data: Vec<u32>,
}

impl EscapeGrid {
    /// Wrap row-major cell data, checking its length and value range.
    pub fn from_cells(
        width: u32,
        height: u32,
        max_iterations: u32,
        data: Vec<u32>,
    ) -> mandelscope_core::Result<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        if let Some(&bad) = data.iter().find(|&&n| n > max_iterations) {
            return Err(CoreError::CellOutOfRange {
                value: bad,
                max: max_iterations,
            });
        }
        Ok(Self {
            width,
            height,
            max_iterations,
            data,
        })
    }

    /// Caller guarantees the length and range invariants.
    pub(crate) fn from_computed(width: u32, height: u32, max_iterations: u32, data: Vec<u32>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            max_iterations,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Escape time at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the grid.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside grid");
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Whether the cell reached the iteration cap.
    #[inline]
    pub fn is_interior(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == self.max_iterations
    }

    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.data.chunks_exact(self.width as usize)
    }

    pub fn cells(&self) -> &[u32] {
        &self.data
    }
}
