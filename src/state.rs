use crate::error::{try_zeroed, SimError};
use crate::solver::diagnostics::RunningStats;
use crate::solver::spectral::SpectralBuffer;
use crate::streamtube::Streamtube;

/// Default cells per axis.
pub const DEFAULT_GRID_SIZE: usize = 50;

/// Wrap a signed coordinate onto `[0, n)`.
#[inline(always)]
pub fn wrap(i: i64, n: usize) -> usize {
    i.rem_euclid(n as i64) as usize
}

/// Physical row length needed by the in-place real-to-complex transform.
pub const fn padded_stride(n: usize) -> usize {
    n + 2
}

/// Owned N×N grid of reals with an explicit physical row length.
///
/// Cells `x >= n` inside a row are padding: they are only touched by the
/// spectral transform and never read back as grid data.
#[derive(Clone, Debug)]
pub struct Field {
    n: usize,
    stride: usize,
    data: Vec<f64>,
}

impl Field {
    /// Zero-initialized field with rows of length `stride >= n`.
    pub fn new(n: usize, stride: usize, buffer: &'static str) -> Result<Self, SimError> {
        debug_assert!(stride >= n);
        Ok(Self {
            n,
            stride,
            data: try_zeroed(n * stride, buffer)?,
        })
    }

    /// Field without padding (`stride == n`).
    pub fn dense(n: usize, buffer: &'static str) -> Result<Self, SimError> {
        Self::new(n, n, buffer)
    }

    /// Field with the transform padding (`stride == n + 2`).
    pub fn padded(n: usize, buffer: &'static str) -> Result<Self, SimError> {
        Self::new(n, padded_stride(n), buffer)
    }

    /// Cells per axis.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Physical row length.
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.n && y < self.n, "({x}, {y}) outside {}x{} grid", self.n, self.n);
        y * self.stride + x
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.offset(x, y)]
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let i = self.offset(x, y);
        self.data[i] = value;
    }

    #[inline(always)]
    pub fn add(&mut self, x: usize, y: usize, delta: f64) {
        let i = self.offset(x, y);
        self.data[i] += delta;
    }

    /// The `n` logical cells of row `y`.
    pub fn row(&self, y: usize) -> &[f64] {
        let start = y * self.stride;
        &self.data[start..start + self.n]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [f64] {
        let start = y * self.stride;
        &mut self.data[start..start + self.n]
    }

    /// Whole backing storage, padding included.
    pub fn raw(&self) -> &[f64] {
        &self.data
    }

    pub fn raw_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Iterate logical cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n).flat_map(move |y| self.row(y).iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.cells().sum()
    }

    /// `self = factor * src` over logical cells; strides may differ.
    pub fn scale_from(&mut self, src: &Field, factor: f64) {
        debug_assert_eq!(self.n, src.n);
        for y in 0..self.n {
            for (d, s) in self.row_mut(y).iter_mut().zip(src.row(y)) {
                *d = factor * s;
            }
        }
    }

    /// Copy logical cells from `src`; strides may differ.
    pub fn copy_from(&mut self, src: &Field) {
        for y in 0..self.n {
            self.row_mut(y).copy_from_slice(src.row(y));
        }
    }

    /// Copy logical cells into a dense row-major slice of length `n * n`.
    pub fn copy_to_slice(&self, dst: &mut [f64]) {
        debug_assert_eq!(dst.len(), self.n * self.n);
        for (y, chunk) in dst.chunks_exact_mut(self.n).enumerate() {
            chunk.copy_from_slice(self.row(y));
        }
    }

    /// Copy from a dense row-major slice of length `n * n`.
    pub fn copy_from_slice(&mut self, src: &[f64]) {
        debug_assert_eq!(src.len(), self.n * self.n);
        for (y, chunk) in src.chunks_exact(self.n).enumerate() {
            self.row_mut(y).copy_from_slice(chunk);
        }
    }
}

/// All per-cell buffers of the simulation, allocated once.
pub struct SimState {
    pub n: usize,
    /// Current velocity (padded rows).
    pub u: Field,
    pub v: Field,
    /// Force input, self-advection source, and transform workspace.
    pub u_prev: SpectralBuffer,
    pub v_prev: SpectralBuffer,
    /// Smoke density at the current and previous step.
    pub rho: Field,
    pub rho_prev: Field,
    /// Pending user-injected force.
    pub fx: Field,
    pub fy: Field,
    /// Scratch for derived scalar datasets (magnitudes, divergence).
    pub scratch: Vec<f64>,
}

impl SimState {
    pub fn new(n: usize) -> Result<Self, SimError> {
        if n < 2 {
            return Err(SimError::InvalidGridSize { size: n });
        }
        Ok(Self {
            n,
            u: Field::padded(n, "u")?,
            v: Field::padded(n, "v")?,
            u_prev: SpectralBuffer::new(Field::padded(n, "u_prev")?),
            v_prev: SpectralBuffer::new(Field::padded(n, "v_prev")?),
            rho: Field::dense(n, "rho")?,
            rho_prev: Field::dense(n, "rho_prev")?,
            fx: Field::dense(n, "fx")?,
            fy: Field::dense(n, "fy")?,
            scratch: try_zeroed(n * n, "scratch")?,
        })
    }
}

/// Copy of the renderable state handed from the physics thread to its consumer.
pub struct FrameSnapshot {
    pub n: usize,
    pub step: u64,
    pub density: Vec<f64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub stats: Option<RunningStats>,
    pub streamtubes: Vec<Streamtube>,
}

impl FrameSnapshot {
    /// Pre-allocate a snapshot buffer matching the given grid size.
    pub fn new_empty(n: usize) -> Self {
        FrameSnapshot {
            n,
            step: 0,
            density: vec![0.0; n * n],
            u: vec![0.0; n * n],
            v: vec![0.0; n * n],
            stats: None,
            streamtubes: Vec::new(),
        }
    }
}
