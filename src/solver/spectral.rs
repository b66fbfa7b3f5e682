//! Frequency-domain part of the solver.
//!
//! Row and column FFTs from `rustfft` drive a 2D real-to-complex transform
//! that works in place on the padded row layout of [`Field`]: after the
//! forward transform row `y` holds `n/2 + 1` interleaved `(re, im)` pairs, one
//! per non-negative x-frequency, and the row index is the y-frequency.
//! [`SpectralBuffer`] tracks which of the two interpretations the storage
//! currently has.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{try_zeroed, SimError};
use crate::state::Field;

/// Signed y-wavenumber of spectrum row `j`. Rows past the middle alias to
/// negative frequencies; for even `n` the Nyquist row maps to `-n/2`.
#[inline]
pub fn wavenumber(j: usize, n: usize) -> f64 {
    if 2 * j < n {
        j as f64
    } else {
        j as f64 - n as f64
    }
}

/// Which interpretation the storage of a [`SpectralBuffer`] currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// N×N reals, one per cell.
    Spatial,
    /// `(n/2 + 1)` complex bins per row, interleaved `(re, im)`.
    Frequency,
}

/// A padded field plus the flag saying whether it holds grid values or
/// Fourier coefficients.
pub struct SpectralBuffer {
    field: Field,
    domain: Domain,
}

impl SpectralBuffer {
    pub fn new(field: Field) -> Self {
        debug_assert!(field.stride() >= 2 * (field.size() / 2 + 1));
        Self {
            field,
            domain: Domain::Spatial,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Spatial view.
    pub fn field(&self) -> &Field {
        debug_assert_eq!(self.domain, Domain::Spatial);
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field {
        debug_assert_eq!(self.domain, Domain::Spatial);
        &mut self.field
    }

    /// Coefficient for x-frequency bin `k` in row `y`.
    #[inline(always)]
    pub fn bin(&self, k: usize, y: usize) -> Complex<f64> {
        debug_assert_eq!(self.domain, Domain::Frequency);
        let i = y * self.field.stride() + 2 * k;
        let raw = self.field.raw();
        Complex::new(raw[i], raw[i + 1])
    }

    #[inline(always)]
    pub fn set_bin(&mut self, k: usize, y: usize, c: Complex<f64>) {
        debug_assert_eq!(self.domain, Domain::Frequency);
        let i = y * self.field.stride() + 2 * k;
        let raw = self.field.raw_mut();
        raw[i] = c.re;
        raw[i + 1] = c.im;
    }
}

/// 2D real transform over an N×N grid plus the viscous damping and
/// divergence-free projection applied between the two transforms.
pub struct SpectralSolver {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    line: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SpectralSolver {
    pub fn new(n: usize) -> Result<Self, SimError> {
        if n < 2 {
            return Err(SimError::InvalidGridSize { size: n });
        }
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Ok(Self {
            n,
            forward,
            inverse,
            line: try_zeroed(n, "fft line")?,
            scratch: try_zeroed(scratch_len, "fft scratch")?,
        })
    }

    fn forward_line(&mut self) {
        self.forward.process_with_scratch(&mut self.line, &mut self.scratch);
    }

    fn inverse_line(&mut self) {
        self.inverse.process_with_scratch(&mut self.line, &mut self.scratch);
    }

    /// Number of retained x-frequency bins per row.
    pub fn bins(&self) -> usize {
        self.n / 2 + 1
    }

    /// Factor the caller applies after [`inverse`](Self::inverse) to get
    /// physical values back.
    pub fn normalization(&self) -> f64 {
        1.0 / (self.n * self.n) as f64
    }

    /// Real-to-complex transform, in place.
    pub fn forward(&mut self, buf: &mut SpectralBuffer) {
        debug_assert_eq!(buf.domain, Domain::Spatial);
        let n = self.n;
        let bins = self.bins();
        let stride = buf.field.stride();

        for y in 0..n {
            for (c, &x) in self.line.iter_mut().zip(buf.field.row(y)) {
                *c = Complex::new(x, 0.0);
            }
            self.forward_line();
            let row = &mut buf.field.raw_mut()[y * stride..(y + 1) * stride];
            for (k, c) in self.line[..bins].iter().enumerate() {
                row[2 * k] = c.re;
                row[2 * k + 1] = c.im;
            }
        }
        buf.domain = Domain::Frequency;

        for k in 0..bins {
            for y in 0..n {
                self.line[y] = buf.bin(k, y);
            }
            self.forward_line();
            for y in 0..n {
                buf.set_bin(k, y, self.line[y]);
            }
        }
    }

    /// Complex-to-real transform, in place, without the `1/N²` factor.
    pub fn inverse(&mut self, buf: &mut SpectralBuffer) {
        debug_assert_eq!(buf.domain, Domain::Frequency);
        let n = self.n;
        let bins = self.bins();

        for k in 0..bins {
            for y in 0..n {
                self.line[y] = buf.bin(k, y);
            }
            self.inverse_line();
            for y in 0..n {
                buf.set_bin(k, y, self.line[y]);
            }
        }

        for y in 0..n {
            for k in 0..n {
                self.line[k] = if k < bins { buf.bin(k, y) } else { buf.bin(n - k, y).conj() };
            }
            self.inverse_line();
            for (x, c) in buf.field.row_mut(y).iter_mut().zip(&self.line) {
                *x = c.re;
            }
        }
        buf.domain = Domain::Spatial;
    }

    /// Damp every non-zero frequency by `exp(-|k|²·dt·visc)` and remove the
    /// component of `(U, V)` parallel to `k`. The mean flow passes through.
    pub fn diffuse_project(&self, u: &mut SpectralBuffer, v: &mut SpectralBuffer, dt: f64, visc: f64) {
        let n = self.n;
        for j in 0..n {
            let ky = wavenumber(j, n);
            for k in 0..self.bins() {
                let kx = k as f64;
                let r = kx * kx + ky * ky;
                if r == 0.0 {
                    continue;
                }
                let f = (-r * dt * visc).exp();
                let uu = u.bin(k, j);
                let vv = v.bin(k, j);
                let pu = uu * (1.0 - kx * kx / r) - vv * (kx * ky / r);
                let pv = vv * (1.0 - ky * ky / r) - uu * (ky * kx / r);
                u.set_bin(k, j, pu * f);
                v.set_bin(k, j, pv * f);
            }
        }
    }
}
