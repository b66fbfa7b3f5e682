use crate::state::{wrap, Field};

/// Bilinear sample of `f` at continuous grid position `(x, y)`.
/// Both axes wrap: the cell after `n - 1` is `0`.
#[inline]
pub fn sample_periodic(f: &Field, x: f64, y: f64) -> f64 {
    let n = f.size();
    let xf = x.floor();
    let yf = y.floor();
    let s = x - xf;
    let t = y - yf;
    let i0 = wrap(xf as i64, n);
    let j0 = wrap(yf as i64, n);
    let i1 = (i0 + 1) % n;
    let j1 = (j0 + 1) % n;
    (1.0 - s) * ((1.0 - t) * f.get(i0, j0) + t * f.get(i0, j1))
        + s * ((1.0 - t) * f.get(i1, j0) + t * f.get(i1, j1))
}

/// Value of `src` carried into cell `(i, j)` along `(u, v)` over one step.
///
/// Cell centres sit at `(i + 0.5) / n` in unit-torus coordinates; the
/// backtraced point is mapped back to grid units before sampling.
#[inline]
pub fn sample_backtrace(src: &Field, i: usize, j: usize, dt: f64, u: &Field, v: &Field) -> f64 {
    let nf = src.size() as f64;
    let x = (i as f64 + 0.5) / nf;
    let y = (j as f64 + 0.5) / nf;
    let x0 = nf * (x - dt * u.get(i, j)) - 0.5;
    let y0 = nf * (y - dt * v.get(i, j)) - 0.5;
    sample_periodic(src, x0, y0)
}

/// Semi-Lagrangian advection: traces every cell backwards through `(u, v)`.
pub fn advect(dst: &mut Field, src: &Field, u: &Field, v: &Field, dt: f64) {
    let n = dst.size();
    for j in 0..n {
        for i in 0..n {
            dst.set(i, j, sample_backtrace(src, i, j, dt, u, v));
        }
    }
}
