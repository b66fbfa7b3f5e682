use crate::state::{Field, SimState};

/// Range of a scalar quantity over the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Identity for [`include`](Self::include): empty range.
    pub const EMPTY: MinMax = MinMax {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Widen the range to cover `value`. Every value is compared against
    /// both ends.
    #[inline]
    pub fn include(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut mm = Self::EMPTY;
        for v in values {
            mm.include(v);
        }
        mm
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Largest absolute value in the range.
    pub fn max_abs(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }

    /// Map `value` onto `[0, 1]` relative to this range, clamping outside it.
    /// A degenerate range maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Per-step ranges consumers use to normalize color and height mappings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    pub density: MinMax,
    pub velocity: MinMax,
    pub force: MinMax,
    pub divergence: MinMax,
}

/// Vector field a divergence is taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorDataset {
    #[default]
    Velocity,
    Force,
}

/// Scalar quantities a consumer can ask the simulation for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarDataset {
    #[default]
    Density,
    VelocityMagnitude,
    ForceMagnitude,
    VelocityDivergence,
    ForceDivergence,
}

/// `out[i] = |(a, b)|` per cell, row-major. Returns the range.
pub fn magnitude_into(out: &mut [f64], a: &Field, b: &Field) -> MinMax {
    let n = a.size();
    let mut mm = MinMax::EMPTY;
    for y in 0..n {
        for (x, (&ax, &bx)) in a.row(y).iter().zip(b.row(y)).enumerate() {
            let m = ax.hypot(bx);
            out[y * n + x] = m;
            mm.include(m);
        }
    }
    mm
}

/// Central-difference divergence `next_x - prev_x + next_y - prev_y` with
/// periodic neighbours, written row-major into `out`. Returns the range.
pub fn divergence_into(out: &mut [f64], fx: &Field, fy: &Field) -> MinMax {
    let n = fx.size();
    let mut mm = MinMax::EMPTY;
    for j in 0..n {
        let jm = (j + n - 1) % n;
        let jp = (j + 1) % n;
        for i in 0..n {
            let im = (i + n - 1) % n;
            let ip = (i + 1) % n;
            let d = fx.get(ip, j) - fx.get(im, j) + fy.get(i, jp) - fy.get(i, jm);
            out[j * n + i] = d;
            mm.include(d);
        }
    }
    mm
}

/// Fill `out` with the requested dataset and return its range.
pub fn scalar_dataset_into(out: &mut [f64], state: &SimState, dataset: ScalarDataset) -> MinMax {
    match dataset {
        ScalarDataset::Density => {
            state.rho.copy_to_slice(out);
            MinMax::from_values(out.iter().copied())
        }
        ScalarDataset::VelocityMagnitude => magnitude_into(out, &state.u, &state.v),
        ScalarDataset::ForceMagnitude => magnitude_into(out, &state.fx, &state.fy),
        ScalarDataset::VelocityDivergence => divergence_into(out, &state.u, &state.v),
        ScalarDataset::ForceDivergence => divergence_into(out, &state.fx, &state.fy),
    }
}

/// Recompute all four ranges from scratch, one pass per quantity.
/// Uses `state.scratch` as the per-cell buffer.
pub fn compute_stats(state: &mut SimState, divergence_of: VectorDataset) -> RunningStats {
    let mut scratch = std::mem::take(&mut state.scratch);
    let density = MinMax::from_values(state.rho.cells());
    let velocity = magnitude_into(&mut scratch, &state.u, &state.v);
    let force = magnitude_into(&mut scratch, &state.fx, &state.fy);
    let divergence = match divergence_of {
        VectorDataset::Velocity => divergence_into(&mut scratch, &state.u, &state.v),
        VectorDataset::Force => divergence_into(&mut scratch, &state.fx, &state.fy),
    };
    state.scratch = scratch;
    RunningStats {
        density,
        velocity,
        force,
        divergence,
    }
}
