//! Streamtubes: paths traced from fixed seeds through the velocity history.
//!
//! A seed at `(x, y, t0)` starts `t0` snapshots back and walks forward to the
//! newest one, stepping by the velocity it samples at each snapshot. The
//! resulting tail is rebuilt from scratch every step.

use crate::history::HistoryBuffer;

/// Weight on the squared y-velocity in [`TubePoint::magnitude`].
pub const MAGNITUDE_Y_WEIGHT: f64 = 100_000.0;
pub const MAGNITUDE_MIN: f64 = 1.0;
pub const MAGNITUDE_MAX: f64 = 20.0;

/// Anchor of a streamtube. `t0` is a history age, 0 being the newest snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub x: f64,
    pub y: f64,
    pub t0: usize,
}

/// One traced point. `z` is the synthetic depth: the age of the first
/// snapshot walked plus one per snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Width hint for rendering, clamped to `[MAGNITUDE_MIN, MAGNITUDE_MAX]`.
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Streamtube {
    pub seed: Seed,
    pub tail: Vec<TubePoint>,
}

impl Streamtube {
    pub fn new(seed: Seed) -> Self {
        Self { seed, tail: Vec::new() }
    }

    /// Rebuild the tail from the seed position. `scale` multiplies each
    /// sampled velocity to get the displacement to the next point.
    /// A `t0` older than the history reaches starts at the oldest snapshot,
    /// and depths count from there.
    pub fn trace(&mut self, history: &HistoryBuffer, scale: f64) {
        self.tail.clear();
        let Some(last_age) = history.len().checked_sub(1) else {
            return;
        };
        let start = self.seed.t0.min(last_age);
        let (mut x, mut y, mut z) = (self.seed.x, self.seed.y, start as f64);
        for snapshot in history.iter_oldest_first().skip(last_age - start) {
            let (dx, dy) = snapshot.sample(x, y);
            x += scale * dx;
            y += scale * dy;
            z += 1.0;
            let magnitude = (dx * dx + MAGNITUDE_Y_WEIGHT * dy * dy).clamp(MAGNITUDE_MIN, MAGNITUDE_MAX);
            self.tail.push(TubePoint { x, y, z, magnitude });
        }
    }
}

/// Rebuild every tube's tail. Tubes are independent of each other.
pub fn trace_all(tubes: &mut [Streamtube], history: &HistoryBuffer, scale: f64) {
    for tube in tubes {
        tube.trace(history, scale);
    }
}
