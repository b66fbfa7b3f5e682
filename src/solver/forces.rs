use crate::state::SimState;

use super::params::SolverParams;

/// Decay pending forces and density, then hand the forces to the solver as
/// this step's velocity input (`u_prev`, `v_prev`).
pub fn set_forces(state: &mut SimState, params: &SolverParams) {
    state.rho_prev.scale_from(&state.rho, params.density_decay);

    let n = state.n;
    let u_prev = state.u_prev.field_mut();
    let v_prev = state.v_prev.field_mut();
    for y in 0..n {
        for x in 0..n {
            let fx = state.fx.get(x, y) * params.force_decay;
            let fy = state.fy.get(x, y) * params.force_decay;
            state.fx.set(x, y, fx);
            state.fy.set(x, y, fy);
            u_prev.set(x, y, fx);
            v_prev.set(x, y, fy);
        }
    }
}

/// Clamp a cell coordinate onto `[0, n - 1]`.
pub fn clamp_cell(c: i64, n: usize) -> usize {
    c.clamp(0, n as i64 - 1) as usize
}

/// Add a force in the direction `(dx, dy)` at cell `(x, y)` and emit smoke there.
///
/// Out-of-range coordinates are clamped onto the grid. The direction is
/// unit-normalized before scaling, so the injected magnitude does not depend
/// on how far the pointer moved between samples; a zero direction only emits smoke.
pub fn inject_force(state: &mut SimState, params: &SolverParams, x: i64, y: i64, dx: f64, dy: f64) {
    let cx = clamp_cell(x, state.n);
    let cy = clamp_cell(y, state.n);
    let len = dx.hypot(dy);
    let (fx, fy) = if len != 0.0 && len.is_finite() {
        (dx * params.force_scale / len, dy * params.force_scale / len)
    } else {
        (0.0, 0.0)
    };
    state.fx.add(cx, cy, fx);
    state.fy.add(cx, cy, fy);
    state.rho.set(cx, cy, params.emission_density);
}

/// Turns a stream of pointer positions into motion deltas.
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    last: Option<(f64, f64)>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pointer position and return the motion since the last one.
    /// The first sample after construction or [`release`](Self::release)
    /// measures from the origin.
    pub fn drag_to(&mut self, x: f64, y: f64) -> (f64, f64) {
        let (lx, ly) = self.last.unwrap_or((0.0, 0.0));
        self.last = Some((x, y));
        (x - lx, y - ly)
    }

    pub fn release(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 8;

    #[test]
    fn test_inject_normalizes_direction() {
        let params = SolverParams::default();
        let mut s = SimState::new(N).unwrap();
        inject_force(&mut s, &params, 2, 3, 30.0, 40.0);
        assert!((s.fx.get(2, 3) - 0.06).abs() < 1e-12);
        assert!((s.fy.get(2, 3) - 0.08).abs() < 1e-12);
        assert_eq!(s.rho.get(2, 3), 10.0);
    }

    #[test]
    fn test_inject_clamps_coordinates() {
        let params = SolverParams::default();
        let mut s = SimState::new(N).unwrap();
        inject_force(&mut s, &params, -5, 100, 1.0, 0.0);
        assert_eq!(s.rho.get(0, N - 1), 10.0);
        assert!(s.fx.get(0, N - 1) > 0.0);
    }

    #[test]
    fn test_inject_zero_direction_only_emits() {
        let params = SolverParams::default();
        let mut s = SimState::new(N).unwrap();
        inject_force(&mut s, &params, 1, 1, 0.0, 0.0);
        assert_eq!(s.fx.get(1, 1), 0.0);
        assert_eq!(s.fy.get(1, 1), 0.0);
        assert_eq!(s.rho.get(1, 1), 10.0);
    }

    #[test]
    fn test_injections_accumulate() {
        let params = SolverParams::default();
        let mut s = SimState::new(N).unwrap();
        inject_force(&mut s, &params, 4, 4, 1.0, 0.0);
        inject_force(&mut s, &params, 4, 4, 5.0, 0.0);
        assert!((s.fx.get(4, 4) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_set_forces_decays_and_seeds() {
        let params = SolverParams::default();
        let mut s = SimState::new(N).unwrap();
        s.fx.set(1, 2, 1.0);
        s.fy.set(1, 2, -2.0);
        s.rho.set(3, 3, 4.0);

        set_forces(&mut s, &params);

        assert!((s.fx.get(1, 2) - 0.85).abs() < 1e-12);
        assert!((s.fy.get(1, 2) + 1.7).abs() < 1e-12);
        assert_eq!(s.u_prev.field().get(1, 2), s.fx.get(1, 2));
        assert_eq!(s.v_prev.field().get(1, 2), s.fy.get(1, 2));
        assert!((s.rho_prev.get(3, 3) - 3.98).abs() < 1e-12);
        // density itself is untouched until advection writes it
        assert_eq!(s.rho.get(3, 3), 4.0);
    }

    #[test]
    fn test_drag_tracker_deltas() {
        let mut t = DragTracker::new();
        assert_eq!(t.drag_to(3.0, 4.0), (3.0, 4.0));
        assert_eq!(t.drag_to(5.0, 4.0), (2.0, 0.0));
        t.release();
        assert_eq!(t.drag_to(1.0, 1.0), (1.0, 1.0));
    }
}
