pub mod core;
pub mod diagnostics;
pub mod forces;
mod params;
pub mod spectral;

// Re-export public API
pub use diagnostics::{MinMax, RunningStats, ScalarDataset, VectorDataset};
pub use forces::DragTracker;
pub use params::SolverParams;
pub use spectral::SpectralSolver;

use crate::state::SimState;
use self::core::advect;
use forces::set_forces;

/// Velocity solve: integrate the force input, self-advect, then diffuse and
/// project in frequency space. On entry `u_prev, v_prev` hold this step's
/// force; on exit `u, v` hold the new divergence-free velocity.
pub fn solve_velocity(state: &mut SimState, spectral: &mut SpectralSolver, dt: f64, visc: f64) {
    let n = state.n;
    {
        let u_prev = state.u_prev.field_mut();
        let v_prev = state.v_prev.field_mut();
        for y in 0..n {
            for x in 0..n {
                let u = state.u.get(x, y) + dt * u_prev.get(x, y);
                let v = state.v.get(x, y) + dt * v_prev.get(x, y);
                state.u.set(x, y, u);
                state.v.set(x, y, v);
                u_prev.set(x, y, u);
                v_prev.set(x, y, v);
            }
        }
    }

    // Self-advection reads the forced velocity from the prev buffers.
    advect(&mut state.u, state.u_prev.field(), state.u_prev.field(), state.v_prev.field(), dt);
    advect(&mut state.v, state.v_prev.field(), state.u_prev.field(), state.v_prev.field(), dt);

    state.u_prev.field_mut().copy_from(&state.u);
    state.v_prev.field_mut().copy_from(&state.v);

    spectral.forward(&mut state.u_prev);
    spectral.forward(&mut state.v_prev);
    spectral.diffuse_project(&mut state.u_prev, &mut state.v_prev, dt, visc);
    spectral.inverse(&mut state.u_prev);
    spectral.inverse(&mut state.v_prev);

    let norm = spectral.normalization();
    state.u.scale_from(state.u_prev.field(), norm);
    state.v.scale_from(state.v_prev.field(), norm);
}

/// Carry density along the freshly solved velocity.
pub fn advect_density(state: &mut SimState, dt: f64) {
    advect(&mut state.rho, &state.rho_prev, &state.u, &state.v, dt);
}

/// Full fluid step: forces, velocity solve, density transport.
pub fn fluid_step(state: &mut SimState, spectral: &mut SpectralSolver, params: &SolverParams) {
    set_forces(state, params);
    solve_velocity(state, spectral, params.dt, params.viscosity());
    advect_density(state, params.dt);
}
