//! The simulation handle: owns every buffer and runs one step at a time.

use crate::error::SimError;
use crate::history::HistoryBuffer;
use crate::solver::diagnostics::{compute_stats, scalar_dataset_into};
use crate::solver::forces::inject_force;
use crate::solver::{self, MinMax, RunningStats, ScalarDataset, SolverParams, SpectralSolver, VectorDataset};
use crate::state::{Field, FrameSnapshot, SimState};
use crate::streamtube::{trace_all, Seed, Streamtube};

/// A stable-fluids smoke simulation on an N×N torus.
///
/// Not internally synchronized: injections, steps and reads must be
/// serialized by the caller.
pub struct Simulation {
    state: SimState,
    spectral: SpectralSolver,
    history: HistoryBuffer,
    tubes: Vec<Streamtube>,
    stats: Option<RunningStats>,
    step: u64,
    /// Time step and viscosity knobs. Read at every step; never validated.
    pub params: SolverParams,
    /// When set, [`advance_step`](Self::advance_step) does nothing.
    pub frozen: bool,
    /// Which vector field the divergence statistic is taken of.
    pub divergence_of: VectorDataset,
}

impl Simulation {
    /// Create a zeroed simulation with default parameters.
    pub fn new(grid_size: usize) -> Result<Self, SimError> {
        Self::with_params(grid_size, SolverParams::default())
    }

    /// Create a zeroed simulation. `params.history_capacity` fixes the
    /// history size for the lifetime of the simulation.
    pub fn with_params(grid_size: usize, params: SolverParams) -> Result<Self, SimError> {
        let state = SimState::new(grid_size)?;
        let spectral = SpectralSolver::new(grid_size)?;
        let history = HistoryBuffer::new(grid_size, params.history_capacity)?;
        log::debug!(
            "created {n}x{n} simulation (dt={}, visc={}, history={})",
            params.dt,
            params.viscosity(),
            params.history_capacity,
            n = grid_size,
        );
        Ok(Self {
            state,
            spectral,
            history,
            tubes: Vec::new(),
            stats: None,
            step: 0,
            params,
            frozen: false,
            divergence_of: VectorDataset::default(),
        })
    }

    pub fn grid_size(&self) -> usize {
        self.state.n
    }

    /// Number of steps run so far.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Push the fluid at cell `(x, y)` in direction `(dx, dy)` and emit smoke.
    /// Coordinates outside the grid are clamped onto its edge.
    pub fn inject_force(&mut self, x: i64, y: i64, dx: f64, dy: f64) {
        inject_force(&mut self.state, &self.params, x, y, dx, dy);
    }

    /// Run one full step: forces, velocity solve, density transport,
    /// statistics, streamtubes, then record the new velocity in the history.
    pub fn advance_step(&mut self) {
        if self.frozen {
            return;
        }
        solver::fluid_step(&mut self.state, &mut self.spectral, &self.params);
        self.step += 1;

        let stats = compute_stats(&mut self.state, self.divergence_of);
        log::trace!(
            "step {}: rho [{:.4}, {:.4}] |u| max {:.4e} div [{:.4e}, {:.4e}]",
            self.step,
            stats.density.min,
            stats.density.max,
            stats.velocity.max,
            stats.divergence.min,
            stats.divergence.max,
        );
        self.stats = Some(stats);

        trace_all(&mut self.tubes, &self.history, self.params.streamline_scale);
        self.history.record(self.step, &self.state.u, &self.state.v);
    }

    /// Current velocity `(u, v)`. Valid until the next step.
    pub fn velocity(&self) -> (&Field, &Field) {
        (&self.state.u, &self.state.v)
    }

    pub fn density(&self) -> &Field {
        &self.state.rho
    }

    /// Pending user force `(fx, fy)`.
    pub fn force(&self) -> (&Field, &Field) {
        (&self.state.fx, &self.state.fy)
    }

    /// Direct write access to the velocity, e.g. to set an initial condition.
    pub fn velocity_mut(&mut self) -> (&mut Field, &mut Field) {
        (&mut self.state.u, &mut self.state.v)
    }

    pub fn density_mut(&mut self) -> &mut Field {
        &mut self.state.rho
    }

    /// Ranges from the most recent step; `None` before the first step.
    pub fn stats(&self) -> Option<&RunningStats> {
        self.stats.as_ref()
    }

    /// Fill the scratch buffer with `dataset` (row-major) and return it with its range.
    pub fn scalar_values(&mut self, dataset: ScalarDataset) -> (&[f64], MinMax) {
        let mut scratch = std::mem::take(&mut self.state.scratch);
        let range = scalar_dataset_into(&mut scratch, &self.state, dataset);
        self.state.scratch = scratch;
        (&self.state.scratch, range)
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Add a streamtube anchored at `(x, y)` starting `t0` snapshots back.
    /// Its tail is traced right away against the current history.
    pub fn add_seed(&mut self, x: f64, y: f64, t0: usize) {
        let mut tube = Streamtube::new(Seed { x, y, t0 });
        tube.trace(&self.history, self.params.streamline_scale);
        log::debug!("added seed ({x:.2}, {y:.2}, {t0}); {} seeds", self.tubes.len() + 1);
        self.tubes.push(tube);
    }

    /// Remove the most recently added seed. Does nothing when there are none.
    pub fn remove_last_seed(&mut self) -> Option<Seed> {
        let removed = self.tubes.pop().map(|t| t.seed);
        if let Some(seed) = removed {
            log::debug!("removed seed ({:.2}, {:.2}, {}); {} seeds", seed.x, seed.y, seed.t0, self.tubes.len());
        }
        removed
    }

    pub fn seeds(&self) -> impl Iterator<Item = &Seed> + '_ {
        self.tubes.iter().map(|t| &t.seed)
    }

    /// One tube per seed, in insertion order.
    pub fn streamtubes(&self) -> &[Streamtube] {
        &self.tubes
    }

    /// Copy the renderable state into a pre-allocated snapshot.
    pub fn snapshot_into(&self, dst: &mut FrameSnapshot) {
        let n = self.state.n;
        if dst.n != n {
            *dst = FrameSnapshot::new_empty(n);
        }
        self.state.rho.copy_to_slice(&mut dst.density);
        self.state.u.copy_to_slice(&mut dst.u);
        self.state.v.copy_to_slice(&mut dst.v);
        dst.step = self.step;
        dst.stats = self.stats;
        dst.streamtubes.clone_from(&self.tubes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_absent_before_first_step() {
        let mut sim = Simulation::new(8).unwrap();
        assert!(sim.stats().is_none());
        sim.advance_step();
        assert!(sim.stats().is_some());
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn test_frozen_skips_step() {
        let mut sim = Simulation::new(8).unwrap();
        sim.inject_force(3, 3, 1.0, 0.0);
        sim.frozen = true;
        sim.advance_step();
        assert_eq!(sim.step_count(), 0);
        assert!(sim.history().is_empty());
        assert_eq!(sim.density().get(3, 3), 10.0);
    }

    #[test]
    fn test_seed_list_order_and_underflow() {
        let mut sim = Simulation::new(8).unwrap();
        assert_eq!(sim.remove_last_seed(), None);
        sim.add_seed(1.0, 2.0, 0);
        sim.add_seed(3.0, 4.0, 5);
        let xs: Vec<f64> = sim.seeds().map(|s| s.x).collect();
        assert_eq!(xs, vec![1.0, 3.0]);
        assert_eq!(sim.remove_last_seed(), Some(Seed { x: 3.0, y: 4.0, t0: 5 }));
        assert_eq!(sim.streamtubes().len(), 1);
    }

    #[test]
    fn test_seeds_follow_history() {
        let mut sim = Simulation::new(8).unwrap();
        sim.add_seed(4.0, 4.0, 3);
        for _ in 0..6 {
            sim.advance_step();
        }
        // Traced before the 6th record: five snapshots, t0=3 walks four of them.
        assert_eq!(sim.streamtubes()[0].tail.len(), 4);
        assert_eq!(sim.history().len(), 6);
    }

    #[test]
    fn test_scalar_values_velocity_magnitude() {
        let mut sim = Simulation::new(8).unwrap();
        {
            let (u, v) = sim.velocity_mut();
            u.set(2, 2, 3.0);
            v.set(2, 2, 4.0);
        }
        let (values, range) = sim.scalar_values(ScalarDataset::VelocityMagnitude);
        assert_eq!(values[2 * 8 + 2], 5.0);
        assert_eq!(range.max, 5.0);
    }

    #[test]
    fn test_divergence_source_switch() {
        let mut sim = Simulation::new(8).unwrap();
        sim.divergence_of = VectorDataset::Force;
        sim.inject_force(4, 4, 1.0, 0.0);
        sim.advance_step();
        let stats = *sim.stats().unwrap();
        // Decayed force 0.085 at one cell: neighbours see ±0.085.
        assert!((stats.divergence.max - 0.085).abs() < 1e-12, "{:?}", stats.divergence);
        assert!((stats.divergence.min + 0.085).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_into_copies_state() {
        let mut sim = Simulation::new(6).unwrap();
        sim.inject_force(1, 1, 0.0, 1.0);
        sim.add_seed(2.0, 2.0, 0);
        sim.advance_step();
        let mut snap = FrameSnapshot::new_empty(4);
        sim.snapshot_into(&mut snap);
        assert_eq!(snap.n, 6);
        assert_eq!(snap.step, 1);
        assert_eq!(snap.density.len(), 36);
        assert_eq!(snap.density[6 + 1], sim.density().get(1, 1));
        assert_eq!(snap.streamtubes.len(), 1);
        assert_eq!(snap.stats, sim.stats().copied());
    }

    #[test]
    fn test_invalid_grid_size() {
        assert!(matches!(Simulation::new(1), Err(SimError::InvalidGridSize { size: 1 })));
    }
}
