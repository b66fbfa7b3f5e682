/// Solver parameters for the smoke simulation.
///
/// Plain data: nothing here is validated, so negative or huge values are
/// accepted and simply produce whatever the numerics make of them.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
    pub dt: f64,
    pub base_visc: f64,
    pub visc_scale_factor: f64,
    /// Per-step multiplier applied to the pending force field.
    pub force_decay: f64,
    /// Per-step multiplier applied to density before it is advected.
    pub density_decay: f64,
    /// Density written at an injection cell.
    pub emission_density: f64,
    /// Length of the force delta added by one injection.
    pub force_scale: f64,
    /// Distance factor applied to sampled velocity when extending a streamtube.
    pub streamline_scale: f64,
    /// Number of velocity snapshots kept for the tracer.
    pub history_capacity: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            dt: 0.4,
            base_visc: 0.001,
            visc_scale_factor: 1.0,
            force_decay: 0.85,
            density_decay: 0.995,
            emission_density: 10.0,
            force_scale: 0.1,
            streamline_scale: 10.0,
            history_capacity: 50,
        }
    }
}

impl SolverParams {
    pub const DT_NUDGE: f64 = 0.001;

    /// Effective viscosity used by the spectral damping.
    pub fn viscosity(&self) -> f64 {
        self.base_visc * self.visc_scale_factor
    }

    /// Shift the time step by `steps` nudges of [`Self::DT_NUDGE`].
    pub fn nudge_dt(&mut self, steps: i32) {
        self.dt += Self::DT_NUDGE * steps as f64;
    }

    pub fn scale_viscosity(&mut self, factor: f64) {
        self.visc_scale_factor *= factor;
    }
}
