//! Stable-fluids smoke on a periodic square grid.
//!
//! Each step decays and applies user forces, self-advects the velocity,
//! diffuses and projects it in Fourier space, then carries smoke density along
//! the result. A rolling history of velocity fields feeds streamtubes traced
//! from user-placed seeds.
//!
//! ```no_run
//! use smoke_torus::Simulation;
//!
//! let mut sim = Simulation::new(50)?;
//! sim.inject_force(25, 25, 1.0, 0.0);
//! sim.add_seed(10.0, 10.0, 20);
//! for _ in 0..100 {
//!     sim.advance_step();
//! }
//! let stats = sim.stats().expect("stepped");
//! println!("max |u| = {}", stats.velocity.max);
//! # Ok::<(), smoke_torus::SimError>(())
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod physics;
pub mod simulation;
pub mod solver;
pub mod state;
pub mod streamtube;

pub use error::{ConfigError, SimError};
pub use history::{HistoryBuffer, Snapshot};
pub use simulation::Simulation;
pub use solver::{MinMax, RunningStats, ScalarDataset, SolverParams, VectorDataset};
pub use state::{Field, FrameSnapshot};
pub use streamtube::{Seed, Streamtube, TubePoint};
