use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::simulation::Simulation;
use crate::state::FrameSnapshot;
use crate::streamtube::Seed;

/// Viscosity scale multiplier for one "more viscous" nudge.
pub const VISC_STEP_UP: f64 = 5.0;
/// Viscosity scale multiplier for one "less viscous" nudge.
pub const VISC_STEP_DOWN: f64 = 0.2;

/// Pause between frames while the simulation is frozen.
pub const FROZEN_IDLE: Duration = Duration::from_millis(1);

/// Requests the main thread sends to the physics thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsCommand {
    Inject { x: i64, y: i64, dx: f64, dy: f64 },
    AddSeed(Seed),
    RemoveLastSeed,
    /// Shift dt by this many increments of `SolverParams::DT_NUDGE`.
    NudgeDt(i32),
    ScaleViscosity(f64),
    SetFrozen(bool),
    ToggleFrozen,
}

/// Apply one command to the simulation. Runs between steps.
pub fn apply_command(sim: &mut Simulation, cmd: PhysicsCommand) {
    match cmd {
        PhysicsCommand::Inject { x, y, dx, dy } => sim.inject_force(x, y, dx, dy),
        PhysicsCommand::AddSeed(seed) => sim.add_seed(seed.x, seed.y, seed.t0),
        PhysicsCommand::RemoveLastSeed => {
            sim.remove_last_seed();
        }
        PhysicsCommand::NudgeDt(steps) => {
            sim.params.nudge_dt(steps);
            log::info!("dt = {:.4}", sim.params.dt);
        }
        PhysicsCommand::ScaleViscosity(factor) => {
            sim.params.scale_viscosity(factor);
            log::info!("viscosity = {:.3e}", sim.params.viscosity());
        }
        PhysicsCommand::SetFrozen(frozen) => sim.frozen = frozen,
        PhysicsCommand::ToggleFrozen => {
            sim.frozen = !sim.frozen;
            log::info!("{}", if sim.frozen { "frozen" } else { "running" });
        }
    }
}

/// Channels connecting the main thread to the physics thread.
pub struct PhysicsChannels {
    pub cmd_tx: mpsc::Sender<PhysicsCommand>,
    pub snap_rx: mpsc::Receiver<FrameSnapshot>,
    pub snap_return_tx: mpsc::Sender<FrameSnapshot>,
}

/// Move `sim` onto its own thread. Each frame drains pending commands, runs
/// `steps_per_frame` steps and publishes a snapshot; returned snapshots are
/// reused as the next frame's buffer.
pub fn spawn_physics_thread(
    mut sim: Simulation,
    steps_per_frame: usize,
    stats_interval: u64,
    running: Arc<AtomicBool>,
) -> (PhysicsChannels, std::thread::JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<PhysicsCommand>();
    let (snap_tx, snap_rx) = mpsc::sync_channel::<FrameSnapshot>(1);
    let (snap_return_tx, snap_return_rx) = mpsc::channel::<FrameSnapshot>();

    let handle = std::thread::spawn(move || {
        let n = sim.grid_size();
        let mut snap_buf = FrameSnapshot::new_empty(n);

        while running.load(Ordering::SeqCst) {
            while let Ok(cmd) = cmd_rx.try_recv() {
                apply_command(&mut sim, cmd);
            }
            if sim.frozen {
                std::thread::sleep(FROZEN_IDLE);
            }
            for _ in 0..steps_per_frame {
                let before = sim.step_count();
                sim.advance_step();
                let step = sim.step_count();
                if step != before && stats_interval > 0 && step % stats_interval == 0 {
                    log_stats(&sim);
                }
            }
            sim.snapshot_into(&mut snap_buf);
            if snap_tx.send(snap_buf).is_err() {
                break;
            }
            snap_buf = snap_return_rx
                .try_recv()
                .ok()
                .filter(|b| b.n == n)
                .unwrap_or_else(|| FrameSnapshot::new_empty(n));
        }
        log::debug!("physics thread stopped at step {}", sim.step_count());
    });

    let channels = PhysicsChannels {
        cmd_tx,
        snap_rx,
        snap_return_tx,
    };
    (channels, handle)
}

fn log_stats(sim: &Simulation) {
    let Some(stats) = sim.stats() else {
        return;
    };
    log::info!(
        "step={} rho=[{:.3}, {:.3}] |u|max={:.4e} |f|max={:.4e} div=[{:.3e}, {:.3e}] mass={:.4}",
        sim.step_count(),
        stats.density.min,
        stats.density.max,
        stats.velocity.max,
        stats.force.max,
        stats.divergence.min,
        stats.divergence.max,
        sim.density().sum(),
    );
}
