use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use smoke_torus::config;
use smoke_torus::input::{parse_command, Orbit};
use smoke_torus::physics::{spawn_physics_thread, PhysicsChannels, PhysicsCommand};
use smoke_torus::solver::DragTracker;
use smoke_torus::state::FrameSnapshot;
use smoke_torus::Simulation;

struct Defaults;

impl Defaults {
    const SNAPSHOT_TIMEOUT_MS: u64 = 1000;
}

/// Value following `flag` in the argument list.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

/// Forward stdin lines as commands until EOF or the receiver goes away.
fn spawn_stdin_reader(cmd_tx: mpsc::Sender<PhysicsCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(cmd) => {
                    if cmd_tx.send(cmd).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => log::warn!("unrecognized command: {}", line.trim()),
            }
        }
    });
}

fn log_summary(snap: &FrameSnapshot) {
    let mass: f64 = snap.density.iter().sum();
    let longest = snap.streamtubes.iter().map(|t| t.tail.len()).max().unwrap_or(0);
    match snap.stats {
        Some(stats) => log::info!(
            "finished at step {}: mass={:.4} |u|max={:.4e} div=[{:.3e}, {:.3e}] tubes={} longest tail={}",
            snap.step,
            mass,
            stats.velocity.max,
            stats.divergence.min,
            stats.divergence.max,
            snap.streamtubes.len(),
            longest,
        ),
        None => log::info!("finished before the first step"),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = PathBuf::from(flag_value(&args, "--config").unwrap_or(config::DEFAULT_PATH));
    let mut cfg = config::load(&config_path);
    if let Some(raw) = flag_value(&args, "--steps") {
        match raw.parse() {
            Ok(steps) => cfg.run.steps = steps,
            Err(e) => {
                log::error!("invalid --steps {raw:?}: {e}");
                std::process::exit(2);
            }
        }
    }

    let params = cfg.physics.solver_params();
    let mut sim = match Simulation::with_params(cfg.grid_size, params) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("cannot create simulation: {e}");
            std::process::exit(1);
        }
    };
    for seed in &cfg.run.seeds {
        sim.add_seed(seed.x, seed.y, seed.t0);
    }
    log::info!(
        "{n}x{n} grid, dt={}, viscosity={:.3e}, {} seeds, {} steps",
        cfg.physics.dt,
        sim.params.viscosity(),
        cfg.run.seeds.len(),
        if cfg.run.steps == 0 { "unlimited".to_string() } else { cfg.run.steps.to_string() },
        n = cfg.grid_size,
    );

    // Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("cannot install Ctrl+C handler: {e}");
    }

    let (channels, physics_thread) = spawn_physics_thread(
        sim,
        cfg.run.steps_per_frame.max(1),
        cfg.run.stats_interval,
        running.clone(),
    );
    let PhysicsChannels { cmd_tx, snap_rx, snap_return_tx } = channels;
    spawn_stdin_reader(cmd_tx.clone());

    let orbit = Orbit::centered(cfg.grid_size, cfg.run.orbit_radius, cfg.run.orbit_period);
    let mut drag = DragTracker::new();
    let (px, py) = orbit.position(0);
    drag.drag_to(px, py);

    let mut last_snap: Option<FrameSnapshot> = None;
    let mut frame: u64 = 0;
    while running.load(Ordering::SeqCst) {
        frame += 1;
        let (px, py) = orbit.position(frame);
        let (dx, dy) = drag.drag_to(px, py);
        let cmd = PhysicsCommand::Inject { x: px.round() as i64, y: py.round() as i64, dx, dy };
        if cmd_tx.send(cmd).is_err() {
            break;
        }

        match snap_rx.recv_timeout(Duration::from_millis(Defaults::SNAPSHOT_TIMEOUT_MS)) {
            Ok(snap) => {
                if cfg.run.steps > 0 && snap.step >= cfg.run.steps {
                    running.store(false, Ordering::SeqCst);
                }
                if let Some(old) = last_snap.replace(snap) {
                    let _ = snap_return_tx.send(old);
                }
            }
            // Frozen or slow; keep feeding the pointer.
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    running.store(false, Ordering::SeqCst);
    drop(snap_rx);
    if physics_thread.join().is_err() {
        log::error!("physics thread panicked");
        std::process::exit(1);
    }
    if let Some(snap) = &last_snap {
        log_summary(snap);
    }
}
