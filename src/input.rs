use std::f64::consts::TAU;

use crate::physics::{PhysicsCommand, VISC_STEP_DOWN, VISC_STEP_UP};
use crate::streamtube::Seed;

/// Circular pointer path in grid coordinates, standing in for a mouse drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    /// Steps per revolution.
    pub period: u64,
}

impl Orbit {
    /// Orbit around the grid centre with `radius_frac` of the grid size.
    pub fn centered(grid_size: usize, radius_frac: f64, period: u64) -> Self {
        let c = grid_size as f64 / 2.0;
        Self {
            cx: c,
            cy: c,
            radius: radius_frac * grid_size as f64,
            period,
        }
    }

    /// Pointer position at `step`. A zero period parks the pointer at angle 0.
    pub fn position(&self, step: u64) -> (f64, f64) {
        let angle = if self.period == 0 {
            0.0
        } else {
            TAU * (step % self.period) as f64 / self.period as f64
        };
        (self.cx + self.radius * angle.cos(), self.cy + self.radius * angle.sin())
    }
}

/// Parse one line of driver input into a command.
///
/// ```text
/// dt+ | dt-            nudge the time step
/// visc+ | visc-        scale viscosity by 5 or 0.2
/// freeze               toggle freezing
/// seed X Y [T0]        add a streamtube seed
/// unseed               remove the newest seed
/// push X Y DX DY       inject a force
/// ```
///
/// Returns `None` for blank or unrecognized lines.
pub fn parse_command(line: &str) -> Option<PhysicsCommand> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let nums: Vec<f64> = words.map(str::parse::<f64>).collect::<Result<_, _>>().ok()?;
    match (head, nums.as_slice()) {
        ("dt+", []) => Some(PhysicsCommand::NudgeDt(1)),
        ("dt-", []) => Some(PhysicsCommand::NudgeDt(-1)),
        ("visc+", []) => Some(PhysicsCommand::ScaleViscosity(VISC_STEP_UP)),
        ("visc-", []) => Some(PhysicsCommand::ScaleViscosity(VISC_STEP_DOWN)),
        ("freeze", []) => Some(PhysicsCommand::ToggleFrozen),
        ("unseed", []) => Some(PhysicsCommand::RemoveLastSeed),
        ("seed", [x, y]) => Some(PhysicsCommand::AddSeed(Seed { x: *x, y: *y, t0: 0 })),
        ("seed", [x, y, t0]) if *t0 >= 0.0 && t0.fract() == 0.0 => {
            Some(PhysicsCommand::AddSeed(Seed { x: *x, y: *y, t0: *t0 as usize }))
        }
        ("push", [x, y, dx, dy]) => Some(PhysicsCommand::Inject {
            x: x.round() as i64,
            y: y.round() as i64,
            dx: *dx,
            dy: *dy,
        }),
        _ => None,
    }
}
