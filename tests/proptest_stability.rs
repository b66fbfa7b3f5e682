//! Property-based stability checks: random time steps, viscosities and
//! pointer input must never produce NaN or infinite values.

use proptest::prelude::*;
use smoke_torus::{Simulation, SolverParams};

const GRID: usize = 6;
const STEPS: usize = 400;

fn run(dt: f64, visc: f64, pokes: &[(i64, i64, f64, f64)]) -> Simulation {
    let params = SolverParams { dt, base_visc: visc, ..SolverParams::default() };
    let mut sim = Simulation::with_params(GRID, params).unwrap();
    sim.add_seed(1.0, 2.0, 10);
    for step in 0..STEPS {
        if let Some(&(x, y, dx, dy)) = pokes.get(step % 25) {
            sim.inject_force(x, y, dx, dy);
        }
        sim.advance_step();
    }
    sim
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn fields_stay_finite(
        dt in 0.0f64..=10.0,
        visc in 0.0f64..100.0,
        pokes in prop::collection::vec((-3i64..9, -3i64..9, -2.0f64..2.0, -2.0f64..2.0), 0..6),
    ) {
        let sim = run(dt, visc, &pokes);
        let (u, v) = sim.velocity();
        prop_assert!(u.cells().all(f64::is_finite), "u not finite for dt={} visc={}", dt, visc);
        prop_assert!(v.cells().all(f64::is_finite), "v not finite for dt={} visc={}", dt, visc);
        prop_assert!(sim.density().cells().all(f64::is_finite));
        for tube in sim.streamtubes() {
            prop_assert!(tube.tail.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        }
    }

    #[test]
    fn density_stays_within_emission_bound(
        dt in 0.0f64..=10.0,
        pokes in prop::collection::vec((0i64..6, 0i64..6, -1.0f64..1.0, -1.0f64..1.0), 1..4),
    ) {
        let sim = run(dt, 0.001, &pokes);
        let stats = sim.stats().unwrap();
        prop_assert!(stats.density.min >= 0.0);
        prop_assert!(stats.density.max <= 10.0, "density max {}", stats.density.max);
    }
}
