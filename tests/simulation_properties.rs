//! End-to-end checks of the simulation through its public API.

use smoke_torus::solver::diagnostics::divergence_into;
use smoke_torus::{Field, ScalarDataset, Simulation, SolverParams};

fn params(dt: f64, base_visc: f64) -> SolverParams {
    SolverParams { dt, base_visc, ..SolverParams::default() }
}

fn all_finite(sim: &Simulation) -> bool {
    let (u, v) = sim.velocity();
    u.cells().chain(v.cells()).chain(sim.density().cells()).all(f64::is_finite)
}

#[test]
fn density_never_grows_without_forcing() {
    let mut sim = Simulation::new(12).unwrap();
    {
        let rho = sim.density_mut();
        rho.set(3, 4, 10.0);
        rho.set(11, 0, 4.0);
        rho.set(0, 11, 1.0);
    }
    {
        // A swirl to move the smoke around while no force is applied.
        let (u, v) = sim.velocity_mut();
        u.set(5, 5, 0.02);
        v.set(6, 5, -0.03);
    }
    let mut total = sim.density().sum();
    for step in 0..100 {
        sim.advance_step();
        let next = sim.density().sum();
        assert!(next <= total + 1e-12, "step {}: density grew {} -> {}", step, total, next);
        total = next;
    }
    assert!(total < 15.0 * 0.995f64.powi(99));
}

#[test]
fn uniform_fields_stay_uniform() {
    let n = 10;
    let mut sim = Simulation::with_params(n, params(0.7, 0.01)).unwrap();
    {
        let (u, v) = sim.velocity_mut();
        u.fill(0.05);
        v.fill(0.11);
    }
    sim.density_mut().fill(2.0);
    for _ in 0..5 {
        sim.advance_step();
    }
    let rho = 2.0 * 0.995f64.powi(5);
    let (u, v) = sim.velocity();
    for y in 0..n {
        for x in 0..n {
            assert!((u.get(x, y) - 0.05).abs() < 1e-12, "u({}, {}) = {}", x, y, u.get(x, y));
            assert!((v.get(x, y) - 0.11).abs() < 1e-12, "v({}, {}) = {}", x, y, v.get(x, y));
            assert!((sim.density().get(x, y) - rho).abs() < 1e-12);
        }
    }
}

#[test]
fn edge_injection_wraps_across_the_boundary() {
    let n = 8;
    let mut sim = Simulation::with_params(n, params(0.4, 0.0)).unwrap();
    sim.inject_force(n as i64 - 1, 3, 1.0, 0.0);
    sim.advance_step();
    let (u, _) = sim.velocity();
    // The projected flow spreads into the opposite edge as much as into its interior neighbour.
    let across = u.get(0, 3);
    let inside = u.get(n - 2, 3);
    assert!(across.abs() > 0.0);
    assert!((across - inside).abs() < 1e-12, "across {} inside {}", across, inside);
}

#[test]
fn stable_for_extreme_parameters() {
    for (dt, visc) in [(10.0, 0.0), (10.0, 1e6), (0.0, 1e6), (3.3, 0.5)] {
        let mut sim = Simulation::with_params(6, params(dt, visc)).unwrap();
        for step in 0..10_000u64 {
            if step % 37 == 0 {
                let c = (step / 37) as i64;
                sim.inject_force(c % 6, (c * 5) % 6, 1.0, -0.5);
            }
            sim.advance_step();
        }
        assert!(all_finite(&sim), "dt={} visc={} produced non-finite values", dt, visc);
        let stats = sim.stats().unwrap();
        assert!(stats.velocity.max.is_finite());
    }
}

#[test]
fn projection_reduces_divergence() {
    let n = 16;
    let mut sim = Simulation::new(n).unwrap();
    sim.inject_force(4, 9, 1.0, 0.0);
    sim.inject_force(5, 9, 0.0, 1.0);
    sim.inject_force(12, 2, -1.0, 1.0);

    let p = sim.params.clone();
    let (fx, fy) = sim.force();
    let mut raw_u = Field::dense(n, "raw u").unwrap();
    let mut raw_v = Field::dense(n, "raw v").unwrap();
    raw_u.scale_from(fx, p.force_decay * p.dt);
    raw_v.scale_from(fy, p.force_decay * p.dt);
    let mut out = vec![0.0; n * n];
    let before = divergence_into(&mut out, &raw_u, &raw_v).max_abs();

    sim.advance_step();
    let after = sim.stats().unwrap().divergence.max_abs();
    assert!(after < before, "before {} after {}", before, after);

    let (_, range) = sim.scalar_values(ScalarDataset::VelocityDivergence);
    assert_eq!(range.max_abs(), after);
}

#[test]
fn history_keeps_the_last_fifty_steps() {
    let mut sim = Simulation::new(8).unwrap();
    sim.inject_force(2, 2, 1.0, 1.0);
    for _ in 0..200 {
        sim.advance_step();
    }
    let history = sim.history();
    assert_eq!(history.len(), 50);
    let newest = history.newest().unwrap().step;
    let oldest = history.oldest().unwrap().step;
    assert_eq!(newest, 200);
    // Steps 151..=200 are retained.
    assert_eq!(oldest, 151);
    assert_eq!(newest - oldest + 1, 50);
}

#[test]
fn single_injection_scenario() {
    let mut sim = Simulation::with_params(4, params(0.1, 0.0)).unwrap();
    sim.inject_force(1, 1, 1.0, 0.0);
    assert_eq!(sim.density().get(1, 1), 10.0);
    sim.advance_step();

    let rho = sim.density().get(1, 1);
    assert!(rho > 9.0 && rho <= 10.0, "rho(1,1) = {}", rho);

    let (u, v) = sim.velocity();
    let (ux, vy) = (u.get(1, 1), v.get(1, 1));
    assert!(ux > 0.0, "u(1,1) = {}", ux);
    assert!(ux.abs() > vy.abs(), "u={} v={}", ux, vy);

    let stats = sim.stats().unwrap();
    assert!((stats.velocity.max - ux.hypot(vy)).abs() < 1e-15);
}

#[test]
fn seed_with_empty_history_scenario() {
    let mut sim = Simulation::new(8).unwrap();
    sim.add_seed(0.0, 0.0, 0);
    let tubes = sim.streamtubes();
    assert_eq!(tubes.len(), 1);
    assert!(tubes[0].tail.len() <= 1);

    sim.advance_step();
    sim.advance_step();
    assert_eq!(sim.streamtubes()[0].tail.len(), 1);
}
