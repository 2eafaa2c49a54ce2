use std::time::Instant;

use crate::simulation::engine::{Engine, EngineError};
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodyVariant, NVec2};

/// Helper to build an engine holding `n` bodies, every fourth one a rod
fn make_engine(n: usize, p: &Parameters) -> Result<Engine, EngineError> {
    let mut engine = Engine::new();

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec2::new(
            (0.5 + 0.45 * (i_f * 0.37).sin()) * p.canvas_width,
            (0.5 + 0.45 * (i_f * 0.13).cos()) * p.canvas_height,
        );
        let variant = if i % 4 == 0 {
            BodyVariant::Rod { length: 20.0, angle: i_f * 0.7 }
        } else {
            BodyVariant::Point
        };
        engine.add_body(variant, x, p.min_mass)?;
    }
    Ok(engine)
}

/// Wall-clock cost of one full tick (clustering + forces + integration)
/// Paste output directly into excel to graph
pub fn bench_tick() -> Result<(), EngineError> {
    let ns = [100, 200, 400, 800, 1600, 3200];
    let params = Parameters::default();

    println!("N,ms_per_tick,clusters");

    for n in ns {
        // Small n: average over more ticks to smooth noise
        let steps = if n <= 400 { 20 } else { 3 };
        let mut engine = make_engine(n, &params)?;

        // Warm up
        engine.tick(&params);

        let t0 = Instant::now();
        for _ in 0..steps {
            engine.tick(&params);
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6},{}", n, ms, engine.cluster_count());
    }
    Ok(())
}
