//! Demo driver: builds two diagrams, compiles and runs them, and prints
//! their reports. Exits 0 on success, non-zero on any error.

use anyhow::{Context, Result};
use blocksim_blocks::{
    ConstantBlock, GainBlock, IntegratorBlock, ScopeBlock, SinewaveBlock, SumBlock,
};
use blocksim_engine::{Diagram, Options, logging};
use blocksim_traits::Registry;
use log::info;

fn main() -> Result<()> {
    logging::initialize_logging();
    let options = Options::from_cli();

    let mut registry = Registry::new();
    blocksim_blocks::install(&mut registry);
    info!("{} block variants available:", registry.len());
    for variant in registry.iter() {
        info!("  {:12} [{}] {}", variant.name, variant.kind, variant.summary);
    }

    feedback_demo(&options).context("feedback demo failed")?;
    realtime_demo(&options).context("realtime demo failed")?;
    Ok(())
}

/// First-order feedback loop `x' = 5 (1 - x)`, integrated with forward
/// Euler (the outer integrator is the host's job; a fixed-step one is
/// enough for a demo).
fn feedback_demo(options: &Options) -> Result<()> {
    let mut bd = Diagram::with_options(options.clone().with_name("feedback"))?;
    let reference = bd.add(ConstantBlock::new(1.0));
    let error = bd.add_named("error", SumBlock::new("+-"));
    let gain = bd.add(GainBlock::new(5.0));
    let plant = bd.add_named("plant", IntegratorBlock::new(0.0));
    let scope = bd.add(ScopeBlock::new(1));

    bd.connect(reference, error.port(0))?;
    bd.series(&[error, gain, plant])?;
    bd.connect(plant, error.port(1))?;
    bd.connect(plant, scope)?;

    bd.compile()?;
    println!("{}", bd.report());

    bd.start()?;
    let dt = 1e-3;
    let mut x = bd.gather_state();
    for k in 0..=2_000 {
        let t = k as f64 * dt;
        let deriv = bd.evaluate(&x, t)?;
        bd.step(t)?;
        for (xi, di) in x.iter_mut().zip(&deriv) {
            *xi += dt * di;
        }
    }
    bd.done()?;

    info!("feedback demo settled at x = {:.4} (expected 1.0)", x[0]);
    Ok(())
}

/// Source-only diagram driven by the wall clock for one second.
fn realtime_demo(options: &Options) -> Result<()> {
    let mut bd = Diagram::with_options(options.clone().with_name("realtime"))?;
    let wave = bd.add(SinewaveBlock::new(1.0, 2.0, 0.0, 0.0));
    let scope = bd.add(ScopeBlock::new(1));
    bd.connect(wave, scope)?;

    bd.compile()?;
    bd.run_realtime(Some(1.0))?;
    bd.done()?;

    let samples = bd
        .block_as::<ScopeBlock>(scope)
        .map(|s| s.samples().len())
        .unwrap_or(0);
    println!("{}", bd.report());
    info!("realtime demo recorded {samples} samples");
    Ok(())
}
