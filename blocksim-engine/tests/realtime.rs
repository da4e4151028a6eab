//! Wall-clock driven execution of source-only diagrams.

use blocksim_blocks::{ConstantBlock, IntegratorBlock, ScopeBlock, SinewaveBlock, StopBlock};
use blocksim_engine::{Diagram, DiagramError};

#[test]
fn realtime_rejects_stateful_diagrams() {
    let mut bd = Diagram::new("stateful");
    let c = bd.add(ConstantBlock::new(1.0));
    let plant = bd.add_named("plant", IntegratorBlock::new(0.0));
    bd.connect(c, plant).unwrap();
    bd.compile().unwrap();

    let err = bd.run_realtime(Some(0.1)).unwrap_err();
    assert!(matches!(
        err,
        DiagramError::TransferInRealtime(name) if name == "plant"
    ));
}

#[test]
fn realtime_runs_until_the_time_cap() {
    let mut bd = Diagram::new("wave");
    let wave = bd.add(SinewaveBlock::new(1.0, 10.0, 0.0, 0.0));
    let scope = bd.add(ScopeBlock::new(1));
    bd.connect(wave, scope).unwrap();
    bd.compile().unwrap();

    bd.run_realtime(Some(0.05)).unwrap();
    bd.done().unwrap();

    let scope = bd.block_as::<ScopeBlock>(scope).unwrap();
    assert!(!scope.samples().is_empty());
    // samples carry monotonically increasing wall-clock times
    let times: Vec<f64> = scope.samples().iter().map(|(t, _)| *t).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert!(bd.stop_requested().is_none());
}

#[test]
fn stop_block_halts_the_run() {
    let mut bd = Diagram::new("halt");
    let trigger = bd.add(ConstantBlock::new(1.0));
    let stop = bd.add(StopBlock::new());
    bd.connect(trigger, stop).unwrap();
    bd.compile().unwrap();

    // the first cycle already requests a stop; the loop must terminate well
    // before any time cap
    bd.run_realtime(Some(10.0)).unwrap();
    assert_eq!(bd.stop_requested(), Some(stop));
}
