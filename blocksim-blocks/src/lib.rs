//! The built-in blocksim block library.
//!
//! One module per block. Sources (`constant`, `sinewave`, `ramp`) seed value
//! propagation, functions (`gain`, `sum`, `bias`, `mux`, `demux`) map inputs
//! to outputs, transfer blocks (`integrator`, `state_space`) carry continuous
//! state, and sinks (`scope`, `stop`) consume settled values once per cycle.
#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

extern crate alloc;

use blocksim_traits::{BlockKind, Registry};

mod constant_block;
pub use constant_block::ConstantBlock;

mod sinewave_block;
pub use sinewave_block::SinewaveBlock;

mod ramp_block;
pub use ramp_block::RampBlock;

mod gain_block;
pub use gain_block::GainBlock;

mod sum_block;
pub use sum_block::SumBlock;

mod bias_block;
pub use bias_block::BiasBlock;

mod mux_block;
pub use mux_block::MuxBlock;

mod demux_block;
pub use demux_block::DemuxBlock;

mod integrator_block;
pub use integrator_block::IntegratorBlock;

mod state_space_block;
pub use state_space_block::StateSpaceBlock;

mod scope_block;
pub use scope_block::ScopeBlock;

mod stop_block;
pub use stop_block::StopBlock;

#[cfg(test)]
mod testing;

/// Register every built-in variant, in library load order.
pub fn install(registry: &mut Registry) {
    registry.register("constant", BlockKind::Source, "emit a fixed value");
    registry.register("sinewave", BlockKind::Source, "sinusoidal signal");
    registry.register("ramp", BlockKind::Source, "linear ramp from a start time");
    registry.register("gain", BlockKind::Function, "scale the input");
    registry.register("sum", BlockKind::Function, "signed summing junction");
    registry.register("bias", BlockKind::Function, "offset the input");
    registry.register("mux", BlockKind::Function, "bundle inputs into a vector");
    registry.register("demux", BlockKind::Function, "split a vector into scalars");
    registry.register("integrator", BlockKind::Transfer, "integrate the input");
    registry.register("state_space", BlockKind::Transfer, "linear state-space system");
    registry.register("scope", BlockKind::Sink, "record input samples");
    registry.register("stop", BlockKind::Sink, "stop the run on a truthy input");
}
