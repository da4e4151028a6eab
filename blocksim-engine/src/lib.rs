//! Execution core of a block-diagram dynamic-systems simulator.
//!
//! A [`Diagram`] is built from blocks and wires, compiled (subsystem
//! flattening, validation, algebraic-loop detection, state inventory), and
//! then evaluated: given a state vector and a time, the engine distributes
//! state to the transfer blocks, propagates values through the graph in
//! dependency order, and returns the state derivative for an outer
//! integrator to consume. Stateless diagrams can instead be driven by wall
//! clock through the realtime loop.

pub mod diagram;
pub use diagram::{Diagram, Phase};

mod compile;
mod eval;
mod report;

pub mod error;
pub use error::DiagramError;

pub mod logging;

pub mod options;
pub use options::{DebugFlags, Options, OptionsError};

pub mod plug;
pub use plug::{BlockId, Plug, PortSel};

pub mod subsystem;
pub use subsystem::{Inport, Outport, Subsystem};

pub mod wire;
pub use wire::{Endpoint, Wire, WireId};
