//! This crate defines the core contract that every blocksim block satisfies.
//!
//! A block is a node in a block diagram with fixed input and output arities,
//! one of five scheduling kinds, and (for transfer blocks) a continuous state
//! vector. The engine holds blocks as `Box<dyn Block>` trait objects and owns
//! all per-evaluation bookkeeping (received input values, completion flags,
//! port-to-wire tables), so block implementations stay value-like: they carry
//! their parameters and, for transfer blocks, their state, nothing else.
//!
//! During an evaluation the engine calls `output(t)` on a block once every
//! one of its inputs is defined (sources and transfer blocks are evaluated
//! unconditionally, their outputs depend only on time and state). Sink blocks
//! are instead driven through `step` after a whole propagation cycle has
//! settled. Transfer blocks additionally expose the [`Transfer`] extension
//! trait so the engine can scatter the global state vector into them and
//! gather their state derivative back out.
//!
//! The kind tag is a closed enum used for scheduling decisions; it is not a
//! substitute for virtual dispatch. A block's hooks may fail with
//! [`BlockError`]; the engine wraps those into its own error type together
//! with the block identity.

#![no_std]

extern crate alloc;

use alloc::{string::String, vec::Vec};
use core::any::Any;

mod error;
pub use error::BlockError;

mod signal;
pub use signal::Signal;

pub mod registry;
pub use registry::{Registry, VariantSpec};

/// Scheduling class of a block.
///
/// Source and transfer blocks seed value propagation; function and subsystem
/// blocks are evaluated as soon as their inputs complete; sink blocks are
/// driven by `step` after propagation. Transfer blocks are the only kind
/// carrying continuous state, and together with sources and sinks they break
/// algebraic dependency cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BlockKind {
    Source,
    Sink,
    Function,
    Transfer,
    Subsystem,
}

/// Read access to the values most recently received on a block's input ports.
///
/// Slots are `None` until a wire has delivered a value during the current
/// evaluation cycle. The engine only invokes `output` on function-class
/// blocks once every slot is filled, so accessors returning
/// [`BlockError::UndefinedInput`] indicate a scheduling bug rather than an
/// expected condition.
#[derive(Clone, Copy)]
pub struct Inputs<'a> {
    slots: &'a [Option<Signal>],
}

impl<'a> Inputs<'a> {
    pub fn new(slots: &'a [Option<Signal>]) -> Self {
        Self { slots }
    }

    /// An input set with no ports, for source blocks.
    pub const fn empty() -> Inputs<'static> {
        Inputs { slots: &[] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True once every slot holds a value.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The signal on `port`, if one has arrived.
    pub fn value(&self, port: usize) -> Result<&'a Signal, BlockError> {
        match self.slots.get(port) {
            Some(Some(signal)) => Ok(signal),
            Some(None) => Err(BlockError::UndefinedInput(port)),
            None => Err(BlockError::InputRange {
                port,
                nin: self.slots.len(),
            }),
        }
    }

    /// The signal on `port` as a scalar.
    pub fn scalar(&self, port: usize) -> Result<f64, BlockError> {
        self.value(port)?
            .scalar()
            .ok_or(BlockError::InputType {
                port,
                expected: "scalar",
            })
    }

    /// The signal on `port` as a flat slice (scalars have width 1).
    pub fn vector(&self, port: usize) -> Result<&'a [f64], BlockError> {
        Ok(self.value(port)?.as_slice())
    }
}

/// The contract every block satisfies.
///
/// `check`, `start`, `reset`, `output`, `step` and `done` are the lifecycle
/// hooks; arities and the kind tag are fixed for the lifetime of the block.
/// `output` must return exactly `nout` signals and is only meaningful for
/// source, function, transfer and subsystem kinds; `step` is the sink-side
/// hook, invoked once per settled evaluation cycle.
pub trait Block: Any {
    /// Short lower-case type tag, e.g. `"gain"`. Used for default block
    /// names (`"gain.0"`, `"gain.1"`, ...) and factory-name derivation.
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> BlockKind;

    fn nin(&self) -> usize;

    fn nout(&self) -> usize;

    fn nstates(&self) -> usize {
        0
    }

    /// Optional input port labels; length must equal `nin` when present.
    fn inport_names(&self) -> Option<Vec<String>> {
        None
    }

    /// Optional output port labels; length must equal `nout` when present.
    fn outport_names(&self) -> Option<Vec<String>> {
        None
    }

    /// Optional state labels; length must equal `nstates` when present.
    fn state_names(&self) -> Option<Vec<String>> {
        None
    }

    /// Block-local parameter validation, run once at compile time.
    fn check(&self) -> Result<(), BlockError> {
        Ok(())
    }

    /// Called when a simulation run begins. Must be safe to call again on a
    /// later run.
    fn start(&mut self) -> Result<(), BlockError> {
        Ok(())
    }

    /// Called at the start of every evaluation cycle. Transfer blocks
    /// restore their current state to the initial state here.
    fn reset(&mut self) {}

    /// Compute the output signals at time `t`. For function, transfer and
    /// subsystem kinds every input is defined by the time this is called.
    fn output(&mut self, t: f64, inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let _ = (t, inputs);
        Ok(Vec::new())
    }

    /// Sink-side hook, invoked once per completed evaluation cycle after all
    /// outputs have settled.
    fn step(&mut self, t: f64, inputs: Inputs<'_>) -> Result<(), BlockError> {
        let _ = (t, inputs);
        Ok(())
    }

    /// Called when a simulation run ends.
    fn done(&mut self) -> Result<(), BlockError> {
        Ok(())
    }

    /// Access to the transfer operations; `Some` exactly for transfer-kind
    /// blocks.
    fn transfer(&self) -> Option<&dyn Transfer> {
        None
    }

    fn transfer_mut(&mut self) -> Option<&mut dyn Transfer> {
        None
    }

    /// Polled after each `step` cycle; a `true` return asks the enclosing
    /// run loop to stop.
    fn wants_stop(&self) -> bool {
        false
    }
}

/// Extension operations of transfer (stateful) blocks.
pub trait Transfer {
    /// Load the block's current state from its window of the global state
    /// vector. `x` has exactly `nstates` elements; the engine does the
    /// splitting.
    fn set_state(&mut self, x: &[f64]);

    /// The current state, `nstates` elements. Freshly constructed and reset
    /// blocks report their initial state here.
    fn state(&self) -> &[f64];

    /// The state derivative given the current state and inputs. Only called
    /// once every input is defined.
    fn deriv(&self, inputs: Inputs<'_>) -> Result<Vec<f64>, BlockError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_kind_display() {
        assert_eq!(alloc::format!("{}", BlockKind::Source), "source");
        assert_eq!(alloc::format!("{}", BlockKind::Transfer), "transfer");
    }

    #[test]
    fn test_inputs_accessors() {
        let slots = vec![
            Some(Signal::Scalar(2.5)),
            None,
            Some(Signal::Vector(vec![1.0, 2.0])),
        ];
        let inputs = Inputs::new(&slots);

        assert_eq!(inputs.len(), 3);
        assert!(!inputs.is_complete());
        assert_eq!(inputs.scalar(0), Ok(2.5));
        assert_eq!(inputs.value(1), Err(BlockError::UndefinedInput(1)));
        assert_eq!(inputs.vector(2), Ok(&[1.0, 2.0][..]));
        assert_eq!(
            inputs.scalar(2),
            Err(BlockError::InputType {
                port: 2,
                expected: "scalar"
            })
        );
        assert_eq!(
            inputs.value(3),
            Err(BlockError::InputRange { port: 3, nin: 3 })
        );
    }

    #[test]
    fn test_empty_inputs_complete() {
        assert!(Inputs::empty().is_complete());
        assert!(Inputs::empty().is_empty());
    }
}
