//! Structured errors of diagram construction, compilation and evaluation.

use blocksim_traits::BlockError;
use thiserror::Error;

use crate::diagram::Phase;

/// Everything that can go wrong while building, compiling or evaluating a
/// diagram.
///
/// Construction errors leave the diagram as it was before the offending
/// call. Compilation errors leave the (possibly partially flattened) block
/// and wire lists behind with the diagram still uncompiled; evaluation
/// errors propagate to the caller, who decides whether to retry.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// A block's self-check or arity constraint failed.
    #[error("block `{name}` failed its self-check: {source}")]
    BlockCheck { name: String, source: BlockError },

    /// Subsystem inport/outport topology is invalid.
    #[error(
        "subsystem `{name}` must contain one inport and/or one outport \
         (found {inports} inports, {outports} outports)"
    )]
    SubsystemShape {
        name: String,
        inports: usize,
        outports: usize,
    },

    /// A nested compilation failed.
    #[error("subsystem `{name}` failed to compile: {source}")]
    SubsystemCompile {
        name: String,
        source: Box<DiagramError>,
    },

    /// Two blocks share a resolved name after flattening.
    #[error("duplicate block name `{0}`")]
    DuplicateName(String),

    /// A declared state-name list disagrees with the block's state count.
    #[error("block `{name}` declares {declared} state names for {nstates} states")]
    StateNames {
        name: String,
        declared: usize,
        nstates: usize,
    },

    /// A wire references a port beyond the block's arity.
    #[error(
        "wire {wire} references {side} port {port} of block `{name}`, \
         which has {arity} {side} ports"
    )]
    PortOutOfRange {
        wire: usize,
        name: String,
        port: usize,
        side: &'static str,
        arity: usize,
    },

    /// More than one wire ends at the same input port.
    #[error("input {port} of block `{name}` is driven by more than one wire")]
    DoubleDriver { name: String, port: usize },

    /// An input port has no driver after compilation.
    #[error("input {port} of block `{name}` is not connected")]
    Unconnected { name: String, port: usize },

    /// A cycle of function blocks with no state break.
    #[error("algebraic loop with no dynamics: {}", .path.join(" -> "))]
    AlgebraicLoop { path: Vec<String> },

    /// Slice-to-slice or slice-to-block widths disagree at construction.
    #[error("cannot bundle {src} source ports into {dst} sink ports")]
    BundleWidth { src: usize, dst: usize },

    /// A block was still missing inputs after propagation settled.
    #[error("block `{0}` has incomplete inputs")]
    IncompleteInputs(String),

    /// A block produced NaN or infinity with the finite check enabled.
    #[error("output of block `{0}` is not finite")]
    NonFinite(String),

    /// The initial evaluation during compilation failed.
    #[error("initial evaluation at t = 0 failed: {0}")]
    EvaluationDryRun(#[source] Box<DiagramError>),

    /// Realtime mode was requested for a diagram with continuous state.
    #[error("realtime mode cannot drive stateful diagrams (`{0}` has continuous state)")]
    TransferInRealtime(String),

    /// A block returned the wrong number of outputs.
    #[error("block `{name}` returned {got} outputs, expected {want}")]
    OutputArity {
        name: String,
        got: usize,
        want: usize,
    },

    /// The state vector handed to `evaluate` (or gathered from `deriv`) has
    /// the wrong total width.
    #[error("state vector has {got} elements, diagram has {want} states")]
    StateSize { got: usize, want: usize },

    /// A block hook failed during evaluation.
    #[error("block `{name}` raised: {source}")]
    Block { name: String, source: BlockError },

    /// An operation was invoked in the wrong lifecycle phase.
    #[error("`{op}` is not valid while the diagram is {phase}")]
    Phase { op: &'static str, phase: Phase },
}
