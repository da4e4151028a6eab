use alloc::string::String;
use thiserror::Error;

/// Errors raised from within a block's own hooks.
///
/// The engine attaches the block identity when it surfaces one of these to
/// the caller.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlockError {
    /// A block must have at least one port.
    #[error("block declares no inputs or outputs")]
    NoPorts,

    /// A block-local parameter or shape constraint failed.
    #[error("{0}")]
    Constraint(String),

    /// An input slot was read before a wire delivered a value to it.
    #[error("input {0} is undefined")]
    UndefinedInput(usize),

    /// An input held a value of the wrong shape.
    #[error("input {port} is not a {expected} value")]
    InputType { port: usize, expected: &'static str },

    /// An input port index beyond the block's arity was accessed.
    #[error("input port {port} is out of range (block has {nin} inputs)")]
    InputRange { port: usize, nin: usize },

    /// The hook is not meaningful for this block.
    #[error("{0}")]
    Unsupported(&'static str),
}
