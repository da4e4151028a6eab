//! Subsystem machinery: the placeholder block and the inport/outport
//! pseudo-blocks that mark a sub-diagram's boundary.
//!
//! A subsystem block only exists between construction and compilation; the
//! compiler splices its sub-diagram into the parent and removes it, so none
//! of these blocks is ever evaluated.

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Boundary block feeding a sub-diagram's external inputs to its contents.
///
/// Port `p` of the enclosing subsystem block maps to output `p` of the
/// inport; flattening rewires every consumer to the actual external source.
#[derive(Debug, Clone)]
pub struct Inport {
    nout: usize,
}

impl Inport {
    pub fn new(nout: usize) -> Self {
        Self { nout }
    }
}

impl Block for Inport {
    fn type_name(&self) -> &'static str {
        "inport"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Function
    }

    fn nin(&self) -> usize {
        0
    }

    fn nout(&self) -> usize {
        self.nout
    }

    fn output(&mut self, _t: f64, _inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        Err(BlockError::Unsupported(
            "inport values come from the enclosing diagram",
        ))
    }
}

/// Boundary block collecting a sub-diagram's external outputs.
///
/// Input `p` of the outport maps to output `p` of the enclosing subsystem
/// block.
#[derive(Debug, Clone)]
pub struct Outport {
    nin: usize,
}

impl Outport {
    pub fn new(nin: usize) -> Self {
        Self { nin }
    }
}

impl Block for Outport {
    fn type_name(&self) -> &'static str {
        "outport"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Function
    }

    fn nin(&self) -> usize {
        self.nin
    }

    fn nout(&self) -> usize {
        0
    }
}

/// Placeholder standing for an embedded sub-diagram until flattening.
///
/// Created through `Diagram::add_subsystem`, which derives the arities from
/// the sub-diagram's inport and outport blocks.
#[derive(Debug, Clone)]
pub struct Subsystem {
    nin: usize,
    nout: usize,
}

impl Subsystem {
    pub(crate) fn new(nin: usize, nout: usize) -> Self {
        Self { nin, nout }
    }
}

impl Block for Subsystem {
    fn type_name(&self) -> &'static str {
        "subsystem"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Subsystem
    }

    fn nin(&self) -> usize {
        self.nin
    }

    fn nout(&self) -> usize {
        self.nout
    }

    fn output(&mut self, _t: f64, _inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        Err(BlockError::Unsupported(
            "subsystem blocks are flattened away before evaluation",
        ))
    }
}
