use alloc::format;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Splits a vector input into one scalar output per element.
#[derive(Debug, Clone)]
pub struct DemuxBlock {
    nout: usize,
}

impl DemuxBlock {
    pub fn new(nout: usize) -> Self {
        Self { nout }
    }
}

impl Block for DemuxBlock {
    fn type_name(&self) -> &'static str {
        "demux"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Function
    }

    fn nin(&self) -> usize {
        1
    }

    fn nout(&self) -> usize {
        self.nout
    }

    fn check(&self) -> Result<(), BlockError> {
        if self.nout == 0 {
            return Err(BlockError::Constraint(alloc::string::String::from(
                "demux must have at least one output",
            )));
        }
        Ok(())
    }

    fn output(&mut self, _t: f64, inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let elements = inputs.vector(0)?;
        if elements.len() != self.nout {
            return Err(BlockError::Constraint(format!(
                "input has width {}, demux has {} outputs",
                elements.len(),
                self.nout
            )));
        }
        Ok(elements.iter().map(|e| Signal::Scalar(*e)).collect())
    }
}
