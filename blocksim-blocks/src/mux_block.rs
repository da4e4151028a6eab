use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Bundles its inputs into a single vector signal, concatenating in port
/// order.
#[derive(Debug, Clone)]
pub struct MuxBlock {
    nin: usize,
}

impl MuxBlock {
    pub fn new(nin: usize) -> Self {
        Self { nin }
    }
}

impl Block for MuxBlock {
    fn type_name(&self) -> &'static str {
        "mux"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Function
    }

    fn nin(&self) -> usize {
        self.nin
    }

    fn nout(&self) -> usize {
        1
    }

    fn check(&self) -> Result<(), BlockError> {
        if self.nin == 0 {
            return Err(BlockError::NoPorts);
        }
        Ok(())
    }

    fn output(&mut self, _t: f64, inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let mut bundle = Vec::new();
        for port in 0..self.nin {
            bundle.extend_from_slice(inputs.vector(port)?);
        }
        Ok(vec![Signal::Vector(bundle)])
    }
}
