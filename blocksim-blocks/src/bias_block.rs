use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Adds a constant offset to the input, elementwise for vector signals.
#[derive(Debug, Clone)]
pub struct BiasBlock {
    bias: f64,
}

impl BiasBlock {
    pub fn new(bias: f64) -> Self {
        Self { bias }
    }
}

impl Block for BiasBlock {
    fn type_name(&self) -> &'static str {
        "bias"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Function
    }

    fn nin(&self) -> usize {
        1
    }

    fn nout(&self) -> usize {
        1
    }

    fn output(&mut self, _t: f64, inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let out = match inputs.value(0)? {
            Signal::Scalar(v) => Signal::Scalar(v + self.bias),
            Signal::Vector(v) => Signal::Vector(v.iter().map(|e| e + self.bias).collect()),
        };
        Ok(vec![out])
    }
}
