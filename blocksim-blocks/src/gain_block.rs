use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Scales the input by a constant gain, elementwise for vector signals.
#[derive(Debug, Clone)]
pub struct GainBlock {
    gain: f64,
}

impl GainBlock {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }
}

impl Block for GainBlock {
    fn type_name(&self) -> &'static str {
        "gain"
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
            Signal::Scalar(v) => Signal::Scalar(self.gain * v),
            Signal::Vector(v) => Signal::Vector(v.iter().map(|e| self.gain * e).collect()),
        };
        Ok(vec![out])
    }
}
