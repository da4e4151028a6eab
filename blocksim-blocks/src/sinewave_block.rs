use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Outputs a sinewave signal with specified amplitude, frequency, phase, and bias.
#[derive(Debug, Clone)]
pub struct SinewaveBlock {
    amplitude: f64,
    frequency: f64,
    phase: f64,
    bias: f64,
}

impl SinewaveBlock {
    pub fn new(amplitude: f64, frequency: f64, phase: f64, bias: f64) -> Self {
        Self {
            amplitude,
            frequency,
            phase,
            bias,
        }
    }
}

impl Block for SinewaveBlock {
    fn type_name(&self) -> &'static str {
        "sinewave"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Source
    }

    fn nin(&self) -> usize {
        0
    }

    fn nout(&self) -> usize {
        1
    }

    fn output(&mut self, t: f64, _inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let sin_val =
            self.amplitude * num_traits::Float::sin(self.frequency * t + self.phase) + self.bias;
        Ok(vec![Signal::Scalar(sin_val)])
    }
}
