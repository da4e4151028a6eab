use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Outputs a signal that ramps up linearly from a specified start time at a
/// specified rate.
#[derive(Debug, Clone)]
pub struct RampBlock {
    start_time: f64,
    rate: f64,
}

impl RampBlock {
    pub fn new(start_time: f64, rate: f64) -> Self {
        Self { start_time, rate }
    }
}

impl Block for RampBlock {
    fn type_name(&self) -> &'static str {
        "ramp"
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
        let ramp_val = self.rate * num_traits::Float::max(t - self.start_time, 0.0);
        Ok(vec![Signal::Scalar(ramp_val)])
    }
}
