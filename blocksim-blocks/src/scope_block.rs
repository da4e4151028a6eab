use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};
use log::info;

/// Records `(t, inputs)` samples once per settled evaluation cycle.
///
/// The graphics side of the original scope is out of scope here; recorded
/// samples are available to the host through [`ScopeBlock::samples`] and a
/// summary is logged on `done`.
#[derive(Debug, Clone, Default)]
pub struct ScopeBlock {
    nin: usize,
    samples: Vec<(f64, Vec<Signal>)>,
}

impl ScopeBlock {
    pub fn new(nin: usize) -> Self {
        Self {
            nin,
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[(f64, Vec<Signal>)] {
        &self.samples
    }

    pub fn last(&self) -> Option<&(f64, Vec<Signal>)> {
        self.samples.last()
    }
}

impl Block for ScopeBlock {
    fn type_name(&self) -> &'static str {
        "scope"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Sink
    }

    fn nin(&self) -> usize {
        self.nin
    }

    fn nout(&self) -> usize {
        0
    }

    fn check(&self) -> Result<(), BlockError> {
        if self.nin == 0 {
            return Err(BlockError::NoPorts);
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), BlockError> {
        self.samples.clear();
        Ok(())
    }

    fn step(&mut self, t: f64, inputs: Inputs<'_>) -> Result<(), BlockError> {
        let values = (0..self.nin)
            .map(|port| inputs.value(port).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        self.samples.push((t, values));
        Ok(())
    }

    fn done(&mut self) -> Result<(), BlockError> {
        info!("scope recorded {} samples", self.samples.len());
        Ok(())
    }
}
