use blocksim_traits::{Block, BlockError, BlockKind, Inputs};

/// Requests a stop of the enclosing run loop when its input is truthy
/// (any non-zero element).
#[derive(Debug, Clone, Default)]
pub struct StopBlock {
    requested: bool,
}

impl StopBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for StopBlock {
    fn type_name(&self) -> &'static str {
        "stop"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Sink
    }

    fn nin(&self) -> usize {
        1
    }

    fn nout(&self) -> usize {
        0
    }

    fn start(&mut self) -> Result<(), BlockError> {
        self.requested = false;
        Ok(())
    }

    fn step(&mut self, _t: f64, inputs: Inputs<'_>) -> Result<(), BlockError> {
        if inputs.value(0)?.is_truthy() {
            self.requested = true;
        }
        Ok(())
    }

    fn wants_stop(&self) -> bool {
        self.requested
    }
}
