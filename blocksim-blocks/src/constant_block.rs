use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Outputs a fixed value, scalar or vector, regardless of time.
#[derive(Debug, Clone)]
pub struct ConstantBlock {
    value: Signal,
}

impl ConstantBlock {
    pub fn new(value: impl Into<Signal>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Block for ConstantBlock {
    fn type_name(&self) -> &'static str {
        "constant"
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

    fn output(&mut self, _t: f64, _inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        Ok(vec![self.value.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_scalar() {
        let mut block = ConstantBlock::new(3.0);
        let out = block.output(0.0, Inputs::empty()).unwrap();
        assert_eq!(out, vec![Signal::Scalar(3.0)]);

        // time does not matter
        let out = block.output(17.5, Inputs::empty()).unwrap();
        assert_eq!(out, vec![Signal::Scalar(3.0)]);
    }

    #[test]
    fn test_constant_vector() {
        let mut block = ConstantBlock::new(vec![1.0, 2.0]);
        let out = block.output(0.0, Inputs::empty()).unwrap();
        assert_eq!(out, vec![Signal::Vector(vec![1.0, 2.0])]);
    }
}
