use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal};

/// Summing junction controlled by a sign string.
///
/// `SumBlock::new("+-")` has two inputs and outputs `u0 - u1`. All inputs
/// must share one width; scalars stay scalar.
#[derive(Debug, Clone)]
pub struct SumBlock {
    signs: String,
}

impl SumBlock {
    pub fn new(signs: &str) -> Self {
        Self {
            signs: String::from(signs),
        }
    }
}

impl Block for SumBlock {
    fn type_name(&self) -> &'static str {
        "sum"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Function
    }

    fn nin(&self) -> usize {
        self.signs.chars().count()
    }

    fn nout(&self) -> usize {
        1
    }

    fn check(&self) -> Result<(), BlockError> {
        if self.signs.is_empty() {
            return Err(BlockError::Constraint(String::from(
                "sign string must not be empty",
            )));
        }
        if let Some(c) = self.signs.chars().find(|c| *c != '+' && *c != '-') {
            return Err(BlockError::Constraint(format!(
                "sign string may only contain `+` and `-`, got `{c}`"
            )));
        }
        Ok(())
    }

    fn output(&mut self, _t: f64, inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let first = inputs.value(0)?;
        let scalar = matches!(first, Signal::Scalar(_));
        let mut acc = vec![0.0; first.len()];

        for (port, sign) in self.signs.chars().enumerate() {
            let term = inputs.value(port)?;
            if term.len() != acc.len() {
                return Err(BlockError::Constraint(format!(
                    "input {port} has width {}, expected {}",
                    term.len(),
                    acc.len()
                )));
            }
            for (a, e) in acc.iter_mut().zip(term.as_slice()) {
                match sign {
                    '-' => *a -= e,
                    _ => *a += e,
                }
            }
        }

        let out = if scalar {
            Signal::Scalar(acc[0])
        } else {
            Signal::Vector(acc)
        };
        Ok(vec![out])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scalar_slots;
    use rstest::rstest;

    #[rstest]
    #[case("++", &[1.0, 2.0], 3.0)]
    #[case("+-", &[1.0, 2.0], -1.0)]
    #[case("--", &[1.0, 2.0], -3.0)]
    #[case("+-+", &[5.0, 2.0, 1.0], 4.0)]
    fn test_sum_signs(#[case] signs: &str, #[case] values: &[f64], #[case] expected: f64) {
        let mut block = SumBlock::new(signs);
        assert_eq!(block.nin(), values.len());
        let slots = scalar_slots(values);
        let out = block.output(0.0, Inputs::new(&slots)).unwrap();
        assert_eq!(out, vec![Signal::Scalar(expected)]);
    }

    #[test]
    fn test_sum_vectors() {
        let mut block = SumBlock::new("+-");
        let slots = vec![
            Some(Signal::Vector(vec![1.0, 2.0])),
            Some(Signal::Vector(vec![0.5, 1.0])),
        ];
        let out = block.output(0.0, Inputs::new(&slots)).unwrap();
        assert_eq!(out, vec![Signal::Vector(vec![0.5, 1.0])]);
    }

    #[test]
    fn test_sum_width_mismatch() {
        let mut block = SumBlock::new("++");
        let slots = vec![
            Some(Signal::Scalar(1.0)),
            Some(Signal::Vector(vec![1.0, 2.0])),
        ];
        assert!(block.output(0.0, Inputs::new(&slots)).is_err());
    }

    #[test]
    fn test_sum_check() {
        assert!(SumBlock::new("+-").check().is_ok());
        assert!(SumBlock::new("").check().is_err());
        assert!(SumBlock::new("+*").check().is_err());
    }
}
