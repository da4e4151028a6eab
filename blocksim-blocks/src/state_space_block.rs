use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal, Transfer};
use nalgebra::{DMatrix, DVector};

/// Linear time-invariant system in state-space form:
/// `x' = A x + B u`, `y = C x`.
///
/// There is no direct-feedthrough term: the output depends only on the
/// state, which is what lets this block break algebraic loops.
#[derive(Debug, Clone)]
pub struct StateSpaceBlock {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    c: DMatrix<f64>,
    x0: DVector<f64>,
    x: DVector<f64>,
}

impl StateSpaceBlock {
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>, c: DMatrix<f64>) -> Self {
        let x0 = DVector::zeros(a.nrows());
        Self {
            a,
            b,
            c,
            x: x0.clone(),
            x0,
        }
    }

    pub fn with_initial(mut self, x0: &[f64]) -> Self {
        self.x0 = DVector::from_column_slice(x0);
        self.x = self.x0.clone();
        self
    }

    fn output_signal(&self) -> Signal {
        let y = &self.c * &self.x;
        if y.len() == 1 {
            Signal::Scalar(y[0])
        } else {
            Signal::Vector(y.as_slice().to_vec())
        }
    }
}

impl Block for StateSpaceBlock {
    fn type_name(&self) -> &'static str {
        "state_space"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Transfer
    }

    fn nin(&self) -> usize {
        1
    }

    fn nout(&self) -> usize {
        1
    }

    fn nstates(&self) -> usize {
        self.a.nrows()
    }

    fn check(&self) -> Result<(), BlockError> {
        let n = self.a.nrows();
        if n == 0 {
            return Err(BlockError::Constraint(String::from(
                "A matrix must not be empty",
            )));
        }
        if self.a.ncols() != n {
            return Err(BlockError::Constraint(format!(
                "A matrix must be square, got {}x{}",
                n,
                self.a.ncols()
            )));
        }
        if self.b.nrows() != n {
            return Err(BlockError::Constraint(format!(
                "B matrix has {} rows, expected {n}",
                self.b.nrows()
            )));
        }
        if self.c.ncols() != n {
            return Err(BlockError::Constraint(format!(
                "C matrix has {} columns, expected {n}",
                self.c.ncols()
            )));
        }
        if self.x0.len() != n {
            return Err(BlockError::Constraint(format!(
                "initial state has {} elements, expected {n}",
                self.x0.len()
            )));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.x = self.x0.clone();
    }

    fn output(&mut self, _t: f64, _inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        Ok(vec![self.output_signal()])
    }

    fn transfer(&self) -> Option<&dyn Transfer> {
        Some(self)
    }

    fn transfer_mut(&mut self) -> Option<&mut dyn Transfer> {
        Some(self)
    }
}

impl Transfer for StateSpaceBlock {
    fn set_state(&mut self, x: &[f64]) {
        self.x = DVector::from_column_slice(x);
    }

    fn state(&self) -> &[f64] {
        self.x.as_slice()
    }

    fn deriv(&self, inputs: Inputs<'_>) -> Result<Vec<f64>, BlockError> {
        let u = inputs.vector(0)?;
        if u.len() != self.b.ncols() {
            return Err(BlockError::Constraint(format!(
                "input has width {}, B matrix has {} columns",
                u.len(),
                self.b.ncols()
            )));
        }
        let u = DVector::from_column_slice(u);
        let xdot = &self.a * &self.x + &self.b * u;
        Ok(xdot.as_slice().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scalar_slots;
    use approx::assert_relative_eq;

    // First-order lag: x' = -x + u, y = x
    fn lag() -> StateSpaceBlock {
        StateSpaceBlock::new(
            DMatrix::from_row_slice(1, 1, &[-1.0]),
            DMatrix::from_row_slice(1, 1, &[1.0]),
            DMatrix::from_row_slice(1, 1, &[1.0]),
        )
    }

    #[test]
    fn test_lag_deriv_and_output() {
        let mut block = lag().with_initial(&[2.0]);
        assert!(block.check().is_ok());
        assert_eq!(block.nstates(), 1);

        let out = block.output(0.0, Inputs::empty()).unwrap();
        assert_eq!(out, vec![Signal::Scalar(2.0)]);

        let slots = scalar_slots(&[5.0]);
        let xdot = block.deriv(Inputs::new(&slots)).unwrap();
        assert_relative_eq!(xdot[0], 3.0);
    }

    #[test]
    fn test_double_integrator() {
        // x1' = x2, x2' = u, y = x1
        let mut block = StateSpaceBlock::new(
            DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]),
            DMatrix::from_row_slice(2, 1, &[0.0, 1.0]),
            DMatrix::from_row_slice(1, 2, &[1.0, 0.0]),
        )
        .with_initial(&[1.0, 2.0]);

        assert_eq!(block.nstates(), 2);
        let out = block.output(0.0, Inputs::empty()).unwrap();
        assert_eq!(out, vec![Signal::Scalar(1.0)]);

        let slots = scalar_slots(&[3.0]);
        assert_eq!(block.deriv(Inputs::new(&slots)).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_dimension_checks() {
        // non-square A
        let block = StateSpaceBlock::new(
            DMatrix::from_row_slice(1, 2, &[0.0, 1.0]),
            DMatrix::from_row_slice(1, 1, &[1.0]),
            DMatrix::from_row_slice(1, 1, &[1.0]),
        );
        assert!(block.check().is_err());

        // wrong B height
        let block = StateSpaceBlock::new(
            DMatrix::from_row_slice(1, 1, &[0.0]),
            DMatrix::from_row_slice(2, 1, &[1.0, 0.0]),
            DMatrix::from_row_slice(1, 1, &[1.0]),
        );
        assert!(block.check().is_err());

        // bad initial state width
        let block = lag().with_initial(&[0.0, 0.0]);
        assert!(block.check().is_err());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut block = lag().with_initial(&[4.0]);
        block.set_state(&[-3.0]);
        assert_eq!(block.state(), &[-3.0]);
        block.reset();
        assert_eq!(block.state(), &[4.0]);
    }
}
