use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use blocksim_traits::{Block, BlockError, BlockKind, Inputs, Signal, Transfer};

/// Pure integrator: `x' = u`, `y = x`, with a configurable initial condition.
///
/// A scalar initial condition makes a scalar integrator; a vector initial
/// condition integrates elementwise and produces a vector output.
#[derive(Debug, Clone)]
pub struct IntegratorBlock {
    x0: Vec<f64>,
    x: Vec<f64>,
    state_names: Option<Vec<String>>,
}

impl IntegratorBlock {
    pub fn new(x0: f64) -> Self {
        Self::with_initial(vec![x0])
    }

    pub fn with_initial(x0: Vec<f64>) -> Self {
        Self {
            x: x0.clone(),
            x0,
            state_names: None,
        }
    }

    /// Label the states; the compiler checks the count against `nstates`.
    pub fn named_states(mut self, names: &[&str]) -> Self {
        self.state_names = Some(names.iter().map(|n| String::from(*n)).collect());
        self
    }
}

impl Block for IntegratorBlock {
    fn type_name(&self) -> &'static str {
        "integrator"
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
        self.x0.len()
    }

    fn state_names(&self) -> Option<Vec<String>> {
        self.state_names.clone()
    }

    fn check(&self) -> Result<(), BlockError> {
        if self.x0.is_empty() {
            return Err(BlockError::Constraint(String::from(
                "initial state must not be empty",
            )));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.x.clone_from(&self.x0);
    }

    fn output(&mut self, _t: f64, _inputs: Inputs<'_>) -> Result<Vec<Signal>, BlockError> {
        let out = if self.x.len() == 1 {
            Signal::Scalar(self.x[0])
        } else {
            Signal::Vector(self.x.clone())
        };
        Ok(vec![out])
    }

    fn transfer(&self) -> Option<&dyn Transfer> {
        Some(self)
    }

    fn transfer_mut(&mut self) -> Option<&mut dyn Transfer> {
        Some(self)
    }
}

impl Transfer for IntegratorBlock {
    fn set_state(&mut self, x: &[f64]) {
        self.x.clear();
        self.x.extend_from_slice(x);
    }

    fn state(&self) -> &[f64] {
        &self.x
    }

    fn deriv(&self, inputs: Inputs<'_>) -> Result<Vec<f64>, BlockError> {
        let u = inputs.vector(0)?;
        if u.len() != self.x.len() {
            return Err(BlockError::Constraint(format!(
                "input has width {}, integrator has {} states",
                u.len(),
                self.x.len()
            )));
        }
        Ok(u.to_vec())
    }
}
