//! Helpers shared by the in-crate block tests.

use alloc::vec::Vec;

use blocksim_traits::Signal;

/// Filled input slots from scalar values.
pub fn scalar_slots(values: &[f64]) -> Vec<Option<Signal>> {
    values.iter().map(|v| Some(Signal::Scalar(*v))).collect()
}

/// A single filled input slot holding a vector signal.
pub fn vector_slot(values: &[f64]) -> Vec<Option<Signal>> {
    alloc::vec![Some(Signal::Vector(values.to_vec()))]
}
