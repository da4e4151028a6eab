use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A value carried by a wire: a scalar or a flat vector.
///
/// This is a data-transfer object, not an algebra type; conversions into
/// richer linear-algebra types belong to the crates that need them.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Signal {
    pub fn zero() -> Self {
        Signal::Scalar(0.0)
    }

    /// The scalar payload, if this is a scalar signal.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Signal::Scalar(v) => Some(*v),
            Signal::Vector(_) => None,
        }
    }

    /// Number of elements (scalars have width 1).
    pub fn len(&self) -> usize {
        match self {
            Signal::Scalar(_) => 1,
            Signal::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat view of the elements.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Signal::Scalar(v) => core::slice::from_ref(v),
            Signal::Vector(v) => v.as_slice(),
        }
    }

    /// True when no element is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.as_slice().iter().all(|v| v.is_finite())
    }

    /// True when any element is non-zero.
    pub fn is_truthy(&self) -> bool {
        self.as_slice().iter().any(|v| *v != 0.0)
    }

    /// Human-readable type tag, e.g. `scalar` or `vector(3)`.
    pub fn type_label(&self) -> String {
        match self {
            Signal::Scalar(_) => String::from("scalar"),
            Signal::Vector(v) => format!("vector({})", v.len()),
        }
    }
}

impl From<f64> for Signal {
    fn from(v: f64) -> Self {
        Signal::Scalar(v)
    }
}

impl From<Vec<f64>> for Signal {
    fn from(v: Vec<f64>) -> Self {
        Signal::Vector(v)
    }
}

impl From<&[f64]> for Signal {
    fn from(v: &[f64]) -> Self {
        Signal::Vector(v.to_vec())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Scalar(v) => write!(f, "{v}"),
            Signal::Vector(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_width_and_slice() {
        assert_eq!(Signal::Scalar(4.0).len(), 1);
        assert_eq!(Signal::Scalar(4.0).as_slice(), &[4.0]);
        let v = Signal::Vector(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_finite() {
        assert!(Signal::Scalar(1.0).is_finite());
        assert!(!Signal::Scalar(f64::NAN).is_finite());
        assert!(!Signal::Vector(vec![0.0, f64::INFINITY]).is_finite());
    }

    #[test]
    fn test_truthy() {
        assert!(!Signal::Scalar(0.0).is_truthy());
        assert!(Signal::Scalar(-0.5).is_truthy());
        assert!(!Signal::Vector(vec![0.0, 0.0]).is_truthy());
        assert!(Signal::Vector(vec![0.0, 2.0]).is_truthy());
    }

    #[test]
    fn test_type_label() {
        assert_eq!(Signal::Scalar(0.0).type_label(), "scalar");
        assert_eq!(Signal::Vector(vec![0.0; 4]).type_label(), "vector(4)");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Signal::Scalar(1.5)), "1.5");
        assert_eq!(format!("{}", Signal::Vector(vec![1.0, 2.5])), "[1, 2.5]");
    }
}
