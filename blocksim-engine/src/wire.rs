//! Wires: directed edges between single ports.

use std::fmt;

use crate::plug::BlockId;

/// Stable handle to a wire within its owning diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub usize);

/// One end of a wire: a block and a single port on it.
///
/// Whether the port is an output or an input follows from the endpoint's
/// position in the wire (`start` leaves an output, `end` enters an input).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub block: BlockId,
    pub port: usize,
}

impl Endpoint {
    pub fn new(block: BlockId, port: usize) -> Self {
        Self { block, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.block, self.port)
    }
}

/// A directed edge from an output port to an input port.
///
/// A wire never bundles ports; range-to-range and range-to-block connections
/// expand into one wire per port pair at construction time.
#[derive(Clone, Debug)]
pub struct Wire {
    pub id: WireId,
    pub start: Endpoint,
    pub end: Endpoint,
    pub name: Option<String>,
}

impl Wire {
    /// Short label: the wire's name if it has one, else `wire.<id>`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("wire.{name}"),
            None => format!("wire.{}", self.id.0),
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} --> {}", self.label(), self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_display() {
        let wire = Wire {
            id: WireId(5),
            start: Endpoint::new(BlockId(1), 0),
            end: Endpoint::new(BlockId(2), 3),
            name: None,
        };
        assert_eq!(format!("{wire}"), "wire.5: 1[0] --> 2[3]");

        let named = Wire {
            name: Some("error".into()),
            ..wire
        };
        assert_eq!(named.label(), "wire.error");
    }
}
