//! Process-wide inventory of block variants.
//!
//! Hosts populate a [`Registry`] at startup (typically through a library's
//! `install` function) so diagrams and tooling can enumerate the available
//! variants in registration order. Construction itself stays typed; the
//! registry carries discovery metadata only.

use alloc::string::String;
use alloc::vec::Vec;

use crate::BlockKind;

/// Metadata describing one registered block variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSpec {
    /// Factory name: the type tag with leading/trailing underscores removed,
    /// upper-cased. `"gain"` registers as `GAIN`.
    pub name: String,
    pub kind: BlockKind,
    pub summary: &'static str,
}

/// Block variant inventory, ordered by registration.
#[derive(Debug, Default)]
pub struct Registry {
    variants: Vec<VariantSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variant. `type_name` is the block's type tag as reported by
    /// `Block::type_name`.
    pub fn register(&mut self, type_name: &str, kind: BlockKind, summary: &'static str) {
        self.variants.push(VariantSpec {
            name: factory_name(type_name),
            kind,
            summary,
        });
    }

    /// Find a variant by its factory name.
    pub fn lookup(&self, name: &str) -> Option<&VariantSpec> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantSpec> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Factory name for a block type tag: underscores trimmed, upper-cased.
pub fn factory_name(type_name: &str) -> String {
    type_name.trim_matches('_').to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_name() {
        assert_eq!(factory_name("gain"), "GAIN");
        assert_eq!(factory_name("_time_"), "TIME");
        assert_eq!(factory_name("state_space"), "STATE_SPACE");
    }

    #[test]
    fn test_registration_order_and_lookup() {
        let mut registry = Registry::new();
        registry.register("constant", BlockKind::Source, "fixed value");
        registry.register("gain", BlockKind::Function, "scale input");

        let names: Vec<_> = registry.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["CONSTANT", "GAIN"]);

        let gain = registry.lookup("GAIN").unwrap();
        assert_eq!(gain.kind, BlockKind::Function);
        assert!(registry.lookup("MISSING").is_none());
        assert_eq!(registry.len(), 2);
    }
}
