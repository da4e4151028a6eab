//! Tabular reporting of a diagram's blocks and wires.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::diagram::Diagram;

impl Diagram {
    /// Render the block table (id, name, arities, states), the wire table
    /// (id, endpoints as `id[port]`, name, inferred value type), the state
    /// total and the compile status.
    ///
    /// The value type column reflects the last evaluation; ports that have
    /// not carried a value yet show `?`.
    pub fn report(&self) -> String {
        let mut blocks = Table::new();
        blocks
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(["id", "name", "nin", "nout", "nstates"]);
        for (id, entry) in self.blocks.iter().enumerate() {
            blocks.add_row([
                id.to_string(),
                entry.name.clone(),
                entry.behavior.nin().to_string(),
                entry.behavior.nout().to_string(),
                entry.behavior.nstates().to_string(),
            ]);
        }

        let mut wires = Table::new();
        wires
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(["id", "from", "to", "name", "type"]);
        for wire in &self.wires {
            let value_type = self.blocks[wire.end.block.0]
                .inputs
                .get(wire.end.port)
                .and_then(|slot| slot.as_ref())
                .map(|signal| signal.type_label())
                .unwrap_or_else(|| "?".into());
            wires.add_row([
                wire.id.0.to_string(),
                wire.start.to_string(),
                wire.end.to_string(),
                wire.name.clone().unwrap_or_default(),
                value_type,
            ]);
        }

        let status = if self.compiled() {
            String::new()
        } else {
            "\n** diagram has not been compiled\n".into()
        };
        format!(
            "Blocks:\n{blocks}\n\nWires:\n{wires}\n\nState variables: {}\n{status}",
            self.nstates
        )
    }
}

#[cfg(test)]
mod tests {
    use blocksim_blocks::{ConstantBlock, GainBlock, ScopeBlock};

    use crate::Diagram;

    #[test]
    fn test_report_lists_blocks_and_wires() {
        let mut bd = Diagram::new("report");
        let c = bd.add(ConstantBlock::new(3.0));
        let g = bd.add_named("boost", GainBlock::new(2.0));
        let s = bd.add(ScopeBlock::new(1));
        bd.connect(c, g).unwrap();
        bd.connect_named(g, s, "out").unwrap();
        bd.compile().unwrap();

        let report = bd.report();
        assert!(report.contains("boost"));
        assert!(report.contains("scope.0"));
        assert!(report.contains("0[0]"));
        assert!(report.contains("out"));
        // the dry run has pushed scalars along both wires
        assert!(report.contains("scalar"));
        assert!(report.contains("State variables: 0"));
        assert!(!report.contains("not been compiled"));
    }

    #[test]
    fn test_report_flags_uncompiled_diagram() {
        let bd = Diagram::new("empty");
        assert!(bd.report().contains("not been compiled"));
    }
}
