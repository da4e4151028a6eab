//! The compilation pass: subsystem flattening, validation, port linkage,
//! algebraic-loop detection, state inventory and the initial dry run.

use std::collections::HashMap;

use blocksim_traits::{BlockError, BlockKind};
use log::{info, warn};

use crate::diagram::{Diagram, Phase};
use crate::error::DiagramError;
use crate::plug::BlockId;
use crate::wire::{Endpoint, Wire, WireId};

impl Diagram {
    /// Compile the diagram: flatten subsystems, validate every block and
    /// wire, inventory the continuous state, link ports to wires, reject
    /// algebraic loops, and run one evaluation at t = 0 to validate output
    /// shapes.
    ///
    /// Compilation mutates the block and wire lists and is not idempotent;
    /// on failure the diagram stays uncompiled and must be rebuilt.
    pub fn compile(&mut self) -> Result<(), DiagramError> {
        info!("compiling diagram `{}`", self.name);
        self.compile_inner(false)
    }

    pub(crate) fn compile_inner(&mut self, subsystem: bool) -> Result<(), DiagramError> {
        if !matches!(self.phase, Phase::Building) {
            return Err(DiagramError::Phase {
                op: "compile",
                phase: self.phase,
            });
        }

        self.flatten()?;
        self.check_blocks()?;
        self.build_name_index()?;
        if !subsystem {
            self.inventory_states()?;
        }
        self.link_ports()?;
        self.check_connectivity()?;
        self.detect_algebraic_loops()?;

        self.phase = Phase::Compiled;
        if !subsystem {
            // one evaluation from the initial state validates output shapes
            let x0 = self.gather_state();
            if let Err(err) = self.evaluate(&x0, 0.0) {
                self.phase = Phase::Building;
                return Err(DiagramError::EvaluationDryRun(Box::new(err)));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------ //
    // subsystem flattening

    fn flatten(&mut self) -> Result<(), DiagramError> {
        while let Some(index) = self
            .blocks
            .iter()
            .position(|e| e.kind() == BlockKind::Subsystem)
        {
            self.splice(BlockId(index))?;
        }
        Ok(())
    }

    /// Splice the sub-diagram of subsystem `s` into this diagram and remove
    /// `s`. Block and wire ids are re-assigned to stay dense.
    fn splice(&mut self, s: BlockId) -> Result<(), DiagramError> {
        let sub_name = self.blocks[s.0].name.clone();
        info!("importing subsystem `{sub_name}`");

        let mut sub = self.subsystems.remove(&s).ok_or_else(|| {
            DiagramError::SubsystemShape {
                name: sub_name.clone(),
                inports: 0,
                outports: 0,
            }
        })?;

        if !sub.compiled() {
            sub.compile_inner(true)
                .map_err(|err| DiagramError::SubsystemCompile {
                    name: sub_name.clone(),
                    source: Box::new(err),
                })?;
        }

        let inports: Vec<BlockId> = sub
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, e)| e.behavior.type_name() == "inport")
            .map(|(i, _)| BlockId(i))
            .collect();
        let outports: Vec<BlockId> = sub
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, e)| e.behavior.type_name() == "outport")
            .map(|(i, _)| BlockId(i))
            .collect();
        if inports.len() > 1 || outports.len() > 1 || (inports.is_empty() && outports.is_empty()) {
            return Err(DiagramError::SubsystemShape {
                name: sub_name,
                inports: inports.len(),
                outports: outports.len(),
            });
        }
        let inport = inports.first().copied();
        let outport = outports.first().copied();

        // external wires entering and leaving the subsystem block
        let in_wires: Vec<Wire> = self
            .wires
            .iter()
            .filter(|w| w.end.block == s)
            .cloned()
            .collect();
        let out_wires: Vec<Wire> = self
            .wires
            .iter()
            .filter(|w| w.start.block == s)
            .cloned()
            .collect();
        // which external source feeds each subsystem input port
        let source_for_port: HashMap<usize, Endpoint> =
            in_wires.iter().map(|w| (w.end.port, w.start)).collect();

        // rebuild the block arena: survivors keep their order, spliced-in
        // blocks are appended, renamed with the subsystem path prefix
        let mut parent_map: Vec<Option<BlockId>> = Vec::with_capacity(self.blocks.len());
        let mut new_blocks = Vec::new();
        for (i, entry) in std::mem::take(&mut self.blocks).into_iter().enumerate() {
            if i == s.0 {
                parent_map.push(None);
                continue;
            }
            parent_map.push(Some(BlockId(new_blocks.len())));
            new_blocks.push(entry);
        }

        let mut sub_map: Vec<Option<BlockId>> = Vec::with_capacity(sub.blocks.len());
        for (i, mut entry) in std::mem::take(&mut sub.blocks).into_iter().enumerate() {
            if inport == Some(BlockId(i)) || outport == Some(BlockId(i)) {
                sub_map.push(None);
                continue;
            }
            entry.name = format!("{sub_name}/{}", entry.name);
            // the parent compile re-links and re-resets these
            entry.inports.clear();
            entry.outports.clear();
            entry.updated = false;
            sub_map.push(Some(BlockId(new_blocks.len())));
            new_blocks.push(entry);
        }

        let remap_parent = |ep: Endpoint| -> Option<Endpoint> {
            parent_map[ep.block.0].map(|block| Endpoint { block, ..ep })
        };
        let remap_sub = |ep: Endpoint| -> Option<Endpoint> {
            sub_map[ep.block.0].map(|block| Endpoint { block, ..ep })
        };

        // rebuild the wire list: surviving external wires first, then the
        // spliced sub-diagram wires with boundary endpoints rewritten
        let mut new_wires: Vec<Wire> = Vec::new();
        let mut push_wire = |wires: &mut Vec<Wire>, start, end, name: Option<String>| {
            wires.push(Wire {
                id: WireId(wires.len()),
                start,
                end,
                name,
            });
        };

        for wire in std::mem::take(&mut self.wires) {
            if wire.start.block == s || wire.end.block == s {
                continue;
            }
            let (Some(start), Some(end)) = (remap_parent(wire.start), remap_parent(wire.end))
            else {
                continue;
            };
            push_wire(&mut new_wires, start, end, wire.name);
        }

        for wire in std::mem::take(&mut sub.wires) {
            // a wire leaving the inport picks up the external source that
            // drives the corresponding subsystem input port
            let start = if inport == Some(wire.start.block) {
                match source_for_port.get(&wire.start.port) {
                    Some(source) => remap_parent(*source),
                    // the subsystem port is not driven from outside; the
                    // dangling input surfaces as `Unconnected` later
                    None => None,
                }
            } else {
                remap_sub(wire.start)
            };
            let Some(start) = start else { continue };

            if outport == Some(wire.end.block) {
                // fan out through every external wire leaving this port
                for external in out_wires.iter().filter(|w| w.start.port == wire.end.port) {
                    if let Some(end) = remap_parent(external.end) {
                        push_wire(&mut new_wires, start, end, wire.name.clone());
                    }
                }
            } else if let Some(end) = remap_sub(wire.end) {
                push_wire(&mut new_wires, start, end, wire.name);
            }
        }

        self.blocks = new_blocks;
        self.wires = new_wires;
        // keys of still-pending subsystems shift with the rebuilt arena
        self.subsystems = std::mem::take(&mut self.subsystems)
            .into_iter()
            .filter_map(|(id, sub)| parent_map[id.0].map(|new_id| (new_id, sub)))
            .collect();
        Ok(())
    }

    // ------------------------------------------------------------------ //
    // validation

    /// Per-block self checks: kind arity defaults, port-name list lengths,
    /// and the block's own `check` hook.
    fn check_blocks(&self) -> Result<(), DiagramError> {
        for entry in &self.blocks {
            let block = entry.behavior.as_ref();
            let fail = |source: BlockError| DiagramError::BlockCheck {
                name: entry.name.clone(),
                source,
            };

            if block.nin() + block.nout() == 0 {
                return Err(fail(BlockError::NoPorts));
            }
            let arity_constraint = match block.kind() {
                BlockKind::Source if block.nin() != 0 || block.nstates() != 0 => {
                    Some("source blocks have no inputs and no state")
                }
                BlockKind::Sink if block.nout() != 0 || block.nstates() != 0 => {
                    Some("sink blocks have no outputs and no state")
                }
                BlockKind::Function if block.nstates() != 0 => {
                    Some("function blocks have no state")
                }
                BlockKind::Transfer if block.nstates() == 0 => {
                    Some("transfer blocks must declare at least one state")
                }
                BlockKind::Transfer if block.transfer().is_none() => {
                    Some("transfer blocks must expose the transfer operations")
                }
                _ => None,
            };
            if let Some(message) = arity_constraint {
                return Err(fail(BlockError::Constraint(message.into())));
            }

            if let Some(names) = block.inport_names() {
                if names.len() != block.nin() {
                    return Err(fail(BlockError::Constraint(format!(
                        "{} input names for {} inputs",
                        names.len(),
                        block.nin()
                    ))));
                }
            }
            if let Some(names) = block.outport_names() {
                if names.len() != block.nout() {
                    return Err(fail(BlockError::Constraint(format!(
                        "{} output names for {} outputs",
                        names.len(),
                        block.nout()
                    ))));
                }
            }

            block.check().map_err(fail)?;
        }
        Ok(())
    }

    fn build_name_index(&mut self) -> Result<(), DiagramError> {
        let mut names = HashMap::new();
        for (i, entry) in self.blocks.iter().enumerate() {
            if names.insert(entry.name.clone(), BlockId(i)).is_some() {
                return Err(DiagramError::DuplicateName(entry.name.clone()));
            }
        }
        self.names = names;
        Ok(())
    }

    /// Walk transfer blocks in insertion order, fixing the global state
    /// dimension and the flat state-name list.
    fn inventory_states(&mut self) -> Result<(), DiagramError> {
        let mut nstates = 0;
        let mut state_names = Vec::new();
        for entry in &self.blocks {
            if entry.kind() != BlockKind::Transfer {
                continue;
            }
            let n = entry.behavior.nstates();
            match entry.behavior.state_names() {
                Some(names) => {
                    if names.len() != n {
                        return Err(DiagramError::StateNames {
                            name: entry.name.clone(),
                            declared: names.len(),
                            nstates: n,
                        });
                    }
                    state_names.extend(names);
                }
                None => state_names.extend((0..n).map(|i| format!("{}x{i}", entry.name))),
            }
            nstates += n;
        }
        self.nstates = nstates;
        self.state_names = state_names;
        Ok(())
    }

    /// Attach every wire to its source's outport list and its sink's inport
    /// slot.
    fn link_ports(&mut self) -> Result<(), DiagramError> {
        for entry in &mut self.blocks {
            entry.inports = vec![None; entry.behavior.nin()];
            entry.outports = vec![Vec::new(); entry.behavior.nout()];
        }

        let links: Vec<(WireId, Endpoint, Endpoint)> = self
            .wires
            .iter()
            .map(|w| (w.id, w.start, w.end))
            .collect();
        for (id, start, end) in links {
            let source = &mut self.blocks[start.block.0];
            if start.port >= source.outports.len() {
                return Err(DiagramError::PortOutOfRange {
                    wire: id.0,
                    name: source.name.clone(),
                    port: start.port,
                    side: "output",
                    arity: source.outports.len(),
                });
            }
            source.outports[start.port].push(id);

            let sink = &mut self.blocks[end.block.0];
            if end.port >= sink.inports.len() {
                return Err(DiagramError::PortOutOfRange {
                    wire: id.0,
                    name: sink.name.clone(),
                    port: end.port,
                    side: "input",
                    arity: sink.inports.len(),
                });
            }
            if sink.inports[end.port].is_some() {
                return Err(DiagramError::DoubleDriver {
                    name: sink.name.clone(),
                    port: end.port,
                });
            }
            sink.inports[end.port] = Some(id);
        }
        Ok(())
    }

    /// Every input must have a driver; unconnected outputs only warn.
    fn check_connectivity(&self) -> Result<(), DiagramError> {
        for entry in &self.blocks {
            for (port, slot) in entry.inports.iter().enumerate() {
                if slot.is_none() {
                    return Err(DiagramError::Unconnected {
                        name: entry.name.clone(),
                        port,
                    });
                }
            }
            for (port, wires) in entry.outports.iter().enumerate() {
                if wires.is_empty() {
                    warn!("output {port} of block `{}` is not connected", entry.name);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------ //
    // algebraic loops

    /// Depth-first search from every function block, descending only into
    /// function-class destinations. Source, sink, transfer and subsystem
    /// blocks break algebraic dependency and terminate the search.
    fn detect_algebraic_loops(&self) -> Result<(), DiagramError> {
        for (i, entry) in self.blocks.iter().enumerate() {
            if entry.kind() != BlockKind::Function {
                continue;
            }
            let start = BlockId(i);
            let mut path = vec![start];
            if let Some(cycle) = self.function_cycle_from(start, start, &mut path) {
                return Err(DiagramError::AlgebraicLoop {
                    path: cycle
                        .iter()
                        .map(|id| self.blocks[id.0].name.clone())
                        .collect(),
                });
            }
        }
        Ok(())
    }

    fn function_cycle_from(
        &self,
        origin: BlockId,
        current: BlockId,
        path: &mut Vec<BlockId>,
    ) -> Option<Vec<BlockId>> {
        for outgoing in &self.blocks[current.0].outports {
            for wire in outgoing {
                let dest = self.wires[wire.0].end.block;
                if dest == origin {
                    let mut cycle = path.clone();
                    cycle.push(dest);
                    return Some(cycle);
                }
                if self.blocks[dest.0].kind() == BlockKind::Function && !path.contains(&dest) {
                    path.push(dest);
                    if let Some(cycle) = self.function_cycle_from(origin, dest, path) {
                        return Some(cycle);
                    }
                    path.pop();
                }
            }
        }
        None
    }
}
