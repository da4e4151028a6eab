//! The diagram: owner of all blocks and wires, and the construction API.

use std::collections::HashMap;

use blocksim_traits::{Block, BlockKind, Inputs, Signal};

use crate::error::DiagramError;
use crate::options::{DebugFlags, Options, OptionsError};
use crate::plug::{BlockId, Plug};
use crate::subsystem::Subsystem;
use crate::wire::{Endpoint, Wire, WireId};

/// Lifecycle phase of a diagram.
///
/// `Building` accepts block and wire additions; `compile` moves to
/// `Compiled`; `start` to `Running`; `done` to `Done`. Evaluation is only
/// valid while `Compiled` or `Running`, and a diagram never re-enters
/// `Building`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Building,
    Compiled,
    Running,
    Done,
}

/// Arena slot owning one block together with the engine-side bookkeeping
/// for it: the values most recently received on its inputs, the completion
/// flag, and (after compilation) the port-to-wire tables.
pub(crate) struct BlockEntry {
    pub(crate) name: String,
    pub(crate) behavior: Box<dyn Block>,
    pub(crate) inputs: Vec<Option<Signal>>,
    pub(crate) updated: bool,
    pub(crate) inports: Vec<Option<WireId>>,
    pub(crate) outports: Vec<Vec<WireId>>,
}

impl BlockEntry {
    fn new(name: String, behavior: Box<dyn Block>) -> Self {
        let nin = behavior.nin();
        Self {
            name,
            behavior,
            inputs: vec![None; nin],
            updated: false,
            inports: Vec::new(),
            outports: Vec::new(),
        }
    }

    pub(crate) fn kind(&self) -> BlockKind {
        self.behavior.kind()
    }
}

/// A block diagram: the exclusive owner of its blocks and wires.
pub struct Diagram {
    pub(crate) name: String,
    options: Options,
    pub(crate) debug: DebugFlags,
    pub(crate) blocks: Vec<BlockEntry>,
    pub(crate) wires: Vec<Wire>,
    counters: HashMap<&'static str, usize>,
    pub(crate) names: HashMap<String, BlockId>,
    pub(crate) subsystems: HashMap<BlockId, Diagram>,
    pub(crate) nstates: usize,
    pub(crate) state_names: Vec<String>,
    pub(crate) phase: Phase,
    pub(crate) t: f64,
    pub(crate) stop: Option<BlockId>,
    pub(crate) checkfinite: bool,
}

impl Diagram {
    pub fn new(name: &str) -> Self {
        // the defaults always validate
        Self::with_options(Options::default().with_name(name))
            .expect("default options are valid")
    }

    /// Build a diagram from explicit options; fails if any option value is
    /// malformed.
    pub fn with_options(options: Options) -> Result<Self, OptionsError> {
        options.validate()?;
        let options = options.normalized();
        let debug = options.debug_flags().expect("validated above");
        Ok(Self {
            name: options.name.clone(),
            options,
            debug,
            blocks: Vec::new(),
            wires: Vec::new(),
            counters: HashMap::new(),
            names: HashMap::new(),
            subsystems: HashMap::new(),
            nstates: 0,
            state_names: Vec::new(),
            phase: Phase::Building,
            t: 0.0,
            stop: None,
            checkfinite: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn compiled(&self) -> bool {
        !matches!(self.phase, Phase::Building)
    }

    /// Total state dimension, fixed at compile time.
    pub fn nstates(&self) -> usize {
        self.nstates
    }

    /// Flat state labels, one per state, in gather/scatter order.
    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    pub fn nblocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn nwires(&self) -> usize {
        self.wires.len()
    }

    /// Current simulation time (last `evaluate` or realtime tick).
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Halt evaluation on NaN or infinite block outputs (default on).
    pub fn set_checkfinite(&mut self, on: bool) {
        self.checkfinite = on;
    }

    /// The block that requested a stop of the run loop, if any.
    pub fn stop_requested(&self) -> Option<BlockId> {
        self.stop
    }

    /// Ask the run loop to stop on behalf of `block`. Blocks themselves use
    /// `Block::wants_stop`; this is for external agents such as a host UI.
    pub fn request_stop(&mut self, block: BlockId) {
        if self.stop.is_none() {
            self.stop = Some(block);
        }
    }

    // ------------------------------------------------------------------ //
    // construction

    /// Add a block, assigning the next dense id and a default
    /// `"{type}.{n}"` name.
    pub fn add(&mut self, block: impl Block) -> BlockId {
        self.insert(None, Box::new(block))
    }

    /// Add a block under an explicit name. Collisions surface at compile
    /// time when the name index is built.
    pub fn add_named(&mut self, name: &str, block: impl Block) -> BlockId {
        self.insert(Some(name), Box::new(block))
    }

    fn insert(&mut self, name: Option<&str>, behavior: Box<dyn Block>) -> BlockId {
        assert!(
            matches!(self.phase, Phase::Building),
            "blocks can only be added while the diagram is building"
        );
        let id = BlockId(self.blocks.len());
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let type_name = behavior.type_name();
                let counter = self.counters.entry(type_name).or_insert(0);
                let name = format!("{type_name}.{counter}");
                *counter += 1;
                name
            }
        };
        self.blocks.push(BlockEntry::new(name, behavior));
        id
    }

    /// Embed `sub` as a subsystem block. The block's arities are derived
    /// from the sub-diagram's inport and outport pseudo-blocks; its shape is
    /// verified when the compiler flattens it.
    pub fn add_subsystem(&mut self, sub: Diagram) -> BlockId {
        self.insert_subsystem(None, sub)
    }

    pub fn add_subsystem_named(&mut self, name: &str, sub: Diagram) -> BlockId {
        self.insert_subsystem(Some(name), sub)
    }

    fn insert_subsystem(&mut self, name: Option<&str>, sub: Diagram) -> BlockId {
        let nin = sub
            .blocks
            .iter()
            .find(|e| e.behavior.type_name() == "inport")
            .map(|e| e.behavior.nout())
            .unwrap_or(0);
        let nout = sub
            .blocks
            .iter()
            .find(|e| e.behavior.type_name() == "outport")
            .map(|e| e.behavior.nin())
            .unwrap_or(0);
        let id = self.insert(name, Box::new(Subsystem::new(nin, nout)));
        self.subsystems.insert(id, sub);
        id
    }

    /// Wire `src` to `dst`.
    ///
    /// Both endpoints accept a bare block (lifted to port 0) or a plug.
    /// Slice-to-slice pairs port lists elementwise; a slice source against a
    /// non-slice sink distributes across the sink's input ports `0..nin`;
    /// a single source port against a slice sink fans out to every selected
    /// input. Width mismatches fail with `BundleWidth` and leave the
    /// diagram unchanged.
    pub fn connect(
        &mut self,
        src: impl Into<Plug>,
        dst: impl Into<Plug>,
    ) -> Result<(), DiagramError> {
        self.connect_plugs(src.into(), dst.into(), None)
    }

    /// `connect` with a wire name attached to every created wire.
    pub fn connect_named(
        &mut self,
        src: impl Into<Plug>,
        dst: impl Into<Plug>,
        name: &str,
    ) -> Result<(), DiagramError> {
        self.connect_plugs(src.into(), dst.into(), Some(name))
    }

    /// Wire a chain left to right: `series(&[a, b, c])` connects a → b and
    /// b → c through port 0 (or the given plug ports).
    pub fn series<P>(&mut self, path: &[P]) -> Result<(), DiagramError>
    where
        P: Into<Plug> + Copy,
    {
        for pair in path.windows(2) {
            self.connect(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Wire one source to several sinks.
    pub fn fan_out<P>(&mut self, src: impl Into<Plug> + Copy, dsts: &[P]) -> Result<(), DiagramError>
    where
        P: Into<Plug> + Copy,
    {
        for dst in dsts {
            self.connect(src, *dst)?;
        }
        Ok(())
    }

    fn connect_plugs(
        &mut self,
        start: Plug,
        end: Plug,
        name: Option<&str>,
    ) -> Result<(), DiagramError> {
        if !matches!(self.phase, Phase::Building) {
            return Err(DiagramError::Phase {
                op: "connect",
                phase: self.phase,
            });
        }

        if start.is_slice() && end.is_slice() {
            if start.width() != end.width() {
                return Err(DiagramError::BundleWidth {
                    src: start.width(),
                    dst: end.width(),
                });
            }
            for (s, e) in start.port_list().into_iter().zip(end.port_list()) {
                self.add_wire(Endpoint::new(start.block, s), Endpoint::new(end.block, e), name);
            }
        } else if start.is_slice() {
            // a bundle going to a block: distribute over its input ports
            let nin = self.blocks[end.block.0].behavior.nin();
            if start.width() != nin {
                return Err(DiagramError::BundleWidth {
                    src: start.width(),
                    dst: nin,
                });
            }
            for (inport, outport) in start.port_list().into_iter().enumerate() {
                self.add_wire(
                    Endpoint::new(start.block, outport),
                    Endpoint::new(end.block, inport),
                    name,
                );
            }
        } else {
            let s = start.port_list()[0];
            for e in end.port_list() {
                self.add_wire(Endpoint::new(start.block, s), Endpoint::new(end.block, e), name);
            }
        }
        Ok(())
    }

    pub(crate) fn add_wire(&mut self, start: Endpoint, end: Endpoint, name: Option<&str>) {
        let id = WireId(self.wires.len());
        self.wires.push(Wire {
            id,
            start,
            end,
            name: name.map(str::to_string),
        });
    }

    // ------------------------------------------------------------------ //
    // inspection

    pub fn block(&self, id: BlockId) -> &dyn Block {
        self.blocks[id.0].behavior.as_ref()
    }

    /// Downcast access to a concrete block, e.g. to read a scope's samples
    /// back out after a run.
    pub fn block_as<T: Block>(&self, id: BlockId) -> Option<&T> {
        let block: &dyn std::any::Any = self.blocks[id.0].behavior.as_ref();
        block.downcast_ref::<T>()
    }

    pub fn block_name(&self, id: BlockId) -> &str {
        &self.blocks[id.0].name
    }

    /// Look a block up by name. Uses the compile-time name index when
    /// available and falls back to a scan while building.
    pub fn block_by_name(&self, name: &str) -> Option<BlockId> {
        self.names.get(name).copied().or_else(|| {
            self.blocks
                .iter()
                .position(|e| e.name == name)
                .map(BlockId)
        })
    }

    /// The values most recently delivered to a block's input ports.
    pub fn inputs_of(&self, id: BlockId) -> Inputs<'_> {
        Inputs::new(&self.blocks[id.0].inputs)
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id.0]
    }

    /// Block ids in insertion order, the deterministic scheduling order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + use<> {
        (0..self.blocks.len()).map(BlockId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocksim_blocks::{ConstantBlock, DemuxBlock, GainBlock, MuxBlock, ScopeBlock, SumBlock};

    #[test]
    fn test_ids_are_dense_and_monotone() {
        let mut bd = Diagram::new("ids");
        for i in 0..5 {
            let id = bd.add(GainBlock::new(i as f64));
            assert_eq!(id, BlockId(i));
        }
        assert_eq!(bd.nblocks(), 5);

        for i in 0..4 {
            bd.connect(BlockId(i), BlockId(i + 1)).unwrap();
            assert_eq!(bd.wires()[i].id, WireId(i));
        }
        assert_eq!(bd.nwires(), 4);
    }

    #[test]
    fn test_default_names_count_per_type() {
        let mut bd = Diagram::new("names");
        let g0 = bd.add(GainBlock::new(1.0));
        let c0 = bd.add(ConstantBlock::new(0.0));
        let g1 = bd.add(GainBlock::new(2.0));
        let named = bd.add_named("plant", GainBlock::new(3.0));

        assert_eq!(bd.block_name(g0), "gain.0");
        assert_eq!(bd.block_name(c0), "constant.0");
        assert_eq!(bd.block_name(g1), "gain.1");
        assert_eq!(bd.block_name(named), "plant");
        assert_eq!(bd.block_by_name("gain.1"), Some(g1));
    }

    #[test]
    fn test_slice_to_block_expansion() {
        let mut bd = Diagram::new("slices");
        let demux = bd.add(DemuxBlock::new(3));
        let mux = bd.add(MuxBlock::new(3));
        bd.connect(demux.ports(0..3), mux).unwrap();

        assert_eq!(bd.nwires(), 3);
        for (i, wire) in bd.wires().iter().enumerate() {
            assert_eq!(wire.start, Endpoint::new(demux, i));
            assert_eq!(wire.end, Endpoint::new(mux, i));
        }
    }

    #[test]
    fn test_slice_to_slice_expansion() {
        let mut bd = Diagram::new("slices");
        let demux = bd.add(DemuxBlock::new(4));
        let mux = bd.add(MuxBlock::new(4));
        bd.connect(demux.ports(1..3), mux.ports(2..4)).unwrap();

        assert_eq!(bd.nwires(), 2);
        assert_eq!(bd.wires()[0].start.port, 1);
        assert_eq!(bd.wires()[0].end.port, 2);
        assert_eq!(bd.wires()[1].start.port, 2);
        assert_eq!(bd.wires()[1].end.port, 3);
    }

    #[test]
    fn test_strided_slice_pairing() {
        let mut bd = Diagram::new("stride");
        let demux = bd.add(DemuxBlock::new(5));
        let mux = bd.add(MuxBlock::new(5));
        bd.connect(demux.ports_by(0..5, 2), mux.ports(0..3)).unwrap();

        let starts: Vec<_> = bd.wires().iter().map(|w| w.start.port).collect();
        let ends: Vec<_> = bd.wires().iter().map(|w| w.end.port).collect();
        assert_eq!(starts, vec![0, 2, 4]);
        assert_eq!(ends, vec![0, 1, 2]);
    }

    #[test]
    fn test_bundle_width_mismatch() {
        let mut bd = Diagram::new("bundle");
        let demux = bd.add(DemuxBlock::new(3));
        let sum = bd.add(SumBlock::new("++"));

        let wires_before = bd.nwires();
        let err = bd.connect(demux.ports(0..3), sum).unwrap_err();
        assert!(matches!(err, DiagramError::BundleWidth { src: 3, dst: 2 }));
        // the failed call left nothing behind
        assert_eq!(bd.nwires(), wires_before);

        let err = bd.connect(demux.ports(0..3), sum.ports(0..2)).unwrap_err();
        assert!(matches!(err, DiagramError::BundleWidth { src: 3, dst: 2 }));
    }

    #[test]
    fn test_fan_out_to_slice_sink() {
        let mut bd = Diagram::new("fanout");
        let c = bd.add(ConstantBlock::new(1.0));
        let sum = bd.add(SumBlock::new("++"));
        bd.connect(c.port(0), sum.ports(0..2)).unwrap();

        assert_eq!(bd.nwires(), 2);
        assert_eq!(bd.wires()[0].start.port, 0);
        assert_eq!(bd.wires()[1].start.port, 0);
        assert_eq!(bd.wires()[1].end.port, 1);
    }

    #[test]
    fn test_series_chains_port_zero() {
        let mut bd = Diagram::new("series");
        let c = bd.add(ConstantBlock::new(3.0));
        let g = bd.add(GainBlock::new(2.0));
        let s = bd.add(ScopeBlock::new(1));
        bd.series(&[c, g, s]).unwrap();

        assert_eq!(bd.nwires(), 2);
        assert_eq!(bd.wires()[0].start, Endpoint::new(c, 0));
        assert_eq!(bd.wires()[0].end, Endpoint::new(g, 0));
        assert_eq!(bd.wires()[1].start, Endpoint::new(g, 0));
        assert_eq!(bd.wires()[1].end, Endpoint::new(s, 0));
    }

    #[test]
    fn test_fan_out_helper() {
        let mut bd = Diagram::new("fanout2");
        let c = bd.add(ConstantBlock::new(2.0));
        let g0 = bd.add(GainBlock::new(1.0));
        let g1 = bd.add(GainBlock::new(2.0));
        bd.fan_out(c, &[g0, g1]).unwrap();

        assert_eq!(bd.nwires(), 2);
        assert_eq!(bd.wires()[0].end.block, g0);
        assert_eq!(bd.wires()[1].end.block, g1);
    }

    #[test]
    fn test_named_wires() {
        let mut bd = Diagram::new("wnames");
        let c = bd.add(ConstantBlock::new(3.0));
        let g = bd.add(GainBlock::new(2.0));
        bd.connect_named(c, g, "reference").unwrap();
        assert_eq!(bd.wires()[0].name.as_deref(), Some("reference"));
        assert_eq!(bd.wires()[0].label(), "wire.reference");
    }
}
