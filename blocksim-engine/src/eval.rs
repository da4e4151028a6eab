//! The evaluation engine: state scatter, deterministic value propagation,
//! derivative gather, lifecycle hooks and the realtime loop.

use std::time::Instant;

use blocksim_traits::{BlockError, BlockKind, Inputs};
use log::{debug, info};

use crate::diagram::{BlockEntry, Diagram, Phase};
use crate::error::DiagramError;
use crate::plug::BlockId;

impl Diagram {
    /// Evaluate the diagram at state `x` and time `t`, returning the state
    /// derivative.
    ///
    /// Resets every block, scatters `x` across the transfer blocks in
    /// insertion order, propagates values from sources and transfer blocks,
    /// verifies that every input arrived, and gathers the derivative in the
    /// same insertion order. Given the same construction transcript and the
    /// same `(x, t)`, the result is reproducible bit for bit.
    pub fn evaluate(&mut self, x: &[f64], t: f64) -> Result<Vec<f64>, DiagramError> {
        if !matches!(self.phase, Phase::Compiled | Phase::Running) {
            return Err(DiagramError::Phase {
                op: "evaluate",
                phase: self.phase,
            });
        }
        if x.len() != self.nstates {
            return Err(DiagramError::StateSize {
                got: x.len(),
                want: self.nstates,
            });
        }

        self.t = t;
        if self.debug.state {
            debug!("state: t = {t}, x = {x:?}");
        }
        self.reset_blocks();

        // scatter the state across the transfer blocks, piecewise
        let mut rest = x;
        for entry in &mut self.blocks {
            if entry.kind() != BlockKind::Transfer {
                continue;
            }
            let (head, tail) = rest.split_at(entry.behavior.nstates());
            entry
                .behavior
                .transfer_mut()
                .expect("validated at compile time")
                .set_state(head);
            rest = tail;
        }

        // sources and stateful blocks seed the propagation, in insertion
        // order
        for i in 0..self.blocks.len() {
            if matches!(
                self.blocks[i].kind(),
                BlockKind::Source | BlockKind::Transfer
            ) {
                self.propagate(BlockId(i), t, 0)?;
            }
        }

        for entry in &self.blocks {
            if entry.behavior.nin() > 0 && !entry.updated {
                return Err(DiagramError::IncompleteInputs(entry.name.clone()));
            }
        }

        let mut deriv = Vec::with_capacity(self.nstates);
        for entry in &self.blocks {
            if entry.kind() != BlockKind::Transfer {
                continue;
            }
            let transfer = entry.behavior.transfer().expect("validated at compile time");
            let yd = transfer
                .deriv(Inputs::new(&entry.inputs))
                .map_err(|source| DiagramError::Block {
                    name: entry.name.clone(),
                    source,
                })?;
            deriv.extend(yd);
        }
        if deriv.len() != self.nstates {
            return Err(DiagramError::StateSize {
                got: deriv.len(),
                want: self.nstates,
            });
        }
        if self.debug.deriv {
            debug!("deriv: {deriv:?}");
        }
        Ok(deriv)
    }

    /// Concatenate the current state of every transfer block, in insertion
    /// order (the same order `evaluate` scatters in).
    pub fn gather_state(&self) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.nstates);
        for entry in &self.blocks {
            if entry.kind() != BlockKind::Transfer {
                continue;
            }
            if let Some(transfer) = entry.behavior.transfer() {
                x.extend_from_slice(transfer.state());
            }
        }
        x
    }

    fn reset_blocks(&mut self) {
        for entry in &mut self.blocks {
            for slot in &mut entry.inputs {
                *slot = None;
            }
            // blocks without inputs are trivially complete
            entry.updated = entry.behavior.nin() == 0;
            entry.behavior.reset();
        }
    }

    /// Depth-first value propagation from block `id`: compute its outputs,
    /// deliver them along every outgoing wire in insertion order, and
    /// recurse into any function or subsystem destination whose inputs just
    /// completed. Sinks wait for `step`; transfer blocks consume their
    /// inputs at the next `deriv`.
    fn propagate(&mut self, id: BlockId, t: f64, depth: usize) -> Result<(), DiagramError> {
        let out = {
            let BlockEntry {
                name,
                behavior,
                inputs,
                ..
            } = &mut self.blocks[id.0];
            let out = behavior
                .output(t, Inputs::new(inputs))
                .map_err(|source| DiagramError::Block {
                    name: name.clone(),
                    source,
                })?;
            if out.len() != behavior.nout() {
                return Err(DiagramError::OutputArity {
                    name: name.clone(),
                    got: out.len(),
                    want: behavior.nout(),
                });
            }
            out
        };

        if self.checkfinite && out.iter().any(|signal| !signal.is_finite()) {
            return Err(DiagramError::NonFinite(self.blocks[id.0].name.clone()));
        }
        if self.debug.propagate {
            debug!(
                "{:indent$}propagating {} @ t = {t}: output = {out:?}",
                "",
                self.blocks[id.0].name,
                indent = 2 * depth
            );
        }

        for port in 0..out.len() {
            let wire_ids = self.blocks[id.0].outports[port].clone();
            for wire_id in wire_ids {
                let end = self.wires[wire_id.0].end;
                let destination = &mut self.blocks[end.block.0];
                destination.inputs[end.port] = Some(out[port].clone());
                let completed = destination.inputs.iter().all(Option::is_some);
                if completed {
                    destination.updated = true;
                }
                if completed
                    && matches!(
                        destination.kind(),
                        BlockKind::Function | BlockKind::Subsystem
                    )
                {
                    self.propagate(end.block, t, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Tell every block a simulation run begins; `Compiled` → `Running`.
    pub fn start(&mut self) -> Result<(), DiagramError> {
        if !matches!(self.phase, Phase::Compiled) {
            return Err(DiagramError::Phase {
                op: "start",
                phase: self.phase,
            });
        }
        self.for_each_hook(|block| block.start())?;
        self.stop = None;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Drive the sink-side hook of every block once, after an evaluation
    /// cycle has settled, and record any stop request.
    pub fn step(&mut self, t: f64) -> Result<(), DiagramError> {
        if !matches!(self.phase, Phase::Compiled | Phase::Running) {
            return Err(DiagramError::Phase {
                op: "step",
                phase: self.phase,
            });
        }
        for i in 0..self.blocks.len() {
            let BlockEntry {
                name,
                behavior,
                inputs,
                ..
            } = &mut self.blocks[i];
            behavior
                .step(t, Inputs::new(inputs))
                .map_err(|source| DiagramError::Block {
                    name: name.clone(),
                    source,
                })?;
            if behavior.wants_stop() && self.stop.is_none() {
                self.stop = Some(BlockId(i));
            }
        }
        Ok(())
    }

    /// Tell every block the run is over; the diagram moves to `Done`.
    pub fn done(&mut self) -> Result<(), DiagramError> {
        if !matches!(self.phase, Phase::Compiled | Phase::Running) {
            return Err(DiagramError::Phase {
                op: "done",
                phase: self.phase,
            });
        }
        self.for_each_hook(|block| block.done())?;
        self.phase = Phase::Done;
        Ok(())
    }

    fn for_each_hook(
        &mut self,
        mut hook: impl FnMut(&mut dyn blocksim_traits::Block) -> Result<(), BlockError>,
    ) -> Result<(), DiagramError> {
        for entry in &mut self.blocks {
            hook(entry.behavior.as_mut()).map_err(|source| DiagramError::Block {
                name: entry.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Drive a stateless diagram from the wall clock until a block requests
    /// a stop or `max_time` seconds elapse.
    pub fn run_realtime(&mut self, max_time: Option<f64>) -> Result<(), DiagramError> {
        for entry in &self.blocks {
            if entry.kind() == BlockKind::Transfer {
                return Err(DiagramError::TransferInRealtime(entry.name.clone()));
            }
        }
        match self.phase {
            Phase::Compiled => self.start()?,
            Phase::Running => {}
            phase => {
                return Err(DiagramError::Phase {
                    op: "run_realtime",
                    phase,
                });
            }
        }

        info!("realtime run of `{}` started", self.name);
        let clock = Instant::now();
        let progress = self.options().progress;
        let mut next_progress = 1.0;
        let mut cycles: u64 = 0;

        loop {
            if self.stop.is_some() {
                break;
            }
            let t = clock.elapsed().as_secs_f64();
            if let Some(cap) = max_time {
                if t > cap {
                    break;
                }
            }
            if progress && t >= next_progress {
                info!("t = {t:.1}");
                next_progress += 1.0;
            }

            self.reset_blocks();
            self.t = t;
            for i in 0..self.blocks.len() {
                if self.blocks[i].kind() == BlockKind::Source {
                    self.propagate(BlockId(i), t, 0)?;
                }
            }
            for entry in &self.blocks {
                if entry.behavior.nin() > 0 && !entry.updated {
                    return Err(DiagramError::IncompleteInputs(entry.name.clone()));
                }
            }
            self.step(t)?;
            cycles += 1;
        }

        if let Some(id) = self.stop {
            info!("realtime run stopped by `{}`", self.blocks[id.0].name);
        }
        info!(
            "realtime run of `{}` finished after {cycles} cycles at t = {:.3}",
            self.name, self.t
        );
        Ok(())
    }
}
