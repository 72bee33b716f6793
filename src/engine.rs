//! The engine: one arena, one current program.

use log::{debug, warn};
use rand::RngCore;

use crate::Real;
use crate::arena::NodeArena;
use crate::dump::TreeDump;
use crate::error::Result;
use crate::eval::{Inputs, eval_node};
use crate::parser::parse;
use crate::random::SharedRandom;
use crate::types::NodeRef;

/// Parses and evaluates pixel programs inside a fixed node arena.
///
/// The engine holds at most one program. Parsing replaces it; a failed parse
/// leaves the engine empty with every slot free. An empty engine evaluates to
/// `0` for every input.
pub struct Engine<const CAPACITY: usize> {
    arena: NodeArena<CAPACITY>,
    root: Option<NodeRef>,
}

impl<const CAPACITY: usize> Engine<CAPACITY> {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
        }
    }

    /// Replace the current program with `source`.
    ///
    /// The previous program is discarded even when `source` does not parse.
    pub fn parse(&mut self, source: impl AsRef<[u8]>) -> Result<()> {
        let source = source.as_ref();
        self.root = None;
        self.arena.reset_all();

        match parse(source, &mut self.arena) {
            Ok(root) => {
                self.root = Some(root);
                debug!(
                    "parsed {} byte program into {} nodes",
                    source.len(),
                    self.arena.used_slots()
                );
                Ok(())
            }
            Err(err) => {
                self.arena.reset_all();
                warn!("program rejected: {err}");
                Err(err)
            }
        }
    }

    /// Drop the current program and free every slot.
    pub fn clear(&mut self) {
        self.root = None;
        self.arena.reset_all();
    }

    /// Evaluate the current program, drawing `rand()` from the shared generator.
    pub fn eval(&self, t: Real, i: Real, x: Real, y: Real) -> Real {
        self.eval_with(&Inputs::new(t, i, x, y), &mut SharedRandom)
    }

    /// Evaluate the current program, drawing `rand()` from `rng`.
    pub fn eval_with<R: RngCore>(&self, inputs: &Inputs, rng: &mut R) -> Real {
        match self.root {
            Some(root) => eval_node(&self.arena, root, inputs, rng),
            None => 0.0,
        }
    }

    /// Indented tree listing of the current program.
    pub fn dump(&self) -> TreeDump<'_, CAPACITY> {
        TreeDump::new(&self.arena, self.root)
    }

    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    pub fn arena(&self) -> &NodeArena<CAPACITY> {
        &self.arena
    }

    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    pub fn free_slots(&self) -> usize {
        self.arena.free_slots()
    }

    pub fn used_slots(&self) -> usize {
        self.arena.used_slots()
    }
}

impl<const CAPACITY: usize> Default for Engine<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
