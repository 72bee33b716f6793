//! Fixed-capacity node arena.
//!
//! All AST nodes of a program live in one array of `CAPACITY` slots. A LIFO stack
//! of free slot indices makes allocation O(1). There is no per-node release: a
//! program is discarded by [`NodeArena::reset_all`], which hands every slot back at
//! once. The arena never touches the heap and never grows.

use heapless::Vec;

use crate::error::{ParseError, Result};
use crate::types::{Node, NodeRef};

/// Pool of AST nodes with bulk reset.
///
/// Every slot index is either on the free stack exactly once or part of the one
/// live tree. Handles issued before a reset must not be used after it.
pub struct NodeArena<const CAPACITY: usize> {
    nodes: [Node; CAPACITY],
    free: Vec<NodeRef, CAPACITY>,
}

impl<const CAPACITY: usize> NodeArena<CAPACITY> {
    const CAPACITY_FITS_HANDLE: () = assert!(
        CAPACITY <= u16::MAX as usize + 1,
        "arena capacity exceeds NodeRef range"
    );

    /// Create an arena with every slot free.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::CAPACITY_FITS_HANDLE;

        let mut arena = Self {
            nodes: [Node::Number(0.0); CAPACITY],
            free: Vec::new(),
        };
        arena.reset_all();
        arena
    }

    /// Store `node` in a free slot.
    ///
    /// Fails with [`ParseError::OutOfMemory`] when every slot is in use; the arena is
    /// left untouched in that case, so the caller can still reset it.
    pub fn allocate(&mut self, node: Node) -> Result<NodeRef> {
        let slot = self
            .free
            .pop()
            .ok_or(ParseError::OutOfMemory { capacity: CAPACITY })?;
        self.nodes[slot.index()] = node;
        Ok(slot)
    }

    /// Return every slot to the free stack.
    pub fn reset_all(&mut self) {
        self.free.clear();
        for index in 0..CAPACITY {
            // Cannot overflow: the stack holds exactly CAPACITY entries.
            let _ = self.free.push(NodeRef::new(index as u16));
        }
    }

    pub fn get(&self, node: NodeRef) -> &Node {
        &self.nodes[node.index()]
    }

    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    pub fn used_slots(&self) -> usize {
        CAPACITY - self.free.len()
    }
}

impl<const CAPACITY: usize> Default for NodeArena<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
