//! Human-readable tree listing for debugging programs on a serial console.

use core::fmt;

use crate::arena::NodeArena;
use crate::types::{Node, NodeRef};

/// Display adapter returned by [`crate::Engine::dump`].
///
/// ```text
/// BinOp: ADD
///   Float: 1.000000
///   Var: X
/// ```
pub struct TreeDump<'a, const CAPACITY: usize> {
    arena: &'a NodeArena<CAPACITY>,
    root: Option<NodeRef>,
}

impl<'a, const CAPACITY: usize> TreeDump<'a, CAPACITY> {
    pub fn new(arena: &'a NodeArena<CAPACITY>, root: Option<NodeRef>) -> Self {
        Self { arena, root }
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: NodeRef, depth: usize) -> fmt::Result {
        let node = self.arena.get(node);
        write!(f, "{:width$}", "", width = depth * 2)?;
        match node {
            Node::Number(value) => writeln!(f, "Float: {value:.6}")?,
            Node::Variable(var) => writeln!(f, "Var: {}", var.label())?,
            Node::Binary { op, .. } => writeln!(f, "BinOp: {}", op.label())?,
            Node::Call { func, .. } => writeln!(f, "Func: {}", func.label())?,
        }
        for child in node.children() {
            self.write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl<const CAPACITY: usize> fmt::Display for TreeDump<'_, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.write_node(f, root, 0),
            None => Ok(()),
        }
    }
}
