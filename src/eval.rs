//! Tree-walking evaluator.

use rand::RngCore;

use crate::Real;
use crate::arena::NodeArena;
use crate::constants::{PI, TAU};
use crate::types::{Node, NodeRef, Var};

/// The four per-pixel inputs of a program.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inputs {
    /// Seconds since the renderer started
    pub t: Real,
    /// Linear index on the strip
    pub i: Real,
    pub x: Real,
    pub y: Real,
}

impl Inputs {
    pub const fn new(t: Real, i: Real, x: Real, y: Real) -> Self {
        Self { t, i, x, y }
    }

    /// Value of a variable or constant.
    pub fn get(&self, var: Var) -> Real {
        match var {
            Var::T => self.t,
            Var::I => self.i,
            Var::X => self.x,
            Var::Y => self.y,
            Var::Pi => PI,
            Var::Tau => TAU,
        }
    }
}

/// Evaluate the tree rooted at `node`.
///
/// Evaluation is total: every node yields a number, possibly NaN or infinite.
/// Both operands of every binary node are evaluated, left first, so random
/// draws happen in source order.
pub fn eval_node<const CAPACITY: usize, R: RngCore>(
    arena: &NodeArena<CAPACITY>,
    node: NodeRef,
    inputs: &Inputs,
    rng: &mut R,
) -> Real {
    match *arena.get(node) {
        Node::Number(value) => value,
        Node::Variable(var) => inputs.get(var),
        Node::Binary { op, left, right } => {
            let lhs = eval_node(arena, left, inputs, rng);
            let rhs = eval_node(arena, right, inputs, rng);
            op.apply(lhs, rhs)
        }
        Node::Call { func, args } => {
            let mut values = [0.0; 2];
            for (value, &arg) in values.iter_mut().zip(&args[..func.arity()]) {
                *value = eval_node(arena, arg, inputs, rng);
            }
            func.apply(values, rng)
        }
    }
}
