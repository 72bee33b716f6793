//! Type definitions for the pixelfun AST.
//!
//! This module contains the node representation stored in the arena together with
//! the fixed catalogs of the language: the built-in variables, the binary operators
//! and the built-in functions. Each catalog carries its source spelling so the
//! parser, the dumper and the C header all agree on one table.

use heapless::Vec;

use crate::Real;

/// Non-owning handle to a node stored in a [`crate::NodeArena`].
///
/// A handle is only meaningful for the arena that issued it and only until that
/// arena is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(u16);

impl NodeRef {
    pub(crate) const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Slot index inside the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A built-in variable or constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    /// Seconds since the renderer started
    T,
    /// Linear index of the pixel on the strip
    I,
    /// Column of the pixel
    X,
    /// Row of the pixel
    Y,
    Pi,
    Tau,
}

impl Var {
    pub const ALL: [Var; 6] = [Var::T, Var::I, Var::X, Var::Y, Var::Pi, Var::Tau];

    /// Spelling in program text.
    pub const fn name(self) -> &'static str {
        match self {
            Var::T => "t",
            Var::I => "i",
            Var::X => "x",
            Var::Y => "y",
            Var::Pi => "pi",
            Var::Tau => "tau",
        }
    }

    /// Upper-case label used by the tree dump.
    pub const fn label(self) -> &'static str {
        match self {
            Var::T => "T",
            Var::I => "I",
            Var::X => "X",
            Var::Y => "Y",
            Var::Pi => "PI",
            Var::Tau => "TAU",
        }
    }

    /// Looks up a whole word.
    pub fn from_name(word: &[u8]) -> Option<Var> {
        Var::ALL
            .iter()
            .copied()
            .find(|var| var.name().as_bytes() == word)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Pow,
    Mod,
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Shr,
    Le,
    Ge,
    Lt,
    Gt,
    Eq,
    Ne,
    Or,
    BitOr,
    And,
    BitAnd,
    BitXor,
}

impl BinOp {
    /// Operator table in match order: every spelling precedes the spellings that
    /// are its prefixes.
    pub const TABLE: [BinOp; 19] = [
        BinOp::Pow,
        BinOp::Mod,
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::Div,
        BinOp::Shl,
        BinOp::Shr,
        BinOp::Le,
        BinOp::Ge,
        BinOp::Lt,
        BinOp::Gt,
        BinOp::Eq,
        BinOp::Ne,
        BinOp::Or,
        BinOp::BitOr,
        BinOp::And,
        BinOp::BitAnd,
        BinOp::BitXor,
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            BinOp::Pow => "**",
            BinOp::Mod => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Or => "||",
            BinOp::BitOr => "|",
            BinOp::And => "&&",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BinOp::Pow => "POW",
            BinOp::Mod => "MOD",
            BinOp::Add => "ADD",
            BinOp::Sub => "SUB",
            BinOp::Mul => "MUL",
            BinOp::Div => "DIV",
            BinOp::Shl => "LSHIFT",
            BinOp::Shr => "RSHIFT",
            BinOp::Le => "LTE",
            BinOp::Ge => "GTE",
            BinOp::Lt => "LT",
            BinOp::Gt => "GT",
            BinOp::Eq => "EQ",
            BinOp::Ne => "NEQ",
            BinOp::Or => "OR",
            BinOp::BitOr => "BIT_OR",
            BinOp::And => "AND",
            BinOp::BitAnd => "BIT_AND",
            BinOp::BitXor => "BIT_XOR",
        }
    }

    /// Finds the operator spelled at the start of `input`, if any.
    pub fn lookup(input: &[u8]) -> Option<BinOp> {
        BinOp::TABLE
            .iter()
            .copied()
            .find(|op| input.starts_with(op.symbol().as_bytes()))
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Rand,
    Random,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Asinh,
    Acosh,
    Atanh,
    Floor,
    Ceil,
    Round,
    Fract,
    Trunc,
    Hypot,
}

impl Func {
    pub const ALL: [Func; 18] = [
        Func::Rand,
        Func::Random,
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Asin,
        Func::Acos,
        Func::Atan,
        Func::Atan2,
        Func::Asinh,
        Func::Acosh,
        Func::Atanh,
        Func::Floor,
        Func::Ceil,
        Func::Round,
        Func::Fract,
        Func::Trunc,
        Func::Hypot,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Func::Rand => "rand",
            Func::Random => "random",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Atan2 => "atan2",
            Func::Asinh => "asinh",
            Func::Acosh => "acosh",
            Func::Atanh => "atanh",
            Func::Floor => "floor",
            Func::Ceil => "ceil",
            Func::Round => "round",
            Func::Fract => "fract",
            Func::Trunc => "trunc",
            Func::Hypot => "hypot",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Func::Rand => "RAND",
            Func::Random => "RANDOM",
            Func::Sin => "SIN",
            Func::Cos => "COS",
            Func::Tan => "TAN",
            Func::Asin => "ASIN",
            Func::Acos => "ACOS",
            Func::Atan => "ATAN",
            Func::Atan2 => "ATAN2",
            Func::Asinh => "ASINH",
            Func::Acosh => "ACOSH",
            Func::Atanh => "ATANH",
            Func::Floor => "FLOOR",
            Func::Ceil => "CEIL",
            Func::Round => "ROUND",
            Func::Fract => "FRACT",
            Func::Trunc => "TRUNC",
            Func::Hypot => "HYPOT",
        }
    }

    /// Number of arguments the function takes.
    pub const fn arity(self) -> usize {
        match self {
            Func::Rand | Func::Random => 0,
            Func::Atan2 | Func::Hypot => 2,
            _ => 1,
        }
    }

    /// Looks up a whole word.
    pub fn from_name(word: &[u8]) -> Option<Func> {
        Func::ALL
            .iter()
            .copied()
            .find(|func| func.name().as_bytes() == word)
    }
}

/// A node of the abstract syntax tree.
///
/// Children are referenced by [`NodeRef`]; the arena owns every node, so a tree is
/// freed only as a whole when the arena is reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// A literal number.
    Number(Real),

    /// One of the built-in variables or constants.
    Variable(Var),

    /// `left op right`
    Binary {
        op: BinOp,
        left: NodeRef,
        right: NodeRef,
    },

    /// A call to a built-in function. Only the first `func.arity()` entries of
    /// `args` are meaningful.
    Call { func: Func, args: [NodeRef; 2] },
}

impl Node {
    /// Children of the node, in evaluation order.
    pub fn children(&self) -> Vec<NodeRef, 2> {
        let mut children = Vec::new();
        match *self {
            Node::Number(_) | Node::Variable(_) => {}
            Node::Binary { left, right, .. } => {
                children.extend_from_slice(&[left, right]).ok();
            }
            Node::Call { func, args } => {
                children.extend_from_slice(&args[..func.arity()]).ok();
            }
        }
        children
    }
}
