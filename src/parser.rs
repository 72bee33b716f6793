//! Recursive-descent parser for pixelfun programs.
//!
//! The grammar has eight binary tiers plus primaries. Every binary tier has the
//! same shape, `tier := next (op next)*`, folded to the left, so the tiers are
//! described by [`Tier`] and parsed by one routine. From loosest to tightest:
//!
//! ```text
//! expr       := logical    (('+' | '-') logical)*
//! logical    := bitwise    (('||' | '&&') bitwise)*
//! bitwise    := equality   (('|' | '&' | '^') equality)*
//! equality   := comparison (('==' | '!=') comparison)*
//! comparison := shift      (('<=' | '>=' | '<' | '>') shift)*
//! shift      := term       (('<<' | '>>') term)*
//! term       := power      (('*' | '/' | '%') power)*
//! power      := primary    ('**' primary)*
//! primary    := '(' expr ')' | call | identifier | number
//! ```
//!
//! Note that `+` and `-` bind looser than comparisons and logic, unlike C.
//! Nodes are allocated bottom-up, children before their parent. The parser never
//! resets the arena; on error the partially built nodes stay allocated until the
//! caller resets it (see [`crate::Engine::parse`]).

use crate::arena::NodeArena;
use crate::error::{ParseError, Result};
use crate::lexer::Cursor;
use crate::types::{BinOp, Func, Node, NodeRef, Var};

/// Deepest allowed nesting of parentheses and calls.
pub const MAX_NESTING: usize = 64;

/// One precedence level of the binary grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Additive,
    Logical,
    Bitwise,
    Equality,
    Comparison,
    Shift,
    Term,
    Power,
}

impl Tier {
    /// The next tighter tier, or `None` when operands are primaries.
    pub const fn tighter(self) -> Option<Tier> {
        match self {
            Tier::Additive => Some(Tier::Logical),
            Tier::Logical => Some(Tier::Bitwise),
            Tier::Bitwise => Some(Tier::Equality),
            Tier::Equality => Some(Tier::Comparison),
            Tier::Comparison => Some(Tier::Shift),
            Tier::Shift => Some(Tier::Term),
            Tier::Term => Some(Tier::Power),
            Tier::Power => None,
        }
    }

    /// Whether `op` belongs to this tier.
    pub const fn accepts(self, op: BinOp) -> bool {
        match self {
            Tier::Additive => matches!(op, BinOp::Add | BinOp::Sub),
            Tier::Logical => matches!(op, BinOp::Or | BinOp::And),
            Tier::Bitwise => matches!(op, BinOp::BitOr | BinOp::BitAnd | BinOp::BitXor),
            Tier::Equality => matches!(op, BinOp::Eq | BinOp::Ne),
            Tier::Comparison => matches!(op, BinOp::Le | BinOp::Ge | BinOp::Lt | BinOp::Gt),
            Tier::Shift => matches!(op, BinOp::Shl | BinOp::Shr),
            Tier::Term => matches!(op, BinOp::Mul | BinOp::Div | BinOp::Mod),
            Tier::Power => matches!(op, BinOp::Pow),
        }
    }
}

/// Parse a complete program into `arena` and return its root.
///
/// The whole input must be consumed; trailing whitespace is allowed.
pub fn parse<const CAPACITY: usize>(
    input: &[u8],
    arena: &mut NodeArena<CAPACITY>,
) -> Result<NodeRef> {
    Parser::new(input, arena).parse_program()
}

struct Parser<'a, 'n, const CAPACITY: usize> {
    cursor: Cursor<'a>,
    arena: &'n mut NodeArena<CAPACITY>,
    depth: usize,
}

impl<'a, 'n, const CAPACITY: usize> Parser<'a, 'n, CAPACITY> {
    fn new(input: &'a [u8], arena: &'n mut NodeArena<CAPACITY>) -> Self {
        Self {
            cursor: Cursor::new(input),
            arena,
            depth: 0,
        }
    }

    fn parse_program(mut self) -> Result<NodeRef> {
        let root = self.parse_expr()?;
        self.cursor.skip_whitespace();
        if !self.cursor.at_end() {
            return Err(ParseError::TrailingInput {
                position: self.cursor.pos,
            });
        }
        Ok(root)
    }

    fn parse_expr(&mut self) -> Result<NodeRef> {
        self.parse_tier(Tier::Additive)
    }

    fn parse_tier(&mut self, tier: Tier) -> Result<NodeRef> {
        let mut node = self.parse_operand(tier)?;

        loop {
            self.cursor.skip_whitespace();
            let Some(op) = self.cursor.peek_operator().filter(|op| tier.accepts(*op)) else {
                break;
            };
            self.cursor.bump_operator(op);
            self.cursor.skip_whitespace();

            let rhs = self.parse_operand(tier)?;
            node = self.arena.allocate(Node::Binary {
                op,
                left: node,
                right: rhs,
            })?;
        }

        Ok(node)
    }

    fn parse_operand(&mut self, tier: Tier) -> Result<NodeRef> {
        match tier.tighter() {
            Some(next) => self.parse_tier(next),
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<NodeRef> {
        self.cursor.skip_whitespace();
        let start = self.cursor.pos;

        match self.cursor.peek() {
            None => Err(ParseError::UnexpectedEnd { position: start }),
            Some(b'(') => {
                self.cursor.eat(b'(');
                self.enter(start)?;
                let inner = self.parse_expr()?;
                if !self.cursor.eat(b')') {
                    return Err(ParseError::UnmatchedParenthesis { position: start });
                }
                self.leave();
                Ok(inner)
            }
            Some(c) if c.is_ascii_alphabetic() => self.parse_word(start),
            Some(_) => {
                let value = self.cursor.number()?;
                self.arena.allocate(Node::Number(value))
            }
        }
    }

    /// A call when the word is immediately followed by `(`, otherwise a variable.
    fn parse_word(&mut self, start: usize) -> Result<NodeRef> {
        let word = self.cursor.word();

        if self.cursor.peek() == Some(b'(') {
            let func =
                Func::from_name(word).ok_or(ParseError::UnknownFunction { position: start })?;
            self.cursor.eat(b'(');
            return self.parse_call(func, start);
        }

        let var = Var::from_name(word).ok_or(ParseError::UnknownIdentifier { position: start })?;
        self.arena.allocate(Node::Variable(var))
    }

    /// Arguments of `func`, with the cursor just past the opening parenthesis.
    fn parse_call(&mut self, func: Func, start: usize) -> Result<NodeRef> {
        self.enter(start)?;

        let arity = func.arity();
        let mut args = [NodeRef::new(0); 2];
        for (n, slot) in args.iter_mut().enumerate().take(arity) {
            if n > 0 && !self.cursor.eat(b',') {
                return Err(self.call_error(func, start, b')'));
            }
            *slot = self.parse_expr()?;
        }

        if arity == 0 {
            self.cursor.skip_whitespace();
        }
        if !self.cursor.eat(b')') {
            let error = if arity == 0 && !self.cursor.at_end() {
                self.argument_count(func)
            } else {
                self.call_error(func, start, b',')
            };
            return Err(error);
        }

        self.leave();
        self.arena.allocate(Node::Call { func, args })
    }

    /// Classify a call that stopped at an unexpected byte. `count_marker` is the
    /// byte that shows the argument count is wrong at this point.
    fn call_error(&self, func: Func, start: usize, count_marker: u8) -> ParseError {
        match self.cursor.peek() {
            None => ParseError::UnmatchedParenthesis { position: start },
            Some(c) if c == count_marker => self.argument_count(func),
            Some(found) => ParseError::UnexpectedChar {
                position: self.cursor.pos,
                found,
            },
        }
    }

    fn argument_count(&self, func: Func) -> ParseError {
        ParseError::ArgumentCount {
            function: func.name(),
            expected: func.arity(),
            position: self.cursor.pos,
        }
    }

    fn enter(&mut self, position: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::NestingTooDeep { position });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}
