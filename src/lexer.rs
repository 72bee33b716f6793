//! Lexing helpers used inline by the parser.
//!
//! There is no token stream: the parser asks the cursor for exactly the construct
//! its grammar tier expects (an operator, a number, a word) at the current byte.
//! Input is a byte slice so programs received over the air need not be UTF-8.

use crate::Real;
use crate::error::{ParseError, Result};
use crate::types::BinOp;

/// A position in the program text.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pub pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Peek at the current byte.
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip ASCII whitespace (`isspace` in the C locale, including vertical tab).
    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == 0x0b {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Look at the operator at the cursor without consuming it.
    pub fn peek_operator(&self) -> Option<BinOp> {
        BinOp::lookup(self.rest())
    }

    /// Consume the operator returned by [`Cursor::peek_operator`].
    pub fn bump_operator(&mut self, op: BinOp) {
        self.pos += op.symbol().len();
    }

    /// Scan an ASCII word (alphabetic start, alphanumeric tail).
    ///
    /// Returns an empty slice when the cursor is not at a letter.
    pub fn word(&mut self) -> &'a [u8] {
        let start = self.pos;
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                self.pos += 1;
            }
        }
        &self.input[start..self.pos]
    }

    /// Scan the longest floating-point literal at the cursor, as `strtof` does.
    ///
    /// Accepts an optional sign, then either a hexadecimal literal (`0x1F`,
    /// `0x.8p1`) or decimal digits with an optional fraction and exponent. An
    /// exponent is only taken when at least one digit follows it, so `2e` scans
    /// as `2` and leaves `e` in place.
    pub fn number(&mut self) -> Result<Real> {
        let start = self.pos;
        let mut end = start;
        let at = |i: usize| self.input.get(i).copied();

        let negative = at(end) == Some(b'-');
        if matches!(at(end), Some(b'+' | b'-')) {
            end += 1;
        }

        if let Some((magnitude, hex_end)) = self.hex_literal(end) {
            self.pos = hex_end;
            return Ok(if negative { -magnitude } else { magnitude });
        }

        let int_start = end;
        while at(end).is_some_and(|c| c.is_ascii_digit()) {
            end += 1;
        }
        let mut digits = end - int_start;

        if at(end) == Some(b'.') {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while at(frac_end).is_some_and(|c| c.is_ascii_digit()) {
                frac_end += 1;
            }
            digits += frac_end - frac_start;
            if digits > 0 {
                end = frac_end;
            }
        }

        if digits == 0 {
            return Err(match at(start) {
                None => ParseError::UnexpectedEnd { position: start },
                Some(b'+' | b'-' | b'.') => ParseError::InvalidNumber { position: start },
                Some(found) => ParseError::UnexpectedChar {
                    position: start,
                    found,
                },
            });
        }

        if matches!(at(end), Some(b'e' | b'E')) {
            let mut exp_end = end + 1;
            if matches!(at(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let exp_digits_start = exp_end;
            while at(exp_end).is_some_and(|c| c.is_ascii_digit()) {
                exp_end += 1;
            }
            if exp_end > exp_digits_start {
                end = exp_end;
            }
        }

        // The scanned range is ASCII by construction.
        let text = core::str::from_utf8(&self.input[start..end])
            .map_err(|_| ParseError::InvalidNumber { position: start })?;
        let value = text
            .parse::<Real>()
            .map_err(|err| ParseError::from_float(err, start))?;
        self.pos = end;
        Ok(value)
    }

    /// Scan `0x` hex digits with an optional `.` fraction and binary `p` exponent.
    ///
    /// Returns `None` unless at least one hex digit follows the prefix; `0x` alone
    /// is then read as the decimal `0` followed by `x`.
    fn hex_literal(&self, start: usize) -> Option<(Real, usize)> {
        let at = |i: usize| self.input.get(i).copied();
        let hex = |i: usize| at(i).and_then(|c| char::from(c).to_digit(16));

        if at(start) != Some(b'0') || !matches!(at(start + 1), Some(b'x' | b'X')) {
            return None;
        }

        let mut end = start + 2;
        let mut mantissa = 0.0f64;
        let mut digits = 0;
        while let Some(d) = hex(end) {
            mantissa = mantissa * 16.0 + f64::from(d);
            digits += 1;
            end += 1;
        }

        let mut exponent: i32 = 0;
        if at(end) == Some(b'.') {
            let mut frac_end = end + 1;
            while let Some(d) = hex(frac_end) {
                mantissa = mantissa * 16.0 + f64::from(d);
                exponent -= 4;
                digits += 1;
                frac_end += 1;
            }
            if digits > 0 {
                end = frac_end;
            }
        }

        if digits == 0 {
            return None;
        }

        if matches!(at(end), Some(b'p' | b'P')) {
            let mut exp_end = end + 1;
            let exp_negative = at(exp_end) == Some(b'-');
            if matches!(at(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let exp_digits_start = exp_end;
            let mut power: i32 = 0;
            while let Some(d) = at(exp_end).filter(u8::is_ascii_digit) {
                power = power.saturating_mul(10).saturating_add(i32::from(d - b'0'));
                exp_end += 1;
            }
            if exp_end > exp_digits_start {
                end = exp_end;
                exponent = if exp_negative {
                    exponent.saturating_sub(power)
                } else {
                    exponent.saturating_add(power)
                };
            }
        }

        Some((libm::ldexp(mantissa, exponent) as Real, end))
    }
}
