#![cfg_attr(all(not(test), target_arch = "arm"), no_std)]
#![doc = r#"
# pixelfun

A tiny, allocation-free formula language for LED matrices.

## Overview

pixelfun parses a one-line formula such as `sin(2*t-hypot(x-3.5,y-3.5))` into an
abstract syntax tree that lives in a fixed-size node arena, and evaluates that tree
once per pixel per frame. The result is a single `f32`, usually in `[-1, 1]`, which
the bipolar color mapper turns into an RGB value between two configured colors.

Key properties:
- `no_std`, no heap: the arena capacity is a const generic and never grows
- Four runtime inputs: `t` (seconds), `i` (strip index), `x` and `y` (matrix position)
- Constants `pi` and `tau`
- 19 binary operators and 18 built-in functions, all on `f32`
- Failed parses reset the arena, so a bad program never leaks nodes
- Optional C ABI for firmware written in C or C++

## Quick Start

```rust
use pixelfun::Engine;

let mut engine: Engine<64> = Engine::new();
engine.parse("hypot(3, 4)").unwrap();
assert_eq!(engine.eval(0.0, 0.0, 0.0, 0.0), 5.0);

// Anything the grammar rejects leaves the engine empty, evaluating to 0
assert!(engine.parse("sin(1, 2)").is_err());
assert_eq!(engine.eval(0.0, 0.0, 0.0, 0.0), 0.0);
```

## Mapping to colors

```rust
use pixelfun::{Engine, Rgb, interpolate};

let pink = Rgb { r: 251, g: 72, b: 196 };
let green = Rgb { r: 63, g: 255, b: 33 };

let mut engine: Engine<64> = Engine::new();
engine.parse("x - 1").unwrap();

assert_eq!(interpolate(pink, green, engine.eval(0.0, 0.0, 2.0, 0.0)), pink);
assert_eq!(interpolate(pink, green, engine.eval(0.0, 0.0, 0.0, 0.0)), green);
assert_eq!(interpolate(pink, green, engine.eval(0.0, 0.0, 1.0, 0.0)), Rgb { r: 0, g: 0, b: 0 });
```

## Operator Precedence

The precedence table is **not** the one C programmers expect. Addition and
subtraction bind *looser* than every logical, bitwise and comparison operator,
so `1 + 2 == 3` means `1 + (2 == 3)` and evaluates to `1`. Use parentheses when
mixing arithmetic with comparisons.

From loosest to tightest:

| Tier | Operators                  | Associativity |
|------|----------------------------|---------------|
| 1    | `+` `-`                    | Left          |
| 2    | `\|\|` `&&`                | Left          |
| 3    | `\|` `&` `^`               | Left          |
| 4    | `==` `!=`                  | Left          |
| 5    | `<=` `>=` `<` `>`          | Left          |
| 6    | `<<` `>>`                  | Left          |
| 7    | `*` `/` `%`                | Left          |
| 8    | `**`                       | Left          |

`2 ** 3 ** 2` is `(2 ** 3) ** 2 = 64`.

## Boolean semantics

Comparisons produce exactly `1.0` or `0.0`. `||` and `&&` treat only the value
`1.0` as true, so `2 && 1` is `0`. Bitwise and shift operators truncate both
operands toward zero. Division by zero yields `0`.

## Built-in Functions

- Random: `rand()`, `random()` (uniform in `[0, 1)`)
- Trigonometric: `sin`, `cos`, `tan`, `asin`, `acos`, `atan`, `atan2`
- Hyperbolic: `asinh`, `acosh`, `atanh`
- Rounding: `floor`, `ceil`, `round`, `trunc`, `fract`
- Misc: `hypot`
"#]

pub mod arena;
pub mod color;
pub mod dump;
pub mod engine;
pub mod error;
pub mod eval;
pub mod ffi;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod random;
pub mod render;
pub mod settings;
pub mod types;

pub use arena::NodeArena;
pub use color::{Rgb, interpolate};
pub use engine::Engine;
pub use error::{ParseError, Result};
pub use eval::Inputs;
pub use render::{MatrixLayout, OutputDriver, Renderer};
pub use settings::Settings;
pub use types::*;

/// The only numeric type of the language.
pub type Real = f32;

/// Longest program the control channel delivers, excluding the terminator.
pub const MAX_PROGRAM_LEN: usize = 1023;

/// Node capacity used by the C ABI and the firmware defaults.
pub const DEFAULT_CAPACITY: usize = 1024;

pub mod constants {
    use super::Real;

    pub const PI: Real = core::f32::consts::PI;
    pub const TAU: Real = core::f32::consts::TAU;
    pub const TEST_PRECISION: Real = 1e-6;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. Supports optional format arguments like assert_eq!.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!((left_val - right_val).abs() < eps, $($arg)+);
        }
    }};
}
