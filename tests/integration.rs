//! Integration tests for pixelfun
//! These tests exercise the engine the way the LED controller does: parse once,
//! evaluate per pixel, map to colors.

use pixelfun::constants::{PI, TAU};
use pixelfun::eval::Inputs;
use pixelfun::random::XorShiftRng;
use pixelfun::render::MatrixLayout;
use pixelfun::{Engine, OutputDriver, Real, Renderer, Rgb, Settings, assert_approx_eq, interpolate};
use rand::SeedableRng;

mod test_helpers;
use test_helpers::{CAPACITY, engine_for, eval_at, eval_str};

/// Level 1: constant programs
#[test]
fn test_basic_expression_evaluation() {
    assert_eq!(eval_str("1+2"), 3.0);
    assert_eq!(eval_str("sin(0)"), 0.0);
    assert_eq!(eval_str("hypot(3,4)"), 5.0);
    assert_eq!(eval_str("2 * (3 + 4)"), 14.0);
    assert_eq!(eval_str("  7 / 2  "), 3.5);
    assert_eq!(eval_str("3 - -2"), 5.0);
    assert_eq!(eval_str("1.5e1 + .5"), 15.5);
    assert_approx_eq!(eval_str("pi"), PI);
    assert_approx_eq!(eval_str("tau"), TAU);
    assert_approx_eq!(eval_str("cos(pi)"), -1.0);
    assert_approx_eq!(eval_str("atan2(1, 1) * 4"), PI);
}

/// Level 2: per-pixel inputs
#[test]
fn test_inputs() {
    assert_eq!(eval_at("x/0", 0.0, 0.0, 9.0, 0.0), 0.0);
    assert_eq!(eval_at("t + i * 10", 0.5, 3.0, 0.0, 0.0), 30.5);
    assert_eq!(eval_at("x * 8 + y", 0.0, 0.0, 2.0, 5.0), 21.0);
    assert_approx_eq!(
        eval_at("sin(2*t-hypot(x-3.5,y-3.5))", PI / 4.0, 0.0, 3.5, 3.5),
        1.0
    );
}

/// Level 3: the numeric rules of the language
#[test]
fn test_boolean_and_integer_semantics() {
    assert_eq!(eval_str("2 > 1"), 1.0);
    assert_eq!(eval_str("2 < 1"), 0.0);
    assert_eq!(eval_str("2 && 1"), 0.0);
    assert_eq!(eval_str("(2 > 1) && (3 >= 3)"), 1.0);
    assert_eq!(eval_str("(2 > 1) || 0"), 1.0);
    assert_eq!(eval_str("5.9 | 0"), 5.0);
    assert_eq!(eval_str("0 - 5.9 | 0"), -5.0);
    assert_eq!(eval_str("7 ^ 2"), 5.0);
    assert_eq!(eval_str("1 << 31"), i32::MIN as Real);
    assert_eq!(eval_str("1 << 32"), 0.0);
    assert_eq!(eval_str("7.5 % 2"), 1.5);
    assert_eq!(eval_str("fract(0 - 1.25)"), -0.25);
    assert_eq!(eval_str("round(2.5) + floor(0.5) + ceil(0.5) + trunc(1.9)"), 5.0);
}

#[test]
fn test_hex_literals_in_bitwise_programs() {
    assert_eq!(eval_str("0x10"), 16.0);
    assert_eq!(eval_str("0xff ^ 0x0F"), 240.0);
    assert_eq!(eval_at("i & 0x0F", 0.0, 27.0, 0.0, 0.0), 11.0);
    assert_eq!(eval_at("(i >> 0x2) & 0X3", 0.0, 13.0, 0.0, 0.0), 3.0);
    assert_eq!(eval_str("0x1p-1 + 0x.8"), 1.0);
}

#[test]
fn test_nan_and_infinity_propagate() {
    assert!(eval_str("asin(2)").is_nan());
    assert!(eval_str("asin(2) * 0 + 1").is_nan());
    assert!(eval_str("acosh(0)").is_nan());
    assert_eq!(eval_str("1e39"), Real::INFINITY);
    // NaN compares unequal to everything
    assert_eq!(eval_str("asin(2) == asin(2)"), 0.0);
}

#[test]
fn test_random_functions_stay_in_unit_range() {
    let engine = engine_for("rand() + random() * 0");
    for _ in 0..2000 {
        let v = engine.eval(0.0, 0.0, 0.0, 0.0);
        assert!((0.0..1.0).contains(&v), "rand() gave {v}");
    }
}

#[test]
fn test_injected_random_source_is_reproducible() {
    let engine = engine_for("floor(random() * 100)");
    let inputs = Inputs::default();

    let mut a = XorShiftRng::seed_from_u64(99);
    let mut b = XorShiftRng::seed_from_u64(99);
    for _ in 0..50 {
        assert_eq!(
            engine.eval_with(&inputs, &mut a),
            engine.eval_with(&inputs, &mut b)
        );
    }
}

#[test]
fn test_eval_is_deterministic_without_random() {
    let engine = engine_for("sin(t * x) + cos(i) * y ** 2");
    let first = engine.eval(1.25, 3.0, 0.5, 2.0);
    for _ in 0..100 {
        assert_eq!(engine.eval(1.25, 3.0, 0.5, 2.0), first);
    }
}

#[test]
fn test_slot_accounting_across_reparses() {
    let mut engine: Engine<CAPACITY> = Engine::new();
    let programs = [
        ("x", 1),
        ("1 + 2", 3),
        ("hypot(x, y)", 3),
        ("sin(2*t-hypot(x-3.5,y-3.5))", 12),
        ("rand()", 1),
    ];
    for _ in 0..10_000 {
        for (program, size) in programs {
            engine.parse(program).unwrap();
            assert_eq!(engine.free_slots(), CAPACITY - size, "{program}");
        }
    }
}

#[test]
fn test_deep_nesting() {
    let mut engine: Engine<CAPACITY> = Engine::new();
    let ok = format!("{}x{}", "(".repeat(64), ")".repeat(64));
    engine.parse(&ok).unwrap();
    assert_eq!(engine.eval(0.0, 0.0, 4.0, 0.0), 4.0);

    let too_deep = format!("{}x{}", "(".repeat(65), ")".repeat(65));
    assert!(engine.parse(&too_deep).is_err());
    assert_eq!(engine.free_slots(), CAPACITY);
}

#[test]
fn test_capacity_exhaustion_is_recoverable() {
    let mut engine: Engine<8> = Engine::new();
    let long = vec!["x"; 20].join(" + ");
    assert_eq!(
        engine.parse(&long),
        Err(pixelfun::ParseError::OutOfMemory { capacity: 8 })
    );
    assert_eq!(engine.free_slots(), 8);
    engine.parse("x + x + x + x").unwrap();
    assert_eq!(engine.eval(0.0, 0.0, 2.0, 0.0), 8.0);
}

#[test]
fn test_color_mapping_contract() {
    let a = Rgb { r: 251, g: 72, b: 196 };
    let b = Rgb { r: 63, g: 255, b: 33 };
    assert_eq!(interpolate(a, b, 1.0), a);
    assert_eq!(interpolate(a, b, -1.0), b);
    assert_eq!(interpolate(a, b, 0.0), Rgb::default());
    assert_eq!(interpolate(a, b, 2.0), a);
    assert_eq!(interpolate(a, b, -2.0), b);
}

#[test]
fn test_dump_of_default_program() {
    let engine = engine_for("sin(2*t-hypot(x-3.5,y-3.5))");
    let expected = "\
Func: SIN
  BinOp: SUB
    BinOp: MUL
      Float: 2.000000
      Var: T
    Func: HYPOT
      BinOp: SUB
        Var: X
        Float: 3.500000
      BinOp: SUB
        Var: Y
        Float: 3.500000
";
    assert_eq!(engine.dump().to_string(), expected);
}

struct Strip {
    frames: Vec<Vec<Rgb>>,
}

impl OutputDriver for Strip {
    fn write(&mut self, colors: &[Rgb]) {
        self.frames.push(colors.to_vec());
    }
}

/// Level 4: the firmware loop on an 8x8 serpentine panel
#[test]
fn test_render_default_program_on_panel() {
    let mut settings = Settings::default();
    settings.set_brightness(255);

    let mut engine: Engine<CAPACITY> = Engine::new();
    engine.parse(settings.program()).unwrap();

    let layout = MatrixLayout::serpentine_8x8();
    let mut renderer: Renderer<64> = Renderer::new(layout);
    let mut strip = Strip { frames: Vec::new() };

    for _ in 0..3 {
        renderer.render_frame(&engine, &settings, &mut strip);
    }
    assert_eq!(strip.frames.len(), 3);
    assert_approx_eq!(renderer.time(), 3.0 / 60.0);

    // Each strip position shows the color of its own (x, y)
    let frame = &strip.frames[0];
    for y in 0..8 {
        for x in 0..8 {
            let index = layout.index(x, y);
            let v = engine.eval(0.0, index as Real, x as Real, y as Real);
            assert_eq!(
                frame[index],
                interpolate(settings.color1(), settings.color2(), v),
                "pixel ({x}, {y})"
            );
        }
    }
}
