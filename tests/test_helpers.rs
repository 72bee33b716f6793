use pixelfun::{Engine, ParseError, Real};

/// Capacity used by most integration tests.
pub const CAPACITY: usize = 256;

/// Parse `program` into a fresh engine, panicking on failure.
#[allow(dead_code)]
pub fn engine_for(program: &str) -> Engine<CAPACITY> {
    let mut engine = Engine::new();
    if let Err(err) = engine.parse(program) {
        panic!("failed to parse {program:?}: {err}");
    }
    engine
}

/// Evaluate a constant program.
#[allow(dead_code)]
pub fn eval_str(program: &str) -> Real {
    engine_for(program).eval(0.0, 0.0, 0.0, 0.0)
}

/// Evaluate a program at one pixel.
#[allow(dead_code)]
pub fn eval_at(program: &str, t: Real, i: Real, x: Real, y: Real) -> Real {
    engine_for(program).eval(t, i, x, y)
}

/// The error a program is rejected with.
#[allow(dead_code)]
pub fn parse_err(program: &str) -> ParseError {
    let mut engine: Engine<CAPACITY> = Engine::new();
    match engine.parse(program) {
        Ok(()) => panic!("{program:?} unexpectedly parsed"),
        Err(err) => {
            assert_eq!(engine.free_slots(), CAPACITY, "{program:?} leaked nodes");
            err
        }
    }
}
