//! Uniform random numbers for `rand()` and `random()`.
//!
//! A single [`XorShiftRng`] is shared by every engine in the program. It sits
//! behind a `critical_section` mutex so an interrupt handler can call [`seed`]
//! while the render loop is drawing. Callers that want a reproducible sequence
//! pass their own generator to [`Engine::eval_with`](crate::Engine::eval_with).

use core::cell::RefCell;

use critical_section::Mutex;
use rand::{Rng, RngCore, SeedableRng};

pub use rand_xorshift::XorShiftRng;

use crate::Real;

const DEFAULT_SEED: u64 = 0x2545_f491;

static SHARED: Mutex<RefCell<Option<XorShiftRng>>> = Mutex::new(RefCell::new(None));

/// Run `f` on the shared generator, seeding it on first use.
fn with_shared<T>(f: impl FnOnce(&mut XorShiftRng) -> T) -> T {
    critical_section::with(|cs| {
        let mut slot = SHARED.borrow_ref_mut(cs);
        f(slot.get_or_insert_with(|| XorShiftRng::seed_from_u64(DEFAULT_SEED)))
    })
}

/// Reseed the shared generator.
pub fn seed(value: u32) {
    let rng = XorShiftRng::seed_from_u64(u64::from(value));
    critical_section::with(|cs| *SHARED.borrow_ref_mut(cs) = Some(rng));
}

/// Draw a value in `[0, 1)` from the shared generator.
pub fn next_unit() -> Real {
    SharedRandom.random()
}

/// Handle to the shared generator; every draw takes the lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SharedRandom;

impl RngCore for SharedRandom {
    fn next_u32(&mut self) -> u32 {
        with_shared(|rng| rng.next_u32())
    }

    fn next_u64(&mut self) -> u64 {
        with_shared(|rng| rng.next_u64())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        with_shared(|rng| rng.fill_bytes(dst))
    }
}
