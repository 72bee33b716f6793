//! C ABI for firmware written in C or C++.
//!
//! The library keeps one global engine (capacity [`DEFAULT_CAPACITY`]) and one
//! [`Settings`] value. Every entry point runs inside a critical section, so calls
//! from an interrupt handler and the main loop are serialized. The critical
//! section implementation is provided by the firmware (for example the
//! `critical-section-single-core` feature of `cortex-m`), or by this crate's
//! `host-critical-section` feature when linking into a hosted program.
//!
//! # Example Usage
//!
//! ```c
//! #include "pixelfun.h"
//!
//! int32_t status = pixelfun_parse("sin(2*t-hypot(x-3.5,y-3.5))");
//! if (status != 0) {
//!     char msg[64];
//!     pixelfun_last_error(msg, sizeof msg);
//!     printf("%s\n", msg);
//! }
//!
//! uint8_t pink[3] = {251, 72, 196};
//! uint8_t green[3] = {63, 255, 33};
//! uint8_t rgb[3];
//! float v = pixelfun_eval(t, (float)idx, (float)x, (float)y);
//! pixelfun_interpolate(pink, green, v, rgb);
//! ```
//!
//! # Status codes
//!
//! Functions returning `int32_t` return `0` on success, a positive
//! [`ParseError::error_code`] when a program is rejected and a negative
//! `PIXELFUN_ERROR_*` value for misuse of the ABI itself.

use core::cell::{Cell, RefCell};
use core::ffi::{CStr, c_char};
use core::fmt::{self, Write};
use core::ptr;

use critical_section::Mutex;
use log::{LevelFilter, Log, Metadata, Record};

use crate::color::{interpolate, rgb_from_array};
use crate::engine::Engine;
use crate::error::ParseError;
use crate::settings::Settings;
use crate::{DEFAULT_CAPACITY, random};

/// A required pointer argument was NULL.
pub const PIXELFUN_ERROR_NULL_POINTER: i32 = -1;
/// A length argument was out of range.
pub const PIXELFUN_ERROR_INVALID_LENGTH: i32 = -2;
/// A different `log` logger is already installed.
pub const PIXELFUN_ERROR_LOGGER_TAKEN: i32 = -3;

/// Longest log line passed to the C callback, in bytes.
pub const PIXELFUN_LOG_LINE_LEN: usize = 128;

/// C logging callback: a message that is *not* NUL-terminated and its length.
pub type PixelfunLogFn = unsafe extern "C" fn(message: *const u8, len: usize);

struct State {
    engine: Engine<DEFAULT_CAPACITY>,
    settings: Settings,
    last_error: Option<ParseError>,
}

impl State {
    fn new() -> Self {
        Self {
            engine: Engine::new(),
            settings: Settings::default(),
            last_error: None,
        }
    }

    fn parse(&mut self, program: &[u8]) -> i32 {
        let result = self.engine.parse(program);
        self.record(result)
    }

    /// Parse the program stored in the settings.
    fn reload(&mut self) -> i32 {
        let result = self.engine.parse(self.settings.program());
        self.record(result)
    }

    fn record(&mut self, result: crate::Result<()>) -> i32 {
        match result {
            Ok(()) => {
                self.last_error = None;
                0
            }
            Err(err) => {
                self.last_error = Some(err);
                err.error_code()
            }
        }
    }
}

static STATE: Mutex<RefCell<Option<State>>> = Mutex::new(RefCell::new(None));

/// Run `f` on the global state, creating it on first use.
///
/// Log records emitted by `f` are queued and handed to the C callback after the
/// critical section ends, so the callback may call back into the library.
fn with_state<T>(f: impl FnOnce(&mut State) -> T) -> T {
    let result = critical_section::with(|cs| {
        HOLD_LOGS.borrow(cs).set(true);
        let result = f(STATE.borrow_ref_mut(cs).get_or_insert_with(State::new));
        HOLD_LOGS.borrow(cs).set(false);
        result
    });
    flush_logs();
    result
}

/// Formats into a C buffer, always NUL-terminating and counting the full length.
struct CBuffer<'a> {
    buf: &'a mut [u8],
    written: usize,
    needed: usize,
}

impl<'a> CBuffer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            written: 0,
            needed: 0,
        }
    }

    /// Terminate the string and return the untruncated length.
    fn finish(self) -> usize {
        if let Some(end) = self.buf.get_mut(self.written) {
            *end = 0;
        }
        self.needed
    }
}

impl Write for CBuffer<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        // Keep one byte for the terminator
        let room = self.buf.len().saturating_sub(self.written + 1);
        let take = bytes.len().min(room);
        self.buf[self.written..self.written + take].copy_from_slice(&bytes[..take]);
        self.written += take;
        self.needed += bytes.len();
        Ok(())
    }
}

/// Borrow a C output buffer; `None` when `buf` is NULL with a non-zero length.
///
/// # Safety
/// `buf` must be valid for writes of `len` bytes when non-NULL.
unsafe fn out_buffer<'a>(buf: *mut c_char, len: usize) -> Option<&'a mut [u8]> {
    if len == 0 {
        Some(&mut [])
    } else if buf.is_null() {
        None
    } else {
        Some(unsafe { core::slice::from_raw_parts_mut(buf.cast::<u8>(), len) })
    }
}

/// Borrow a C input buffer; `None` when `data` is NULL with a non-zero length.
///
/// # Safety
/// `data` must be valid for reads of `len` bytes when non-NULL.
unsafe fn in_buffer<'a>(data: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if data.is_null() {
        None
    } else {
        Some(unsafe { core::slice::from_raw_parts(data, len) })
    }
}

// ============================================================================
// Programs
// ============================================================================

/// Parse a NUL-terminated program and make it current.
///
/// On failure the engine is left empty and [`pixelfun_eval`] returns 0.
///
/// # Safety
/// `program` must be NULL or point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_parse(program: *const c_char) -> i32 {
    if program.is_null() {
        return PIXELFUN_ERROR_NULL_POINTER;
    }
    let program = unsafe { CStr::from_ptr(program) }.to_bytes();
    with_state(|state| state.parse(program))
}

/// Store `len` bytes as the configured program and parse it.
///
/// This is the write handler of the control channel: the text is copied up to
/// the first NUL and truncated to 1023 bytes before parsing.
///
/// # Safety
/// `program` must be valid for reads of `len` bytes, or NULL when `len` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_set_program(program: *const u8, len: usize) -> i32 {
    let Some(bytes) = (unsafe { in_buffer(program, len) }) else {
        return PIXELFUN_ERROR_NULL_POINTER;
    };
    with_state(|state| {
        state.settings.set_program(bytes);
        state.reload()
    })
}

/// Reparse the stored program, e.g. at startup.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_reload() -> i32 {
    with_state(State::reload)
}

/// Copy the message of the last parse failure into `buf`.
///
/// Returns the message length without terminator, or 0 if the last parse
/// succeeded. The message is truncated to fit and always NUL-terminated when
/// `len > 0`.
///
/// # Safety
/// `buf` must be valid for writes of `len` bytes, or NULL when `len` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_last_error(buf: *mut c_char, len: usize) -> usize {
    let Some(buf) = (unsafe { out_buffer(buf, len) }) else {
        return 0;
    };
    with_state(|state| {
        let mut out = CBuffer::new(buf);
        if let Some(err) = state.last_error {
            let _ = write!(out, "{err}");
        }
        out.finish()
    })
}

/// Position of the last parse failure in the program text, or -1.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_last_error_position() -> i32 {
    with_state(|state| {
        state
            .last_error
            .and_then(|err| err.position())
            .and_then(|pos| i32::try_from(pos).ok())
            .unwrap_or(-1)
    })
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate the current program for one pixel. Returns 0 when no program is loaded.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_eval(t: f32, i: f32, x: f32, y: f32) -> f32 {
    with_state(|state| state.engine.eval(t, i, x, y))
}

/// Reseed the generator behind `rand()` and `random()`.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_seed(seed: u32) {
    random::seed(seed);
}

/// Map an evaluator output onto the gradient `b ... black ... a`.
///
/// # Safety
/// `a` and `b` must point to 3 readable bytes and `out` to 3 writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_interpolate(
    a: *const u8,
    b: *const u8,
    t: f32,
    out: *mut u8,
) -> i32 {
    if a.is_null() || b.is_null() || out.is_null() {
        return PIXELFUN_ERROR_NULL_POINTER;
    }
    let (a, b) = unsafe { (ptr::read(a.cast::<[u8; 3]>()), ptr::read(b.cast::<[u8; 3]>())) };
    let color = interpolate(rgb_from_array(a), rgb_from_array(b), t);
    unsafe { ptr::write(out.cast::<[u8; 3]>(), [color.r, color.g, color.b]) };
    0
}

// ============================================================================
// Introspection
// ============================================================================

/// Number of unused node slots in the global engine.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_free_slots() -> usize {
    with_state(|state| state.engine.free_slots())
}

/// Write the tree dump of the current program into `buf`.
///
/// Returns the full length of the dump (like `snprintf`); the copy is
/// truncated to `len - 1` bytes and NUL-terminated when `len > 0`.
///
/// # Safety
/// `buf` must be valid for writes of `len` bytes, or NULL when `len` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_dump(buf: *mut c_char, len: usize) -> usize {
    let Some(buf) = (unsafe { out_buffer(buf, len) }) else {
        return 0;
    };
    with_state(|state| {
        let mut out = CBuffer::new(buf);
        let _ = write!(out, "{}", state.engine.dump());
        out.finish()
    })
}

// ============================================================================
// Settings
// ============================================================================

#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_set_frame_rate(fps: u8) {
    with_state(|state| state.settings.set_frame_rate(fps));
}

#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_frame_rate() -> u8 {
    with_state(|state| state.settings.frame_rate())
}

/// Seconds per frame at the configured frame rate.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_frame_time() -> f32 {
    with_state(|state| state.settings.frame_time())
}

#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_set_brightness(brightness: u8) {
    with_state(|state| state.settings.set_brightness(brightness));
}

#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_brightness() -> u8 {
    with_state(|state| state.settings.brightness())
}

/// Set the color for an output of 1. `len` must be 3.
///
/// # Safety
/// `rgb` must be valid for reads of `len` bytes, or NULL when `len` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_set_color1(rgb: *const u8, len: usize) -> i32 {
    let Some(bytes) = (unsafe { in_buffer(rgb, len) }) else {
        return PIXELFUN_ERROR_NULL_POINTER;
    };
    with_state(|state| match state.settings.set_color1(bytes) {
        Ok(()) => 0,
        Err(_) => PIXELFUN_ERROR_INVALID_LENGTH,
    })
}

/// Set the color for an output of -1. `len` must be 3.
///
/// # Safety
/// `rgb` must be valid for reads of `len` bytes, or NULL when `len` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_set_color2(rgb: *const u8, len: usize) -> i32 {
    let Some(bytes) = (unsafe { in_buffer(rgb, len) }) else {
        return PIXELFUN_ERROR_NULL_POINTER;
    };
    with_state(|state| match state.settings.set_color2(bytes) {
        Ok(()) => 0,
        Err(_) => PIXELFUN_ERROR_INVALID_LENGTH,
    })
}

/// Evaluate and color one pixel with the configured colors, without brightness.
///
/// # Safety
/// `out` must point to 3 writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pixelfun_shade(t: f32, i: f32, x: f32, y: f32, out: *mut u8) -> i32 {
    if out.is_null() {
        return PIXELFUN_ERROR_NULL_POINTER;
    }
    let color = with_state(|state| {
        let value = state.engine.eval(t, i, x, y);
        interpolate(state.settings.color1(), state.settings.color2(), value)
    });
    unsafe { ptr::write(out.cast::<[u8; 3]>(), [color.r, color.g, color.b]) };
    0
}

// ============================================================================
// Logging
// ============================================================================

type LogLine = heapless::String<PIXELFUN_LOG_LINE_LEN>;

/// Records held back while the global state is borrowed.
const PENDING_LOG_LINES: usize = 4;

static LOG_CALLBACK: Mutex<Cell<Option<PixelfunLogFn>>> = Mutex::new(Cell::new(None));
static LOGGER_INSTALLED: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));
static HOLD_LOGS: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));
static PENDING_LOGS: Mutex<RefCell<heapless::Deque<LogLine, PENDING_LOG_LINES>>> =
    Mutex::new(RefCell::new(heapless::Deque::new()));

fn log_callback() -> Option<PixelfunLogFn> {
    critical_section::with(|cs| LOG_CALLBACK.borrow(cs).get())
}

fn emit(line: &LogLine) {
    if let Some(callback) = log_callback() {
        unsafe { callback(line.as_ptr(), line.len()) };
    }
}

/// Deliver the records queued by [`with_state`].
fn flush_logs() {
    while let Some(line) = critical_section::with(|cs| PENDING_LOGS.borrow_ref_mut(cs).pop_front())
    {
        emit(&line);
    }
}

/// Forwards `log` records to the C callback.
struct CLogger;

impl Log for CLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        log_callback().is_some()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line = LogLine::new();
        // Overlong messages are cut at the first piece that does not fit
        let _ = write!(line, "[{}] {}", record.level(), record.args());

        let line = critical_section::with(|cs| {
            if HOLD_LOGS.borrow(cs).get() {
                // Records beyond the queue length are dropped
                let _ = PENDING_LOGS.borrow_ref_mut(cs).push_back(line);
                None
            } else {
                Some(line)
            }
        });
        if let Some(line) = line {
            emit(&line);
        }
    }

    fn flush(&self) {
        flush_logs();
    }
}

static LOGGER: CLogger = CLogger;

fn level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Route the library's log output to `callback`.
///
/// `level` is 0 (off) through 5 (trace). Passing NULL silences the output.
/// Fails with `PIXELFUN_ERROR_LOGGER_TAKEN` when the program already installed
/// its own `log` logger.
///
/// Records produced inside a `pixelfun_*` call are delivered when that call
/// returns, outside the critical section, so `callback` may call any
/// `pixelfun_*` function. At most four records are held per call.
#[unsafe(no_mangle)]
pub extern "C" fn pixelfun_set_log_callback(callback: Option<PixelfunLogFn>, level: u8) -> i32 {
    let installed = critical_section::with(|cs| {
        LOG_CALLBACK.borrow(cs).set(callback);
        let installed = LOGGER_INSTALLED.borrow(cs);
        if !installed.get() {
            // Inside the critical section nothing else can race the install
            if unsafe { log::set_logger_racy(&LOGGER) }.is_err() {
                return false;
            }
            installed.set(true);
        }
        true
    });
    if !installed {
        return PIXELFUN_ERROR_LOGGER_TAKEN;
    }
    log::set_max_level(level_filter(level));
    0
}

// ============================================================================
// Panic handler
// ============================================================================

/// Report the panic through the log callback and halt.
#[cfg(all(not(test), target_arch = "arm", feature = "panic-handler"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    log::error!("panic: {info}");
    loop {
        core::hint::spin_loop();
    }
}
