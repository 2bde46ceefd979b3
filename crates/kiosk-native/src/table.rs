//! The fixed calling-convention callback table.
//!
//! [`NativeCallbacks`] is the struct handed to the native engine's
//! start entry point. Every function pointer is a thin shim that
//! recovers the [`NativeHooks`] dispatcher from the context pointer
//! and forwards; the dispatcher performs the thread-affinity asserts
//! and all actual work.
//!
//! Shims never unwind into the native caller: the only panic in this
//! module is the null-frame-buffer contract violation, which aborts
//! the process — a native engine that signals a draw without a buffer
//! cannot be reasoned with.

use std::ffi::{c_char, c_int, c_uint, c_void, CStr};
use std::sync::Arc;

use kiosk_engine::native::{FrameSource, NativeHooks};

/// Frame memory as the native engine exposes it: a raw pointer into
/// the engine's own allocation, valid for the library's lifetime.
pub struct RawFrameSource {
    ptr: *const u8,
    len: usize,
}

// SAFETY: the pointer targets memory owned by the native engine for
// the process lifetime. Reads are only performed on the host thread
// after the draw-acknowledged gate has fired, which establishes a
// happens-before edge with the native writer.
#[allow(unsafe_code)]
unsafe impl Send for RawFrameSource {}

impl RawFrameSource {
    /// Wrap a native frame pointer.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` is null — signaling a draw without ever
    /// providing a buffer is a programming-contract violation in the
    /// native layer and must surface immediately.
    pub fn new(ptr: *const u8, len: usize) -> Self {
        assert!(!ptr.is_null(), "native draw callback passed a null frame buffer");
        Self { ptr, len }
    }
}

impl FrameSource for RawFrameSource {
    fn byte_len(&self) -> usize {
        self.len
    }

    #[allow(unsafe_code)]
    fn copy_into(&self, dest: &mut Vec<u8>) {
        // SAFETY: ptr/len describe the native frame allocation (see
        // the Send impl for the synchronization argument).
        let frame = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        dest.clear();
        dest.extend_from_slice(frame);
    }
}

/// The callback table registered with the native engine at startup.
///
/// `ctx` carries the dispatcher; the native engine passes it back
/// verbatim on every call. The layout is part of the C interface and
/// must match the native header exactly.
#[repr(C)]
pub struct NativeCallbacks {
    /// Opaque dispatcher handle, passed back on every callback.
    pub ctx: *mut c_void,
    /// Startup finished; resolution is known.
    pub init: extern "C" fn(ctx: *mut c_void, width: c_int, height: c_int),
    /// A frame finished drawing into `buffer` (`len` bytes).
    pub draw_frame: extern "C" fn(ctx: *mut c_void, buffer: *const u8, len: usize),
    /// Sleep the calling thread.
    pub sleep_ms: extern "C" fn(ctx: *mut c_void, millis: c_uint),
    /// Milliseconds since startup.
    pub get_ticks_ms: extern "C" fn(ctx: *mut c_void) -> c_uint,
    /// Pop one key edge; returns nonzero if one was written.
    pub get_key:
        extern "C" fn(ctx: *mut c_void, pressed: *mut c_int, key: *mut u8) -> c_int,
    /// Consume the accumulated mouse state.
    pub get_mouse: extern "C" fn(
        ctx: *mut c_void,
        delta_x: *mut c_int,
        delta_y: *mut c_int,
        left: *mut c_int,
        right: *mut c_int,
        middle: *mut c_int,
        wheel: *mut c_int,
    ),
    /// The engine renamed its window.
    pub set_window_title: extern "C" fn(ctx: *mut c_void, title: *const c_char),
    /// The engine exited with a code.
    pub exit: extern "C" fn(ctx: *mut c_void, code: c_int),
    /// A log line from inside the engine.
    pub log: extern "C" fn(ctx: *mut c_void, line: *const c_char),
}

impl NativeCallbacks {
    /// Build a table around a dispatcher.
    ///
    /// The dispatcher reference is leaked into the context pointer:
    /// the native engine holds it for the remaining process lifetime,
    /// which matches the engine's own lifecycle (there is no clean
    /// native shutdown).
    pub fn from_hooks(hooks: Arc<NativeHooks>) -> Self {
        Self {
            ctx: Arc::into_raw(hooks) as *mut c_void,
            init: shim_init,
            draw_frame: shim_draw_frame,
            sleep_ms: shim_sleep_ms,
            get_ticks_ms: shim_get_ticks_ms,
            get_key: shim_get_key,
            get_mouse: shim_get_mouse,
            set_window_title: shim_set_window_title,
            exit: shim_exit,
            log: shim_log,
        }
    }
}

/// Recover the dispatcher from a context pointer without taking
/// ownership.
#[allow(unsafe_code)]
fn hooks_from_ctx<'a>(ctx: *mut c_void) -> &'a NativeHooks {
    assert!(!ctx.is_null(), "native callback passed a null context");
    // SAFETY: ctx was produced by Arc::into_raw in from_hooks and the
    // leaked reference keeps the allocation alive for the process.
    unsafe { &*(ctx as *const NativeHooks) }
}

extern "C" fn shim_init(ctx: *mut c_void, width: c_int, height: c_int) {
    hooks_from_ctx(ctx).on_init(width as u32, height as u32);
}

extern "C" fn shim_draw_frame(ctx: *mut c_void, buffer: *const u8, len: usize) {
    hooks_from_ctx(ctx).on_draw_frame(Box::new(RawFrameSource::new(buffer, len)));
}

extern "C" fn shim_sleep_ms(ctx: *mut c_void, millis: c_uint) {
    hooks_from_ctx(ctx).sleep(millis);
}

extern "C" fn shim_get_ticks_ms(ctx: *mut c_void) -> c_uint {
    hooks_from_ctx(ctx).elapsed_millis()
}

#[allow(unsafe_code)]
extern "C" fn shim_get_key(ctx: *mut c_void, pressed: *mut c_int, key: *mut u8) -> c_int {
    match hooks_from_ctx(ctx).poll_key() {
        Some(edge) => {
            if pressed.is_null() || key.is_null() {
                return 0;
            }
            // SAFETY: out-pointers are valid per the callback contract
            // and checked non-null above.
            unsafe {
                *pressed = c_int::from(edge.pressed);
                *key = edge.code.0;
            }
            1
        }
        None => 0,
    }
}

#[allow(unsafe_code)]
extern "C" fn shim_get_mouse(
    ctx: *mut c_void,
    delta_x: *mut c_int,
    delta_y: *mut c_int,
    left: *mut c_int,
    right: *mut c_int,
    middle: *mut c_int,
    wheel: *mut c_int,
) {
    let report = hooks_from_ctx(ctx).poll_mouse();
    if delta_x.is_null()
        || delta_y.is_null()
        || left.is_null()
        || right.is_null()
        || middle.is_null()
        || wheel.is_null()
    {
        return;
    }
    // SAFETY: out-pointers are valid per the callback contract and
    // checked non-null above.
    unsafe {
        *delta_x = report.delta_x;
        *delta_y = report.delta_y;
        *left = c_int::from(report.buttons.left);
        *right = c_int::from(report.buttons.right);
        *middle = c_int::from(report.buttons.middle);
        *wheel = report.wheel;
    }
}

#[allow(unsafe_code)]
extern "C" fn shim_set_window_title(ctx: *mut c_void, title: *const c_char) {
    if title.is_null() {
        return;
    }
    // SAFETY: title is a nul-terminated string per the callback contract.
    let title = unsafe { CStr::from_ptr(title) };
    hooks_from_ctx(ctx).set_window_title(&title.to_string_lossy());
}

extern "C" fn shim_exit(ctx: *mut c_void, code: c_int) {
    hooks_from_ctx(ctx).on_exit(code);
}

#[allow(unsafe_code)]
extern "C" fn shim_log(ctx: *mut c_void, line: *const c_char) {
    if line.is_null() {
        return;
    }
    // SAFETY: line is a nul-terminated string per the callback contract.
    let line = unsafe { CStr::from_ptr(line) };
    hooks_from_ctx(ctx).log_line(&line.to_string_lossy());
}
