//! Opaque audio callback tables.
//!
//! The host registers two tables — sound effects and music — exactly
//! once before starting the native engine and never touches them
//! again. Their contents are owned entirely by the audio subsystem;
//! this crate only defines the layouts and carries them across the
//! boundary.

use std::ffi::{c_char, c_int, c_uint, c_void};

/// Sound-effect callbacks, registered once before start.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SfxCallbacks {
    /// Opaque audio-subsystem handle, passed back on every call.
    pub ctx: *mut c_void,
    /// Bring the mixer up.
    pub init: Option<extern "C" fn(ctx: *mut c_void, sample_rate: c_uint)>,
    /// Tear the mixer down.
    pub shutdown: Option<extern "C" fn(ctx: *mut c_void)>,
    /// Start one effect; returns a channel handle.
    pub start_sound:
        Option<extern "C" fn(ctx: *mut c_void, sfx_id: c_int, volume: c_int) -> c_int>,
    /// Stop a previously started channel.
    pub stop_sound: Option<extern "C" fn(ctx: *mut c_void, channel: c_int)>,
    /// Per-tick mixer update.
    pub update: Option<extern "C" fn(ctx: *mut c_void)>,
}

/// Music callbacks, registered once before start.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MusicCallbacks {
    /// Opaque audio-subsystem handle, passed back on every call.
    pub ctx: *mut c_void,
    /// Bring the sequencer up.
    pub init: Option<extern "C" fn(ctx: *mut c_void)>,
    /// Tear the sequencer down.
    pub shutdown: Option<extern "C" fn(ctx: *mut c_void)>,
    /// Start a song, optionally looping.
    pub play_song: Option<extern "C" fn(ctx: *mut c_void, name: *const c_char, looping: c_int)>,
    /// Stop the current song.
    pub stop_song: Option<extern "C" fn(ctx: *mut c_void)>,
    /// Set playback volume.
    pub set_volume: Option<extern "C" fn(ctx: *mut c_void, volume: c_int)>,
}

// SAFETY: the tables are plain function pointers plus a context owned
// by the audio subsystem, which guarantees its own thread-safety; the
// host only moves the structs, never calls through them.
#[allow(unsafe_code)]
unsafe impl Send for SfxCallbacks {}
#[allow(unsafe_code)]
unsafe impl Send for MusicCallbacks {}
