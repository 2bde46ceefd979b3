//! The link-time binding to the real native engine.
//!
//! Compiled only with the `linked` feature, so the rest of the
//! workspace builds and tests without the shared library present.
//! The library exposes three symbols: a start entry point taking the
//! callback table and launch arguments, a per-tick entry point, and
//! an audio-table registration hook.

use std::ffi::{c_char, c_int, CString};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use kiosk_core::error::StartError;
use kiosk_engine::native::{NativeEngine, NativeHooks};

use crate::audio::{MusicCallbacks, SfxCallbacks};
use crate::table::NativeCallbacks;

#[allow(unsafe_code)]
#[link(name = "retrocore")]
extern "C" {
    fn retrocore_set_audio(sfx: *const SfxCallbacks, music: *const MusicCallbacks);
    fn retrocore_start(callbacks: *const NativeCallbacks, argc: c_int, argv: *const *const c_char);
    fn retrocore_tick();
}

/// The real native engine, reached through the linked shared library.
pub struct LinkedEngine {
    library_path: PathBuf,
    audio: Option<(SfxCallbacks, MusicCallbacks)>,
    /// Keeps the table and argument storage alive for the library's
    /// lifetime once `start` has run.
    registration: Option<Registration>,
}

struct Registration {
    _callbacks: Box<NativeCallbacks>,
    _args: Vec<CString>,
}

// SAFETY: the raw pointers held through `Registration` are the leaked
// `Arc<NativeHooks>` context (itself `Send + Sync`) and storage owned
// by this struct; moving the engine between threads transfers no
// aliased state.
#[allow(unsafe_code)]
unsafe impl Send for LinkedEngine {}

impl LinkedEngine {
    /// Bind to the shared library expected at `library_path`.
    ///
    /// The path is probed by [`locate`](NativeEngine::locate) before
    /// the worker commits to starting; a missing file degrades into a
    /// startup-failure exit instead of a loader error.
    pub fn new(library_path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: library_path.into(),
            audio: None,
            registration: None,
        }
    }

    /// Register the audio tables handed to the engine before start.
    pub fn with_audio(mut self, sfx: SfxCallbacks, music: MusicCallbacks) -> Self {
        self.audio = Some((sfx, music));
        self
    }
}

impl NativeEngine for LinkedEngine {
    fn locate(&self) -> Result<(), StartError> {
        if self.library_path.is_file() {
            Ok(())
        } else {
            Err(StartError::MissingLibrary {
                path: self.library_path.clone(),
            })
        }
    }

    #[allow(unsafe_code)]
    fn start(&mut self, hooks: Arc<NativeHooks>, args: &[String]) -> Result<(), StartError> {
        let mut owned_args = Vec::with_capacity(args.len() + 1);
        // argv[0] is the library path, by longstanding convention.
        for arg in std::iter::once(self.library_path.display().to_string())
            .chain(args.iter().cloned())
        {
            owned_args.push(CString::new(arg).map_err(|_| StartError::Unavailable {
                reason: "launch argument contains a nul byte".into(),
            })?);
        }
        let argv: Vec<*const c_char> = owned_args.iter().map(|arg| arg.as_ptr()).collect();

        if let Some((sfx, music)) = &self.audio {
            debug!("registering audio callback tables");
            // SAFETY: the tables are plain-old-data read once by the
            // native engine during registration.
            unsafe { retrocore_set_audio(sfx, music) };
        }

        let callbacks = Box::new(NativeCallbacks::from_hooks(hooks));
        info!(library = %self.library_path.display(), "starting native engine");
        // SAFETY: the callback table and argv storage stay alive in
        // `registration` for the library's lifetime; the native engine
        // reads argv only during startup.
        unsafe {
            retrocore_start(&*callbacks, argv.len() as c_int, argv.as_ptr());
        }
        self.registration = Some(Registration {
            _callbacks: callbacks,
            _args: owned_args,
        });
        Ok(())
    }

    #[allow(unsafe_code)]
    fn tick(&mut self) {
        // SAFETY: only called on the simulation thread after a
        // successful start.
        unsafe { retrocore_tick() };
    }
}
