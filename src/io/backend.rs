//! The platform audio API, as seen from the sink.
//!
//! A backend is a thin wrapper over whatever actually owns the sound card.
//! It speaks in raw device ids and byte slices and keeps no policy of its
//! own: lifetime rules (open once, close once, quit last) live in
//! [`crate::io::sink`].

use std::fmt;
use std::thread;
use std::time::Duration;

use super::spec::AudioSpec;

/// Opaque device id. Zero means "not open".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceHandle(u32);

impl DeviceHandle {
    /// Sentinel for a device that is not (or no longer) open
    pub const CLOSED: DeviceHandle = DeviceHandle(0);

    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_open(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Diagnostic text reported by the platform for a failed call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn unknown_device(handle: DeviceHandle) -> Self {
        Self(format!("invalid audio device {handle}"))
    }
}

/// Calls into a platform audio subsystem.
///
/// Devices open paused. Queued bytes are consumed by the platform at the
/// device rate, independently of the caller.
pub trait AudioBackend {
    fn init_subsystem(&mut self) -> Result<(), BackendError>;

    fn quit_subsystem(&mut self);

    /// Open an output device by name (or the default device for `None`).
    ///
    /// Returns the new handle and the spec the device actually runs at. No
    /// changes to the desired spec are allowed: a device that cannot honour
    /// it fails to open.
    fn open_device(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<(DeviceHandle, AudioSpec), BackendError>;

    fn pause_device(&mut self, handle: DeviceHandle, paused: bool) -> Result<(), BackendError>;

    /// Append raw sample bytes to the device queue. Returns bytes queued.
    fn queue_audio(&mut self, handle: DeviceHandle, data: &[u8]) -> Result<usize, BackendError>;

    /// Bytes still waiting in the device queue
    fn queued_size(&self, handle: DeviceHandle) -> Result<usize, BackendError>;

    /// Drop everything still waiting in the device queue
    fn clear_queued(&mut self, handle: DeviceHandle) -> Result<(), BackendError>;

    /// Release a device. Unknown handles are ignored.
    fn close_device(&mut self, handle: DeviceHandle);

    /// Block the calling thread for `ms` milliseconds of wall time.
    fn delay(&self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
