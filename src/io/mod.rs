//! External interfaces: the platform audio API and the sink built on it.

pub mod backend;
#[cfg(feature = "cpal")]
pub mod cpal_backend;
pub mod memory;
#[cfg(feature = "rtrb")]
pub mod queue;
pub mod sink;
pub mod spec;

pub use backend::{AudioBackend, BackendError, DeviceHandle};
#[cfg(feature = "cpal")]
pub use cpal_backend::CpalBackend;
pub use memory::{MemoryBackend, MemoryEvent};
pub use sink::{
    AudioSink, AudioSubsystem, DeviceControlError, DeviceOpenError, QueueError, SubsystemError,
};
pub use spec::{AudioSpec, SampleFormat};
