/*
Audio Sink
==========

Two nested scopes guard the platform resources:

    AudioSubsystem::init(backend)        init_subsystem
    │
    ├── subsystem.open_device(..)        open_device       -> AudioSink
    │   │
    │   ├── sink.set_paused(false)
    │   ├── sink.enqueue(buffer)         queue_audio
    │   ├── sink.wait(ms)                delay
    │   │   ...
    │   └── drop / sink.close()          close_device      (exactly once)
    │
    └── drop                             quit_subsystem    (exactly once)

The sink mutably borrows the subsystem, so it is always closed before the
subsystem quits. Both releases run from `Drop`: an early `?` return or a
panic unwinding through playback still closes the device and shuts the
subsystem down. A failed open holds nothing and leaves nothing to close.

`wait` is wall-clock only. It does not look at how much audio the device has
actually drained; a note is "done" once its duration has elapsed.
*/

use crate::dsp::PcmBuffer;

use super::backend::{AudioBackend, DeviceHandle};
use super::spec::AudioSpec;

/// The platform audio subsystem could not be started
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to initialise audio subsystem: {0}")]
pub struct SubsystemError(pub String);

/// No device could be acquired. Carries the platform diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to open audio device {}: {message}", .device.as_deref().unwrap_or("<default>"))]
pub struct DeviceOpenError {
    pub device: Option<String>,
    pub message: String,
}

/// Pause/unpause on a device that is not open, or rejected by the platform
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceControlError {
    #[error("audio device is not open")]
    Closed,
    #[error("audio device control failed: {0}")]
    Platform(String),
}

/// A buffer could not be queued. The audio for that buffer is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("audio device is not open")]
    Closed,
    #[error("failed to queue audio: {0}")]
    Platform(String),
}

/// Initialised platform audio subsystem. Quits on drop.
pub struct AudioSubsystem<B: AudioBackend> {
    backend: B,
}

impl<B: AudioBackend> AudioSubsystem<B> {
    pub fn init(mut backend: B) -> Result<Self, SubsystemError> {
        backend
            .init_subsystem()
            .map_err(|e| SubsystemError(e.0))?;
        log::debug!(target: "pcmtune::sink", "audio subsystem up");
        Ok(Self { backend })
    }

    /// Open an output device. The device starts paused.
    pub fn open_device(
        &mut self,
        device_name: Option<&str>,
        spec: &AudioSpec,
    ) -> Result<AudioSink<'_, B>, DeviceOpenError> {
        match self.backend.open_device(device_name, spec) {
            Ok((handle, obtained)) if handle.is_open() => {
                log::debug!(
                    target: "pcmtune::sink",
                    "opened audio device {handle} ({} Hz, {} ch)",
                    obtained.sample_rate_hz,
                    obtained.channels
                );
                Ok(AudioSink {
                    backend: &mut self.backend,
                    handle,
                    spec: obtained,
                })
            }
            Ok(_) => Err(DeviceOpenError {
                device: device_name.map(str::to_string),
                message: "platform returned the closed device handle".to_string(),
            }),
            Err(e) => Err(DeviceOpenError {
                device: device_name.map(str::to_string),
                message: e.0,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: AudioBackend> Drop for AudioSubsystem<B> {
    fn drop(&mut self) {
        self.backend.quit_subsystem();
        log::debug!(target: "pcmtune::sink", "audio subsystem down");
    }
}

/// One open output device. Closes on drop.
pub struct AudioSink<'a, B: AudioBackend> {
    backend: &'a mut B,
    handle: DeviceHandle,
    spec: AudioSpec,
}

impl<'a, B: AudioBackend> AudioSink<'a, B> {
    /// Current handle; [`DeviceHandle::CLOSED`] after `close`.
    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// The spec the device granted at open time
    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    pub fn set_paused(&mut self, paused: bool) -> Result<(), DeviceControlError> {
        if !self.handle.is_open() {
            return Err(DeviceControlError::Closed);
        }
        self.backend
            .pause_device(self.handle, paused)
            .map_err(|e| DeviceControlError::Platform(e.0))
    }

    /// Append `buffer` to the device queue. Returns the number of bytes queued.
    pub fn enqueue(&mut self, buffer: &PcmBuffer) -> Result<usize, QueueError> {
        if !self.handle.is_open() {
            return Err(QueueError::Closed);
        }
        self.backend
            .queue_audio(self.handle, &buffer.to_bytes())
            .map_err(|e| QueueError::Platform(e.0))
    }

    /// Block for `duration_ms` of wall time.
    pub fn wait(&self, duration_ms: u32) {
        self.backend.delay(duration_ms);
    }

    /// Bytes queued but not yet consumed by the device
    pub fn queued_bytes(&self) -> Result<usize, QueueError> {
        if !self.handle.is_open() {
            return Err(QueueError::Closed);
        }
        self.backend
            .queued_size(self.handle)
            .map_err(|e| QueueError::Platform(e.0))
    }

    /// Discard any audio still waiting in the device queue
    pub fn clear(&mut self) -> Result<(), QueueError> {
        if !self.handle.is_open() {
            return Err(QueueError::Closed);
        }
        self.backend
            .clear_queued(self.handle)
            .map_err(|e| QueueError::Platform(e.0))
    }

    /// Release the device. No-op once closed.
    pub fn close(&mut self) {
        if !self.handle.is_open() {
            return;
        }
        self.backend.close_device(self.handle);
        log::debug!(target: "pcmtune::sink", "closed audio device {}", self.handle);
        self.handle = DeviceHandle::CLOSED;
    }
}

impl<'a, B: AudioBackend> Drop for AudioSink<'a, B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::{MemoryBackend, MemoryEvent};

    #[test]
    fn open_failure_holds_nothing() {
        let backend = MemoryBackend::new().fail_open("no such device");
        let log = backend.clone();
        {
            let mut subsystem = AudioSubsystem::init(backend).unwrap();
            let err = subsystem
                .open_device(Some("ghost"), &AudioSpec::default())
                .err()
                .unwrap();
            assert_eq!(err.device.as_deref(), Some("ghost"));
            assert_eq!(err.message, "no such device");
        }
        assert_eq!(log.count(|e| matches!(e, MemoryEvent::Close(_))), 0);
        assert_eq!(log.count(|e| matches!(e, MemoryEvent::Quit)), 1);
    }

    #[test]
    fn close_is_idempotent_and_drop_does_not_double_close() {
        let backend = MemoryBackend::new();
        let log = backend.clone();
        {
            let mut subsystem = AudioSubsystem::init(backend).unwrap();
            let mut sink = subsystem.open_device(None, &AudioSpec::default()).unwrap();
            assert!(sink.handle().is_open());
            sink.close();
            sink.close();
            assert_eq!(sink.handle(), DeviceHandle::CLOSED);
        }
        assert_eq!(log.count(|e| matches!(e, MemoryEvent::Close(_))), 1);
    }

    #[test]
    fn drop_closes_before_quit() {
        let backend = MemoryBackend::new();
        let log = backend.clone();
        {
            let mut subsystem = AudioSubsystem::init(backend).unwrap();
            let _sink = subsystem.open_device(None, &AudioSpec::default()).unwrap();
        }
        let events = log.events();
        let close = events
            .iter()
            .position(|e| matches!(e, MemoryEvent::Close(_)))
            .unwrap();
        let quit = events
            .iter()
            .position(|e| matches!(e, MemoryEvent::Quit))
            .unwrap();
        assert!(close < quit);
    }

    #[test]
    fn operations_on_closed_sink_fail() {
        let mut subsystem = AudioSubsystem::init(MemoryBackend::new()).unwrap();
        let mut sink = subsystem.open_device(None, &AudioSpec::default()).unwrap();
        sink.close();

        assert_eq!(sink.set_paused(false), Err(DeviceControlError::Closed));
        assert_eq!(
            sink.enqueue(&PcmBuffer::silence(4)),
            Err(QueueError::Closed)
        );
        assert_eq!(sink.queued_bytes(), Err(QueueError::Closed));
        assert_eq!(sink.clear(), Err(QueueError::Closed));
    }

    #[test]
    fn enqueue_reports_bytes_and_queue_can_be_cleared() {
        let mut subsystem = AudioSubsystem::init(MemoryBackend::new()).unwrap();
        let mut sink = subsystem.open_device(None, &AudioSpec::default()).unwrap();
        sink.set_paused(false).unwrap();

        assert_eq!(sink.enqueue(&PcmBuffer::silence(100)), Ok(100));
        assert_eq!(sink.queued_bytes(), Ok(100));
        sink.clear().unwrap();
        assert_eq!(sink.queued_bytes(), Ok(0));
    }

    #[test]
    fn init_failure_skips_quit() {
        let backend = MemoryBackend::new().fail_init("no audio driver");
        let log = backend.clone();
        let err = AudioSubsystem::init(backend).err().unwrap();
        assert_eq!(err, SubsystemError("no audio driver".to_string()));
        assert_eq!(log.count(|e| matches!(e, MemoryEvent::Quit)), 0);
    }
}
