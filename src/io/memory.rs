//! Offline backend that records every platform call.
//!
//! Nothing reaches a sound card. Queued bytes are kept per device and drain
//! at the device rate whenever the caller waits, so `queued_size` behaves
//! like a real queue. Delays do not sleep unless `realtime(true)` is set.
//!
//! Clones share state: keep one clone to inspect the call log after a
//! session has consumed the other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::backend::{AudioBackend, BackendError, DeviceHandle};
use super::spec::AudioSpec;

/// One recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryEvent {
    Init,
    Quit,
    Open {
        handle: DeviceHandle,
        name: Option<String>,
    },
    Pause {
        handle: DeviceHandle,
        paused: bool,
    },
    /// Bytes accepted onto a device queue
    Queue {
        handle: DeviceHandle,
        bytes: usize,
    },
    /// A queue call that was rejected
    QueueRejected {
        handle: DeviceHandle,
        bytes: usize,
    },
    Clear(DeviceHandle),
    Delay(u32),
    Close(DeviceHandle),
}

#[derive(Debug)]
struct Device {
    spec: AudioSpec,
    paused: bool,
    pending: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    events: Vec<MemoryEvent>,
    devices: HashMap<u32, Device>,
    next_id: u32,
    captured: Vec<u8>,
    queue_calls: usize,
    // Failure injection
    fail_init: Option<String>,
    fail_open: Option<String>,
    fail_pause: Option<String>,
    fail_queue_at: Option<usize>,
    realtime: bool,
}

/// Recording, in-memory [`AudioBackend`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init_subsystem` fail with `message`
    pub fn fail_init(self, message: impl Into<String>) -> Self {
        self.lock().fail_init = Some(message.into());
        self
    }

    /// Make every `open_device` fail with `message`
    pub fn fail_open(self, message: impl Into<String>) -> Self {
        self.lock().fail_open = Some(message.into());
        self
    }

    /// Make every `pause_device` fail with `message`
    pub fn fail_pause(self, message: impl Into<String>) -> Self {
        self.lock().fail_pause = Some(message.into());
        self
    }

    /// Reject the `index`-th (0-based) `queue_audio` call
    pub fn fail_queue_at(self, index: usize) -> Self {
        self.lock().fail_queue_at = Some(index);
        self
    }

    /// Sleep for real in `delay`
    pub fn realtime(self, realtime: bool) -> Self {
        self.lock().realtime = realtime;
        self
    }

    /// Snapshot of the call log
    pub fn events(&self) -> Vec<MemoryEvent> {
        self.lock().events.clone()
    }

    /// Number of logged calls matching `pred`
    pub fn count(&self, pred: impl Fn(&MemoryEvent) -> bool) -> usize {
        self.lock().events.iter().filter(|e| pred(*e)).count()
    }

    /// Every byte accepted by any device, in queue order
    pub fn captured(&self) -> Vec<u8> {
        self.lock().captured.clone()
    }

    /// Durations passed to `delay`, in order
    pub fn delays(&self) -> Vec<u32> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MemoryEvent::Delay(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned log is still a valid log
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioBackend for MemoryBackend {
    fn init_subsystem(&mut self) -> Result<(), BackendError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_init.clone() {
            return Err(BackendError(message));
        }
        state.events.push(MemoryEvent::Init);
        Ok(())
    }

    fn quit_subsystem(&mut self) {
        let mut state = self.lock();
        state.devices.clear();
        state.events.push(MemoryEvent::Quit);
    }

    fn open_device(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<(DeviceHandle, AudioSpec), BackendError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_open.clone() {
            return Err(BackendError(message));
        }

        state.next_id += 1;
        let handle = DeviceHandle::from_raw(state.next_id);
        state.devices.insert(
            handle.raw(),
            Device {
                spec: *desired,
                paused: true,
                pending: 0,
            },
        );
        state.events.push(MemoryEvent::Open {
            handle,
            name: name.map(str::to_string),
        });
        Ok((handle, *desired))
    }

    fn pause_device(&mut self, handle: DeviceHandle, paused: bool) -> Result<(), BackendError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_pause.clone() {
            return Err(BackendError(message));
        }
        let device = state
            .devices
            .get_mut(&handle.raw())
            .ok_or_else(|| BackendError::unknown_device(handle))?;
        device.paused = paused;
        state.events.push(MemoryEvent::Pause { handle, paused });
        Ok(())
    }

    fn queue_audio(&mut self, handle: DeviceHandle, data: &[u8]) -> Result<usize, BackendError> {
        let mut state = self.lock();
        let call = state.queue_calls;
        state.queue_calls += 1;

        if !state.devices.contains_key(&handle.raw()) {
            return Err(BackendError::unknown_device(handle));
        }
        if state.fail_queue_at == Some(call) {
            state.events.push(MemoryEvent::QueueRejected {
                handle,
                bytes: data.len(),
            });
            return Err(BackendError::new("out of memory"));
        }

        if let Some(device) = state.devices.get_mut(&handle.raw()) {
            device.pending += data.len();
        }
        state.captured.extend_from_slice(data);
        state.events.push(MemoryEvent::Queue {
            handle,
            bytes: data.len(),
        });
        Ok(data.len())
    }

    fn queued_size(&self, handle: DeviceHandle) -> Result<usize, BackendError> {
        self.lock()
            .devices
            .get(&handle.raw())
            .map(|d| d.pending)
            .ok_or_else(|| BackendError::unknown_device(handle))
    }

    fn clear_queued(&mut self, handle: DeviceHandle) -> Result<(), BackendError> {
        let mut state = self.lock();
        let device = state
            .devices
            .get_mut(&handle.raw())
            .ok_or_else(|| BackendError::unknown_device(handle))?;
        device.pending = 0;
        state.events.push(MemoryEvent::Clear(handle));
        Ok(())
    }

    fn close_device(&mut self, handle: DeviceHandle) {
        let mut state = self.lock();
        if state.devices.remove(&handle.raw()).is_some() {
            state.events.push(MemoryEvent::Close(handle));
        }
    }

    fn delay(&self, ms: u32) {
        let realtime = {
            let mut state = self.lock();
            state.events.push(MemoryEvent::Delay(ms));
            // Unpaused devices play out their queue while we wait
            for device in state.devices.values_mut().filter(|d| !d.paused) {
                let played = device.spec.bytes_per_second() * ms as usize / 1000;
                device.pending = device.pending.saturating_sub(played);
            }
            state.realtime
        };
        if realtime {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_non_zero_and_unique() {
        let mut backend = MemoryBackend::new();
        let spec = AudioSpec::default();
        let (a, _) = backend.open_device(None, &spec).unwrap();
        let (b, _) = backend.open_device(Some("usb"), &spec).unwrap();
        assert!(a.is_open());
        assert!(b.is_open());
        assert_ne!(a, b);
    }

    #[test]
    fn waiting_drains_unpaused_devices_only() {
        let mut backend = MemoryBackend::new();
        let spec = AudioSpec::new(1_000);
        let (handle, _) = backend.open_device(None, &spec).unwrap();

        backend.queue_audio(handle, &[0; 500]).unwrap();
        backend.delay(100);
        assert_eq!(backend.queued_size(handle).unwrap(), 500);

        backend.pause_device(handle, false).unwrap();
        backend.delay(100);
        assert_eq!(backend.queued_size(handle).unwrap(), 400);
        backend.delay(1_000);
        assert_eq!(backend.queued_size(handle).unwrap(), 0);
    }

    #[test]
    fn injected_queue_failure_hits_one_call() {
        let mut backend = MemoryBackend::new().fail_queue_at(1);
        let (handle, _) = backend.open_device(None, &AudioSpec::default()).unwrap();
        assert_eq!(backend.queue_audio(handle, &[1, 2]), Ok(2));
        assert!(backend.queue_audio(handle, &[3, 4]).is_err());
        assert_eq!(backend.queue_audio(handle, &[5]), Ok(1));
        assert_eq!(backend.captured(), vec![1, 2, 5]);
    }

    #[test]
    fn injected_pause_failure_leaves_device_paused() {
        let mut backend = MemoryBackend::new().fail_pause("device lost");
        let (handle, _) = backend.open_device(None, &AudioSpec::new(1_000)).unwrap();
        assert_eq!(
            backend.pause_device(handle, false),
            Err(BackendError::new("device lost"))
        );

        backend.queue_audio(handle, &[0; 100]).unwrap();
        backend.delay(100);
        assert_eq!(backend.queued_size(handle).unwrap(), 100);
        assert_eq!(backend.count(|e| matches!(e, MemoryEvent::Pause { .. })), 0);
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut backend = MemoryBackend::new();
        let ghost = DeviceHandle::from_raw(42);
        assert!(backend.pause_device(ghost, false).is_err());
        assert!(backend.queue_audio(ghost, &[0]).is_err());
        assert!(backend.queued_size(ghost).is_err());
        backend.close_device(ghost);
        assert_eq!(backend.count(|e| matches!(e, MemoryEvent::Close(_))), 0);
    }
}
