/*
CPAL Output Backend
===================

Each open device is one cpal output stream plus a lock-free byte queue:

    caller thread                         audio thread (cpal callback)
    ─────────────                         ────────────────────────────
    queue_audio(bytes) ──► backlog ──► rtrb ring ──►  pop byte -> i8 -> f32 -> speaker
                           (caller)      (SPSC)         empty? write 0.0 (silence)

The ring holds RING_SECONDS of audio at the device rate. Longer buffers are
accepted whole: the overflow waits in the backlog and is fed into the ring
during `delay` as the callback frees slots. The callback never allocates or
locks. Clearing drops the backlog and raises an atomic flag that the
callback checks on its next run.

Streams are built for f32 output at exactly the requested rate and channel
count. The requested buffer size is used when the device supports it,
otherwise the host default applies. Streams start paused.
*/

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Sample, SampleRate, StreamConfig, SupportedBufferSize};
use rtrb::{Consumer, RingBuffer};

use super::backend::{AudioBackend, BackendError, DeviceHandle};
use super::queue::DeviceQueue;
use super::spec::AudioSpec;

/// Seconds of audio each device ring can hold
const RING_SECONDS: usize = 8;

/// How often `delay` tops up rings while a backlog is pending
const FEED_INTERVAL: Duration = Duration::from_millis(10);

struct OpenStream {
    stream: cpal::Stream,
    queue: Mutex<DeviceQueue>,
    clear: Arc<AtomicBool>,
}

impl OpenStream {
    fn queue(&self) -> MutexGuard<'_, DeviceQueue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// [`AudioBackend`] that plays through the host's audio API via cpal.
#[derive(Default)]
pub struct CpalBackend {
    host: Option<cpal::Host>,
    devices: HashMap<u32, OpenStream>,
    next_id: u32,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&self, handle: DeviceHandle) -> Result<&OpenStream, BackendError> {
        self.devices
            .get(&handle.raw())
            .ok_or_else(|| BackendError::unknown_device(handle))
    }

    /// Feed every backlog into its ring. True while any backlog remains.
    fn feed(&self) -> bool {
        self.devices
            .values()
            .fold(false, |pending, open| open.queue().flush() || pending)
    }
}

fn find_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, BackendError> {
    match name {
        Some(name) => host
            .output_devices()
            .map_err(|e| BackendError::new(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| BackendError::new(format!("no output device named {name:?}"))),
        None => host
            .default_output_device()
            .ok_or_else(|| BackendError::new("no default output device available")),
    }
}

/// Match the desired spec against what the device advertises
fn stream_config(device: &cpal::Device, spec: &AudioSpec) -> Result<StreamConfig, BackendError> {
    let supported = device
        .supported_output_configs()
        .map_err(|e| BackendError::new(e.to_string()))?
        .filter(|c| c.channels() == spec.channels && c.sample_format() == cpal::SampleFormat::F32)
        .find(|c| {
            c.min_sample_rate().0 <= spec.sample_rate_hz
                && spec.sample_rate_hz <= c.max_sample_rate().0
        })
        .ok_or_else(|| {
            BackendError::new(format!(
                "device cannot play {} Hz with {} channel(s)",
                spec.sample_rate_hz, spec.channels
            ))
        })?;

    let frames = spec.buffer_samples as u32;
    let buffer_size = match supported.buffer_size() {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&frames) => {
            BufferSize::Fixed(frames)
        }
        _ => {
            log::debug!(
                target: "pcmtune::cpal",
                "buffer of {frames} frames unsupported, using host default"
            );
            BufferSize::Default
        }
    };

    Ok(StreamConfig {
        channels: spec.channels,
        sample_rate: SampleRate(spec.sample_rate_hz),
        buffer_size,
    })
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut consumer: Consumer<u8>,
    clear: Arc<AtomicBool>,
) -> Result<cpal::Stream, BackendError> {
    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if clear.swap(false, Ordering::AcqRel) {
                    let pending = consumer.slots();
                    if let Ok(chunk) = consumer.read_chunk(pending) {
                        chunk.commit_all();
                    }
                }
                for out in data.iter_mut() {
                    *out = match consumer.pop() {
                        Ok(byte) => (byte as i8).to_sample::<f32>(),
                        Err(_) => 0.0,
                    };
                }
            },
            |err| log::error!(target: "pcmtune::cpal", "stream error: {err}"),
            None,
        )
        .map_err(|e| BackendError::new(e.to_string()))
}

impl AudioBackend for CpalBackend {
    fn init_subsystem(&mut self) -> Result<(), BackendError> {
        let host = cpal::default_host();
        log::debug!(target: "pcmtune::cpal", "using audio host {:?}", host.id());
        self.host = Some(host);
        Ok(())
    }

    fn quit_subsystem(&mut self) {
        self.devices.clear();
        self.host = None;
    }

    fn open_device(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<(DeviceHandle, AudioSpec), BackendError> {
        let host = self
            .host
            .as_ref()
            .ok_or_else(|| BackendError::new("audio subsystem not initialised"))?;
        let device = find_device(host, name)?;
        let config = stream_config(&device, desired)?;

        let capacity = desired.bytes_per_second() * RING_SECONDS;
        let (producer, consumer) = RingBuffer::<u8>::new(capacity);
        let clear = Arc::new(AtomicBool::new(false));
        let stream = build_stream(&device, &config, consumer, clear.clone())?;
        if let Err(e) = stream.pause() {
            log::warn!(target: "pcmtune::cpal", "could not start stream paused: {e}");
        }

        self.next_id = self.next_id.wrapping_add(1).max(1);
        let handle = DeviceHandle::from_raw(self.next_id);
        self.devices.insert(
            handle.raw(),
            OpenStream {
                stream,
                queue: Mutex::new(DeviceQueue::new(producer)),
                clear,
            },
        );

        Ok((handle, *desired))
    }

    fn pause_device(&mut self, handle: DeviceHandle, paused: bool) -> Result<(), BackendError> {
        let open = self.stream(handle)?;
        let result = if paused {
            open.stream.pause().map_err(|e| e.to_string())
        } else {
            open.stream.play().map_err(|e| e.to_string())
        };
        result.map_err(BackendError)
    }

    fn queue_audio(&mut self, handle: DeviceHandle, data: &[u8]) -> Result<usize, BackendError> {
        self.stream(handle)?.queue().push(data)
    }

    fn queued_size(&self, handle: DeviceHandle) -> Result<usize, BackendError> {
        Ok(self.stream(handle)?.queue().len())
    }

    fn clear_queued(&mut self, handle: DeviceHandle) -> Result<(), BackendError> {
        let open = self.stream(handle)?;
        open.queue().clear_backlog();
        open.clear.store(true, Ordering::Release);
        Ok(())
    }

    fn close_device(&mut self, handle: DeviceHandle) {
        // Dropping the stream stops the callback
        self.devices.remove(&handle.raw());
    }

    fn delay(&self, ms: u32) {
        let deadline = Instant::now() + Duration::from_millis(ms as u64);
        loop {
            let pending = self.feed();
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;
            thread::sleep(if pending {
                remaining.min(FEED_INTERVAL)
            } else {
                remaining
            });
        }
    }
}
