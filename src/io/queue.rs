//! Caller side of a device queue.
//!
//! The audio thread reads from a fixed-size SPSC ring. Bytes that do not fit
//! yet wait in a backlog owned by the caller and move into the ring as the
//! audio thread frees slots. A buffer of any length is accepted at once; only
//! an allocation failure rejects it.

use std::collections::VecDeque;

use rtrb::Producer;

use super::backend::BackendError;

pub struct DeviceQueue {
    producer: Producer<u8>,
    backlog: VecDeque<u8>,
}

impl DeviceQueue {
    pub fn new(producer: Producer<u8>) -> Self {
        Self {
            producer,
            backlog: VecDeque::new(),
        }
    }

    /// Accept all of `data`. Returns the number of bytes queued.
    pub fn push(&mut self, data: &[u8]) -> Result<usize, BackendError> {
        self.backlog.try_reserve(data.len()).map_err(|e| {
            BackendError::new(format!("out of memory queueing {} bytes: {e}", data.len()))
        })?;
        self.backlog.extend(data);
        self.flush();
        Ok(data.len())
    }

    /// Move as much backlog into the ring as it has room for.
    /// Returns true while backlog remains.
    pub fn flush(&mut self) -> bool {
        let n = self.producer.slots().min(self.backlog.len());
        if n > 0 {
            if let Ok(chunk) = self.producer.write_chunk_uninit(n) {
                chunk.fill_from_iter(self.backlog.drain(..n));
            }
        }
        !self.backlog.is_empty()
    }

    /// Bytes not yet consumed by the audio thread
    pub fn len(&self) -> usize {
        self.producer.buffer().capacity() - self.producer.slots() + self.backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the backlog. The ring itself is drained by the audio thread.
    pub fn clear_backlog(&mut self) {
        self.backlog.clear();
    }
}
