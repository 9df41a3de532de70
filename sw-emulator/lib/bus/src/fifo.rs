/*++

Licensed under the Apache-2.0 license.

File Name:

    fifo.rs

Abstract:

    File contains a bounded byte FIFO with word-granular register windows,
    used by peripherals to stream data through the bus.

--*/

use crate::BusError;
use ascon_emu_types::ApbData;
use std::collections::VecDeque;

/// A bounded byte FIFO. The bus side moves whole words through it; the
/// peripheral side moves byte slices.
pub struct ByteFifo {
    fifo: VecDeque<u8>,
    capacity: usize,
}

impl ByteFifo {
    /// Create a FIFO that holds up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            fifo: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of bytes currently queued.
    pub fn len(&self) -> usize {
        self.fifo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }

    /// Number of bytes that can still be queued.
    pub fn remaining(&self) -> usize {
        self.capacity - self.fifo.len()
    }

    pub fn clear(&mut self) {
        self.fifo.clear();
    }

    /// Queue the four little-endian bytes of `val`.
    ///
    /// # Error
    ///
    /// * `BusError::StoreAccessFault` - The FIFO has no room for a full word
    pub fn push_word(&mut self, val: ApbData) -> Result<(), BusError> {
        if self.remaining() < 4 {
            Err(BusError::StoreAccessFault)?
        }
        self.fifo.extend(val.to_le_bytes());
        Ok(())
    }

    /// Dequeue four bytes as a little-endian word.
    ///
    /// # Error
    ///
    /// * `BusError::LoadAccessFault` - Fewer than four bytes are queued
    pub fn pop_word(&mut self) -> Result<ApbData, BusError> {
        if self.fifo.len() < 4 {
            Err(BusError::LoadAccessFault)?
        }
        let mut bytes = [0u8; 4];
        for byte in bytes.iter_mut() {
            *byte = self.fifo.pop_front().unwrap();
        }
        Ok(ApbData::from_le_bytes(bytes))
    }

    /// Queue a byte slice. The caller is expected to check [`Self::remaining`]
    /// first.
    pub fn push_slice(&mut self, data: &[u8]) -> Result<(), BusError> {
        if self.remaining() < data.len() {
            Err(BusError::StoreAccessFault)?
        }
        self.fifo.extend(data);
        Ok(())
    }

    /// Dequeue exactly `len` bytes, or `None` if fewer are queued.
    pub fn pop_bytes(&mut self, len: usize) -> Option<Vec<u8>> {
        if self.fifo.len() < len {
            return None;
        }
        Some(self.fifo.drain(..len).collect())
    }
}
