use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ops::Deref;

use crate::pool;

/// A finished, encoded record checked out from the process-wide buffer pool.
///
/// Ownership belongs to the caller. Dropping the buffer (or calling
/// [`RecordBuffer::free`]) clears it and hands the storage back to the pool;
/// [`RecordBuffer::into_vec`] detaches the bytes from the pool instead.
pub struct RecordBuffer {
    bytes: Vec<u8>,
}

impl RecordBuffer {
    /// Checks out an empty buffer from the pool.
    pub(crate) fn get() -> Self {
        Self {
            bytes: pool::get_buffer(),
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Takes the bytes out; the storage does not return to the pool.
    pub fn into_vec(self) -> Vec<u8> {
        let mut this = ManuallyDrop::new(self);
        let bytes = mem::take(&mut this.bytes);
        pool::detach_buffer(bytes.capacity());
        bytes
    }

    /// Returns the buffer to the pool. Equivalent to dropping it.
    pub fn free(self) {}
}

impl Drop for RecordBuffer {
    fn drop(&mut self) {
        pool::put_buffer(mem::take(&mut self.bytes));
    }
}

impl Deref for RecordBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for RecordBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for RecordBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBuffer").field("len", &self.bytes.len()).finish()
    }
}
