//! Byte-array memory backend.
//!
//! One backend covers both RAM and ROM: the only difference is the
//! writability flag, so `Memory::ram` and `Memory::rom` are the two
//! constructors. Out-of-range accesses never propagate — a read reports and
//! returns 0, a write reports and is dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use crate::device::{Address, Device};

/// Failures from the bulk-load helpers.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The load offset lies outside the backing store.
    #[error("offset {offset:#06X} outside backing store of {size} bytes")]
    OffsetOutOfRange {
        /// Requested offset.
        offset: u16,
        /// Size of the backing store.
        size: usize,
    },

    /// The image does not fit between the offset and the end of the store.
    #[error("{len} bytes at offset {offset:#06X} overflow backing store of {size} bytes")]
    ImageTooLarge {
        /// Length of the image.
        len: usize,
        /// Requested offset.
        offset: u16,
        /// Size of the backing store.
        size: usize,
    },

    /// Reading the image file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Fixed-size byte store attachable to the bus.
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
    writable: bool,
    name: &'static str,
}

impl Memory {
    /// Writable memory of `size` bytes, zero-filled.
    pub fn ram(size: usize) -> Self {
        Self {
            data: vec![0; size],
            writable: true,
            name: "ram",
        }
    }

    /// Read-only memory of `size` bytes, zero-filled.
    ///
    /// Load contents with [`Memory::load`] or [`Memory::load_file`]; the
    /// writability flag only gates bus traffic, not the helpers.
    pub fn rom(size: usize) -> Self {
        Self {
            data: vec![0; size],
            writable: false,
            name: "rom",
        }
    }

    /// Size of the backing store in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Fill the whole store with deterministic pseudo-random bytes.
    ///
    /// The same seed always produces the same contents, so tests that model
    /// power-on garbage stay reproducible.
    pub fn fill_random(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for byte in &mut self.data {
            *byte = rng.gen();
        }
    }

    /// Copy `bytes` into the store starting at `offset`.
    pub fn load(&mut self, offset: u16, bytes: &[u8]) -> Result<(), MemoryError> {
        let size = self.data.len();
        let offset_usize = offset as usize;
        if offset_usize > size {
            return Err(MemoryError::OffsetOutOfRange { offset, size });
        }
        if size - offset_usize < bytes.len() {
            return Err(MemoryError::ImageTooLarge {
                len: bytes.len(),
                offset,
                size,
            });
        }
        self.data[offset_usize..offset_usize + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Read a binary image from `path` into the store starting at `offset`.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P, offset: u16) -> Result<(), MemoryError> {
        let image = std::fs::read(path)?;
        self.load(offset, &image)
    }
}

impl Device for Memory {
    fn name(&self) -> &str {
        self.name
    }

    fn read(&mut self, addr: Address) -> u8 {
        match self.data.get(addr.relative as usize) {
            Some(&byte) => byte,
            None => {
                log::warn!(
                    "{} read outside range: {:#06X} (size {})",
                    self.name,
                    addr.relative,
                    self.data.len()
                );
                0
            }
        }
    }

    fn write(&mut self, addr: Address, data: u8) {
        if !self.writable {
            return;
        }
        match self.data.get_mut(addr.relative as usize) {
            Some(byte) => *byte = data,
            None => {
                log::warn!(
                    "{} write outside range: {:#06X} (size {})",
                    self.name,
                    addr.relative,
                    self.data.len()
                );
            }
        }
    }
}
