//! Rolling Rabin fingerprint over a fixed-size window.

use crate::table::{RabinTable, MAX_WINDOW_SIZE};

/// Rabin fingerprint of the last [`window_size`][RabinTable::window_size] bytes.
///
/// At any point, [`sum`][Self::sum] equals [`Polynomial::fingerprint`] of the last
/// `min(window_size, bytes_written)` bytes.
///
/// [`Polynomial::fingerprint`]: crate::poly::Polynomial::fingerprint
#[derive(Debug, Clone)]
pub struct RollingHash<'t> {
    /// Lookup tables.
    table: &'t RabinTable,
    /// Ring buffer with the bytes of the window.
    window: [u8; MAX_WINDOW_SIZE],
    /// Number of bytes in the window.
    window_len: usize,
    /// Position of the oldest byte once the window is full.
    window_pos: usize,
    /// Current fingerprint.
    hash: u64,
}

impl<'t> RollingHash<'t> {
    /// Create a rolling hash with an empty window.
    pub fn new(table: &'t RabinTable) -> Self {
        Self {
            table,
            window: [0; MAX_WINDOW_SIZE],
            window_len: 0,
            window_pos: 0,
            hash: 0,
        }
    }

    /// Table used by the hash.
    pub fn table(&self) -> &'t RabinTable {
        self.table
    }

    /// Feed a single byte into the hash.
    #[inline(always)]
    pub fn write_byte(&mut self, byte: u8) {
        let window_size = self.table.window_size();
        if self.window_len < window_size {
            self.hash = self.table.push(self.hash, byte);
            self.window[self.window_len] = byte;
            self.window_len += 1;
        } else {
            let leave = self.window[self.window_pos];
            self.hash = self.table.push(self.table.pop(self.hash, leave), byte);
            self.window[self.window_pos] = byte;
            self.window_pos += 1;
            if self.window_pos == window_size {
                self.window_pos = 0;
            }
        }
    }

    /// Feed the given bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }

    /// Current fingerprint.
    #[inline(always)]
    pub fn sum(&self) -> u64 {
        self.hash
    }

    /// Number of bytes currently in the window.
    pub fn len(&self) -> usize {
        self.window_len
    }

    /// Check whether no bytes have been written since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.window_len == 0
    }

    /// Reset the hash to its initial state.
    pub fn reset(&mut self) {
        self.window_len = 0;
        self.window_pos = 0;
        self.hash = 0;
    }
}

impl std::hash::Hasher for RollingHash<'_> {
    fn finish(&self) -> u64 {
        self.sum()
    }

    fn write(&mut self, bytes: &[u8]) {
        RollingHash::write(self, bytes);
    }

    fn write_u8(&mut self, byte: u8) {
        self.write_byte(byte);
    }
}

impl std::io::Write for RollingHash<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        RollingHash::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
