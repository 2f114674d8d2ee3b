//! [`Chunker`] placing boundaries where the Rabin fingerprint matches a mask.

use std::io::BufRead;

use crate::errors::InvalidChunkerOptionsError;
use crate::hash::RollingHash;
use crate::stream::ChunkStream;
use crate::table::RabinTable;
use crate::Chunker;

/// Default average chunk size (`8KiB`).
pub const DEFAULT_AVG_CHUNK_SIZE: usize = 8 * 1024;

/// Options for [`RabinChunker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RabinChunkerOptions {
    /// Minimal size of chunks.
    pub min_chunk_size: usize,
    /// Maximal size of chunks.
    pub max_chunk_size: usize,
    /// Mask applied to the fingerprint, a boundary requires all masked bits to be zero.
    pub boundary_mask: u64,
}

impl RabinChunkerOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::avg(DEFAULT_AVG_CHUNK_SIZE)
    }

    /// Options for the given average chunk size.
    ///
    /// The average is rounded down to a power of two, the mask has one bit for each
    /// bit of that power.
    pub fn avg(avg_size: usize) -> Self {
        let bits = avg_size.max(1).ilog2();
        Self {
            min_chunk_size: avg_size / 4,
            max_chunk_size: avg_size.saturating_mul(4),
            boundary_mask: (1u64 << bits.min(63)) - 1,
        }
    }

    /// Set the minimal chunk size.
    pub fn with_min(mut self, min_chunk_size: usize) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    /// Set the maximal chunk size.
    pub fn with_max(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Set the boundary mask.
    pub fn with_mask(mut self, boundary_mask: u64) -> Self {
        self.boundary_mask = boundary_mask;
        self
    }

    /// Check whether the options are valid.
    pub fn check(&self) -> Result<(), InvalidChunkerOptionsError> {
        if self.min_chunk_size == 0 {
            Err(InvalidChunkerOptionsError::ZeroMinChunkSize)
        } else if self.min_chunk_size > self.max_chunk_size {
            Err(InvalidChunkerOptionsError::MinExceedsMax {
                min: self.min_chunk_size,
                max: self.max_chunk_size,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for RabinChunkerOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Chunker`] based on a rolling Rabin fingerprint.
///
/// The fingerprint is never reset at chunk boundaries, it always covers the last
/// `window_size` bytes of the entire stream.
#[derive(Debug, Clone)]
pub struct RabinChunker<'t> {
    /// Rolling hash over the stream.
    hash: RollingHash<'t>,
    /// Options of the chunker.
    options: RabinChunkerOptions,
    /// Current chunk size.
    chunk_size: usize,
}

impl<'t> RabinChunker<'t> {
    /// Create a new chunker.
    pub fn new(
        table: &'t RabinTable,
        options: RabinChunkerOptions,
    ) -> Result<Self, InvalidChunkerOptionsError> {
        options.check()?;
        Ok(Self {
            hash: RollingHash::new(table),
            options,
            chunk_size: 0,
        })
    }

    /// Create a streaming chunker reading from the given reader.
    pub fn from_reader<R: BufRead>(
        table: &'t RabinTable,
        reader: R,
        options: RabinChunkerOptions,
    ) -> Result<ChunkStream<Self, R>, InvalidChunkerOptionsError> {
        Ok(Self::new(table, options)?.stream(reader))
    }

    /// Turn the chunker into a streaming chunker reading from the given reader.
    pub fn stream<R: BufRead>(self, reader: R) -> ChunkStream<Self, R> {
        ChunkStream::new(self, reader)
    }

    /// Options of the chunker.
    pub fn options(&self) -> &RabinChunkerOptions {
        &self.options
    }

    /// Current fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.hash.sum()
    }

    /// Number of bytes consumed since the last boundary.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Check whether the input stream shall be broken at the current position.
    #[inline(always)]
    fn shall_break(&self) -> bool {
        (self.chunk_size >= self.options.min_chunk_size
            && self.hash.sum() & self.options.boundary_mask == 0)
            || self.chunk_size >= self.options.max_chunk_size
    }
}

impl Chunker for RabinChunker<'_> {
    fn scan(&mut self, bytes: &[u8]) -> Option<usize> {
        for (idx, byte) in bytes.iter().enumerate() {
            self.hash.write_byte(*byte);
            self.chunk_size += 1;
            if self.shall_break() {
                self.chunk_size = 0;
                return Some(idx + 1);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options() {
        let options = RabinChunkerOptions::default();
        assert_eq!(options.boundary_mask, 0x1FFF);
        assert_eq!(options.min_chunk_size, 2048);
        assert_eq!(options.max_chunk_size, 32768);
        assert!(options.check().is_ok());
        assert_eq!(RabinChunkerOptions::avg(5000).boundary_mask, 0xFFF);
        assert_eq!(
            RabinChunkerOptions::avg(1).check(),
            Err(InvalidChunkerOptionsError::ZeroMinChunkSize)
        );
        assert_eq!(
            options.with_min(100).with_max(99).check(),
            Err(InvalidChunkerOptionsError::MinExceedsMax { min: 100, max: 99 })
        );
        assert!(options.with_min(64).with_max(64).check().is_ok());
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let table = RabinTable::default();
        let options = RabinChunkerOptions::new().with_min(0);
        assert!(RabinChunker::new(&table, options).is_err());
    }

    #[test]
    fn test_scan_across_slices() {
        let table = RabinTable::default();
        let options = RabinChunkerOptions::new()
            .with_min(1)
            .with_max(10)
            .with_mask(u64::MAX);
        let mut chunker = RabinChunker::new(&table, options).unwrap();
        let data = [0x11; 25];
        assert_eq!(chunker.scan(&data[..4]), None);
        assert_eq!(chunker.chunk_size(), 4);
        assert_eq!(chunker.scan(&data[4..]), Some(6));
        assert_eq!(chunker.scan(&data[10..]), Some(10));
        assert_eq!(chunker.scan(&data[20..]), None);
        assert_eq!(chunker.chunk_size(), 5);
    }

    #[test]
    fn test_zero_bytes_break_at_min() {
        // The fingerprint of zero bytes is zero and matches any mask.
        let table = RabinTable::default();
        let options = RabinChunkerOptions::new().with_min(100).with_max(1000);
        let chunker = RabinChunker::new(&table, options).unwrap();
        let data = vec![0; 450];
        let lengths = chunker.chunks(&data).map(<[u8]>::len).collect::<Vec<_>>();
        assert_eq!(lengths, [100, 100, 100, 100, 50]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_serde() {
        let options = RabinChunkerOptions::avg(64 * 1024);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(
            json,
            r#"{"min_chunk_size":16384,"max_chunk_size":262144,"boundary_mask":65535}"#
        );
        let parsed: RabinChunkerOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
