//! Content-defined chunking based on Rabin fingerprints.
//!
//! A [`RabinTable`] is built once from a generator polynomial and a window size. Any
//! number of [`RollingHash`] and [`RabinChunker`] instances can then share it by
//! reference. Chunk boundaries are found where the fingerprint of the last
//! `window_size` bytes has all bits of a mask cleared, subject to minimal and maximal
//! chunk sizes.
//!
//! ```rust
//! # use rabin_chunker::{Chunker, RabinChunker, RabinChunkerOptions, RabinTable};
//! #
//! let table = RabinTable::default();
//! let data = vec![0x2a; 100_000];
//!
//! // Split an in-memory buffer.
//! let options = RabinChunkerOptions::avg(4096);
//! let chunker = RabinChunker::new(&table, options).unwrap();
//! let total: usize = chunker.chunks(&data).map(<[u8]>::len).sum();
//! assert_eq!(total, data.len());
//!
//! // Split a byte stream.
//! let mut stream = RabinChunker::new(&table, options)
//!     .unwrap()
//!     .stream(data.as_slice());
//! let mut total = 0;
//! while let Some(length) = stream.next_chunk().unwrap() {
//!     total += length;
//! }
//! assert_eq!(total, data.len());
//! ```

pub mod hash;
pub mod poly;
pub mod rabin;
pub mod stream;
pub mod table;

pub use hash::RollingHash;
pub use poly::{Polynomial, POLY64};
pub use rabin::{RabinChunker, RabinChunkerOptions};
pub use stream::ChunkStream;
pub use table::RabinTable;

pub mod errors {
    //! Error types.

    use thiserror::Error;

    /// Invalid parameters for building a [`RabinTable`][crate::RabinTable].
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum InvalidTableError {
        #[error("polynomial {0:#x} must have a degree of at least 8")]
        PolynomialDegree(u64),
        #[error("window size must be between 1 and 64 bytes (got {0})")]
        WindowSize(usize),
    }

    /// Invalid [`RabinChunkerOptions`][crate::RabinChunkerOptions].
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum InvalidChunkerOptionsError {
        #[error("`min_chunk_size` must be greater than zero")]
        ZeroMinChunkSize,
        #[error("`min_chunk_size` ({min}) must not be greater than `max_chunk_size` ({max})")]
        MinExceedsMax { min: usize, max: usize },
    }
}

/// Trait for chunking byte streams into blocks.
pub trait Chunker {
    /// Scan for the next block boundary and return it.
    ///
    /// The function returns an offset of the chunk into the provided slice. Bytes
    /// before the offset (or all bytes, if no boundary is found) are consumed by the
    /// chunker and must not be passed again.
    fn scan(&mut self, bytes: &[u8]) -> Option<usize>;

    /// Iterator over the chunks of a byte slice.
    fn chunks(mut self, mut bytes: &[u8]) -> impl Iterator<Item = &[u8]>
    where
        // We put this bound here to make the trait dyn-compatible.
        Self: Sized,
    {
        std::iter::from_fn(move || {
            if bytes.is_empty() {
                None
            } else if let Some(offset) = self.scan(bytes) {
                let chunk = &bytes[..offset];
                bytes = &bytes[offset..];
                Some(chunk)
            } else {
                let chunk = bytes;
                bytes = &[];
                Some(chunk)
            }
        })
    }
}

impl<C: Chunker + ?Sized> Chunker for &mut C {
    fn scan(&mut self, bytes: &[u8]) -> Option<usize> {
        (**self).scan(bytes)
    }
}

impl<C: Chunker + ?Sized> Chunker for Box<C> {
    fn scan(&mut self, bytes: &[u8]) -> Option<usize> {
        (**self).scan(bytes)
    }
}
