//! Streaming chunking of [buffered readers][BufRead].

use std::io::{self, BufRead};

use tracing::{debug, trace};

use crate::Chunker;

/// State of a [`ChunkStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// Reading the current chunk.
    Reading,
    /// The reader has been drained or has failed.
    Exhausted,
}

/// Drives a [`Chunker`] over a reader and yields the lengths of the chunks.
///
/// The sum of all yielded lengths equals the number of bytes read. An empty reader
/// yields no chunks at all.
#[derive(Debug)]
pub struct ChunkStream<C, R> {
    /// Chunker deciding on boundaries.
    chunker: C,
    /// Underlying reader.
    reader: R,
    /// Bytes of the current chunk consumed so far.
    chunk_size: usize,
    /// Total number of bytes consumed.
    position: u64,
    /// Number of chunks emitted.
    chunks: u64,
    /// State of the stream.
    state: StreamState,
}

impl<C: Chunker, R: BufRead> ChunkStream<C, R> {
    /// Create a stream from the provided chunker and reader.
    pub fn new(chunker: C, reader: R) -> Self {
        Self {
            chunker,
            reader,
            chunk_size: 0,
            position: 0,
            chunks: 0,
            state: StreamState::Reading,
        }
    }

    /// Read up to the next boundary and return the length of the chunk.
    ///
    /// Returns `None` once the reader has been drained. Errors of the reader are
    /// returned as is, after which the stream is exhausted.
    pub fn next_chunk(&mut self) -> io::Result<Option<usize>> {
        while self.state == StreamState::Reading {
            let buffer = match self.reader.fill_buf() {
                Ok(buffer) => buffer,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    debug!(position = self.position, "reading chunk failed: {error}");
                    self.state = StreamState::Exhausted;
                    return Err(error);
                }
            };
            if buffer.is_empty() {
                self.state = StreamState::Exhausted;
                debug!(
                    chunks = self.chunks + u64::from(self.chunk_size > 0),
                    bytes = self.position,
                    "end of stream"
                );
                if self.chunk_size > 0 {
                    return Ok(Some(self.finish_chunk()));
                }
                break;
            }
            let available = buffer.len();
            let boundary = self.chunker.scan(buffer);
            let consume = boundary.unwrap_or(available);
            self.reader.consume(consume);
            self.chunk_size += consume;
            self.position += consume as u64;
            if boundary.is_some() {
                return Ok(Some(self.finish_chunk()));
            }
        }
        Ok(None)
    }

    /// Complete the current chunk and return its length.
    fn finish_chunk(&mut self) -> usize {
        let length = std::mem::take(&mut self.chunk_size);
        self.chunks += 1;
        trace!(
            offset = self.position - length as u64,
            length,
            "chunk boundary"
        );
        length
    }
}

impl<C, R> ChunkStream<C, R> {
    /// Total number of bytes consumed from the reader.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Chunker used by the stream.
    pub fn chunker(&self) -> &C {
        &self.chunker
    }

    /// Convert the stream back into the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<C: Chunker, R: BufRead> Iterator for ChunkStream<C, R> {
    type Item = io::Result<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

impl<C: Chunker, R: BufRead> std::iter::FusedIterator for ChunkStream<C, R> {}
