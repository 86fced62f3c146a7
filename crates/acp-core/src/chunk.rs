//! # Fixed-Window Chunk Reader
//!
//! Turns an arbitrary-length `AsyncRead` into a sequence of chunks of exactly
//! `window` bytes, except for the last one which carries the remainder. Short
//! reads from the underlying source (network bodies deliver whatever frame
//! arrived) are coalesced until the window is full, so a stream of length `L`
//! always produces `ceil(L / window)` chunks.
//!
//! The read buffer is allocated once per reader and owned exclusively by it.

use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::CoreError;

/// Default upload window: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// One window of the source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk payload. Never empty.
    pub bytes: Bytes,
    /// True when end of stream was observed while filling this chunk. A stream
    /// whose length is an exact multiple of the window reports `false` on its
    /// last chunk and `None` on the following call.
    pub is_final: bool,
}

/// Sequential reader yielding fixed-size [`Chunk`]s.
#[derive(Debug)]
pub struct ChunkReader<R> {
    source: R,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl<R: AsyncRead + Unpin> ChunkReader<R> {
    /// Reader with the default 1 MiB window.
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: vec![0; DEFAULT_CHUNK_SIZE],
            exhausted: false,
        }
    }

    /// Reader with a custom window size.
    pub fn with_window(source: R, window: usize) -> Result<Self, CoreError> {
        if window == 0 {
            return Err(CoreError::ZeroWindow);
        }
        Ok(Self {
            source,
            buffer: vec![0; window],
            exhausted: false,
        })
    }

    pub fn window(&self) -> usize {
        self.buffer.len()
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` once the source is exhausted. A read error is
    /// returned as-is and leaves the reader unusable for further chunks.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Chunk>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.source.read(&mut self.buffer[filled..]).await {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        Ok(Some(Chunk {
            bytes: Bytes::copy_from_slice(&self.buffer[..filled]),
            is_final: self.exhausted,
        }))
    }
}
