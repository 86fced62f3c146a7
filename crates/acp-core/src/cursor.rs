//! # Upload Cursor and Byte Ranges
//!
//! The backend's upload protocol addresses each chunk with a
//! `Content-Range: bytes {start}-{end}/*` header, where `end` is inclusive and
//! the total length is left open. [`UploadCursor`] tracks how many bytes the
//! backend has acknowledged and hands out the range for the next chunk.

use std::fmt;

use crate::error::CoreError;

/// Inclusive byte range of one uploaded chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// First byte offset.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset, inclusive.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered. Always at least one.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Ranges are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Render as a `Content-Range` header value with an open total length.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/*", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Running offset into an upload stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadCursor {
    position: u64,
}

impl UploadCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes acknowledged so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Range the next chunk of `len` bytes will occupy, or `None` for an
    /// empty chunk (nothing to send).
    pub fn range_for(&self, len: usize) -> Option<ByteRange> {
        if len == 0 {
            return None;
        }
        Some(ByteRange {
            start: self.position,
            end: self.position + len as u64 - 1,
        })
    }

    /// Move past an acknowledged range.
    ///
    /// The range must start exactly at the current position; the cursor never
    /// moves backwards or skips bytes.
    pub fn advance(&mut self, range: &ByteRange) -> Result<(), CoreError> {
        if range.start != self.position {
            return Err(CoreError::CursorMismatch {
                expected: self.position,
                found: range.start,
            });
        }
        self.position = range.end + 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn first_mebibyte_range() {
        let cursor = UploadCursor::new();
        let range = cursor.range_for(MIB).unwrap();
        assert_eq!(range.content_range(), "bytes 0-1048575/*");
        assert_eq!(range.len(), MIB as u64);
    }

    #[test]
    fn empty_chunk_has_no_range() {
        assert!(UploadCursor::new().range_for(0).is_none());
    }

    #[test]
    fn single_byte_range() {
        let range = UploadCursor::new().range_for(1).unwrap();
        assert_eq!(range.content_range(), "bytes 0-0/*");
    }

    #[test]
    fn five_mebibytes_in_order() {
        let mut cursor = UploadCursor::new();
        let mut headers = Vec::new();
        for _ in 0..5 {
            let range = cursor.range_for(MIB).unwrap();
            headers.push(range.content_range());
            cursor.advance(&range).unwrap();
        }
        assert_eq!(headers[0], "bytes 0-1048575/*");
        assert_eq!(headers[4], "bytes 4194304-5242879/*");
        assert_eq!(cursor.position(), 5_242_880);
    }

    #[test]
    fn advance_rejects_stale_range() {
        let mut cursor = UploadCursor::new();
        let first = cursor.range_for(10).unwrap();
        cursor.advance(&first).unwrap();
        assert_eq!(
            cursor.advance(&first),
            Err(CoreError::CursorMismatch {
                expected: 10,
                found: 0
            })
        );
        assert_eq!(cursor.position(), 10);
    }
}
