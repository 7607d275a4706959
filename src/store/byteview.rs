//! Immutable Byte View
//!
//! The value type handed out by the cache. A `ByteView` wraps a reference-counted,
//! immutable buffer: cloning and slicing share the buffer, while every accessor that
//! hands bytes to the caller for ownership (`byte_slice`, `copy_to`) copies them.

use bytes::Bytes;
use std::fmt;
use std::io::{self, Cursor, Write};

use super::lru::ByteSize;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    /// Copies `data` into a fresh immutable buffer.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(data),
        }
    }

    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns an owned copy of the bytes.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// Read-only access without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.b
    }

    /// Returns the byte at index `i`. Panics when out of range, like slice indexing.
    pub fn at(&self, i: usize) -> u8 {
        self.b[i]
    }

    /// A new view over `[from, to)` sharing the same buffer.
    pub fn slice(&self, from: usize, to: usize) -> ByteView {
        Self {
            b: self.b.slice(from..to),
        }
    }

    pub fn slice_from(&self, from: usize) -> ByteView {
        Self {
            b: self.b.slice(from..),
        }
    }

    /// Copies as many bytes as fit into `dest` and returns how many were copied.
    pub fn copy_to(&self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.b.len());
        dest[..n].copy_from_slice(&self.b[..n]);
        n
    }

    pub fn equal_str(&self, s: &str) -> bool {
        self.b.as_ref() == s.as_bytes()
    }

    pub fn equal_bytes(&self, other: &[u8]) -> bool {
        self.b.as_ref() == other
    }

    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.b.clone())
    }

    /// Positional read. Reading at or past the end is an `UnexpectedEof` error; a short
    /// read returns the number of bytes copied.
    pub fn read_at(&self, buf: &mut [u8], offset: usize) -> io::Result<usize> {
        if offset >= self.b.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "view: offset past end",
            ));
        }
        Ok(self.slice_from(offset).copy_to(buf))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        writer.write_all(&self.b)?;
        Ok(self.b.len())
    }

    pub fn into_bytes(self) -> Bytes {
        self.b
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(v: Vec<u8>) -> Self {
        Self { b: Bytes::from(v) }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::copy_from_slice(s.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        Self {
            b: Bytes::from(s.into_bytes()),
        }
    }
}

impl From<Bytes> for ByteView {
    fn from(b: Bytes) -> Self {
        Self { b }
    }
}

impl PartialEq<str> for ByteView {
    fn eq(&self, other: &str) -> bool {
        self.equal_str(other)
    }
}

impl PartialEq<&str> for ByteView {
    fn eq(&self, other: &&str) -> bool {
        self.equal_str(other)
    }
}

impl PartialEq<[u8]> for ByteView {
    fn eq(&self, other: &[u8]) -> bool {
        self.equal_bytes(other)
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.b
    }
}

impl ByteSize for ByteView {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView")
            .field(&String::from_utf8_lossy(&self.b))
            .finish()
    }
}
