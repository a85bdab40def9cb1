// Signature-driven container scanners.
//
// Archives carry no index, so asset boundaries are recovered from each
// embedded format's own framing:
//
// - `webp`: RIFF/WEBP blocks sized by the RIFF chunk length field
// - `ogg`: Ogg logical streams walked page by page until end-of-stream
//
// Both scanners are pure functions of the input buffer and never fail:
// malformed or truncated trailing data simply ends the scan.

pub mod ogg;
pub mod webp;

pub use ogg::{HeaderType, PageHeader};

/// A located byte range `[offset, offset + size)` within a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate {
    pub offset: usize,
    pub size: usize,
}

impl Candidate {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.end()
    }
}
