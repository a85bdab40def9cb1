// Byte-sequence search over archive buffers.
//
// Signature scans (`RIFF`, `OggS`) build one `memmem::Finder` per scan and
// step a cursor through the buffer with `find_with`. Patch relocation looks
// up whole asset payloads with `find`.

use memchr::memmem::{self, Finder};

/// Find the first occurrence of `needle` in `haystack` at or after `from`.
///
/// An empty needle matches at `from` (when `from <= haystack.len()`).
pub fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let tail = haystack.get(from..)?;
    memmem::find(tail, needle).map(|p| p + from)
}

/// Find the first occurrence of `needle` anywhere in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memmem::find(haystack, needle)
}

/// Like `find_from`, reusing a prebuilt finder across calls.
pub fn find_with(finder: &Finder<'_>, haystack: &[u8], from: usize) -> Option<usize> {
    let tail = haystack.get(from..)?;
    finder.find(tail).map(|p| p + from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
