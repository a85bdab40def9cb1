// RIFF/WEBP block scanner.
//
// Block layout:
//   0..4   "RIFF"
//   4..8   chunk size, u32 little-endian, excluding these 8 bytes
//   8..12  "WEBP"
//
// The declared size is trusted; a block running past the end of the buffer
// is clamped to what remains.

use memchr::memmem::Finder;

use crate::search;

use super::Candidate;

pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WEBP_FORM: &[u8; 4] = b"WEBP";

/// Bytes of the RIFF tag and size field not counted by the size field.
pub const RIFF_PREAMBLE: usize = 8;

/// Locate every RIFF/WEBP block in `data`, in ascending offset order.
pub fn scan(data: &[u8]) -> Vec<Candidate> {
    let mut found = Vec::new();
    let finder = Finder::new(RIFF_MAGIC);
    let mut cursor = 0usize;

    while let Some(pos) = search::find_with(&finder, data, cursor) {
        match block_len(data, pos) {
            Some(len) => {
                found.push(Candidate::new(pos, len));
                cursor = pos + len;
            }
            // Not a WebP RIFF (or too short to tell); skip the tag.
            None => cursor = pos + RIFF_MAGIC.len(),
        }
    }

    found
}

/// Length of the RIFF/WEBP block starting at `pos`, clamped to the buffer.
///
/// Returns `None` if `pos` does not start a RIFF/WEBP block.
pub fn block_len(data: &[u8], pos: usize) -> Option<usize> {
    let header = data.get(pos..pos.checked_add(12)?)?;
    if &header[0..4] != RIFF_MAGIC || &header[8..12] != WEBP_FORM {
        return None;
    }
    let declared = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    let total = declared.saturating_add(RIFF_PREAMBLE);
    Some(total.min(data.len() - pos))
}

/// Build a RIFF/WEBP header declaring `chunk_size`, for tests and tooling.
pub fn header(chunk_size: u32) -> [u8; 12] {
    let mut h = [0u8; 12];
    h[0..4].copy_from_slice(RIFF_MAGIC);
    h[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    h[8..12].copy_from_slice(WEBP_FORM);
    h
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
