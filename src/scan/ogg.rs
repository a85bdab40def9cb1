// Ogg logical stream scanner.
//
// Page layout (only the fields needed for framing are read):
//   0..4    "OggS" capture pattern
//   5       header type flags
//   26      segment count N
//   27..    segment table, N lacing values (0..=255)
//   then    page body, sum(segment table) bytes
//
// A stream is one or more pages walked back to back until a page carrying
// END_OF_STREAM, or until the next bytes are not another page.

use bitflags::bitflags;

use memchr::memmem::Finder;

use crate::search;

use super::Candidate;

pub const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// Fixed part of a page header, up to and including the segment count.
pub const PAGE_HEADER_LEN: usize = 27;

const FLAGS_OFFSET: usize = 5;
const SEGMENT_COUNT_OFFSET: usize = 26;

bitflags! {
    /// Ogg page header type byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderType: u8 {
        /// Page continues a packet from the previous page.
        const CONTINUED = 0x01;
        /// First page of a logical bitstream.
        const BEGIN_OF_STREAM = 0x02;
        /// Last page of a logical bitstream.
        const END_OF_STREAM = 0x04;
    }
}

/// Framing fields of one parsed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub flags: HeaderType,
    pub segment_count: u8,
    /// Body length: sum of the segment table.
    pub data_len: usize,
}

impl PageHeader {
    /// Full page length: header, segment table and body.
    pub fn page_len(&self) -> usize {
        PAGE_HEADER_LEN + self.segment_count as usize + self.data_len
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.flags.contains(HeaderType::END_OF_STREAM)
    }
}

/// Parse the page starting at `pos`.
///
/// Returns `None` if the header, segment table or body would run past the
/// end of `data`. The capture pattern itself is the caller's concern.
pub fn parse_page(data: &[u8], pos: usize) -> Option<PageHeader> {
    let header = data.get(pos..pos.checked_add(PAGE_HEADER_LEN)?)?;
    let flags = HeaderType::from_bits_retain(header[FLAGS_OFFSET]);
    let segment_count = header[SEGMENT_COUNT_OFFSET];

    let table_start = pos + PAGE_HEADER_LEN;
    let table = data.get(table_start..table_start + segment_count as usize)?;
    let data_len = table.iter().map(|&lace| lace as usize).sum();

    let page = PageHeader {
        flags,
        segment_count,
        data_len,
    };
    if pos + page.page_len() > data.len() {
        return None;
    }
    Some(page)
}

/// Locate every complete Ogg logical stream in `data`, in ascending order.
pub fn scan(data: &[u8]) -> Vec<Candidate> {
    let mut found = Vec::new();
    let finder = Finder::new(CAPTURE_PATTERN);
    let mut cursor = 0usize;

    while cursor < data.len() {
        let Some(start) = search::find_with(&finder, data, cursor) else {
            break;
        };

        let end = walk_stream(data, start);
        if end > start {
            found.push(Candidate::new(start, end - start));
            cursor = end;
        } else {
            // Capture pattern without a parsable page.
            cursor = start + CAPTURE_PATTERN.len();
        }
    }

    found
}

/// Walk pages from `start` and return the end offset of the last complete one.
///
/// Returns `start` when not even the first page parses.
fn walk_stream(data: &[u8], start: usize) -> usize {
    let mut pos = start;
    while pos < data.len() {
        let Some(page) = parse_page(data, pos) else {
            break;
        };
        pos += page.page_len();

        if page.is_end_of_stream() {
            break;
        }
        if !data[pos..].starts_with(CAPTURE_PATTERN) {
            break;
        }
    }
    pos
}

/// Build a page with the given flags and one segment per entry of `segments`.
///
/// Granule position, serial, sequence and CRC are zero; only framing matters
/// to the scanner. Intended for tests and tooling.
pub fn build_page(flags: HeaderType, segments: &[u8]) -> Vec<u8> {
    assert!(segments.len() <= u8::MAX as usize, "too many segments");
    let mut page = Vec::with_capacity(PAGE_HEADER_LEN + segments.len());
    page.extend_from_slice(CAPTURE_PATTERN);
    page.push(0); // version
    page.push(flags.bits());
    page.extend_from_slice(&[0u8; 8]); // granule position
    page.extend_from_slice(&[0u8; 4]); // serial
    page.extend_from_slice(&[0u8; 4]); // sequence
    page.extend_from_slice(&[0u8; 4]); // crc
    page.push(segments.len() as u8);
    page.extend_from_slice(segments);
    for (i, &lace) in segments.iter().enumerate() {
        page.extend(std::iter::repeat_n(i as u8, lace as usize));
    }
    page
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
