// Integration tests for container scanning and extraction.
//
// These tests verify:
//   - Boundary recovery for WebP blocks and Ogg streams
//   - Kind-hint scanner selection and merging
//   - Robustness against truncated and malformed trailing data
//   - The non-overlap and ordering guarantees of extracted entry sets

use pkcarve::engine::{self, extract};
use pkcarve::entry::{AssetKind, KindHint};
use pkcarve::scan::ogg::{self, HeaderType, build_page};
use pkcarve::scan::{Candidate, webp};

// ===========================================================================
// Helpers
// ===========================================================================

fn webp_block(chunk_size: u32, fill: u8) -> Vec<u8> {
    let mut b = webp::header(chunk_size).to_vec();
    b.resize(chunk_size as usize + 8, fill);
    b
}

fn ogg_stream(pages: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, laces) in pages.iter().enumerate() {
        let mut flags = HeaderType::empty();
        if i == 0 {
            flags |= HeaderType::BEGIN_OF_STREAM;
        }
        if i + 1 == pages.len() {
            flags |= HeaderType::END_OF_STREAM;
        }
        out.extend(build_page(flags, laces));
    }
    out
}

fn spans(data: &[u8], hint: KindHint) -> Vec<(usize, usize, AssetKind)> {
    extract(data, hint)
        .iter()
        .map(|e| (e.offset().unwrap(), e.size(), e.kind()))
        .collect()
}

// ===========================================================================
// Worked scenarios
// ===========================================================================

#[test]
fn webp_between_padding() {
    let mut data = b"XX".to_vec();
    data.extend(webp_block(20, 0x11));
    data.extend_from_slice(b"YY");

    let set = extract(&data, KindHint::Image);
    assert_eq!(set.len(), 1);
    let entry = set.iter().next().unwrap();
    assert_eq!(entry.offset(), Some(2));
    assert_eq!(entry.size(), 28);
    assert_eq!(entry.payload(), entry.original_payload());
    assert_eq!(&entry.payload()[..4], b"RIFF");
}

#[test]
fn two_ogg_pages_form_one_stream() {
    let mut data = build_page(HeaderType::BEGIN_OF_STREAM, &[255, 255, 3]);
    data.extend(build_page(HeaderType::END_OF_STREAM, &[17]));

    let set = extract(&data, KindHint::Audio);
    assert_eq!(set.len(), 1);
    let entry = set.iter().next().unwrap();
    assert_eq!(entry.offset(), Some(0));
    assert_eq!(entry.size(), data.len());
    assert_eq!(entry.name(), "audio_0000.ogg");
}

#[test]
fn truncated_segment_table_yields_no_entries() {
    let mut page = build_page(HeaderType::END_OF_STREAM, &[9; 40]);
    page.truncate(ogg::PAGE_HEADER_LEN + 10);

    assert!(ogg::scan(&page).is_empty());
    assert!(extract(&page, KindHint::Audio).is_empty());
    assert!(extract(&page, KindHint::Unknown).is_empty());
}

// ===========================================================================
// Mixed archives
// ===========================================================================

#[test]
fn mixed_archive_with_unknown_hint() {
    let a = webp_block(64, 1);
    let b = ogg_stream(&[&[100], &[50, 50], &[7]]);
    let c = webp_block(10, 2);

    let mut data = Vec::new();
    data.extend_from_slice(&a);
    data.extend_from_slice(b"\x00\x01junk");
    let b_at = data.len();
    data.extend_from_slice(&b);
    let c_at = data.len();
    data.extend_from_slice(&c);

    assert_eq!(
        spans(&data, KindHint::Unknown),
        [
            (0, a.len(), AssetKind::Image),
            (b_at, b.len(), AssetKind::Audio),
            (c_at, c.len(), AssetKind::Image),
        ]
    );

    let names: Vec<_> = extract(&data, KindHint::Unknown)
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, ["image_0000.webp", "audio_0001.ogg", "image_0002.webp"]);
}

#[test]
fn hint_restricts_scanner() {
    let mut data = webp_block(16, 3);
    data.extend(ogg_stream(&[&[8]]));

    assert_eq!(spans(&data, KindHint::Image).len(), 1);
    assert_eq!(spans(&data, KindHint::Audio).len(), 1);
    assert_eq!(spans(&data, KindHint::Unknown).len(), 2);
    assert!(
        spans(&data, KindHint::Audio)
            .iter()
            .all(|(_, _, k)| *k == AssetKind::Audio)
    );
}

#[test]
fn ogg_stream_hidden_in_webp_body_is_suppressed() {
    let inner = ogg_stream(&[&[30]]);
    let mut data = webp::header(4 + inner.len() as u32).to_vec();
    data.extend_from_slice(&inner);
    data.extend(ogg_stream(&[&[4]]));

    let got = spans(&data, KindHint::Unknown);
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], (0, 12 + inner.len(), AssetKind::Image));
    assert_eq!(got[1].0, 12 + inner.len());
    assert_eq!(got[1].2, AssetKind::Audio);
}

#[test]
fn truncated_webp_at_archive_end_is_clamped() {
    let mut data = ogg_stream(&[&[12]]);
    let at = data.len();
    data.extend_from_slice(&webp::header(5000));
    data.extend_from_slice(&[0u8; 100]);

    let got = spans(&data, KindHint::Unknown);
    assert_eq!(got.last(), Some(&(at, 112, AssetKind::Image)));
}

#[test]
fn scan_candidates_match_extract() {
    let mut data = ogg_stream(&[&[1], &[2]]);
    data.extend(webp_block(40, 9));
    data.extend(ogg_stream(&[&[3]]));

    let candidates: Vec<_> = engine::scan_candidates(&data, KindHint::Unknown)
        .into_iter()
        .map(|(k, c)| (c.offset, c.size, k))
        .collect();
    assert_eq!(candidates, spans(&data, KindHint::Unknown));
}

// ===========================================================================
// Robustness
// ===========================================================================

#[test]
fn signature_soup_does_not_panic() {
    let mut data = Vec::new();
    for i in 0..64u8 {
        data.extend_from_slice(b"OggS");
        data.extend_from_slice(b"RIFF");
        data.push(i);
        data.extend_from_slice(b"WEBP");
    }
    let set = extract(&data, KindHint::Unknown);
    let mut last_end = 0;
    for e in &set {
        let range = e.range().unwrap();
        assert!(range.start >= last_end);
        assert!(range.end <= data.len());
        last_end = range.end;
    }
}

#[test]
fn every_prefix_of_an_archive_scans_cleanly() {
    let mut data = webp_block(24, 4);
    data.extend(ogg_stream(&[&[20, 20], &[5]]));
    data.extend(webp_block(8, 5));

    for cut in 0..=data.len() {
        let prefix = &data[..cut];
        for hint in [KindHint::Image, KindHint::Audio, KindHint::Unknown] {
            let set = extract(prefix, hint);
            for e in &set {
                assert!(e.size() > 0);
                assert!(e.range().unwrap().end <= cut);
            }
        }
    }
}

#[test]
fn candidate_helpers() {
    let c = Candidate::new(10, 5);
    assert_eq!(c.end(), 15);
    assert_eq!(c.range(), 10..15);
}
