// Extraction engine: ties the container scanners to the entry set.
//
// Orchestrates:
//   - Scanner selection from the kind hint (WebP, Ogg, or both)
//   - Merging both scanners' hits by ascending offset
//   - Overlap resolution (earliest start wins)
//   - Synthetic naming and payload capture

use log::debug;

use crate::entry::{AssetKind, Entry, EntrySet, KindHint};
use crate::scan::{self, Candidate};

// ---------------------------------------------------------------------------
// Candidate collection
// ---------------------------------------------------------------------------

/// Run the scanner(s) selected by `hint` and return accepted, typed ranges.
///
/// Ranges are sorted by ascending offset and pairwise disjoint. No payload
/// bytes are copied.
pub fn scan_candidates(data: &[u8], hint: KindHint) -> Vec<(AssetKind, Candidate)> {
    let mut merged: Vec<(AssetKind, Candidate)> = match hint {
        KindHint::Image => typed(AssetKind::Image, scan::webp::scan(data)),
        KindHint::Audio => typed(AssetKind::Audio, scan::ogg::scan(data)),
        KindHint::Unknown => {
            let mut all = typed(AssetKind::Image, scan::webp::scan(data));
            all.extend(typed(AssetKind::Audio, scan::ogg::scan(data)));
            // Stable: at equal offsets the image hit stays first.
            all.sort_by_key(|(_, c)| c.offset);
            all
        }
    };

    let found = merged.len();
    dedup_overlaps(&mut merged);
    if merged.len() != found {
        debug!(
            "dropped {} overlapping candidate(s), kept {}",
            found - merged.len(),
            merged.len()
        );
    }
    merged
}

fn typed(kind: AssetKind, candidates: Vec<Candidate>) -> Vec<(AssetKind, Candidate)> {
    candidates.into_iter().map(|c| (kind, c)).collect()
}

/// Drop candidates that start at or before the end of the last accepted one.
///
/// Input must be sorted by offset. Empty candidates are dropped as well.
fn dedup_overlaps(candidates: &mut Vec<(AssetKind, Candidate)>) {
    // Inclusive end of the last accepted candidate.
    let mut last_end: Option<usize> = None;
    candidates.retain(|(_, c)| {
        if c.size == 0 {
            return false;
        }
        if last_end.is_some_and(|end| c.offset <= end) {
            return false;
        }
        last_end = Some(c.offset + c.size - 1);
        true
    });
}

// ---------------------------------------------------------------------------
// High-level extract
// ---------------------------------------------------------------------------

/// Name of the `index`-th accepted entry, e.g. `audio_0007.ogg`.
pub fn entry_name(kind: AssetKind, index: usize) -> String {
    format!("{}_{index:04}.{}", kind.label(), kind.extension())
}

/// Scan `data` and build an entry set of every located asset.
///
/// Each entry's payload and original payload are copies of the archive
/// bytes at its offset.
pub fn extract(data: &[u8], hint: KindHint) -> EntrySet {
    let candidates = scan_candidates(data, hint);

    let set: EntrySet = candidates
        .iter()
        .enumerate()
        .map(|(i, &(kind, c))| {
            Entry::new(
                entry_name(kind, i),
                Some(c.offset),
                kind,
                data[c.range()].to_vec(),
            )
        })
        .collect();

    debug!("extracted {} asset(s) from {} bytes ({hint:?})", set.len(), data.len());
    set
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
