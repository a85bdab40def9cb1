// Fixed-length patch engine.
//
// Writes modified entry payloads back over their original bytes:
//   - Relocation: stored offset if its bytes still match, else first match
//     of the original payload anywhere in the archive
//   - Shorter payloads are zero-padded to the original span
//   - Longer payloads are truncated to the original span
//
// The archive is never resized or reordered, so the offsets of unmodified
// neighbors stay valid.

use log::{debug, info, warn};

use crate::entry::{Entry, EntrySet};
use crate::search;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// How an entry's original bytes were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// The stored offset still held the original bytes.
    StoredOffset,
    /// Found by searching the archive for the original bytes.
    Searched,
}

/// How the new payload fitted the original span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Same length as the original.
    Exact,
    /// Shorter; `zeroed` trailing bytes of the span were cleared.
    Padded { zeroed: usize },
    /// Longer; the last `dropped` bytes of the payload were not written.
    Truncated { dropped: usize },
}

impl Fit {
    fn for_sizes(original: usize, new: usize) -> Self {
        use std::cmp::Ordering;
        match new.cmp(&original) {
            Ordering::Equal => Self::Exact,
            Ordering::Less => Self::Padded {
                zeroed: original - new,
            },
            Ordering::Greater => Self::Truncated {
                dropped: new - original,
            },
        }
    }

    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// One entry written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub name: String,
    /// Where the payload was written.
    pub offset: usize,
    pub relocation: Relocation,
    pub fit: Fit,
}

/// Result of `patch()`.
#[derive(Debug, Clone, Default)]
pub struct PatchReport {
    /// Rewritten archive; always the same length as the input.
    pub archive: Vec<u8>,
    /// Number of entries written.
    pub modified: usize,
    /// Modified entries whose original bytes could not be found.
    pub unlocated: Vec<String>,
    /// Per-entry details, in entry set order.
    pub outcomes: Vec<EntryOutcome>,
}

impl PatchReport {
    /// Nothing was written; the archive equals the input.
    pub fn is_unchanged(&self) -> bool {
        self.modified == 0
    }

    /// Entries whose replacement was cut to fit.
    pub fn truncated(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| o.fit.is_lossy())
    }
}

// ---------------------------------------------------------------------------
// Relocation
// ---------------------------------------------------------------------------

/// Find where `entry`'s original bytes live in `archive`.
///
/// An entry with an empty original payload has no span and is never found.
pub fn locate(archive: &[u8], entry: &Entry) -> Option<(usize, Relocation)> {
    let original = entry.original_payload();
    if original.is_empty() {
        return None;
    }

    if let Some(offset) = entry.offset() {
        let stored = offset
            .checked_add(original.len())
            .and_then(|end| archive.get(offset..end));
        if stored == Some(original) {
            return Some((offset, Relocation::StoredOffset));
        }
        debug!(
            "{}: bytes at stored offset {offset:#010X} differ, searching",
            entry.name()
        );
    }

    search::find(archive, original).map(|pos| (pos, Relocation::Searched))
}

// ---------------------------------------------------------------------------
// Write policy
// ---------------------------------------------------------------------------

/// Overwrite `span` with `payload`, zero-filling or truncating to fit.
fn write_fixed(span: &mut [u8], payload: &[u8]) -> Fit {
    let fit = Fit::for_sizes(span.len(), payload.len());
    let n = payload.len().min(span.len());
    span[..n].copy_from_slice(&payload[..n]);
    span[n..].fill(0);
    fit
}

// ---------------------------------------------------------------------------
// High-level patch
// ---------------------------------------------------------------------------

/// Write every modified entry of `entries` into a copy of `archive`.
///
/// Entries whose payload equals their original payload are skipped.
/// Unlocatable entries are listed in the report and do not abort the rest.
pub fn patch(archive: &[u8], entries: &EntrySet) -> PatchReport {
    let mut report = PatchReport {
        archive: archive.to_vec(),
        ..Default::default()
    };

    let pending = entries.modified().count();
    for (n, entry) in entries.modified().enumerate() {
        debug!("processing {} ({}/{pending})", entry.name(), n + 1);

        let Some((offset, relocation)) = locate(&report.archive, entry) else {
            warn!("could not locate {} in archive", entry.name());
            report.unlocated.push(entry.name().to_string());
            continue;
        };

        let span = &mut report.archive[offset..offset + entry.size()];
        let fit = write_fixed(span, entry.payload());
        match fit {
            Fit::Truncated { dropped } => warn!(
                "replaced {} at {offset:#010X} (truncated from {} to {} bytes, {dropped} dropped)",
                entry.name(),
                entry.payload().len(),
                entry.size()
            ),
            Fit::Padded { zeroed } => info!(
                "replaced {} at {offset:#010X} ({zeroed} trailing bytes zeroed)",
                entry.name()
            ),
            Fit::Exact => info!("replaced {} at {offset:#010X}", entry.name()),
        }

        report.modified += 1;
        report.outcomes.push(EntryOutcome {
            name: entry.name().to_string(),
            offset,
            relocation,
            fit,
        });
    }

    debug_assert_eq!(report.archive.len(), archive.len());
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
