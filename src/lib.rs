//! Pkcarve: locate, extract and patch media assets in index-less archives.
//!
//! `.pk` archives are WebP images or Ogg streams concatenated with no
//! directory. Asset boundaries are recovered from each format's own framing,
//! and modified assets are written back in place without changing the
//! archive length.
//!
//! The crate provides:
//! - Container scanners for RIFF/WEBP and Ogg (`scan`)
//! - Extraction into a typed, non-overlapping entry set (`engine`, `entry`)
//! - A fixed-length patch engine (`patch`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use pkcarve::engine;
//! use pkcarve::entry::KindHint;
//! use pkcarve::patch;
//!
//! let archive = std::fs::read("sm.pk").unwrap();
//! let mut entries = engine::extract(&archive, KindHint::Audio);
//! entries.replace("audio_0000.ogg", std::fs::read("new.ogg").unwrap());
//!
//! let report = patch::patch(&archive, &entries);
//! assert_eq!(report.archive.len(), archive.len());
//! if report.is_unchanged() {
//!     eprintln!("nothing to save");
//! }
//! ```

pub mod engine;
pub mod entry;
pub mod io;
pub mod patch;
pub mod scan;
pub mod search;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::extract;
pub use entry::{Archive, AssetKind, Entry, EntrySet, KindHint};
pub use patch::{PatchReport, patch};
