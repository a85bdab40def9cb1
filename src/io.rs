// File-level helpers around the extraction and patch engines.
//
// Provides archive loading, kind-hint inference from file names, dumping
// entries to a folder, loading replacement files, and the full
// load -> extract -> replace -> patch -> write pipeline (`patch_file()`).
// Optionally computes SHA-256 checksums (feature-gated behind `file-io`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::engine;
use crate::entry::{Archive, Entry, EntrySet, KindHint, ReplaceOutcome};
use crate::patch;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations. Always carries the failing path.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("cannot list directory {}: {source}", path.display())]
    ListDir { path: PathBuf, source: io::Error },
}

impl IoError {
    /// The path the failing operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::CreateDir { path, .. }
            | Self::ListDir { path, .. } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `dump_entries()`.
#[derive(Debug, Clone, Default)]
pub struct DumpStats {
    /// Number of files written.
    pub files: usize,
    /// Total payload bytes written.
    pub bytes: u64,
}

/// A replacement file matched to an entry by `load_replacements()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedReplacement {
    pub name: String,
    pub outcome: ReplaceOutcome,
}

/// Statistics returned by `patch_file()`.
#[derive(Debug, Clone)]
pub struct PatchFileStats {
    /// Input archive size in bytes (equal to the output size).
    pub archive_size: u64,
    /// Number of entries located in the archive.
    pub entries: usize,
    /// Number of replacement files matched to entries.
    pub replacements: usize,
    /// Number of entries written into the output.
    pub modified: usize,
    /// Modified entries that could not be located.
    pub unlocated: Vec<String>,
    /// Entries whose replacement was truncated to fit.
    pub truncated: Vec<String>,
    /// Whether the output file was written (only when `modified > 0`).
    pub written: bool,
    /// SHA-256 of the input archive (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
    /// SHA-256 of the written output (if written and `file-io` is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Reading and writing
// ---------------------------------------------------------------------------

/// Read a whole archive into memory.
pub fn read_archive(path: &Path) -> Result<Archive, IoError> {
    let bytes = fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(Archive::new(bytes))
}

/// Write archive bytes to `path`, replacing any existing file.
pub fn write_archive(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    fs::write(path, bytes).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Guess which scanner(s) suit an archive from its file name.
///
/// `*tx.pk` holds textures (WebP), any other `*.pk` holds audio (Ogg),
/// anything else is scanned for both. Case-insensitive.
pub fn infer_kind_hint(path: &Path) -> KindHint {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return KindHint::Unknown;
    };
    let name = name.to_ascii_lowercase();
    if name.ends_with("tx.pk") {
        KindHint::Image
    } else if name.ends_with(".pk") {
        KindHint::Audio
    } else {
        KindHint::Unknown
    }
}

// ---------------------------------------------------------------------------
// Dumping entries
// ---------------------------------------------------------------------------

/// Write every entry's current payload to `dir/<entry name>`.
///
/// The directory is created if missing. With the `parallel` feature the
/// files are written concurrently.
pub fn dump_entries(entries: &EntrySet, dir: &Path) -> Result<DumpStats, IoError> {
    fs::create_dir_all(dir).map_err(|source| IoError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_one = |entry: &Entry| -> Result<u64, IoError> {
        let path = dir.join(entry.name());
        fs::write(&path, entry.payload()).map_err(|source| IoError::Write { path, source })?;
        Ok(entry.payload().len() as u64)
    };

    #[cfg(feature = "parallel")]
    let sizes: Vec<u64> = {
        use rayon::prelude::*;
        let all: Vec<_> = entries.iter().collect();
        all.par_iter()
            .map(|e| write_one(*e))
            .collect::<Result<_, _>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let sizes: Vec<u64> = entries.iter().map(write_one).collect::<Result<_, _>>()?;

    let stats = DumpStats {
        files: sizes.len(),
        bytes: sizes.iter().sum(),
    };
    info!("wrote {} file(s) to {}", stats.files, dir.display());
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Loading replacements
// ---------------------------------------------------------------------------

/// Replace payloads of entries that have a same-named file in `dir`.
///
/// Files that match no entry are ignored with a warning. Results are sorted
/// by entry name.
pub fn load_replacements(
    entries: &mut EntrySet,
    dir: &Path,
) -> Result<Vec<LoadedReplacement>, IoError> {
    let list_err = |source| IoError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut loaded = Vec::new();
    for item in fs::read_dir(dir).map_err(list_err)? {
        let item = item.map_err(list_err)?;
        let path = item.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        if entries.get(&name).is_none() {
            warn!("ignoring {}: no entry with that name", path.display());
            continue;
        }

        let bytes = fs::read(&path).map_err(|source| IoError::Read {
            path: path.clone(),
            source,
        })?;
        if let Some(outcome) = entries.replace(&name, bytes) {
            if outcome.will_truncate() {
                warn!(
                    "{name}: replacement is {} bytes, slot holds {}; it will be truncated",
                    outcome.new_size, outcome.old_size
                );
            } else if outcome.size_changed() {
                warn!(
                    "{name}: replacement is {} bytes, slot holds {}; it will be zero-padded",
                    outcome.new_size, outcome.old_size
                );
            }
            loaded.push(LoadedReplacement { name, outcome });
        }
    }

    loaded.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// patch_file
// ---------------------------------------------------------------------------

/// Patch `archive_path` with the files in `replacements_dir`, writing the
/// result to `output_path`.
///
/// The archive is scanned with `hint`, entries are matched to replacement
/// files by name, and the patched archive is written only if at least one
/// entry was modified.
pub fn patch_file(
    archive_path: &Path,
    replacements_dir: &Path,
    output_path: &Path,
    hint: KindHint,
) -> Result<PatchFileStats, IoError> {
    let archive = read_archive(archive_path)?;
    let mut entries = engine::extract(archive.as_bytes(), hint);
    let loaded = load_replacements(&mut entries, replacements_dir)?;

    let report = patch::patch(archive.as_bytes(), &entries);

    let written = !report.is_unchanged();
    if written {
        write_archive(output_path, &report.archive)?;
        info!(
            "wrote {} ({} modification(s))",
            output_path.display(),
            report.modified
        );
    } else {
        warn!("no modifications applied; {} not written", output_path.display());
    }

    Ok(PatchFileStats {
        archive_size: archive.len() as u64,
        entries: entries.len(),
        replacements: loaded.len(),
        modified: report.modified,
        truncated: report.truncated().map(|o| o.name.clone()).collect(),
        input_sha256: sha256(archive.as_bytes()),
        output_sha256: if written {
            sha256(&report.archive)
        } else {
            None
        },
        unlocated: report.unlocated,
        written,
    })
}

// ---------------------------------------------------------------------------
// Checksums (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    let mut h = sha2::Sha256::new();
    h.update(data);
    Some(h.finalize().into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
