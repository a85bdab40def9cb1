// Archive, asset kinds and the extracted entry set.
//
// An `EntrySet` is produced by `engine::extract()` and consumed by
// `patch::patch()`. Callers own it in between and may swap entry payloads.

use std::fmt;

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

/// Raw `.pk` archive bytes: asset blocks concatenated with no header or index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    bytes: Vec<u8>,
}

impl Archive {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for Archive {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Archive {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Media type of a located asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// RIFF/WEBP image block.
    Image,
    /// Ogg logical bitstream (Vorbis audio).
    Audio,
}

impl AssetKind {
    /// File extension used for synthetic entry names, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image => "webp",
            Self::Audio => "ogg",
        }
    }

    /// Lowercase label used as the entry name prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("Image"),
            Self::Audio => f.write_str("Audio"),
        }
    }
}

/// Which scanner(s) to run over an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindHint {
    /// WebP scanner only.
    Image,
    /// Ogg scanner only.
    Audio,
    /// Run both scanners and merge their hits.
    #[default]
    Unknown,
}

impl From<AssetKind> for KindHint {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Image => Self::Image,
            AssetKind::Audio => Self::Audio,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One asset located inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    offset: Option<usize>,
    kind: AssetKind,
    payload: Vec<u8>,
    original_payload: Vec<u8>,
}

impl Entry {
    /// Build an entry from bytes found at `offset`. Both payloads start equal.
    pub fn new(
        name: impl Into<String>,
        offset: Option<usize>,
        kind: AssetKind,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            kind,
            payload: bytes.clone(),
            original_payload: bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the original bytes in the archive, if known.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Size of the asset as found in the archive.
    pub fn size(&self) -> usize {
        self.original_payload.len()
    }

    /// Current payload (possibly replaced by the caller).
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes captured at extraction time. Never mutated.
    pub fn original_payload(&self) -> &[u8] {
        &self.original_payload
    }

    pub fn is_modified(&self) -> bool {
        self.payload != self.original_payload
    }

    /// Swap in a new payload, returning the size change.
    pub fn replace_payload(&mut self, bytes: Vec<u8>) -> ReplaceOutcome {
        let outcome = ReplaceOutcome {
            old_size: self.size(),
            new_size: bytes.len(),
        };
        self.payload = bytes;
        outcome
    }

    pub fn revert(&mut self) {
        self.payload.clone_from(&self.original_payload);
    }

    /// Half-open byte range `[offset, offset + size)`, if the offset is known.
    pub fn range(&self) -> Option<std::ops::Range<usize>> {
        self.offset.map(|o| o..o + self.size())
    }
}

/// Size change caused by replacing an entry's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub old_size: usize,
    pub new_size: usize,
}

impl ReplaceOutcome {
    pub fn size_changed(&self) -> bool {
        self.old_size != self.new_size
    }

    /// The replacement is longer than the slot and will be cut when patched.
    pub fn will_truncate(&self) -> bool {
        self.new_size > self.old_size
    }
}

// ---------------------------------------------------------------------------
// EntrySet
// ---------------------------------------------------------------------------

/// Entries of one archive, in ascending offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: Vec<Entry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Callers keep ascending offset order.
    pub fn push(&mut self, entry: Entry) {
        debug_assert!(
            self.get(entry.name()).is_none(),
            "duplicate entry name {}",
            entry.name()
        );
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entry> {
        self.entries.iter_mut()
    }

    /// Entries whose payload differs from the extracted bytes.
    pub fn modified(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_modified())
    }

    /// Replace the payload of the entry called `name`.
    ///
    /// Returns `None` when no such entry exists.
    pub fn replace(&mut self, name: &str, bytes: Vec<u8>) -> Option<ReplaceOutcome> {
        self.get_mut(name).map(|e| e.replace_payload(bytes))
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for EntrySet {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Entry> for EntrySet {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.push(entry);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
