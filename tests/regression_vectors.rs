use pkcarve::engine::extract;
use pkcarve::entry::{AssetKind, KindHint};
use pkcarve::patch::patch;

#[derive(Debug)]
struct Vector {
    name: String,
    hint: KindHint,
    archive: Vec<u8>,
    expected: Vec<(AssetKind, usize, usize)>,
}

fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }
    assert!(
        s.len().is_multiple_of(2),
        "hex string must have even length"
    );
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn parse_hint(s: &str) -> KindHint {
    match s {
        "image" => KindHint::Image,
        "audio" => KindHint::Audio,
        "unknown" => KindHint::Unknown,
        other => panic!("unknown hint {other}"),
    }
}

/// `kind@offset+size` items separated by `;`, or `-` for none.
fn parse_expected(s: &str) -> Vec<(AssetKind, usize, usize)> {
    if s.trim() == "-" {
        return Vec::new();
    }
    s.trim()
        .split(';')
        .map(|item| {
            let (kind, span) = item.split_once('@').expect("missing @");
            let (offset, size) = span.split_once('+').expect("missing +");
            let kind = match kind {
                "image" => AssetKind::Image,
                "audio" => AssetKind::Audio,
                other => panic!("unknown kind {other}"),
            };
            (kind, offset.parse().unwrap(), size.parse().unwrap())
        })
        .collect()
}

fn load_vectors() -> Vec<Vector> {
    let manifest = include_str!("vectors/manifest.tsv");
    manifest
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            let parts: Vec<_> = line.split('|').collect();
            assert_eq!(parts.len(), 4, "invalid vector row: {line}");
            Vector {
                name: parts[0].to_string(),
                hint: parse_hint(parts[1]),
                archive: hex_to_bytes(parts[2]),
                expected: parse_expected(parts[3]),
            }
        })
        .collect()
}

#[test]
fn vector_database_is_non_empty() {
    let vectors = load_vectors();
    assert!(!vectors.is_empty());
}

#[test]
fn extract_matches_all_vectors() {
    for v in load_vectors() {
        let got: Vec<_> = extract(&v.archive, v.hint)
            .iter()
            .map(|e| (e.kind(), e.offset().unwrap(), e.size()))
            .collect();
        assert_eq!(got, v.expected, "vector {}", v.name);
    }
}

#[test]
fn entry_payloads_are_archive_slices() {
    for v in load_vectors() {
        for e in &extract(&v.archive, v.hint) {
            let range = e.range().unwrap();
            assert_eq!(e.payload(), &v.archive[range], "vector {}", v.name);
        }
    }
}

#[test]
fn identity_patch_all_vectors() {
    for v in load_vectors() {
        let set = extract(&v.archive, v.hint);
        let report = patch(&v.archive, &set);
        assert_eq!(report.modified, 0, "vector {}", v.name);
        assert_eq!(report.archive, v.archive, "vector {}", v.name);
    }
}

#[test]
fn zeroing_every_entry_all_vectors() {
    for v in load_vectors() {
        let mut set = extract(&v.archive, v.hint);
        for e in set.iter_mut() {
            e.replace_payload(Vec::new());
        }
        let report = patch(&v.archive, &set);
        assert_eq!(report.archive.len(), v.archive.len(), "vector {}", v.name);

        let mut expected = v.archive.clone();
        for &(_, offset, size) in &v.expected {
            expected[offset..offset + size].fill(0);
        }
        assert_eq!(report.archive, expected, "vector {}", v.name);
    }
}
