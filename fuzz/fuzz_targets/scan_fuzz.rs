#![no_main]
use libfuzzer_sys::fuzz_target;
use pkcarve::engine::extract;
use pkcarve::entry::KindHint;

fuzz_target!(|data: &[u8]| {
    for hint in [KindHint::Image, KindHint::Audio, KindHint::Unknown] {
        let set = extract(data, hint);

        // Entries are ordered, non-empty, disjoint and in bounds.
        let mut next_free = 0usize;
        for e in &set {
            let range = e.range().unwrap();
            assert!(!range.is_empty());
            assert!(range.start >= next_free);
            assert!(range.end <= data.len());
            assert_eq!(e.payload(), &data[range.clone()]);
            next_free = range.end;
        }
    }
});
