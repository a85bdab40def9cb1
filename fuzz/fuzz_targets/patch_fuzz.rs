#![no_main]
use libfuzzer_sys::fuzz_target;
use pkcarve::engine::extract;
use pkcarve::entry::KindHint;
use pkcarve::patch::patch;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks which entries get replaced and how long the
    // replacement is; the rest is the archive.
    let control = data[0];
    let archive = &data[1..];
    let mut set = extract(archive, KindHint::Unknown);
    for (i, e) in set.iter_mut().enumerate() {
        if (control >> (i % 8)) & 1 == 1 {
            let len = (e.size() * (control as usize % 3)) / 2 + 1;
            e.replace_payload(vec![control ^ i as u8; len]);
        }
    }

    let report = patch(archive, &set);
    assert_eq!(report.archive.len(), archive.len());
    assert_eq!(report.modified + report.unlocated.len(), set.modified().count());

    // Untouched bytes outside the written spans are preserved.
    let mut written = vec![false; archive.len()];
    for o in &report.outcomes {
        let size = set.get(&o.name).unwrap().size();
        written[o.offset..o.offset + size].fill(true);
    }
    for (i, &w) in written.iter().enumerate() {
        if !w {
            assert_eq!(report.archive[i], archive[i]);
        }
    }
});
