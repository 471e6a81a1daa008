#![no_main]

use hwsnap::classify::is_binary;
use hwsnap::filter::PathFilter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Classification must be total over arbitrary bytes
    let _ = is_binary(data);

    // First line is a glob, the rest are paths to test against it
    if let Ok(input) = std::str::from_utf8(data) {
        let mut lines = input.lines();
        let Some(pattern) = lines.next() else {
            return;
        };
        let globs = vec![pattern.to_string()];
        if let Ok(filter) = PathFilter::new(&globs, &globs) {
            for path in lines {
                // Exclude always wins when the same pattern is on both sides
                assert!(!filter.should_include(path));
            }
        }
    }
});
