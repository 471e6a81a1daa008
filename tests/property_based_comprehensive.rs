//! Property-based tests for the snapshot core
//!
//! Core properties tested:
//! 1. Classifier totality and the NUL rule
//! 2. Exclude-over-include precedence in the path filter
//! 3. Budget accounting never over-spends
//! 4. Per-file truncation length and hash

use hwsnap::budget::Budget;
use hwsnap::capture::{capture, CaptureSettings};
use hwsnap::classify::is_binary;
use hwsnap::filter::PathFilter;
use proptest::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_classifier_is_total_and_idempotent(sample in prop::collection::vec(any::<u8>(), 0..512)) {
        let first = is_binary(&sample);
        prop_assert_eq!(first, is_binary(&sample));
    }

    #[test]
    fn prop_nul_byte_is_always_binary(
        sample in prop::collection::vec(any::<u8>(), 0..256),
        pos in any::<prop::sample::Index>(),
    ) {
        let mut sample = sample;
        let at = pos.index(sample.len() + 1);
        sample.insert(at, 0);
        prop_assert!(is_binary(&sample));
    }

    #[test]
    fn prop_printable_ascii_is_text(sample in "[ -~\t\r\n]{0,256}") {
        prop_assert!(!is_binary(sample.as_bytes()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_exclude_beats_include(segments in prop::collection::vec("[a-z]{1,8}", 1..6)) {
        let path = format!("/{}", segments.join("/"));
        let pattern = vec![path.clone()];

        let filter = PathFilter::new(&pattern, &pattern).unwrap();
        prop_assert!(!filter.should_include(&path));

        let include_only = PathFilter::new(&pattern, &[]).unwrap();
        prop_assert!(include_only.should_include(&path));
    }

    #[test]
    fn prop_budget_never_overspends(
        total in 0u64..10_000,
        requests in prop::collection::vec(0u64..4_000, 0..20),
    ) {
        let mut budget = Budget::new(Some(total));
        let mut spent = 0u64;
        for request in requests {
            let granted = budget.reserve(request);
            prop_assert!(granted <= request);
            let before = budget.remaining();
            budget.debit(granted);
            prop_assert!(budget.remaining() <= before);
            spent += granted;
        }
        prop_assert!(spent <= total);
        prop_assert_eq!(budget.remaining(), total - spent);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_truncation_keeps_exactly_cap_bytes(len in 0usize..300, cap in 0u64..200) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data");
        let body: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
        fs::write(&path, &body).unwrap();

        let settings = CaptureSettings {
            max_file_bytes: cap,
            ..CaptureSettings::default()
        };
        let rec = capture(&path, &settings, &mut Budget::unlimited());

        let kept = body.len().min(cap as usize);
        prop_assert_eq!(rec.truncated, Some(body.len() as u64 > cap));
        prop_assert_eq!(rec.content_len(), kept);
        let expected = hex::encode(Sha256::digest(&body[..kept]));
        prop_assert_eq!(rec.sha256_hex.as_deref(), Some(expected.as_str()));
    }
}
