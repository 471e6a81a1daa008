//! Text vs. binary classification of captured bytes
//!
//! A heuristic, not a format sniff: non-ASCII UTF-8 text may be reported as
//! binary.

/// Minimum fraction of text-like bytes for a sample to count as text
pub const TEXT_RATIO_THRESHOLD: f64 = 0.85;

/// Check if a byte sample looks binary
///
/// Empty samples are text. Any NUL byte makes the sample binary. Otherwise
/// the sample is binary when fewer than [`TEXT_RATIO_THRESHOLD`] of its bytes
/// are tab, newline, carriage return or printable ASCII.
pub fn is_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    let text_like = sample.iter().filter(|&&b| is_text_byte(b)).count();
    (text_like as f64 / sample.len() as f64) < TEXT_RATIO_THRESHOLD
}

fn is_text_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | 0x20..=0x7e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_text() {
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_plain_ascii_is_text() {
        assert!(!is_binary(b"processor\t: 0\nvendor_id\t: GenuineIntel\r\n"));
    }

    #[test]
    fn test_nul_is_binary() {
        assert!(is_binary(b"abc\0def"));
        assert!(is_binary(b"\0"));
    }

    #[test]
    fn test_threshold_boundary() {
        // 17 of 20 text bytes = 0.85, not below the threshold
        let mut sample = vec![b'a'; 17];
        sample.extend_from_slice(&[0xff; 3]);
        assert!(!is_binary(&sample));

        // 16 of 20 = 0.80
        let mut sample = vec![b'a'; 16];
        sample.extend_from_slice(&[0xff; 4]);
        assert!(is_binary(&sample));
    }

    #[test]
    fn test_non_ascii_utf8_can_be_binary() {
        // Known limitation
        assert!(is_binary("ÄÖÜäöü".as_bytes()));
    }
}
