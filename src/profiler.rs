//! Input profiler: classifies a plaintext buffer by its statistical
//! signature and resolves the catalog profile to encrypt it with.
//!
//! The heuristics are deterministic and deliberately coarse — the class only
//! picks a tuned starting point, and the ciphertext header carries the full
//! sequence, so a misclassification costs quality, never correctness.

use crate::catalog::Catalog;
use crate::error::{MangoError, Result};
use crate::profile::{InputClass, InputProfile};

/// Classification thresholds. The defaults match the conditions the shipped
/// catalog was tuned under; deployments recalibrating against an archived
/// catalog override them via the config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilerThresholds {
    /// Entropy at or above which a buffer reads as random.
    pub random_entropy: f64,
    /// Entropy floor separating text-like data from low-entropy user data.
    pub text_entropy_floor: f64,
    /// Minimum printable-ASCII fraction for natural text.
    pub printable_fraction: f64,
    /// Minimum distinct byte values for a monotonic run to count as a
    /// sequence.
    pub sequence_distinct: usize,
}

impl Default for ProfilerThresholds {
    fn default() -> Self {
        Self {
            random_entropy: 7.90,
            text_entropy_floor: 4.0,
            printable_fraction: 0.85,
            sequence_distinct: 64,
        }
    }
}

/// Shannon entropy of the byte histogram, in bits per byte (0.0 ..= 8.0).
pub fn byte_entropy(buf: &[u8]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for &b in buf {
        counts[b as usize] += 1;
    }
    let n = buf.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

fn printable_fraction(buf: &[u8]) -> f64 {
    let printable = buf
        .iter()
        .filter(|&&b| matches!(b, 0x20..=0x7E | b'\n' | b'\r' | b'\t'))
        .count();
    printable as f64 / buf.len() as f64
}

fn is_monotonic_sequence(buf: &[u8], min_distinct: usize) -> bool {
    if buf.windows(2).any(|w| w[1] < w[0]) {
        return false;
    }
    let mut seen = [false; 256];
    let mut distinct = 0usize;
    for &b in buf {
        if !seen[b as usize] {
            seen[b as usize] = true;
            distinct += 1;
            if distinct >= min_distinct {
                return true;
            }
        }
    }
    false
}

/// Classify a buffer. Fails only on empty input.
pub fn classify(buf: &[u8], thresholds: &ProfilerThresholds) -> Result<InputClass> {
    if buf.is_empty() {
        return Err(MangoError::EmptyInput);
    }
    if is_monotonic_sequence(buf, thresholds.sequence_distinct) {
        return Ok(InputClass::Sequence);
    }
    let entropy = byte_entropy(buf);
    if entropy >= thresholds.random_entropy {
        return Ok(InputClass::Random);
    }
    if entropy < thresholds.text_entropy_floor {
        return Ok(InputClass::UserData);
    }
    if printable_fraction(buf) >= thresholds.printable_fraction {
        return Ok(InputClass::Natural);
    }
    Ok(InputClass::Combined)
}

/// Classify and look up the matching profile, falling back to `Combined`
/// when the class has no catalog entry.
pub fn resolve_profile(
    buf: &[u8],
    catalog: &Catalog,
    thresholds: &ProfilerThresholds,
) -> Result<InputProfile> {
    let class = classify(buf, thresholds)?;
    if let Some(profile) = catalog.get(class.as_str()) {
        return Ok(profile.clone());
    }
    if let Some(profile) = catalog.get(InputClass::Combined.as_str()) {
        return Ok(profile.clone());
    }
    Err(MangoError::NoProfileAvailable(class.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TransformRef;

    fn thresholds() -> ProfilerThresholds {
        ProfilerThresholds::default()
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            classify(&[], &thresholds()),
            Err(MangoError::EmptyInput)
        ));
    }

    #[test]
    fn ramp_classifies_as_sequence() {
        let ramp: Vec<u8> = (0u8..=255).collect();
        assert_eq!(classify(&ramp, &thresholds()).unwrap(), InputClass::Sequence);
        // Exactly the distinct minimum still counts.
        let short: Vec<u8> = (0u8..64).collect();
        assert_eq!(classify(&short, &thresholds()).unwrap(), InputClass::Sequence);
    }

    #[test]
    fn short_ramp_is_not_a_sequence() {
        let short: Vec<u8> = (0u8..50).collect();
        assert_ne!(classify(&short, &thresholds()).unwrap(), InputClass::Sequence);
    }

    #[test]
    fn all_zero_buffer_is_user_data() {
        // Monotonic but with a single distinct value, so it falls through to
        // the entropy branch: H = 0.
        let zeros = vec![0u8; 4096];
        assert_eq!(classify(&zeros, &thresholds()).unwrap(), InputClass::UserData);
    }

    #[test]
    fn english_text_is_natural() {
        let text = "The quick brown fox jumps over the lazy dog, \
                    then doubles back to inspect a fence post and a gate. \
                    Mile marker 42; bin 19 of 73. Weather today: mild, \
                    with scattered clouds expected by noon (80% chance).\n"
            .repeat(40);
        assert_eq!(
            classify(text.as_bytes(), &thresholds()).unwrap(),
            InputClass::Natural
        );
    }

    #[test]
    fn high_entropy_bytes_are_random() {
        // Deterministic generator; 16 KiB keeps the empirical entropy of a
        // uniform stream comfortably above the 7.90 threshold.
        let mut state = 0x1234_5678_9ABC_DEF0u64;
        let buf: Vec<u8> = (0..16384)
            .map(|_| {
                state ^= state >> 12;
                state ^= state << 25;
                state ^= state >> 27;
                state.wrapping_mul(0x2545_F491_4F6C_DD1D) as u8
            })
            .collect();
        assert_eq!(classify(&buf, &thresholds()).unwrap(), InputClass::Random);
    }

    #[test]
    fn mid_entropy_binary_is_combined() {
        // Bytes 0..128 repeated: H = 7, printable fraction ≈ 0.77, not
        // monotonic across the seam.
        let buf: Vec<u8> = (0..4096).map(|i| (i % 128) as u8).collect();
        assert_eq!(classify(&buf, &thresholds()).unwrap(), InputClass::Combined);
    }

    #[test]
    fn resolve_falls_back_to_combined() {
        let mut catalog = Catalog::empty();
        catalog.insert(InputProfile {
            name: "Combined".to_string(),
            sequence: vec![TransformRef(1, 1)],
            global_rounds: 1,
            aggregate_score: 0.0,
        });
        let zeros = vec![0u8; 256];
        let profile = resolve_profile(&zeros, &catalog, &thresholds()).unwrap();
        assert_eq!(profile.name, "Combined");
    }

    #[test]
    fn resolve_without_any_profile_errors() {
        let catalog = Catalog::empty();
        let zeros = vec![0u8; 256];
        assert!(matches!(
            resolve_profile(&zeros, &catalog, &thresholds()),
            Err(MangoError::NoProfileAvailable(_))
        ));
    }
}
