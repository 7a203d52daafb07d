//! Sequence runner: applies an ordered transform sequence over N global
//! rounds, forward or inverse.
//!
//! The nesting order (round → sequence position → repetition) is wire
//! format. The inverse path walks all three loops in reverse and re-derives
//! each key window at the same `(round, position, repetition)` coordinates,
//! so `run_inverse` undoes `run_forward` exactly.

use crate::error::{MangoError, Result};
use crate::keystream::KeyStream;
use crate::profile::TransformRef;
use crate::transforms;

/// Encrypting pass. Empty payloads and zero global rounds are no-op
/// successes here; the facade enforces the stricter encryption contract.
pub fn run_forward(
    payload: &mut [u8],
    sequence: &[TransformRef],
    global_rounds: u8,
    keys: &KeyStream,
) -> Result<()> {
    if payload.is_empty() {
        return Ok(());
    }
    for round in 0..global_rounds as usize {
        for (pos, step) in sequence.iter().enumerate() {
            let t = transforms::lookup(step.id())
                .ok_or(MangoError::UnknownTransform(step.id()))?;
            for rep in 0..step.reps() as usize {
                let window = keys.window(round, pos, rep, payload.len());
                (t.forward)(payload, &window);
            }
        }
    }
    Ok(())
}

/// Decrypting pass: rounds, positions, and repetitions all in reverse.
pub fn run_inverse(
    payload: &mut [u8],
    sequence: &[TransformRef],
    global_rounds: u8,
    keys: &KeyStream,
) -> Result<()> {
    if payload.is_empty() {
        return Ok(());
    }
    for round in (0..global_rounds as usize).rev() {
        for (pos, step) in sequence.iter().enumerate().rev() {
            let t = transforms::lookup(step.id())
                .ok_or(MangoError::UnknownTransform(step.id()))?;
            for rep in (0..step.reps() as usize).rev() {
                let window = keys.window(round, pos, rep, payload.len());
                (t.inverse)(payload, &window);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystream::{derive_master, IV_LEN, SALT_LEN};

    fn keys() -> KeyStream {
        let master = derive_master(b"runner test", &[9u8; SALT_LEN], b"");
        KeyStream::new(master, [3u8; IV_LEN])
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 + 7) as u8).collect()
    }

    /// Property: run_inverse(run_forward(p, s, g, k)) == p for a sequence
    /// that exercises every family, repeated steps, and tr > 1.
    #[test]
    fn forward_then_inverse_is_identity() {
        let sequence = vec![
            TransformRef(1, 1),
            TransformRef(17, 2),
            TransformRef(27, 1),
            TransformRef(34, 3),
            TransformRef(21, 1),
            TransformRef(40, 1),
            TransformRef(17, 1), // same id twice at different positions
        ];
        for len in [1usize, 7, 64, 1000] {
            for gr in 1..=3u8 {
                let original = sample(len);
                let mut buf = original.clone();
                run_forward(&mut buf, &sequence, gr, &keys()).unwrap();
                if len >= 7 {
                    // A 1-byte buffer can map to itself by coincidence.
                    assert_ne!(buf, original, "pipeline left len {} unchanged", len);
                }
                run_inverse(&mut buf, &sequence, gr, &keys()).unwrap();
                assert_eq!(buf, original, "round-trip failed at len {} gr {}", len, gr);
            }
        }
    }

    #[test]
    fn empty_payload_is_a_noop() {
        let mut buf: Vec<u8> = Vec::new();
        run_forward(&mut buf, &[TransformRef(1, 1)], 3, &keys()).unwrap();
        run_inverse(&mut buf, &[TransformRef(1, 1)], 3, &keys()).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn zero_rounds_is_a_noop() {
        let original = sample(32);
        let mut buf = original.clone();
        run_forward(&mut buf, &[TransformRef(17, 1)], 0, &keys()).unwrap();
        assert_eq!(buf, original);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut buf = sample(16);
        let err = run_forward(&mut buf, &[TransformRef(200, 1)], 1, &keys()).unwrap_err();
        assert!(matches!(err, MangoError::UnknownTransform(200)));
    }

    /// Repetitions must consume distinct key windows: tr = 2 of a
    /// self-inverse XOR must not cancel itself out.
    #[test]
    fn repetitions_use_distinct_windows() {
        let original = sample(64);
        let mut buf = original.clone();
        run_forward(&mut buf, &[TransformRef(1, 2)], 1, &keys()).unwrap();
        assert_ne!(buf, original);
    }

    /// Global rounds must likewise not cancel: two rounds of XOR with
    /// per-round windows differ from zero rounds.
    #[test]
    fn rounds_use_distinct_windows() {
        let original = sample(64);
        let mut buf = original.clone();
        run_forward(&mut buf, &[TransformRef(1, 1)], 2, &keys()).unwrap();
        assert_ne!(buf, original);
    }
}
