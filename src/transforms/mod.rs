//! Transform library: reversible byte-level operations dispatched by stable id.
//!
//! Every transform mutates the payload in place under a key window and has an
//! exact pointwise inverse. The library is a closed, append-only table — ids
//! are wire format, so an id is never reused or renumbered once shipped.
//! Dispatch is a flat `(forward_fn, inverse_fn)` table indexed by id, not a
//! trait hierarchy.
//!
//! Key-window contract (upheld by the key schedule): `key.len()` is at least
//! `payload.len()` and at least [`MIN_WINDOW`] bytes. Transforms index
//! `key[i]` freely for `i < payload.len()` and seed their permutation
//! generators from the first [`MIN_WINDOW`] bytes. Payloads are non-empty;
//! the sequence runner short-circuits empty buffers before dispatch.

mod arithmetic;
mod feedback;
mod frequency;
mod shuffle;
mod substitution;
mod xor;

/// Minimum key-window length handed to any transform, regardless of payload
/// size. Permutation seeds read this many bytes.
pub const MIN_WINDOW: usize = 32;

/// In-place transform step: `(payload, key_window)`.
pub type TransformFn = fn(&mut [u8], &[u8]);

/// One library entry. `inverse` undoes `forward` bitwise under the same key
/// window; self-inverse transforms point both fields at the same function.
pub struct Transform {
    pub id: u8,
    pub name: &'static str,
    pub forward: TransformFn,
    pub inverse: TransformFn,
}

/// Look up a transform by wire id. Returns `None` for ids outside the table.
pub fn lookup(id: u8) -> Option<&'static Transform> {
    let idx = id.checked_sub(1)? as usize;
    TABLE.get(idx)
}

/// All registered transforms, in id order.
pub fn all() -> &'static [Transform] {
    &TABLE
}

static TABLE: [Transform; 40] = [
    // ── XOR / masking ────────────────────────────────────────────────────
    Transform { id: 1, name: "XORTx", forward: xor::xor_tx, inverse: xor::xor_tx },
    Transform { id: 2, name: "XORRotNibble", forward: xor::xor_rot_nibble, inverse: xor::xor_rot_nibble },
    Transform { id: 3, name: "XORReverseKey", forward: xor::xor_reverse_key, inverse: xor::xor_reverse_key },
    Transform { id: 4, name: "XOREvenOdd", forward: xor::xor_even_odd, inverse: xor::xor_even_odd },
    Transform { id: 5, name: "XORChunkRot", forward: xor::xor_chunk_rot, inverse: xor::xor_chunk_rot },
    Transform { id: 6, name: "XORFold", forward: xor::xor_fold, inverse: xor::xor_fold },
    Transform { id: 7, name: "XORParityMask", forward: xor::xor_parity_mask, inverse: xor::xor_parity_mask },
    Transform { id: 8, name: "XORRotOne", forward: xor::xor_rot_one, inverse: xor::xor_rot_one },
    // ── Additive / rotation ──────────────────────────────────────────────
    Transform { id: 9, name: "AddTx", forward: arithmetic::add_fwd, inverse: arithmetic::add_inv },
    Transform { id: 10, name: "SubTx", forward: arithmetic::sub_fwd, inverse: arithmetic::sub_inv },
    Transform { id: 11, name: "AddReverseKey", forward: arithmetic::add_reverse_fwd, inverse: arithmetic::add_reverse_inv },
    Transform { id: 12, name: "AdditiveScatter", forward: arithmetic::scatter_fwd, inverse: arithmetic::scatter_inv },
    Transform { id: 13, name: "AdditiveScatterWide", forward: arithmetic::scatter_wide_fwd, inverse: arithmetic::scatter_wide_inv },
    Transform { id: 14, name: "RotLeftTx", forward: arithmetic::rot_left_fwd, inverse: arithmetic::rot_left_inv },
    Transform { id: 15, name: "RotRightTx", forward: arithmetic::rot_right_fwd, inverse: arithmetic::rot_right_inv },
    Transform { id: 16, name: "AddNibbleSwap", forward: arithmetic::add_nibble_swap_fwd, inverse: arithmetic::add_nibble_swap_inv },
    // ── Substitution ─────────────────────────────────────────────────────
    Transform { id: 17, name: "MaskBasedSBox", forward: substitution::mask_sbox_fwd, inverse: substitution::mask_sbox_inv },
    Transform { id: 18, name: "SubBytesXorMask", forward: substitution::sub_bytes_xor_mask_fwd, inverse: substitution::sub_bytes_xor_mask_inv },
    Transform { id: 19, name: "MaskedXorSub", forward: substitution::masked_xor_sub_fwd, inverse: substitution::masked_xor_sub_inv },
    Transform { id: 20, name: "MaskedDoubleSub", forward: substitution::double_sub_fwd, inverse: substitution::double_sub_inv },
    Transform { id: 21, name: "MaskedCascadeSubFb", forward: substitution::cascade_sub_fb_fwd, inverse: substitution::cascade_sub_fb_inv },
    Transform { id: 22, name: "MaskedCascadeSubFbPlain", forward: substitution::cascade_sub_fb_plain_fwd, inverse: substitution::cascade_sub_fb_plain_inv },
    Transform { id: 23, name: "NibbleSub", forward: substitution::nibble_sub_fwd, inverse: substitution::nibble_sub_inv },
    Transform { id: 24, name: "NibbleSubXor", forward: substitution::nibble_sub_xor_fwd, inverse: substitution::nibble_sub_xor_inv },
    // ── Shuffles ─────────────────────────────────────────────────────────
    Transform { id: 25, name: "ShuffleBits", forward: shuffle::shuffle_bits_fwd, inverse: shuffle::shuffle_bits_inv },
    Transform { id: 26, name: "ShuffleNibbles", forward: shuffle::shuffle_nibbles_fwd, inverse: shuffle::shuffle_nibbles_inv },
    Transform { id: 27, name: "ShuffleBytes", forward: shuffle::shuffle_bytes_fwd, inverse: shuffle::shuffle_bytes_inv },
    Transform { id: 28, name: "RotateBuffer", forward: shuffle::rotate_buffer_fwd, inverse: shuffle::rotate_buffer_inv },
    Transform { id: 29, name: "ReverseSegments", forward: shuffle::reverse_segments, inverse: shuffle::reverse_segments },
    Transform { id: 30, name: "Riffle", forward: shuffle::riffle_fwd, inverse: shuffle::riffle_inv },
    Transform { id: 31, name: "SwapPairs", forward: shuffle::swap_pairs, inverse: shuffle::swap_pairs },
    // ── Feedback / chunked ───────────────────────────────────────────────
    Transform { id: 32, name: "XORCascadeFb", forward: feedback::xor_cascade_fwd, inverse: feedback::xor_cascade_inv },
    Transform { id: 33, name: "AddCascadeFb", forward: feedback::add_cascade_fwd, inverse: feedback::add_cascade_inv },
    Transform { id: 34, name: "ChunkedFbTx16", forward: feedback::chunked_fb16_fwd, inverse: feedback::chunked_fb16_inv },
    Transform { id: 35, name: "ChunkedFbTx32", forward: feedback::chunked_fb32_fwd, inverse: feedback::chunked_fb32_inv },
    Transform { id: 36, name: "ButterflyWithPairs", forward: feedback::butterfly_pairs, inverse: feedback::butterfly_pairs },
    // ── Frequency / combined ─────────────────────────────────────────────
    Transform { id: 37, name: "FrequencyEqualizer", forward: frequency::equalizer_fwd, inverse: frequency::equalizer_inv },
    Transform { id: 38, name: "AddThenXor", forward: frequency::add_then_xor_fwd, inverse: frequency::add_then_xor_inv },
    Transform { id: 39, name: "XorThenAdd", forward: frequency::xor_then_add_fwd, inverse: frequency::xor_then_add_inv },
    Transform { id: 40, name: "EvenOddSub", forward: frequency::even_odd_sub_fwd, inverse: frequency::even_odd_sub_inv },
];

// ─── Keyed permutation machinery (wire format — do not change) ───────────

/// Deterministic generator seeded from a key window. Drives every
/// key-derived permutation in the library; its recurrence is part of the v1
/// wire format and is pinned here rather than delegated to an RNG crate.
pub(crate) struct WindowRng(u64);

impl WindowRng {
    /// Seed from the first [`MIN_WINDOW`] bytes of the window, domain-
    /// separated by `tag` so one window can feed several independent
    /// permutations.
    pub fn new(key: &[u8], tag: u64) -> Self {
        debug_assert!(key.len() >= MIN_WINDOW);
        let w = |i: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&key[i * 8..i * 8 + 8]);
            u64::from_le_bytes(b)
        };
        let mut s = w(0) ^ w(1).rotate_left(13) ^ w(2).rotate_left(29) ^ w(3).rotate_left(43) ^ tag;
        if s == 0 {
            s = 0x9E37_79B9_7F4A_7C15;
        }
        Self(s)
    }

    /// xorshift64* step.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform-enough index in `0..n` for permutation shuffling.
    pub fn next_below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Key-derived permutation of `0..N` via Fisher–Yates.
pub(crate) fn derive_perm<const N: usize>(key: &[u8], tag: u64) -> [u8; N] {
    let mut rng = WindowRng::new(key, tag);
    let mut perm = [0u8; N];
    for (i, p) in perm.iter_mut().enumerate() {
        *p = i as u8;
    }
    for i in (1..N).rev() {
        let j = rng.next_below(i + 1);
        perm.swap(i, j);
    }
    perm
}

/// Index inversion: `inv[perm[i]] == i`.
pub(crate) fn invert_perm<const N: usize>(perm: &[u8; N]) -> [u8; N] {
    let mut inv = [0u8; N];
    for (i, &p) in perm.iter().enumerate() {
        inv[p as usize] = i as u8;
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic payload generator for round-trip sweeps.
    fn payload(len: usize, seed: u64) -> Vec<u8> {
        let mut rng = WindowRng(seed | 1);
        (0..len).map(|_| rng.next_u64() as u8).collect()
    }

    fn window(len: usize, seed: u64) -> Vec<u8> {
        payload(len.max(MIN_WINDOW), seed ^ 0xA5A5_A5A5)
    }

    #[test]
    fn table_ids_match_positions() {
        for (i, t) in all().iter().enumerate() {
            assert_eq!(t.id as usize, i + 1, "{} out of place", t.name);
        }
    }

    #[test]
    fn lookup_rejects_out_of_range_ids() {
        assert!(lookup(0).is_none());
        assert!(lookup(41).is_none());
        assert!(lookup(255).is_none());
        assert_eq!(lookup(1).unwrap().name, "XORTx");
        assert_eq!(lookup(40).unwrap().name, "EvenOddSub");
    }

    /// Property: inverse(forward(p, k), k) == p for every transform, across
    /// payload sizes that hit the edge cases (single byte, odd lengths,
    /// sub-chunk, multi-chunk, larger than the minimum window).
    #[test]
    fn every_transform_round_trips() {
        let sizes = [1usize, 2, 3, 15, 16, 17, 31, 32, 33, 64, 257, 1024];
        for t in all() {
            for (si, &len) in sizes.iter().enumerate() {
                let original = payload(len, (t.id as u64) << 8 | si as u64);
                let key = window(len, (t.id as u64) << 16 | si as u64);
                let mut buf = original.clone();
                (t.forward)(&mut buf, &key);
                (t.inverse)(&mut buf, &key);
                assert_eq!(buf, original, "{} failed round-trip at len {}", t.name, len);
            }
        }
    }

    /// Transforms must preserve length and be deterministic in (payload, key).
    #[test]
    fn transforms_are_deterministic_and_length_preserving() {
        for t in all() {
            let original = payload(100, t.id as u64);
            let key = window(100, t.id as u64 + 7);
            let mut a = original.clone();
            let mut b = original.clone();
            (t.forward)(&mut a, &key);
            (t.forward)(&mut b, &key);
            assert_eq!(a.len(), original.len(), "{} changed length", t.name);
            assert_eq!(a, b, "{} is not deterministic", t.name);
        }
    }

    /// Distinct key windows should not produce identical output for a
    /// non-degenerate payload (smoke check that keys are actually used).
    /// Transforms whose key space is deliberately coarse (a rotation amount,
    /// a segment length, a riffle polarity) are skipped — two windows can
    /// legitimately select the same parameter.
    #[test]
    fn key_material_affects_output() {
        const COARSE: [u8; 5] = [25, 26, 28, 29, 30];
        let original = payload(256, 42);
        for t in all() {
            if COARSE.contains(&t.id) {
                continue;
            }
            let k1 = window(256, 1000 + t.id as u64);
            let k2 = window(256, 2000 + t.id as u64);
            let mut a = original.clone();
            let mut b = original.clone();
            (t.forward)(&mut a, &k1);
            (t.forward)(&mut b, &k2);
            assert_ne!(a, b, "{} ignored its key window", t.name);
        }
    }

    #[test]
    fn derive_perm_is_a_permutation() {
        let key = window(0, 9);
        let perm: [u8; 256] = derive_perm(&key, 77);
        let mut seen = [false; 256];
        for &p in perm.iter() {
            assert!(!seen[p as usize], "duplicate entry in permutation");
            seen[p as usize] = true;
        }
        let inv = invert_perm(&perm);
        for i in 0..256 {
            assert_eq!(inv[perm[i] as usize] as usize, i);
        }
    }

    #[test]
    fn derive_perm_tags_are_independent() {
        let key = window(0, 9);
        let a: [u8; 256] = derive_perm(&key, 1);
        let b: [u8; 256] = derive_perm(&key, 2);
        assert_ne!(a, b);
    }
}
