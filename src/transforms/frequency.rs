//! Frequency and combined family: the histogram-rebalancing byte
//! permutation, add/xor composites, and the even/odd split substitution.

use super::{invert_perm, WindowRng};

/// The equalizer permutation: rank 256 key-generated weights and map each
/// byte value to its weight's rank. Distinct derivation from the S-box
/// family on purpose — this is the "spread the histogram" flavor.
fn equalizer_perm(key: &[u8]) -> [u8; 256] {
    let mut rng = WindowRng::new(key, 37 << 8);
    let mut weighted: [(u64, u8); 256] = [(0, 0); 256];
    for (v, slot) in weighted.iter_mut().enumerate() {
        *slot = (rng.next_u64(), v as u8);
    }
    weighted.sort_unstable();
    let mut perm = [0u8; 256];
    for (rank, &(_, v)) in weighted.iter().enumerate() {
        perm[v as usize] = rank as u8;
    }
    perm
}

/// id 37.
pub(super) fn equalizer_fwd(buf: &mut [u8], key: &[u8]) {
    let perm = equalizer_perm(key);
    for b in buf.iter_mut() {
        *b = perm[*b as usize];
    }
}

pub(super) fn equalizer_inv(buf: &mut [u8], key: &[u8]) {
    let inv = invert_perm(&equalizer_perm(key));
    for b in buf.iter_mut() {
        *b = inv[*b as usize];
    }
}

/// id 38: add the key byte, then XOR its rotation.
pub(super) fn add_then_xor_fwd(buf: &mut [u8], key: &[u8]) {
    for (b, k) in buf.iter_mut().zip(key) {
        *b = b.wrapping_add(*k) ^ k.rotate_left(3);
    }
}

pub(super) fn add_then_xor_inv(buf: &mut [u8], key: &[u8]) {
    for (b, k) in buf.iter_mut().zip(key) {
        *b = (*b ^ k.rotate_left(3)).wrapping_sub(*k);
    }
}

/// id 39: XOR the key byte, then add its rotation.
pub(super) fn xor_then_add_fwd(buf: &mut [u8], key: &[u8]) {
    for (b, k) in buf.iter_mut().zip(key) {
        *b = (*b ^ *k).wrapping_add(k.rotate_left(5));
    }
}

pub(super) fn xor_then_add_inv(buf: &mut [u8], key: &[u8]) {
    for (b, k) in buf.iter_mut().zip(key) {
        *b = b.wrapping_sub(k.rotate_left(5)) ^ *k;
    }
}

/// id 40: even positions go through the keyed S-box, odd positions through
/// its inverse. The inverse pass swaps the roles.
pub(super) fn even_odd_sub_fwd(buf: &mut [u8], key: &[u8]) {
    let s = super::derive_perm::<256>(key, 40 << 8);
    let inv = invert_perm(&s);
    for (i, b) in buf.iter_mut().enumerate() {
        *b = if i % 2 == 0 { s[*b as usize] } else { inv[*b as usize] };
    }
}

pub(super) fn even_odd_sub_inv(buf: &mut [u8], key: &[u8]) {
    let s = super::derive_perm::<256>(key, 40 << 8);
    let inv = invert_perm(&s);
    for (i, b) in buf.iter_mut().enumerate() {
        *b = if i % 2 == 0 { inv[*b as usize] } else { s[*b as usize] };
    }
}
