//! Shuffle family: permutations of bit, nibble, and byte positions. The
//! permutation is derived from the key window; the inverse applies the
//! inverse permutation (or replays the rotation the other way).

use super::{derive_perm, invert_perm, WindowRng};

/// id 25: one key-derived permutation of the eight bit positions, applied to
/// every byte.
pub(super) fn shuffle_bits_fwd(buf: &mut [u8], key: &[u8]) {
    let perm = derive_perm::<8>(key, 25 << 8);
    permute_bits_all(buf, &perm);
}

pub(super) fn shuffle_bits_inv(buf: &mut [u8], key: &[u8]) {
    let inv = invert_perm(&derive_perm::<8>(key, 25 << 8));
    permute_bits_all(buf, &inv);
}

fn permute_bits_all(buf: &mut [u8], perm: &[u8; 8]) {
    for b in buf.iter_mut() {
        let mut out = 0u8;
        for (i, &p) in perm.iter().enumerate() {
            if *b & (1 << i) != 0 {
                out |= 1 << p;
            }
        }
        *b = out;
    }
}

/// id 26: rotate the buffer's nibble string by a keyed amount.
pub(super) fn shuffle_nibbles_fwd(buf: &mut [u8], key: &[u8]) {
    let n = buf.len() * 2;
    let r = (WindowRng::new(key, 26 << 8).next_u64() as usize) % n;
    rotate_nibbles(buf, r);
}

pub(super) fn shuffle_nibbles_inv(buf: &mut [u8], key: &[u8]) {
    let n = buf.len() * 2;
    let r = (WindowRng::new(key, 26 << 8).next_u64() as usize) % n;
    rotate_nibbles(buf, n - r);
}

fn rotate_nibbles(buf: &mut [u8], by: usize) {
    let n = buf.len() * 2;
    let by = by % n;
    if by == 0 {
        return;
    }
    let mut nibbles: Vec<u8> = Vec::with_capacity(n);
    for &b in buf.iter() {
        nibbles.push(b >> 4);
        nibbles.push(b & 0x0F);
    }
    nibbles.rotate_left(by);
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (nibbles[i * 2] << 4) | nibbles[i * 2 + 1];
    }
}

/// id 27: full-buffer byte permutation via keyed Fisher–Yates over the
/// payload indices. Forward scatters `in[i]` to `perm[i]`; inverse gathers.
pub(super) fn shuffle_bytes_fwd(buf: &mut [u8], key: &[u8]) {
    let perm = byte_perm(buf.len(), key);
    let src = buf.to_vec();
    for (i, &p) in perm.iter().enumerate() {
        buf[p] = src[i];
    }
}

pub(super) fn shuffle_bytes_inv(buf: &mut [u8], key: &[u8]) {
    let perm = byte_perm(buf.len(), key);
    let src = buf.to_vec();
    for (i, &p) in perm.iter().enumerate() {
        buf[i] = src[p];
    }
}

fn byte_perm(len: usize, key: &[u8]) -> Vec<usize> {
    let mut rng = WindowRng::new(key, 27 << 8);
    let mut perm: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.next_below(i + 1);
        perm.swap(i, j);
    }
    perm
}

/// id 28: rotate the whole buffer by a keyed offset.
pub(super) fn rotate_buffer_fwd(buf: &mut [u8], key: &[u8]) {
    let r = (WindowRng::new(key, 28 << 8).next_u64() as usize) % buf.len();
    buf.rotate_left(r);
}

pub(super) fn rotate_buffer_inv(buf: &mut [u8], key: &[u8]) {
    let r = (WindowRng::new(key, 28 << 8).next_u64() as usize) % buf.len();
    buf.rotate_right(r);
}

/// id 29: reverse each keyed-length segment in place. Reversing twice is the
/// identity, so this is self-inverse.
pub(super) fn reverse_segments(buf: &mut [u8], key: &[u8]) {
    let seg = (key[0] & 31) as usize + 2;
    for chunk in buf.chunks_mut(seg) {
        chunk.reverse();
    }
}

/// id 30: riffle the two buffer halves together; the key's low bit picks
/// which half leads.
pub(super) fn riffle_fwd(buf: &mut [u8], key: &[u8]) {
    let mid = buf.len().div_ceil(2);
    let (lead, trail): (Vec<u8>, Vec<u8>) = if key[0] & 1 == 0 {
        (buf[..mid].to_vec(), buf[mid..].to_vec())
    } else {
        (buf[buf.len() - mid..].to_vec(), buf[..buf.len() - mid].to_vec())
    };
    for (i, b) in buf.iter_mut().enumerate() {
        *b = if i % 2 == 0 { lead[i / 2] } else { trail[i / 2] };
    }
}

pub(super) fn riffle_inv(buf: &mut [u8], key: &[u8]) {
    let mid = buf.len().div_ceil(2);
    let mut lead = Vec::with_capacity(mid);
    let mut trail = Vec::with_capacity(buf.len() - mid);
    for (i, &b) in buf.iter().enumerate() {
        if i % 2 == 0 {
            lead.push(b);
        } else {
            trail.push(b);
        }
    }
    if key[0] & 1 == 0 {
        buf[..mid].copy_from_slice(&lead);
        buf[mid..].copy_from_slice(&trail);
    } else {
        let split = buf.len() - mid;
        buf[..split].copy_from_slice(&trail);
        buf[split..].copy_from_slice(&lead);
    }
}

/// id 31: swap adjacent byte pairs where the corresponding key bit is set.
pub(super) fn swap_pairs(buf: &mut [u8], key: &[u8]) {
    let mut i = 0;
    while i + 1 < buf.len() {
        if key[i / 2] & 1 == 1 {
            buf.swap(i, i + 1);
        }
        i += 2;
    }
}
