//! Feedback and chunked family: chains where each byte or chunk folds in the
//! previous one, seeded from the key window. Inverses walk the same chain
//! with the roles of input and output swapped.

/// id 32: ciphertext-feedback XOR. `c[i] = p[i] ^ c[i-1]`, chain seeded from
/// `key[0]`.
pub(super) fn xor_cascade_fwd(buf: &mut [u8], key: &[u8]) {
    let mut prev = key[0];
    for b in buf.iter_mut() {
        *b ^= prev;
        prev = *b;
    }
}

pub(super) fn xor_cascade_inv(buf: &mut [u8], key: &[u8]) {
    let mut prev = key[0];
    for b in buf.iter_mut() {
        let c = *b;
        *b = c ^ prev;
        prev = c;
    }
}

/// id 33: ciphertext-feedback addition.
pub(super) fn add_cascade_fwd(buf: &mut [u8], key: &[u8]) {
    let mut prev = key[0];
    for b in buf.iter_mut() {
        *b = b.wrapping_add(prev);
        prev = *b;
    }
}

pub(super) fn add_cascade_inv(buf: &mut [u8], key: &[u8]) {
    let mut prev = key[0];
    for b in buf.iter_mut() {
        let c = *b;
        *b = c.wrapping_sub(prev);
        prev = c;
    }
}

/// Chunk-wise chained XOR: the first chunk is XORed with the key window, each
/// later chunk with the (already processed) chunk before it. A trailing
/// partial chunk chains against the matching prefix of its predecessor.
fn chunked_fb_fwd(buf: &mut [u8], key: &[u8], chunk: usize) {
    let head = buf.len().min(chunk);
    for i in 0..head {
        buf[i] ^= key[i];
    }
    let mut start = chunk;
    while start < buf.len() {
        let len = (buf.len() - start).min(chunk);
        for j in 0..len {
            buf[start + j] ^= buf[start - chunk + j];
        }
        start += chunk;
    }
}

fn chunked_fb_inv(buf: &mut [u8], key: &[u8], chunk: usize) {
    if buf.len() > chunk {
        // Undo chunks back-to-front; each predecessor still holds its
        // forward value when its successor is unwound.
        let last_start = ((buf.len() - 1) / chunk) * chunk;
        let mut start = last_start;
        while start >= chunk {
            let len = (buf.len() - start).min(chunk);
            for j in 0..len {
                buf[start + j] ^= buf[start - chunk + j];
            }
            start -= chunk;
        }
    }
    let head = buf.len().min(chunk);
    for i in 0..head {
        buf[i] ^= key[i];
    }
}

/// id 34.
pub(super) fn chunked_fb16_fwd(buf: &mut [u8], key: &[u8]) {
    chunked_fb_fwd(buf, key, 16);
}

pub(super) fn chunked_fb16_inv(buf: &mut [u8], key: &[u8]) {
    chunked_fb_inv(buf, key, 16);
}

/// id 35.
pub(super) fn chunked_fb32_fwd(buf: &mut [u8], key: &[u8]) {
    chunked_fb_fwd(buf, key, 32);
}

pub(super) fn chunked_fb32_inv(buf: &mut [u8], key: &[u8]) {
    chunked_fb_inv(buf, key, 32);
}

/// id 36: swap mirror-image byte pairs where the key bit selects them.
/// Self-inverse.
pub(super) fn butterfly_pairs(buf: &mut [u8], key: &[u8]) {
    let n = buf.len();
    for i in 0..n / 2 {
        if key[i] & 1 == 1 {
            buf.swap(i, n - 1 - i);
        }
    }
}
