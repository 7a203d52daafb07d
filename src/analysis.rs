//! Analysis core: the nine statistical metrics the offline tuning workbench
//! scores candidate sequences with, plus the aggregate combiner.
//!
//! Nothing in the runtime encrypt/decrypt path calls into this module. It is
//! specified here so the surrounding workbench stays replaceable: `analyze`
//! takes the candidate ciphertext payload, the payloads produced from the
//! avalanche- and key-mutated runs, and the original input, and returns one
//! score per metric on a 0..=10 scale (higher is better mixing).

use crate::profiler::byte_entropy;

/// Number of metrics in an [`analyze`] result, in order: entropy, bit
/// variance, sliding window, frequency distribution, periodicity,
/// correlation, positional mapping, avalanche, key dependency.
pub const METRIC_COUNT: usize = 9;

/// Fixed mutation seed for avalanche / key-dependency input derivation.
/// Archived scores were produced under this constant; changing it makes
/// historical catalogs incomparable.
pub const MUTATION_SEED: [u8; 4] = [0x1D, 0x13, 0x28, 0x12];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// Unweighted mean of the nine scores.
    Mean,
    /// Weighted mean biased toward the avalanche and key-dependency axes.
    Weighted,
}

/// Per-metric weights for [`AggregateMode::Weighted`]; they sum to 10.
const WEIGHTS: [f64; METRIC_COUNT] = [0.8, 0.8, 0.9, 1.0, 1.1, 1.1, 1.0, 1.7, 1.6];

/// Score a candidate payload. `avalanche_payload` is the ciphertext of the
/// mutated input, `key_dep_payload` the ciphertext under the mutated
/// password, both produced by the caller with [`mutate_input`] /
/// [`mutate_password`].
pub fn analyze(
    payload: &[u8],
    avalanche_payload: &[u8],
    key_dep_payload: &[u8],
    original_input: &[u8],
) -> [f64; METRIC_COUNT] {
    [
        entropy_score(payload),
        bit_variance_score(payload),
        sliding_window_score(payload),
        frequency_distribution_score(payload),
        periodicity_score(payload),
        correlation_score(payload),
        positional_mapping_score(payload, original_input),
        divergence_score(payload, avalanche_payload),
        divergence_score(payload, key_dep_payload),
    ]
}

/// Combine metric scores into a single ranking value.
pub fn aggregate(scores: &[f64; METRIC_COUNT], mode: AggregateMode) -> f64 {
    match mode {
        AggregateMode::Mean => scores.iter().sum::<f64>() / METRIC_COUNT as f64,
        AggregateMode::Weighted => {
            let weighted: f64 = scores.iter().zip(WEIGHTS).map(|(s, w)| s * w).sum();
            weighted / WEIGHTS.iter().sum::<f64>()
        }
    }
}

/// The avalanche input: the original with one bit flipped at a position
/// chosen by the fixed mutation seed.
pub fn mutate_input(input: &[u8]) -> Vec<u8> {
    let mut out = input.to_vec();
    if out.is_empty() {
        return out;
    }
    let bit = u32::from_le_bytes([
        MUTATION_SEED[0],
        MUTATION_SEED[1],
        MUTATION_SEED[2],
        MUTATION_SEED[3],
    ]) as usize
        % (out.len() * 8);
    out[bit / 8] ^= 1 << (bit % 8);
    out
}

/// The key-dependency password: the original with the mutation seed folded
/// into its leading bytes (appended when the password is shorter).
pub fn mutate_password(password: &[u8]) -> Vec<u8> {
    let mut out = password.to_vec();
    if out.len() >= MUTATION_SEED.len() {
        for (b, s) in out.iter_mut().zip(MUTATION_SEED) {
            *b ^= s;
        }
    } else {
        out.extend_from_slice(&MUTATION_SEED);
    }
    out
}

// ─── Individual metrics ──────────────────────────────────────────────────

fn entropy_score(payload: &[u8]) -> f64 {
    byte_entropy(payload) / 8.0 * 10.0
}

/// Mean set-bit count per byte; ideal mixing sits at 4 bits.
fn bit_variance_score(payload: &[u8]) -> f64 {
    if payload.is_empty() {
        return 0.0;
    }
    let total: u32 = payload.iter().map(|b| b.count_ones()).sum();
    let mean = total as f64 / payload.len() as f64;
    (1.0 - (mean - 4.0).abs() / 4.0).max(0.0) * 10.0
}

/// Entropy averaged over 64-byte windows stepping by 32, so local structure
/// is punished even when the global histogram looks flat.
fn sliding_window_score(payload: &[u8]) -> f64 {
    const WINDOW: usize = 64;
    const STEP: usize = 32;
    if payload.len() <= WINDOW {
        return entropy_score(payload);
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut start = 0usize;
    while start + WINDOW <= payload.len() {
        sum += byte_entropy(&payload[start..start + WINDOW]);
        count += 1;
        start += STEP;
    }
    // A 64-byte window over 256 symbols maxes out at 6 bits.
    (sum / count as f64 / 6.0).min(1.0) * 10.0
}

/// Mean absolute deviation of the byte histogram from uniform.
fn frequency_distribution_score(payload: &[u8]) -> f64 {
    if payload.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for &b in payload {
        counts[b as usize] += 1;
    }
    let expected = payload.len() as f64 / 256.0;
    let deviation: f64 = counts
        .iter()
        .map(|&c| (c as f64 - expected).abs())
        .sum::<f64>()
        / (2.0 * payload.len() as f64);
    (1.0 - deviation).max(0.0) * 10.0
}

/// Worst-case self-similarity across lags 1..=64: the excess of matching
/// bytes over the 1/256 chance level.
fn periodicity_score(payload: &[u8]) -> f64 {
    if payload.len() < 2 {
        return 10.0;
    }
    let max_lag = (payload.len() / 2).min(64);
    let mut worst = 0.0f64;
    for lag in 1..=max_lag {
        let matches = payload
            .iter()
            .zip(&payload[lag..])
            .filter(|(a, b)| a == b)
            .count();
        let frac = matches as f64 / (payload.len() - lag) as f64;
        worst = worst.max(frac - 1.0 / 256.0);
    }
    (1.0 - worst.clamp(0.0, 1.0)) * 10.0
}

/// Pearson correlation between adjacent bytes.
fn correlation_score(payload: &[u8]) -> f64 {
    if payload.len() < 2 {
        return 10.0;
    }
    let xs = &payload[..payload.len() - 1];
    let ys = &payload[1..];
    let n = xs.len() as f64;
    let mean_x = xs.iter().map(|&b| b as f64).sum::<f64>() / n;
    let mean_y = ys.iter().map(|&b| b as f64).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        // A constant series carries no linear relationship to punish.
        return 10.0;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    (1.0 - r.abs()) * 10.0
}

/// Fraction of positions where the ciphertext byte equals the input byte,
/// in excess of the 1/256 chance level.
fn positional_mapping_score(payload: &[u8], original: &[u8]) -> f64 {
    let len = payload.len().min(original.len());
    if len == 0 {
        return 0.0;
    }
    let same = payload
        .iter()
        .zip(original)
        .filter(|(a, b)| a == b)
        .count();
    let excess = (same as f64 / len as f64 - 1.0 / 256.0).clamp(0.0, 1.0);
    (1.0 - excess) * 10.0
}

/// Bit-level divergence between two payloads; ideal is half the bits
/// flipped. Used for both the avalanche and key-dependency axes.
fn divergence_score(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let differing: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
    let frac = differing as f64 / (len * 8) as f64;
    (1.0 - (frac - 0.5).abs() * 2.0).max(0.0) * 10.0
}
