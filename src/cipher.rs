//! Cipher facade: whole-buffer encrypt/decrypt and the stateful block-mode
//! session.
//!
//! One `CryptoLib` binds one `(password, salt, zone)` triple. Whole-buffer
//! calls are stateless; block mode keeps a per-instance `BlockSession` with
//! a monotonic IV counter. The two APIs must not be mixed on one instance —
//! that is detected and reported as `BlockSessionMisuse` rather than left
//! undefined. Block mode performs no inter-block chaining on purpose:
//! CBC/CTR-style chaining is the caller's layer.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::catalog::{self, Catalog};
use crate::error::{MangoError, Result};
use crate::header::Header;
use crate::keystream::{derive_master, KeyStream, IV_LEN, SALT_LEN};
use crate::profile::{InputProfile, Sequence};
use crate::profiler::{self, ProfilerThresholds};
use crate::runner;
use crate::transforms;

/// Construction options: the fixed-length salt and an optional public zone
/// label (≤ 255 bytes) bound into the key schedule.
#[derive(Debug, Clone)]
pub struct CryptoLibOptions {
    pub salt: [u8; SALT_LEN],
    pub zone_info: Vec<u8>,
}

impl CryptoLibOptions {
    pub fn new(salt: [u8; SALT_LEN]) -> Self {
        Self {
            salt,
            zone_info: Vec::new(),
        }
    }

    pub fn with_zone(salt: [u8; SALT_LEN], zone_info: impl Into<Vec<u8>>) -> Self {
        Self {
            salt,
            zone_info: zone_info.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockDirection {
    Encrypt,
    Decrypt,
}

/// Cached parameters for block mode, created lazily on the first block call
/// and destroyed with the facade.
struct BlockSession {
    sequence: Sequence,
    global_rounds: u8,
    base_iv: [u8; IV_LEN],
    next_index: u64,
    direction: BlockDirection,
    master: [u8; 32],
}

/// The cipher engine facade.
pub struct CryptoLib {
    password: Vec<u8>,
    options: CryptoLibOptions,
    /// Master key for the configured zone; decrypt re-derives when a
    /// ciphertext carries a different zone label.
    master: [u8; 32],
    catalog: Catalog,
    thresholds: ProfilerThresholds,
    block: Option<BlockSession>,
}

impl CryptoLib {
    /// Build a facade against the process-wide catalog.
    pub fn new(password: &str, options: CryptoLibOptions) -> Result<Self> {
        Self::with_catalog(password, options, catalog::global().clone())
    }

    /// Build a facade with an explicit catalog (tuning workbench, tests).
    pub fn with_catalog(
        password: &str,
        options: CryptoLibOptions,
        catalog: Catalog,
    ) -> Result<Self> {
        if options.zone_info.len() > 255 {
            return Err(MangoError::BadHeader("zone info longer than 255 bytes"));
        }
        let master = derive_master(password.as_bytes(), &options.salt, &options.zone_info);
        debug!(
            profiles = catalog.len(),
            zone = options.zone_info.len(),
            "cipher facade ready"
        );
        Ok(Self {
            password: password.as_bytes().to_vec(),
            options,
            master,
            catalog,
            thresholds: ProfilerThresholds::default(),
            block: None,
        })
    }

    /// Override the profiler thresholds (from config).
    pub fn set_thresholds(&mut self, thresholds: ProfilerThresholds) {
        self.thresholds = thresholds;
    }

    // ─── Whole-buffer API ────────────────────────────────────────────────

    /// Classify the plaintext, pick its profile, and encrypt.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.reject_active_block_session()?;
        let profile = profiler::resolve_profile(plaintext, &self.catalog, &self.thresholds)?;
        self.encrypt_with_profile(&profile, plaintext)
    }

    /// Encrypt under an explicit profile with a fresh random IV.
    pub fn encrypt_with_profile(
        &self,
        profile: &InputProfile,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        self.reject_active_block_session()?;
        self.encrypt_with_iv(profile, plaintext, fresh_iv())
    }

    /// Deterministic variant with an injected IV. Exposed for the tuning
    /// workbench and the determinism tests; production callers want the
    /// random-IV paths above.
    pub fn encrypt_with_iv(
        &self,
        profile: &InputProfile,
        plaintext: &[u8],
        iv: [u8; IV_LEN],
    ) -> Result<Vec<u8>> {
        validate_pipeline(&profile.sequence, profile.global_rounds)?;
        if plaintext.is_empty() {
            return Err(MangoError::EmptyInput);
        }
        let header = Header {
            sequence: profile.sequence.clone(),
            global_rounds: profile.global_rounds,
            iv,
            plaintext_sha256: sha256(plaintext),
            zone_info: self.options.zone_info.clone(),
        };
        let keys = KeyStream::new(self.master, iv);
        let mut payload = plaintext.to_vec();
        runner::run_forward(&mut payload, &header.sequence, header.global_rounds, &keys)?;
        let mut out = header.encode();
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Parse the header, rebuild the key stream from the embedded IV and
    /// zone label, run the inverse pipeline, and verify the plaintext tag.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.reject_active_block_session()?;
        if ciphertext.is_empty() {
            return Err(MangoError::EmptyInput);
        }
        let (header, header_len) = Header::parse(ciphertext)?;
        validate_pipeline(&header.sequence, header.global_rounds)?;
        let keys = KeyStream::new(self.master_for_zone(&header.zone_info), header.iv);
        let mut payload = ciphertext[header_len..].to_vec();
        runner::run_inverse(&mut payload, &header.sequence, header.global_rounds, &keys)?;
        if sha256(&payload) != header.plaintext_sha256 {
            // The partially recovered buffer must not escape.
            return Err(MangoError::IntegrityFailure);
        }
        Ok(payload)
    }

    /// The payload portion of a ciphertext (everything after the header).
    pub fn payload_only(ciphertext: &[u8]) -> Result<&[u8]> {
        let (_, header_len) = Header::parse(ciphertext)?;
        Ok(&ciphertext[header_len..])
    }

    // ─── Block mode ──────────────────────────────────────────────────────

    /// Encrypt one block. The first call selects a profile from the block,
    /// emits a full header, and caches the session; later calls emit
    /// headerless payloads under the next IV-counter value. Blocks must be
    /// presented in order.
    pub fn encrypt_block(&mut self, block: &[u8]) -> Result<Vec<u8>> {
        if block.is_empty() {
            return Err(MangoError::EmptyInput);
        }
        if let Some(session) = &mut self.block {
            if session.direction != BlockDirection::Encrypt {
                return Err(MangoError::BlockSessionMisuse(
                    "encrypt_block on a decrypting session",
                ));
            }
            let iv = block_iv(&session.base_iv, session.next_index);
            session.next_index += 1;
            let keys = KeyStream::new(session.master, iv);
            let mut payload = block.to_vec();
            runner::run_forward(&mut payload, &session.sequence, session.global_rounds, &keys)?;
            return Ok(payload);
        }

        // First block: pick the profile, emit a full header, cache the rest.
        let profile = profiler::resolve_profile(block, &self.catalog, &self.thresholds)?;
        let base_iv = fresh_iv();
        let out = self.encrypt_with_iv(&profile, block, base_iv)?;
        self.block = Some(BlockSession {
            sequence: profile.sequence,
            global_rounds: profile.global_rounds,
            base_iv,
            next_index: 1,
            direction: BlockDirection::Encrypt,
            master: self.master,
        });
        Ok(out)
    }

    /// Decrypt one block. The first ciphertext block must carry the full
    /// header; its plaintext tag covers that first block only.
    pub fn decrypt_block(&mut self, block: &[u8]) -> Result<Vec<u8>> {
        if block.is_empty() {
            return Err(MangoError::EmptyInput);
        }
        if let Some(session) = &mut self.block {
            if session.direction != BlockDirection::Decrypt {
                return Err(MangoError::BlockSessionMisuse(
                    "decrypt_block on an encrypting session",
                ));
            }
            let iv = block_iv(&session.base_iv, session.next_index);
            session.next_index += 1;
            let keys = KeyStream::new(session.master, iv);
            let mut payload = block.to_vec();
            runner::run_inverse(&mut payload, &session.sequence, session.global_rounds, &keys)?;
            return Ok(payload);
        }

        // First block: the header carries the session parameters.
        let (header, header_len) = Header::parse(block)?;
        validate_pipeline(&header.sequence, header.global_rounds)?;
        let master = self.master_for_zone(&header.zone_info);
        let keys = KeyStream::new(master, header.iv);
        let mut payload = block[header_len..].to_vec();
        runner::run_inverse(&mut payload, &header.sequence, header.global_rounds, &keys)?;
        if sha256(&payload) != header.plaintext_sha256 {
            return Err(MangoError::IntegrityFailure);
        }
        self.block = Some(BlockSession {
            sequence: header.sequence,
            global_rounds: header.global_rounds,
            base_iv: header.iv,
            next_index: 1,
            direction: BlockDirection::Decrypt,
            master,
        });
        Ok(payload)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn reject_active_block_session(&self) -> Result<()> {
        if self.block.is_some() {
            return Err(MangoError::BlockSessionMisuse(
                "whole-buffer call on an instance with an active block session",
            ));
        }
        Ok(())
    }

    /// The header's zone label is authoritative on decrypt: one facade can
    /// open ciphertexts for any public zone under its password and salt.
    fn master_for_zone(&self, zone_info: &[u8]) -> [u8; 32] {
        if zone_info == self.options.zone_info.as_slice() {
            self.master
        } else {
            derive_master(&self.password, &self.options.salt, zone_info)
        }
    }
}

/// Sequence/GR validation shared by every entry point. The facade rejects
/// GR = 0 — the runner's no-op tolerance exists for analysis flattening,
/// never for real encryption.
fn validate_pipeline(sequence: &[crate::profile::TransformRef], global_rounds: u8) -> Result<()> {
    if sequence.is_empty() || sequence.len() > 255 {
        return Err(MangoError::BadHeader("sequence length out of range"));
    }
    if global_rounds == 0 {
        return Err(MangoError::BadHeader("zero global rounds"));
    }
    for step in sequence {
        if step.reps() == 0 {
            return Err(MangoError::BadHeader("zero repetition count"));
        }
        if transforms::lookup(step.id()).is_none() {
            return Err(MangoError::UnknownTransform(step.id()));
        }
    }
    Ok(())
}

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

fn fresh_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// IV for block `index`: the base IV with its low eight bytes replaced by
/// `LE64(base_low + index)`. Index 0 reproduces the base IV, so the first
/// block is bit-identical to a whole-buffer encryption.
fn block_iv(base: &[u8; IV_LEN], index: u64) -> [u8; IV_LEN] {
    let mut iv = *base;
    let mut low = [0u8; 8];
    low.copy_from_slice(&iv[8..16]);
    let counter = u64::from_le_bytes(low).wrapping_add(index);
    iv[8..16].copy_from_slice(&counter.to_le_bytes());
    iv
}
