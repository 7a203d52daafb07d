//! Self-describing ciphertext header.
//!
//! Layout (all lengths in bytes, payload follows immediately):
//!
//! ```text
//! offset 0      4   magic "MNGO"
//!        4      1   version (1)
//!        5      1   seq_len N, 1..=255
//!        6      2N  sequence, N x (id, tr) pairs
//!        6+2N   1   global_rounds, 1..=255
//!        7+2N   16  iv
//!        23+2N  32  plaintext_sha256
//!        55+2N  1   zone_len
//!        56+2N  ..  zone_info (zone_len bytes, UTF-8 label)
//! ```
//!
//! Total header size `56 + 2N + zone_len`. The header is self-describing,
//! not self-authenticating: the plaintext hash detects corruption after
//! decryption, but the header itself carries no MAC.

use crate::error::{MangoError, Result};
use crate::keystream::IV_LEN;
use crate::profile::{Sequence, TransformRef};

pub const MAGIC: [u8; 4] = *b"MNGO";
pub const VERSION: u8 = 1;

/// Fixed bytes around the variable-length sequence and zone label.
const FIXED_LEN: usize = 4 + 1 + 1 + 1 + IV_LEN + 32 + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub sequence: Sequence,
    pub global_rounds: u8,
    pub iv: [u8; IV_LEN],
    pub plaintext_sha256: [u8; 32],
    pub zone_info: Vec<u8>,
}

impl Header {
    /// Encoded size: `56 + 2N + zone_len`.
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + 2 * self.sequence.len() + self.zone_info.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.push(self.sequence.len() as u8);
        for step in &self.sequence {
            out.push(step.id());
            out.push(step.reps());
        }
        out.push(self.global_rounds);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.plaintext_sha256);
        out.push(self.zone_info.len() as u8);
        out.extend_from_slice(&self.zone_info);
        out
    }

    /// Parse a header from the front of `bytes`. Returns the header and the
    /// number of bytes it occupied; the payload starts right after.
    pub fn parse(bytes: &[u8]) -> Result<(Header, usize)> {
        if bytes.len() < 6 {
            return Err(MangoError::BadHeader("truncated before sequence"));
        }
        if bytes[0..4] != MAGIC {
            return Err(MangoError::BadHeader("magic mismatch"));
        }
        if bytes[4] != VERSION {
            return Err(MangoError::BadHeader("unknown version"));
        }
        let seq_len = bytes[5] as usize;
        if seq_len == 0 {
            return Err(MangoError::BadHeader("empty sequence"));
        }
        let total = FIXED_LEN + 2 * seq_len;
        if bytes.len() < total {
            return Err(MangoError::BadHeader("truncated sequence or trailer"));
        }

        let mut sequence = Sequence::with_capacity(seq_len);
        let mut off = 6;
        for _ in 0..seq_len {
            let (id, tr) = (bytes[off], bytes[off + 1]);
            if tr == 0 {
                return Err(MangoError::BadHeader("zero repetition count"));
            }
            sequence.push(TransformRef(id, tr));
            off += 2;
        }

        let global_rounds = bytes[off];
        if global_rounds == 0 {
            return Err(MangoError::BadHeader("zero global rounds"));
        }
        off += 1;

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[off..off + IV_LEN]);
        off += IV_LEN;

        let mut plaintext_sha256 = [0u8; 32];
        plaintext_sha256.copy_from_slice(&bytes[off..off + 32]);
        off += 32;

        let zone_len = bytes[off] as usize;
        off += 1;
        if bytes.len() < off + zone_len {
            return Err(MangoError::BadHeader("truncated zone info"));
        }
        let zone_info = bytes[off..off + zone_len].to_vec();
        off += zone_len;

        Ok((
            Header {
                sequence,
                global_rounds,
                iv,
                plaintext_sha256,
                zone_info,
            },
            off,
        ))
    }

    /// Human-readable summary for inspection tooling.
    pub fn describe(&self) -> String {
        let seq: Vec<String> = self
            .sequence
            .iter()
            .map(|s| {
                let name = crate::transforms::lookup(s.id())
                    .map(|t| t.name)
                    .unwrap_or("?");
                format!("{}x{} ({})", s.id(), s.reps(), name)
            })
            .collect();
        let zone = if self.zone_info.is_empty() {
            "-".to_string()
        } else {
            String::from_utf8_lossy(&self.zone_info).into_owned()
        };
        format!(
            "version {} | sequence [{}] | global rounds {} | zone {}",
            VERSION,
            seq.join(", "),
            self.global_rounds,
            zone
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header {
            sequence: vec![TransformRef(17, 2), TransformRef(1, 1), TransformRef(34, 3)],
            global_rounds: 4,
            iv: [0xAB; IV_LEN],
            plaintext_sha256: [0xCD; 32],
            zone_info: b"XYZ Corp. Marketing".to_vec(),
        }
    }

    #[test]
    fn encode_parse_round_trip() {
        let header = sample();
        let bytes = header.encode();
        assert_eq!(bytes.len(), 56 + 2 * 3 + 19);
        let (parsed, consumed) = Header::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn parse_ignores_trailing_payload() {
        let header = sample();
        let mut bytes = header.encode();
        let header_len = bytes.len();
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        let (parsed, consumed) = Header::parse(&bytes).unwrap();
        assert_eq!(consumed, header_len);
        assert_eq!(parsed.sequence, header.sequence);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = sample().encode();
        bytes[3] = b'X'; // "MNGX"
        assert!(matches!(
            Header::parse(&bytes),
            Err(MangoError::BadHeader("magic mismatch"))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = sample().encode();
        bytes[4] = 2;
        assert!(matches!(
            Header::parse(&bytes),
            Err(MangoError::BadHeader("unknown version"))
        ));
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut bytes = sample().encode();
        bytes[5] = 0; // seq_len
        assert!(Header::parse(&bytes).is_err());

        let mut bytes = sample().encode();
        bytes[7] = 0; // tr of the first pair
        assert!(matches!(
            Header::parse(&bytes),
            Err(MangoError::BadHeader("zero repetition count"))
        ));

        let mut bytes = sample().encode();
        bytes[6 + 2 * 3] = 0; // global_rounds
        assert!(matches!(
            Header::parse(&bytes),
            Err(MangoError::BadHeader("zero global rounds"))
        ));
    }

    #[test]
    fn every_truncation_point_is_rejected() {
        let bytes = sample().encode();
        for cut in 0..bytes.len() {
            assert!(
                Header::parse(&bytes[..cut]).is_err(),
                "truncation at {} parsed",
                cut
            );
        }
    }

    #[test]
    fn empty_zone_round_trips() {
        let header = Header {
            zone_info: Vec::new(),
            ..sample()
        };
        let bytes = header.encode();
        assert_eq!(bytes.len(), 56 + 2 * 3);
        let (parsed, _) = Header::parse(&bytes).unwrap();
        assert!(parsed.zone_info.is_empty());
    }
}
