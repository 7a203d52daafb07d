//! Core data model: transform references, sequences, input classes, and the
//! tuned profiles that tie them together.

use serde::{Deserialize, Serialize};

/// One step of a sequence: `(transform id, repetition count)`. Serialized as
/// a two-element array, which is also its wire form in the header (two
/// bytes) and in the catalog document (`[id, tr]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRef(pub u8, pub u8);

impl TransformRef {
    /// Library id of the transform.
    pub fn id(&self) -> u8 {
        self.0
    }

    /// Repetitions within a single global-round pass. Always ≥ 1 in a
    /// well-formed sequence.
    pub fn reps(&self) -> u8 {
        self.1
    }
}

/// Ordered transform list, length `1..=255` when well-formed.
pub type Sequence = Vec<TransformRef>;

/// Coarse statistical category of a plaintext. Classification is advisory:
/// ciphertext carries the full sequence, never the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    Natural,
    Random,
    Sequence,
    Combined,
    UserData,
}

impl InputClass {
    /// Catalog key for this class. Lookups are case-insensitive, so this is
    /// a display form, not a binding spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputClass::Natural => "Natural",
            InputClass::Random => "Random",
            InputClass::Sequence => "Sequence",
            InputClass::Combined => "Combined",
            InputClass::UserData => "UserData",
        }
    }
}

impl std::fmt::Display for InputClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tuned `(sequence, global rounds, score)` profile for one input class.
/// Immutable once loaded from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct InputProfile {
    pub name: String,
    pub sequence: Sequence,
    pub global_rounds: u8,
    pub aggregate_score: f64,
}
