//! Profile catalog: the read-only mapping from input-class name to tuned
//! profile, loaded once at facade construction.
//!
//! Persisted form is a JSON dictionary:
//!
//! ```text
//! { "<name>": { "Sequence": [[id, tr], ...], "GlobalRounds": n, "AggregateScore": x } }
//! ```
//!
//! Lookups fold case, unknown keys inside a profile object are ignored, and
//! duplicate profile names resolve last-wins. A default catalog covering the
//! five canonical classes is embedded so the engine works with no files on
//! disk; the offline tuning workbench replaces it via [`install`] or a
//! configured catalog path.

mod embedded;

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::profile::{InputProfile, TransformRef};

#[derive(Serialize, Deserialize)]
struct ProfileDto {
    #[serde(rename = "Sequence")]
    sequence: Vec<TransformRef>,
    #[serde(rename = "GlobalRounds")]
    global_rounds: u8,
    #[serde(rename = "AggregateScore", default)]
    aggregate_score: f64,
}

/// In-memory catalog. Immutable after load; `insert` exists for catalog
/// construction by the tuning workbench and for tests.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Keyed by lowercased name; the profile keeps its display name.
    profiles: HashMap<String, InputProfile>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The embedded default catalog. Panics are impossible here short of a
    /// corrupted build: the embedded document is covered by tests.
    pub fn embedded() -> Self {
        Self::from_json(embedded::CATALOG_JSON)
            .expect("embedded catalog must parse")
    }

    /// Parse a catalog document. Structurally invalid profiles (empty
    /// sequence, zero rounds, zero repetitions) are skipped with a warning;
    /// a malformed document is fatal.
    pub fn from_json(json: &str) -> Result<Self> {
        let dtos: HashMap<String, ProfileDto> = serde_json::from_str(json)?;
        let mut catalog = Catalog::empty();
        for (name, dto) in dtos {
            if dto.sequence.is_empty()
                || dto.sequence.len() > 255
                || dto.global_rounds == 0
                || dto.sequence.iter().any(|s| s.reps() == 0)
            {
                warn!("Skipping structurally invalid profile '{}'", name);
                continue;
            }
            catalog.insert(InputProfile {
                name,
                sequence: dto.sequence,
                global_rounds: dto.global_rounds,
                aggregate_score: dto.aggregate_score,
            });
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        // Stable order for diffable catalog files.
        let mut dtos: std::collections::BTreeMap<&str, ProfileDto> = Default::default();
        for profile in self.profiles.values() {
            dtos.insert(
                &profile.name,
                ProfileDto {
                    sequence: profile.sequence.clone(),
                    global_rounds: profile.global_rounds,
                    aggregate_score: profile.aggregate_score,
                },
            );
        }
        Ok(serde_json::to_string_pretty(&dtos)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {:?}", path))?;
        let catalog = Self::from_json(&json)
            .with_context(|| format!("Failed to parse catalog file {:?}", path))?;
        info!("Loaded {} profiles from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json().context("Failed to serialize catalog")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write catalog file {:?}", path))?;
        Ok(())
    }

    pub fn insert(&mut self, profile: InputProfile) {
        self.profiles.insert(profile.name.to_lowercase(), profile);
    }

    /// Case-insensitive lookup by class name.
    pub fn get(&self, name: &str) -> Option<&InputProfile> {
        self.profiles.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &InputProfile> {
        self.profiles.values()
    }
}

// ─── Process-wide catalog ────────────────────────────────────────────────

static GLOBAL: OnceLock<Catalog> = OnceLock::new();

/// Install the process-wide catalog before the first facade is built.
/// Returns `false` (and changes nothing) if a catalog is already installed.
pub fn install(catalog: Catalog) -> bool {
    let count = catalog.len();
    let installed = GLOBAL.set(catalog).is_ok();
    if installed {
        info!("Installed process catalog with {} profiles", count);
    } else {
        warn!("Process catalog already installed; install() ignored");
    }
    installed
}

/// The process-wide catalog, defaulting to the embedded one. Never mutated
/// after initialization, so shared across threads without locking.
pub fn global() -> &'static Catalog {
    GLOBAL.get_or_init(|| {
        let catalog = Catalog::embedded();
        info!("Using embedded catalog ({} profiles)", catalog.len());
        catalog
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_covers_the_canonical_classes() {
        let catalog = Catalog::embedded();
        for name in ["Natural", "Random", "Sequence", "Combined", "UserData"] {
            let profile = catalog
                .get(name)
                .unwrap_or_else(|| panic!("missing embedded profile {}", name));
            assert!(!profile.sequence.is_empty());
            assert!(profile.global_rounds >= 1);
            // Embedded sequences must only reference registered transforms.
            for step in &profile.sequence {
                assert!(
                    crate::transforms::lookup(step.id()).is_some(),
                    "profile {} references unknown id {}",
                    name,
                    step.id()
                );
            }
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = Catalog::embedded();
        assert_eq!(
            catalog.get("natural").unwrap().name,
            catalog.get("NATURAL").unwrap().name
        );
    }

    #[test]
    fn json_round_trip_preserves_profiles() {
        let catalog = Catalog::embedded();
        let json = catalog.to_json().unwrap();
        let reloaded = Catalog::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
        let a = catalog.get("Sequence").unwrap();
        let b = reloaded.get("Sequence").unwrap();
        assert_eq!(a.sequence, b.sequence);
        assert_eq!(a.global_rounds, b.global_rounds);
        assert!((a.aggregate_score - b.aggregate_score).abs() < 1e-9);
    }

    #[test]
    fn unknown_keys_inside_a_profile_are_ignored() {
        let json = r#"{
            "Custom": {
                "Sequence": [[1, 1], [17, 2]],
                "GlobalRounds": 2,
                "AggregateScore": 8.5,
                "Notes": "from an older workbench build"
            }
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.get("custom").unwrap().sequence.len(), 2);
    }

    #[test]
    fn structurally_invalid_profiles_are_skipped() {
        let json = r#"{
            "Empty": { "Sequence": [], "GlobalRounds": 2 },
            "ZeroRounds": { "Sequence": [[1, 1]], "GlobalRounds": 0 },
            "ZeroReps": { "Sequence": [[1, 0]], "GlobalRounds": 1 },
            "Good": { "Sequence": [[1, 1]], "GlobalRounds": 1 }
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("Good").is_some());
    }

    #[test]
    fn malformed_document_is_fatal() {
        assert!(Catalog::from_json("{ not json").is_err());
        assert!(Catalog::from_json(r#"{"X": {"Sequence": "oops"}}"#).is_err());
    }
}
