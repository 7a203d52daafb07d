//! Configuration and on-disk layout for the demo tooling.
//!
//! Everything lives under `~/.config/mango/`:
//!
//! ```text
//! ~/.config/mango/
//!   config.ini          — engine + demo configuration
//!   catalog.json        — optional tuned profile catalog (replaces embedded)
//!   out/                — demo output files
//! ```
//!
//! The core engine itself consults no environment and no files; this module
//! exists so the binaries (and deployments that recalibrate the profiler)
//! have one place to configure from.

use anyhow::{Context, Result};
use configparser::ini::Ini;
use std::fs;
use std::path::{Path, PathBuf};

use crate::profiler::ProfilerThresholds;

/// Configuration loaded from `~/.config/mango/config.ini`.
#[derive(Debug, Clone)]
pub struct MangoConfig {
    // [catalog]
    /// Optional path to a tuned catalog file. Unset means the embedded
    /// catalog.
    pub catalog_path: Option<PathBuf>,

    // [profiler]
    /// Classification thresholds. Defaults match the embedded catalog's
    /// training conditions.
    pub thresholds: ProfilerThresholds,

    // [io]
    /// Directory demo binaries write ciphertexts and recovered files into.
    pub output_directory: PathBuf,
}

impl MangoConfig {
    fn default_for(config_dir: &Path) -> Self {
        Self {
            catalog_path: None,
            thresholds: ProfilerThresholds::default(),
            output_directory: config_dir.join("out"),
        }
    }

    /// Load from an INI file, falling back to defaults for missing keys.
    fn load_from_ini(path: &Path, config_dir: &Path) -> Result<Self> {
        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        let defaults = MangoConfig::default_for(config_dir);
        let base = ProfilerThresholds::default();

        let catalog_path = ini.get("catalog", "path").map(|s| expand_tilde(&s));

        let thresholds = ProfilerThresholds {
            random_entropy: ini
                .getfloat("profiler", "random_entropy")
                .ok()
                .flatten()
                .unwrap_or(base.random_entropy),
            text_entropy_floor: ini
                .getfloat("profiler", "text_entropy_floor")
                .ok()
                .flatten()
                .unwrap_or(base.text_entropy_floor),
            printable_fraction: ini
                .getfloat("profiler", "printable_fraction")
                .ok()
                .flatten()
                .unwrap_or(base.printable_fraction),
            sequence_distinct: ini
                .getuint("profiler", "sequence_distinct")
                .ok()
                .flatten()
                .map(|v| v as usize)
                .unwrap_or(base.sequence_distinct),
        };

        let output_directory = ini
            .get("io", "output_directory")
            .map(|s| expand_tilde(&s))
            .unwrap_or(defaults.output_directory);

        Ok(Self {
            catalog_path,
            thresholds,
            output_directory,
        })
    }

    /// Save to an INI-style file with comments explaining each field.
    fn save_to_ini(&self, path: &Path) -> Result<()> {
        let catalog = self
            .catalog_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content = format!(
            r#"; Mango — adaptive cipher engine configuration
; Location: {path}
;
; Edit this file to change default settings.
; Lines starting with ; or # are comments.

[catalog]
; Path to a tuned profile catalog (JSON). Leave empty to use the
; catalog embedded in the binary. Supports ~ for home directory.
path = {catalog}

[profiler]
; Classification thresholds. The defaults match the conditions the
; embedded catalog was tuned under; only change them together with a
; recalibrated catalog.
random_entropy = {random_entropy}
text_entropy_floor = {text_entropy_floor}
printable_fraction = {printable_fraction}
sequence_distinct = {sequence_distinct}

[io]
; Directory the demo binaries write output files into.
; Supports ~ for home directory.
output_directory = {out_dir}
"#,
            path = path.display(),
            catalog = catalog,
            random_entropy = self.thresholds.random_entropy,
            text_entropy_floor = self.thresholds.text_entropy_floor,
            printable_fraction = self.thresholds.printable_fraction,
            sequence_distinct = self.thresholds.sequence_distinct,
            out_dir = self.output_directory.display(),
        );

        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }
}

impl Default for MangoConfig {
    fn default() -> Self {
        let fallback =
            resolve_config_dir().unwrap_or_else(|| PathBuf::from(".").join("mango"));
        MangoConfig::default_for(&fallback)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(s: &str) -> PathBuf {
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(s)
}

/// Resolve the config directory to `~/.config/mango/` regardless of OS.
pub fn resolve_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("mango"))
}

/// Storage manager for the config file and demo output directory.
///
/// On construction it ensures the directory tree exists, loads `config.ini`
/// if present, and writes a commented default one otherwise.
pub struct Storage {
    config_dir: PathBuf,
    pub config: MangoConfig,
}

impl Storage {
    pub fn new() -> Result<Self> {
        let config_dir = resolve_config_dir()
            .context("Could not determine home directory (is $HOME set?)")?;
        let config_path = config_dir.join("config.ini");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config dir: {:?}", config_dir))?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }

        let config = if config_path.exists() {
            tracing::info!("Loading config from {:?}", config_path);
            match MangoConfig::load_from_ini(&config_path, &config_dir) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse config.ini, using defaults: {}", e);
                    MangoConfig::default_for(&config_dir)
                }
            }
        } else {
            tracing::info!("No config.ini found — creating default at {:?}", config_path);
            let config = MangoConfig::default_for(&config_dir);
            if let Err(e) = config.save_to_ini(&config_path) {
                tracing::warn!("Could not write default config.ini: {}", e);
            }
            config
        };

        if !config.output_directory.exists() {
            fs::create_dir_all(&config.output_directory).with_context(|| {
                format!("Failed to create output dir: {:?}", config.output_directory)
            })?;
            tracing::info!("Created output directory: {:?}", config.output_directory);
        }

        Ok(Self { config_dir, config })
    }

    /// Install the configured catalog (or the embedded default) as the
    /// process-wide catalog. Parse failures of a configured file are fatal.
    pub fn install_catalog(&self) -> Result<()> {
        if let Some(path) = &self.config.catalog_path {
            let catalog = crate::catalog::Catalog::load(path)?;
            crate::catalog::install(catalog);
        }
        Ok(())
    }

    pub fn save_config(&self) -> Result<()> {
        let config_path = self.config_dir.join("config.ini");
        self.config.save_to_ini(&config_path)?;
        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.config.output_directory
    }
}
