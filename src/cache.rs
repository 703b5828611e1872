//! Render cache for incremental renders.
//!
//! Rendering a project decodes every source and pushes it through its
//! template. This module lets the render pipeline skip a source when
//! nothing that feeds its output has changed since the last render.
//!
//! # Design
//!
//! ## Cache keys
//!
//! Entries are keyed by **output file name** (`about.html`). Each entry
//! records the fingerprint of the three inputs that produced it:
//!
//! - **`source_hash`**: SHA-256 of the full source text, directives included.
//! - **`template_hash`**: SHA-256 of the template file the source resolved to
//!   (its `template:` override or the project default).
//! - **`config_hash`**: SHA-256 of `config.ini`. Any config edit therefore
//!   re-renders every source.
//!
//! A source is fresh only if an entry exists and all three hashes match.
//! Storing the template hash per output keeps two sources that share a
//! template independent: re-rendering one never marks the other fresh.
//!
//! Freshness does not look at the output file itself. Writing outputs is the
//! caller's job; a source recorded here counts as rendered.
//!
//! ## Storage
//!
//! The cache is a JSON file at `<project_dir>/.render-cache.json`, so it
//! survives between CLI invocations. It is saved after each recorded entry.
//!
//! ## Bypassing the cache
//!
//! `render --no-cache` clears the cache first, so every source is rendered.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the project directory.
const CACHE_FILENAME: &str = ".render-cache.json";

/// Version of the cache format. Bump this to invalidate all existing caches
/// when the format or key computation changes.
const CACHE_VERSION: u32 = 1;

/// Hashes of the inputs that produced one output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fingerprint {
    pub source_hash: String,
    pub template_hash: String,
    pub config_hash: String,
}

/// On-disk render cache mapping output file names to fingerprints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderCache {
    pub version: u32,
    pub entries: BTreeMap<String, Fingerprint>,
}

impl RenderCache {
    /// An empty cache (first render, or after `--no-cache`).
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the project directory. Returns an empty cache if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(project_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(cache_path(project_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        if cache.version != CACHE_VERSION {
            return Self::empty();
        }
        cache
    }

    pub fn save(&self, project_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(project_dir), json)
    }

    /// Whether `output` was last produced from exactly `fingerprint`.
    pub fn is_fresh(&self, output: &str, fingerprint: &Fingerprint) -> bool {
        self.entries.get(output) == Some(fingerprint)
    }

    pub fn record(&mut self, output: impl Into<String>, fingerprint: Fingerprint) {
        self.entries.insert(output.into(), fingerprint);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only the entries whose output name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|output, _| keep(output));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::empty()
    }
}

/// SHA-256 of some text, as a hex string.
pub fn hash_text(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// SHA-256 of a file's contents, as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Resolve the cache file path for a project directory.
fn cache_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CACHE_FILENAME)
}

/// Summary of one render run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub rendered: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl RenderStats {
    pub fn total(&self) -> u32 {
        self.rendered + self.skipped + self.failed
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped == 0 && self.failed == 0 {
            return write!(f, "{} rendered", self.rendered);
        }
        write!(f, "{} rendered, {} unchanged", self.rendered, self.skipped)?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
