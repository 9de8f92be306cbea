//! Precompiled render bundle used by the production strategy.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use voyage_core::{ModuleTransformError, SiteConfig};

use crate::compile::{compile_module, CompiledModule};
use crate::graph::{DATA_EXTENSION, PAGE_EXTENSION};
use crate::provider::{is_valid_module_name, parse_data_module, ModuleProvider};

/// Format version written into every bundle.
pub const BUNDLE_VERSION: u32 = 1;

/// Errors building, writing or loading a bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed bundle {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bundle format version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error(transparent)]
    Module(#[from] ModuleTransformError),
}

impl BundleError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Every page and data module of a site, compiled ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderBundle {
    /// Bundle format version.
    pub version: u32,
    /// Fingerprint of the route table the bundle was built against.
    pub fingerprint: String,
    /// Build timestamp.
    pub built_at: DateTime<Utc>,
    /// Compiled page modules by name.
    pub pages: BTreeMap<String, Arc<CompiledModule>>,
    /// Parsed data modules by name.
    pub data: BTreeMap<String, Arc<Value>>,
    /// Public asset path to hashed output name.
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
}

impl RenderBundle {
    /// Create an empty bundle for a route table fingerprint.
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            version: BUNDLE_VERSION,
            fingerprint: fingerprint.into(),
            built_at: Utc::now(),
            pages: BTreeMap::new(),
            data: BTreeMap::new(),
            assets: BTreeMap::new(),
        }
    }

    /// Add a compiled page module.
    pub fn insert_page(&mut self, module: CompiledModule) {
        self.pages.insert(module.name.clone(), Arc::new(module));
    }

    /// Add a data module.
    pub fn insert_data(&mut self, name: impl Into<String>, value: Value) {
        self.data.insert(name.into(), Arc::new(value));
    }

    /// Write the bundle as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), BundleError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|source| BundleError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| BundleError::io(path, e))
    }

    /// Load a bundle written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let bytes = fs::read(path).map_err(|e| BundleError::io(path, e))?;
        let bundle: Self = serde_json::from_slice(&bytes).map_err(|source| BundleError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        if bundle.version != BUNDLE_VERSION {
            return Err(BundleError::Version {
                found: bundle.version,
                expected: BUNDLE_VERSION,
            });
        }
        Ok(bundle)
    }
}

impl ModuleProvider for RenderBundle {
    fn page(&self, name: &str) -> Result<Arc<CompiledModule>, ModuleTransformError> {
        self.pages
            .get(name)
            .cloned()
            .ok_or_else(|| ModuleTransformError::NotFound(name.to_string()))
    }

    fn data(&self, name: &str) -> Result<Arc<Value>, ModuleTransformError> {
        self.data
            .get(name)
            .cloned()
            .ok_or_else(|| ModuleTransformError::NotFound(name.to_string()))
    }
}

/// Compile every page and data module of a site.
///
/// Modules are visited in name order, so equal sources give equal bundles
/// apart from the timestamp.
pub fn build_bundle(config: &SiteConfig, fingerprint: &str) -> Result<RenderBundle, BundleError> {
    let mut bundle = RenderBundle::new(fingerprint);

    let pages_dir = config.pages_path();
    for (name, path) in module_files(&pages_dir, PAGE_EXTENSION)? {
        let text = fs::read_to_string(&path).map_err(|e| BundleError::io(&path, e))?;
        let display = config
            .pages_dir
            .join(path.file_name().unwrap_or_default())
            .to_string_lossy()
            .replace('\\', "/");
        bundle.insert_page(compile_module(&name, &display, &text)?);
    }

    let data_dir = config.data_path();
    if data_dir.is_dir() {
        for (name, path) in module_files(&data_dir, DATA_EXTENSION)? {
            let text = fs::read_to_string(&path).map_err(|e| BundleError::io(&path, e))?;
            bundle.insert_data(name.clone(), parse_data_module(&name, &text)?);
        }
    }

    tracing::info!(
        pages = bundle.pages.len(),
        data = bundle.data.len(),
        fingerprint = %bundle.fingerprint,
        "built render bundle"
    );
    Ok(bundle)
}

/// Module files in `dir` with `extension`, sorted by module name.
fn module_files(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>, BundleError> {
    let entries = fs::read_dir(dir).map_err(|e| BundleError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BundleError::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_valid_module_name(name) {
            tracing::warn!(path = %path.display(), "skipping module with unsupported name");
            continue;
        }
        files.push((name.to_string(), path.clone()));
    }
    files.sort();
    Ok(files)
}
