//! Live module graph used by the development strategy.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde_json::Value;
use voyage_core::{ModuleTransformError, SiteConfig};

use crate::compile::{compile_module, CompiledModule};
use crate::provider::{is_valid_module_name, parse_data_module, ModuleProvider};

/// File extension of page modules.
pub const PAGE_EXTENSION: &str = "page";

/// File extension of data modules.
pub const DATA_EXTENSION: &str = "json";

/// Change detector for a source file.
///
/// Length is tracked next to the modification time so edits landing
/// within the filesystem's timestamp granularity are still noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

impl FileStamp {
    /// Stamp the file at `path`.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified()?,
            len: meta.len(),
        })
    }

    /// Compact token for cache-busting query strings.
    pub fn token(&self) -> String {
        let nanos = self
            .modified
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        format!("{:x}{:x}", nanos, self.len)
    }
}

struct Cached<T> {
    stamp: FileStamp,
    value: Arc<T>,
}

/// Transforms page and data modules on demand.
///
/// Every lookup stats the file; a changed stamp triggers a re-transform
/// before the lookup returns. The cache lock is held across the transform,
/// so a render that starts after a write completes observes that write.
pub struct DevModuleGraph {
    root: PathBuf,
    pages: PathBuf,
    data: PathBuf,
    page_cache: Mutex<HashMap<String, Cached<CompiledModule>>>,
    data_cache: Mutex<HashMap<String, Cached<Value>>>,
    transforms: AtomicUsize,
}

impl DevModuleGraph {
    /// Create a graph over a site's page and data directories.
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            root: config.root.clone(),
            pages: config.pages_path(),
            data: config.data_path(),
            page_cache: Mutex::new(HashMap::new()),
            data_cache: Mutex::new(HashMap::new()),
            transforms: AtomicUsize::new(0),
        }
    }

    /// Number of transforms performed so far, page and data modules.
    pub fn transform_count(&self) -> usize {
        self.transforms.load(Ordering::Relaxed)
    }

    /// Path of a page module's file.
    pub fn page_path(&self, name: &str) -> PathBuf {
        self.pages.join(format!("{}.{}", name, PAGE_EXTENSION))
    }

    /// Path of a data module's file.
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data.join(format!("{}.{}", name, DATA_EXTENSION))
    }

    fn display_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn stamp(&self, name: &str, path: &Path) -> Result<FileStamp, ModuleTransformError> {
        if !is_valid_module_name(name) {
            return Err(ModuleTransformError::NotFound(name.to_string()));
        }
        FileStamp::of(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ModuleTransformError::NotFound(name.to_string()),
            _ => ModuleTransformError::Io {
                module: name.to_string(),
                message: e.to_string(),
            },
        })
    }

    fn read(&self, name: &str, path: &Path) -> Result<String, ModuleTransformError> {
        fs::read_to_string(path).map_err(|e| ModuleTransformError::Io {
            module: name.to_string(),
            message: e.to_string(),
        })
    }
}

impl ModuleProvider for DevModuleGraph {
    fn page(&self, name: &str) -> Result<Arc<CompiledModule>, ModuleTransformError> {
        let path = self.page_path(name);
        let mut cache = self.page_cache.lock();
        let stamp = self.stamp(name, &path)?;

        if let Some(cached) = cache.get(name) {
            if cached.stamp == stamp {
                return Ok(Arc::clone(&cached.value));
            }
        }

        let text = self.read(name, &path)?;
        let module = Arc::new(compile_module(name, &self.display_path(&path), &text)?);
        self.transforms.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(module = %name, hash = %module.hash, "transformed page module");

        cache.insert(
            name.to_string(),
            Cached {
                stamp,
                value: Arc::clone(&module),
            },
        );
        Ok(module)
    }

    fn data(&self, name: &str) -> Result<Arc<Value>, ModuleTransformError> {
        let path = self.data_path(name);
        let mut cache = self.data_cache.lock();
        let stamp = self.stamp(name, &path)?;

        if let Some(cached) = cache.get(name) {
            if cached.stamp == stamp {
                return Ok(Arc::clone(&cached.value));
            }
        }

        let text = self.read(name, &path)?;
        let value = Arc::new(parse_data_module(name, &text)?);
        self.transforms.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(module = %name, "loaded data module");

        cache.insert(
            name.to_string(),
            Cached {
                stamp,
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }
}
