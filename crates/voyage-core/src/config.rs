//! Site layout and render configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default placeholder element the fragment is rendered into.
pub const DEFAULT_ROOT_ELEMENT: &str = "app";

/// Configuration for a site served by the render pipeline.
///
/// Every path is relative to `root` unless absolute.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site name, used in logs.
    pub name: String,
    /// Site root directory.
    pub root: PathBuf,
    /// HTML shell with the outlet placeholder.
    pub template: PathBuf,
    /// Directory of page modules (`*.page`).
    pub pages_dir: PathBuf,
    /// Directory of data modules (`*.json`).
    pub data_dir: PathBuf,
    /// Directory of unbundled static assets.
    pub public_dir: PathBuf,
    /// Build output directory.
    pub dist_dir: PathBuf,
    /// `id` of the element hydration attaches to.
    pub root_element: String,
    /// Upper bound for a single render.
    pub render_timeout: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "voyage".to_string(),
            root: PathBuf::from("."),
            template: PathBuf::from("index.html"),
            pages_dir: PathBuf::from("pages"),
            data_dir: PathBuf::from("data"),
            public_dir: PathBuf::from("public"),
            dist_dir: PathBuf::from("dist"),
            root_element: DEFAULT_ROOT_ELEMENT.to_string(),
            render_timeout: Duration::from_secs(5),
        }
    }
}

impl SiteConfig {
    /// Create a configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set the site name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the template path.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = path.into();
        self
    }

    /// Set the build output directory.
    pub fn with_dist_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dist_dir = path.into();
        self
    }

    /// Set the hydration root element id.
    pub fn with_root_element(mut self, id: impl Into<String>) -> Self {
        self.root_element = id.into();
        self
    }

    /// Set the render timeout.
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Absolute template path.
    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.template)
    }

    /// Absolute pages directory.
    pub fn pages_path(&self) -> PathBuf {
        self.resolve(&self.pages_dir)
    }

    /// Absolute data directory.
    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    /// Absolute public asset directory.
    pub fn public_path(&self) -> PathBuf {
        self.resolve(&self.public_dir)
    }

    /// Precompiled client bundle directory (`dist/client`).
    pub fn client_dist_path(&self) -> PathBuf {
        self.resolve(&self.dist_dir).join("client")
    }

    /// Precompiled server output directory (`dist/server`).
    pub fn server_dist_path(&self) -> PathBuf {
        self.resolve(&self.dist_dir).join("server")
    }

    /// Compiled shell written by the build.
    pub fn dist_template_path(&self) -> PathBuf {
        self.client_dist_path().join("index.html")
    }

    /// Precompiled render bundle written by the build.
    pub fn bundle_path(&self) -> PathBuf {
        self.server_dist_path().join("render-bundle.json")
    }
}
