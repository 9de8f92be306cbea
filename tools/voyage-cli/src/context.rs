//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use voyage_core::SiteConfig;

use crate::config::CliConfig;
use crate::output::Output;
use crate::sites::{self, RegisteredSite};

/// Config file names searched for, in order, in each directory.
const CONFIG_NAMES: [&str; 3] = ["voyage.toml", ".voyage.toml", "voyage.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration, with environment overrides applied.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Directory relative config paths are resolved against.
    pub base_dir: PathBuf,
}

impl Context {
    /// Load context from a config file, or the nearest one above the
    /// working directory.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, base_dir) = match config_path {
            Some(path) => {
                let path = resolve_path(&cwd, path);
                let config = CliConfig::load(&path)?;
                (config, parent_dir(&path, &cwd))
            }
            None => match find_config(&cwd)? {
                Some(path) => {
                    output.debug(&format!("Using config {}", path.display()));
                    (CliConfig::load(&path)?, parent_dir(&path, &cwd))
                }
                None => (CliConfig::default(), cwd.clone()),
            },
        };

        config
            .apply_env(|key| std::env::var(key).ok())
            .context("Invalid environment override")?;

        Ok(Self {
            config,
            output,
            cwd,
            base_dir,
        })
    }

    /// The configured site.
    pub fn site(&self) -> Result<RegisteredSite> {
        sites::lookup(&self.config.site.name)
    }

    /// Site layout for `site`.
    pub fn site_config(&self, site: &RegisteredSite) -> SiteConfig {
        self.config
            .site_config(&self.base_dir, site.default_root.clone())
    }
}

/// Find a config file in `start` or any of its parents.
fn find_config(start: &Path) -> Result<Option<PathBuf>> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }

        if !current.pop() {
            return Ok(None);
        }
    }
}

fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

fn parent_dir(path: &Path, fallback: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf())
}
