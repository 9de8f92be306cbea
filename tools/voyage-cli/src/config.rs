//! CLI configuration (`voyage.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use voyage_core::{RenderMode, SiteConfig};
use voyage_observability::{LogConfig, LogFormat};

/// Environment variable selecting the render mode.
pub const MODE_ENV: &str = "VOYAGE_MODE";
/// Environment variable selecting the listen port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable selecting the listen host.
pub const HOST_ENV: &str = "VOYAGE_HOST";
/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "VOYAGE_LOG_FORMAT";

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid {var}=`{value}`: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Site layout.
    #[serde(default)]
    pub site: SiteSection,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Build output.
    #[serde(default)]
    pub build: BuildSection,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply `VOYAGE_MODE`, `PORT`, `VOYAGE_HOST` and `VOYAGE_LOG_FORMAT`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup(MODE_ENV) {
            self.server.mode = value.parse().map_err(|e: voyage_core::ParseModeError| {
                ConfigError::InvalidEnv {
                    var: MODE_ENV,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup(PORT_ENV) {
            self.server.port = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: PORT_ENV,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup(HOST_ENV) {
            self.server.host = value;
        }
        if let Some(value) = lookup(LOG_FORMAT_ENV) {
            value
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidEnv {
                    var: LOG_FORMAT_ENV,
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            self.server.log_format = Some(value);
        }
        Ok(())
    }

    /// Resolve the site configuration. Relative paths are taken from
    /// `base`; without a configured root the site's bundled root is used.
    pub fn site_config(&self, base: &Path, default_root: PathBuf) -> SiteConfig {
        let site = &self.site;
        let root = site
            .root
            .as_ref()
            .map(|root| resolve(base, root))
            .unwrap_or(default_root);

        let mut config = SiteConfig::new(root).with_name(site.name.clone());
        if let Some(template) = &site.template {
            config = config.with_template(template);
        }
        if let Some(dir) = &site.pages_dir {
            config.pages_dir = dir.clone();
        }
        if let Some(dir) = &site.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &site.public_dir {
            config.public_dir = dir.clone();
        }
        if let Some(id) = &site.root_element {
            config = config.with_root_element(id.clone());
        }
        if let Some(ms) = site.render_timeout_ms {
            config = config.with_render_timeout(Duration::from_millis(ms));
        }
        if let Some(dist) = &self.build.dist_dir {
            config = config.with_dist_dir(resolve(base, dist));
        }
        config
    }

    /// Logging setup for a mode. An explicit format wins over the mode's.
    pub fn log_config(&self, mode: RenderMode) -> LogConfig {
        let format = self
            .server
            .log_format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_else(|| LogFormat::for_mode(mode));
        LogConfig::new(format).with_filter(self.server.log_filter.clone())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `[site]`: which site to serve and where its files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSection {
    /// Registered site name.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Site root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,

    /// `id` of the hydration root element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_element: Option<String>,

    /// Upper bound for a single render, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_timeout_ms: Option<u64>,
}

fn default_site_name() -> String {
    travel_site::SITE_NAME.to_string()
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            root: None,
            template: None,
            pages_dir: None,
            data_dir: None,
            public_dir: None,
            root_element: None,
            render_timeout_ms: None,
        }
    }
}

/// `[server]`: listener and logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_mode")]
    pub mode: RenderMode,

    /// `json` or `human`; follows the mode when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,

    /// Filter directives used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_mode() -> RenderMode {
    RenderMode::Development
}

fn default_log_filter() -> String {
    voyage_observability::DEFAULT_LOG_FILTER.to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: default_mode(),
            log_format: None,
            log_filter: default_log_filter(),
        }
    }
}

/// `[build]`: where build output goes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSection {
    /// Output directory; `<root>/dist` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[site]
name = "travel-site"
root = "site"
root_element = "root"
render_timeout_ms = 250

[server]
port = 8080
mode = "production"
log_format = "human"

[build]
dist_dir = "/tmp/voyage-dist"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_sample() {
        let config: CliConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.mode, RenderMode::Production);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.site.render_timeout_ms, Some(250));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.site.name, "travel-site");
        assert_eq!(config.server.mode, RenderMode::Development);
    }

    #[test]
    fn test_site_config_resolves_paths() {
        let config: CliConfig = toml::from_str(SAMPLE).unwrap();
        let site = config.site_config(Path::new("/srv/voyage"), PathBuf::from("/unused"));

        assert_eq!(site.root, PathBuf::from("/srv/voyage/site"));
        assert_eq!(site.dist_dir, PathBuf::from("/tmp/voyage-dist"));
        assert_eq!(site.root_element, "root");
        assert_eq!(site.render_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_site_config_default_root() {
        let site = CliConfig::default().site_config(Path::new("/srv"), PathBuf::from("/bundled"));
        assert_eq!(site.root, PathBuf::from("/bundled"));
        assert_eq!(site.dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config
            .apply_env(env(&[("VOYAGE_MODE", "production"), ("PORT", "9000"), ("VOYAGE_HOST", "0.0.0.0")]))
            .unwrap();
        assert_eq!(config.server.mode, RenderMode::Production);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_env_is_rejected() {
        let mut config = CliConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));

        let err = config.apply_env(env(&[("VOYAGE_MODE", "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "VOYAGE_MODE", .. }));
    }

    #[test]
    fn test_log_config_follows_mode() {
        let config = CliConfig::default();
        assert_eq!(config.log_config(RenderMode::Production).format, LogFormat::Json);
        assert_eq!(config.log_config(RenderMode::Development).format, LogFormat::Human);

        let config: CliConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.log_config(RenderMode::Production).format, LogFormat::Human);
    }

    #[test]
    fn test_load_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("voyage.toml");
        std::fs::write(&toml_path, SAMPLE).unwrap();
        assert_eq!(CliConfig::load(&toml_path).unwrap().server.port, 8080);

        let json_path = dir.path().join("voyage.json");
        std::fs::write(&json_path, r#"{ "server": { "port": 4000 } }"#).unwrap();
        assert_eq!(CliConfig::load(&json_path).unwrap().server.port, 4000);

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[server\nport = 1").unwrap();
        assert!(matches!(CliConfig::load(&bad), Err(ConfigError::Parse { .. })));
    }
}
