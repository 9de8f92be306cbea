//! Static file serving for `/public/*` (dev) and `/assets/*` (prod).

use std::path::{Component, Path, PathBuf};

use http::header::{self, HeaderValue};
use http::StatusCode;

use crate::response::{not_found, with_body, PipelineResponse, IMMUTABLE_CACHE};

/// Files below a directory, served under a URL prefix.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    prefix: String,
    dir: PathBuf,
    cache_control: &'static str,
}

impl StaticFiles {
    /// Serve `dir` under `prefix` (which must end in `/`), uncached.
    pub fn new(prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            dir: dir.into(),
            cache_control: "no-cache",
        }
    }

    /// Mark the files as content-hashed and cacheable forever.
    pub fn immutable(mut self) -> Self {
        self.cache_control = IMMUTABLE_CACHE;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the request path falls under this prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Serve a request path. `None` when the path is outside the prefix.
    pub async fn serve(&self, path: &str) -> Option<PipelineResponse> {
        let relative = path.strip_prefix(&self.prefix)?;

        let Some(file) = safe_join(&self.dir, relative) else {
            tracing::warn!(path, "rejected static path");
            return Some(not_found());
        };

        match tokio::fs::read(&file).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(&file).first_or_octet_stream();
                let mut response = with_body(StatusCode::OK, mime.as_ref(), bytes);
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, HeaderValue::from_static(self.cache_control));
                Some(response)
            }
            Err(err) => {
                tracing::debug!(path, error = %err, "static file not found");
                Some(not_found())
            }
        }
    }
}

/// Join a URL path below `root`, refusing anything that could leave it.
pub fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    if relative.is_empty() || relative.contains('\\') || relative.contains('\0') {
        return None;
    }

    let mut joined = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (joined != root).then_some(joined)
}
