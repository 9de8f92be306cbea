//! TOML front matter of page modules.

use serde::{Deserialize, Serialize};
use voyage_core::ModuleTransformError;

/// Delimiter line around the front matter block.
pub const FRONT_MATTER_FENCE: &str = "---";

/// Metadata declared at the top of a page module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontMatter {
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,
    /// Meta description.
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical URL.
    #[serde(default)]
    pub canonical: Option<String>,
    /// Data module supplying the page's static props.
    #[serde(default)]
    pub data: Option<String>,
}

/// A module split into front matter and markup body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitModule<'a> {
    /// Parsed front matter (default when absent).
    pub front: FrontMatter,
    /// Markup following the front matter.
    pub body: &'a str,
    /// Number of original lines before the body starts.
    pub body_line_offset: u32,
}

/// Split a module source into front matter and body.
///
/// Front matter is optional. When present it must open on the first line
/// and be closed by another `---` line.
pub fn split_front_matter<'a>(
    module: &str,
    source: &'a str,
) -> Result<SplitModule<'a>, ModuleTransformError> {
    let error = |message: String| ModuleTransformError::FrontMatter {
        module: module.to_string(),
        message,
    };

    let first_line_end = source.find('\n').unwrap_or(source.len());
    if source[..first_line_end].trim_end() != FRONT_MATTER_FENCE {
        return Ok(SplitModule {
            front: FrontMatter::default(),
            body: source,
            body_line_offset: 0,
        });
    }

    let mut offset = first_line_end + 1;
    let mut lines = 1u32;
    loop {
        if offset >= source.len() {
            return Err(error("front matter is not closed by `---`".to_string()));
        }

        let line_end = source[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(source.len());
        lines += 1;

        if source[offset..line_end].trim_end() == FRONT_MATTER_FENCE {
            let toml_src = &source[first_line_end + 1..offset];
            let front: FrontMatter =
                toml::from_str(toml_src).map_err(|e| error(e.message().to_string()))?;
            let body_start = (line_end + 1).min(source.len());

            return Ok(SplitModule {
                front,
                body: &source[body_start..],
                body_line_offset: lines,
            });
        }

        offset = line_end + 1;
    }
}
