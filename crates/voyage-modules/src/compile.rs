//! The page-module transform.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use voyage_core::{ModuleTransformError, RenderContext, RenderError, SourceLocation};
use voyage_view::Node;

use crate::eval::evaluate;
use crate::frontmatter::{split_front_matter, FrontMatter};
use crate::markup::{parse_markup, TemplateNode};
use crate::sourcemap::SourceMap;

/// URL prefix compiled modules are served under in development.
pub const MODULE_URL_PREFIX: &str = "/@modules/";

/// Generated-code identifier of a module.
pub fn module_url(name: &str) -> String {
    format!("{}{}", MODULE_URL_PREFIX, name)
}

/// A transformed page module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledModule {
    /// Module name (`destinations`).
    pub name: String,
    /// Authored file, relative to the site root.
    pub source: String,
    /// Parsed front matter.
    pub front: FrontMatter,
    /// Template tree with generated positions.
    pub nodes: Vec<TemplateNode>,
    /// Generated-to-original line mapping.
    pub source_map: SourceMap,
    /// Content hash of the authored file.
    pub hash: String,
}

impl CompiledModule {
    /// Generated-code identifier (`/@modules/<name>`).
    pub fn url(&self) -> String {
        module_url(&self.name)
    }

    /// Evaluate the module for a request.
    pub fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError> {
        evaluate(&self.name, &self.source_map.generated, &self.nodes, ctx)
    }

    /// Map a generated location of this module to the authored file.
    pub fn original_location(&self, location: &SourceLocation) -> Option<SourceLocation> {
        self.source_map.original_location(location)
    }
}

/// Transform a page module.
///
/// Strips the front matter, parses the markup and builds the source map.
/// Syntax errors are reported at their location in the authored file.
pub fn compile_module(
    name: &str,
    original_path: &str,
    text: &str,
) -> Result<CompiledModule, ModuleTransformError> {
    let generated = module_url(name);
    let split = split_front_matter(name, text)?;

    let generated_lines = u32::try_from(split.body.lines().count()).unwrap_or(u32::MAX);
    let source_map = SourceMap::with_line_offset(
        generated.clone(),
        original_path,
        split.body_line_offset,
        generated_lines,
    );

    let nodes = parse_markup(&generated, split.body).map_err(|err| match err {
        ModuleTransformError::Syntax { message, location } => ModuleTransformError::Syntax {
            location: source_map
                .original_location(&location)
                .unwrap_or(location),
            message,
        },
        other => other,
    })?;

    Ok(CompiledModule {
        name: name.to_string(),
        source: original_path.to_string(),
        front: split.front,
        nodes,
        source_map,
        hash: content_hash(text.as_bytes()),
    })
}

/// Short hex SHA-256 of some content.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..12].to_string()
}
