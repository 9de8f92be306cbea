//! Line-level source maps from transformed module code to authored files.

use serde::{Deserialize, Serialize};
use voyage_core::SourceLocation;

/// Maps generated (transformed) lines back to lines of the original file.
///
/// Columns are preserved by every transform this crate performs, so only
/// lines are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Identifier of the generated code (`/@modules/<name>`).
    pub generated: String,
    /// Path of the authored file, relative to the site root.
    pub original: String,
    /// `mappings[n]` is the original line of generated line `n + 1`.
    mappings: Vec<u32>,
}

impl SourceMap {
    /// Map where generated line `n` comes from original line `n + offset`.
    pub fn with_line_offset(
        generated: impl Into<String>,
        original: impl Into<String>,
        offset: u32,
        generated_lines: u32,
    ) -> Self {
        Self {
            generated: generated.into(),
            original: original.into(),
            mappings: (1..=generated_lines.max(1)).map(|n| n + offset).collect(),
        }
    }

    /// Number of generated lines covered.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the map covers no lines.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Translate a generated position to its original position.
    pub fn lookup(&self, line: u32, column: u32) -> Option<SourceLocation> {
        let index = usize::try_from(line.checked_sub(1)?).ok()?;
        let original_line = *self.mappings.get(index)?;
        Some(SourceLocation::new(self.original.clone(), original_line, column))
    }

    /// Translate a generated location, if it belongs to this map.
    pub fn original_location(&self, location: &SourceLocation) -> Option<SourceLocation> {
        if location.source != self.generated {
            return None;
        }
        self.lookup(location.line, location.column)
    }
}
