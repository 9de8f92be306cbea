//! Access to compiled modules, live or precompiled.

use std::sync::Arc;

use serde_json::Value;
use voyage_core::{ModuleTransformError, SourceLocation};

use crate::compile::{CompiledModule, MODULE_URL_PREFIX};

/// Source of compiled page modules and data modules.
///
/// Implemented by the dev module graph (transform on demand) and by the
/// render bundle (precompiled).
pub trait ModuleProvider: Send + Sync {
    /// Compiled page module by name.
    fn page(&self, name: &str) -> Result<Arc<CompiledModule>, ModuleTransformError>;

    /// Parsed data module by name.
    fn data(&self, name: &str) -> Result<Arc<Value>, ModuleTransformError>;

    /// Map a generated location back to the authored file.
    fn original_location(&self, location: &SourceLocation) -> Option<SourceLocation> {
        let name = location.source.strip_prefix(MODULE_URL_PREFIX)?;
        self.page(name).ok()?.original_location(location)
    }
}

/// Parse a data module. Static props are always a JSON object.
pub fn parse_data_module(name: &str, text: &str) -> Result<Value, ModuleTransformError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ModuleTransformError::Data {
        module: name.to_string(),
        message: e.to_string(),
    })?;

    if !value.is_object() {
        return Err(ModuleTransformError::Data {
            module: name.to_string(),
            message: "top level must be a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Whether `name` is a usable module name.
///
/// Names map to file paths, so only `[A-Za-z0-9_-]` are accepted.
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_module() {
        let value = parse_data_module("deals", r#"{ "headline": "Autumn" }"#).unwrap();
        assert_eq!(value["headline"], "Autumn");
    }

    #[test]
    fn test_data_module_must_be_object() {
        let err = parse_data_module("list", "[1, 2]").unwrap_err();
        assert!(matches!(err, ModuleTransformError::Data { module, .. } if module == "list"));

        assert!(parse_data_module("bad", "{ nope").is_err());
    }

    #[test]
    fn test_module_names() {
        assert!(is_valid_module_name("destination-detail"));
        assert!(is_valid_module_name("not_found"));
        assert!(!is_valid_module_name(""));
        assert!(!is_valid_module_name("../secrets"));
        assert!(!is_valid_module_name("a/b"));
    }
}
