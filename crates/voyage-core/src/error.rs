//! Error taxonomy of the render pipeline.
//!
//! | Error | Where | Effect |
//! |---|---|---|
//! | [`TemplateLoadError`] | boot (both modes), per request in dev | fatal at boot, 500 per request |
//! | [`ModuleTransformError`] | dev transform, prod build | 500 with source location in dev |
//! | [`RenderError`] | component build/serialize | 500 |
//!
//! Hydration mismatches are client-only and live in the hydrate crate.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A position in a source file, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File or module URL the position refers to.
    pub source: String,
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(source: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// One frame of a render stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// What was executing (`page home`, `each props.trips`, ...).
    pub label: String,
    /// Where it was executing.
    pub location: SourceLocation,
}

impl StackFrame {
    /// Create a new frame.
    pub fn new(label: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            label: label.into(),
            location,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {} ({})", self.label, self.location)
    }
}

/// The HTML shell could not be loaded or is malformed.
#[derive(Debug, thiserror::Error)]
pub enum TemplateLoadError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template has no `{token}` placeholder")]
    MissingOutlet { token: &'static str },

    #[error("template contains `{token}` {count} times, expected exactly once")]
    DuplicateOutlet { token: &'static str, count: usize },

    #[error("template contains metadata slot `{token}` {count} times, expected at most once")]
    DuplicateSlot { token: &'static str, count: usize },
}

/// A source module failed to load or compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleTransformError {
    #[error("module `{0}` not found")]
    NotFound(String),

    #[error("failed to read module `{module}`: {message}")]
    Io { module: String, message: String },

    #[error("{message} ({location})")]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    #[error("invalid front matter in `{module}`: {message}")]
    FrontMatter { module: String, message: String },

    #[error("invalid data module `{module}`: {message}")]
    Data { module: String, message: String },
}

impl ModuleTransformError {
    /// Source location of the failure, if the error has one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Syntax { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// A component failed while building or serializing its tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("{component}: {message}")]
    Component {
        component: String,
        message: String,
        stack: Vec<StackFrame>,
    },

    #[error(transparent)]
    Module(#[from] ModuleTransformError),

    #[error("render exceeded the {0:?} budget")]
    Timeout(Duration),

    #[error("render panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    /// Create a component error without stack frames.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Push a frame onto the stack (innermost first).
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        if let Self::Component { stack, .. } = &mut self {
            stack.push(frame);
        }
        self
    }

    /// Stack frames, innermost first.
    pub fn stack(&self) -> &[StackFrame] {
        match self {
            Self::Component { stack, .. } => stack,
            _ => &[],
        }
    }

    /// Rewrite every location in the error through `fix`.
    ///
    /// Locations `fix` returns `None` for are left as they are.
    pub fn map_locations<F>(self, fix: F) -> Self
    where
        F: Fn(&SourceLocation) -> Option<SourceLocation>,
    {
        match self {
            Self::Component {
                component,
                message,
                stack,
            } => Self::Component {
                component,
                message,
                stack: stack
                    .into_iter()
                    .map(|frame| StackFrame {
                        location: fix(&frame.location).unwrap_or(frame.location),
                        label: frame.label,
                    })
                    .collect(),
            },
            Self::Module(ModuleTransformError::Syntax { message, location }) => {
                Self::Module(ModuleTransformError::Syntax {
                    location: fix(&location).unwrap_or(location),
                    message,
                })
            }
            other => other,
        }
    }

    /// Format the error and its stack the way a runtime prints a trace.
    pub fn trace(&self) -> String {
        let mut out = format!("RenderError: {}", self);
        for frame in self.stack() {
            out.push_str("\n    ");
            out.push_str(&frame.to_string());
        }
        if let Self::Module(err) = self {
            if let Some(location) = err.location() {
                out.push_str(&format!("\n    at {}", location));
            }
        }
        out
    }
}
