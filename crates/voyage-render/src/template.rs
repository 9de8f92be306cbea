//! The HTML shell and the template compositor.

use std::fs;
use std::path::Path;

use voyage_core::TemplateLoadError;

use crate::head::HeadContent;
use crate::renderer::RenderedPage;

/// Placeholder replaced by the rendered fragment.
pub const OUTLET: &str = "<!--ssr-outlet-->";

/// Optional placeholder replaced by page metadata.
pub const HEAD_SLOT: &str = "<!--ssr-head-->";

/// A validated HTML shell.
///
/// Holds exactly one outlet and at most one metadata slot. Validation
/// happens here, at load time, so composing can never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    outlet: usize,
    head_slot: Option<usize>,
}

impl Template {
    /// Validate shell markup.
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateLoadError> {
        let source = source.into();

        let outlets: Vec<usize> = source.match_indices(OUTLET).map(|(i, _)| i).collect();
        let outlet = match outlets.as_slice() {
            [] => return Err(TemplateLoadError::MissingOutlet { token: OUTLET }),
            [at] => *at,
            many => {
                return Err(TemplateLoadError::DuplicateOutlet {
                    token: OUTLET,
                    count: many.len(),
                })
            }
        };

        let slots: Vec<usize> = source.match_indices(HEAD_SLOT).map(|(i, _)| i).collect();
        let head_slot = match slots.as_slice() {
            [] => None,
            [at] => Some(*at),
            many => {
                return Err(TemplateLoadError::DuplicateSlot {
                    token: HEAD_SLOT,
                    count: many.len(),
                })
            }
        };

        Ok(Self {
            source,
            outlet,
            head_slot,
        })
    }

    /// Read and validate a shell file.
    pub fn load(path: &Path) -> Result<Self, TemplateLoadError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(source)
    }

    /// The shell markup.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the shell has a metadata slot.
    pub fn has_head_slot(&self) -> bool {
        self.head_slot.is_some()
    }

    fn fill(&self, head: &str, body: &str) -> String {
        let mut slots = vec![(self.outlet, OUTLET.len(), body)];
        if let Some(at) = self.head_slot {
            slots.push((at, HEAD_SLOT.len(), head));
        }
        slots.sort_by_key(|(at, _, _)| *at);

        let mut out = String::with_capacity(self.source.len() + body.len() + head.len());
        let mut cursor = 0;
        for (at, len, fill) in slots {
            out.push_str(&self.source[cursor..at]);
            out.push_str(fill);
            cursor = at + len;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

/// Substitute a fragment for the outlet.
///
/// The metadata slot, if any, is cleared.
pub fn compose(template: &Template, fragment: &str) -> String {
    template.fill("", fragment)
}

/// Substitute a rendered page: metadata into the slot, then the fragment
/// followed by its static-props payload into the outlet.
pub fn compose_page(template: &Template, page: &RenderedPage) -> String {
    let head = HeadContent::from_meta(&page.meta).render();
    let mut body = String::with_capacity(page.html.len() + 256);
    body.push_str(&page.html);
    body.push_str(&page.payload.to_script_tag());
    template.fill(&head, &body)
}
