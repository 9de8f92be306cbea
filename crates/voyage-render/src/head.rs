//! Head metadata written into the template's metadata slot.

use voyage_view::{escape_attr, escape_text, PageMeta};

/// Head content for the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadContent {
    /// Page title.
    pub title: Option<String>,
    /// Meta tags as `(name, content)`.
    pub meta: Vec<(String, String)>,
    /// Link tags as `(rel, href)`.
    pub links: Vec<(String, String)>,
}

impl HeadContent {
    /// Create new head content with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Head content for a page's metadata.
    pub fn from_meta(meta: &PageMeta) -> Self {
        let mut head = Self {
            title: meta.title.clone(),
            ..Default::default()
        };
        if let Some(description) = &meta.description {
            head = head.with_meta("description", description);
        }
        if let Some(canonical) = &meta.canonical {
            head = head.with_link("canonical", canonical);
        }
        head
    }

    /// Add a meta tag.
    pub fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.push((name.to_string(), content.to_string()));
        self
    }

    /// Add a link tag.
    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.push((rel.to_string(), href.to_string()));
        self
    }

    /// Whether there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.meta.is_empty() && self.links.is_empty()
    }

    /// Render head content to HTML.
    pub fn render(&self) -> String {
        let mut html = String::new();

        if let Some(title) = &self.title {
            html.push_str(&format!("<title>{}</title>\n", escape_text(title)));
        }

        for (name, content) in &self.meta {
            html.push_str(&format!(
                r#"<meta name="{}" content="{}">"#,
                escape_attr(name),
                escape_attr(content)
            ));
            html.push('\n');
        }

        for (rel, href) in &self.links {
            html.push_str(&format!(
                r#"<link rel="{}" href="{}">"#,
                escape_attr(rel),
                escape_attr(href)
            ));
            html.push('\n');
        }

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_meta_renders_all_fields() {
        let meta = PageMeta::titled("Kyoto & Osaka")
            .with_description("Temples \"and\" trains")
            .with_canonical("https://voyage.example/destinations/kyoto");

        let html = HeadContent::from_meta(&meta).render();

        assert_eq!(
            html,
            "<title>Kyoto &amp; Osaka</title>\n\
             <meta name=\"description\" content=\"Temples &quot;and&quot; trains\">\n\
             <link rel=\"canonical\" href=\"https://voyage.example/destinations/kyoto\">\n"
        );
    }

    #[test]
    fn test_empty_meta() {
        let head = HeadContent::from_meta(&PageMeta::default());
        assert!(head.is_empty());
        assert_eq!(head.render(), "");
    }
}
