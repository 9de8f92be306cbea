//! Markup parser for page module bodies.
//!
//! Produces a [`TemplateNode`] tree. Every node records its position in the
//! generated code so render errors can be mapped back through the module's
//! [`SourceMap`](crate::SourceMap).

use serde::{Deserialize, Serialize};
use voyage_core::{ModuleTransformError, SourceLocation};
use voyage_view::{is_raw_text_element, is_void_element, EventBinding};

/// Prefix of event binding attributes (`on:click="handler"`).
pub const EVENT_ATTR_PREFIX: &str = "on:";

/// Roots an interpolation path may start from, besides `each` bindings.
pub const SCOPE_ROOTS: &[&str] = &["params", "props", "url"];

/// Elements whose whitespace is kept as authored.
const PREFORMATTED: &[&str] = &["pre", "textarea", "script", "style"];

/// A position in generated code, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    /// Attach a source identifier.
    pub fn at(&self, source: &str) -> SourceLocation {
        SourceLocation::new(source, self.line, self.column)
    }
}

/// An interpolation: `{{ props.price ?? "n/a" }}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    /// Dotted lookup path.
    pub path: Vec<String>,
    /// Literal used when the lookup finds nothing.
    pub fallback: Option<String>,
    /// Position of the opening braces.
    pub pos: Pos,
    /// Authored text, braces included.
    pub source: String,
}

impl Expr {
    /// The lookup path joined with dots.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Piece of a text node or attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextPart {
    Literal(String),
    Expr(Expr),
}

/// An attribute whose value may interpolate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAttr {
    pub name: String,
    pub parts: Vec<TextPart>,
}

/// A node of a compiled page module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateNode {
    Element {
        tag: String,
        attrs: Vec<TemplateAttr>,
        events: Vec<EventBinding>,
        children: Vec<TemplateNode>,
        pos: Pos,
    },
    Text {
        parts: Vec<TextPart>,
        pos: Pos,
    },
    Each {
        list: Expr,
        binding: String,
        children: Vec<TemplateNode>,
        pos: Pos,
    },
}

/// Parse a module body.
///
/// `source` identifies the generated code in error locations.
pub fn parse_markup(source: &str, body: &str) -> Result<Vec<TemplateNode>, ModuleTransformError> {
    let mut parser = Parser {
        source,
        src: body,
        offset: 0,
        line: 1,
        column: 1,
        bindings: Vec::new(),
        preformatted: 0,
    };
    parser.children(Until::Eof)
}

/// What ends the current child list.
#[derive(Debug, Clone)]
enum Until {
    Eof,
    Close { tag: String, pos: Pos },
    EndEach { pos: Pos },
}

struct Parser<'a> {
    source: &'a str,
    src: &'a str,
    offset: usize,
    line: u32,
    column: u32,
    bindings: Vec<String>,
    preformatted: usize,
}

impl<'a> Parser<'a> {
    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    fn at_end(&self) -> bool {
        self.offset >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        self.rest()
            .as_bytes()
            .get(..s.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(s.as_bytes()))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in s.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> ModuleTransformError {
        ModuleTransformError::Syntax {
            message: message.into(),
            location: pos.at(self.source),
        }
    }

    fn at_tag_start(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<')
            && chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
    }

    fn at_block(&self) -> bool {
        self.starts_with("{{#") || self.starts_with("{{/")
    }

    fn children(&mut self, until: Until) -> Result<Vec<TemplateNode>, ModuleTransformError> {
        let mut nodes = Vec::new();

        loop {
            if self.at_end() {
                return match until {
                    Until::Eof => Ok(nodes),
                    Until::Close { tag, pos } => Err(self.error(pos, format!("unclosed <{}>", tag))),
                    Until::EndEach { pos } => {
                        Err(self.error(pos, "unclosed {{#each}} block"))
                    }
                };
            }

            if self.starts_with("<!--") {
                self.comment()?;
            } else if self.starts_with("</") {
                let pos = self.pos();
                let tag = self.close_tag()?;
                match &until {
                    Until::Close { tag: open, .. } if *open == tag => return Ok(nodes),
                    _ => return Err(self.error(pos, format!("unexpected </{}>", tag))),
                }
            } else if self.at_tag_start() {
                nodes.push(self.element()?);
            } else if self.starts_with("{{#each") {
                nodes.push(self.each()?);
            } else if self.starts_with("{{/each}}") {
                let pos = self.pos();
                self.eat("{{/each}}");
                return match until {
                    Until::EndEach { .. } => Ok(nodes),
                    _ => Err(self.error(pos, "{{/each}} without a matching {{#each}}")),
                };
            } else if self.at_block() {
                return Err(self.error(self.pos(), "unknown block; only {{#each}} is supported"));
            } else if let Some(text) = self.text()? {
                nodes.push(text);
            }
        }
    }

    fn comment(&mut self) -> Result<(), ModuleTransformError> {
        let pos = self.pos();
        self.eat("<!--");
        while !self.eat("-->") {
            if self.bump().is_none() {
                return Err(self.error(pos, "unclosed comment"));
            }
        }
        Ok(())
    }

    fn name(&mut self, what: &str) -> Result<String, ModuleTransformError> {
        let pos = self.pos();
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error(pos, format!("expected {} name", what)));
        }
        Ok(name.to_ascii_lowercase())
    }

    fn close_tag(&mut self) -> Result<String, ModuleTransformError> {
        let pos = self.pos();
        self.eat("</");
        let tag = self.name("tag")?;
        self.skip_whitespace();
        if !self.eat(">") {
            return Err(self.error(pos, format!("malformed closing tag </{}", tag)));
        }
        Ok(tag)
    }

    fn element(&mut self) -> Result<TemplateNode, ModuleTransformError> {
        let pos = self.pos();
        self.eat("<");
        let tag = self.name("tag")?;

        let mut attrs: Vec<TemplateAttr> = Vec::new();
        let mut events = Vec::new();
        let self_closing;

        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                self_closing = true;
                break;
            }
            if self.eat(">") {
                self_closing = false;
                break;
            }
            if self.at_end() {
                return Err(self.error(pos, format!("unterminated <{}> tag", tag)));
            }

            let attr_pos = self.pos();
            let name = self.attr_name()?;
            self.skip_whitespace();
            let parts = if self.eat("=") {
                self.skip_whitespace();
                self.attr_value()?
            } else {
                Vec::new()
            };

            if let Some(event) = name.strip_prefix(EVENT_ATTR_PREFIX) {
                let handler = match parts.as_slice() {
                    [TextPart::Literal(handler)] if !handler.trim().is_empty() => {
                        handler.trim().to_string()
                    }
                    _ => {
                        return Err(self.error(
                            attr_pos,
                            format!("`{}` needs a literal handler name", name),
                        ))
                    }
                };
                if event.is_empty() {
                    return Err(self.error(attr_pos, "event binding needs an event name"));
                }
                events.push(EventBinding {
                    event: event.to_string(),
                    handler,
                });
                continue;
            }

            if attrs.iter().any(|a| a.name == name) {
                return Err(self.error(attr_pos, format!("duplicate attribute `{}`", name)));
            }
            attrs.push(TemplateAttr { name, parts });
        }

        let children = if is_void_element(&tag) || self_closing {
            Vec::new()
        } else if is_raw_text_element(&tag) {
            self.raw_text(&tag, pos)?
        } else {
            let preformatted = PREFORMATTED.contains(&tag.as_str());
            if preformatted {
                self.preformatted += 1;
            }
            let children = self.children(Until::Close {
                tag: tag.clone(),
                pos,
            });
            if preformatted {
                self.preformatted -= 1;
            }
            let mut children = children?;
            if preformatted {
                strip_leading_newline(&mut children);
            }
            children
        };

        Ok(TemplateNode::Element {
            tag,
            attrs,
            events,
            children,
            pos,
        })
    }

    fn attr_name(&mut self) -> Result<String, ModuleTransformError> {
        let pos = self.pos();
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '=' | '>' | '/' | '"' | '\'' | '<') {
                break;
            }
            name.push(c);
            self.bump();
        }
        if name.is_empty() {
            return Err(self.error(pos, "expected attribute name"));
        }
        Ok(name.to_ascii_lowercase())
    }

    fn attr_value(&mut self) -> Result<Vec<TextPart>, ModuleTransformError> {
        let pos = self.pos();
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                Some(q)
            }
            _ => None,
        };

        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(pos, "unterminated attribute value")),
                Some(c) if Some(c) == quote => {
                    self.bump();
                    break;
                }
                Some(c) if quote.is_none() && (c.is_whitespace() || c == '>') => break,
                Some(_) if self.starts_with("{{") => {
                    flush_literal(&mut parts, &mut literal);
                    parts.push(TextPart::Expr(self.expr()?));
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        flush_literal(&mut parts, &mut literal);
        Ok(parts)
    }

    fn raw_text(&mut self, tag: &str, pos: Pos) -> Result<Vec<TemplateNode>, ModuleTransformError> {
        let close = format!("</{}", tag);
        let text_pos = self.pos();
        let mut text = String::new();
        loop {
            if self.starts_with_ignore_case(&close) {
                break;
            }
            match self.bump() {
                Some(c) => text.push(c),
                None => return Err(self.error(pos, format!("unclosed <{}>", tag))),
            }
        }
        self.close_tag()?;

        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![TemplateNode::Text {
            parts: vec![TextPart::Literal(text)],
            pos: text_pos,
        }])
    }

    fn text(&mut self) -> Result<Option<TemplateNode>, ModuleTransformError> {
        let pos = self.pos();
        let mut parts = Vec::new();
        let mut literal = String::new();

        while !self.at_end() && !self.at_tag_start() && !self.at_block() {
            if self.starts_with("{{") {
                flush_literal(&mut parts, &mut literal);
                parts.push(TextPart::Expr(self.expr()?));
            } else if let Some(c) = self.bump() {
                literal.push(c);
            }
        }
        flush_literal(&mut parts, &mut literal);

        if self.preformatted == 0 {
            parts = collapse_whitespace(parts);
        }
        if parts.is_empty() {
            return Ok(None);
        }
        Ok(Some(TemplateNode::Text { parts, pos }))
    }

    fn expr(&mut self) -> Result<Expr, ModuleTransformError> {
        let pos = self.pos();
        let start = self.offset;
        self.eat("{{");
        let inner_start = self.offset;
        let Some(len) = self.rest().find("}}") else {
            return Err(self.error(pos, "unclosed `{{`"));
        };
        let inner = &self.src[inner_start..inner_start + len];
        if inner.contains('\n') {
            return Err(self.error(pos, "interpolation may not span lines"));
        }
        for _ in inner.chars() {
            self.bump();
        }
        self.eat("}}");
        let source = self.src[start..self.offset].to_string();

        let (path_src, fallback) = match inner.split_once("??") {
            Some((path, fallback)) => (path, Some(parse_string_literal(fallback.trim()))),
            None => (inner, None),
        };
        let fallback = match fallback {
            Some(Some(value)) => Some(value),
            Some(None) => {
                return Err(self.error(pos, "fallback must be a quoted string"));
            }
            None => None,
        };

        let path = self.path(path_src.trim(), pos)?;
        Ok(Expr {
            path,
            fallback,
            pos,
            source,
        })
    }

    fn path(&self, text: &str, pos: Pos) -> Result<Vec<String>, ModuleTransformError> {
        let segments: Vec<String> = text.split('.').map(str::to_string).collect();
        let valid = segments.iter().all(|s| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });
        if !valid {
            return Err(self.error(pos, format!("invalid lookup path `{}`", text)));
        }

        let root = segments[0].as_str();
        if !SCOPE_ROOTS.contains(&root) && !self.bindings.iter().any(|b| b == root) {
            return Err(self.error(
                pos,
                format!(
                    "unknown name `{}`; expected params, props, url or an each binding",
                    root
                ),
            ));
        }
        Ok(segments)
    }

    fn each(&mut self) -> Result<TemplateNode, ModuleTransformError> {
        let pos = self.pos();
        self.eat("{{#each");
        let Some(len) = self.rest().find("}}") else {
            return Err(self.error(pos, "unclosed {{#each"));
        };
        let header = self.rest()[..len].to_string();
        for _ in header.chars() {
            self.bump();
        }
        self.eat("}}");

        let words: Vec<&str> = header.split_whitespace().collect();
        let (path_src, binding) = match words.as_slice() {
            [path, "as", binding] => (*path, *binding),
            _ => {
                return Err(self.error(pos, "expected {{#each <path> as <name>}}"));
            }
        };
        if SCOPE_ROOTS.contains(&binding)
            || !binding
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(self.error(pos, format!("invalid each binding `{}`", binding)));
        }

        let list = Expr {
            path: self.path(path_src, pos)?,
            fallback: None,
            pos,
            source: format!("{{{{#each{}}}}}", header),
        };

        self.bindings.push(binding.to_string());
        let children = self.children(Until::EndEach { pos });
        self.bindings.pop();

        Ok(TemplateNode::Each {
            list,
            binding: binding.to_string(),
            children: children?,
            pos,
        })
    }
}

fn flush_literal(parts: &mut Vec<TextPart>, literal: &mut String) {
    if !literal.is_empty() {
        parts.push(TextPart::Literal(std::mem::take(literal)));
    }
}

/// HTML parsers drop a newline directly after `<pre>` and `<textarea>`.
fn strip_leading_newline(children: &mut Vec<TemplateNode>) {
    if let Some(TemplateNode::Text { parts, .. }) = children.first_mut() {
        if let Some(TextPart::Literal(text)) = parts.first_mut() {
            if let Some(rest) = text.strip_prefix('\n') {
                *text = rest.to_string();
            }
            if text.is_empty() {
                parts.remove(0);
            }
        }
        if parts.is_empty() {
            children.remove(0);
        }
    }
}

fn parse_string_literal(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(inner.to_string())
}

/// Drop whitespace-only text spanning lines and collapse line-spanning
/// whitespace runs to a single space.
fn collapse_whitespace(parts: Vec<TextPart>) -> Vec<TextPart> {
    let only_whitespace = parts
        .iter()
        .all(|p| matches!(p, TextPart::Literal(s) if s.trim().is_empty()));
    if only_whitespace {
        let has_newline = parts
            .iter()
            .any(|p| matches!(p, TextPart::Literal(s) if s.contains('\n')));
        return if has_newline { Vec::new() } else { parts };
    }

    parts
        .into_iter()
        .map(|part| match part {
            TextPart::Literal(s) => TextPart::Literal(collapse_runs(&s)),
            expr => expr,
        })
        .collect()
}

fn collapse_runs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = String::new();
    for c in s.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        push_run(&mut out, &mut run);
        out.push(c);
    }
    push_run(&mut out, &mut run);
    out
}

fn push_run(out: &mut String, run: &mut String) {
    if run.contains('\n') {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(body: &str) -> Vec<TemplateNode> {
        parse_markup("/@modules/test", body).unwrap()
    }

    fn parse_err(body: &str) -> ModuleTransformError {
        parse_markup("/@modules/test", body).unwrap_err()
    }

    fn syntax_location(err: &ModuleTransformError) -> (u32, u32) {
        let loc = err.location().unwrap();
        (loc.line, loc.column)
    }

    // === Element Tests ===

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse("<section class=\"hero\">\n  <h1>Hello</h1>\n</section>\n");

        assert_eq!(nodes.len(), 1);
        let TemplateNode::Element {
            tag,
            attrs,
            children,
            pos,
            ..
        } = &nodes[0]
        else {
            panic!("expected element");
        };
        assert_eq!(tag, "section");
        assert_eq!(attrs[0].name, "class");
        assert_eq!(attrs[0].parts, vec![TextPart::Literal("hero".to_string())]);
        assert_eq!(*pos, Pos { line: 1, column: 1 });

        // Indentation-only text is dropped.
        assert_eq!(children.len(), 1);
        let TemplateNode::Element { tag, pos, .. } = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(tag, "h1");
        assert_eq!(*pos, Pos { line: 2, column: 3 });
    }

    #[test]
    fn test_void_and_boolean_attributes() {
        let nodes = parse("<input type=\"checkbox\" checked><br/>");

        assert_eq!(nodes.len(), 2);
        let TemplateNode::Element { attrs, children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(attrs[1].name, "checked");
        assert!(attrs[1].parts.is_empty());
        assert!(children.is_empty());
    }

    #[test]
    fn test_event_bindings_are_split_out() {
        let nodes = parse("<button on:click=\"add_to_trip\" class=\"cta\">Add</button>");

        let TemplateNode::Element { attrs, events, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(attrs.len(), 1);
        assert_eq!(
            events,
            &vec![EventBinding {
                event: "click".to_string(),
                handler: "add_to_trip".to_string(),
            }]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let nodes = parse("<!-- hero --><p>a</p>");
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_raw_text_is_verbatim() {
        let nodes = parse("<style>a > b { color: red; }</style>");
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(
            children,
            &vec![TemplateNode::Text {
                parts: vec![TextPart::Literal("a > b { color: red; }".to_string())],
                pos: Pos { line: 1, column: 8 },
            }]
        );
    }

    #[test]
    fn test_raw_text_with_multibyte_chars() {
        let nodes = parse("<style>.jp::before { content: \"日本語\"; }</STYLE><p>ok</p>");
        assert_eq!(nodes.len(), 2);
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert!(matches!(
            &children[0],
            TemplateNode::Text { parts, .. }
                if parts == &vec![TextPart::Literal(".jp::before { content: \"日本語\"; }".to_string())]
        ));
    }

    #[test]
    fn test_unclosed_raw_text_ending_in_multibyte_char() {
        let err = parse_err("<script>const price = \"€\"");
        assert!(err.to_string().contains("unclosed <script>"));
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let nodes = parse("<pre>\n  line\n</pre>");
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert!(matches!(
            &children[0],
            TemplateNode::Text { parts, .. } if parts == &vec![TextPart::Literal("  line\n".to_string())]
        ));
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let nodes = parse("<p>Sun\n   and sea</p>");
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert!(matches!(
            &children[0],
            TemplateNode::Text { parts, .. } if parts == &vec![TextPart::Literal("Sun and sea".to_string())]
        ));
    }

    // === Interpolation Tests ===

    #[test]
    fn test_text_interpolation() {
        let nodes = parse("<p>From {{ props.price ?? \"n/a\" }} EUR</p>");
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        let TemplateNode::Text { parts, .. } = &children[0] else {
            panic!("expected text");
        };

        assert_eq!(parts.len(), 3);
        let TextPart::Expr(expr) = &parts[1] else {
            panic!("expected expr");
        };
        assert_eq!(expr.path, vec!["props", "price"]);
        assert_eq!(expr.fallback.as_deref(), Some("n/a"));
        assert_eq!(expr.pos, Pos { line: 1, column: 9 });
        assert_eq!(expr.source, "{{ props.price ?? \"n/a\" }}");
    }

    #[test]
    fn test_attribute_interpolation() {
        let nodes = parse("<a href=\"/destinations/{{ params.slug }}\">x</a>");
        let TemplateNode::Element { attrs, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(attrs[0].parts.len(), 2);
        assert!(matches!(&attrs[0].parts[1], TextPart::Expr(e) if e.dotted() == "params.slug"));
    }

    #[test]
    fn test_each_block_scopes_binding() {
        let nodes = parse(
            "<ul>\n{{#each props.items as place}}\n  <li>{{ place.name }}</li>\n{{/each}}\n</ul>",
        );
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        let TemplateNode::Each {
            list,
            binding,
            children,
            pos,
        } = &children[0]
        else {
            panic!("expected each");
        };
        assert_eq!(list.dotted(), "props.items");
        assert_eq!(binding, "place");
        assert_eq!(*pos, Pos { line: 2, column: 1 });
        assert_eq!(children.len(), 1);
    }

    // === Error Tests ===

    #[test]
    fn test_unknown_root_is_rejected() {
        let err = parse_err("<p>\n  {{ window.title }}</p>");
        assert!(err.to_string().contains("unknown name `window`"));
        assert_eq!(syntax_location(&err), (2, 3));
    }

    #[test]
    fn test_binding_out_of_scope() {
        let err = parse_err("{{#each props.items as item}}{{/each}}<p>{{ item.name }}</p>");
        assert!(err.to_string().contains("unknown name `item`"));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse_err("<main>\n  <p>text</p>\n");
        assert!(err.to_string().contains("unclosed <main>"));
        assert_eq!(syntax_location(&err), (1, 1));
    }

    #[test]
    fn test_mismatched_close() {
        let err = parse_err("<div>\n</span>");
        assert!(err.to_string().contains("unexpected </span>"));
        assert_eq!(syntax_location(&err), (2, 1));
    }

    #[test]
    fn test_unclosed_each() {
        let err = parse_err("{{#each props.items as item}}<p></p>");
        assert!(err.to_string().contains("unclosed {{#each}}"));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = parse_err("<div id=\"a\" id=\"b\"></div>");
        assert!(err.to_string().contains("duplicate attribute `id`"));
    }

    #[test]
    fn test_event_needs_literal_handler() {
        let err = parse_err("<button on:click=\"{{ props.fn }}\"></button>");
        assert!(err.to_string().contains("literal handler name"));
    }

    #[test]
    fn test_unquoted_fallback_is_rejected() {
        let err = parse_err("{{ props.x ?? nothing }}");
        assert!(err.to_string().contains("quoted string"));
    }
}
