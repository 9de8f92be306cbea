//! HTML escaping.

/// Escape text content.
///
/// Carriage returns become `&#13;`; a literal one would be folded into
/// `\n` by the parser.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Prepare the text of a `script` or `style` element.
///
/// Raw text cannot carry character references. Line endings are folded
/// the way the parser folds them and any `</tag` sequence is written as
/// `<\/tag` so the content cannot close its element early.
pub fn escape_raw_text(tag: &str, s: &str) -> String {
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let close = format!("</{}", tag);
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let is_close = bytes
            .get(i..i + close.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(close.as_bytes()));
        if is_close {
            out.push_str(&s[start..i]);
            out.push_str("<\\/");
            start = i + 2;
            i += close.len();
        } else {
            i += 1;
        }
    }
    out.push_str(&s[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("Fish & <Chips>"), "Fish &amp; &lt;Chips&gt;");
        assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a "b" & c"#), "a &quot;b&quot; &amp; c");
    }

    #[test]
    fn test_carriage_returns_become_references() {
        assert_eq!(escape_text("Sun\r\nand sea"), "Sun&#13;\nand sea");
        assert_eq!(escape_attr("a\rb"), "a&#13;b");
    }

    #[test]
    fn test_escape_raw_text_breaks_closing_tag() {
        assert_eq!(
            escape_raw_text("script", r#"{"name":"</SCRIPT><img src=x>"}"#),
            r#"{"name":"<\/SCRIPT><img src=x>"}"#
        );
        assert_eq!(escape_raw_text("style", "a::after { content: \"</p>\" }"), "a::after { content: \"</p>\" }");
    }

    #[test]
    fn test_escape_raw_text_folds_line_endings() {
        assert_eq!(escape_raw_text("style", "a {}\r\nb {}\rc {}"), "a {}\nb {}\nc {}");
        assert_eq!(escape_raw_text("script", "const s = \"日本語\";"), "const s = \"日本語\";");
    }
}
