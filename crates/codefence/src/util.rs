//! Escaping helpers shared by the formatter and the fallback renderer.

use std::io::{self, Write};

/// Write `text` to `out` with HTML special characters escaped.
///
/// Escapes `&`, `<`, `>`, `"` and `'`. Unescaped runs are written in one call.
pub fn escape_html(out: &mut dyn Write, text: &str) -> io::Result<()> {
    let mut last = 0;
    for (idx, byte) in text.bytes().enumerate() {
        let entity = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#x27;",
            _ => continue,
        };
        out.write_all(&text.as_bytes()[last..idx])?;
        out.write_all(entity.as_bytes())?;
        last = idx + 1;
    }
    out.write_all(&text.as_bytes()[last..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escaped(text: &str) -> String {
        let mut out = Vec::new();
        escape_html(&mut out, text).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escape_html_special_chars() {
        assert_eq!(
            escaped(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escaped("fmt.Println(1)\n"), "fmt.Println(1)\n");
    }

    #[test]
    fn test_escape_html_multibyte() {
        assert_eq!(escaped("héllo <wörld>"), "héllo &lt;wörld&gt;");
    }

    #[test]
    fn test_escape_html_empty() {
        assert_eq!(escaped(""), "");
    }
}
