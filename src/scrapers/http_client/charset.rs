//! Character encoding detection for HTML responses.
//!
//! Resolution order: byte order mark, Content-Type charset, `<meta>` charset
//! declaration near the top of the document, then UTF-8.

use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

use super::response::content_type_charset;

/// How far into the body to look for a `<meta>` charset declaration.
const META_SNIFF_LIMIT: usize = 1024;

fn meta_charset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#)
            .expect("valid meta charset regex")
    })
}

/// Find the charset declared by a `<meta>` tag in the document head.
pub fn sniff_meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    let caps = meta_charset_regex().captures(head)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}

/// Pick the encoding for an HTML body.
pub fn detect_encoding(content_type: Option<&str>, body: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(content_type_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    sniff_meta_charset(body).unwrap_or(UTF_8)
}

/// Decode an HTML body to UTF-8 text.
pub fn decode_html(content_type: Option<&str>, body: &[u8]) -> String {
    let encoding = detect_encoding(content_type, body);
    // decode() strips a matching BOM and replaces malformed sequences
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::GBK;

    #[test]
    fn test_header_charset_wins_over_default() {
        let (bytes, _, _) = GBK.encode("<p>笑话</p>");
        let text = decode_html(Some("text/html; charset=gbk"), &bytes);
        assert_eq!(text, "<p>笑话</p>");
    }

    #[test]
    fn test_meta_charset_sniffed() {
        let html = r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=gb2312"></head><body>段子</body></html>"#;
        let (bytes, _, _) = GBK.encode(html);
        assert_eq!(decode_html(Some("text/html"), &bytes), html);
        assert_eq!(decode_html(None, &bytes), html);
    }

    #[test]
    fn test_html5_meta_charset() {
        let body = br#"<meta charset="GBK"><title>x</title>"#;
        assert_eq!(sniff_meta_charset(body), Some(GBK));
    }

    #[test]
    fn test_defaults_to_utf8() {
        let body = "<p>捧腹</p>".as_bytes();
        assert_eq!(detect_encoding(None, body), UTF_8);
        assert_eq!(decode_html(None, body), "<p>捧腹</p>");
    }

    #[test]
    fn test_bom_overrides_header() {
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice("挖段子".as_bytes());
        assert_eq!(detect_encoding(Some("text/html; charset=gbk"), &body), UTF_8);
        assert_eq!(decode_html(Some("text/html; charset=gbk"), &body), "挖段子");
    }
}
