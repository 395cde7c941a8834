//! Helpers shared by the fetcher and the parser.

/// Root elements of the feed formats we accept.
const FEED_ROOTS: [&str; 3] = ["<rss", "<feed", "<rdf:RDF"];

/// HTML named entities seen in news feed bodies that XML does not define.
const HTML_ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", "&#160;"),
    ("&ndash;", "&#8211;"),
    ("&mdash;", "&#8212;"),
    ("&lsquo;", "&#8216;"),
    ("&rsquo;", "&#8217;"),
    ("&hellip;", "&#8230;"),
];

/// Only absolute http(s) URLs are fetched.
pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Whether `body` contains the root element of an RSS, RDF or Atom document.
pub fn looks_like_feed(body: &str) -> bool {
    FEED_ROOTS.iter().any(|root| body.contains(root))
}

/// Repair the usual defects of a feed body so it can be parsed a second time.
///
/// Drops a byte-order mark and anything before the document, removes
/// characters XML forbids, and rewrites HTML-only entities as character
/// references.
pub fn cleanup_xml(body: &str) -> String {
    let body = body.trim_start_matches(|c: char| c == '\u{FEFF}' || c.is_whitespace());

    let start = std::iter::once("<?xml")
        .chain(FEED_ROOTS)
        .filter_map(|marker| body.find(marker))
        .min()
        .unwrap_or(0);

    let mut cleaned: String = body[start..].chars().filter(|&c| is_xml_char(c)).collect();
    for (entity, reference) in HTML_ENTITIES {
        if cleaned.contains(entity) {
            cleaned = cleaned.replace(entity, reference);
        }
    }
    cleaned
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://news.google.com/rss?hl=en"));
        assert!(is_valid_url("http://127.0.0.1:8080/feed"));
        assert!(!is_valid_url("ftp://example.com/feed"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_cleanup_xml() {
        let dirty = "\u{FEFF}  junk<rss version=\"2.0\">A&nbsp;B\u{0001}</rss>";
        assert_eq!(cleanup_xml(dirty), "<rss version=\"2.0\">A&#160;B</rss>");
    }

    #[test]
    fn test_cleanup_keeps_declaration() {
        let body = "<?xml version=\"1.0\"?>\n<feed>x&hellip;</feed>";
        assert_eq!(
            cleanup_xml(body),
            "<?xml version=\"1.0\"?>\n<feed>x&#8230;</feed>"
        );
    }

    #[test]
    fn test_looks_like_feed() {
        assert!(looks_like_feed("<rss version=\"2.0\"></rss>"));
        assert!(looks_like_feed("<feed xmlns=\"http://www.w3.org/2005/Atom\"/>"));
        assert!(!looks_like_feed("<html><body>maintenance</body></html>"));
    }
}
