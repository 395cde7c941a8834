//! Per-item fields that feed-rs does not expose as written.
//!
//! feed-rs drops the RSS `<source>` element of an item and only keeps
//! publication dates it could parse. This pass walks the same document with
//! quick-xml and returns, for every `<item>`/`<entry>` in document order, the
//! publisher name and the publication date text exactly as the feed wrote it.

use anyhow::Result;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    /// Text of `<source>`, or of `<source><title>` in Atom.
    pub source: Option<String>,
    /// Text of `<pubDate>`/`<dc:date>` (RSS) or `<published>` (Atom), untouched.
    pub published: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Published,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"source" => Some(Field::Source),
            b"pubDate" | b"published" | b"date" => Some(Field::Published),
            _ => None,
        }
    }
}

fn is_item(name: &[u8]) -> bool {
    matches!(name, b"item" | b"entry")
}

/// Scan `body` and return one [`ItemFields`] per item, in document order.
pub fn scan_item_fields(body: &[u8]) -> Result<Vec<ItemFields>> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut items = Vec::new();

    let mut current: Option<ItemFields> = None;
    // Element depth below the open item; children of the item are at 1
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut capture_depth: Option<usize> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => {
                let name = element.local_name();
                let name = name.as_ref();
                if current.is_none() {
                    if is_item(name) {
                        current = Some(ItemFields::default());
                        depth = 0;
                    }
                } else {
                    depth += 1;
                    if depth == 1 {
                        field = Field::from_name(name);
                        capture_depth = field.map(|_| 1);
                        text.clear();
                    } else if depth == 2 && field == Some(Field::Source) && name == b"title" {
                        // Atom names the origin feed in a nested <title>
                        capture_depth = Some(2);
                        text.clear();
                    }
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    if current.is_some() {
                        items.extend(current.take());
                    }
                } else if let Some(fields) = current.as_mut() {
                    if depth == 1 {
                        if let Some(done) = field.take() {
                            store(fields, done, text.trim());
                        }
                        capture_depth = None;
                    } else if capture_depth == Some(depth) {
                        capture_depth = None;
                    }
                    depth -= 1;
                }
            }
            Event::Text(content) if capture_depth == Some(depth) => {
                text.push_str(&content.decode()?);
            }
            Event::CData(content) if capture_depth == Some(depth) => {
                text.push_str(&content.decode()?);
            }
            Event::GeneralRef(reference) if capture_depth == Some(depth) => {
                push_reference(&mut text, &reference)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

fn store(fields: &mut ItemFields, field: Field, value: &str) {
    if value.is_empty() {
        return;
    }
    let slot = match field {
        Field::Source => &mut fields.source,
        Field::Published => &mut fields.published,
    };
    // Keep the first occurrence when an item repeats the element
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_reference(text: &mut String, reference: &BytesRef<'_>) -> Result<()> {
    if let Some(ch) = reference.resolve_char_ref()? {
        text.push(ch);
        return Ok(());
    }
    let name = reference.decode()?;
    match resolve_predefined_entity(&name) {
        Some(resolved) => text.push_str(resolved),
        None => {
            text.push('&');
            text.push_str(&name);
            text.push(';');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_source_and_raw_date() {
        let rss = br#"<rss version="2.0"><channel><title>Top stories - Google News</title>
            <item>
              <title>A</title>
              <pubDate>Mon, 06 May 2024 10:00:00 GMT</pubDate>
              <source url="https://www.reuters.com">Reuters</source>
            </item>
            <item><title>B</title><pubDate> 06/05/2024 10h00 </pubDate></item>
            <item><title>C</title><source url="https://x.example.com">AT&amp;T &#8211; Wire</source></item>
        </channel></rss>"#;

        let fields = scan_item_fields(rss).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].source.as_deref(), Some("Reuters"));
        assert_eq!(
            fields[0].published.as_deref(),
            Some("Mon, 06 May 2024 10:00:00 GMT")
        );
        assert_eq!(fields[1].source, None);
        assert_eq!(fields[1].published.as_deref(), Some("06/05/2024 10h00"));
        assert_eq!(fields[2].source.as_deref(), Some("AT&T \u{2013} Wire"));
        assert_eq!(fields[2].published, None);
    }

    #[test]
    fn test_atom_source_title() {
        let atom = br#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Feed</title>
            <entry>
              <title>Vote count</title>
              <published>2024-05-06T10:00:00Z</published>
              <source><id>urn:ap</id><title>AP</title><updated>2024-05-06T09:00:00Z</updated></source>
            </entry>
        </feed>"#;

        let fields = scan_item_fields(atom).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].source.as_deref(), Some("AP"));
        assert_eq!(fields[0].published.as_deref(), Some("2024-05-06T10:00:00Z"));
    }

    #[test]
    fn test_channel_level_elements_are_ignored() {
        let rss = br#"<rss><channel><pubDate>Sun, 05 May 2024</pubDate>
            <item><title>Only</title></item></channel></rss>"#;
        assert_eq!(scan_item_fields(rss).unwrap(), vec![ItemFields::default()]);
    }
}
