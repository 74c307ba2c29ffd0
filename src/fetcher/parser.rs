//! Turns raw feed documents into attribute-bag [`Feed`]s.
//!
//! XML feeds (RSS 0.9x/2.0, RSS 1.0/RDF, Atom) are walked element by element
//! so that namespaced extensions survive as their own attributes: an
//! `<dc:creator>` becomes `dc_creator`, a `<prism:doi>` becomes `prism_doi`.
//! JSON Feed documents, and anything the XML walker rejects, go through
//! `feed-rs` and are mapped onto the same attribute names.
//!
//! Bodies are decoded with the charset named in the XML declaration before
//! the walk, so Latin-1 and windows-1252 feeds keep their accented text.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use feed_rs::parser;
use html_escape::decode_html_entities;
use roxmltree::{Document, Node, ParsingOptions};

use crate::app::{PaperfeedError, Result};
use crate::domain::{Entry, Feed, Value};

const RSS1_NS: &str = "http://purl.org/rss/1.0/";
const RSS_USERLAND_NS: &str = "http://backend.userland.com/rss2";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const ATOM03_NS: &str = "http://purl.org/atom/ns#";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Canonical prefixes for common extension namespaces, so attribute names do
/// not depend on the prefix a publisher happened to declare.
const KNOWN_PREFIXES: &[(&str, &str)] = &[
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("http://purl.org/dc/terms/", "dcterms"),
    (CONTENT_NS, "content"),
    ("http://prismstandard.org/namespaces/basic/2.0/", "prism"),
    ("http://prismstandard.org/namespaces/1.2/basic/", "prism"),
    ("http://search.yahoo.com/mrss/", "media"),
    ("http://arxiv.org/schemas/atom", "arxiv"),
    (ATOM_NS, "atom"),
    ("http://www.itunes.com/dtds/podcast-1.0.dtd", "itunes"),
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Rss,
    Atom,
}

/// Parse a feed document of any supported format.
pub fn parse_feed(body: &[u8]) -> Result<Feed> {
    let text = decode_body(body);
    let text = text.trim_start_matches('\u{feff}').trim_start();

    if text.starts_with('{') {
        return parse_with_feed_rs(body);
    }

    match parse_xml(text) {
        Ok(feed) => Ok(feed),
        Err(reason) => {
            tracing::debug!("XML walk failed ({}), retrying with feed-rs", reason);
            parse_with_feed_rs(body)
        }
    }
}

/// Decode `body` using its declared XML encoding (UTF-8 when undeclared or
/// unknown). A byte order mark overrides the declaration.
///
/// The declaration is dropped from transcoded text, since it no longer
/// describes the string handed to the XML parser.
fn decode_body(body: &[u8]) -> Cow<'_, str> {
    let declared = declared_encoding(body)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        // A UTF-16 declaration without a BOM is read as UTF-8.
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = declared.decode(body);
    if had_errors {
        tracing::debug!("Feed body is not valid {}, invalid bytes replaced", used.name());
    }
    if used == UTF_8 {
        return text;
    }

    tracing::debug!("Decoded feed body as {}", used.name());
    if let Some(rest) = strip_declaration(&text) {
        return Cow::Owned(rest.to_string());
    }
    text
}

/// The `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(body: &[u8]) -> Option<&str> {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let end = body.windows(2).take(512).position(|w| w == b"?>")?;
    let prolog = std::str::from_utf8(&body[..end]).ok()?;
    let decl = prolog.trim_start().strip_prefix("<?xml")?;

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    value.find(quote).map(|close| &value[..close])
}

fn strip_declaration(text: &str) -> Option<&str> {
    let rest = text.trim_start_matches('\u{feff}').trim_start();
    if !rest.starts_with("<?xml") {
        return None;
    }
    rest.find("?>").map(|end| &rest[end + 2..])
}

fn parse_xml(text: &str) -> std::result::Result<Feed, String> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options).map_err(|e| e.to_string())?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "rss" => {
            let channel = child_element(root, "channel").ok_or("RSS document has no channel")?;
            Ok(Feed {
                title: child_text(channel, "title"),
                entries: elements_named(channel, "item")
                    .map(|item| item_to_entry(text, item, Dialect::Rss))
                    .collect(),
            })
        }
        "RDF" => {
            // RSS 1.0 keeps items beside the channel rather than inside it.
            let title = child_element(root, "channel").and_then(|c| child_text(c, "title"));
            Ok(Feed {
                title,
                entries: elements_named(root, "item")
                    .map(|item| item_to_entry(text, item, Dialect::Rss))
                    .collect(),
            })
        }
        "feed" => Ok(Feed {
            title: child_text(root, "title"),
            entries: elements_named(root, "entry")
                .map(|entry| item_to_entry(text, entry, Dialect::Atom))
                .collect(),
        }),
        other => Err(format!("unrecognized root element <{}>", other)),
    }
}

fn parse_with_feed_rs(body: &[u8]) -> Result<Feed> {
    let feed = parser::parse(body).map_err(|e| PaperfeedError::FeedParse(e.to_string()))?;

    Ok(Feed {
        title: feed.title.map(|t| decode_html_entities(&t.content).to_string()),
        entries: feed.entries.into_iter().map(entry_from_model).collect(),
    })
}

fn entry_from_model(entry: feed_rs::model::Entry) -> Entry {
    let mut bag = Entry::new();

    if !entry.id.is_empty() {
        bag.set_text("id", entry.id);
    }
    if let Some(title) = entry.title {
        bag.set_text("title", decode_html_entities(&title.content).to_string());
    }
    if let Some(link) = entry.links.first() {
        bag.set_text("link", link.href.clone());
    }
    if let Some(summary) = entry.summary {
        bag.set_text("summary", decode_html_entities(&summary.content).to_string());
    }
    if let Some(body) = entry.content.and_then(|c| c.body) {
        bag.push_item("content", Entry::new().with("value", body));
    }
    if let Some(published) = entry.published {
        bag.set_text("published", published.to_rfc3339());
    }
    if let Some(updated) = entry.updated {
        bag.set_text("updated", updated.to_rfc3339());
    }
    for author in &entry.authors {
        let mut person = Entry::new().with("name", author.name.clone());
        if let Some(email) = &author.email {
            person.set_text("email", email.clone());
        }
        if let Some(uri) = &author.uri {
            person.set_text("href", uri.clone());
        }
        bag.set_text_if_absent("author", author.name.clone());
        bag.push_item("authors", person);
    }
    for category in &entry.categories {
        bag.push_item("tags", Entry::new().with("term", category.term.clone()));
    }

    bag
}

fn item_to_entry(source: &str, item: Node<'_, '_>, dialect: Dialect) -> Entry {
    let mut entry = Entry::new();

    for child in item.children().filter(Node::is_element) {
        let local = child.tag_name().name();

        if !is_native(child, dialect) {
            let Some(ns) = child.tag_name().namespace() else {
                continue;
            };
            if ns == CONTENT_NS && local == "encoded" {
                entry.push_item(
                    "content",
                    Entry::new().with("value", text_content(child)).with("type", "text/html"),
                );
            } else {
                append_text(&mut entry, &format!("{}_{}", prefix_for(child, ns), local), text_content(child));
            }
            continue;
        }

        match (dialect, local) {
            (Dialect::Rss, "description") => entry.set_text("summary", text_content(child)),
            (Dialect::Rss, "pubDate") => entry.set_text("published", text_content(child)),
            (Dialect::Rss, "guid") => entry.set_text("id", text_content(child)),
            (Dialect::Rss, "link") => entry.set_text_if_absent("link", text_content(child)),
            (Dialect::Rss, "category") | (Dialect::Atom, "category") => {
                let term = child
                    .attribute("term")
                    .map(str::to_string)
                    .unwrap_or_else(|| text_content(child));
                entry.push_item("tags", Entry::new().with("term", term));
            }
            (Dialect::Rss, "enclosure") => {
                let mut enclosure = Entry::new();
                for (attr, key) in [("url", "href"), ("type", "type"), ("length", "length")] {
                    if let Some(value) = child.attribute(attr) {
                        enclosure.set_text(key, value);
                    }
                }
                entry.push_item("enclosures", enclosure);
            }
            (Dialect::Atom, "link") => {
                let rel = child.attribute("rel").unwrap_or("alternate");
                if let Some(href) = child.attribute("href") {
                    if rel == "alternate" {
                        entry.set_text_if_absent("link", href);
                    }
                    entry.push_item("links", Entry::new().with("href", href).with("rel", rel));
                }
            }
            (Dialect::Atom, "author") => {
                let mut person = Entry::new();
                for (tag, key) in [("name", "name"), ("email", "email"), ("uri", "href")] {
                    if let Some(value) = child_text(child, tag) {
                        person.set_text(key, value);
                    }
                }
                if let Some(name) = person.text("name") {
                    entry.set_text_if_absent("author", name);
                }
                entry.push_item("authors", person);
            }
            (Dialect::Atom, "content") => {
                let kind = child.attribute("type").unwrap_or("text");
                let value = if kind == "xhtml" {
                    inner_markup(source, child)
                } else {
                    text_content(child)
                };
                entry.push_item("content", Entry::new().with("value", value).with("type", kind));
            }
            (Dialect::Atom, "issued") => entry.set_text_if_absent("published", text_content(child)),
            (Dialect::Atom, "modified") => entry.set_text_if_absent("updated", text_content(child)),
            _ => append_text(&mut entry, local, text_content(child)),
        }
    }

    entry
}

fn is_native(node: Node<'_, '_>, dialect: Dialect) -> bool {
    match node.tag_name().namespace() {
        None => true,
        Some(ns) => match dialect {
            Dialect::Rss => ns == RSS1_NS || ns == RSS_USERLAND_NS,
            Dialect::Atom => ns == ATOM_NS || ns == ATOM03_NS,
        },
    }
}

fn prefix_for<'a>(node: Node<'a, '_>, ns: &str) -> &'a str {
    KNOWN_PREFIXES
        .iter()
        .find(|(uri, _)| *uri == ns)
        .map(|(_, prefix)| *prefix)
        .or_else(|| node.lookup_prefix(ns))
        .unwrap_or("ns")
}

// Repeated text elements (several <dc:creator>, say) are joined.
fn append_text(entry: &mut Entry, key: &str, value: String) {
    if value.is_empty() && entry.has(key) {
        return;
    }
    match entry.get(key) {
        Some(Value::Text(existing)) if !existing.is_empty() && !value.is_empty() => {
            let joined = format!("{}, {}", existing, value);
            entry.set_text(key, joined);
        }
        _ => entry.set_text(key, value),
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn elements_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .map(text_content)
        .filter(|s| !s.is_empty())
}

fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn inner_markup(source: &str, node: Node<'_, '_>) -> String {
    node.children()
        .filter_map(|child| source.get(child.range()))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"
     xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:prism="http://prismstandard.org/namespaces/basic/2.0/">
  <channel>
    <title>Public Administration</title>
    <item>
      <title>Governance &amp; Trust</title>
      <link>https://onlinelibrary.wiley.com/doi/10.1111/padm.1</link>
      <description>Short summary</description>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <dc:creator>Jane Doe</dc:creator>
      <dc:creator>John Roe</dc:creator>
      <dc:identifier>doi:10.1111/padm.1</dc:identifier>
      <prism:doi>10.1111/padm.1</prism:doi>
      <content:encoded><![CDATA[<p>First paragraph.</p><p>Second.</p>]]></content:encoded>
      <category>Policy</category>
    </item>
    <item>
      <title>Second</title>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title>arXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <title>A Paper</title>
    <published>2024-01-01T00:00:00Z</published>
    <updated>2024-01-02T00:00:00Z</updated>
    <summary>We study things.</summary>
    <author><name>Alice Smith</name></author>
    <author><name>Bob Lee</name></author>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.00001v1" rel="related"/>
    <arxiv:primary_category term="cs.AI"/>
    <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p>Body</p></div></content>
  </entry>
</feed>"#;

    const RDF_SAMPLE: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns="http://purl.org/rss/1.0/"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel rdf:about="http://example.org/">
    <title>RDF Channel</title>
  </channel>
  <item rdf:about="http://example.org/1">
    <title>RDF Item</title>
    <link>http://example.org/1</link>
    <dc:date>2024-01-01</dc:date>
  </item>
</rdf:RDF>"#;

    const JSON_SAMPLE: &str = r#"{
  "version": "https://jsonfeed.org/version/1",
  "title": "JSON Feed",
  "items": [
    {
      "id": "1",
      "title": "JSON Item",
      "url": "https://example.com/1",
      "content_text": "Body text",
      "author": { "name": "Carol" }
    }
  ]
}"#;

    #[test]
    fn test_parse_rss_with_extensions() {
        let feed = parse_feed(RSS_SAMPLE.as_bytes()).unwrap();

        assert_eq!(feed.title.as_deref(), Some("Public Administration"));
        assert_eq!(feed.entries.len(), 2);

        let entry = &feed.entries[0];
        assert_eq!(entry.text("title"), Some("Governance & Trust"));
        assert_eq!(entry.text("summary"), Some("Short summary"));
        assert_eq!(entry.text("published"), Some("Mon, 01 Jan 2024 00:00:00 GMT"));
        assert_eq!(entry.text("dc_creator"), Some("Jane Doe, John Roe"));
        assert_eq!(entry.text("dc_identifier"), Some("doi:10.1111/padm.1"));
        assert_eq!(entry.text("prism_doi"), Some("10.1111/padm.1"));
        assert!(!entry.has("author"));
        assert!(!entry.has("description"));

        let content = entry.list("content").unwrap();
        assert_eq!(content[0].text("value"), Some("<p>First paragraph.</p><p>Second.</p>"));
        assert_eq!(entry.text_or("tags", ""), "Policy");

        assert!(!feed.entries[1].has("link"));
    }

    #[test]
    fn test_parse_atom_authors_and_links() {
        let feed = parse_feed(ATOM_SAMPLE.as_bytes()).unwrap();
        let entry = &feed.entries[0];

        assert_eq!(feed.title.as_deref(), Some("arXiv Query"));
        assert_eq!(entry.text("link"), Some("http://arxiv.org/abs/2401.00001v1"));
        assert_eq!(entry.text("author"), Some("Alice Smith"));
        assert_eq!(entry.text_or("authors", ""), "Alice Smith, Bob Lee");
        assert_eq!(entry.text("published"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(entry.list("links").map(|l| l.len()), Some(2));
        assert!(entry.has("arxiv_primary_category"));

        let content = entry.list("content").unwrap();
        assert_eq!(content[0].text("type"), Some("xhtml"));
        assert!(content[0].text("value").unwrap().contains("<p>Body</p>"));
    }

    #[test]
    fn test_parse_rss1_rdf() {
        let feed = parse_feed(RDF_SAMPLE.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("RDF Channel"));
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].text("title"), Some("RDF Item"));
        assert_eq!(feed.entries[0].text("dc_date"), Some("2024-01-01"));
    }

    #[test]
    fn test_parse_json_feed() {
        let feed = parse_feed(JSON_SAMPLE.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("JSON Feed"));
        let entry = &feed.entries[0];
        assert_eq!(entry.text("title"), Some("JSON Item"));
        assert_eq!(entry.text("link"), Some("https://example.com/1"));
        assert_eq!(entry.text("author"), Some("Carol"));
    }

    #[test]
    fn test_parse_latin1_declared_encoding() {
        let body = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<rss version=\"2.0\"><channel>\
<title>Revue</title><item><title>Caf\xE9 na\xEFve</title>\
<link>https://example.org/1</link></item></channel></rss>";

        let feed = parse_feed(body).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Revue"));
        assert_eq!(feed.entries[0].text("title"), Some("Caf\u{e9} na\u{ef}ve"));
        assert_eq!(feed.entries[0].text("link"), Some("https://example.org/1"));
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding='windows-1252'?><rss/>"),
            Some("windows-1252")
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><rss/>"), None);
        assert_eq!(declared_encoding(b"{\"version\": 1}"), None);
    }

    #[test]
    fn test_utf8_declaration_is_kept() {
        let body = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss><channel><item><title>na\u{ef}ve</title></item></channel></rss>";
        assert!(decode_body(body.as_bytes()).starts_with("<?xml"));
        let feed = parse_feed(body.as_bytes()).unwrap();
        assert_eq!(feed.entries[0].text("title"), Some("na\u{ef}ve"));
    }

    #[test]
    fn test_parse_garbage_is_error() {
        let result = parse_feed(b"this is not a feed");
        assert!(matches!(result, Err(PaperfeedError::FeedParse(_))));
    }

    #[test]
    fn test_parse_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert!(feed.is_empty());
    }
}
