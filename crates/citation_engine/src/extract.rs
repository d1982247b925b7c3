//! Citation metadata from an HTML page.
//!
//! Structured data wins: the first JSON-LD block is searched for a headline,
//! author names and a publication date. `<meta name="author">` and the
//! document `<title>` fill whatever JSON-LD left blank.

use citation_core::PartialRecord;
use citation_logging::cite_debug;
use scraper::{Html, Selector};
use serde_json::Value;

/// Title served by the common bot-check interstitial; never a real title.
const CHALLENGE_TITLE: &str = "Just a moment...";

/// `@type`s whose `name` is not the title of the page.
const NON_DOCUMENT_TYPES: &[&str] = &[
    "WebSite",
    "Organization",
    "Person",
    "ImageObject",
    "BreadcrumbList",
    "SiteNavigationElement",
];

pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, html: &str) -> PartialRecord;
}

#[derive(Debug, Default)]
pub struct HtmlMetadataExtractor;

impl MetadataExtractor for HtmlMetadataExtractor {
    fn extract(&self, html: &str) -> PartialRecord {
        let doc = Html::parse_document(html);
        let mut found = json_ld_block(&doc)
            .map(|value| json_ld_fields(&value))
            .unwrap_or_default();

        if found.author.is_none() {
            found.author = meta_content(&doc, "author");
        }
        if found.title.is_none() {
            found.title = document_title(&doc);
        }
        found.normalized()
    }
}

fn json_ld_block(doc: &Html) -> Option<Value> {
    let sel = Selector::parse(r#"script[type*="ld+json"]"#).ok()?;
    let raw: String = doc.select(&sel).next()?.text().collect();
    match serde_json::from_str(raw.trim()) {
        Ok(value) => Some(value),
        Err(err) => {
            cite_debug!("ignoring malformed JSON-LD block: {}", err);
            None
        }
    }
}

/// Pulls title, author and year out of a parsed JSON-LD document.
pub fn json_ld_fields(value: &Value) -> PartialRecord {
    let nodes = json_ld_nodes(value);

    let title = nodes
        .iter()
        .find_map(|node| string_field(node, "headline"))
        .or_else(|| {
            nodes
                .iter()
                .filter(|node| !NON_DOCUMENT_TYPES.iter().any(|t| has_type(node, t)))
                .find_map(|node| string_field(node, "name"))
        });

    let author = nodes
        .iter()
        .find_map(|node| node.get("author").and_then(author_names))
        .or_else(|| {
            // A site name is the usual corporate author for unsigned pages.
            nodes
                .iter()
                .filter(|node| has_type(node, "WebSite"))
                .find_map(|node| string_field(node, "name"))
        });

    let year = nodes
        .iter()
        .find_map(|node| string_field(node, "datePublished").and_then(|d| leading_year(&d)))
        .or_else(|| {
            nodes
                .iter()
                .find_map(|node| string_field(node, "dateModified").and_then(|d| leading_year(&d)))
        });

    PartialRecord {
        author,
        title,
        year,
    }
}

/// The objects worth inspecting: the document itself, the members of a
/// top-level array, and the members of any `@graph`.
fn json_ld_nodes(value: &Value) -> Vec<&Value> {
    let roots: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut nodes = Vec::new();
    for root in roots.into_iter().filter(|v| v.is_object()) {
        nodes.push(root);
        if let Some(Value::Array(graph)) = root.get("@graph") {
            nodes.extend(graph.iter().filter(|v| v.is_object()));
        }
    }
    nodes
}

fn has_type(node: &Value, wanted: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

fn string_field(node: &Value, field: &str) -> Option<String> {
    node.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `"Name"`, `{"name": "Name"}` or an array of either. Several authors are
/// joined the way BibTeX expects.
fn author_names(author: &Value) -> Option<String> {
    let single = |v: &Value| -> Option<String> {
        let name = match v {
            Value::String(name) => Some(name.trim().to_string()),
            Value::Object(_) => string_field(v, "name"),
            _ => None,
        };
        name.filter(|name| !name.is_empty())
    };

    let names: Vec<String> = match author {
        Value::Array(items) => items.iter().filter_map(single).collect(),
        other => single(other).into_iter().collect(),
    };
    (!names.is_empty()).then(|| names.join(" and "))
}

fn leading_year(date: &str) -> Option<u32> {
    let digits = date.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|year| *year > 0)
}

fn meta_content(doc: &Html, name: &str) -> Option<String> {
    let sel = Selector::parse(&format!(r#"meta[name="{name}"]"#)).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn document_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    let title = doc
        .select(&sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())?;
    if title == CHALLENGE_TITLE {
        cite_debug!("page served a bot-check interstitial");
        return None;
    }
    Some(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leading_year_requires_four_digits() {
        assert_eq!(leading_year("2021-04-01T10:00:00Z"), Some(2021));
        assert_eq!(leading_year("0000-01-01"), None);
        assert_eq!(leading_year("21-04"), None);
        assert_eq!(leading_year("April 2021"), None);
    }

    #[test]
    fn author_array_is_joined() {
        let author = json!([{"name": "Ada Lovelace"}, "Charles Babbage", {"url": "x"}]);
        assert_eq!(
            author_names(&author).as_deref(),
            Some("Ada Lovelace and Charles Babbage")
        );
    }

    #[test]
    fn graph_nodes_are_searched() {
        let doc = json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebSite", "name": "Example News"},
                {"@type": "WebPage", "name": "Page Name", "dateModified": "2020-02-02"}
            ]
        });
        let fields = json_ld_fields(&doc);
        assert_eq!(fields.title.as_deref(), Some("Page Name"));
        assert_eq!(fields.author.as_deref(), Some("Example News"));
        assert_eq!(fields.year, Some(2020));
    }

    #[test]
    fn headline_beats_name_and_published_beats_modified() {
        let doc = json!({
            "@type": "NewsArticle",
            "name": "Short",
            "headline": "Full Headline",
            "author": {"name": "Jane Doe"},
            "datePublished": "2019-05-01",
            "dateModified": "2023-01-01"
        });
        let fields = json_ld_fields(&doc);
        assert_eq!(fields.title.as_deref(), Some("Full Headline"));
        assert_eq!(fields.author.as_deref(), Some("Jane Doe"));
        assert_eq!(fields.year, Some(2019));
    }
}
