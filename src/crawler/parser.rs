//! HTML content extraction
//!
//! This module turns page content into named fields:
//! - `emails` and `phones`, matched over the document text
//! - `links`, from `<a href>` tags resolved against the page URL
//! - one extra field per configured extraction rule (a CSS selector)
//!
//! Extraction never fails: malformed markup is parsed as well as `scraper`
//! can, and a rule whose selector does not parse is skipped.

use crate::state::{ExtractedData, LINKS_FIELD};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeMap, HashSet};
use url::Url;

pub const EMAILS_FIELD: &str = "emails";
pub const PHONES_FIELD: &str = "phones";

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
const PHONE_PATTERN: &str = r"\+?\d[\d\s().-]{7,}\d";

/// Compiled extraction rules, built once per crawl
#[derive(Debug, Clone)]
pub struct Extractor {
    email: Option<Regex>,
    phone: Option<Regex>,
    anchors: Option<Selector>,
    rules: Vec<(String, Selector)>,
}

impl Extractor {
    /// Compiles the configured rules (field name -> CSS selector)
    pub fn new(rules: &BTreeMap<String, String>) -> Self {
        let rules = rules
            .iter()
            .filter_map(|(field, selector)| match Selector::parse(selector) {
                Ok(compiled) => Some((field.clone(), compiled)),
                Err(e) => {
                    tracing::warn!(
                        "Skipping extraction rule '{}': invalid selector '{}': {:?}",
                        field,
                        selector,
                        e
                    );
                    None
                }
            })
            .collect();

        Self {
            email: Regex::new(EMAIL_PATTERN).ok(),
            phone: Regex::new(PHONE_PATTERN).ok(),
            anchors: Selector::parse("a[href]").ok(),
            rules,
        }
    }

    /// Extracts every field from `content`, resolving links against `base_url`
    ///
    /// Values within a field are deduplicated, keeping the first occurrence.
    pub fn extract(&self, content: &str, base_url: &Url) -> ExtractedData {
        let document = Html::parse_document(content);
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");

        let mut data = ExtractedData::new();

        let mut emails = find_all(self.email.as_ref(), &text);
        emails.extend(self.mailto_addresses(&document));
        data.insert(EMAILS_FIELD.to_string(), emails);

        let phones = find_all(self.phone.as_ref(), &text)
            .into_iter()
            .map(|p| p.trim().to_string())
            .collect();
        data.insert(PHONES_FIELD.to_string(), phones);

        data.insert(LINKS_FIELD.to_string(), self.links(&document, base_url));

        for (field, selector) in &self.rules {
            let values = document
                .select(selector)
                .map(|element| element.text().collect::<String>().trim().to_string())
                .filter(|value| !value.is_empty());
            data.entry(field.clone()).or_default().extend(values);
        }

        for values in data.values_mut() {
            dedup_in_place(values);
        }

        data
    }

    fn links(&self, document: &Html, base_url: &Url) -> Vec<String> {
        let Some(anchors) = &self.anchors else {
            return Vec::new();
        };

        document
            .select(anchors)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, base_url))
            .collect()
    }

    fn mailto_addresses(&self, document: &Html) -> Vec<String> {
        let Some(anchors) = &self.anchors else {
            return Vec::new();
        };

        document
            .select(anchors)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| href.trim().strip_prefix("mailto:"))
            .flat_map(|address| find_all(self.email.as_ref(), address))
            .collect()
    }
}

/// Extracts fields from `content` with a one-off set of rules
pub fn extract(content: &str, base_url: &Url, rules: &BTreeMap<String, String>) -> ExtractedData {
    Extractor::new(rules).extract(content, base_url)
}

fn find_all(pattern: Option<&Regex>, text: &str) -> Vec<String> {
    pattern
        .map(|re| re.find_iter(text).map(|m| m.as_str().to_string()).collect())
        .unwrap_or_default()
}

fn dedup_in_place(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|value| seen.insert(value.clone()));
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);

    Some(absolute.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn extract_default(html: &str) -> ExtractedData {
        extract(html, &base_url(), &BTreeMap::new())
    }

    #[test]
    fn test_builtin_fields_always_present() {
        let data = extract_default("<html><body></body></html>");
        assert!(data[EMAILS_FIELD].is_empty());
        assert!(data[PHONES_FIELD].is_empty());
        assert!(data[LINKS_FIELD].is_empty());
    }

    #[test]
    fn test_extract_emails_deduplicated() {
        let html = r#"<html><body>
            <p>Write to a@x.com or sales@example.org.</p>
            <p>Again: a@x.com</p>
        </body></html>"#;
        let data = extract_default(html);
        assert_eq!(data[EMAILS_FIELD], vec!["a@x.com", "sales@example.org"]);
    }

    #[test]
    fn test_extract_mailto_address() {
        let html = r#"<a href="mailto:hello@example.com">Write us</a>"#;
        let data = extract_default(html);
        assert_eq!(data[EMAILS_FIELD], vec!["hello@example.com"]);
        assert!(data[LINKS_FIELD].is_empty());
    }

    #[test]
    fn test_extract_phones() {
        let html = r#"<html><body><p>Call +1 (555) 010-9999 today</p></body></html>"#;
        let data = extract_default(html);
        assert_eq!(data[PHONES_FIELD], vec!["+1 (555) 010-9999"]);
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let data = extract_default(html);
        assert_eq!(data[LINKS_FIELD], vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a><a href="sibling">Link</a></body></html>"#;
        let data = extract_default(html);
        assert_eq!(
            data[LINKS_FIELD],
            vec!["https://example.com/other", "https://example.com/sibling"]
        );
    }

    #[test]
    fn test_links_keep_document_order_and_dedup() {
        let html = r#"
            <a href="/b">B</a>
            <a href="/a">A</a>
            <a href="/b#top">B again</a>
        "#;
        let data = extract_default(html);
        assert_eq!(
            data[LINKS_FIELD],
            vec!["https://example.com/b", "https://example.com/a"]
        );
    }

    #[test]
    fn test_skip_non_navigable_links() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">js</a>
            <a href="JavaScript:alert(1)">js</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="#section">Jump</a>
            <a href="ftp://files.example.com/x">ftp</a>
            <a href="   ">blank</a>
            <a href="/valid">Valid</a>
        </body></html>"##;
        let data = extract_default(html);
        assert_eq!(data[LINKS_FIELD], vec!["https://example.com/valid"]);
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let html = r#"<html><body><div><a href="/x">unclosed <p>text a@x.com <<>> </a"#;
        let data = extract_default(html);
        assert_eq!(data[LINKS_FIELD], vec!["https://example.com/x"]);
        assert_eq!(data[EMAILS_FIELD], vec!["a@x.com"]);
    }

    #[test]
    fn test_custom_rule_field() {
        let mut rules = BTreeMap::new();
        rules.insert("headlines".to_string(), "h1, h2".to_string());

        let html = "<h1> First </h1><h2>Second</h2><h2>Second</h2><h3>skip</h3>";
        let data = extract(html, &base_url(), &rules);
        assert_eq!(data["headlines"], vec!["First", "Second"]);
    }

    #[test]
    fn test_invalid_rule_is_skipped() {
        let mut rules = BTreeMap::new();
        rules.insert("broken".to_string(), "div[[[".to_string());

        let data = extract("<div>hi</div>", &base_url(), &rules);
        assert!(!data.contains_key("broken"));
        assert!(data.contains_key(LINKS_FIELD));
    }

    #[test]
    fn test_rule_named_links_merges_into_links() {
        let mut rules = BTreeMap::new();
        rules.insert(LINKS_FIELD.to_string(), "span.url".to_string());

        let html = r#"<a href="/a">A</a><span class="url">https://example.com/from-text</span>"#;
        let data = extract(html, &base_url(), &rules);
        assert_eq!(
            data[LINKS_FIELD],
            vec!["https://example.com/a", "https://example.com/from-text"]
        );
    }
}
