use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Anchor tags with a double-quoted href; tolerant of other attributes and
/// arbitrary casing. Capture group 1 is the href value.
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s+(?:[^>]*?\s+)?href\s*=\s*"([^"]*)"[^>]*>"#).unwrap()
});

/// Removes the fragment; the query component is already in canonical
/// percent-encoded form on any parsed [`Url`].
pub fn clean(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Every href in the HTML resolved against `base`, cleaned, in source
/// order. Values that do not form a valid URL are dropped.
pub fn list_links(base: &Url, html: &str) -> Vec<Url> {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|capture| base.join(&capture[1]).ok())
        .map(clean)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/page.html").unwrap()
    }

    #[test]
    fn extracts_links_in_source_order() {
        let html = r#"<a href="https://a.example/">a</a> text <A HREF="https://b.example/">b</A>"#;
        let links = list_links(&base(), html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].as_str(), "https://a.example/");
        assert_eq!(links[1].as_str(), "https://b.example/");
    }

    #[test]
    fn resolves_relative_hrefs_against_the_base() {
        let html = r#"<a href="other.html">x</a><a href="/root.html">y</a>"#;
        let links = list_links(&base(), html);
        assert_eq!(links[0].as_str(), "https://example.com/docs/other.html");
        assert_eq!(links[1].as_str(), "https://example.com/root.html");
    }

    #[test]
    fn strips_fragments() {
        let html = r#"<a href="page.html#section">x</a>"#;
        let links = list_links(&base(), html);
        assert_eq!(links[0].as_str(), "https://example.com/docs/page.html");
    }

    #[test]
    fn keeps_and_encodes_queries() {
        let html = r#"<a href="search?q=a b#frag">x</a>"#;
        let links = list_links(&base(), html);
        assert_eq!(
            links[0].as_str(),
            "https://example.com/docs/search?q=a%20b"
        );
    }

    #[test]
    fn tolerates_extra_attributes_and_spacing() {
        let html = r#"<a class="nav" id="x" href = "next.html" target="_blank">n</a>"#;
        let links = list_links(&base(), html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://example.com/docs/next.html");
    }

    #[test]
    fn ignores_anchors_without_href() {
        let html = r#"<a name="top">t</a><img href="no.png">"#;
        assert!(list_links(&base(), html).is_empty());
    }

    #[test]
    fn clean_leaves_fragmentless_urls_untouched() {
        let url = Url::parse("https://example.com/a?x=1").unwrap();
        assert_eq!(clean(url.clone()), url);
    }
}
