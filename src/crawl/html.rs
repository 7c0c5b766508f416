use std::sync::LazyLock;

use regex::Regex;

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Elements whose content never contributes indexable text.
static OPAQUE_ELEMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["head", "style", "script", "noscript", "svg"]
        .iter()
        .map(|name| Regex::new(&format!(r"(?is)<{name}\b.*?</{name}\s*>")).unwrap())
        .collect()
});

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static ENTITIES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&\S+?;").unwrap());

/// Reduces HTML to its visible text: comments, non-content elements, tags
/// and entity references all become single spaces so token boundaries are
/// preserved.
pub fn strip_html(html: &str) -> String {
    let mut text = COMMENTS.replace_all(html, " ").into_owned();
    for element in OPAQUE_ELEMENTS.iter() {
        text = element.replace_all(&text, " ").into_owned();
    }
    let text = TAGS.replace_all(&text, " ");
    ENTITIES.replace_all(&text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_but_keeps_text() {
        let text = strip_html("<html><body><p>hello <b>world</b></p></body></html>");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["hello", "world"]);
    }

    #[test]
    fn drops_script_and_style_content() {
        let html = "<style>p { color: red }</style><script>var hidden = 1;</script>visible";
        let text = strip_html(html);
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
        assert!(text.contains("visible"));
    }

    #[test]
    fn drops_head_and_comments() {
        let html = "<head><title>secret</title></head><!-- note --><body>shown</body>";
        let text = strip_html(html);
        assert!(!text.contains("secret"));
        assert!(!text.contains("note"));
        assert!(text.contains("shown"));
    }

    #[test]
    fn entities_become_boundaries() {
        let text = strip_html("fish&nbsp;chips &amp; peas");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["fish", "chips", "peas"]);
    }

    #[test]
    fn case_insensitive_element_matching() {
        let text = strip_html("<SCRIPT>var x;</SCRIPT>kept");
        assert!(!text.contains("var"));
        assert!(text.contains("kept"));
    }

    #[test]
    fn multiline_elements_are_stripped() {
        let html = "<script>\nline one\nline two\n</script>after";
        let text = strip_html(html);
        assert!(!text.contains("line"));
        assert!(text.contains("after"));
    }
}
