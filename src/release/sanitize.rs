//! Allow-list filtering for release notes shown in the admin "more info" view
//!
//! Release bodies are usually markdown, which passes through untouched. Any
//! embedded HTML is reduced to a small post-content subset.

use log::error;
use once_cell::sync::Lazy;
use regex::Regex;

/// Elements removed together with everything inside them.
const DROPPED_BLOCKS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "noscript", "template",
];

/// Compiled filter patterns. `None` when any of them fails to build, in which
/// case notes are escaped wholesale instead of filtered.
static FILTERS: Lazy<Option<Filters>> = Lazy::new(Filters::compile);

struct Filters {
    blocks: Vec<Regex>,
    comment: Regex,
    tag: Regex,
    attribute: Regex,
}

impl Filters {
    fn compile() -> Option<Self> {
        match Self::build() {
            Ok(filters) => Some(filters),
            Err(e) => {
                error!("Release notes filter failed to compile, notes will be escaped: {}", e);
                None
            }
        }
    }

    fn build() -> Result<Self, regex::Error> {
        let blocks = DROPPED_BLOCKS
            .iter()
            .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            blocks,
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            tag: Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)\b([^>]*?)(/?)>")?,
            attribute: Regex::new(
                r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)"#,
            )?,
        })
    }
}

const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "code", "del", "details", "div", "em", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li", "ol", "p", "pre", "s",
    "span", "strong", "sub", "summary", "sup", "table", "tbody", "td", "th", "thead", "tr",
    "u", "ul",
];

const ALLOWED_ATTRIBUTES: &[&str] = &["href", "title", "src", "alt", "width", "height", "class", "rel", "target"];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Reduce `html` to the allow-listed subset.
pub fn sanitize_notes(html: &str) -> String {
    match FILTERS.as_ref() {
        Some(filters) => filters.apply(html),
        None => escape_text(html),
    }
}

impl Filters {
    fn apply(&self, html: &str) -> String {
        let mut out = html.to_string();
        for block in &self.blocks {
            out = block.replace_all(&out, "").into_owned();
        }
        out = self.comment.replace_all(&out, "").into_owned();

        self.tag
            .replace_all(&out, |caps: &regex::Captures<'_>| {
                let closing = &caps[1];
                let name = caps[2].to_ascii_lowercase();
                if !ALLOWED_TAGS.contains(&name.as_str()) {
                    return String::new();
                }
                if !closing.is_empty() {
                    return format!("</{name}>");
                }
                let self_closing = if caps[4].is_empty() { "" } else { " /" };
                format!("<{name}{}{self_closing}>", self.filter_attributes(&caps[3]))
            })
            .into_owned()
    }

    fn filter_attributes(&self, raw: &str) -> String {
        let mut kept = String::new();
        for caps in self.attribute.captures_iter(raw) {
            let name = caps[1].to_ascii_lowercase();
            if !ALLOWED_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            let value = caps[2].trim_matches(|c| c == '"' || c == '\'');
            if URL_ATTRIBUTES.contains(&name.as_str()) && !is_safe_url(value) {
                continue;
            }
            kept.push_str(&format!(" {}=\"{}\"", name, value.replace('"', "&quot;")));
        }
        kept
    }
}

/// Render `text` inert: every markup character becomes an entity.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_safe_url(value: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    // Browsers decode entities before reading the scheme; any entity ahead of
    // the first ':', '/' or '?' could spell one, so such values are rejected
    let head = compact
        .find([':', '/', '?'])
        .map_or(compact.as_str(), |idx| &compact[..idx]);
    if head.contains('&') {
        return false;
    }

    match compact.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            ALLOWED_SCHEMES.contains(&scheme)
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_passes_through() {
        let notes = "## 1.6.2\n\n- Fix login logo sizing\n- `target=\"_blank\"` for external links";
        assert_eq!(sanitize_notes(notes), notes);
    }

    #[test]
    fn test_drops_script_and_style_blocks() {
        let notes = "<p>Hi</p><script>alert(1)</script><STYLE type=\"text/css\">a{}</STYLE>done";
        assert_eq!(sanitize_notes(notes), "<p>Hi</p>done");
    }

    #[test]
    fn test_unknown_tags_keep_text() {
        assert_eq!(sanitize_notes("<marquee>wow</marquee>"), "wow");
        assert_eq!(sanitize_notes("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn test_filters_attributes() {
        assert_eq!(
            sanitize_notes(r#"<a href="https://example.com" onclick="steal()">x</a>"#),
            r#"<a href="https://example.com">x</a>"#
        );
        assert_eq!(
            sanitize_notes(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_notes(r#"<a href="java	script:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_notes(r#"<img src='/logo.svg' alt=logo onerror="x()"/>"#),
            r#"<img src="/logo.svg" alt="logo" />"#
        );
        assert_eq!(
            sanitize_notes(r#"<a href="mailto:ops@hutchx.com" class="mail">mail</a>"#),
            r#"<a href="mailto:ops@hutchx.com" class="mail">mail</a>"#
        );
    }

    #[test]
    fn test_entity_encoded_schemes_are_dropped() {
        for href in [
            "&#106;avascript:alert(1)",
            "&#x6A;avascript:alert(1)",
            "javascript&colon;alert(1)",
            "java&#9;script:alert(1)",
            "&#0000106;avascript:alert(1)",
        ] {
            let html = format!(r#"<a href="{href}">x</a>"#);
            assert_eq!(sanitize_notes(&html), "<a>x</a>", "{href}");
        }

        assert_eq!(
            sanitize_notes(r#"<a href="https://example.com/?a=1&amp;b=2">x</a>"#),
            r#"<a href="https://example.com/?a=1&amp;b=2">x</a>"#
        );
        assert_eq!(
            sanitize_notes(r#"<a href="changelog?from=1.6&amp;to=1.7">x</a>"#),
            r#"<a href="changelog?from=1.6&amp;to=1.7">x</a>"#
        );
    }

    #[test]
    fn test_escape_text_leaves_no_markup() {
        assert_eq!(
            escape_text(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_filters_compile() {
        assert!(FILTERS.is_some());
    }
}
