//! HTML sanitizing and text rendering for book content.
//!
//! Book pages and descriptions arrive as HTML fragments from a remote catalog.
//! Nothing from the catalog may be displayed until it has passed through
//! [`sanitize`], which is the only way to obtain a [`SafeHtml`] value.
//!
//! The sanitizer parses fragments with `scraper` (html5ever) and re-serializes
//! an allow-listed subset:
//!
//! - Formatting, structural, list, table, link and image elements are kept
//! - Executable or embedding elements (`script`, `style`, `iframe`, `object`,
//!   `svg`, form controls, ...) are removed together with their content
//! - Any other element is unwrapped, keeping its children
//! - Attributes are allow-listed per element; event handlers and `style` never survive
//! - `href`/`src` values must be relative or use `http`, `https` or `mailto`
//!
//! # Examples
//!
//! ```rust
//! use folio::net::html;
//!
//! let safe = html::sanitize(r#"<p onclick="steal()">Hello <b>reader</b></p><script>alert(1)</script>"#);
//! assert_eq!(safe.as_str(), "<p>Hello <b>reader</b></p>");
//!
//! let lines = html::to_text(&safe);
//! assert_eq!(lines, vec!["Hello reader".to_string()]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, node::Node};
use std::fmt;
use url::Url;

/// Elements that survive sanitizing.
const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del", "dfn", "div",
    "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i",
    "img", "ins", "kbd", "li", "mark", "ol", "p", "pre", "q", "s", "samp", "small", "span",
    "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u", "ul",
    "var",
];

/// Elements removed together with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &[
    "applet", "audio", "base", "button", "canvas", "embed", "form", "frame", "frameset", "head",
    "iframe", "input", "link", "math", "meta", "noembed", "noscript", "object", "option",
    "param", "script", "select", "source", "style", "svg", "template", "textarea", "title",
    "track", "video",
];

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

const GLOBAL_ATTRIBUTES: &[&str] = &["title", "lang", "dir"];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

const LINK_REL: &str = "noopener noreferrer";

const BLOCK_ELEMENTS: &[&str] = &[
    "blockquote", "caption", "dd", "div", "dl", "dt", "figcaption", "figure", "h1", "h2", "h3",
    "h4", "h5", "h6", "ol", "p", "pre", "table", "tr", "ul",
];

static INLINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// HTML that has passed through [`sanitize`].
///
/// There is no public constructor: holding a `SafeHtml` means the markup was
/// sanitized in this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sanitizes an HTML fragment.
///
/// # Parameters
///
/// * `html` - Untrusted HTML fragment
///
/// # Returns
///
/// The fragment re-serialized with only allow-listed markup.
///
/// # Examples
///
/// ```rust
/// use folio::net::html;
///
/// let safe = html::sanitize(r#"<a href="javascript:alert(1)">x</a><img src="p.png" onerror="x()">"#);
/// assert_eq!(safe.as_str(), r#"<a rel="noopener noreferrer">x</a><img src="p.png">"#);
/// ```
pub fn sanitize(html: &str) -> SafeHtml {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_children(fragment.root_element(), &mut out);
    SafeHtml(out)
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_escaped_text(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    if DROPPED_ELEMENTS.contains(&name) {
        return;
    }
    if !ALLOWED_ELEMENTS.contains(&name) {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.value().attrs() {
        if !is_allowed_attribute(name, attr) {
            continue;
        }
        if URL_ATTRIBUTES.contains(&attr) && !is_safe_url(value) {
            continue;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        push_escaped_attr(out, value);
        out.push('"');
    }
    if name == "a" {
        out.push_str(" rel=\"");
        out.push_str(LINK_REL);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn is_allowed_attribute(element: &str, attr: &str) -> bool {
    if GLOBAL_ATTRIBUTES.contains(&attr) {
        return true;
    }
    match element {
        "a" => attr == "href",
        "img" => matches!(attr, "src" | "alt" | "width" | "height"),
        "td" | "th" => matches!(attr, "colspan" | "rowspan"),
        "ol" => attr == "start",
        _ => false,
    }
}

/// Accepts relative URLs and absolute ones with a safe scheme.
///
/// The `url` crate strips the tabs, newlines and leading spaces browsers
/// ignore, so `"java\tscript:"` is seen as the `javascript` scheme.
fn is_safe_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => SAFE_SCHEMES.contains(&url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Renders sanitized HTML as plain text lines for terminal display.
///
/// Block elements start new lines, paragraphs are separated by one blank
/// line, list items are bulleted and runs of whitespace are collapsed.
///
/// ```rust
/// use folio::net::html;
///
/// let safe = html::sanitize("<h2>Part One</h2><ul><li>Arrakis</li><li>Caladan</li></ul>");
/// assert_eq!(
///     html::to_text(&safe),
///     vec!["Part One", "", "• Arrakis", "• Caladan"]
/// );
/// ```
pub fn to_text(html: &SafeHtml) -> Vec<String> {
    let fragment = Html::parse_fragment(html.as_str());
    let mut raw = String::new();
    collect_text(fragment.root_element(), &mut raw);

    let normalized = raw
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let normalized = BLANK_RUNS.replace_all(&normalized, "\n\n");

    normalized
        .trim_matches('\n')
        .lines()
        .map(String::from)
        .collect()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&INLINE_WHITESPACE.replace_all(text, " "));
            }
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                match child.value().name() {
                    "br" => out.push('\n'),
                    "hr" => out.push_str("\n\n"),
                    "li" => {
                        out.push_str("\n• ");
                        collect_text(child, out);
                    }
                    "td" | "th" => {
                        collect_text(child, out);
                        out.push(' ');
                    }
                    name if BLOCK_ELEMENTS.contains(&name) => {
                        out.push_str("\n\n");
                        collect_text(child, out);
                        out.push_str("\n\n");
                    }
                    _ => collect_text(child, out),
                }
            }
            _ => {}
        }
    }
}

/// Joins the plain text of a fragment into a single line.
///
/// Used for compact displays such as result cards.
pub fn to_inline_text(html: &SafeHtml) -> String {
    let joined = to_text(html).join(" ");
    INLINE_WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}
