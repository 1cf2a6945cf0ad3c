//! Content sanitization: isolate the primary content region, strip
//! presentational artifacts, and wrap the result in a right-to-left
//! document shell.
//!
//! The output feeds the fingerprint cache, so serialization must be
//! deterministic: attributes are emitted sorted by name and text is
//! re-escaped the same way every round. Sanitizing an already-sanitized
//! document yields the identical byte sequence.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::errors::NoContentError;

/// Elements carrying any of these classes are presentational chrome and are
/// dropped wholesale.
pub const STRIP_CLASSES: &[&str] = &["mw-editsection", "printonly", "printfooter", "אפור"];

/// Container class wrapping section-number cross references.
pub const LAW_NUMBER_CLASS: &str = "law-number";

/// Class given to links demoted into inert labels.
pub const REF_LABEL_CLASS: &str = "ref-label";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw-text elements. Browsers never decode entities inside these, so
/// their contents are emitted verbatim instead of escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

static CONTENT_ROOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#mw-content-text").expect("content root selector parses"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector parses"));

/// Construction-time sanitizer configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizeOptions {
    /// Replace direct child links of law-number containers with inert
    /// labels. Exported documents would otherwise carry dangling
    /// cross-reference links.
    pub demote_law_refs: bool,
}

/// Reduces a raw wiki page to a self-contained document: the primary
/// content subtree minus images and marker-class elements, inside a
/// minimal RTL HTML shell. Pure; no network or filesystem access.
pub fn sanitize(html: &str, options: &SanitizeOptions) -> Result<String, NoContentError> {
    let document = Html::parse_document(html);
    let root = document.select(&CONTENT_ROOT).next().ok_or(NoContentError)?;

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "Law Document".to_owned());

    let mut body = String::new();
    render_element(root, options, &mut body);

    let mut out = String::with_capacity(body.len() + 512);
    out.push_str("<!DOCTYPE html>\n<html lang=\"he\" dir=\"rtl\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str("<title>");
    escape_text(&title, &mut out);
    out.push_str("</title>\n");
    out.push_str("<link rel=\"stylesheet\" href=\"style.css\">\n");
    out.push_str("</head>\n<body>\n");
    out.push_str(&body);
    out.push_str("\n</body>\n</html>\n");

    Ok(out)
}

fn render_element(el: ElementRef<'_>, options: &SanitizeOptions, out: &mut String) {
    let element = el.value();
    let name = element.name();

    if name == "img" {
        return;
    }
    if element.classes().any(|class| STRIP_CLASSES.contains(&class)) {
        return;
    }

    out.push('<');
    out.push_str(name);

    let mut attrs: Vec<(&str, &str)> = element.attrs().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));
    for (attr_name, value) in attrs {
        out.push(' ');
        out.push_str(attr_name);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    if RAW_TEXT_ELEMENTS.contains(&name) {
        for child in el.children() {
            if let Node::Text(text) = child.value() {
                out.push_str(text);
            }
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
        return;
    }

    let demote_children =
        options.demote_law_refs && element.classes().any(|class| class == LAW_NUMBER_CLASS);

    for child in el.children() {
        match child.value() {
            Node::Text(text) => escape_text(text, out),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if demote_children && child_el.value().name() == "a" {
                    render_demoted_link(child_el, out);
                } else {
                    render_element(child_el, options, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Emits a cross-reference link as an inert label: same text, marker class,
/// original target kept in a non-navigable attribute.
fn render_demoted_link(link: ElementRef<'_>, out: &mut String) {
    out.push_str("<span class=\"");
    out.push_str(REF_LABEL_CLASS);
    out.push('"');
    if let Some(href) = link.value().attr("href") {
        out.push_str(" data-href=\"");
        escape_attr(href, out);
        out.push('"');
    }
    out.push('>');
    let text = link.text().collect::<String>();
    escape_text(&text, out);
    out.push_str("</span>");
}

fn escape_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
