//! Small helpers over `scraper` shared by profile extraction and campaign
//! parsing.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("valid selector"));

const SKIPPED: [&str; 5] = ["script", "style", "noscript", "template", "svg"];
const BLOCK: [&str; 20] = [
    "address", "article", "br", "dd", "div", "dt", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "li", "p", "section", "table", "td", "tr",
];

/// Approximates `document.body.innerText`: text of non-script nodes, with
/// block elements separated and whitespace collapsed.
pub(crate) fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    let mut out = String::new();
    collect_text(root, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let block = BLOCK.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapsed text content of a single element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// `content` of every `<meta>` whose `name` or `property` is one of `keys`,
/// in document order.
pub(crate) fn meta_contents(document: &Html, keys: &[&str]) -> Vec<String> {
    document
        .select(&META)
        .filter(|meta| {
            let el = meta.value();
            el.attr("name")
                .or_else(|| el.attr("property"))
                .is_some_and(|key| keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
        .collect()
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_text_skips_scripts_and_keeps_inline_runs_together() {
        let doc = Html::parse_document(
            "<html><head><title>t</title></head><body>\
             <script>var x = 1;</script>\
             <div>R$ <b>10.000</b>,00</div><p>segunda   linha</p></body></html>",
        );
        assert_eq!(visible_text(&doc), "R$ 10.000,00 segunda linha");
    }

    #[test]
    fn meta_contents_matches_name_or_property() {
        let doc = Html::parse_document(
            r#"<html><head>
               <meta name="description" content="1,234 Followers">
               <meta property="og:description" content="  5K   Followers ">
               <meta name="viewport" content="width=device-width">
               </head><body></body></html>"#,
        );
        assert_eq!(
            meta_contents(&doc, &["description", "og:description"]),
            vec!["1,234 Followers".to_string(), "5K Followers".to_string()]
        );
    }
}
