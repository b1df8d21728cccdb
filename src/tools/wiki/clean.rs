//! HTML to plain text

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("tag pattern is valid"));

const DROPPED_TAGS: &[&str] = &["script", "style", "table", "sup"];
const DROPPED_SPAN_CLASSES: &[&str] = &["mw-editsection", "reference", "mw-cite-backlink", "noprint"];
const DROPPED_DIV_CLASSES: &[&str] = &["reflist", "navbox", "infobox", "toc", "metadata"];
const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li"];

/// Remove every tag from a short fragment such as a search snippet
pub fn strip_tags(raw: &str) -> String {
    TAG_REGEX.replace_all(raw, "").into_owned()
}

/// Extract readable text from rendered page HTML, one paragraph, heading or
/// list item per line. Scripts, tables, footnote markers, edit links and
/// navigation boxes are dropped.
pub fn clean_page_html(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    collect_blocks(document.root_element(), &mut blocks);
    blocks.join("\n")
}

fn is_dropped(element: &ElementRef) -> bool {
    let el = element.value();
    let name = el.name();
    if DROPPED_TAGS.contains(&name) {
        return true;
    }
    let classes = match name {
        "span" => DROPPED_SPAN_CLASSES,
        "div" => DROPPED_DIV_CLASSES,
        _ => return false,
    };
    el.classes().any(|class| classes.contains(&class))
}

fn collect_blocks(element: ElementRef, out: &mut Vec<String>) {
    for child in element.children() {
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        if is_dropped(&child) {
            continue;
        }
        if BLOCK_TAGS.contains(&child.value().name()) {
            let mut parts = Vec::new();
            collect_text(child, &mut parts);
            if !parts.is_empty() {
                out.push(parts.join(" "));
            }
        } else {
            collect_blocks(child, out);
        }
    }
}

fn collect_text(element: ElementRef, parts: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !is_dropped(&el) {
                        collect_text(el, parts);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags(r#"the <span class="searchmatch">Eiffel</span> Tower"#),
            "the Eiffel Tower"
        );
    }

    #[test]
    fn test_keeps_only_content_blocks() {
        let html = r#"
            <div class="mw-parser-output">
              <div class="infobox"><p>Infobox paragraph</p></div>
              <p>The <b>Eiffel Tower</b> is in Paris.<sup class="reference">[1]</sup></p>
              <table><tr><td><p>cell</p></td></tr></table>
              <div class="mw-heading"><h2 id="History">History</h2><span class="mw-editsection">[edit]</span></div>
              <ul><li>Built 1887</li><li></li></ul>
              <script>var x = 1;</script>
              <div class="navbox"><li>Nav item</li></div>
            </div>
        "#;

        assert_eq!(
            clean_page_html(html),
            "The Eiffel Tower is in Paris.\nHistory\nBuilt 1887"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_page_html(""), "");
    }
}
