use std::sync::LazyLock;

use scraper::{Html, Node, Selector};

use super::lines;
use crate::records::PostContent;

static MAIN_CONTENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div#main-content").unwrap());

/// Direct children of the content region with these tags are board furniture
/// (meta lines, push comments, signature decorations).
const DECORATION_TAGS: &[&str] = &["div", "span"];

/// Parse a post page. `None` when there is no content region.
pub fn parse_post(html: &str) -> Option<PostContent> {
    let document = Html::parse_document(html);
    let main = document.select(&MAIN_CONTENT).next()?;

    let mut texts: Vec<&str> = Vec::new();
    let mut urls = Vec::new();

    for child in main.children() {
        match child.value() {
            Node::Text(t) => texts.push(t),
            Node::Element(e) if DECORATION_TAGS.contains(&e.name()) => {}
            Node::Element(_) => {
                for node in child.descendants() {
                    match node.value() {
                        Node::Text(t) => texts.push(t),
                        Node::Element(e) if e.name() == "a" => {
                            if let Some(href) = e.attr("href") {
                                urls.push(href.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    Some(lines::build_post(&texts.join("\n"), urls))
}
