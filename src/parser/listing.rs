use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::BoardConfig;
use crate::records::ListingRecord;

static ENTRY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.r-ent").unwrap());
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.title > a").unwrap());
static DATE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.meta > div.date").unwrap());
static NREC: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.nrec").unwrap());
// Paging buttons read first / previous / next / last; the second one is "previous".
static PREV_PAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.btn-group-paging a.btn.wide:nth-child(2)").unwrap());
static PAGE_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"index(\d+)\.html").unwrap());

/// Popularity token used when an entry has no popularity marker at all.
pub const MISSING_POPULARITY: &str = "0";

/// Listing entries of one index page, in document order.
/// Entries without a title link or a date (e.g. deleted posts) are skipped.
pub fn parse_listings(html: &str, board: &BoardConfig) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for entry in document.select(&ENTRY) {
        let (Some(title), Some(date)) = (entry.select(&TITLE_LINK).next(), entry.select(&DATE).next())
        else {
            continue;
        };
        let Some(href) = title.value().attr("href") else {
            debug!("Listing without href: {}", element_text(&title));
            continue;
        };
        let raw_popularity = entry
            .select(&NREC)
            .next()
            .map(|n| element_text(&n))
            .unwrap_or_else(|| MISSING_POPULARITY.to_string());

        records.push(ListingRecord {
            title: element_text(&title),
            date: element_text(&date),
            link: board.resolve_link(href),
            raw_popularity,
        });
    }

    records
}

/// Frontier index from the board's index page, via its "previous page" button.
pub fn parse_frontier(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let prev = document.select(&PREV_PAGE).next()?;
    frontier_from_href(prev.value().attr("href")?)
}

/// The previous-page link points one page behind the unnumbered index page,
/// so the newest numbered page is that index plus one.
pub fn frontier_from_href(href: &str) -> Option<u32> {
    let caps = PAGE_INDEX_RE.captures(href)?;
    let index: u32 = caps[1].parse().ok()?;
    index.checked_add(1)
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
