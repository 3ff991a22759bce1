use serde::{Deserialize, Serialize};

/// Column order of the raw and filtered listing tables.
pub const LISTING_COLUMNS: [&str; 4] = ["title", "date", "link", "nrec"];

/// Column order of the content table.
pub const CONTENT_COLUMNS: [&str; 7] = ["title", "date", "link", "nrec", "source", "content", "urls"];

/// Separator used to flatten `urls` into a single cell.
pub const URL_DELIMITER: &str = "|";

/// One post summary as shown on a board index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub date: String,
    pub link: String,
    #[serde(rename = "nrec")]
    pub raw_popularity: String,
}

impl ListingRecord {
    pub fn to_row(&self) -> [&str; 4] {
        [&self.title, &self.date, &self.link, &self.raw_popularity]
    }
}

/// Structured fields pulled out of a single post page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub source: String,
    pub content: String,
    pub urls: Vec<String>,
}

/// A qualifying listing enriched with its post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub listing: ListingRecord,
    pub source: String,
    pub content: String,
    pub urls: Vec<String>,
}

impl ContentRecord {
    pub fn new(listing: ListingRecord, post: PostContent) -> Self {
        Self {
            listing,
            source: post.source,
            content: post.content,
            urls: post.urls,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        let l = &self.listing;
        vec![
            l.title.clone(),
            l.date.clone(),
            l.link.clone(),
            l.raw_popularity.clone(),
            self.source.clone(),
            self.content.clone(),
            self.urls.join(URL_DELIMITER),
        ]
    }
}
