//! Field separation for post bodies.
//!
//! Post pages mix the header block (author, board, title, time) into the body
//! text with inconsistent punctuation, so fields are recovered by scanning for
//! marker substrings line by line.

use std::sync::LazyLock;

use regex::Regex;

use crate::records::PostContent;

pub const TITLE_MARKER: &str = "標題";
pub const AUTHOR_MARKER: &str = "作者";
pub const BOARD_MARKER: &str = "看板";
pub const TIME_MARKER: &str = "時間";

static TITLE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.*?標題[:,：]\s*").unwrap());
static AUTHOR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.*?作者[:,：]\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Title(String),
    Author(String),
    Body(String),
}

/// Classify one trimmed line. The title marker wins over the author marker.
pub fn classify_line(line: &str) -> Line {
    if line.contains(TITLE_MARKER) {
        Line::Title(TITLE_PREFIX_RE.replace(line, "").trim().to_string())
    } else if line.contains(AUTHOR_MARKER) {
        Line::Author(AUTHOR_PREFIX_RE.replace(line, "").trim().to_string())
    } else {
        Line::Body(line.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub source: String,
    pub body: Vec<String>,
}

/// Single pass over the lines; later title/author lines overwrite earlier ones.
pub fn separate_fields<'a, I>(lines: I) -> PostFields
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields = PostFields::default();
    for line in lines {
        match classify_line(line) {
            Line::Title(t) => fields.title = t,
            Line::Author(a) => fields.source = a,
            Line::Body(b) => fields.body.push(b),
        }
    }
    fields
}

/// Drop leading board/time header lines. Everything from the first other line
/// on is kept verbatim, including later lines that happen to contain a marker.
pub fn strip_board_header(body: Vec<String>) -> Vec<String> {
    body.into_iter()
        .skip_while(|l| l.contains(BOARD_MARKER) || l.contains(TIME_MARKER))
        .collect()
}

/// Split extracted text into trimmed, non-blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Text of the content region → structured post.
pub fn build_post(text: &str, urls: Vec<String>) -> PostContent {
    let lines = split_lines(text.trim());
    let fields = separate_fields(lines.iter().map(String::as_str));
    let body = strip_board_header(fields.body);
    PostContent {
        title: fields.title,
        source: fields.source,
        content: body.join("\n").trim().to_string(),
        urls,
    }
}
