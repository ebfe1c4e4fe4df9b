use regex::{Captures, Regex};
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::config::Grammar;
use crate::error::{FetchError, Result};
use crate::models::{BookInfo, Row, RowKind};

/// Extracts book metadata and the flat row list from a listing page.
pub struct TocParser {
    metadata: Regex,
    row: Regex,
}

impl TocParser {
    pub fn new(grammar: &Grammar) -> Self {
        Self {
            metadata: grammar.metadata.clone(),
            row: grammar.row.clone(),
        }
    }

    pub fn parse(&self, page: &str, url: &str) -> Result<(BookInfo, Vec<Row>)> {
        let info = self
            .metadata
            .captures(page)
            .ok_or_else(|| FetchError::PageNotRecognized { url: url.to_string() })?;

        let description = group(&info, "description").unwrap_or_default();
        let book = BookInfo {
            title: group(&info, "title").unwrap_or_default(),
            cover_url: group(&info, "cover").unwrap_or_default(),
            summary: plain_text(&description),
            author: linked_author(&description),
            description,
        };

        // Ordinal is the encounter order on the page; the row id attribute is ignored.
        let rows: Vec<Row> = self
            .row
            .captures_iter(page)
            .enumerate()
            .map(|(index, caps)| row_from_captures(&caps, index))
            .collect();

        info!("Parsed '{}': {} rows", book.title, rows.len());
        Ok((book, rows))
    }
}

fn row_from_captures(caps: &Captures<'_>, index: usize) -> Row {
    match group(caps, "url") {
        Some(url) => Row {
            index,
            name: group(caps, "name").unwrap_or_default(),
            kind: RowKind::Chapter {
                url,
                volume_to: group(caps, "volume_to"),
            },
        },
        None => {
            let row = Row {
                index,
                name: group(caps, "title").unwrap_or_default(),
                kind: RowKind::VolumeHeader {
                    volume: group(caps, "volume").unwrap_or_default(),
                },
            };
            debug!("Volume header #{}: {}", index, row.name);
            row
        }
    }
}

/// Non-empty named capture.
fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn linked_author(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse("em > a").ok()?;
    fragment
        .select(&selector)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
}
