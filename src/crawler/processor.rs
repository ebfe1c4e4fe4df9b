use futures::future::join_all;
use regex::Regex;
use tracing::{debug, info};

use super::transport::Transport;
use crate::error::Result;
use crate::models::{ChapterNode, Row, RowKind};

/// Fetches every chapter body of a book concurrently.
pub struct ChapterProcessor {
    body: Regex,
}

impl ChapterProcessor {
    pub fn new(body: Regex) -> Self {
        Self { body }
    }

    /// One request per chapter row, all in flight at once.
    ///
    /// Every request is awaited before the first failure is returned, so no
    /// sibling is left running. The result is ordered by row index, never by
    /// completion order.
    pub async fn fetch_chapters<T: Transport>(&self, transport: &T, rows: Vec<Row>) -> Result<Vec<ChapterNode>> {
        let requested = rows.iter().filter(|row| row.is_chapter()).count();
        info!("Fetching {} chapters", requested);

        let results = join_all(rows.into_iter().map(|row| self.fetch_row(transport, row))).await;
        let mut nodes = results.into_iter().collect::<Result<Vec<_>>>()?;
        nodes.sort_by_key(|node| node.index);

        info!("Fetched {} chapters", requested);
        Ok(nodes)
    }

    async fn fetch_row<T: Transport>(&self, transport: &T, row: Row) -> Result<ChapterNode> {
        match row.kind {
            RowKind::VolumeHeader { volume } => Ok(ChapterNode::volume(row.name, volume, row.index)),
            RowKind::Chapter { url, volume_to } => {
                let page = transport.get_text(&url).await?;
                let content = self.extract_body(&page);
                if content.is_none() {
                    debug!("No chapter body found in {}", url);
                }
                Ok(ChapterNode::chapter(row.name, content, volume_to, row.index))
            }
        }
    }

    pub fn extract_body(&self, page: &str) -> Option<String> {
        self.body
            .captures(page)
            .and_then(|caps| caps.name("content"))
            .map(|m| strip_comments(m.as_str()))
    }
}

/// Drops `<!-- ... -->` comments from a chapter body.
pub fn strip_comments(content: &str) -> String {
    content
        .split("-->")
        .map(|part| part.split("<!--").next().unwrap_or_default())
        .collect()
}
