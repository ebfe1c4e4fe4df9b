use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a table-of-contents row stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    Chapter {
        url: String,
        volume_to: Option<String>, // owning volume
    },
    VolumeHeader {
        volume: String,
    },
}

/// One flat entry of the table of contents, in page-encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub name: String,
    pub kind: RowKind,
}

impl Row {
    pub fn is_chapter(&self) -> bool {
        matches!(self.kind, RowKind::Chapter { .. })
    }
}

/// Metadata block of the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    pub cover_url: String,
    pub description: String,
    pub summary: String,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterNode {
    pub name: String,
    pub content: Option<String>,
    pub children: Vec<ChapterNode>,
    pub volume: Option<String>,
    pub volume_to: Option<String>,
    pub index: usize,
}

impl ChapterNode {
    pub fn chapter(name: impl Into<String>, content: Option<String>, volume_to: Option<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            content,
            children: Vec::new(),
            volume: None,
            volume_to,
            index,
        }
    }

    pub fn volume(name: impl Into<String>, volume: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            content: None,
            children: Vec::new(),
            volume: Some(volume.into()),
            volume_to: None,
            index,
        }
    }
}

/// A distinct image reference and the picture id allocated to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Illustration {
    pub reference: String,
    pub id: String,
}

/// A deduplicated, normalized embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub id: String,
    pub mime: String,
    pub data: String, // base64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub annotation: Option<String>,
    pub date: Option<NaiveDate>,
    pub chapters: Vec<ChapterNode>,
    pub pictures: Vec<Picture>,
    pub cover: Option<String>,
}
