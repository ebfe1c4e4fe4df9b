pub mod chapter;

pub use chapter::render_section;

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{FetchError, Result};
use crate::models::{ChapterNode, Document, Picture};

pub struct DocumentBuilder {
    title: Option<String>,
    author: Option<String>,
    publisher: String,
    tags: Vec<String>,
    authors: Vec<String>,
    annotation: Option<String>,
    date: Option<NaiveDate>,
    chapters: Vec<ChapterNode>,
    pictures: Vec<Picture>,
    cover: Option<String>,
}

impl Document {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            title: None,
            author: None,
            publisher: String::new(),
            tags: Vec::new(),
            authors: Vec::new(),
            annotation: None,
            date: None,
            chapters: Vec::new(),
            pictures: Vec::new(),
            cover: None,
        }
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Author identity, rendered as the document-info nickname.
    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn publisher<S: Into<String>>(mut self, publisher: S) -> Self {
        self.publisher = publisher.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn add_author<S: Into<String>>(mut self, entry: S) -> Self {
        self.authors.push(entry.into());
        self
    }

    pub fn annotation(mut self, annotation: Option<String>) -> Self {
        self.annotation = annotation.filter(|a| !a.is_empty());
        self
    }

    pub fn date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn chapters(mut self, chapters: Vec<ChapterNode>) -> Self {
        self.chapters = chapters;
        self
    }

    pub fn pictures(mut self, pictures: Vec<Picture>) -> Self {
        self.pictures = pictures;
        self
    }

    pub fn cover(mut self, cover: Option<String>) -> Self {
        self.cover = cover;
        self
    }

    pub fn build(self) -> Result<Document> {
        let title = self
            .title
            .ok_or_else(|| FetchError::InvalidDocument("title is required".to_string()))?;
        let author = self
            .author
            .ok_or_else(|| FetchError::InvalidDocument("author is required".to_string()))?;

        if let Some(cover) = &self.cover {
            if !self.pictures.iter().any(|p| &p.id == cover) {
                return Err(FetchError::InvalidDocument(format!("cover '{cover}' has no picture")));
            }
        }

        let authors = if self.authors.is_empty() { vec![author.clone()] } else { self.authors };

        Ok(Document {
            title,
            author,
            publisher: self.publisher,
            tags: self.tags,
            authors,
            annotation: self.annotation,
            date: self.date,
            chapters: self.chapters,
            pictures: self.pictures,
            cover: self.cover,
        })
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the whole book as FictionBook 2 markup.
///
/// Text fields and chapter bodies are embedded as-is; markup characters in
/// them are not escaped.
pub fn render(document: &Document) -> Vec<u8> {
    let mut out = String::new();

    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>
<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0" xmlns:l="http://www.w3.org/1999/xlink">
	<description>
		<title-info>
			<genre>"#);
    out.push_str(&document.tags.join(", "));
    out.push_str("</genre>\n");

    for entry in &document.authors {
        out.push_str("\t\t\t<author><first-name></first-name><last-name>");
        out.push_str(entry);
        out.push_str("</last-name></author>\n");
    }

    out.push_str("\t\t\t<book-title>");
    out.push_str(&document.title);
    out.push_str("</book-title>\n");

    if let Some(annotation) = &document.annotation {
        out.push_str("\t\t\t<annotation><p>");
        out.push_str(annotation);
        out.push_str("</p></annotation>\n");
    }

    if let Some(cover) = &document.cover {
        out.push_str(&format!("\t\t\t<coverpage><image l:href=\"#{}\"/></coverpage>\n", cover));
    }

    out.push_str("\t\t</title-info>\n\t\t<document-info>\n\t\t\t<author><nickname>");
    out.push_str(&document.author);
    out.push_str("</nickname></author>\n");
    if let Some(date) = document.date {
        out.push_str(&format!("\t\t\t<date>{}</date>\n", date.format("%Y-%m-%d")));
    }
    out.push_str("\t\t</document-info>\n\t\t<publish-info>\n\t\t\t<publisher>");
    out.push_str(&document.publisher);
    out.push_str("</publisher>\n\t\t</publish-info>\n\t</description>\n<body>\n");

    for node in &document.chapters {
        render_section(node, &mut out);
    }
    out.push_str("</body>\n");

    for picture in &document.pictures {
        out.push_str(&format!(
            "<binary id=\"{}\" content-type=\"{}\">{}</binary>\n",
            picture.id, picture.mime, picture.data
        ));
    }
    out.push_str("</FictionBook>\n");

    out.into_bytes()
}

/// Packs a rendered book into a single-entry deflated archive.
pub fn compress(entry_name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
    let archive_error = |e: zip::result::ZipError| FetchError::Archive(e.to_string());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options).map_err(archive_error)?;
    zip.write_all(bytes).map_err(|e| FetchError::Archive(e.to_string()))?;
    let cursor = zip.finish().map_err(archive_error)?;
    Ok(cursor.into_inner())
}
