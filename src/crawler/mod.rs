pub mod downloader;
pub mod parser;
pub mod processor;
pub mod transport;

pub use downloader::ImageDownloader;
pub use parser::TocParser;
pub use processor::ChapterProcessor;
pub use transport::{HttpTransport, Transport};

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::book::{assemble, extract_illustrations};
use crate::config::{CrawlerConfig, Grammar};
use crate::error::{FetchError, Result};
use crate::fb2;
use crate::models::Document;

pub struct RulateCrawler<T: Transport = HttpTransport> {
    transport: T,
    config: CrawlerConfig,
    parser: TocParser,
    processor: ChapterProcessor,
    image_downloader: ImageDownloader,
}

impl RulateCrawler<HttpTransport> {
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> RulateCrawler<T> {
    pub fn with_transport(config: CrawlerConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let grammar = Grammar::compile(&config.grammar)?;

        Ok(Self {
            transport,
            parser: TocParser::new(&grammar),
            processor: ChapterProcessor::new(grammar.body),
            image_downloader: ImageDownloader::new(config.jpeg_quality),
            config,
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn book_url(&self, book_id: u32) -> String {
        format!("{}/book/{}", self.config.base_url.trim_end_matches('/'), book_id)
    }

    /// Runs every stage in order. Any failure aborts the whole book.
    pub async fn fetch_document(&self, book_id: u32) -> Result<Document> {
        let url = self.book_url(book_id);
        info!("Fetching book {}", url);

        self.transport.prepare(book_id).await?;
        let page = self.transport.get_text(&url).await?;
        let (book, rows) = self.parser.parse(&page, &url)?;

        let nodes = self.processor.fetch_chapters(&self.transport, rows).await?;
        let tree = assemble(nodes);

        let cover = Some(book.cover_url.as_str()).filter(|c| !c.is_empty());
        let (chapters, illustrations) = extract_illustrations(tree, cover);
        let cover_id = cover
            .and_then(|cover| illustrations.iter().find(|i| i.reference == cover))
            .map(|i| i.id.clone());
        let pictures = self.image_downloader.download_all(&self.transport, &illustrations).await?;

        Document::builder()
            .title(book.title)
            .author(url.clone())
            .add_author(book.author.unwrap_or(url))
            .publisher(self.config.publisher.clone())
            .tags(self.config.tags.clone())
            .annotation(Some(book.summary))
            .date(Some(Local::now().date_naive()))
            .chapters(chapters)
            .pictures(pictures)
            .cover(cover_id)
            .build()
    }

    /// The finished book as bytes, zipped when `compress` is set.
    pub async fn build_fb2(&self, book_id: u32) -> Result<Vec<u8>> {
        let document = self.fetch_document(book_id).await?;
        let bytes = fb2::render(&document);
        info!("Rendered '{}': {} bytes, {} pictures", document.title, bytes.len(), document.pictures.len());

        if self.config.compress {
            fb2::compress(&format!("{}.fb2", book_id), &bytes)
        } else {
            Ok(bytes)
        }
    }

    /// Builds the book and writes it to `path`. Nothing is written unless
    /// every stage succeeds.
    pub async fn save_fb2(&self, book_id: u32, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let bytes = self.build_fb2(book_id).await?;
        write_atomic(&path, &bytes).await?;
        info!("Saved {}", path.display());
        Ok(path)
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_failed = |source| FetchError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let written = match tokio::fs::write(&tmp_path, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(source) = written {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(source));
    }
    Ok(())
}
