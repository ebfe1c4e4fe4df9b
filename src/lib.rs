//! Downloads a serialized novel from tl.rulate.ru and packs it into a single
//! FictionBook 2 file.
//!
//! ```text
//! TOC page ─ parse rows ─ fetch chapters (concurrent) ─ assemble volumes
//!          ─ extract images ─ fetch + transcode images (concurrent) ─ render FB2
//! ```

pub mod book;
pub mod config;
pub mod crawler;
pub mod error;
pub mod fb2;
pub mod models;
pub mod utils;

pub use config::{CrawlerConfig, Credentials, Grammar, GrammarPatterns};
pub use crawler::{HttpTransport, RulateCrawler, Transport};
pub use error::FetchError;
pub use models::{BookInfo, ChapterNode, Document, Illustration, Picture, Row, RowKind};
pub use utils::{get_user_input, output_path};
