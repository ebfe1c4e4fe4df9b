//! Error types for the rulate-fetch library.
//!
//! Every failure is fatal to the run: a book is either fully assembled or
//! not produced at all. There are no retries and no partial documents.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The table-of-contents page has no metadata block.
    #[error("page not recognized as a book listing: '{url}'")]
    PageNotRecognized { url: String },

    /// A network request failed or returned a non-success status.
    #[error("failed to fetch '{url}': {reason}")]
    FetchFailure { url: String, reason: String },

    /// Fetched bytes could not be decoded or re-encoded as an image.
    #[error("failed to decode image '{id}': {source}")]
    ImageDecodeFailure {
        id: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid extraction grammar: {0}")]
    InvalidGrammar(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build archive: {0}")]
    Archive(String),

    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_not_recognized_display() {
        let e = FetchError::PageNotRecognized {
            url: "https://tl.rulate.ru/book/24".into(),
        };
        assert!(e.to_string().contains("/book/24"));
    }

    #[test]
    fn fetch_failure_display() {
        let e = FetchError::FetchFailure {
            url: "https://tl.rulate.ru/c/2".into(),
            reason: "HTTP status server error (500)".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("/c/2"), "got: {msg}");
        assert!(msg.contains("500"), "got: {msg}");
    }

    #[test]
    fn image_decode_failure_keeps_source() {
        let source = image::load_from_memory(b"not an image").unwrap_err();
        let e = FetchError::ImageDecodeFailure {
            id: "i_book_5_1.jpg".into(),
            source,
        };
        assert!(e.to_string().contains("i_book_5_1.jpg"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
