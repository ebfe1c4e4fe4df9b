//! Crawler configuration and the markup grammar of the source site.
//!
//! All knobs live in [`CrawlerConfig`], which can be loaded from a JSON file.
//! The three extraction patterns are kept as plain strings so a config file can
//! override them; [`Grammar::compile`] turns them into checked regexes.

use crate::error::{FetchError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://tl.rulate.ru";
pub const DEFAULT_PUBLISHER: &str = "DALOR";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const METADATA_PATTERN: &str = r#"<h1>(?P<title>.+)</h1>\n<div\sid='Info'[\s\S]+<img\ssrc="(?P<cover>/i/book/[a-z0-9/.]+)"[\s\S]+(?P<description><p><strong>Автор:</strong>\s<em><a\shref=.+)\n"#;

const ROW_PATTERN: &str = r#"<tr\sid='(?:c_|vol_title_)(?P<index>[0-9]+)'[^>]*class='(?P<kind>chapter_row|volume_helper)\s*(?P<volume_to>[^' ]*)\s?'><td(?:\scolspan='14'\sonclick='\$\("\.(?P<volume>volume_[0-9a-z]+)"\)[^<]+<strong>(?P<title>[^<]+)|></td><td\sclass='t'><a\shref='(?P<url>[^']+)'>(?P<name>[^<]+)</a>)"#;

const BODY_PATTERN: &str = r#"<div\sid="readpage">(?P<content>[\s\S]+)</div>\n<div\sstyle="text-align:\scenter;\smargin-bottom:\s20px;""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Raw extraction patterns, one per block kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarPatterns {
    pub metadata: String,
    pub row: String,
    pub body: String,
}

impl Default for GrammarPatterns {
    fn default() -> Self {
        Self {
            metadata: METADATA_PATTERN.to_string(),
            row: ROW_PATTERN.to_string(),
            body: BODY_PATTERN.to_string(),
        }
    }
}

/// Compiled extraction grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub metadata: Regex,
    pub row: Regex,
    pub body: Regex,
}

impl Grammar {
    pub fn compile(patterns: &GrammarPatterns) -> Result<Self> {
        Ok(Self {
            metadata: compile_pattern("metadata", &patterns.metadata, &["title", "cover", "description"])?,
            row: compile_pattern("row", &patterns.row, &["name", "url", "title", "volume"])?,
            body: compile_pattern("body", &patterns.body, &["content"])?,
        })
    }
}

fn compile_pattern(label: &str, pattern: &str, groups: &[&str]) -> Result<Regex> {
    let regex = Regex::new(pattern).map_err(|e| FetchError::InvalidGrammar(format!("{label} pattern: {e}")))?;
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    for group in groups {
        if !names.contains(group) {
            return Err(FetchError::InvalidGrammar(format!(
                "{label} pattern is missing the named group '{group}'"
            )));
        }
    }
    Ok(regex)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub user_agent: String,
    pub publisher: String,
    pub tags: Vec<String>,
    pub credentials: Option<Credentials>,
    pub grammar: GrammarPatterns,
    /// JPEG quality for normalized pictures, 1-100.
    pub jpeg_quality: u8,
    /// Wrap the output in a `.fb2.zip` archive.
    pub compress: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            publisher: DEFAULT_PUBLISHER.to_string(),
            tags: Vec::new(),
            credentials: None,
            grammar: GrammarPatterns::default(),
            jpeg_quality: 90,
            compress: false,
        }
    }
}

impl CrawlerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Config(format!("cannot read '{}': {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| FetchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(FetchError::Config(format!("base_url must be an HTTP(S) URL, got '{}'", self.base_url)));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(FetchError::Config(format!("jpeg_quality must be in 1..=100, got {}", self.jpeg_quality)));
        }
        Ok(())
    }

    /// Extension of the file this configuration produces.
    pub fn output_extension(&self) -> &'static str {
        if self.compress { "fb2.zip" } else { "fb2" }
    }
}
