use tracing::{debug, info};

use crate::config::{CrawlerConfig, Credentials};
use crate::error::{FetchError, Result};

/// Read-only access to the source site, shared by every request of a batch.
pub trait Transport: Sync {
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;

    fn get_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Pre-flight run once before the table of contents is fetched.
    fn prepare(&self, _book_id: u32) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
        })
    }

    /// Joins a relative path onto the site root.
    pub fn resolve(&self, url: &str) -> String {
        resolve_url(&self.base_url, url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
        request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_failure(url, e))
    }

    async fn login(&self, credentials: &Credentials, book_id: u32) -> Result<()> {
        info!("Logging in as {}", credentials.login);
        let form = [
            ("login[login]", credentials.login.as_str()),
            ("login[pass]", credentials.password.as_str()),
        ];
        self.send(self.client.post(&self.base_url).form(&form), &self.base_url).await?;

        let approve_url = format!("{}/mature?path={}", self.base_url, book_id);
        let book_path = format!("/book/{}", book_id);
        let form = [("path", book_path.as_str()), ("ok", "Да")];
        self.send(self.client.post(&approve_url).form(&form), &approve_url).await?;
        debug!("Mature content approved for book {}", book_id);
        Ok(())
    }
}

impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        let url = self.resolve(url);
        debug!("GET {}", url);
        let response = self.send(self.client.get(&url), &url).await?;
        response.text().await.map_err(|e| fetch_failure(&url, e))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.resolve(url);
        debug!("GET {}", url);
        let response = self.send(self.client.get(&url), &url).await?;
        let bytes = response.bytes().await.map_err(|e| fetch_failure(&url, e))?;
        Ok(bytes.to_vec())
    }

    async fn prepare(&self, book_id: u32) -> Result<()> {
        match &self.credentials {
            Some(credentials) => self.login(credentials, book_id).await,
            None => Ok(()),
        }
    }
}

pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), url)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), url)
    }
}

fn fetch_failure(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::FetchFailure {
        url: url.to_string(),
        reason: e.to_string(),
    }
}
