use std::fs;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use thiserror::Error;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source {source_id} is unavailable: {reason}")]
    Unavailable { source_id: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Retrieves the raw text of a source token.
pub trait SourceLoader {
    fn load(&self, source: &str) -> Result<String, LoadError>;
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads filesystem paths and fetches `http(s)` URLs, retrying failed
/// fetches with a fixed delay.
pub struct FileAndUrlLoader {
    client: Client,
    attempts: u32,
    retry_delay: Duration,
}

impl FileAndUrlLoader {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swg/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            attempts: DEFAULT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_retry(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    fn fetch_once(&self, url: &str) -> Result<String, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        response.text().map_err(|e| e.to_string())
    }

    fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(url) {
                Ok(text) => {
                    debug!("fetched {url} ({} bytes)", text.len());
                    return Ok(text);
                }
                Err(reason) if attempt < self.attempts => {
                    warn!(
                        "{url}: attempt {attempt}/{} failed: {reason}; retrying in {:?}",
                        self.attempts, self.retry_delay
                    );
                    thread::sleep(self.retry_delay);
                    attempt += 1;
                }
                Err(reason) => {
                    return Err(LoadError::Unavailable {
                        source_id: url.to_string(),
                        reason: format!("{reason} (after {attempt} attempts)"),
                    });
                }
            }
        }
    }
}

impl SourceLoader for FileAndUrlLoader {
    fn load(&self, source: &str) -> Result<String, LoadError> {
        if is_url(source) {
            return self.fetch(source);
        }
        fs::read_to_string(source).map_err(|e| LoadError::Unavailable {
            source_id: source.to_string(),
            reason: e.to_string(),
        })
    }
}
