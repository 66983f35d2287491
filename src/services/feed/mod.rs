//! Schedule feed sources.
//!
//! The feed is a JSON array of performance records. It is read once at
//! startup; any failure degrades to an empty schedule.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use super::schedule::PerformanceStore;
use super::LoadOutcome;
use crate::models::performance::Performance;
use crate::models::settings::FeedSettings;

/// Anything that can produce the list of performances.
#[cfg_attr(test, mockall::automock)]
pub trait FeedSource {
    fn fetch(&self) -> Result<Vec<Performance>>;

    /// Short human-readable description for log lines
    fn describe(&self) -> String;
}

/// Fetch the feed and build the store, falling back to an empty one.
pub fn load_schedule(source: &dyn FeedSource) -> LoadOutcome<PerformanceStore> {
    match source.fetch() {
        Ok(performances) => {
            let malformed = performances.iter().filter(|p| !p.is_well_formed()).count();
            if malformed > 0 {
                log::debug!(
                    "{} of {} feed records have an odd day or time window",
                    malformed,
                    performances.len()
                );
            }
            log::info!(
                "Loaded {} performances from {}",
                performances.len(),
                source.describe()
            );
            LoadOutcome::Loaded(PerformanceStore::new(performances))
        }
        Err(err) => {
            log::error!("Error loading schedule from {}: {:#}", source.describe(), err);
            LoadOutcome::Fallback {
                value: PerformanceStore::default(),
                reason: format!("{:#}", err),
            }
        }
    }
}

/// Pick the feed named by the settings: URL if present, otherwise file.
pub fn feed_from_settings(settings: &FeedSettings) -> Result<Box<dyn FeedSource>> {
    match settings.url {
        Some(ref url) => Ok(Box::new(HttpFeed::new(url.clone())?)),
        None => Ok(Box::new(FileFeed::new(settings.path.clone()))),
    }
}

/// Parse the feed body. The body must be a JSON array; rows that do not
/// decode as a performance are skipped so one bad row does not cost the
/// whole schedule.
fn parse_feed(body: &str) -> Result<Vec<Performance>> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(body).context("Schedule feed is not a valid performance list")?;
    let total = rows.len();

    let performances: Vec<Performance> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(performance) => Some(performance),
            Err(err) => {
                log::warn!("Skipping schedule row {}: {}", index, err);
                None
            }
        })
        .collect();

    if performances.len() < total {
        log::warn!("Kept {} of {} schedule rows", performances.len(), total);
    }
    Ok(performances)
}

/// Reads the schedule from a local JSON file.
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileFeed {
    fn fetch(&self) -> Result<Vec<Performance>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read schedule from {}", self.path.display()))?;
        parse_feed(&data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed in-memory schedule.
#[derive(Default)]
pub struct StaticFeed {
    performances: Vec<Performance>,
}

impl StaticFeed {
    pub fn new(performances: Vec<Performance>) -> Self {
        Self { performances }
    }
}

impl FeedSource for StaticFeed {
    fn fetch(&self) -> Result<Vec<Performance>> {
        Ok(self.performances.clone())
    }

    fn describe(&self) -> String {
        "static schedule".to_string()
    }
}

/// Fetches the schedule over HTTPS with a couple of retries.
pub struct HttpFeed {
    client: Client,
    url: String,
    max_response_bytes: usize,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("https://") {
            return Err(anyhow!("Schedule feed URL must use HTTPS"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build schedule feed HTTP client")?;

        Ok(Self {
            client,
            url,
            max_response_bytes: 2 * 1024 * 1024,
            max_retries: 2,
            retry_delay_ms: 400,
        })
    }

    fn fetch_once(&self) -> Result<Vec<Performance>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .context("Network error during schedule fetch")?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(anyhow!("Schedule fetch failed with HTTP status {}", status));
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_bytes {
                return Err(anyhow!(
                    "Schedule response too large ({} bytes > {} bytes)",
                    content_length,
                    self.max_response_bytes
                ));
            }
        }

        let bytes = response
            .bytes()
            .context("Failed to read schedule response body")?;

        if bytes.len() > self.max_response_bytes {
            return Err(anyhow!(
                "Schedule response too large ({} bytes > {} bytes)",
                bytes.len(),
                self.max_response_bytes
            ));
        }

        let body = std::str::from_utf8(&bytes).context("Schedule response is not valid UTF-8")?;
        parse_feed(body)
    }
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> Result<Vec<Performance>> {
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..=self.max_retries {
            match self.fetch_once() {
                Ok(performances) => return Ok(performances),
                Err(err) => {
                    if attempt == self.max_retries {
                        last_error = Some(err.context(format!(
                            "Failed to fetch schedule from {} after {} attempts",
                            self.url,
                            attempt + 1
                        )));
                    } else {
                        log::warn!(
                            "Schedule fetch attempt {} failed for {}: {}",
                            attempt + 1,
                            self.url,
                            err
                        );
                        thread::sleep(Duration::from_millis(self.retry_delay_ms));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown schedule fetch error")))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
