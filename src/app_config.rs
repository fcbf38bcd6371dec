use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::errors::AppError;
use crate::fetcher::RetryPolicy;

/// Application configuration module
/// This module handles the application configuration including loading
/// and validating configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the content API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory receiving the .vtt and .txt files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Attempts per request before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Pause between two videos in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to draw a progress bar while processing videos
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_dir: default_output_dir(),
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            show_progress: true,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AppError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(AppError::Config(format!("Base URL cannot be used as a base: {}", self.base_url)));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Output directory must not be empty".to_string()));
        }

        Ok(())
    }

    /// URL of the catalog listing every video
    pub fn catalog_url(&self) -> Result<Url, AppError> {
        self.endpoint("content")
    }

    /// URL of the transcript with the given reference
    pub fn transcript_url(&self, transcript_id: u32) -> Result<Url, AppError> {
        let mut url = self.endpoint("transcript")?;
        url.query_pairs_mut()
            .append_pair("transcriptId", &transcript_id.to_string());
        Ok(url)
    }

    fn endpoint(&self, name: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Base URL cannot be used as a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Retry settings for the fetcher
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.initial_delay_ms))
    }

    /// Pause inserted after every processed video
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://cijapanese.com/api/v1".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("transcripts")
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
