/*!
 * # cijsubs - Comprehensible Japanese transcript downloader
 *
 * A Rust library for downloading video transcripts from the Comprehensible
 * Japanese content API and storing them as WebVTT subtitles and plain text.
 *
 * ## Features
 *
 * - Select videos by ID, ranges (`1,4-6,9-10`) or `all`
 * - Skip videos whose subtitles are already on disk
 * - Retry failed requests with exponential backoff and jitter
 * - Exact `HH:MM:SS.mmm` WebVTT timestamps
 * - Paragraph-aware plain-text transcripts
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `fetcher`: HTTP retrieval with backoff
 * - `selection`: Selection expression parsing and ID resolution
 * - `catalog`: Catalog response model and work item filtering
 * - `transcript`: Transcript decoding and WebVTT / plain-text conversion
 * - `file_utils`: File naming and output directory scanning
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod errors;
pub mod fetcher;
pub mod file_utils;
pub mod selection;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, ItemOutcome, ItemStatus, RunSummary};
pub use catalog::{CatalogEntry, CatalogResponse, WorkItem};
pub use errors::{AppError, FetchError, SelectionError, TranscodeError};
pub use fetcher::{BackoffFetcher, JsonSource, ReqwestSource, RetryPolicy, Sleeper, TokioSleeper};
pub use selection::Selection;
pub use transcript::{Cue, Transcript};
