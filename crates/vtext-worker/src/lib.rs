//! Overlay job runner.
//!
//! This crate provides:
//! - The job lifecycle (style resolution, composition, encoding)
//! - Caption jobs backed by a transcription service
//! - Batch runs over a directory with bounded concurrency
//! - The `vtext` command-line interface

pub mod args;
pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod runner;

pub use batch::{discover_videos, run_batch, BatchReport, JobTemplate};
pub use config::{TranscriberKind, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use runner::{style_resolver, Collaborators, JobRunner};
