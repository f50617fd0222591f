//! Batch mode: apply one job template to every video in a directory.
//!
//! Files are processed concurrently up to a semaphore limit. A failing file
//! never stops the others; every file gets an entry in the report.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use vtext_models::job::{default_output_name, is_supported_video};
use vtext_models::{
    AnimationSpec, EncodingConfig, JobOutcome, JobRequest, OutputMode, TextSourceRequest,
    TextStyleRequest,
};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::runner::{rejected, JobRunner};

/// Everything of a job request except its input and output paths.
#[derive(Debug, Clone)]
pub struct JobTemplate {
    pub style: TextStyleRequest,
    pub text: TextSourceRequest,
    pub animation: AnimationSpec,
    pub mode: OutputMode,
    pub encoding: Option<EncodingConfig>,
}

impl JobTemplate {
    /// Output path a job for `input` writes to under `output_dir`.
    pub fn output_for(&self, input: &Path, output_dir: &Path) -> Option<PathBuf> {
        let file_name = input.file_name()?.to_str()?;
        Some(output_dir.join(default_output_name(file_name, &self.mode)))
    }

    pub fn request_for(&self, input: impl Into<PathBuf>) -> JobRequest {
        JobRequest {
            input: input.into(),
            output: None,
            style: self.style.clone(),
            text: self.text.clone(),
            animation: self.animation,
            mode: self.mode,
            encoding: self.encoding.clone(),
        }
    }
}

/// Per-file results of a batch run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Supported video files directly inside `dir`, sorted by name.
pub async fn discover_videos(dir: &Path) -> WorkerResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        WorkerError::invalid_input(format!("cannot read directory {}: {}", dir.display(), e))
    })?;

    let mut videos = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_supported_video(&path) {
            videos.push(path);
        }
    }
    videos.sort();
    Ok(videos)
}

/// Run `template` over every supported video in `input_dir`.
pub async fn run_batch(
    runner: Arc<JobRunner>,
    input_dir: &Path,
    output_dir: &Path,
    template: &JobTemplate,
    max_concurrent: usize,
    cancel: Option<watch::Receiver<bool>>,
) -> WorkerResult<BatchReport> {
    let videos = discover_videos(input_dir).await?;
    let logger = JobLogger::from_string(&input_dir.display().to_string(), "batch");
    logger.log_start(&format!(
        "{} video(s), {} at a time",
        videos.len(),
        max_concurrent.max(1)
    ));

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    let mut slots: Vec<Option<JobOutcome>> = vec![None; videos.len()];
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for (index, input) in videos.iter().enumerate() {
        // Two jobs must never race for one output file
        if let Some(output) = template.output_for(input, output_dir) {
            if let Some(owner) = claimed.get(&output) {
                warn!(
                    input = %input.display(),
                    output = %output.display(),
                    "Output already claimed by {}", owner.display()
                );
                metrics::record_batch_file(false);
                slots[index] = Some(rejected(
                    input.clone(),
                    &WorkerError::invalid_input(format!(
                        "output {} is already written by {}",
                        output.display(),
                        owner.display()
                    )),
                ));
                continue;
            }
            claimed.insert(output, input.clone());
        }

        let request = template.request_for(input.clone());
        let runner = Arc::clone(&runner);
        let semaphore = Arc::clone(&semaphore);
        let output_dir = output_dir.to_path_buf();
        let cancel = cancel.clone();

        tasks.spawn(async move {
            // The semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = runner.run_request(request, &output_dir, cancel).await;
            (index, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                metrics::record_batch_file(outcome.is_success());
                slots[index] = Some(outcome);
            }
            Err(e) => error!("Batch task panicked: {}", e),
        }
    }

    let outcomes: Vec<JobOutcome> = slots
        .into_iter()
        .zip(videos)
        .map(|(slot, input)| {
            slot.unwrap_or_else(|| {
                metrics::record_batch_file(false);
                rejected(
                    input,
                    &WorkerError::Io(std::io::Error::other("job task aborted")),
                )
            })
        })
        .collect();

    let report = BatchReport {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        outcomes,
    };

    for outcome in &report.outcomes {
        if let Some((kind, message)) = outcome.failure() {
            info!(
                input = %outcome.input.display(),
                kind = kind.as_str(),
                "Batch file failed: {}", message
            );
        }
    }
    logger.log_completion(&format!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    ));

    Ok(report)
}
