//! Application state.

use std::sync::Arc;

use vtext_media::StyleResolver;
use vtext_worker::{JobRunner, WorkerConfig, WorkerResult};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub runner: Arc<JobRunner>,
}

impl AppState {
    /// Create state with ffmpeg, fonts and transcription resolved from `worker`.
    pub fn new(config: ApiConfig, worker: WorkerConfig) -> WorkerResult<Self> {
        let runner = JobRunner::from_config(worker)?;
        Ok(Self::with_runner(config, runner))
    }

    pub fn with_runner(config: ApiConfig, runner: JobRunner) -> Self {
        Self {
            config,
            runner: Arc::new(runner),
        }
    }

    pub fn resolver(&self) -> &StyleResolver {
        self.runner.resolver()
    }
}
