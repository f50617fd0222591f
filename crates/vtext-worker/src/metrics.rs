//! Job metrics.
//!
//! Recorded through the `metrics` facade; they are exported only when a
//! recorder is installed (the API server installs Prometheus).

use metrics::{counter, histogram};
use vtext_models::{FailureKind, OutputMode};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "vtext_jobs_total";
    pub const JOB_DURATION_SECONDS: &str = "vtext_job_duration_seconds";
    pub const JOB_FAILURES_TOTAL: &str = "vtext_job_failures_total";
    pub const FONT_FALLBACKS_TOTAL: &str = "vtext_font_fallbacks_total";
    pub const TRANSCRIPT_WORDS_DROPPED_TOTAL: &str = "vtext_transcript_words_dropped_total";
    pub const BATCH_FILES_TOTAL: &str = "vtext_batch_files_total";
}

/// Record a finished job.
pub fn record_job(mode: &OutputMode, failure: Option<FailureKind>, duration_secs: f64) {
    let status = if failure.is_some() { "failed" } else { "done" };
    let labels = [
        ("status", status.to_string()),
        ("mode", mode.as_str().to_string()),
    ];
    counter!(names::JOBS_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);

    if let Some(kind) = failure {
        let labels = [("kind", kind.as_str().to_string())];
        counter!(names::JOB_FAILURES_TOTAL, &labels).increment(1);
    }
}

/// Record a font resolution that did not use the requested family.
pub fn record_font_fallback(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::FONT_FALLBACKS_TOTAL, &labels).increment(1);
}

pub fn record_dropped_words(count: usize) {
    counter!(names::TRANSCRIPT_WORDS_DROPPED_TOTAL).increment(count as u64);
}

/// Record one processed batch file.
pub fn record_batch_file(success: bool) {
    let labels = [("status", if success { "done" } else { "failed" }.to_string())];
    counter!(names::BATCH_FILES_TOTAL, &labels).increment(1);
}
