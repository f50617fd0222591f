mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{words, FakeEncoder, FakeTranscriber, Workspace};
use vtext_models::{
    AnimationSpec, FailureKind, JobRequest, JobState, OutputMode, TextSourceRequest,
    TextStyleRequest,
};
use vtext_worker::WorkerConfig;

fn manual(input: std::path::PathBuf, text: &str) -> JobRequest {
    JobRequest {
        input,
        output: None,
        style: TextStyleRequest::default(),
        text: TextSourceRequest::Manual {
            text: text.to_string(),
        },
        animation: AnimationSpec::default(),
        mode: OutputMode::Full,
        encoding: None,
    }
}

fn captions(input: std::path::PathBuf) -> JobRequest {
    JobRequest {
        text: TextSourceRequest::Captions {
            limits: Default::default(),
        },
        ..manual(input, "unused")
    }
}

fn state_names(states: &[JobState]) -> Vec<&'static str> {
    states.iter().map(|s| s.as_str()).collect()
}

#[tokio::test]
async fn test_manual_job_runs_to_done() {
    let ws = Workspace::new();
    let input = ws.video("clip.mp4");
    let encoder = Arc::new(FakeEncoder::default());
    let runner = ws.runner(ws.config(), None, encoder.clone(), true);

    let outcome = runner
        .run_request(manual(input.clone(), "Hello\nWorld"), &ws.output_dir(), None)
        .await;

    assert!(outcome.is_success(), "unexpected outcome: {:?}", outcome.state);
    assert_eq!(
        state_names(&outcome.transitions),
        vec!["created", "style_resolving", "composing", "encoding", "done"]
    );
    assert_eq!(outcome.output(), Some(ws.output_dir().join("overlay_clip.mp4").as_path()));
    assert_eq!(ws.outputs(), vec!["overlay_clip.mp4"]);

    let request = encoder.last_request().unwrap();
    assert_eq!(request.input, input);
    assert!(request.has_audio);
    assert!(request.timeout_secs.is_none());
    assert_eq!(request.plan.cues.len(), 1);
    assert_eq!(request.plan.cues[0].text, "Hello\nWorld");
    // Requested Arial resolves to the indexed DejaVu Sans file
    assert!(request.plan.font.path.ends_with("DejaVuSans.ttf"));

    // The placeholder font cannot be parsed, so metrics are estimated
    assert!(outcome.warnings.iter().any(|w| w.contains("estimated")));
    assert_eq!(ws.scratch_dirs(), 0);
}

#[tokio::test]
async fn test_preview_uses_preview_timeout_and_name() {
    let ws = Workspace::new();
    let input = ws.video("clip.mov");
    let encoder = Arc::new(FakeEncoder::default());
    let runner = ws.runner(ws.config(), None, encoder.clone(), true);

    let request = JobRequest {
        mode: OutputMode::preview(),
        ..manual(input, "Preview")
    };
    let outcome = runner.run_request(request, &ws.output_dir(), None).await;

    assert!(outcome.is_success());
    assert_eq!(ws.outputs(), vec!["preview_clip.mp4"]);
    let request = encoder.last_request().unwrap();
    assert_eq!(request.timeout_secs, Some(120));
    assert!((request.plan.duration - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_captions_without_transcriber_fail_cleanly() {
    let ws = Workspace::new();
    let input = ws.video("talk.mp4");
    let encoder = Arc::new(FakeEncoder::default());
    let runner = ws.runner(ws.config(), None, encoder.clone(), true);

    let outcome = runner.run_request(captions(input), &ws.output_dir(), None).await;

    let (kind, _) = outcome.failure().unwrap();
    assert_eq!(kind, FailureKind::TranscriptionUnavailable);
    assert_eq!(
        state_names(&outcome.transitions),
        vec!["created", "style_resolving", "composing", "failed"]
    );
    assert_eq!(encoder.request_count(), 0);
    assert!(ws.outputs().is_empty());
    assert_eq!(ws.scratch_dirs(), 0);
}

#[tokio::test]
async fn test_captions_with_service_down() {
    let ws = Workspace::new();
    let input = ws.video("talk.mp4");
    let encoder = Arc::new(FakeEncoder::default());
    let runner = ws.runner(ws.config(), Some(FakeTranscriber::Down), encoder.clone(), true);

    let outcome = runner.run_request(captions(input), &ws.output_dir(), None).await;

    let (kind, message) = outcome.failure().unwrap();
    assert_eq!(kind, FailureKind::TranscriptionUnavailable);
    assert!(message.contains("503"), "message: {}", message);
    assert!(ws.outputs().is_empty());
}

#[tokio::test]
async fn test_captions_require_audio_track() {
    let ws = Workspace::new();
    let input = ws.video("silent.mp4");
    let transcriber = FakeTranscriber::Words(words(&[("hi", 0.0, 0.5)]));
    let runner = ws.runner(ws.config(), Some(transcriber), Arc::new(FakeEncoder::default()), false);

    let outcome = runner.run_request(captions(input), &ws.output_dir(), None).await;

    assert_eq!(
        outcome.failure().map(|(kind, _)| kind),
        Some(FailureKind::TranscriptionUnavailable)
    );
    assert!(ws.outputs().is_empty());
}

#[tokio::test]
async fn test_captions_become_cues() {
    let ws = Workspace::new();
    let input = ws.video("talk.mp4");
    let transcriber = FakeTranscriber::Words(words(&[
        ("Hello", 0.0, 0.4),
        ("world", 0.4, 0.9),
        ("again", 6.0, 6.5),
        ("broken", 7.0, 6.9),
    ]));
    let encoder = Arc::new(FakeEncoder::default());
    let runner = ws.runner(ws.config(), Some(transcriber), encoder.clone(), true);

    let outcome = runner.run_request(captions(input), &ws.output_dir(), None).await;

    assert!(outcome.is_success(), "unexpected outcome: {:?}", outcome.state);
    let plan = encoder.last_request().unwrap().plan;
    let texts: Vec<String> = plan.cues.iter().map(|c| c.text.replace('\n', " ")).collect();
    assert_eq!(texts, vec!["Hello world", "again"]);
    assert!((plan.cues[0].start - 0.0).abs() < 1e-9);
    assert!((plan.cues[1].start - 6.0).abs() < 1e-9);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("dropped 1 transcript word")));
}

#[tokio::test]
async fn test_encoder_failure_leaves_no_output() {
    let ws = Workspace::new();
    let input = ws.video("bad.mp4");
    let encoder = Arc::new(FakeEncoder {
        fail_for: Some("bad".to_string()),
        ..Default::default()
    });
    let runner = ws.runner(ws.config(), None, encoder, true);

    let outcome = runner.run_request(manual(input, "Hi"), &ws.output_dir(), None).await;

    let (kind, message) = outcome.failure().unwrap();
    assert_eq!(kind, FailureKind::EncodingFailure);
    assert!(message.contains("Error while decoding stream"), "message: {}", message);
    assert_eq!(
        state_names(&outcome.transitions),
        vec!["created", "style_resolving", "composing", "encoding", "failed"]
    );
    assert!(ws.outputs().is_empty(), "left behind: {:?}", ws.outputs());
}

#[tokio::test]
async fn test_job_timeout() {
    let ws = Workspace::new();
    let input = ws.video("slow.mp4");
    let encoder = Arc::new(FakeEncoder {
        delay: Some(Duration::from_secs(5)),
        ..Default::default()
    });
    let config = WorkerConfig {
        job_timeout: Duration::from_millis(100),
        ..ws.config()
    };
    let runner = ws.runner(config, None, encoder, true);

    let outcome = runner.run_request(manual(input, "Hi"), &ws.output_dir(), None).await;

    assert_eq!(outcome.failure().map(|(kind, _)| kind), Some(FailureKind::Timeout));
    assert!(ws.outputs().is_empty());
    assert_eq!(ws.scratch_dirs(), 0);
}

#[tokio::test]
async fn test_job_cancellation() {
    let ws = Workspace::new();
    let input = ws.video("slow.mp4");
    let encoder = Arc::new(FakeEncoder {
        delay: Some(Duration::from_secs(5)),
        ..Default::default()
    });
    let runner = ws.runner(ws.config(), None, encoder, true);

    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(true);
    });

    let outcome = runner
        .run_request(manual(input, "Hi"), &ws.output_dir(), Some(rx))
        .await;

    assert_eq!(outcome.failure().map(|(kind, _)| kind), Some(FailureKind::Cancelled));
    assert!(ws.outputs().is_empty());
}

#[tokio::test]
async fn test_missing_input_is_invalid() {
    let ws = Workspace::new();
    let runner = ws.runner(ws.config(), None, Arc::new(FakeEncoder::default()), true);

    let outcome = runner
        .run_request(manual(ws.input_dir().join("gone.mp4"), "Hi"), &ws.output_dir(), None)
        .await;

    assert_eq!(outcome.failure().map(|(kind, _)| kind), Some(FailureKind::InvalidInput));
    assert_eq!(
        state_names(&outcome.transitions),
        vec!["created", "style_resolving", "composing", "failed"]
    );
}

#[tokio::test]
async fn test_validation_failure_never_starts() {
    let ws = Workspace::new();
    let input = ws.video("clip.mp4");
    let encoder = Arc::new(FakeEncoder::default());
    let runner = ws.runner(ws.config(), None, encoder.clone(), true);

    let outcome = runner.run_request(manual(input, "  \n "), &ws.output_dir(), None).await;

    assert_eq!(outcome.failure().map(|(kind, _)| kind), Some(FailureKind::InvalidInput));
    assert_eq!(state_names(&outcome.transitions), vec!["created", "failed"]);
    assert_eq!(encoder.request_count(), 0);
}

#[tokio::test]
async fn test_font_resolution_failure() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.fonts_dir().join("DejaVuSans.ttf")).unwrap();
    let input = ws.video("clip.mp4");
    let runner = ws.runner(ws.config(), None, Arc::new(FakeEncoder::default()), true);

    let outcome = runner.run_request(manual(input, "Hi"), &ws.output_dir(), None).await;

    assert_eq!(
        outcome.failure().map(|(kind, _)| kind),
        Some(FailureKind::FontResolution)
    );
    assert_eq!(
        state_names(&outcome.transitions),
        vec!["created", "style_resolving", "failed"]
    );
    assert!(ws.outputs().is_empty());
}
