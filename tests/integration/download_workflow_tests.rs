/*!
 * Integration tests for complete download runs against a scripted API
 */

use anyhow::Result;
use std::fs;
use std::time::Duration;

use cijsubs::app_controller::{Controller, ItemOutcome, ItemStatus};
use cijsubs::errors::AppError;
use cijsubs::selection::{parse, Selection};
use crate::common::{self, RecordingSleeper, StubSource};

/// Test the reference single-video scenario
#[tokio::test]
async fn test_run_withSingleVideo_shouldWriteVttAndText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("transcripts");
    let source = StubSource::new()
        .respond(common::catalog_url(), common::catalog_json(&[(1, "あ", "A", Some(10))]))
        .respond(common::transcript_url(10), common::transcript_json(&[(0.0, 1.5, "Hi", false)]));
    let controller = Controller::with_parts(common::test_config(&output_dir), source, RecordingSleeper::new());

    let summary = controller.run(&parse("1")?).await?;

    assert_eq!(summary.outcomes, vec![ItemOutcome { id: 1, status: ItemStatus::Success }]);
    let vtt = fs::read_to_string(output_dir.join("0001 あ | A.vtt"))?;
    assert_eq!(vtt, "WEBVTT\n\n0\n00:00:00.000 --> 00:00:01.500\nHi\n\n");
    let txt = fs::read_to_string(output_dir.join("0001 あ | A.txt"))?;
    assert_eq!(txt, "Hi");
    Ok(())
}

/// Test that a second run over the same IDs makes no transcript requests
#[tokio::test]
async fn test_run_withEverythingOnDisk_shouldSkipAllFetches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().to_path_buf();
    common::create_test_file(&output_dir, "0001 あ | A.vtt", "WEBVTT\n\n")?;
    common::create_test_file(&output_dir, "0002 い | I.vtt", "WEBVTT\n\n")?;

    let source = StubSource::new()
        .respond(common::catalog_url(), common::catalog_json(&[
            (1, "あ", "A", Some(10)),
            (2, "い", "I", Some(20)),
        ]));
    let sleeper = RecordingSleeper::new();
    let controller = Controller::with_parts(common::test_config(&output_dir), source.clone(), sleeper.clone());

    let summary = controller.run(&parse("1-2")?).await?;

    assert!(summary.outcomes.is_empty());
    assert_eq!(source.calls(), vec![common::catalog_url()]);
    assert!(sleeper.delays().is_empty());
    Ok(())
}

/// Test that one failing video neither stops the run nor skips the pause
#[tokio::test]
async fn test_run_withFailingTranscript_shouldContinueWithNextVideo() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().to_path_buf();
    let source = StubSource::new()
        .respond(common::catalog_url(), common::catalog_json(&[
            (1, "あ", "A", Some(10)),
            (2, "い", "I", Some(20)),
            (3, "う", "U", Some(30)),
        ]))
        .fail(common::transcript_url(10), "HTTP status server error (500 Internal Server Error)")
        .respond(common::transcript_url(20), serde_json::json!({"data": {"cues": [{"text": "no timing"}]}}))
        .respond(common::transcript_url(30), common::transcript_json(&[(0.0, 1.0, "う", true)]));
    let sleeper = RecordingSleeper::new();
    let mut config = common::test_config(&output_dir);
    config.max_retries = 2;
    let controller = Controller::with_parts(config, source.clone(), sleeper.clone());

    let summary = controller.run(&Selection::All).await?;

    assert_eq!(summary.outcomes.len(), 3);
    assert!(matches!(&summary.outcomes[0].status, ItemStatus::Failed(reason) if reason.contains("after 2 attempts")));
    assert!(matches!(&summary.outcomes[1].status, ItemStatus::Failed(reason) if reason.contains("Malformed transcript")));
    assert_eq!(summary.outcomes[2], ItemOutcome { id: 3, status: ItemStatus::Success });
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 2);

    assert_eq!(source.call_count(&common::transcript_url(10)), 2);
    assert_eq!(fs::read_to_string(output_dir.join("0003 う | U.txt"))?, "\nう");
    assert!(!output_dir.join("0001 あ | A.vtt").exists());

    // One backoff sleep for video 1, then one pacing pause per video
    let pauses: Vec<Duration> = sleeper.delays()
        .into_iter()
        .filter(|d| *d == Duration::from_millis(200))
        .collect();
    assert_eq!(pauses.len(), 3);
    assert_eq!(sleeper.delays().len(), 4);
    Ok(())
}

/// Test that `all` only processes entries that have transcripts and are not on disk
#[tokio::test]
async fn test_run_withAll_shouldResolveAgainstCatalogAndDisk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().to_path_buf();
    common::create_test_file(&output_dir, "0002 い | I.vtt", "WEBVTT\n\n")?;
    common::create_test_file(&output_dir, "README.vtt", "")?;

    let source = StubSource::new()
        .respond(common::catalog_url(), common::catalog_json(&[
            (5, "お", "O", Some(50)),
            (2, "い", "I", Some(20)),
            (4, "え", "E", None),
            (1, "あ", "A", Some(10)),
        ]))
        .respond(common::transcript_url(50), common::transcript_json(&[(0.0, 1.0, "お", false)]))
        .respond(common::transcript_url(10), common::transcript_json(&[(0.0, 1.0, "あ", false)]));
    let controller = Controller::with_parts(common::test_config(&output_dir), source.clone(), RecordingSleeper::new());

    let summary = controller.run(&Selection::All).await?;

    let ids: Vec<u32> = summary.outcomes.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![5, 1]);
    assert_eq!(summary.failed(), 0);
    assert_eq!(
        source.calls(),
        vec![common::catalog_url(), common::transcript_url(50), common::transcript_url(10)]
    );
    Ok(())
}

/// Test that a catalog that cannot be fetched aborts the run
#[tokio::test]
async fn test_run_withCatalogFailure_shouldAbort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = StubSource::new().fail(common::catalog_url(), "connection refused");
    let mut config = common::test_config(temp_dir.path());
    config.max_retries = 3;
    let controller = Controller::with_parts(config, source.clone(), RecordingSleeper::new());

    let result = controller.run(&parse("1")?).await;

    assert!(matches!(result, Err(AppError::Fetch(ref e)) if e.attempts == 3));
    assert_eq!(source.calls().len(), 3);
    Ok(())
}

/// Test that an undecodable catalog aborts the run
#[tokio::test]
async fn test_run_withMalformedCatalog_shouldAbort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = StubSource::new().respond(common::catalog_url(), serde_json::json!({"modules": []}));
    let controller = Controller::with_parts(common::test_config(temp_dir.path()), source, RecordingSleeper::new());

    let result = controller.run(&parse("1")?).await;

    assert!(matches!(result, Err(AppError::Catalog(_))));
    Ok(())
}
