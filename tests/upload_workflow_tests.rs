mod common;

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::{file, user, FakeAuth, Harness};
use drive_service::application::{
    drive_session::{UploadState, LOGIN_TO_UPLOAD},
    error::ApplicationError,
    upload::driver::UploadDriver,
};

#[tokio::test]
async fn uploads_run_one_after_another_in_queue_order() {
    let harness = Harness::signed_in(false);
    harness
        .drive
        .add_files(vec![file("a.png", 10), file("b.pdf", 20), file("c.mp3", 30)])
        .await
        .unwrap();

    let summary = harness.drive.upload_pending().await.unwrap();

    assert_eq!(summary.succeeded, vec!["a.png", "b.pdf", "c.mp3"]);
    assert_eq!(
        harness.log.entries(),
        vec![
            "upload-start:a.png",
            "upload-done:a.png",
            "upload-start:b.pdf",
            "upload-done:b.pdf",
            "upload-start:c.mp3",
            "upload-done:c.mp3",
        ]
    );
    assert_eq!(
        harness.storage.paths(),
        vec!["u1/a.png", "u1/b.pdf", "u1/c.mp3"]
    );
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one_hundred() {
    let harness = Harness::signed_in(false);
    let files = vec![file("a.bin", 1000), file("b.bin", 3000)];
    let driver = UploadDriver::new(harness.storage.clone(), None);
    let seen = Mutex::new(Vec::new());

    let summary = driver
        .run(
            Uuid::new_v4(),
            &user("u1"),
            &files,
            &CancellationToken::new(),
            |progress| seen.lock().unwrap().push(progress),
        )
        .await;

    let seen = seen.into_inner().unwrap();
    let percents: Vec<u8> = seen.iter().map(|p| p.percent).collect();

    assert_eq!(summary.succeeded.len(), 2);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{:?}", percents);
    assert!(seen.iter().all(|p| p.transferred_bytes <= p.total_bytes));
    assert!(percents.contains(&25));
    assert!(percents.contains(&63));
    assert_eq!(percents.last(), Some(&100));
}

#[tokio::test]
async fn a_failed_file_does_not_stop_the_pass() {
    let harness = Harness::signed_in(false);
    harness.storage.fail_upload_of("b.pdf");
    harness
        .drive
        .add_files(vec![file("a.png", 10), file("b.pdf", 20), file("c.mp3", 30)])
        .await
        .unwrap();

    let summary = harness.drive.upload_pending().await.unwrap();

    assert_eq!(summary.succeeded, vec!["a.png", "c.mp3"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "b.pdf");
    assert_eq!(summary.failed[0].message, "Payload too large");
    assert_eq!(summary.notification(), "Uploaded 2 of 3 files, 1 failed.");

    let status = harness.drive.upload_status();
    assert_eq!(status.state, UploadState::Finished);
    assert_eq!(status.progress.map(|p| p.percent), Some(100));
}

#[tokio::test]
async fn queue_is_emptied_after_the_pass_even_with_failures() {
    let harness = Harness::signed_in(false);
    harness.storage.fail_upload_of("a.png");
    harness
        .drive
        .add_files(vec![file("a.png", 10)])
        .await
        .unwrap();

    harness.drive.upload_pending().await.unwrap();

    assert!(harness.drive.queued_files().await.is_empty());
}

#[tokio::test]
async fn upload_requires_a_signed_in_user() {
    let harness = Harness::new(FakeAuth::signed_out(), false);
    harness
        .drive
        .add_files(vec![file("a.png", 10)])
        .await
        .unwrap();

    let error = harness.drive.upload_pending().await.unwrap_err();

    assert!(matches!(error, ApplicationError::Unauthorized(ref m) if m == LOGIN_TO_UPLOAD));
    assert!(harness.log.entries().is_empty());
    assert_eq!(harness.drive.queued_files().await.len(), 1);
}

#[tokio::test]
async fn empty_queue_is_rejected_without_touching_storage() {
    let harness = Harness::signed_in(false);

    let error = harness.drive.upload_pending().await.unwrap_err();

    assert!(matches!(error, ApplicationError::EmptyQueue));
    assert_eq!(error.to_string(), "Please select files to upload");
    assert!(harness.log.entries().is_empty());
}

#[tokio::test]
async fn cancelling_skips_the_remaining_files() {
    let harness = Harness::signed_in(false);
    harness.storage.stall_upload_of("b.bin");
    harness
        .drive
        .add_files(vec![file("a.bin", 10), file("b.bin", 10), file("c.bin", 10)])
        .await
        .unwrap();

    let mut status = harness.drive.subscribe_upload_status();
    harness.drive.start_upload().await.unwrap();

    status
        .wait_for(|s| {
            s.progress
                .as_ref()
                .and_then(|p| p.current_file.as_deref())
                == Some("b.bin")
        })
        .await
        .unwrap();
    assert!(harness.drive.cancel_upload().await);

    let finished = status
        .wait_for(|s| s.state == UploadState::Finished)
        .await
        .unwrap()
        .clone();
    let summary = finished.summary.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, vec!["a.bin"]);
    assert_eq!(summary.skipped, vec!["b.bin", "c.bin"]);
    assert!(!harness.log.entries().contains(&"upload-start:c.bin".to_string()));
    assert!(!harness.drive.cancel_upload().await);
}

#[tokio::test]
async fn queue_is_frozen_while_an_upload_runs() {
    let harness = Harness::signed_in(false);
    harness.storage.stall_upload_of("a.bin");
    harness
        .drive
        .add_files(vec![file("a.bin", 10)])
        .await
        .unwrap();

    let mut status = harness.drive.subscribe_upload_status();
    harness.drive.start_upload().await.unwrap();

    assert!(matches!(
        harness.drive.add_files(vec![file("late.bin", 1)]).await,
        Err(ApplicationError::UploadInProgress)
    ));
    assert!(matches!(
        harness.drive.remove_file("a.bin").await,
        Err(ApplicationError::UploadInProgress)
    ));
    assert!(matches!(
        harness.drive.start_upload().await,
        Err(ApplicationError::UploadInProgress)
    ));
    assert!(matches!(
        harness.drive.sign_out().await,
        Err(ApplicationError::UploadInProgress)
    ));

    harness.drive.cancel_upload().await;
    status
        .wait_for(|s| s.state == UploadState::Finished)
        .await
        .unwrap();

    harness
        .drive
        .add_files(vec![file("late.bin", 1)])
        .await
        .unwrap();
}

#[tokio::test]
async fn successful_uploads_are_recorded_in_the_metadata_store() {
    let harness = Harness::signed_in(true);
    harness
        .drive
        .add_files(vec![file("a.png", 10), file("b.pdf", 20)])
        .await
        .unwrap();

    harness.drive.upload_pending().await.unwrap();

    let records = harness.metadata.as_ref().unwrap().records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "a.png");
    assert_eq!(records[0].owner_id, "u1");
    assert_eq!(records[0].content_type, "image/png");
    assert_eq!(records[0].path, "u1/a.png");
    assert_eq!(records[1].size, 20);
}

#[tokio::test]
async fn metadata_failure_counts_as_a_failed_file() {
    let harness = Harness::signed_in(true);
    harness.metadata.as_ref().unwrap().fail_creates();
    harness
        .drive
        .add_files(vec![file("a.png", 10)])
        .await
        .unwrap();

    let summary = harness.drive.upload_pending().await.unwrap();

    assert!(summary.succeeded.is_empty());
    assert_eq!(summary.failed[0].name, "a.png");
}

#[tokio::test]
async fn duplicate_selections_are_queued_once() {
    let harness = Harness::signed_in(false);

    let first = harness
        .drive
        .add_files(vec![file("a.png", 10), file("a.png", 10)])
        .await
        .unwrap();
    let second = harness
        .drive
        .add_files(vec![file("a.png", 10), file("a.png", 11)])
        .await
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(harness.drive.queued_files().await.len(), 2);

    assert!(harness.drive.remove_file("a.png").await.unwrap());
    let remaining = harness.drive.queued_files().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].size(), 11);
    assert!(!harness.drive.remove_file("missing.txt").await.unwrap());
}

#[tokio::test]
async fn uploads_invalidate_the_cached_listing() {
    let harness = Harness::signed_in(false);
    let listing = harness.drive.list_files(&Default::default()).await.unwrap();
    assert!(listing.files.is_empty());

    harness
        .drive
        .add_files(vec![file("fresh.txt", 5)])
        .await
        .unwrap();
    harness.drive.upload_pending().await.unwrap();

    let listing = harness.drive.list_files(&Default::default()).await.unwrap();
    let names: Vec<_> = listing.files.iter().map(|e| e.record.name.as_str()).collect();
    assert_eq!(names, vec!["fresh.txt"]);
}

#[tokio::test]
async fn sign_out_clears_the_queue() {
    let harness = Harness::signed_in(false);
    harness
        .drive
        .add_files(vec![file("a.png", 10)])
        .await
        .unwrap();

    harness.drive.sign_out().await.unwrap();

    assert!(harness.drive.queued_files().await.is_empty());
    assert!(harness.drive.current_user().await.is_none());
}

#[tokio::test]
async fn a_crashed_pass_releases_the_queue() {
    let harness = Harness::signed_in(false);
    harness.storage.panic_on_upload_of("boom.bin");
    harness
        .drive
        .add_files(vec![file("boom.bin", 10)])
        .await
        .unwrap();

    harness.drive.start_upload().await.unwrap();
    let mut status = harness.drive.subscribe_upload_status();
    status
        .wait_for(|s| s.state == UploadState::Idle)
        .await
        .unwrap();

    assert!(!harness.drive.cancel_upload().await);
    harness
        .drive
        .add_files(vec![file("next.bin", 1)])
        .await
        .unwrap();
    assert_eq!(harness.drive.queued_files().await.len(), 2);
}
