//! Integration tests for the upload queue lifecycle.

use std::path::PathBuf;

use drophub_core::error::ErrorKind;
use drophub_entity::upload::UploadStatus;
use drophub_queue::QueueEvent;
use drophub_store::RecordStore;

use crate::helpers::{self, candidate, candidate_with_source};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<QueueEvent>) -> Vec<QueueEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_enqueue_accepts_valid_and_rejects_invalid() {
    let (queue, store) = helpers::test_queue();
    let mut rx = queue.subscribe();

    let report = queue
        .enqueue(vec![
            candidate("photo.png", 1024, "image/png"),
            candidate("huge.png", 11_534_336, "image/png"),
            candidate("tool.exe", 1024, "application/x-msdownload"),
        ])
        .await
        .unwrap();

    assert_eq!(report.queued.len(), 1);
    assert_eq!(report.queued[0].name, "photo.png");
    assert_eq!(report.queued[0].status, UploadStatus::Pending);

    assert_eq!(report.rejected.len(), 2);
    assert_eq!(report.rejected[0].0, "huge.png");
    assert_eq!(
        report.rejected[0].1,
        "File size exceeds 10MB limit. Current size: 11.00MB"
    );
    assert_eq!(report.rejected[1].0, "tool.exe");
    assert!(report.rejected[1].1.contains("is not allowed"));

    // Only the accepted file reached the store.
    assert_eq!(store.list(None).await.unwrap().len(), 1);

    let events = drain(&mut rx);
    assert!(matches!(events[0], QueueEvent::Queued { .. }));
    assert!(matches!(events[1], QueueEvent::Rejected { .. }));
    assert!(matches!(events[2], QueueEvent::Rejected { .. }));
}

#[tokio::test]
async fn test_enqueue_continues_past_create_failure() {
    let (queue, store) = helpers::flaky_create_queue(2);
    let mut rx = queue.subscribe();

    let report = queue
        .enqueue(vec![
            candidate("a.png", 1024, "image/png"),
            candidate("b.png", 1024, "image/png"),
            candidate("c.png", 1024, "image/png"),
        ])
        .await
        .unwrap();

    // The failed create becomes a notice; the batch keeps going.
    assert_eq!(report.queued.len(), 2);
    assert_eq!(report.queued[0].name, "a.png");
    assert_eq!(report.queued[1].name, "c.png");
    assert_eq!(
        report.rejected,
        vec![(
            "b.png".to_string(),
            "STORE: Record store unavailable".to_string()
        )]
    );

    let events = drain(&mut rx);
    assert!(matches!(events[0], QueueEvent::Queued { .. }));
    assert!(
        matches!(&events[1], QueueEvent::Rejected { name, .. } if name == "b.png"),
        "expected a rejected notice for the failed create"
    );
    assert!(matches!(events[2], QueueEvent::Queued { .. }));

    assert_eq!(store.list(None).await.unwrap().len(), 2);
    assert_eq!(queue.snapshot().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_happy_path_emits_exact_event_sequence() {
    let (queue, store) = helpers::test_queue();
    let mut rx = queue.subscribe();

    let id = queue
        .enqueue(vec![candidate("a.png", 1024, "image/png")])
        .await
        .unwrap()
        .queued[0]
        .id;

    let report = queue.start_all().await.unwrap();
    assert_eq!(report.completed, 1);
    assert!(report.failed.is_empty());

    let mut expected = vec![
        QueueEvent::Queued {
            id,
            name: "a.png".to_string(),
        },
        QueueEvent::BatchStarted {
            session: report.session,
            entries: 1,
        },
        QueueEvent::StateChanged {
            id,
            from: UploadStatus::Pending,
            to: UploadStatus::Uploading,
        },
    ];
    for percent in (0u8..=100).step_by(10) {
        expected.push(QueueEvent::Progress { id, percent });
    }
    expected.push(QueueEvent::StateChanged {
        id,
        from: UploadStatus::Uploading,
        to: UploadStatus::Completed,
    });
    expected.push(QueueEvent::BatchFinished {
        completed: 1,
        failed: 0,
    });

    assert_eq!(drain(&mut rx), expected);

    let entry = store.get(id).await.unwrap();
    assert_eq!(entry.status, UploadStatus::Completed);
    assert_eq!(entry.progress, 100);
    assert_eq!(entry.url, Some(format!("/uploads/file-{id}")));
    assert!(entry.uploaded_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_batch_runs_sequentially_in_arrival_order() {
    let (queue, _store) = helpers::test_queue();

    let report = queue
        .enqueue(vec![
            candidate("a.png", 100, "image/png"),
            candidate("b.png", 200, "image/png"),
            candidate("c.png", 300, "image/png"),
        ])
        .await
        .unwrap();
    let ids: Vec<_> = report.queued.iter().map(|e| e.id).collect();

    let mut rx = queue.subscribe();
    let batch = queue.start_all().await.unwrap();
    assert_eq!(batch.completed, 3);

    // Progress for each entry is contiguous: one transfer at a time,
    // in the order the files were offered.
    let progress_ids: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            QueueEvent::Progress { id, .. } => Some(id),
            _ => None,
        })
        .collect();

    let mut expected = Vec::new();
    for id in &ids {
        expected.extend(std::iter::repeat_n(*id, 11));
    }
    assert_eq!(progress_ids, expected);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_flight_reverts_and_restarts_from_zero() {
    let (queue, store) = helpers::test_queue();
    let id = queue
        .enqueue(vec![candidate("a.png", 1024, "image/png")])
        .await
        .unwrap()
        .queued[0]
        .id;

    let mut rx = queue.subscribe();
    let runner = tokio::spawn({
        let queue = queue.clone();
        async move { queue.start_all().await }
    });

    // Cancel once the transfer reports 30%.
    loop {
        if let QueueEvent::Progress { percent: 30, .. } = rx.recv().await.unwrap() {
            break;
        }
    }
    assert!(queue.cancel(id).await);

    let report = runner.await.unwrap().unwrap();
    assert_eq!(report.completed, 0);
    assert_eq!(report.cancelled, 1);

    let entry = store.get(id).await.unwrap();
    assert_eq!(entry.status, UploadStatus::Pending);
    assert_eq!(entry.progress, 0);

    // The entry is still queued; a new batch starts it over from zero.
    let mut rx = queue.subscribe();
    let report = queue.start_all().await.unwrap();
    assert_eq!(report.completed, 1);

    let first_progress = drain(&mut rx).into_iter().find_map(|event| match event {
        QueueEvent::Progress { percent, .. } => Some(percent),
        _ => None,
    });
    assert_eq!(first_progress, Some(0));
}

#[tokio::test]
async fn test_cancel_is_a_noop_outside_uploading() {
    let (queue, _store) = helpers::test_queue();
    let id = queue
        .enqueue(vec![candidate("a.png", 1024, "image/png")])
        .await
        .unwrap()
        .queued[0]
        .id;

    assert!(!queue.cancel(id).await);
    assert!(!queue.cancel(drophub_core::types::EntryId::from_raw(404)).await);
}

#[tokio::test(start_paused = true)]
async fn test_only_one_batch_runs_at_a_time() {
    let (queue, _store) = helpers::test_queue();
    queue
        .enqueue(vec![candidate("a.png", 1024, "image/png")])
        .await
        .unwrap();

    let runner = tokio::spawn({
        let queue = queue.clone();
        async move { queue.start_all().await }
    });
    tokio::task::yield_now().await;

    let err = queue.start_all().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);

    runner.await.unwrap().unwrap();

    // The guard releases once the batch is done.
    let report = queue.start_all().await.unwrap();
    assert_eq!(report.completed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_marks_error_and_batch_continues() {
    let (queue, store) = helpers::flaky_queue(1);
    let report = queue
        .enqueue(vec![
            candidate("a.png", 100, "image/png"),
            candidate("b.png", 200, "image/png"),
        ])
        .await
        .unwrap();
    let ids: Vec<_> = report.queued.iter().map(|e| e.id).collect();

    let batch = queue.start_all().await.unwrap();
    assert_eq!(batch.completed, 1);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(batch.failed[0].0, ids[0]);

    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot[0].status, UploadStatus::Error);
    assert_eq!(snapshot[0].progress, 0);
    assert_eq!(snapshot[1].status, UploadStatus::Completed);

    // The failure was persisted too.
    assert_eq!(
        store.get(ids[0]).await.unwrap().status,
        UploadStatus::Error
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_discards_failed_attempt_and_requeues() {
    let (queue, store) = helpers::flaky_queue(1);
    let old_id = queue
        .enqueue(vec![candidate_with_source("a.png", 1024, "image/png")])
        .await
        .unwrap()
        .queued[0]
        .id;

    let batch = queue.start_all().await.unwrap();
    assert_eq!(batch.failed.len(), 1);

    let fresh = queue.retry(old_id).await.unwrap();
    assert_ne!(fresh.id, old_id);
    assert_eq!(fresh.name, "a.png");
    assert_eq!(fresh.status, UploadStatus::Pending);
    assert_eq!(fresh.progress, 0);

    // The failed record is gone; the payload handle moved to the
    // fresh entry.
    assert!(store.get(old_id).await.unwrap_err().is_not_found());
    assert_eq!(
        queue.source_handle(fresh.id).await,
        Some(PathBuf::from("/tmp/a.png"))
    );

    // Retry only applies to failed entries.
    let err = queue.retry(fresh.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let batch = queue.start_all().await.unwrap();
    assert_eq!(batch.completed, 1);
    assert_eq!(
        store.get(fresh.id).await.unwrap().status,
        UploadStatus::Completed
    );
}

#[tokio::test(start_paused = true)]
async fn test_remove_deletes_entry_and_record() {
    let (queue, store) = helpers::test_queue();
    let id = queue
        .enqueue(vec![candidate("a.png", 1024, "image/png")])
        .await
        .unwrap()
        .queued[0]
        .id;
    queue.start_all().await.unwrap();

    queue.remove(id).await.unwrap();
    assert!(queue.snapshot().await.is_empty());
    assert!(store.get(id).await.unwrap_err().is_not_found());

    // Removing again reports the missing record.
    assert!(queue.remove(id).await.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_empties_queue_but_keeps_history() {
    let (queue, store) = helpers::test_queue();
    queue
        .enqueue(vec![
            candidate("a.png", 100, "image/png"),
            candidate("b.png", 200, "image/png"),
        ])
        .await
        .unwrap();
    queue.start_all().await.unwrap();

    assert_eq!(queue.clear_all().await, 2);
    assert!(queue.snapshot().await.is_empty());
    assert_eq!(queue.summary().await.total, 0);

    // Completed records survive as history.
    let completed = store.list(Some(UploadStatus::Completed)).await.unwrap();
    assert_eq!(completed.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_batch_opens_and_closes_a_session() {
    let (queue, store) = helpers::test_queue();
    let report = queue
        .enqueue(vec![
            candidate("a.png", 100, "image/png"),
            candidate("b.png", 200, "image/png"),
        ])
        .await
        .unwrap();
    let ids: Vec<_> = report.queued.iter().map(|e| e.id).collect();

    let batch = queue.start_all().await.unwrap();
    let session_id = batch.session.expect("batch session");

    // Re-stamping returns the stored session; the batch already
    // closed it once.
    let session = store.complete_session(session_id).await.unwrap();
    assert_eq!(session.entry_ids, ids);
    assert_eq!(session.total_size_bytes, 300);
    assert!(session.completed_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_summary_after_batch() {
    let (queue, _store) = helpers::flaky_queue(1);
    queue
        .enqueue(vec![
            candidate("a.png", 100, "image/png"),
            candidate("b.png", 300, "image/png"),
        ])
        .await
        .unwrap();
    queue.start_all().await.unwrap();

    let summary = queue.summary().await;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total_bytes, 400);
    assert_eq!(summary.completed_bytes, 300);
    assert_eq!(summary.overall_percent, 50.0);
}
