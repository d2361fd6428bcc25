//! Integration tests for the mutex-guarded essay store

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinSet;

use redink::models::{EssayRecord, ReviewStatus};
use redink::services::{EvaluationCriteria, FeedbackScores, GeneratedFeedback};
use redink::store::EssayStore;
use redink::Error;

fn sample_criteria() -> EvaluationCriteria {
    EvaluationCriteria {
        lesson_id: "S1_TEST_001".to_string(),
        achievement_standard: "[6국01-07] 상대가 처한 상황을 이해하고 공감하며 듣는 태도를 지닌다.".to_string(),
        text_description: "의견 존중에 관한 지문".to_string(),
    }
}

fn sample_generated() -> GeneratedFeedback {
    GeneratedFeedback {
        feedback: "따뜻한 공감과 격려의 피드백".to_string(),
        achievement_explanation: "[6국01-07] 기준에 따른 근거".to_string(),
        revised_text: "다듬어진 글".to_string(),
        scores: FeedbackScores {
            vocabulary: 4,
            grammar: 3,
            logic: 4,
            empathy: 5,
        },
    }
}

fn sample_record(process_id: &str) -> EssayRecord {
    let mut record = EssayRecord::draft(
        "나는 친구의 의견을 존중하고 싶다.",
        &sample_criteria(),
        &sample_generated(),
        "mock-model",
    );
    record.process.process_id = process_id.to_string();
    record
}

// ============================================================================
// Read behavior
// ============================================================================

#[tokio::test]
async fn test_read_all_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = EssayStore::new(dir.path().join("essays.json"));

    assert!(store.read_all().await.is_empty());
}

#[tokio::test]
async fn test_append_then_read_all_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = EssayStore::new(dir.path().join("essays.json"));

    store.append(sample_record("proc_20240101_000000_abcdef")).await.unwrap();

    let records = store.read_all().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].process_id(), "proc_20240101_000000_abcdef");
    assert_eq!(records[0].process.status, ReviewStatus::Drafted);
    assert_eq!(records[0].evaluation.dimensions.empathy.value, 5);
}

#[tokio::test]
async fn test_corrupt_document_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("essays.json");
    std::fs::write(&path, "{this is not json").unwrap();

    let store = EssayStore::new(path);
    assert!(store.read_all().await.is_empty());
}

#[tokio::test]
async fn test_single_object_document_is_folded_into_collection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("essays.json");

    // A document holding one bare record object instead of an array.
    let record = sample_record("proc_20240101_000000_solo01");
    std::fs::write(&path, serde_json::to_string_pretty(&record).unwrap()).unwrap();

    let store = EssayStore::new(path);
    let records = store.read_all().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].process_id(), "proc_20240101_000000_solo01");
}

// ============================================================================
// Locate-and-mutate
// ============================================================================

#[tokio::test]
async fn test_locate_and_mutate_unknown_id_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = EssayStore::new(dir.path().join("essays.json"));
    store.append(sample_record("proc_20240101_000000_aaaaaa")).await.unwrap();

    let before = serde_json::to_value(store.read_all().await).unwrap();

    let result = store
        .locate_and_mutate("proc_20240101_000000_zzzzzz", |record| {
            record.process.status = ReviewStatus::Completed;
        })
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));

    let after = serde_json::to_value(store.read_all().await).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_locate_and_mutate_applies_and_refreshes_updated_at() {
    let dir = TempDir::new().unwrap();
    let store = EssayStore::new(dir.path().join("essays.json"));
    store.append(sample_record("proc_20240101_000000_aaaaaa")).await.unwrap();

    let before = store.read_all().await[0].metadata.updated_at;
    tokio::time::sleep(Duration::from_millis(5)).await;

    store
        .locate_and_mutate("proc_20240101_000000_aaaaaa", |record| {
            record.process.status = ReviewStatus::Completed;
        })
        .await
        .unwrap();

    let records = store.read_all().await;
    assert_eq!(records[0].process.status, ReviewStatus::Completed);
    assert!(records[0].metadata.updated_at > before);
}

// ============================================================================
// Concurrency: no lost updates
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(EssayStore::new(dir.path().join("essays.json")));

    let mut join_set = JoinSet::new();
    for i in 0..16 {
        let store_clone = Arc::clone(&store);
        join_set.spawn(async move {
            let id = format!("proc_20240101_000000_{:06x}", i);
            store_clone.append(sample_record(&id)).await.unwrap();
        });
    }

    while let Some(result) = join_set.join_next().await {
        result.expect("append task panicked");
    }

    let records = store.read_all().await;
    assert_eq!(records.len(), 16);

    let mut ids: Vec<String> = records.iter().map(|r| r.process_id().to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16, "appends were lost or ids collided");
}
