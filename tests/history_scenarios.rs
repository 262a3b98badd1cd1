//! History store behavior: eviction, ordering, rendering, export

use redraft::{
    align, escape, ChangeEntry, ExportFormat, HistoryRecord, HistoryStore, InMemoryPersistence,
    PersistenceBackend, SpanKind,
};
use std::sync::Arc;

fn record(label: &str, original: &str, result: &str) -> HistoryRecord {
    HistoryRecord::new(
        label.to_string(),
        original.to_string(),
        result.to_string(),
        "mock".to_string(),
        vec![],
    )
}

#[tokio::test]
async fn test_capacity_two_keeps_the_two_newest() {
    let mut store = HistoryStore::new(2);
    store.append(record("R1", "a", "b"));
    store.append(record("R2", "b", "c"));
    store.append(record("R3", "c", "d"));

    let labels: Vec<&str> = store.list().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["R3", "R2"]);
}

#[tokio::test]
async fn test_record_diff_matches_standalone_alignment() {
    let record = record("Grammar", "the cat sat", "the big cat sat");
    let spans = record.diff();

    assert_eq!(spans, align(&escape("the cat sat"), &escape("the big cat sat")));
    assert_eq!(spans[1].kind, SpanKind::Inserted);
    assert_eq!(spans[1].tokens, vec!["big"]);
}

#[tokio::test]
async fn test_export_json_round_trips_records() {
    let mut store = HistoryStore::new(10);
    let mut with_changes = record("Grammar", "teh cat", "the cat");
    with_changes.changes.push(ChangeEntry {
        original: "teh".to_string(),
        corrected: "the".to_string(),
        reason: "spelling".to_string(),
    });
    store.append(with_changes);

    let bytes = store.export(ExportFormat::Json).unwrap();
    let decoded: Vec<HistoryRecord> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].label, "Grammar");
    assert_eq!(decoded[0].changes[0].reason, "spelling");
}

#[tokio::test]
async fn test_export_csv_quotes_multiline_text() {
    let mut store = HistoryStore::new(10);
    store.append(record("Tone", "line one\nline two", "calm, short"));

    let bytes = store.export(ExportFormat::Csv).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(text.starts_with("date,time,type,"));
    assert!(text.contains("\"line one\nline two\""));
    assert!(text.contains("\"calm, short\""));
}

#[tokio::test]
async fn test_persisted_records_survive_a_restart() {
    let backend: Arc<dyn PersistenceBackend> = Arc::new(InMemoryPersistence::new());

    {
        let mut store = HistoryStore::with_persistence(10, backend.clone());
        store.append(record("Step 1", "draft", "revised"));
        store.flush().await;
    }

    let mut restarted = HistoryStore::with_persistence(10, backend);
    restarted.load().await;
    assert_eq!(restarted.len(), 1);
    assert_eq!(restarted.list().next().unwrap().label, "Step 1");
}

#[tokio::test]
async fn test_clear_also_clears_the_backend() {
    let backend: Arc<dyn PersistenceBackend> = Arc::new(InMemoryPersistence::new());

    let mut store = HistoryStore::with_persistence(10, backend.clone());
    store.append(record("R1", "a", "b"));
    store.flush().await;

    store.clear();
    store.flush().await;

    assert!(store.is_empty());
    assert!(backend.load_all().await.unwrap().is_empty());
}
