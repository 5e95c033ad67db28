//! History file compatibility: files written by earlier versions and by hand.

use counterpoint_common::{Confidence, ConfidenceLevel, SocialSignal};
use counterpoint_verifier::HistoryStore;
use tempfile::TempDir;

const LEGACY_HISTORY: &str = r#"[
  {
    "timestamp": "2024-04-17 09:12:44",
    "topic": "Dubai storm",
    "confidence_score": 85,
    "report_html": "<div>report</div>",
    "x_intel_data": {
      "x_summary": "People share flood videos.",
      "viral_rumors": ["Cloud seeding caused it"],
      "sources": [{"handle": "@a", "link": "https://x.com/a/status/1", "text": "wow"}]
    }
  },
  {
    "timestamp": "2024-04-16 18:30:00",
    "topic": "Older run",
    "confidence_score": "N/A",
    "report_html": "",
    "x_intel_data": {"error": "Failed to parse social signal response: EOF", "raw": "partial"}
  },
  {
    "topic": "Hand edited",
    "x_intel_data": null
  }
]"#;

#[test]
fn reads_legacy_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, LEGACY_HISTORY).unwrap();
    let store = HistoryStore::new(&path);

    let entries = store.load_all();
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].confidence_score, Confidence::Score(85));
    assert!(matches!(entries[0].x_intel_data, Some(SocialSignal::Intel(_))));

    assert_eq!(entries[1].confidence_score, Confidence::Unscored("N/A".into()));
    match &entries[1].x_intel_data {
        Some(SocialSignal::Error(err)) => assert_eq!(err.raw.as_deref(), Some("partial")),
        other => panic!("expected error signal, got {other:?}"),
    }

    assert_eq!(entries[2].topic, "Hand edited");
    assert_eq!(entries[2].timestamp, "");
    assert!(entries[2].x_intel_data.is_none());
}

#[test]
fn string_scores_from_older_files_keep_their_level() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(
        &path,
        r#"[{"timestamp":"2024-04-17 09:12:44","topic":"A","confidence_score":"85","report_html":"","x_intel_data":null}]"#,
    )
    .unwrap();

    let entry = HistoryStore::new(&path).get_by_index(0).unwrap();
    assert_eq!(entry.confidence_score, Confidence::Score(85));
    assert_eq!(entry.confidence_score.level(), ConfidenceLevel::High);
}

#[test]
fn unusual_entries_survive_a_later_append() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(
        &path,
        r#"[
          {"timestamp":"2024-04-17 09:00:00","topic":"One","confidence_score":85,"report_html":"",
           "x_intel_data":{"x_summary":null,"viral_rumors":[],"sources":[]}},
          {"timestamp":"2024-04-16 09:00:00","topic":"Two","confidence_score":null,"report_html":"",
           "x_intel_data":"Grok said no"}
        ]"#,
    )
    .unwrap();
    let store = HistoryStore::new(&path);
    assert_eq!(store.load_all().len(), 2);

    store.append("New", Confidence::Score(10), "", None).unwrap();

    let topics: Vec<String> = store.load_all().into_iter().map(|e| e.topic).collect();
    assert_eq!(topics, vec!["New", "One", "Two"]);
}

#[test]
fn append_preserves_existing_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, LEGACY_HISTORY).unwrap();
    let store = HistoryStore::new(&path);

    store
        .append("New run", Confidence::Score(30), "<div/>", None)
        .unwrap();

    let entries = store.load_all();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].topic, "New run");
    assert_eq!(entries[1].topic, "Dubai storm");
    assert_eq!(entries[3].topic, "Hand edited");
}

#[test]
fn concurrent_appends_in_one_process_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let store = std::sync::Arc::new(HistoryStore::new(dir.path().join("history.json")));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .append(&format!("topic {i}"), Confidence::Score(i), "", None)
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.load_all().len(), 8);
}
