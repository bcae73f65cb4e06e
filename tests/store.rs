use chrono::Utc;
use govgraph::chart::{ChartDefinition, ChartKind, ChartSeries, Dataset, Sector};
use govgraph::store::{
    Change, ChartStore, FileBackend, MemoryBackend, STORAGE_KEY, StorageBackend, StoreEvent,
};
use std::sync::{Arc, Mutex};

fn chart(id: &str, sector: Sector) -> ChartDefinition {
    ChartDefinition {
        id: id.to_string(),
        title: format!("Chart {}", id),
        description: String::new(),
        source: "test".to_string(),
        sector,
        kind: ChartKind::Bar,
        series: ChartSeries {
            labels: vec!["a".to_string()],
            datasets: vec![Dataset::new("v", vec![1.0])],
        },
        last_updated: Utc::now(),
    }
}

fn recorded(store: &ChartStore<MemoryBackend>) -> Arc<Mutex<Vec<StoreEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(Arc::new(move |event: &StoreEvent| {
        sink.lock().unwrap().push(event.clone());
    }));
    events
}

#[test]
fn empty_store_lists_nothing() {
    let store = ChartStore::new(MemoryBackend::new());
    assert!(store.list().is_empty());
    assert!(store.list_by_sector(Sector::Budget).is_empty());
}

#[test]
fn added_chart_appears_once_in_its_sector() {
    let store = ChartStore::new(MemoryBackend::new());
    store.add(chart("custom-1", Sector::Healthcare)).unwrap();
    store.add(chart("custom-2", Sector::Budget)).unwrap();

    let healthcare = store.list_by_sector(Sector::Healthcare);
    assert_eq!(healthcare.len(), 1);
    assert_eq!(healthcare[0].id, "custom-1");
    assert!(store.list_by_sector(Sector::Traffic).is_empty());

    let ids: Vec<String> = store.list().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["custom-1", "custom-2"]);
}

#[test]
fn remove_deletes_only_matching_id() {
    let store = ChartStore::new(MemoryBackend::new());
    store.add(chart("custom-1", Sector::Education)).unwrap();
    store.add(chart("custom-2", Sector::Education)).unwrap();

    store.remove("custom-1").unwrap();
    assert!(store.get("custom-1").is_none());
    assert!(store.get("custom-2").is_some());

    // removing an unknown id is not an error
    store.remove("custom-404").unwrap();
    assert_eq!(store.list().len(), 1);
}

#[test]
fn clear_drops_the_storage_key() {
    let store = ChartStore::new(MemoryBackend::new());
    store.add(chart("custom-1", Sector::Utilities)).unwrap();
    store.clear().unwrap();

    assert!(store.list().is_empty());
    assert_eq!(store.backend().read(STORAGE_KEY).unwrap(), None);
}

#[test]
fn corrupt_payload_reads_as_empty() {
    let backend = MemoryBackend::new();
    backend.write(STORAGE_KEY, "{not json").unwrap();
    let store = ChartStore::new(backend);
    assert!(store.list().is_empty());

    // the next write starts from the empty list
    store.add(chart("custom-1", Sector::Agriculture)).unwrap();
    assert_eq!(store.list().len(), 1);
}

#[test]
fn replace_all_overwrites_collection() {
    let store = ChartStore::new(MemoryBackend::new());
    store.add(chart("custom-1", Sector::Traffic)).unwrap();
    store
        .replace_all(vec![chart("custom-7", Sector::Budget), chart("custom-8", Sector::Budget)])
        .unwrap();

    let ids: Vec<String> = store.list().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["custom-7", "custom-8"]);
}

#[test]
fn every_mutation_notifies_listeners() {
    let store = ChartStore::new(MemoryBackend::new());
    let events = recorded(&store);

    store.add(chart("custom-1", Sector::Budget)).unwrap();
    store.remove("custom-1").unwrap();
    store.clear().unwrap();
    store.replace_all(Vec::new()).unwrap();

    let changes: Vec<Change> = events.lock().unwrap().iter().map(|e| e.change.clone()).collect();
    assert_eq!(
        changes,
        vec![
            Change::Added("custom-1".to_string()),
            Change::Removed("custom-1".to_string()),
            Change::Cleared,
            Change::Replaced,
        ]
    );
    assert!(events.lock().unwrap().iter().all(|e| e.key == STORAGE_KEY));
}

#[test]
fn unsubscribed_listener_is_silent() {
    let store = ChartStore::new(MemoryBackend::new());
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let id = store.subscribe(Arc::new(move |_: &StoreEvent| {
        *sink.lock().unwrap() += 1;
    }));

    store.add(chart("custom-1", Sector::Budget)).unwrap();
    store.unsubscribe(id);
    store.add(chart("custom-2", Sector::Budget)).unwrap();

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn listener_can_read_the_store() {
    let store = Arc::new(ChartStore::new(MemoryBackend::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let reader = Arc::downgrade(&store);
    let sink = Arc::clone(&seen);
    store.subscribe(Arc::new(move |_: &StoreEvent| {
        if let Some(store) = reader.upgrade() {
            sink.lock().unwrap().push(store.list().len());
        }
    }));

    store.add(chart("custom-1", Sector::Budget)).unwrap();
    store.add(chart("custom-2", Sector::Budget)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn file_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = ChartStore::new(FileBackend::open(dir.path()).unwrap());
        store.add(chart("custom-1", Sector::Healthcare)).unwrap();
    }

    let reopened = ChartStore::new(FileBackend::open(dir.path()).unwrap());
    let charts = reopened.list();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].id, "custom-1");
    assert!(reopened.backend().path_for(STORAGE_KEY).exists());

    reopened.clear().unwrap();
    assert!(!reopened.backend().path_for(STORAGE_KEY).exists());
    // clearing twice is fine
    reopened.clear().unwrap();
}

#[test]
fn file_backend_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("data").join("charts");
    let backend = FileBackend::open(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(backend.read(STORAGE_KEY).unwrap(), None);
}
