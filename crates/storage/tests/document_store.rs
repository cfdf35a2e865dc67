use serde_json::json;
use storage::document::JsonDocumentStore;

fn store() -> (tempfile::TempDir, JsonDocumentStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonDocumentStore::new(dir.path().join("data.json"));
    (dir, store)
}

#[test]
fn missing_file_is_initialized_to_empty_array() {
    let (_dir, store) = store();
    assert!(store.read_all().is_empty());
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw.trim(), "[]");
}

#[test]
fn corrupt_or_empty_file_reads_as_empty() {
    let (_dir, store) = store();
    std::fs::write(store.path(), "").unwrap();
    assert!(store.read_all().is_empty());
    std::fs::write(store.path(), "{ nope").unwrap();
    assert!(store.read_all().is_empty());

    // The next write starts from scratch.
    store.append(json!({"id": "t1"})).unwrap();
    assert_eq!(store.read_all(), vec![json!({"id": "t1"})]);
}

#[test]
fn append_echoes_and_persists_in_order() {
    let (_dir, store) = store();
    let echoed = store
        .append(json!({"id": "t1", "title": "Arrays", "subtopics": []}))
        .unwrap();
    assert_eq!(echoed["title"], "Arrays");
    store.append(json!({"id": "t2", "title": "Graphs"})).unwrap();

    let ids: Vec<String> = store
        .read_all()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(ids, vec!["t1", "t2"]);
}

#[test]
fn replace_and_remove_match_top_level_id_only() {
    let (_dir, store) = store();
    store
        .append(json!({"id": "t1", "subtopics": [{"id": "s1", "questions": []}]}))
        .unwrap();
    store.append(json!({"id": "t2"})).unwrap();

    // Nested ids are invisible to the store.
    assert_eq!(store.remove("s1").unwrap(), 0);
    assert_eq!(store.read_all().len(), 2);

    let replacement = json!({"id": "t1", "title": "Renamed", "subtopics": []});
    assert_eq!(store.replace("t1", &replacement).unwrap(), 1);
    assert_eq!(store.read_all()[0], replacement);
    assert_eq!(store.replace("missing", &replacement).unwrap(), 0);

    assert_eq!(store.remove("t2").unwrap(), 1);
    assert_eq!(store.read_all(), vec![replacement]);
}

#[test]
fn no_temp_file_is_left_behind() {
    let (dir, store) = store();
    store.append(json!({"id": "t1"})).unwrap();
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["data.json"]);
}

#[test]
fn concurrent_writers_never_fail_or_corrupt() {
    let (dir, store) = store();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                scope.spawn(move || {
                    for i in 0..20 {
                        let id = format!("w{worker}-{i}");
                        store.append(json!({ "id": id })).unwrap();
                        store.remove(&id).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(serde_json::from_str::<Vec<serde_json::Value>>(&raw).is_ok());
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}
