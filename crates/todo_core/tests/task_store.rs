use std::collections::HashSet;
use todo_core::db::open_db_in_memory;
use todo_core::{SqliteTaskRepository, StoreError, Task, TaskRepository, TaskStore};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn task(id: &str, title: &str, description: &str, created_at: i64) -> Task {
    Task::with_id(id, title, description, created_at)
}

#[test]
fn upsert_inserts_then_replaces_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut original = task("a", "Draft", "first", 100);
    repo.upsert(&original).unwrap();

    original.title = "Final".to_string();
    original.is_completed = true;
    original.owner_id = Some(4);
    repo.upsert(&original).unwrap();

    let all = repo.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], original);
}

#[test]
fn insert_if_absent_never_overwrites() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let local = task("1", "Local Edit", "mine", 50);
    assert!(repo.insert_if_absent(&local).unwrap());

    let remote = task("1", "Remote", "theirs", 999);
    assert!(!repo.insert_if_absent(&remote).unwrap());
    assert!(!repo.insert_if_absent(&remote).unwrap());

    let stored = repo.get("1").unwrap().unwrap();
    assert_eq!(stored, local);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_changes_mutable_fields_and_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut stored = task("test-id", "Original Title", "Original Description", 10);
    stored.owner_id = Some(2);
    repo.upsert(&stored).unwrap();

    let mut changed = task("test-id", "Updated Title", "Updated Description", 777);
    changed.is_completed = true;
    assert!(repo.update(&changed).unwrap());

    let loaded = repo.get("test-id").unwrap().unwrap();
    assert_eq!(loaded.title, "Updated Title");
    assert_eq!(loaded.description, "Updated Description");
    assert!(loaded.is_completed);
    assert_eq!(loaded.created_at, 10);
    assert_eq!(loaded.owner_id, Some(2));
}

#[test]
fn update_of_missing_task_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    assert!(!repo.update(&task("ghost", "t", "d", 1)).unwrap());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn delete_by_id_is_lenient() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&task("a", "t", "d", 1)).unwrap();

    assert!(repo.delete_by_id("a").unwrap());
    assert!(!repo.delete_by_id("a").unwrap());
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn list_orders_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let now = 1_700_000_000_000;

    repo.upsert(&task("old", "Old Todo", "Old", now - DAY_MS)).unwrap();
    repo.upsert(&task("new", "New Todo", "New", now + DAY_MS)).unwrap();
    repo.upsert(&task("cur", "Current Todo", "Current", now)).unwrap();

    let titles: Vec<String> = repo.list_all().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["New Todo", "Current Todo", "Old Todo"]);
}

#[test]
fn equal_timestamps_are_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    for id in ["c", "a", "b"] {
        repo.upsert(&task(id, id, "", 5)).unwrap();
    }

    let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn search_matches_title_or_description_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&task("1", "Buy groceries", "Milk, bread, eggs", 3)).unwrap();
    repo.upsert(&task("2", "Walk the dog", "Take Rex for a walk", 2)).unwrap();
    repo.upsert(&task("3", "Study Swift", "Learn about protocols", 1)).unwrap();

    let by_title = repo.search("groceries").unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].id, "1");

    let by_description = repo.search("REX").unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].id, "2");

    let upper = repo.search("SWIFT").unwrap();
    assert_eq!(upper.len(), 1);
    assert_eq!(upper[0].title, "Study Swift");

    assert!(repo.search("nonexistent").unwrap().is_empty());
}

#[test]
fn search_folds_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&task("1", "Ébauche du RAPPORT", "", 1)).unwrap();

    assert_eq!(repo.search("ébauche").unwrap().len(), 1);
}

#[test]
fn search_ignores_accents_on_either_side() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&task("1", "Café meeting", "École prep", 2)).unwrap();
    repo.upsert(&task("2", "Plain cafeteria", "", 1)).unwrap();

    let ids = |needle: &str| -> Vec<String> {
        repo.search(needle).unwrap().into_iter().map(|t| t.id).collect()
    };
    assert_eq!(ids("cafe"), vec!["1".to_string(), "2".to_string()]);
    assert_eq!(ids("ecole"), vec!["1".to_string()]);
    assert_eq!(ids("ÉCOLE"), vec!["1".to_string()]);
    assert_eq!(ids("cafè"), vec!["1".to_string(), "2".to_string()]);
    assert_eq!(ids("café m"), vec!["1".to_string()]);
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&task("1", "100% done", "", 2)).unwrap();
    repo.upsert(&task("2", "halfway", "", 1)).unwrap();

    let hits = repo.search("%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "1");
    assert!(repo.search("_").unwrap().is_empty());
}

#[test]
fn search_results_follow_list_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&task("a", "plan trip", "", 1)).unwrap();
    repo.upsert(&task("b", "plan party", "", 3)).unwrap();
    repo.upsert(&task("c", "other", "plan later", 2)).unwrap();

    let ids: Vec<String> = repo.search("plan").unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
}

#[test]
fn clear_all_removes_everything() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.upsert(&Task::new("Todo 1", "Description 1")).unwrap();
    repo.upsert(&Task::new("Todo 2", "Description 2")).unwrap();

    assert_eq!(repo.clear_all().unwrap(), 2);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn store_seed_merge_is_idempotent() {
    let store = TaskStore::open_in_memory().unwrap();
    let seed: Vec<Task> = (1..=5)
        .map(|n| task(&n.to_string(), "seed", "seed", 0))
        .collect();

    let first = store.insert_all_if_absent(&seed).unwrap();
    assert_eq!(first.inserted, 5);
    assert_eq!(first.skipped, 0);

    let before = store.list_all().unwrap();
    for _ in 0..3 {
        let again = store.insert_all_if_absent(&seed).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped, 5);
    }
    let after = store.list_all().unwrap();
    assert_eq!(before, after);

    let ids: HashSet<String> = after.into_iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.sqlite3");

    let store = TaskStore::open(&path).unwrap();
    let created = Task::new("Persist me", "");
    store.upsert(&created).unwrap();
    store.close().unwrap();

    let reopened = TaskStore::open(&path).unwrap();
    assert_eq!(reopened.get(&created.id).unwrap(), Some(created));
}

#[test]
fn closed_store_rejects_operations() {
    let store = TaskStore::open_in_memory().unwrap();
    store.close().unwrap();
    store.close().unwrap();

    assert!(!store.is_open());
    assert!(matches!(store.list_all(), Err(StoreError::Closed)));
    assert!(matches!(
        store.insert_all_if_absent(&[Task::new("x", "")]),
        Err(StoreError::Closed)
    ));
}

#[test]
fn concurrent_writers_never_duplicate_ids() {
    let store = std::sync::Arc::new(TaskStore::open_in_memory().unwrap());
    let mut handles = Vec::new();
    for worker in 0..4 {
        let store = std::sync::Arc::clone(&store);
        handles.push(std::thread::spawn(move || {
            for n in 0..10 {
                store.upsert(&task(&format!("shared-{n}"), "w", "", worker)).unwrap();
                store.insert_if_absent(&task(&format!("seed-{n}"), "s", "", 0)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.count().unwrap(), 20);
}
