//! Tests for applying plans: collisions, rollback and degraded stores

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use wikisync_content::MarkdownTranscoder;
use wikisync_core::remote::{MemoryStore, PageId, RemotePageStore};
use wikisync_core::{
    Error, ExecutionEngine, FixedAnswers, IdentityLabel, IdentityResolver, OperationState, Planner,
    RemoteTree, RunState, Scanner, SyncEngine, SyncPlan,
};
use wikisync_fs::NormalizedPath;
use wikisync_test_utils::docs::TestDocs;
use wikisync_test_utils::scenarios;

fn engine(store: &MemoryStore) -> SyncEngine {
    SyncEngine::new(
        Box::new(store.clone()),
        Box::new(MarkdownTranscoder::new()),
        Box::new(FixedAnswers::yes()),
    )
}

/// Snapshot, resolutions and plan for driving the executor directly
fn prepare(
    store: &MemoryStore,
    docs: &TestDocs,
    root: &PageId,
) -> (RemoteTree, SyncPlan, HashMap<NormalizedPath, PageId>) {
    let transcoder = MarkdownTranscoder::new();
    let local = Scanner::new(&transcoder).scan(docs.root()).unwrap();
    let remote = RemoteTree::from_pages(root, store.get_subtree(root).unwrap()).unwrap();
    let resolutions = IdentityResolver::new(&remote).resolve(&local);
    let plan = Planner::new(&remote, &resolutions).plan(&local);
    let existing = resolutions.page_map();
    (remote, plan, existing)
}

#[test]
fn duplicate_titles_get_root_suffix_and_stay_stable() {
    let docs = scenarios::duplicate_overviews();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");

    let first = engine(&store).run(docs.root(), &root, false).unwrap();
    assert_eq!(first.created, 2);
    assert_eq!(store.child_titles(&root), vec!["Docs - Overview", "Overview"]);

    let mutations = store.mutation_count();
    let second = engine(&store).run(docs.root(), &root, false).unwrap();
    assert_eq!(second.changes(), 0);
    assert_eq!(store.mutation_count(), mutations);
}

#[test]
fn second_collision_is_fatal() {
    let docs = TestDocs::new().with_file("overview.md", "# Overview\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    // Same space, outside the synced subtree
    store.insert_page(None, "Overview", "");
    store.insert_page(None, "Docs - Overview", "");

    let result = engine(&store).run(docs.root(), &root, false);

    assert!(matches!(
        result,
        Err(Error::TitleCollision { ref title, ref attempted })
            if title == "Overview" && attempted == "Docs - Overview"
    ));
    assert_eq!(store.mutation_count(), 0);
}

#[test]
fn failed_create_rolls_back_every_created_page() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    store.fail_create("Installing");

    let result = engine(&store).run(docs.root(), &root, false);

    assert!(matches!(result, Err(Error::Transport { operation: "create", .. })));
    assert_eq!(store.page_count(), 1);
    assert!(store.child_titles(&root).is_empty());
}

#[test]
fn failed_update_rolls_back_and_returns_update_error() {
    let docs = TestDocs::new()
        .with_file("a.md", "# Alpha\n\nnew\n")
        .with_file("z.md", "# Zulu\n\nchanged\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let zulu = store.insert_page(Some(&root), "Zulu", "<p>old</p>");
    store.fail_update(&zulu);

    let result = engine(&store).run(docs.root(), &root, false);

    assert!(matches!(result, Err(Error::Transport { operation: "update", .. })));
    assert_eq!(store.child_titles(&root), vec!["Zulu"]);
    assert_eq!(store.page(&zulu).unwrap().body.as_deref(), Some("<p>old</p>"));
}

#[test]
fn created_pages_carry_identity_labels() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");

    engine(&store).run(docs.root(), &root, false).unwrap();

    let setup = store.find_by_title("setup").unwrap();
    let expected = IdentityLabel::for_path(&NormalizedPath::new("guide/setup.md"));
    assert!(setup.labels.contains(expected.as_str()));
}

#[test]
fn title_matched_pages_get_labelled_on_update() {
    let docs = TestDocs::new().with_file("a.md", "# Alpha\n\nnew\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let alpha = store.insert_page(Some(&root), "Alpha", "<p>old</p>");

    let result = engine(&store).run(docs.root(), &root, false).unwrap();

    assert_eq!(result.updated, 1);
    let labels = store.page(&alpha).unwrap().labels;
    assert!(labels.contains(IdentityLabel::for_path(&NormalizedPath::new("a.md")).as_str()));
}

#[test]
fn unsupported_labels_fall_back_to_title_matching() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let store = store.without_labels();

    let first = engine(&store).run(docs.root(), &root, false).unwrap();
    assert_eq!(first.created, 2);
    assert!(store.find_by_title("Intro").unwrap().labels.is_empty());

    let second = engine(&store).run(docs.root(), &root, false).unwrap();
    assert_eq!(second.changes(), 0);
    assert_eq!(store.page_count(), 3);
}

#[test]
fn over_long_labels_are_skipped() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let store = store.with_max_label_len(12);

    let result = engine(&store).run(docs.root(), &root, false).unwrap();

    assert_eq!(result.created, 2);
    assert!(store.find_by_title("setup").unwrap().labels.is_empty());
}

#[test]
fn delete_failures_are_collected_not_fatal() {
    let docs = TestDocs::new().with_file("kept.md", "# Kept\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let stuck = store.insert_page(Some(&root), "Stuck", "");
    let gone = store.insert_page(Some(&root), "Gone", "");
    store.fail_delete(&stuck);

    let result = engine(&store).run(docs.root(), &root, false).unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.deleted, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Stuck"));
    assert!(store.page(&gone).is_none());
    assert!(store.page(&stuck).is_some());
}

#[test]
fn parent_change_moves_page_under_new_parent() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let tuning = store.insert_page(Some(&root), "Tuning", "<p>Knobs.</p>\n");

    let result = engine(&store).run(docs.root(), &root, false).unwrap();

    assert_eq!(result.updated, 1);
    let advanced = store.find_by_title("advanced").unwrap();
    assert_eq!(store.page(&tuning).unwrap().parent_id, Some(advanced.id));
}

#[test]
fn unsupported_moves_leave_page_in_place() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let store = store.without_moves();
    let tuning = store.insert_page(Some(&root), "Tuning", "<p>Knobs.</p>\n");

    let result = engine(&store).run(docs.root(), &root, false).unwrap();

    assert!(result.is_clean());
    assert_eq!(store.page(&tuning).unwrap().parent_id, Some(root.clone()));
    assert_eq!(store.page(&tuning).unwrap().version, 1);
}

#[test]
fn nested_creates_land_under_their_parents() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");

    engine(&store).run(docs.root(), &root, false).unwrap();

    assert_eq!(store.child_titles(&root), vec!["Home", "api", "guide"]);
    let guide: PageId = store.find_by_title("guide").unwrap().id;
    assert_eq!(store.child_titles(&guide), vec!["Installing", "advanced"]);
    let advanced = store.find_by_title("advanced").unwrap().id;
    assert_eq!(store.child_titles(&advanced), vec!["Scaling", "Tuning"]);
}

#[test]
fn completed_apply_marks_every_operation_applied() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let (remote, plan, existing) = prepare(&store, &docs, &root);

    let mut executor = ExecutionEngine::new(&store, &remote, &existing);
    assert_eq!(executor.state(), RunState::Running);
    let outcome = executor.apply(&plan).unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert_eq!(executor.state(), RunState::Completed);
    let states: Vec<_> = executor
        .records()
        .iter()
        .map(|record| (record.title.as_str(), record.state))
        .collect();
    assert_eq!(
        states,
        vec![("Intro", OperationState::Applied), ("setup", OperationState::Applied)]
    );
}

#[test]
fn failed_apply_leaves_later_operations_pending() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    store.fail_create("Installing");
    let (remote, plan, existing) = prepare(&store, &docs, &root);

    let mut executor = ExecutionEngine::new(&store, &remote, &existing);
    assert!(executor.apply(&plan).is_err());

    assert_eq!(executor.state(), RunState::Failed);
    let records = executor.records();
    let failed = records.iter().position(|r| r.title == "Installing").unwrap();
    assert!(failed > 0 && failed + 1 < records.len());
    assert!(records[..failed].iter().all(|r| r.state == OperationState::Applied));
    assert_eq!(records[failed].state, OperationState::Failed);
    assert!(records[failed + 1..].iter().all(|r| r.state == OperationState::Pending));
}

#[test]
fn unsupported_labels_switch_labelling_off_for_the_run() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let store = store.without_labels();
    let (remote, plan, existing) = prepare(&store, &docs, &root);

    let mut executor = ExecutionEngine::new(&store, &remote, &existing);
    assert!(executor.labels_enabled());
    executor.apply(&plan).unwrap();

    assert!(!executor.labels_enabled());
    assert_eq!(executor.state(), RunState::Completed);
    assert_eq!(store.child_titles(&root), vec!["Intro", "setup"]);
}
