//! Tests for change planning and operation ordering

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use wikisync_content::MarkdownTranscoder;
use wikisync_core::plan::{ChangeReason, OperationKind, SyncPlan};
use wikisync_core::remote::{MemoryStore, PageId};
use wikisync_core::{FixedAnswers, SyncEngine};
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

fn plan(store: &MemoryStore, docs: &TestDocs, root: &PageId) -> SyncPlan {
    engine(store).plan(docs.root(), root).unwrap()
}

fn titles<'a>(ops: impl Iterator<Item = &'a wikisync_core::Operation>) -> Vec<String> {
    ops.map(|op| op.title.clone()).collect()
}

#[test]
fn scenario_a_creates_both_files_under_root() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");

    let plan = plan(&store, &docs, &root);

    assert_eq!(titles(plan.apply.iter()), vec!["Intro", "setup"]);
    assert!(plan.apply.iter().all(|op| op.kind == OperationKind::Create));
    assert!(plan.apply.iter().all(|op| op.parent_path_key.is_none()));
    assert!(plan.deletes.is_empty());
    assert!(!plan.apply.iter().any(|op| op.title == "guide"));
}

#[test]
fn scenario_b_heading_change_is_a_title_update() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    engine(&store).run(docs.root(), &root, false).unwrap();

    scenarios::retitle_setup(&docs);
    let plan = plan(&store, &docs, &root);

    assert_eq!(plan.apply.len(), 1);
    let op = &plan.apply[0];
    assert_eq!(op.kind, OperationKind::Update);
    assert_eq!(op.title, "Setup Guide");
    assert_eq!(op.previous_title.as_deref(), Some("setup"));
    assert_eq!(op.change_reasons, BTreeSet::from([ChangeReason::Title]));
    assert!(plan.deletes.is_empty());
}

#[test]
fn apply_batch_is_ordered_parents_first() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");

    let plan = plan(&store, &docs, &root);

    assert_eq!(
        titles(plan.apply.iter()),
        vec![
            "api",
            "guide",
            "Home",
            "advanced",
            "Authentication",
            "Endpoints",
            "Installing",
            "Scaling",
            "Tuning",
        ]
    );
    let depths: Vec<usize> = plan.apply.iter().map(|op| op.depth).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn unmatched_pages_are_deleted_deepest_first() {
    let docs = scenarios::intro_and_setup();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    store.insert_page(Some(&root), "Intro", "<p>Welcome to the docs.</p>\n");
    let stale = store.insert_page(Some(&root), "Stale", "");
    store.insert_page(Some(&stale), "Stale Child", "");

    let plan = plan(&store, &docs, &root);

    assert_eq!(titles(plan.deletes.iter()), vec!["Stale Child", "Stale"]);
    assert_eq!(titles(plan.unchanged.iter()), vec!["Intro"]);
    assert_eq!(titles(plan.creates()), vec!["setup"]);
}

#[test]
fn delete_carries_path_from_identity_label() {
    let docs = TestDocs::new().with_file("kept.md", "# Kept\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let gone = store.insert_page(Some(&root), "Gone", "");
    store.insert_label(
        &gone,
        wikisync_core::IdentityLabel::for_path(&NormalizedPath::new("old/gone.md")).as_str(),
    );

    let plan = plan(&store, &docs, &root);

    assert_eq!(plan.deletes.len(), 1);
    assert_eq!(plan.deletes[0].local_path, Some(NormalizedPath::new("old/gone.md")));
    assert!(plan.deletes[0].has_identity_label);
}

#[test]
fn pending_parent_forces_parent_reason() {
    let docs = scenarios::nested_sections();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    store.insert_page(Some(&root), "Tuning", "<p>Knobs.</p>\n");

    let plan = plan(&store, &docs, &root);

    let tuning = plan.updates().find(|op| op.title == "Tuning").unwrap();
    assert_eq!(tuning.change_reasons, BTreeSet::from([ChangeReason::Parent]));
    assert_eq!(tuning.parent_path_key, Some(NormalizedPath::new("guide/advanced")));
}

#[test]
fn content_change_is_detected() {
    let docs = TestDocs::new()
        .with_file("a.md", "# A\n\nnew text\n")
        .with_file("b.md", "# B\n\nsame\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    store.insert_page(Some(&root), "A", "<p>old text</p>");
    store.insert_page(Some(&root), "B", "<p>same</p>");

    let plan = plan(&store, &docs, &root);

    let changed: Vec<(String, BTreeSet<ChangeReason>)> = plan
        .updates()
        .map(|op| (op.title.clone(), op.change_reasons.clone()))
        .collect();
    assert_eq!(
        changed,
        vec![("A".to_string(), BTreeSet::from([ChangeReason::Content]))]
    );
    assert_eq!(titles(plan.unchanged.iter()), vec!["B"]);
}

#[test]
fn whitespace_only_differences_are_not_changes() {
    let docs = TestDocs::new().with_file("a.md", "# A\n\nsome   text\n");
    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    store.insert_page(Some(&root), "A", "  <p>some text</p>  \n\n");

    let plan = plan(&store, &docs, &root);
    assert!(plan.is_empty());
}
