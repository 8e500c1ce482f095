//! Repeated runs over an evolving source tree
//!
//! Each step edits the documents the way a writer would and checks that the
//! next run touches only what changed.

use pretty_assertions::assert_eq;
use wikisync_content::MarkdownTranscoder;
use wikisync_core::remote::{MemoryStore, PageId};
use wikisync_core::{FixedAnswers, SyncEngine, SyncResult};
use wikisync_test_utils::docs::TestDocs;
use wikisync_test_utils::scenarios;

struct Site {
    store: MemoryStore,
    root: PageId,
}

impl Site {
    fn new() -> Self {
        let (store, root) = MemoryStore::with_root("DOC", "Docs");
        Self { store, root }
    }

    fn sync(&self, docs: &TestDocs) -> SyncResult {
        SyncEngine::new(
            Box::new(self.store.clone()),
            Box::new(MarkdownTranscoder::new()),
            Box::new(FixedAnswers::yes()),
        )
        .run(docs.root(), &self.root, false)
        .unwrap()
    }

    fn id(&self, title: &str) -> PageId {
        self.store.find_by_title(title).unwrap().id
    }

    fn parent_title(&self, title: &str) -> String {
        let parent = self.store.find_by_title(title).unwrap().parent_id.unwrap();
        self.store.page(&parent).unwrap().title
    }
}

fn counts(result: &SyncResult) -> (usize, usize, usize) {
    (result.created, result.updated, result.deleted)
}

#[test]
fn evolving_tree_is_reconciled_step_by_step() {
    let docs = scenarios::nested_sections();
    let site = Site::new();

    // Initial publish
    assert_eq!(counts(&site.sync(&docs)), (9, 0, 0));
    let tuning = site.id("Tuning");
    let installing = site.id("Installing");

    // Body edit
    docs.write("guide/advanced/tuning.md", "# Tuning\n\nMore knobs.\n");
    assert_eq!(counts(&site.sync(&docs)), (0, 1, 0));
    assert_eq!(
        site.store.page(&tuning).unwrap().body.as_deref(),
        Some("<p>More knobs.</p>\n")
    );

    // Move a document to another section; the page follows it
    docs.rename("guide/install.md", "api/install.md");
    assert_eq!(counts(&site.sync(&docs)), (0, 1, 0));
    assert_eq!(site.id("Installing"), installing);
    assert_eq!(site.parent_title("Installing"), "api");

    // Emptying a section collapses it into its last document
    docs.remove("guide/advanced/scaling.md");
    assert_eq!(counts(&site.sync(&docs)), (0, 1, 3));
    assert_eq!(site.id("Tuning"), tuning);
    assert_eq!(site.parent_title("Tuning"), "Docs");
    assert!(site.store.find_by_title("guide").is_none());

    // Settled
    let mutations = site.store.mutation_count();
    assert_eq!(counts(&site.sync(&docs)), (0, 0, 0));
    assert_eq!(site.store.mutation_count(), mutations);
    assert_eq!(site.store.child_titles(&site.root), vec!["Home", "Tuning", "api"]);
}

#[test]
fn heading_changes_keep_page_identity() {
    let docs = scenarios::intro_and_setup();
    let site = Site::new();
    site.sync(&docs);
    let setup = site.id("setup");

    scenarios::retitle_setup(&docs);
    assert_eq!(counts(&site.sync(&docs)), (0, 1, 0));
    docs.write("guide/setup.md", "# Installation\n\nInstall the tool.\n\nThen run it.\n");
    assert_eq!(counts(&site.sync(&docs)), (0, 1, 0));

    let page = site.store.page(&setup).unwrap();
    assert_eq!(page.title, "Installation");
    assert_eq!(site.store.page_count(), 3);
}

#[test]
fn duplicate_titles_stay_paired_with_their_files() {
    let docs = scenarios::duplicate_overviews();
    let site = Site::new();
    site.sync(&docs);
    let first = site.id("Overview");
    let second = site.id("Docs - Overview");

    docs.write("summary.md", "# Overview\n\nSecond, revised.\n");
    assert_eq!(counts(&site.sync(&docs)), (0, 1, 0));

    assert_eq!(
        site.store.page(&second).unwrap().body.as_deref(),
        Some("<p>Second, revised.</p>\n")
    );
    assert_eq!(site.store.page(&first).unwrap().version, 1);
}

#[test]
fn pages_not_backed_by_files_are_removed() {
    let docs = scenarios::intro_and_setup();
    let site = Site::new();
    let stale = site.store.insert_page(Some(&site.root), "Old Notes", "");
    site.store.insert_page(Some(&stale), "Older Notes", "");

    let result = site.sync(&docs);

    assert_eq!(counts(&result), (2, 0, 2));
    assert_eq!(site.store.child_titles(&site.root), vec!["Intro", "setup"]);
}
