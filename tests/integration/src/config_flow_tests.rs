//! Layered configuration driving a full run

use pretty_assertions::assert_eq;
use wikisync_content::MarkdownTranscoder;
use wikisync_core::remote::MemoryStore;
use wikisync_core::{ConfigResolver, FixedAnswers, RunLedger, SyncEngine, SyncOptions};
use wikisync_fs::NormalizedPath;
use wikisync_test_utils::docs::TestDocs;
use wikisync_test_utils::scenarios;

fn resolver(docs: &TestDocs, global: &TestDocs) -> ConfigResolver {
    ConfigResolver::with_global_config_dir(NormalizedPath::new(docs.root()), global.root().to_path_buf())
}

#[test]
fn resolved_settings_shape_the_run() {
    let global = TestDocs::new().with_file(
        "config.toml",
        "[remote]\nbase_url = \"https://wiki.example.com\"\nspace = \"GLOBAL\"\n",
    );
    let docs = scenarios::intro_and_setup()
        .with_file("notes.txt", "# Notes\n\nPlain text notes.\n")
        .with_file(
            ".wikisync/config.toml",
            "[remote]\nspace = \"DOC\"\n\n[sync]\nextensions = [\".MD\", \"txt\"]\nledger_dir = \".ledgers\"\n",
        );

    let config = resolver(&docs, &global).resolve().unwrap();
    assert_eq!(config.base_url.as_deref(), Some("https://wiki.example.com"));
    assert_eq!(config.space.as_deref(), Some("DOC"));
    assert_eq!(config.extensions, vec!["md", "txt"]);
    assert_eq!(config.ledger_dir, docs.path(".ledgers"));

    let (store, root) = MemoryStore::with_root("DOC", "Docs");
    let result = SyncEngine::new(
        Box::new(store.clone()),
        Box::new(MarkdownTranscoder::new()),
        Box::new(FixedAnswers::yes()),
    )
    .with_options(SyncOptions {
        extensions: config.extensions.clone(),
        ledger_dir: Some(config.ledger_dir.clone()),
    })
    .run(docs.root(), &root, false)
    .unwrap();

    assert_eq!(result.created, 3);
    assert_eq!(store.child_titles(&root), vec!["Intro", "Notes", "setup"]);

    let runs = RunLedger::list(&config.ledger_dir).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].1.created_pages.len(), 3);
    assert_eq!(runs[0].1.source_directory, docs.root());
}

#[test]
fn local_layer_overrides_project_layer() {
    let global = TestDocs::new();
    let docs = TestDocs::new()
        .with_file(".wikisync/config.toml", "[remote]\nusername = \"team\"\n")
        .with_file(".wikisync/config.local.toml", "[remote]\nusername = \"me\"\n");

    let config = resolver(&docs, &global).resolve().unwrap();

    assert_eq!(config.username.as_deref(), Some("me"));
    assert_eq!(config.ledger_dir, docs.path(".wikisync/runs"));
}

#[test]
fn ledger_json_uses_camel_case_keys() {
    let docs = scenarios::intro_and_setup();
    let ledgers = TestDocs::new();
    let (store, root) = MemoryStore::with_root("DOC", "Docs");

    let result = SyncEngine::new(
        Box::new(store),
        Box::new(MarkdownTranscoder::new()),
        Box::new(FixedAnswers::yes()),
    )
    .with_options(SyncOptions {
        ledger_dir: Some(ledgers.root().to_path_buf()),
        ..SyncOptions::default()
    })
    .run(docs.root(), &root, false)
    .unwrap();

    let raw = std::fs::read_to_string(result.ledger_path.unwrap()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["rootPageId"], root.as_str());
    assert_eq!(json["rootPageTitle"], "Docs");
    assert_eq!(json["createdPages"].as_array().unwrap().len(), 2);
    assert_eq!(json["createdPages"][0]["title"], "Intro");
    assert_eq!(json["createdPages"][0]["space"], "DOC");
    assert!(json["timestamp"].is_string());
}
