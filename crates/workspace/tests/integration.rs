//! Integration tests for workspace lifecycle

use launchpad_types::FileManifest;
use launchpad_workspace::{remove_workspace, WorkspaceManager, ACTIVE_MARKER};

#[tokio::test]
async fn manifest_round_trips_byte_for_byte() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    let manifest = FileManifest::from([
        ("package.json", r#"{"name":"site"}"#),
        ("pages/index.tsx", "export default function Home() {}\n"),
        ("pages/blog/[slug].tsx", "// deep nesting\n"),
        ("public/assets/css/main.css", "body { margin: 0 }\n"),
    ]);

    let workspace = manager.create("round-trip").await.unwrap();
    manager.write_manifest(&workspace, &manifest).await.unwrap();

    for (path, content) in manifest.iter() {
        let read = tokio::fs::read_to_string(workspace.root().join(path))
            .await
            .unwrap();
        assert_eq!(read, content, "content mismatch for {path}");
    }
}

#[tokio::test]
async fn escaping_manifest_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    let manifest = FileManifest::from([
        ("ok.txt", "fine"),
        ("../outside.txt", "should never land"),
    ]);

    let workspace = manager.create("escape").await.unwrap();
    let err = manager.write_manifest(&workspace, &manifest).await;
    assert!(err.is_err());

    // Validation happens before any write: even the benign file is absent.
    assert!(!workspace.root().join("ok.txt").exists());
    assert!(!temp.path().join("outside.txt").exists());
}

#[tokio::test]
async fn workspace_names_embed_creation_order() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    let first = manager.create("site").await.unwrap();
    let second = manager.create("site").await.unwrap();

    assert!(second.created_ms() > first.created_ms() || second.created_ms() == first.created_ms() + 1);
    assert_ne!(first.root(), second.root());
}

#[tokio::test]
async fn prune_keeps_the_newest_workspaces() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    let mut roots = Vec::new();
    for _ in 0..7 {
        let ws = manager.create("retention").await.unwrap();
        manager.release(&ws).await.unwrap();
        roots.push(ws.root().to_path_buf());
    }

    manager.prune(3).await.unwrap();

    // Exactly the three most recently created remain.
    for old in &roots[..4] {
        assert!(!old.exists(), "expected {} to be pruned", old.display());
    }
    for recent in &roots[4..] {
        assert!(recent.exists(), "expected {} to survive", recent.display());
    }
}

#[tokio::test]
async fn prune_sorts_by_timestamp_not_name() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    // "zz" sorts after "aa" lexicographically, but its timestamp is older;
    // raw name ordering would retain the wrong directory.
    tokio::fs::create_dir_all(temp.path().join("zz-1000")).await.unwrap();
    tokio::fs::create_dir_all(temp.path().join("aa-2000")).await.unwrap();

    manager.prune(1).await.unwrap();

    assert!(temp.path().join("aa-2000").exists());
    assert!(!temp.path().join("zz-1000").exists());
}

#[tokio::test]
async fn prune_skips_live_workspaces() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    let live = manager.create("live").await.unwrap();
    let done = manager.create("done").await.unwrap();
    manager.release(&done).await.unwrap();
    let newest = manager.create("newest").await.unwrap();
    manager.release(&newest).await.unwrap();

    manager.prune(1).await.unwrap();

    // The live workspace predates the retention cutoff but keeps its marker.
    assert!(live.root().join(ACTIVE_MARKER).exists());
    assert!(live.root().exists());
    assert!(!done.root().exists());
    assert!(newest.root().exists());
}

#[tokio::test]
async fn prune_ignores_foreign_directories() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    tokio::fs::create_dir_all(temp.path().join("not-a-workspace")).await.unwrap();
    let ws = manager.create("real").await.unwrap();
    manager.release(&ws).await.unwrap();

    manager.prune(0).await.unwrap();

    assert!(temp.path().join("not-a-workspace").exists());
    assert!(!ws.root().exists());
}

#[tokio::test]
async fn prune_on_missing_base_is_a_no_op() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path().join("never-created"));
    manager.prune(10).await.unwrap();
}

#[tokio::test]
async fn removal_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    let ws = manager.create("gone").await.unwrap();
    remove_workspace(ws.root()).await.unwrap();
    assert!(!ws.root().exists());

    // Second removal of the same path is not an error.
    remove_workspace(ws.root()).await.unwrap();
}

#[tokio::test]
async fn rejects_unusable_slugs() {
    let temp = tempfile::tempdir().unwrap();
    let manager = WorkspaceManager::new(temp.path());

    assert!(manager.create("has/slash").await.is_err());
    assert!(manager.create("").await.is_err());
}
