//! Integration tests for artifact collection

use launchpad_artifacts::collect;

#[tokio::test]
async fn collects_nested_output_tree() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    tokio::fs::create_dir_all(out.join("_next/static/css")).await.unwrap();
    tokio::fs::write(out.join("index.html"), b"<html>").await.unwrap();
    tokio::fs::write(out.join("404.html"), b"gone").await.unwrap();
    tokio::fs::write(out.join("_next/static/css/app.css"), b"body{}").await.unwrap();

    let manifest = collect(&out).await.unwrap();

    assert_eq!(manifest.len(), 3);
    assert_eq!(manifest.get("/index.html").unwrap(), b"<html>");
    assert_eq!(manifest.get("/404.html").unwrap(), b"gone");
    assert_eq!(manifest.get("/_next/static/css/app.css").unwrap(), b"body{}");
}

#[tokio::test]
async fn empty_output_is_an_empty_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    tokio::fs::create_dir_all(&out).await.unwrap();

    let manifest = collect(&out).await.unwrap();
    assert!(manifest.is_empty());
}

#[tokio::test]
async fn empty_subdirectories_contribute_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    tokio::fs::create_dir_all(out.join("a/b/c")).await.unwrap();
    tokio::fs::write(out.join("a/file.txt"), b"x").await.unwrap();

    let manifest = collect(&out).await.unwrap();
    assert_eq!(manifest.len(), 1);
    assert!(manifest.contains_key("/a/file.txt"));
}

#[tokio::test]
async fn missing_output_directory_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("out");

    assert!(collect(&missing).await.is_err());
}

#[tokio::test]
async fn binary_content_survives_collection() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    tokio::fs::create_dir_all(&out).await.unwrap();
    let bytes: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
    tokio::fs::write(out.join("favicon.ico"), &bytes).await.unwrap();

    let manifest = collect(&out).await.unwrap();
    assert_eq!(manifest.get("/favicon.ico").unwrap(), &bytes);
}
