mod common;

use common::init_tracing;
use news_digest::{DigestError, Ledger};
use tempfile::{tempdir, NamedTempFile};

#[tokio::test]
async fn fresh_ledger_is_empty() {
    init_tracing();
    let dir = tempdir().unwrap();

    let ledger = Ledger::open(dir.path().join("sent_links.db")).await.unwrap();

    assert!(ledger.load_all().await.unwrap().is_empty());
    assert_eq!(ledger.len().await.unwrap(), 0);
}

#[tokio::test]
async fn inserting_the_same_link_twice_is_a_no_op() {
    init_tracing();
    let dir = tempdir().unwrap();
    let ledger = Ledger::open(dir.path().join("sent_links.db")).await.unwrap();

    ledger.insert("https://a.com/1").await.unwrap();
    ledger.insert("https://a.com/1").await.unwrap();

    let links = ledger.load_all().await.unwrap();
    assert_eq!(links.len(), 1);
    assert!(links.contains("https://a.com/1"));
    assert_eq!(ledger.len().await.unwrap(), 1);
}

#[tokio::test]
async fn links_survive_reopening() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("sent_links.db");

    let ledger = Ledger::open(&path).await.unwrap();
    ledger.insert("https://a.com/1").await.unwrap();
    ledger.insert("https://a.com/2").await.unwrap();
    ledger.close().await;

    let reopened = Ledger::open(&path).await.unwrap();
    // schema creation must not wipe existing rows
    reopened.initialize().await.unwrap();

    let links = reopened.load_all().await.unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.contains("https://a.com/2"));
}

#[tokio::test]
async fn missing_parent_directories_are_created() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("sent_links.db");

    let ledger = Ledger::open(&path).await.unwrap();
    ledger.insert("https://a.com/1").await.unwrap();

    assert!(path.exists());
    assert_eq!(ledger.path(), path.as_path());
}

#[tokio::test]
async fn unusable_location_is_a_storage_error() {
    init_tracing();
    // a regular file cannot be used as a directory
    let file = NamedTempFile::new().unwrap();
    let path = file.path().join("sub").join("sent_links.db");

    let result = Ledger::open(&path).await;

    assert!(matches!(result, Err(DigestError::Storage(_))));
}
