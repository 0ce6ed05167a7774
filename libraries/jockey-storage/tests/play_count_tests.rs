//! Integration tests for play count persistence
//!
//! Uses REAL files in a temp directory to exercise the save/refresh cycle.


use jockey_core::*;
use jockey_storage::{FilePlayCountStore, PlayCount};
use test_helpers::*;

#[tokio::test]
async fn test_counts_survive_save_and_refresh() {
    let dir = TestDir::new();
    let path = dir.file("counts/play_counts.json");

    let store = FilePlayCountStore::new(&path);
    store.increment_play_count(SongId::new(1));
    store.increment_play_count(SongId::new(1));
    store.increment_skip_count(SongId::new(2));
    store.set_play_date(SongId::new(1), 1_700_000_000_000);
    store.save().await.unwrap();

    let reloaded = FilePlayCountStore::new(&path);
    reloaded.refresh().await.unwrap();

    assert_eq!(
        reloaded.get(SongId::new(1)),
        PlayCount {
            plays: 2,
            skips: 0,
            last_played: Some(1_700_000_000_000),
        }
    );
    assert_eq!(reloaded.skip_count(SongId::new(2)), 1);
}

#[tokio::test]
async fn test_refresh_without_file_starts_empty() {
    let dir = TestDir::new();
    let store = FilePlayCountStore::new(dir.file("missing.json"));

    store.refresh().await.unwrap();
    assert_eq!(store.play_count(SongId::new(1)), 0);
}

#[tokio::test]
async fn test_refresh_discards_unsaved_changes() {
    let dir = TestDir::new();
    let path = dir.file("play_counts.json");

    let store = FilePlayCountStore::new(&path);
    store.set_play_count(SongId::new(7), 3);
    store.save().await.unwrap();

    store.set_play_count(SongId::new(7), 10);
    store.refresh().await.unwrap();
    assert_eq!(store.play_count(SongId::new(7)), 3);
}

#[tokio::test]
async fn test_corrupt_file_is_reported() {
    let dir = TestDir::new();
    let path = dir.file("play_counts.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FilePlayCountStore::new(&path);
    let result = store.refresh().await;
    assert!(matches!(result, Err(JockeyError::StoreQuery(_))));
}
