//! Integration tests for system playlist records
//!
//! Tests:
//! - Creating, editing, appending and removing records
//! - Name validation on creation
//! - Read-only (demo) libraries reject every mutation


use jockey_core::*;
use jockey_storage::MemoryPlaylistStore;
use test_helpers::*;

#[tokio::test]
async fn test_make_and_read_playlist() {
    let store = MemoryPlaylistStore::new();
    let songs = vec![
        create_test_song(1, "One", 1, 1),
        create_test_song(2, "Two", 1, 1),
    ];

    let record = store.make_playlist("  Mix  ", &songs).await.unwrap();
    assert_eq!(record.name, "Mix");

    let stored = store.songs(record.id).await.unwrap();
    assert_eq!(song_ids(&stored), vec![1, 2]);
    assert_eq!(store.playlists().await.unwrap(), vec![record]);
}

#[tokio::test]
async fn test_ids_continue_after_seeded_records() {
    let store = MemoryPlaylistStore::with_playlists(vec![(
        PlaylistRecord::new(PlaylistId::new(41), "Existing"),
        Vec::new(),
    )]);

    let record = store.make_playlist("New", &[]).await.unwrap();
    assert_eq!(record.id, PlaylistId::new(42));
}

#[tokio::test]
async fn test_duplicate_names_are_rejected() {
    let store = MemoryPlaylistStore::new();
    store.make_playlist("Workout", &[]).await.unwrap();

    let result = store.make_playlist("WORKOUT", &[]).await;
    assert!(matches!(result, Err(JockeyError::DuplicatePlaylistName(_))));

    let verified = store.verify_playlist_name(" Chill ").await.unwrap();
    assert_eq!(verified, "Chill");
}

#[tokio::test]
async fn test_edit_append_and_remove() {
    let store = MemoryPlaylistStore::new();
    let record = store
        .make_playlist("Queue", &[create_test_song(1, "One", 1, 1)])
        .await
        .unwrap();

    store
        .edit_playlist(record.id, &[create_test_song(2, "Two", 1, 1)])
        .await
        .unwrap();
    store
        .add_to_playlist(record.id, &[create_test_song(3, "Three", 1, 1)])
        .await
        .unwrap();
    assert_eq!(song_ids(&store.songs(record.id).await.unwrap()), vec![2, 3]);

    store.remove_playlist(record.id).await.unwrap();
    assert!(store.playlists().await.unwrap().is_empty());

    let result = store.remove_playlist(record.id).await;
    assert!(matches!(result, Err(JockeyError::PlaylistNotFound(_))));
}

#[tokio::test]
async fn test_search_playlists() {
    let store = MemoryPlaylistStore::new();
    store.make_playlist("Morning Run", &[]).await.unwrap();
    store.make_playlist("Evening Chill", &[]).await.unwrap();

    let found = store.search_playlists("run").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Morning Run");
}

#[tokio::test]
async fn test_read_only_library_rejects_mutations() {
    let record = PlaylistRecord::new(PlaylistId::new(1), "Demo");
    let store = MemoryPlaylistStore::read_only(vec![(record.clone(), Vec::new())]);

    assert!(matches!(
        store.make_playlist("New", &[]).await,
        Err(JockeyError::Unsupported(_))
    ));
    assert!(matches!(
        store.edit_playlist(record.id, &[]).await,
        Err(JockeyError::Unsupported(_))
    ));
    assert!(matches!(
        store.remove_playlist(record.id).await,
        Err(JockeyError::Unsupported(_))
    ));

    // Reads still work
    assert_eq!(store.playlists().await.unwrap(), vec![record]);
}
