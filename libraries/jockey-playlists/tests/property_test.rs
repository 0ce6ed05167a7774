//! Property-based tests for playlist generation
//!
//! Uses proptest to check the combination, ordering and truncation
//! invariants over random libraries and rule sets.

use jockey_core::{PlayCountStore, Song, SongId};
use jockey_playlists::generator::{intersect_all, sort_songs, truncate_songs, union_all};
use jockey_playlists::{
    AutoPlaylistDefinition, Comparator, EntityType, Field, PlaylistGenerator, Rule,
    RuleEvaluator, Stores,
};
use jockey_storage::{FilePlayCountStore, LibrarySnapshot, MemoryMusicStore, MemoryPlaylistStore};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ===== Helpers =====

#[derive(Debug, Clone)]
struct TestTrack {
    name: String,
    year: i32,
    plays: u32,
}

fn arbitrary_track() -> impl Strategy<Value = TestTrack> {
    ("[a-c]{1,4}", 1960i32..2000, 0u32..20).prop_map(|(name, year, plays)| TestTrack {
        name,
        year,
        plays,
    })
}

fn arbitrary_library() -> impl Strategy<Value = Vec<TestTrack>> {
    prop::collection::vec(arbitrary_track(), 0..40)
}

fn arbitrary_rule() -> impl Strategy<Value = Rule> {
    prop_oneof![
        ("[a-c]{1,2}", any::<bool>()).prop_map(|(needle, contains)| {
            let comparator = if contains {
                Comparator::Contains
            } else {
                Comparator::NotContains
            };
            Rule::new(EntityType::Song, Field::Name, comparator, needle).unwrap()
        }),
        (1960i32..2000, any::<bool>()).prop_map(|(year, before)| {
            let comparator = if before {
                Comparator::LessThan
            } else {
                Comparator::GreaterThan
            };
            Rule::new(EntityType::Song, Field::Year, comparator, year.to_string()).unwrap()
        }),
        (0u32..20).prop_map(|plays| {
            Rule::new(
                EntityType::Song,
                Field::PlayCount,
                Comparator::GreaterThan,
                plays.to_string(),
            )
            .unwrap()
        }),
    ]
}

fn to_songs(tracks: &[TestTrack]) -> Vec<Song> {
    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let mut song = Song::new(SongId::new(index as i64 + 1), track.name.clone());
            song.year = track.year;
            song
        })
        .collect()
}

fn to_counts(tracks: &[TestTrack]) -> FilePlayCountStore {
    let counts = FilePlayCountStore::in_memory();
    for (index, track) in tracks.iter().enumerate() {
        counts.set_play_count(SongId::new(index as i64 + 1), track.plays);
    }
    counts
}

fn stores(tracks: &[TestTrack]) -> Stores {
    let library = LibrarySnapshot {
        songs: to_songs(tracks),
        ..LibrarySnapshot::default()
    };
    Stores::new(
        Arc::new(MemoryMusicStore::new(library)),
        Arc::new(MemoryPlaylistStore::new()),
        Arc::new(to_counts(tracks)),
    )
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn id_set(songs: &[Song]) -> HashSet<SongId> {
    songs.iter().map(|song| song.id).collect()
}

fn split_groups(songs: Vec<Song>, cuts: &[usize]) -> Vec<Vec<Song>> {
    let mut groups = Vec::new();
    let mut rest = songs;
    for cut in cuts {
        let at = (*cut).min(rest.len());
        let tail = rest.split_off(at);
        groups.push(rest);
        rest = tail;
    }
    groups.push(rest);
    groups
}

// ===== Property Tests =====

proptest! {
    /// Property: union keeps every song exactly once, at its first occurrence
    #[test]
    fn union_keeps_first_occurrences(
        picks in prop::collection::vec(1i64..15, 0..40),
        cuts in prop::collection::vec(0usize..10, 0..4)
    ) {
        let songs: Vec<Song> = picks.iter().map(|id| Song::new(SongId::new(*id), "s")).collect();
        let mut expected = Vec::new();
        for song in &songs {
            if !expected.contains(&song.id) {
                expected.push(song.id);
            }
        }

        let union = union_all(split_groups(songs, &cuts));
        let ids: Vec<SongId> = union.iter().map(|song| song.id).collect();
        prop_assert_eq!(ids, expected);
    }

    /// Property: intersection holds exactly the songs present in every group
    #[test]
    fn intersection_matches_set_intersection(
        groups in prop::collection::vec(prop::collection::hash_set(1i64..15, 0..12), 1..4)
    ) {
        let results: Vec<Vec<Song>> = groups
            .iter()
            .map(|ids| ids.iter().map(|id| Song::new(SongId::new(*id), "s")).collect())
            .collect();

        let expected: HashSet<SongId> = groups
            .iter()
            .skip(1)
            .fold(groups[0].clone(), |acc, next| acc.intersection(next).copied().collect())
            .into_iter()
            .map(SongId::new)
            .collect();

        let intersection = intersect_all(results);
        prop_assert_eq!(intersection.len(), expected.len());
        prop_assert_eq!(id_set(&intersection), expected);
    }

    /// Property: sorted output is ordered by the field, then by ascending id
    #[test]
    fn sort_orders_by_field_then_id(
        tracks in arbitrary_library(),
        ascending in any::<bool>()
    ) {
        let counts = to_counts(&tracks);
        let mut songs = to_songs(&tracks);
        songs.reverse();
        sort_songs(&mut songs, Field::PlayCount, ascending, &counts);

        prop_assert_eq!(songs.len(), tracks.len());
        for pair in songs.windows(2) {
            let (a, b) = (counts.play_count(pair[0].id), counts.play_count(pair[1].id));
            if a == b {
                prop_assert!(pair[0].id < pair[1].id, "tie not broken by id");
            } else if ascending {
                prop_assert!(a < b);
            } else {
                prop_assert!(a > b);
            }
        }
    }

    /// Property: truncation keeps the top entries and preserves input order
    #[test]
    fn truncation_keeps_top_entries_in_order(
        tracks in arbitrary_library(),
        max in 1usize..20
    ) {
        let counts = to_counts(&tracks);
        let original = to_songs(&tracks);
        let mut songs = original.clone();
        truncate_songs(&mut songs, max, Field::PlayCount, false, &counts);

        prop_assert_eq!(songs.len(), original.len().min(max));

        // Survivors appear in their original relative order
        let position: HashMap<SongId, usize> = original
            .iter()
            .enumerate()
            .map(|(index, song)| (song.id, index))
            .collect();
        for pair in songs.windows(2) {
            prop_assert!(position[&pair[0].id] < position[&pair[1].id]);
        }

        // No dropped song was played more than a kept one
        let kept = id_set(&songs);
        let weakest_kept = songs.iter().map(|song| counts.play_count(song.id)).min();
        let strongest_dropped = original
            .iter()
            .filter(|song| !kept.contains(&song.id))
            .map(|song| counts.play_count(song.id))
            .max();
        if let (Some(kept), Some(dropped)) = (weakest_kept, strongest_dropped) {
            prop_assert!(kept >= dropped);
        }
    }

    /// Property: generation combines rules as set intersection or union
    #[test]
    fn generation_combines_rule_results(
        tracks in arbitrary_library(),
        rules in prop::collection::vec(arbitrary_rule(), 1..4),
        match_all in any::<bool>()
    ) {
        let stores = stores(&tracks);
        let definition = AutoPlaylistDefinition::builder("Generated")
            .rules(rules.clone())
            .match_all_rules(match_all)
            .build()
            .unwrap();

        let (generated, per_rule) = block_on(async {
            let evaluator = RuleEvaluator::new(stores.clone());
            let mut per_rule = Vec::new();
            for rule in &rules {
                per_rule.push(id_set(&evaluator.evaluate(rule).await.unwrap()));
            }
            let generated = PlaylistGenerator::new(stores).generate(&definition).await.unwrap();
            (generated, per_rule)
        });

        let mut sets = per_rule.into_iter();
        let first = sets.next().unwrap_or_default();
        let expected: HashSet<SongId> = if match_all {
            sets.fold(first, |acc, next| acc.intersection(&next).copied().collect())
        } else {
            sets.fold(first, |acc, next| acc.union(&next).copied().collect())
        };

        prop_assert_eq!(generated.len(), expected.len(), "duplicate songs in output");
        prop_assert_eq!(id_set(&generated), expected);
    }
}
