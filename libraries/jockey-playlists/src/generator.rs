//! Auto playlist generation
//!
//! Generation runs in three steps:
//! 1. Evaluate every rule and fold the results (intersection or union)
//! 2. Sort for display
//! 3. If over the cap, pick survivors by the truncation policy and keep them
//!    in display order

use crate::definition::AutoPlaylistDefinition;
use crate::error::Result;
use crate::evaluator::{RuleEvaluator, Stores};
use crate::rule::Field;
use futures::future::try_join_all;
use jockey_core::{PlayCountStore, Song, SongId};
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Produces the ordered contents of auto playlists
#[derive(Clone)]
pub struct PlaylistGenerator {
    evaluator: RuleEvaluator,
    concurrent_rules: bool,
}

impl PlaylistGenerator {
    pub fn new(stores: Stores) -> Self {
        Self {
            evaluator: RuleEvaluator::new(stores),
            concurrent_rules: true,
        }
    }

    /// Evaluate rules one after another instead of all at once
    pub fn with_concurrent_rules(mut self, concurrent: bool) -> Self {
        self.concurrent_rules = concurrent;
        self
    }

    pub fn evaluator(&self) -> &RuleEvaluator {
        &self.evaluator
    }

    pub fn stores(&self) -> &Stores {
        self.evaluator.stores()
    }

    /// Generate the contents of an auto playlist
    ///
    /// Any failing rule fails the whole generation.
    #[instrument(skip_all, fields(playlist = %definition.name()))]
    pub async fn generate(&self, definition: &AutoPlaylistDefinition) -> Result<Vec<Song>> {
        if definition.rules().is_empty() {
            return Ok(Vec::new());
        }

        let results = if self.concurrent_rules {
            try_join_all(
                definition
                    .rules()
                    .iter()
                    .map(|rule| self.evaluator.evaluate(rule)),
            )
            .await?
        } else {
            let mut results = Vec::with_capacity(definition.rules().len());
            for rule in definition.rules() {
                results.push(self.evaluator.evaluate(rule).await?);
            }
            results
        };

        let mut songs = if definition.match_all_rules() {
            intersect_all(results)
        } else {
            union_all(results)
        };

        let counts = self.stores().play_counts.as_ref();
        if definition.sort_field() != Field::Id {
            sort_songs(
                &mut songs,
                definition.sort_field(),
                definition.sort_ascending(),
                counts,
            );
        }

        if let Some(max) = definition.max_entries() {
            if songs.len() > max {
                debug!("Truncating {} songs to {}", songs.len(), max);
                truncate_songs(
                    &mut songs,
                    max,
                    definition.truncate_field(),
                    definition.truncate_ascending(),
                    counts,
                );
            }
        }

        debug!("Generated {} songs", songs.len());
        Ok(songs)
    }
}

/// Songs present in every result, in the order of the first result
pub fn intersect_all(results: Vec<Vec<Song>>) -> Vec<Song> {
    let mut results = results.into_iter();
    let Some(first) = results.next() else {
        return Vec::new();
    };

    results.fold(first, |acc, next| {
        let ids: HashSet<SongId> = next.iter().map(|song| song.id).collect();
        acc.into_iter().filter(|song| ids.contains(&song.id)).collect()
    })
}

/// Songs present in any result, keeping each song's first occurrence
pub fn union_all(results: Vec<Vec<Song>>) -> Vec<Song> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .flatten()
        .filter(|song| seen.insert(song.id))
        .collect()
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(i64),
    Text(String),
}

fn sort_key(song: &Song, field: Field, counts: &dyn PlayCountStore) -> SortKey {
    match field {
        Field::Id => SortKey::Number(song.id.get()),
        Field::Name => SortKey::Text(song.name.to_lowercase()),
        Field::PlayCount => SortKey::Number(i64::from(counts.play_count(song.id))),
        Field::SkipCount => SortKey::Number(i64::from(counts.skip_count(song.id))),
        Field::Year => SortKey::Number(i64::from(song.year)),
        Field::DateAdded => SortKey::Number(song.date_added),
        Field::DatePlayed => SortKey::Number(counts.play_date(song.id).unwrap_or(0)),
    }
}

/// Apply the sort direction, then break ties by ascending song id
fn order(field_order: Ordering, ascending: bool, a: SongId, b: SongId) -> Ordering {
    let primary = if ascending {
        field_order
    } else {
        field_order.reverse()
    };
    primary.then_with(|| a.cmp(&b))
}

/// Sort songs by a field; names compare case-insensitively
pub fn sort_songs(songs: &mut Vec<Song>, field: Field, ascending: bool, counts: &dyn PlayCountStore) {
    let mut keyed: Vec<(SortKey, Song)> = songs
        .drain(..)
        .map(|song| (sort_key(&song, field, counts), song))
        .collect();

    keyed.sort_by(|(ka, a), (kb, b)| order(ka.cmp(kb), ascending, a.id, b.id));
    songs.extend(keyed.into_iter().map(|(_, song)| song));
}

/// Keep `max` songs chosen by the truncation policy, preserving current order
///
/// Truncating by `Id` keeps a random selection.
pub fn truncate_songs(
    songs: &mut Vec<Song>,
    max: usize,
    field: Field,
    ascending: bool,
    counts: &dyn PlayCountStore,
) {
    if songs.len() <= max {
        return;
    }

    let mut selection: Vec<usize> = (0..songs.len()).collect();
    if field == Field::Id {
        selection.shuffle(&mut thread_rng());
    } else {
        let keys: Vec<SortKey> = songs
            .iter()
            .map(|song| sort_key(song, field, counts))
            .collect();
        selection.sort_by(|&a, &b| {
            order(keys[a].cmp(&keys[b]), ascending, songs[a].id, songs[b].id)
        });
    }

    let mut keep = vec![false; songs.len()];
    for index in selection.into_iter().take(max) {
        keep[index] = true;
    }

    let mut index = 0;
    songs.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
}
