//! Rule evaluation against the collaborator stores
//!
//! Song rules are checked against every song directly. Rules on grouping
//! entities (playlists, artists, albums, genres) first select the matching
//! entities and then expand each one into its songs.

use crate::error::Result;
use crate::rule::{Comparator, EntityType, Field, Rule};
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::try_join_all;
use jockey_core::{MusicStore, PlayCountStore, PlaylistStore, Song};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// The collaborators rules are resolved against
#[derive(Clone)]
pub struct Stores {
    pub music: Arc<dyn MusicStore>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub play_counts: Arc<dyn PlayCountStore>,
}

impl Stores {
    pub fn new(
        music: Arc<dyn MusicStore>,
        playlists: Arc<dyn PlaylistStore>,
        play_counts: Arc<dyn PlayCountStore>,
    ) -> Self {
        Self {
            music,
            playlists,
            play_counts,
        }
    }
}

/// The parsed right-hand side of a rule
#[derive(Debug, Clone, Copy)]
enum Operand<'r> {
    Number(i64),
    Text(&'r str),
}

impl<'r> Operand<'r> {
    fn parse(rule: &'r Rule) -> Result<Self> {
        if rule.field().is_numeric() {
            rule.numeric_value().map(Operand::Number)
        } else {
            Ok(Operand::Text(rule.value()))
        }
    }
}

/// Resolves single rules to the songs they match
#[derive(Clone)]
pub struct RuleEvaluator {
    stores: Stores,
}

impl RuleEvaluator {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Find every song matching `rule`
    ///
    /// Songs appear once, in the order the stores first produced them. A
    /// literal that does not parse for a numeric field is an error even when
    /// there is nothing to compare it against.
    pub async fn evaluate(&self, rule: &Rule) -> Result<Vec<Song>> {
        let operand = Operand::parse(rule)?;

        let songs = match rule.entity() {
            EntityType::Song => {
                let songs = self.stores.music.songs().await?;
                songs
                    .into_iter()
                    .filter(|song| self.song_matches(rule, operand, song))
                    .collect()
            }
            EntityType::Artist => {
                let artists = self.stores.music.artists().await?;
                let matched = artists
                    .iter()
                    .filter(|a| entity_matches(rule, operand, a.id.get(), &a.name))
                    .map(|a| self.stores.music.songs_by_artist(a.id));
                flatten(try_join_all(matched).await?)
            }
            EntityType::Album => {
                let albums = self.stores.music.albums().await?;
                let matched = albums
                    .iter()
                    .filter(|a| entity_matches(rule, operand, a.id.get(), &a.name))
                    .map(|a| self.stores.music.songs_by_album(a.id));
                flatten(try_join_all(matched).await?)
            }
            EntityType::Genre => {
                let genres = self.stores.music.genres().await?;
                let matched = genres
                    .iter()
                    .filter(|g| entity_matches(rule, operand, g.id.get(), &g.name))
                    .map(|g| self.stores.music.songs_by_genre(g.id));
                flatten(try_join_all(matched).await?)
            }
            EntityType::Playlist => {
                let playlists = self.stores.playlists.playlists().await?;
                let matched = playlists
                    .iter()
                    .filter(|p| entity_matches(rule, operand, p.id.get(), &p.name))
                    .map(|p| self.stores.playlists.songs(p.id));
                flatten(try_join_all(matched).await?)
            }
        };

        debug!("Rule [{}] matched {} songs", rule, songs.len());
        Ok(songs)
    }

    fn song_matches(&self, rule: &Rule, operand: Operand<'_>, song: &Song) -> bool {
        let counts = &self.stores.play_counts;
        let actual = match rule.field() {
            Field::Name => {
                return match operand {
                    Operand::Text(expected) => compare_text(rule.comparator(), &song.name, expected),
                    Operand::Number(_) => false,
                };
            }
            Field::Id => song.id.get(),
            Field::PlayCount => i64::from(counts.play_count(song.id)),
            Field::SkipCount => i64::from(counts.skip_count(song.id)),
            Field::Year => i64::from(song.year),
            Field::DateAdded => song.date_added,
            Field::DatePlayed => counts.play_date(song.id).unwrap_or(0),
        };

        match operand {
            Operand::Number(expected) => {
                compare_number(rule.field(), rule.comparator(), actual, expected)
            }
            Operand::Text(_) => false,
        }
    }
}

/// Check a grouping entity (which only has an id and a name) against a rule
fn entity_matches(rule: &Rule, operand: Operand<'_>, id: i64, name: &str) -> bool {
    match operand {
        Operand::Text(expected) => compare_text(rule.comparator(), name, expected),
        Operand::Number(expected) => compare_number(rule.field(), rule.comparator(), id, expected),
    }
}

/// Case-sensitive string comparison
fn compare_text(comparator: Comparator, actual: &str, expected: &str) -> bool {
    match comparator {
        Comparator::Equals => actual == expected,
        Comparator::NotEquals => actual != expected,
        Comparator::Contains => actual.contains(expected),
        Comparator::NotContains => !actual.contains(expected),
        Comparator::LessThan | Comparator::GreaterThan => false,
    }
}

fn compare_number(field: Field, comparator: Comparator, actual: i64, expected: i64) -> bool {
    match comparator {
        Comparator::Equals if field.is_date() => same_day(actual, expected),
        Comparator::NotEquals if field.is_date() => !same_day(actual, expected),
        Comparator::Equals => actual == expected,
        Comparator::NotEquals => actual != expected,
        Comparator::LessThan => actual < expected,
        Comparator::GreaterThan => actual > expected,
        Comparator::Contains | Comparator::NotContains => false,
    }
}

/// Whether two epoch-millisecond timestamps fall on the same UTC day
fn same_day(a: i64, b: i64) -> bool {
    fn day(millis: i64) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
    }

    match (day(a), day(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

/// Concatenate per-entity song lists, keeping the first copy of each song
fn flatten(groups: Vec<Vec<Song>>) -> Vec<Song> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .flatten()
        .filter(|song| seen.insert(song.id))
        .collect()
}
