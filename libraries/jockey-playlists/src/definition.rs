//! Auto playlist definitions
//!
//! A definition is an immutable value. Edits go through
//! [`AutoPlaylistDefinition::to_builder`] and produce a new definition that
//! replaces the old one wholesale.

use crate::error::{PlaylistError, Result};
use crate::rule::{Field, Rule};
use jockey_core::PlaylistId;
use serde::{Deserialize, Serialize};

/// `maximumEntries` value meaning "no cap" in configuration files
pub const UNLIMITED_ENTRIES: i64 = -1;

/// Id carried by definitions whose playlist record does not exist yet
pub const UNASSIGNED_ID: PlaylistId = PlaylistId::new(-1);

/// Rules plus the policies that turn their matches into a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredDefinition", into = "StoredDefinition")]
pub struct AutoPlaylistDefinition {
    id: PlaylistId,
    name: String,
    rules: Vec<Rule>,
    match_all_rules: bool,
    sort_field: Field,
    sort_ascending: bool,
    max_entries: Option<usize>,
    truncate_field: Field,
    truncate_ascending: bool,
}

impl AutoPlaylistDefinition {
    pub fn builder(name: impl Into<String>) -> AutoPlaylistBuilder {
        AutoPlaylistBuilder::new(name)
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// `true` combines rules with AND, `false` with OR
    pub fn match_all_rules(&self) -> bool {
        self.match_all_rules
    }

    pub fn sort_field(&self) -> Field {
        self.sort_field
    }

    pub fn sort_ascending(&self) -> bool {
        self.sort_ascending
    }

    /// Entry cap; `None` is unlimited
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Field used to pick survivors when the cap is exceeded (`Id` = random)
    pub fn truncate_field(&self) -> Field {
        self.truncate_field
    }

    pub fn truncate_ascending(&self) -> bool {
        self.truncate_ascending
    }

    pub fn is_assigned(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Start editing: a builder pre-filled with this definition
    pub fn to_builder(&self) -> AutoPlaylistBuilder {
        AutoPlaylistBuilder {
            id: self.id,
            name: self.name.clone(),
            rules: self.rules.clone(),
            match_all_rules: self.match_all_rules,
            sort_field: self.sort_field,
            sort_ascending: self.sort_ascending,
            max_entries: self.max_entries,
            truncate_field: self.truncate_field,
            truncate_ascending: self.truncate_ascending,
        }
    }

    /// The same definition bound to a playlist record
    pub fn with_identity(&self, id: PlaylistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..self.clone()
        }
    }

    /// Whether both definitions would generate the same contents
    ///
    /// Ignores id and name.
    pub fn has_same_rules(&self, other: &Self) -> bool {
        self.rules == other.rules
            && self.match_all_rules == other.match_all_rules
            && self.sort_field == other.sort_field
            && self.sort_ascending == other.sort_ascending
            && self.max_entries == other.max_entries
            && self.truncate_field == other.truncate_field
            && self.truncate_ascending == other.truncate_ascending
    }
}

/// Builder for [`AutoPlaylistDefinition`]
///
/// Defaults: no rules, match all, sorted by name ascending, unlimited,
/// random truncation.
#[derive(Debug, Clone)]
pub struct AutoPlaylistBuilder {
    id: PlaylistId,
    name: String,
    rules: Vec<Rule>,
    match_all_rules: bool,
    sort_field: Field,
    sort_ascending: bool,
    max_entries: Option<usize>,
    truncate_field: Field,
    truncate_ascending: bool,
}

impl AutoPlaylistBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            rules: Vec::new(),
            match_all_rules: true,
            sort_field: Field::Name,
            sort_ascending: true,
            max_entries: None,
            truncate_field: Field::Id,
            truncate_ascending: true,
        }
    }

    pub fn id(mut self, id: PlaylistId) -> Self {
        self.id = id;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules = rules.into_iter().collect();
        self
    }

    pub fn match_all_rules(mut self, match_all: bool) -> Self {
        self.match_all_rules = match_all;
        self
    }

    pub fn sort_by(mut self, field: Field, ascending: bool) -> Self {
        self.sort_field = field;
        self.sort_ascending = ascending;
        self
    }

    pub fn max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn truncate_by(mut self, field: Field, ascending: bool) -> Self {
        self.truncate_field = field;
        self.truncate_ascending = ascending;
        self
    }

    /// Validate and freeze the definition
    pub fn build(self) -> Result<AutoPlaylistDefinition> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PlaylistError::EmptyName);
        }
        if self.sort_field == Field::Id {
            return Err(PlaylistError::invalid_definition(
                "auto playlists cannot be sorted by id",
            ));
        }
        if self.max_entries == Some(0) {
            return Err(PlaylistError::invalid_definition(
                "maximum entries must be positive or unlimited",
            ));
        }

        Ok(AutoPlaylistDefinition {
            id: self.id,
            name: name.to_string(),
            rules: self.rules,
            match_all_rules: self.match_all_rules,
            sort_field: self.sort_field,
            sort_ascending: self.sort_ascending,
            max_entries: self.max_entries,
            truncate_field: self.truncate_field,
            truncate_ascending: self.truncate_ascending,
        })
    }
}

/// On-disk shape of a definition
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDefinition {
    playlist_id: PlaylistId,
    playlist_name: String,
    maximum_entries: i64,
    truncate_method: Field,
    truncate_ascending: bool,
    match_all_rules: bool,
    rules: Vec<Rule>,
    sort_method: Field,
    sort_ascending: bool,
}

impl From<AutoPlaylistDefinition> for StoredDefinition {
    fn from(definition: AutoPlaylistDefinition) -> Self {
        Self {
            playlist_id: definition.id,
            playlist_name: definition.name,
            maximum_entries: definition
                .max_entries
                .map_or(UNLIMITED_ENTRIES, |max| max as i64),
            truncate_method: definition.truncate_field,
            truncate_ascending: definition.truncate_ascending,
            match_all_rules: definition.match_all_rules,
            rules: definition.rules,
            sort_method: definition.sort_field,
            sort_ascending: definition.sort_ascending,
        }
    }
}

impl TryFrom<StoredDefinition> for AutoPlaylistDefinition {
    type Error = PlaylistError;

    fn try_from(stored: StoredDefinition) -> Result<Self> {
        let max_entries = match stored.maximum_entries {
            UNLIMITED_ENTRIES => None,
            max if max > 0 => Some(max as usize),
            other => {
                return Err(PlaylistError::invalid_definition(format!(
                    "invalid maximum entries {}",
                    other
                )))
            }
        };

        AutoPlaylistBuilder::new(stored.playlist_name)
            .id(stored.playlist_id)
            .rules(stored.rules)
            .match_all_rules(stored.match_all_rules)
            .sort_by(stored.sort_method, stored.sort_ascending)
            .max_entries(max_entries)
            .truncate_by(stored.truncate_method, stored.truncate_ascending)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Comparator, EntityType};

    fn love_rule() -> Rule {
        Rule::new(EntityType::Song, Field::Name, Comparator::Contains, "Love").unwrap()
    }

    #[test]
    fn builder_defaults() {
        let definition = AutoPlaylistDefinition::builder(" Loved ").build().unwrap();

        assert_eq!(definition.name(), "Loved");
        assert!(!definition.is_assigned());
        assert!(definition.match_all_rules());
        assert_eq!(definition.sort_field(), Field::Name);
        assert_eq!(definition.max_entries(), None);
        assert_eq!(definition.truncate_field(), Field::Id);
    }

    #[test]
    fn builder_rejects_invalid_policies() {
        assert!(matches!(
            AutoPlaylistBuilder::new("  ").build(),
            Err(PlaylistError::EmptyName)
        ));
        assert!(matches!(
            AutoPlaylistBuilder::new("x").sort_by(Field::Id, true).build(),
            Err(PlaylistError::InvalidDefinition(_))
        ));
        assert!(matches!(
            AutoPlaylistBuilder::new("x").max_entries(Some(0)).build(),
            Err(PlaylistError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn edits_produce_new_values() {
        let original = AutoPlaylistBuilder::new("Mix").rule(love_rule()).build().unwrap();
        let edited = original
            .to_builder()
            .match_all_rules(false)
            .build()
            .unwrap();

        assert!(original.match_all_rules());
        assert!(!edited.match_all_rules());
        assert!(!original.has_same_rules(&edited));
        assert!(original.has_same_rules(&original.with_identity(PlaylistId::new(3), "Other")));
    }

    #[test]
    fn unlimited_is_stored_as_sentinel() {
        let definition = AutoPlaylistBuilder::new("All").build().unwrap();
        let json = serde_json::to_value(&definition).unwrap();

        assert_eq!(json["maximumEntries"], serde_json::json!(-1));
        assert_eq!(json["sortMethod"], serde_json::json!(6));
        assert_eq!(json["truncateMethod"], serde_json::json!(5));
    }

    #[test]
    fn definitions_survive_serialization() {
        let definition = AutoPlaylistBuilder::new("Mix")
            .id(PlaylistId::new(12))
            .rule(love_rule())
            .rule(Rule::new(EntityType::Artist, Field::Name, Comparator::Equals, "Queen").unwrap())
            .rule(Rule::new(EntityType::Song, Field::PlayCount, Comparator::GreaterThan, "5").unwrap())
            .match_all_rules(false)
            .sort_by(Field::DateAdded, true)
            .max_entries(Some(25))
            .build()
            .unwrap();

        let json = serde_json::to_string_pretty(&definition).unwrap();
        let restored: AutoPlaylistDefinition = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, definition);
        assert_eq!(restored.rules().len(), 3);
        assert_eq!(restored.max_entries(), Some(25));
    }

    #[test]
    fn stored_definitions_are_validated() {
        let json = serde_json::json!({
            "playlistId": 1,
            "playlistName": "Broken",
            "maximumEntries": 0,
            "truncateMethod": 5,
            "truncateAscending": true,
            "matchAllRules": true,
            "rules": [],
            "sortMethod": 6,
            "sortAscending": true
        });
        assert!(serde_json::from_value::<AutoPlaylistDefinition>(json).is_err());
    }
}
