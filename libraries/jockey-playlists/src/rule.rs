//! Auto playlist rules
//!
//! A [`Rule`] is an immutable predicate: an entity type, one of its fields,
//! a comparator and a string-encoded literal. Which fields an entity offers
//! and which comparators a field accepts are checked when the rule is built.
//! Literal values are only parsed at evaluation time.

use crate::error::{PlaylistError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity a rule filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EntityType {
    Playlist,
    Song,
    Artist,
    Album,
    Genre,
}

/// The attribute of an entity a rule compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Field {
    Id,
    Name,
    PlayCount,
    SkipCount,
    Year,
    DateAdded,
    DatePlayed,
}

/// How a rule compares a field against its literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Comparator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    LessThan,
    GreaterThan,
}

impl EntityType {
    pub const ALL: [Self; 5] = [
        Self::Playlist,
        Self::Song,
        Self::Artist,
        Self::Album,
        Self::Genre,
    ];

    /// Stable code used in configuration files
    pub const fn code(self) -> u8 {
        match self {
            Self::Playlist => 0,
            Self::Song => 1,
            Self::Artist => 2,
            Self::Album => 3,
            Self::Genre => 4,
        }
    }

    /// Whether rules on this entity may compare `field`
    ///
    /// Songs expose every field; grouping entities only have an id and a name.
    pub fn allows(self, field: Field) -> bool {
        match self {
            Self::Song => true,
            Self::Playlist | Self::Artist | Self::Album | Self::Genre => {
                matches!(field, Field::Id | Field::Name)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Playlist => "Playlist",
            Self::Song => "Song",
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::Genre => "Genre",
        }
    }
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Name,
        Self::PlayCount,
        Self::SkipCount,
        Self::Year,
        Self::DateAdded,
        Self::DatePlayed,
    ];

    /// Stable code used in configuration files
    pub const fn code(self) -> u8 {
        match self {
            Self::Id => 5,
            Self::Name => 6,
            Self::PlayCount => 7,
            Self::SkipCount => 8,
            Self::Year => 9,
            Self::DateAdded => 10,
            Self::DatePlayed => 11,
        }
    }

    /// Fields whose literal is parsed as an integer and ordered numerically
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Name)
    }

    /// Fields holding epoch-millisecond timestamps
    pub fn is_date(self) -> bool {
        matches!(self, Self::DateAdded | Self::DatePlayed)
    }

    /// Whether `comparator` can be applied to this field
    pub fn allows(self, comparator: Comparator) -> bool {
        match self {
            Self::Id => matches!(comparator, Comparator::Equals | Comparator::NotEquals),
            Self::Name => !comparator.is_ordering(),
            _ => !comparator.is_substring(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::PlayCount => "play count",
            Self::SkipCount => "skip count",
            Self::Year => "year",
            Self::DateAdded => "date added",
            Self::DatePlayed => "date played",
        }
    }
}

impl Comparator {
    pub const ALL: [Self; 6] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::LessThan,
        Self::GreaterThan,
    ];

    /// Stable code used in configuration files
    pub const fn code(self) -> u8 {
        match self {
            Self::Equals => 12,
            Self::NotEquals => 13,
            Self::Contains => 14,
            Self::NotContains => 15,
            Self::LessThan => 16,
            Self::GreaterThan => 17,
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, Self::LessThan | Self::GreaterThan)
    }

    pub fn is_substring(self) -> bool {
        matches!(self, Self::Contains | Self::NotContains)
    }

    /// Verb phrase shown to users; dates read as "before"/"after"
    pub fn label(self, field: Field) -> &'static str {
        match (self, field.is_date()) {
            (Self::Equals, false) => "is",
            (Self::Equals, true) => "is on",
            (Self::NotEquals, false) => "is not",
            (Self::NotEquals, true) => "is not on",
            (Self::Contains, _) => "contains",
            (Self::NotContains, _) => "does not contain",
            (Self::LessThan, false) => "is less than",
            (Self::LessThan, true) => "is before",
            (Self::GreaterThan, false) => "is greater than",
            (Self::GreaterThan, true) => "is after",
        }
    }
}

macro_rules! code_conversions {
    ($ty:ident, $what:literal) => {
        impl From<$ty> for u8 {
            fn from(value: $ty) -> Self {
                value.code()
            }
        }

        impl TryFrom<u8> for $ty {
            type Error = PlaylistError;

            fn try_from(code: u8) -> Result<Self> {
                $ty::ALL
                    .into_iter()
                    .find(|candidate| candidate.code() == code)
                    .ok_or_else(|| {
                        PlaylistError::invalid_rule(format!("unknown {} code {}", $what, code))
                    })
            }
        }
    };
}

code_conversions!(EntityType, "entity type");
code_conversions!(Field, "field");
code_conversions!(Comparator, "comparator");

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single auto playlist filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StoredRule", into = "StoredRule")]
pub struct Rule {
    entity: EntityType,
    field: Field,
    comparator: Comparator,
    value: String,
}

impl Rule {
    /// Build a rule, rejecting illegal field/comparator combinations
    pub fn new(
        entity: EntityType,
        field: Field,
        comparator: Comparator,
        value: impl Into<String>,
    ) -> Result<Self> {
        if !entity.allows(field) {
            return Err(PlaylistError::invalid_rule(format!(
                "{} rules cannot compare {}",
                entity.label(),
                field
            )));
        }
        if !field.allows(comparator) {
            return Err(PlaylistError::invalid_rule(format!(
                "{} cannot be compared with '{}'",
                field,
                comparator.label(field)
            )));
        }

        Ok(Self {
            entity,
            field,
            comparator,
            value: value.into(),
        })
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Copy of this rule with a different literal
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }

    /// Parse the literal as an integer for numeric fields
    pub fn numeric_value(&self) -> Result<i64> {
        self.value
            .trim()
            .parse::<i64>()
            .map_err(|e| PlaylistError::MalformedRule {
                field: self.field,
                value: self.value.clone(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} \"{}\"",
            self.entity.label(),
            self.field,
            self.comparator.label(self.field),
            self.value
        )
    }
}

#[derive(Serialize, Deserialize)]
struct StoredRule {
    #[serde(rename = "type")]
    entity: EntityType,
    field: Field,
    #[serde(rename = "match")]
    comparator: Comparator,
    value: String,
}

impl From<Rule> for StoredRule {
    fn from(rule: Rule) -> Self {
        Self {
            entity: rule.entity,
            field: rule.field,
            comparator: rule.comparator,
            value: rule.value,
        }
    }
}

impl TryFrom<StoredRule> for Rule {
    type Error = PlaylistError;

    fn try_from(stored: StoredRule) -> Result<Self> {
        Rule::new(stored.entity, stored.field, stored.comparator, stored.value)
    }
}

/// A rule shape offered to editors, without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTemplate {
    pub entity: EntityType,
    pub field: Field,
    pub comparator: Comparator,
}

impl RuleTemplate {
    /// Every legal field/comparator pair for an entity type
    pub fn catalogue(entity: EntityType) -> Vec<RuleTemplate> {
        Field::ALL
            .into_iter()
            .filter(|field| entity.allows(*field))
            .flat_map(|field| {
                Comparator::ALL
                    .into_iter()
                    .filter(move |comparator| field.allows(*comparator))
                    .map(move |comparator| RuleTemplate {
                        entity,
                        field,
                        comparator,
                    })
            })
            .collect()
    }

    /// Human-readable description such as "Song play count is greater than"
    pub fn label(&self) -> String {
        format!(
            "{} {} {}",
            self.entity.label(),
            self.field,
            self.comparator.label(self.field)
        )
    }

    /// Fill in the template's literal
    pub fn rule(&self, value: impl Into<String>) -> Result<Rule> {
        Rule::new(self.entity, self.field, self.comparator, value)
    }
}
