//! Frontmatter metadata value model.
//!
//! # Responsibility
//! - Represent parsed frontmatter as an explicit sum type instead of an
//!   untyped dictionary.
//! - Convert between the YAML document model and the engine model.
//!
//! # Invariants
//! - `Metadata` preserves key insertion order; re-rendering a parsed block
//!   keeps keys in the order the author wrote them.
//! - Keys are unique; `insert` replaces in place without moving the key.
//! - `merge` is shallow: nested maps are merged one level deep only.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_yaml::{Mapping, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    UInteger(u64),
    Float(f64),
    String(String),
    /// Items keep their own type so unrelated keys survive an update intact.
    List(Vec<MetaValue>),
    Map(Metadata),
}

impl MetaValue {
    /// Returns the string payload for `MetaValue::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the nested mapping for `MetaValue::Map`.
    pub fn as_map(&self) -> Option<&Metadata> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Renders scalars as display text. Lists and maps yield `None`.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::UInteger(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::String(value) => Some(value.clone()),
            Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Returns the list-of-strings view of a list value.
    ///
    /// Scalar items are rendered as text; null, nested lists and maps are
    /// skipped. Non-list values yield `None`.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Self::List(items) => Some(items.iter().filter_map(Self::scalar_text).collect()),
            _ => None,
        }
    }

    /// Appends every scalar reachable from this value to `out`, separated by
    /// spaces.
    pub fn collect_text(&self, out: &mut String) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.collect_text(out);
                }
            }
            Self::Map(map) => {
                for (_, value) in map.iter() {
                    value.collect_text(out);
                }
            }
            scalar => {
                if let Some(text) = scalar.scalar_text() {
                    out.push(' ');
                    out.push_str(&text);
                }
            }
        }
    }

    /// Converts a YAML value into the engine model.
    ///
    /// Tagged values are unwrapped; non-string mapping keys are stringified.
    pub fn from_yaml(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => number_to_meta(&number),
            Value::String(value) => Self::String(value),
            Value::Sequence(items) => Self::List(items.into_iter().map(Self::from_yaml).collect()),
            Value::Mapping(mapping) => Self::Map(Metadata::from_mapping(mapping)),
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }

    /// Converts back into a YAML value for serialization.
    pub fn to_yaml(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Integer(value) => Value::Number(Number::from(*value)),
            Self::UInteger(value) => Value::Number(Number::from(*value)),
            Self::Float(value) => Value::Number(Number::from(*value)),
            Self::String(value) => Value::String(value.clone()),
            Self::List(items) => Value::Sequence(items.iter().map(Self::to_yaml).collect()),
            Self::Map(map) => Value::Mapping(map.to_mapping()),
        }
    }

    /// Parses one edit value the way a user would type it on a command line.
    ///
    /// YAML scalars and flow collections keep their type (`true`, `3`,
    /// `[a, b]`); anything else, including empty input, stays a string.
    pub fn parse_loose(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::String(String::new());
        }
        match serde_yaml::from_str::<Value>(trimmed) {
            Ok(Value::String(_)) | Err(_) => Self::String(trimmed.to_string()),
            Ok(Value::Null) if trimmed != "null" && trimmed != "~" => {
                Self::String(trimmed.to_string())
            }
            // `title=Meeting: notes` is a string, not a one-key map.
            Ok(Value::Mapping(_)) if !trimmed.starts_with('{') => {
                Self::String(trimmed.to_string())
            }
            Ok(Value::Sequence(_)) if !trimmed.starts_with('[') => {
                Self::String(trimmed.to_string())
            }
            Ok(value) => Self::from_yaml(value),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

fn number_to_meta(number: &Number) -> MetaValue {
    if let Some(value) = number.as_i64() {
        MetaValue::Integer(value)
    } else if let Some(value) = number.as_u64() {
        MetaValue::UInteger(value)
    } else {
        MetaValue::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

fn yaml_key_to_string(key: Value) -> String {
    match key {
        Value::String(value) => value,
        Value::Bool(value) => value.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Insertion-ordered metadata mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(String, MetaValue)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces one key, returning the previous value.
    ///
    /// Replaced keys keep their original position.
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) -> Option<MetaValue> {
        let key = key.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Applies edits on top of this mapping.
    ///
    /// # Merge rule
    /// - New keys are appended.
    /// - Existing keys are overwritten.
    /// - When both the existing and the new value are maps, the new map is
    ///   merged into the existing one key by key, one level deep only. Deeper
    ///   values are replaced wholesale.
    pub fn merge(&mut self, edits: Metadata) {
        for (key, value) in edits.entries {
            match (self.get_mut(&key), value) {
                (Some(MetaValue::Map(existing)), MetaValue::Map(incoming)) => {
                    for (nested_key, nested_value) in incoming.entries {
                        existing.insert(nested_key, nested_value);
                    }
                }
                (_, value) => {
                    self.insert(key, value);
                }
            }
        }
    }

    /// Flattens every scalar value (keys excluded) into one text blob.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for (_, value) in self.iter() {
            value.collect_text(&mut out);
        }
        out
    }

    /// Builds metadata from a YAML mapping.
    pub fn from_mapping(mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .map(|(key, value)| (yaml_key_to_string(key), MetaValue::from_yaml(value)))
            .collect::<Vec<_>>();
        let mut metadata = Self::new();
        for (key, value) in entries {
            metadata.insert(key, value);
        }
        metadata
    }

    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        for (key, value) in self.iter() {
            mapping.insert(Value::String(key.to_string()), value.to_yaml());
        }
        mapping
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut MetaValue> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, MetaValue)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, MetaValue)>>(iter: T) -> Self {
        let mut metadata = Self::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}

/// Error for malformed `key=value` edit input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditParseError {
    /// Input contains no `=` separator.
    MissingSeparator(String),
    /// Key part is blank.
    EmptyKey(String),
}

impl Display for EditParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator(raw) => {
                write!(f, "edit `{raw}` must have the form key=value")
            }
            Self::EmptyKey(raw) => write!(f, "edit `{raw}` has an empty key"),
        }
    }
}

impl Error for EditParseError {}

/// Parses one `key=value` edit.
///
/// Only the first `=` separates key from value, so values may contain `=`.
pub fn parse_edit(raw: &str) -> Result<(String, MetaValue), EditParseError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(EditParseError::MissingSeparator(raw.to_string()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(EditParseError::EmptyKey(raw.to_string()));
    }
    Ok((key.to_string(), MetaValue::parse_loose(value)))
}

/// Parses many `key=value` edits into one ordered mapping.
pub fn parse_edits<I, S>(raw_edits: I) -> Result<Metadata, EditParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut edits = Metadata::new();
    for raw in raw_edits {
        let (key, value) = parse_edit(raw.as_ref())?;
        edits.insert(key, value);
    }
    Ok(edits)
}
