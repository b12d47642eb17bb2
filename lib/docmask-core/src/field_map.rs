use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Deserializer;

use crate::error::FieldMapError;
use crate::path::FieldPath;
use crate::type_tag::TypeTag;

/// One entry of a field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    /// Where to mask.
    pub path: FieldPath,
    /// What to generate.
    pub tag: TypeTag,
}

/// The set of field paths to mask and their type tags.
///
/// Loaded once before a run from a JSON object such as:
///
/// ```json
/// {
///   "name": "name",
///   "address.city": "city",
///   "*.charges.renderingProviderId": "id"
/// }
/// ```
///
/// Entries are independent: the masking result does not depend on their order.
/// File order is kept so that seeded runs are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    rules: Vec<FieldRule>,
}

impl FieldMap {
    /// Parse a field map from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of strings, or if a
    /// key is not a valid field path.
    pub fn from_json_str(json: &str) -> Result<Self, FieldMapError> {
        let mut deserializer = Deserializer::from_str(json);
        let raw: IndexMap<String, TypeTag> =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
                FieldMapError::Malformed {
                    path: err.path().to_string(),
                    error: err.into_inner(),
                }
            })?;
        deserializer.end().map_err(|error| FieldMapError::Malformed {
            path: ".".to_string(),
            error,
        })?;

        let rules = raw
            .into_iter()
            .map(|(path, tag)| {
                Ok(FieldRule {
                    path: FieldPath::parse(&path)?,
                    tag,
                })
            })
            .collect::<Result<Vec<_>, FieldMapError>>()?;

        Ok(Self { rules })
    }

    /// Load a field map file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or for the reasons listed
    /// in [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FieldMapError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|error| FieldMapError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_json_str(&json)
    }

    /// Build a field map from `(path, tag)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is invalid.
    pub fn try_from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, FieldMapError> {
        let rules = pairs
            .into_iter()
            .map(|(path, tag)| {
                Ok(FieldRule {
                    path: FieldPath::parse(path)?,
                    tag: TypeTag::from(tag),
                })
            })
            .collect::<Result<Vec<_>, FieldMapError>>()?;
        Ok(Self { rules })
    }

    /// Iterate over the rules in file order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the map has no rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Tags that no generation rule knows; they fall back to a generic word.
    pub fn unknown_tags(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter().filter(|rule| !rule.tag.is_known())
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = &'a FieldRule;
    type IntoIter = std::slice::Iter<'a, FieldRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
