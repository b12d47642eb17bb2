//! Dotted field paths.
//!
//! A field path like `providerDetails.renderingProviders.renderingProviderName`
//! is split on `.` into [`Segment`]s. The token `*` is a wildcard matching
//! every key of the document found at that level:
//!
//! - `name` - top-level `name` field
//! - `address.city` - nested field
//! - `users.name` - `name` of every document in the `users` list
//! - `*.charges.renderingProviderId` - under every top-level key
//!
//! Lists are traversed implicitly: a literal segment applied to a list is
//! applied to each document element of that list. There is no index syntax.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// The wildcard token.
pub const WILDCARD: &str = "*";

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A literal document key.
    Key(String),
    /// `*`: every key of the current document.
    Wildcard,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            Self::Wildcard
        } else {
            Self::Key(raw.to_string())
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// A parsed, immutable field path.
///
/// The original dotted string is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is empty
    /// - A segment is empty (`a..b`, `.a`, `a.`)
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, raw) in path.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                    position,
                });
            }
            segments.push(Segment::parse(raw));
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The path as written in the field map.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The segments, never empty.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Self::parse(path)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
