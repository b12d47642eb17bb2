//! Tagged views over document nodes.
//!
//! The traversal never inspects a [`Value`] directly: it classifies each node
//! once as an object, an array, or a scalar leaf and dispatches on that tag.
//!
//! Extended-JSON wrappers such as `{"$date": "2024-01-01T00:00:00Z"}` or
//! `{"$oid": "..."}` are single-key objects whose key starts with `$`. They
//! encode one typed scalar, so they are classified as [`Node::Scalar`].

use serde_json::{Map, Value};

/// A document: string keys mapped to arbitrary JSON values.
pub type Document = Map<String, Value>;

/// Shared view of a document node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A nested document.
    Object(&'a Document),
    /// An ordered sequence.
    Array(&'a [Value]),
    /// A leaf value, including `null` and extended-JSON wrappers.
    Scalar(&'a Value),
}

/// Mutable view of a document node.
#[derive(Debug)]
pub enum NodeMut<'a> {
    /// A nested document.
    Object(&'a mut Document),
    /// An ordered sequence.
    Array(&'a mut Vec<Value>),
    /// A leaf value, including `null` and extended-JSON wrappers.
    Scalar(&'a mut Value),
}

impl<'a> Node<'a> {
    /// Classify a value.
    #[must_use]
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) if !is_extended_scalar(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            _ => Self::Scalar(value),
        }
    }

    /// Short name of the node kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Object,
            Self::Array(_) => NodeKind::Array,
            Self::Scalar(_) => NodeKind::Scalar,
        }
    }
}

impl<'a> NodeMut<'a> {
    /// Classify a value for mutation.
    pub fn of(value: &'a mut Value) -> Self {
        if Node::of(value).kind() == NodeKind::Scalar {
            return Self::Scalar(value);
        }
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            other => Self::Scalar(other),
        }
    }

    /// Short name of the node kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Object,
            Self::Array(_) => NodeKind::Array,
            Self::Scalar(_) => NodeKind::Scalar,
        }
    }
}

impl<'a> From<&'a mut Document> for NodeMut<'a> {
    fn from(document: &'a mut Document) -> Self {
        Self::Object(document)
    }
}

/// The kind of a node, without the borrowed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum NodeKind {
    /// A nested document.
    #[display("document")]
    Object,
    /// An ordered sequence.
    #[display("list")]
    Array,
    /// A leaf value.
    #[display("scalar")]
    Scalar,
}

/// Whether a map is an extended-JSON typed scalar (`{"$date": ...}`).
#[must_use]
pub fn is_extended_scalar(map: &Document) -> bool {
    let mut keys = map.keys();
    match (keys.next(), keys.next()) {
        (Some(key), None) => key.starts_with('$'),
        _ => false,
    }
}

/// Human readable label for a document identity value.
///
/// Strings are used as is, extended-JSON wrappers are unwrapped
/// (`{"$oid": "abc"}` gives `abc`), anything else is rendered as JSON.
#[must_use]
pub fn identity_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) if is_extended_scalar(map) => {
            map.values().next().map(identity_label).unwrap_or_default()
        }
        other => other.to_string(),
    }
}
