//! Non-fatal masking diagnostics.
//!
//! A diagnostic reports a field path that could not be applied somewhere in a
//! document: a missing key, or a structure the traversal does not descend
//! into. Diagnostics never stop processing; the affected position is simply
//! left unmodified.
//!
//! The core only hands diagnostics to a [`DiagnosticSink`]. Whether they are
//! shown, counted, or dropped is up to the caller:
//!
//! - [`IgnoreDiagnostics`] drops everything
//! - [`CollectDiagnostics`] keeps them for inspection
//! - [`LogDiagnostics`] emits `tracing` warnings
//! - Functions `FnMut(Diagnostic)` receive each diagnostic

use std::fmt;

use crate::node::NodeKind;
use crate::type_tag::TypeTag;

/// Label used when a document has no `_id`.
pub const NO_ID: &str = "NO_ID";

/// An observation about a field path that did not fully apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identity of the document (`_id`, or [`NO_ID`]).
    pub document_id: String,
    /// The field path being applied.
    pub field: String,
    /// The type tag of that field.
    pub tag: TypeTag,
    /// What happened.
    pub kind: DiagnosticKind,
}

/// The reason for a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The key is absent where the path expects it.
    MissingKey {
        /// The missing key.
        key: String,
    },
    /// A list element is itself a list; nested lists are not traversed.
    NestedList {
        /// The key the path was looking for.
        key: String,
    },
    /// A list element is not a document while more path segments remain.
    NotADocument {
        /// The key the path was looking for.
        key: String,
        /// What was found instead.
        found: NodeKind,
    },
    /// The matched value is a container that cannot be replaced without
    /// changing the document shape.
    UnsupportedTarget {
        /// The matched key.
        key: String,
        /// What was found.
        found: NodeKind,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            document_id,
            field,
            tag,
            kind,
        } = self;
        match kind {
            DiagnosticKind::MissingKey { key } => write!(
                f,
                "[{document_id}] key {key} of type {tag} not found in document (field {field})"
            ),
            DiagnosticKind::NestedList { key } => write!(
                f,
                "[{document_id}] nested list not supported, {key} is a list (field {field})"
            ),
            DiagnosticKind::NotADocument { key, found } => write!(
                f,
                "[{document_id}] expected a document holding {key}, found a {found} (field {field})"
            ),
            DiagnosticKind::UnsupportedTarget { key, found } => write!(
                f,
                "[{document_id}] {key} is a {found} and cannot be masked as {tag} (field {field})"
            ),
        }
    }
}

/// Receives diagnostics emitted while masking.
pub trait DiagnosticSink {
    /// Handle one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(Diagnostic),
{
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic);
    }
}

/// Drops every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreDiagnostics;

impl DiagnosticSink for IgnoreDiagnostics {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Clone, Default, derive_more::Deref)]
pub struct CollectDiagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl CollectDiagnostics {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected diagnostics.
    #[must_use]
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Logs diagnostics as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(key: &str) -> Diagnostic {
        Diagnostic {
            document_id: "7124016".to_string(),
            field: format!("patientAddress.{key}"),
            tag: TypeTag::City,
            kind: DiagnosticKind::MissingKey {
                key: key.to_string(),
            },
        }
    }

    #[test]
    fn should_display_diagnostics() {
        insta::assert_snapshot!(
            missing("patientCity"),
            @"[7124016] key patientCity of type city not found in document (field patientAddress.patientCity)"
        );

        let nested = Diagnostic {
            document_id: NO_ID.to_string(),
            field: "users.name".to_string(),
            tag: TypeTag::Name,
            kind: DiagnosticKind::NestedList {
                key: "name".to_string(),
            },
        };
        insta::assert_snapshot!(
            nested,
            @"[NO_ID] nested list not supported, name is a list (field users.name)"
        );

        let target = Diagnostic {
            kind: DiagnosticKind::UnsupportedTarget {
                key: "address".to_string(),
                found: NodeKind::Object,
            },
            ..missing("address")
        };
        insta::assert_snapshot!(
            target,
            @"[7124016] address is a document and cannot be masked as city (field patientAddress.address)"
        );
    }

    #[test]
    fn should_collect_diagnostics() {
        let mut sink = CollectDiagnostics::new();
        sink.report(missing("a"));
        sink.report(missing("b"));

        assert_eq!(sink.len(), 2);
        let keys = sink
            .into_inner()
            .into_iter()
            .map(|diagnostic| diagnostic.field)
            .collect::<Vec<_>>();
        assert_eq!(keys, ["patientAddress.a", "patientAddress.b"]);
    }

    #[test]
    fn should_accept_closures() {
        let mut seen = Vec::new();
        let mut sink = |diagnostic: Diagnostic| seen.push(diagnostic.document_id);
        sink.report(missing("a"));
        assert_eq!(seen, ["7124016"]);
    }
}
