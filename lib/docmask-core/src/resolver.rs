//! The recursive field path traversal.
//!
//! Given a node and the remaining path segments, the resolver finds every
//! value the path reaches and replaces it with a distinct substitute:
//!
//! - With one segment left, the segment is looked up in the node (or in each
//!   document of a list node) and the value found is replaced.
//! - With more segments left, the traversal descends into the value found
//!   (or into every value for `*`) with the remaining segments.
//!
//! Absent keys are never created. A missing final key is always reported; a
//! missing intermediate key is silent unless strict reporting is enabled,
//! since optional nested structures are common.

use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, NO_ID};
use crate::distinct::{DEFAULT_MAX_ATTEMPTS, Distinct};
use crate::error::GenerateError;
use crate::generator::SubstituteGenerator;
use crate::node::{Document, NodeKind, NodeMut};
use crate::path::{FieldPath, Segment};
use crate::type_tag::TypeTag;

/// Applies one field path to one document.
pub struct FieldResolver<'a, G: ?Sized, S: ?Sized> {
    generator: &'a mut G,
    max_attempts: usize,
    diagnostics: &'a mut S,
    document_id: &'a str,
    path: &'a FieldPath,
    tag: &'a TypeTag,
    report_missing_intermediate: bool,
    replaced: usize,
}

impl<'a, G, S> FieldResolver<'a, G, S>
where
    G: SubstituteGenerator + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    /// Create a resolver for `path`, generating `tag` substitutes.
    ///
    /// `document_id` only labels diagnostics.
    pub fn new(
        generator: &'a mut G,
        diagnostics: &'a mut S,
        document_id: &'a str,
        path: &'a FieldPath,
        tag: &'a TypeTag,
    ) -> Self {
        Self {
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            diagnostics,
            document_id,
            path,
            tag,
            report_missing_intermediate: false,
            replaced: 0,
        }
    }

    /// Ceiling for the distinctness retries.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Also report keys missing before the last segment.
    #[must_use]
    pub fn with_missing_intermediate_reported(mut self, report: bool) -> Self {
        self.report_missing_intermediate = report;
        self
    }

    /// Walk `node` and replace every reached value.
    ///
    /// Returns the number of replaced values.
    ///
    /// # Errors
    ///
    /// Propagates substitute generation failures.
    pub fn apply(mut self, node: NodeMut<'_>) -> Result<usize, GenerateError> {
        let path = self.path;
        self.walk(node, path.segments())?;
        Ok(self.replaced)
    }

    fn walk(&mut self, node: NodeMut<'_>, segments: &[Segment]) -> Result<(), GenerateError> {
        match segments {
            [] => Ok(()),
            [last] => self.apply_last(node, last),
            [first, rest @ ..] => self.descend(node, first, rest),
        }
    }

    fn apply_last(&mut self, node: NodeMut<'_>, segment: &Segment) -> Result<(), GenerateError> {
        match node {
            NodeMut::Object(document) => self.replace_in(document, segment)?,
            NodeMut::Array(items) => {
                for item in items {
                    match NodeMut::of(item) {
                        NodeMut::Object(document) => self.replace_in(document, segment)?,
                        NodeMut::Array(_) => self.report(DiagnosticKind::NestedList {
                            key: segment.to_string(),
                        }),
                        // scalars in a list hold no keys
                        NodeMut::Scalar(_) => {}
                    }
                }
            }
            NodeMut::Scalar(_) => self.report(DiagnosticKind::MissingKey {
                key: segment.to_string(),
            }),
        }
        Ok(())
    }

    fn replace_in(
        &mut self,
        document: &mut Document,
        segment: &Segment,
    ) -> Result<(), GenerateError> {
        match segment {
            Segment::Key(key) => match document.get_mut(key) {
                Some(value) => self.replace(key, value)?,
                None => self.report(DiagnosticKind::MissingKey { key: key.clone() }),
            },
            Segment::Wildcard => {
                for (key, value) in document.iter_mut() {
                    self.replace(key, value)?;
                }
            }
        }
        Ok(())
    }

    fn replace(&mut self, key: &str, value: &mut Value) -> Result<(), GenerateError> {
        match NodeMut::of(value) {
            NodeMut::Scalar(leaf) => self.replace_leaf(leaf)?,
            NodeMut::Array(items) => {
                for item in items {
                    match NodeMut::of(item) {
                        NodeMut::Scalar(leaf) => self.replace_leaf(leaf)?,
                        NodeMut::Array(_) => self.report(DiagnosticKind::NestedList {
                            key: key.to_string(),
                        }),
                        NodeMut::Object(_) => self.report(DiagnosticKind::UnsupportedTarget {
                            key: key.to_string(),
                            found: NodeKind::Object,
                        }),
                    }
                }
            }
            NodeMut::Object(_) => self.report(DiagnosticKind::UnsupportedTarget {
                key: key.to_string(),
                found: NodeKind::Object,
            }),
        }
        Ok(())
    }

    fn replace_leaf(&mut self, leaf: &mut Value) -> Result<(), GenerateError> {
        *leaf = Distinct::with_max_attempts(&mut *self.generator, self.max_attempts)
            .generate_distinct(self.tag, leaf)?;
        self.replaced += 1;
        Ok(())
    }

    fn descend(
        &mut self,
        node: NodeMut<'_>,
        segment: &Segment,
        rest: &[Segment],
    ) -> Result<(), GenerateError> {
        match node {
            NodeMut::Object(document) => self.descend_into(document, segment, rest)?,
            NodeMut::Array(items) => {
                for item in items {
                    match NodeMut::of(item) {
                        NodeMut::Object(document) => self.descend_into(document, segment, rest)?,
                        NodeMut::Array(_) => self.report(DiagnosticKind::NestedList {
                            key: segment.to_string(),
                        }),
                        NodeMut::Scalar(_) => self.report(DiagnosticKind::NotADocument {
                            key: segment.to_string(),
                            found: NodeKind::Scalar,
                        }),
                    }
                }
            }
            // reached through a wildcard or a scalar on the way: nothing to descend into
            NodeMut::Scalar(_) => {}
        }
        Ok(())
    }

    fn descend_into(
        &mut self,
        document: &mut Document,
        segment: &Segment,
        rest: &[Segment],
    ) -> Result<(), GenerateError> {
        match segment {
            Segment::Key(key) => match document.get_mut(key) {
                Some(child) => self.walk(NodeMut::of(child), rest)?,
                None if self.report_missing_intermediate => {
                    self.report(DiagnosticKind::MissingKey { key: key.clone() });
                }
                None => {}
            },
            Segment::Wildcard => {
                for child in document.values_mut() {
                    self.walk(NodeMut::of(child), rest)?;
                }
            }
        }
        Ok(())
    }

    fn report(&mut self, kind: DiagnosticKind) {
        self.diagnostics.report(Diagnostic {
            document_id: self.document_id.to_string(),
            field: self.path.to_string(),
            tag: self.tag.clone(),
            kind,
        });
    }
}

/// Replace every value reached by `path` in `node` with a distinct `tag`
/// substitute.
///
/// This is the one-shot form of [`FieldResolver`], with default settings and
/// diagnostics labelled [`NO_ID`]. Returns the number of replaced values.
///
/// # Errors
///
/// Propagates substitute generation failures.
pub fn apply<G, S>(
    node: &mut Value,
    path: &FieldPath,
    tag: &TypeTag,
    generator: &mut G,
    diagnostics: &mut S,
) -> Result<usize, GenerateError>
where
    G: SubstituteGenerator + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    FieldResolver::new(generator, diagnostics, NO_ID, path, tag).apply(NodeMut::of(node))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::diagnostics::{CollectDiagnostics, IgnoreDiagnostics};

    /// Generates `<tag>-<n>` strings, so every substitute is unique and
    /// predictable.
    fn counter() -> impl FnMut(&TypeTag) -> Result<Value, GenerateError> {
        let mut count = 0;
        move |tag: &TypeTag| {
            count += 1;
            Ok(json!(format!("{tag}-{count}")))
        }
    }

    fn mask(mut value: Value, path: &str, tag: TypeTag) -> (Value, Vec<Diagnostic>) {
        let path = FieldPath::parse(path).expect("valid path");
        let mut generator = counter();
        let mut diagnostics = CollectDiagnostics::new();
        apply(&mut value, &path, &tag, &mut generator, &mut diagnostics).expect("masking");
        (value, diagnostics.into_inner())
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<&DiagnosticKind> {
        diagnostics.iter().map(|diagnostic| &diagnostic.kind).collect()
    }

    #[test]
    fn should_replace_top_level_key() {
        let input = json!({"name": "John Doe", "age": 42});
        let (value, diagnostics) = mask(input, "name", TypeTag::Name);

        assert_eq!(value, json!({"name": "name-1", "age": 42}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_replace_nested_key() {
        let input = json!({"level1": {"level2": {"level3": {"name": "Deep Nested Name"}}}});
        let (value, _) = mask(input, "level1.level2.level3.name", TypeTag::Name);

        assert_eq!(value, json!({"level1": {"level2": {"level3": {"name": "name-1"}}}}));
    }

    #[test]
    fn should_replace_in_every_list_document() {
        let input = json!({"users": [{"name": "A"}, {"name": "B"}]});
        let (value, diagnostics) = mask(input, "users.name", TypeTag::Name);

        assert_eq!(value, json!({"users": [{"name": "name-1"}, {"name": "name-2"}]}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_skip_scalars_mixed_in_list() {
        let input = json!({
            "items": [{"name": "Item One"}, "String Item", 12345, {"name": "Item Two"}]
        });
        let (value, diagnostics) = mask(input, "items.name", TypeTag::Name);

        assert_eq!(
            value,
            json!({"items": [{"name": "name-1"}, "String Item", 12345, {"name": "name-2"}]})
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_report_nested_list_in_last_position() {
        let input = json!({"items": [[{"name": "inner"}], {"name": "outer"}]});
        let (value, diagnostics) = mask(input, "items.name", TypeTag::Name);

        assert_eq!(value, json!({"items": [[{"name": "inner"}], {"name": "name-1"}]}));
        assert_eq!(
            kinds(&diagnostics),
            [&DiagnosticKind::NestedList {
                key: "name".to_string()
            }]
        );
    }

    #[test]
    fn should_report_list_documents_missing_the_key() {
        let input = json!({"users": [{"name": "A"}, {"email": "b@example.com"}]});
        let (value, diagnostics) = mask(input, "users.name", TypeTag::Name);

        assert_eq!(value, json!({"users": [{"name": "name-1"}, {"email": "b@example.com"}]}));
        assert_eq!(
            kinds(&diagnostics),
            [&DiagnosticKind::MissingKey {
                key: "name".to_string()
            }]
        );
    }

    #[test]
    fn should_keep_empty_list() {
        let (value, diagnostics) = mask(json!({"users": []}), "users.name", TypeTag::Name);
        assert_eq!(value, json!({"users": []}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_traverse_lists_of_lists_of_documents() {
        let input = json!({
            "users": [
                {"name": "John Doe", "contacts": [{"email": "john@example.com"}]},
                {"name": "Jane Doe", "contacts": [{"email": "jane@example.com"}, {"phone": "555"}]}
            ]
        });
        let (value, diagnostics) = mask(input, "users.contacts.email", TypeTag::Email);

        assert_eq!(
            value,
            json!({
                "users": [
                    {"name": "John Doe", "contacts": [{"email": "email-1"}]},
                    {"name": "Jane Doe", "contacts": [{"email": "email-2"}, {"phone": "555"}]}
                ]
            })
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn should_not_create_missing_last_key() {
        let (value, diagnostics) = mask(json!({"name": "John Doe"}), "email", TypeTag::Email);

        assert_eq!(value, json!({"name": "John Doe"}));
        insta::assert_debug_snapshot!(diagnostics, @r#"
        [
            Diagnostic {
                document_id: "NO_ID",
                field: "email",
                tag: Email,
                kind: MissingKey {
                    key: "email",
                },
            },
        ]
        "#);
    }

    #[test]
    fn should_ignore_missing_intermediate_key_by_default() {
        let (value, diagnostics) = mask(json!({"name": "x"}), "address.city", TypeTag::City);

        assert_eq!(value, json!({"name": "x"}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_report_missing_intermediate_key_when_strict() {
        let mut value = json!({"name": "x", "users": [{"id": 1}]});
        let path = FieldPath::parse("users.address.city").expect("valid path");
        let mut generator = counter();
        let mut diagnostics = CollectDiagnostics::new();

        let tag = TypeTag::City;
        let replaced = FieldResolver::new(&mut generator, &mut diagnostics, "doc-1", &path, &tag)
            .with_missing_intermediate_reported(true)
            .apply(NodeMut::of(&mut value))
            .expect("masking");

        assert_eq!(replaced, 0);
        assert_eq!(value, json!({"name": "x", "users": [{"id": 1}]}));
        let diagnostics = diagnostics.into_inner();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.first().map(|it| it.document_id.as_str()), Some("doc-1"));
    }

    #[test]
    fn should_expand_wildcard_over_every_key() {
        let input = json!({
            "f1e1b1c4-0b1b-4b1b-8b1b-1b1b1b1b1b1b": {"name": "John Doe"},
            "f1e1b1c4-0b1b-4b1b-8b1b-1b1b1b1b1b1c": {"name": "Jane Doe"},
        });
        let (value, _) = mask(input, "*.name", TypeTag::Name);

        assert_eq!(
            value,
            json!({
                "f1e1b1c4-0b1b-4b1b-8b1b-1b1b1b1b1b1b": {"name": "name-1"},
                "f1e1b1c4-0b1b-4b1b-8b1b-1b1b1b1b1b1c": {"name": "name-2"},
            })
        );
    }

    #[test]
    fn should_expand_wildcard_through_lists() {
        let input = json!({
            "_id": "medicalCoding-7728458",
            "0c5e6d4d": {
                "charges": [
                    {"renderingProviderName": "GCBBCA,ZeZZCfeZ", "amount": 0},
                    {"renderingProviderName": "Schaack,Jessica", "amount": 12}
                ]
            },
            "9a8b7c6d": {
                "charges": [{"renderingProviderName": "Doe,Jane"}]
            }
        });
        let (value, diagnostics) = mask(
            input,
            "*.charges.renderingProviderName",
            TypeTag::LastNameFirstName,
        );

        assert_eq!(
            value,
            json!({
                "_id": "medicalCoding-7728458",
                "0c5e6d4d": {
                    "charges": [
                        {"renderingProviderName": "lastnamefirstname-1", "amount": 0},
                        {"renderingProviderName": "lastnamefirstname-2", "amount": 12}
                    ]
                },
                "9a8b7c6d": {
                    "charges": [{"renderingProviderName": "lastnamefirstname-3"}]
                }
            })
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_apply_wildcard_to_list_documents() {
        let input = json!({"rows": [{"a": {"v": 1}, "b": {"v": 2}}, {"c": {"v": 3}}]});
        let (value, _) = mask(input, "rows.*.v", TypeTag::Id);

        assert_eq!(
            value,
            json!({"rows": [{"a": {"v": "id-1"}, "b": {"v": "id-2"}}, {"c": {"v": "id-3"}}]})
        );
    }

    #[test]
    fn should_mask_every_scalar_with_trailing_wildcard() {
        let input = json!({
            "address": {"line": "9201 E MOUNTAIN VIEW RD", "city": "SCOTTSDALE", "geo": {"lat": 1}}
        });
        let (value, diagnostics) = mask(input, "address.*", TypeTag::Address);

        assert_eq!(
            value,
            json!({"address": {"line": "address-1", "city": "address-2", "geo": {"lat": 1}}})
        );
        assert_eq!(
            kinds(&diagnostics),
            [&DiagnosticKind::UnsupportedTarget {
                key: "geo".to_string(),
                found: NodeKind::Object
            }]
        );
    }

    #[test]
    fn should_mask_scalar_list_elementwise() {
        let input = json!({"aliases": ["Jo", "Johnny", ["nested"], null]});
        let (value, diagnostics) = mask(input, "aliases", TypeTag::Name);

        assert_eq!(value, json!({"aliases": ["name-1", "name-2", ["nested"], "name-3"]}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn should_not_replace_documents() {
        let input = json!({"address": {"city": "New York"}});
        let (value, diagnostics) = mask(input, "address", TypeTag::Address);

        assert_eq!(value, json!({"address": {"city": "New York"}}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn should_replace_extended_json_scalars() {
        let input = json!({"assessmentDate": {"$date": "2024-02-23T00:00:00.000Z"}});
        let (value, diagnostics) = mask(input, "assessmentDate", TypeTag::Date);

        assert_eq!(value, json!({"assessmentDate": "date-1"}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn should_not_descend_into_extended_json_scalars() {
        let input = json!({"assessmentDate": {"$date": "2024-02-23T00:00:00.000Z"}});
        let (value, diagnostics) = mask(input, "assessmentDate.$date", TypeTag::DateStr);

        assert_eq!(value, json!({"assessmentDate": {"$date": "2024-02-23T00:00:00.000Z"}}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn should_report_scalar_list_elements_on_the_way() {
        let input = json!({"items": ["plain", {"meta": {"name": "x"}}]});
        let (value, diagnostics) = mask(input, "items.meta.name", TypeTag::Name);

        assert_eq!(value, json!({"items": ["plain", {"meta": {"name": "name-1"}}]}));
        assert_eq!(
            kinds(&diagnostics),
            [&DiagnosticKind::NotADocument {
                key: "meta".to_string(),
                found: NodeKind::Scalar
            }]
        );
    }

    #[test]
    fn should_replace_null_values() {
        let (value, _) = mask(json!({"name": null}), "name", TypeTag::Name);
        assert_eq!(value, json!({"name": "name-1"}));
    }

    #[test]
    fn should_count_replacements() {
        let mut value = json!({"users": [{"name": "A"}, {"name": "B"}, {"other": 1}]});
        let path = FieldPath::parse("users.name").expect("valid path");
        let mut generator = counter();

        let tag = TypeTag::Name;
        let replaced = apply(&mut value, &path, &tag, &mut generator, &mut IgnoreDiagnostics)
            .expect("masking");
        assert_eq!(replaced, 2);
    }

    #[test]
    fn should_propagate_generator_failure() {
        let mut value = json!({"name": "John"});
        let path = FieldPath::parse("name").expect("valid path");
        let mut failing = |tag: &TypeTag| {
            Err::<Value, _>(GenerateError {
                tag: tag.to_string(),
                message: "boom".to_string(),
            })
        };

        let result = apply(&mut value, &path, &TypeTag::Name, &mut failing, &mut IgnoreDiagnostics);

        assert!(result.is_err());
        assert_eq!(value, json!({"name": "John"}));
    }

    #[test]
    fn should_handle_deep_nesting_without_limit() {
        let depth = 100;
        let mut value = json!({"leaf": "secret"});
        for _ in 0..depth {
            value = json!({"n": value});
        }
        let path = format!("{}leaf", "n.".repeat(depth));
        let (value, diagnostics) = mask(value, &path, TypeTag::Other("word".to_string()));

        let mut node = &value;
        for _ in 0..depth {
            node = node.get("n").expect("nesting preserved");
        }
        assert_eq!(node, &json!({"leaf": "word-1"}));
        assert!(diagnostics.is_empty());
    }
}
