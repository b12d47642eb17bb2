use serde_json::Value;
use tracing::trace;

use crate::diagnostics::{DiagnosticSink, NO_ID};
use crate::distinct::DEFAULT_MAX_ATTEMPTS;
use crate::error::GenerateError;
use crate::field_map::FieldMap;
use crate::generator::SubstituteGenerator;
use crate::node::{Document, NodeMut, identity_label};
use crate::resolver::FieldResolver;

/// Tuning of the per-document masking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskerConfig {
    /// Generation attempts before accepting a substitute equal to the
    /// original value.
    pub max_attempts: usize,
    /// Also report missing intermediate keys, not only missing final keys.
    pub report_missing_intermediate: bool,
}

impl Default for MaskerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            report_missing_intermediate: false,
        }
    }
}

/// Applies a whole [`FieldMap`] to documents.
///
/// # Example
///
/// ```rust
/// use docmask_core::{CollectDiagnostics, DocumentMasker, FakeGenerator, FieldMap};
/// use serde_json::json;
///
/// let field_map = FieldMap::from_json_str(r#"{"name": "name", "email": "email"}"#)?;
/// let masker = DocumentMasker::new(field_map);
///
/// let serde_json::Value::Object(mut document) =
///     json!({"_id": 1, "name": "John Doe", "email": "john.doe@example.com"})
/// else {
///     unreachable!()
/// };
/// let mut diagnostics = CollectDiagnostics::new();
/// masker.mask(&mut document, &mut FakeGenerator::seeded(1), &mut diagnostics)?;
///
/// assert_ne!(document["name"], "John Doe");
/// assert_ne!(document["email"], "john.doe@example.com");
/// assert!(diagnostics.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentMasker {
    field_map: FieldMap,
    config: MaskerConfig,
}

impl DocumentMasker {
    /// A masker with the default configuration.
    #[must_use]
    pub fn new(field_map: FieldMap) -> Self {
        Self::with_config(field_map, MaskerConfig::default())
    }

    /// A masker with a custom configuration.
    #[must_use]
    pub fn with_config(field_map: FieldMap, config: MaskerConfig) -> Self {
        Self { field_map, config }
    }

    /// The applied field map.
    #[must_use]
    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    /// Mask `document` in place, applying every rule of the field map.
    ///
    /// The document identity (its `_id`, or [`NO_ID`]) labels the reported
    /// diagnostics. No key is ever added or removed, only values reached by
    /// a path are replaced. Returns the number of replaced values.
    ///
    /// # Errors
    ///
    /// Propagates substitute generation failures. The document may then be
    /// partially masked.
    pub fn mask<G, S>(
        &self,
        document: &mut Document,
        generator: &mut G,
        diagnostics: &mut S,
    ) -> Result<usize, GenerateError>
    where
        G: SubstituteGenerator + ?Sized,
        S: DiagnosticSink + ?Sized,
    {
        let document_id = document
            .get("_id")
            .map_or_else(|| NO_ID.to_string(), identity_label);

        let mut replaced = 0;
        for rule in &self.field_map {
            replaced += FieldResolver::new(
                generator,
                diagnostics,
                &document_id,
                &rule.path,
                &rule.tag,
            )
            .with_max_attempts(self.config.max_attempts)
            .with_missing_intermediate_reported(self.config.report_missing_intermediate)
            .apply(NodeMut::from(&mut *document))?;
        }
        trace!(%document_id, replaced, "document masked");

        Ok(replaced)
    }

    /// Mask an arbitrary value.
    ///
    /// Documents are masked as with [`mask`](Self::mask); any other value is
    /// returned unchanged since no field path can reach into it.
    ///
    /// # Errors
    ///
    /// Propagates substitute generation failures.
    pub fn mask_value<G, S>(
        &self,
        mut value: Value,
        generator: &mut G,
        diagnostics: &mut S,
    ) -> Result<Value, GenerateError>
    where
        G: SubstituteGenerator + ?Sized,
        S: DiagnosticSink + ?Sized,
    {
        if let Value::Object(document) = &mut value {
            self.mask(document, generator, diagnostics)?;
        }
        Ok(value)
    }
}
