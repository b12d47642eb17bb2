//! # Docmask Core
//!
//! Copy a document collection while replacing selected fields with
//! realistic synthetic values, so that the copy keeps the shape of the data
//! without its personal information.
//!
//! The fields to mask are described by a [`FieldMap`]: dotted paths
//! (with `*` matching every key of a document) mapped to a [`TypeTag`] naming
//! the kind of substitute to generate.
//!
//! ```json
//! {
//!   "patientAddress.patientCity": "city",
//!   "users.email": "email",
//!   "*.charges.renderingProviderName": "lastnamefirstname"
//! }
//! ```
//!
//! A path walks through nested documents, and through lists of documents by
//! applying the rest of the path to every element. Missing keys are never
//! created, and the structure of a masked document is the structure of the
//! original: only reached scalar values change, each one to a value different
//! from the original.
//!
//! ## Masking a document
//!
//! ```rust
//! use docmask_core::{CollectDiagnostics, DocumentMasker, FakeGenerator, FieldMap};
//! use serde_json::json;
//!
//! let field_map = FieldMap::from_json_str(r#"{"users.name": "name", "users.phone": "id"}"#)?;
//! let masker = DocumentMasker::new(field_map);
//!
//! let mut generator = FakeGenerator::seeded(7);
//! let mut diagnostics = CollectDiagnostics::new();
//! let masked = masker.mask_value(
//!     json!({"users": [{"name": "Alice"}, {"name": "Bob", "phone": "555-0100"}]}),
//!     &mut generator,
//!     &mut diagnostics,
//! )?;
//!
//! assert_ne!(masked["users"][0]["name"], "Alice");
//! assert_ne!(masked["users"][1]["phone"], "555-0100");
//! // Alice has no phone: reported, not created
//! assert_eq!(diagnostics.len(), 1);
//! assert!(masked["users"][0].get("phone").is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Copying a collection
//!
//! The [`BatchPipeline`] reads a [`DocumentSource`], masks each document and
//! writes batches to a [`DocumentSink`]. Backends are selected from a
//! connection URI with [`Store::connect`]: JSON-lines directories
//! (`file://`), or `MongoDB` (`mongodb://`, with the `mongodb` feature).
//!
//! ```rust
//! use docmask_core::{
//!     BatchPipeline, CollectionRef, DocumentMasker, FakeGenerator, FieldMap, MemoryStore,
//! };
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let patients = CollectionRef::new("clinic", "patients");
//! let masked = CollectionRef::new("clinic", "patients_masked");
//! store
//!     .insert(patients.clone(), [json!({"_id": 1, "name": "John Doe"})]
//!         .into_iter()
//!         .filter_map(|it| it.as_object().cloned()))
//!     .await;
//!
//! let masker = DocumentMasker::new(FieldMap::from_json_str(r#"{"name": "name"}"#)?);
//! let mut pipeline = BatchPipeline::new(masker, FakeGenerator::new());
//! let report = pipeline
//!     .run(&mut store.source(&patients).await, &mut store.sink(masked.clone()))
//!     .await?;
//!
//! assert_eq!(report.processed, 1);
//! assert_ne!(store.documents(&masked).await[0]["name"], "John Doe");
//! # Ok(())
//! # }
//! ```
//!
//! ## Diagnostics
//!
//! Paths that do not fully apply to a document (a missing key, a nested list)
//! are reported to a [`DiagnosticSink`] and processing goes on. Missing
//! intermediate keys are silent unless
//! [`MaskerConfig::report_missing_intermediate`] is set.
//!
//! ## Features
//!
//! - `mongodb`: the `MongoDB` backend
#![cfg_attr(docsrs, feature(doc_cfg))]

mod diagnostics;
mod distinct;
mod error;
mod field_map;
mod generator;
mod masker;
pub mod node;
mod path;
mod pipeline;
pub mod resolver;
pub mod store;
mod type_tag;

pub use self::diagnostics::{
    CollectDiagnostics, Diagnostic, DiagnosticKind, DiagnosticSink, IgnoreDiagnostics,
    LogDiagnostics, NO_ID,
};
pub use self::distinct::{DEFAULT_MAX_ATTEMPTS, Distinct, generate_distinct};
pub use self::error::{FieldMapError, GenerateError, PathError, PipelineError, StoreError};
pub use self::field_map::{FieldMap, FieldRule};
pub use self::generator::{FakeGenerator, SubstituteGenerator};
pub use self::masker::{DocumentMasker, MaskerConfig};
pub use self::node::Document;
pub use self::path::{FieldPath, Segment, WILDCARD};
pub use self::pipeline::{
    BatchPipeline, DEFAULT_BATCH_SIZE, DocumentSink, DocumentSource, PipelineConfig, Progress,
    RunReport,
};
pub use self::store::{CollectionRef, JsonLinesStore, MemoryStore, Store};
pub use self::type_tag::TypeTag;
