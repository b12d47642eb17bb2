use std::path::PathBuf;

/// Errors raised while loading a field map.
///
/// All of them are configuration errors: they abort a run before any
/// document is read.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum FieldMapError {
    /// The field map file cannot be read.
    #[display("Cannot read field map '{}': {error}", path.display())]
    #[from(skip)]
    Read {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        error: std::io::Error,
    },

    /// The field map is not a JSON object of strings.
    #[display("Malformed field map at '{path}': {error}")]
    #[from(skip)]
    Malformed {
        /// Location inside the JSON document where decoding failed.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
    },

    /// A key of the field map is not a usable field path.
    InvalidPath(PathError),
}

/// A dotted field path that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum PathError {
    /// The path is the empty string.
    #[display("Field path is empty")]
    Empty,

    /// The path contains an empty segment (`a..b`, `.a`, `a.`).
    #[display("Field path '{path}' has an empty segment at position {position}")]
    EmptySegment {
        /// The offending path.
        path: String,
        /// Zero-based index of the empty segment.
        position: usize,
    },
}

/// The substitute generator failed to produce a value.
///
/// Generation failures are fatal for a run: they are propagated, never
/// retried.
#[derive(Debug, derive_more::Error, derive_more::Display)]
#[display("Cannot generate a '{tag}' substitute: {message}")]
pub struct GenerateError {
    /// The requested type tag.
    pub tag: String,
    /// What went wrong.
    pub message: String,
}

/// Errors raised by a document source or sink.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum StoreError {
    /// File system error.
    Io(std::io::Error),

    /// A stored line is not a JSON document.
    #[display("Invalid document in '{}' at line {line}: {error}", path.display())]
    #[from(skip)]
    InvalidDocument {
        /// The collection file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The underlying JSON error.
        error: serde_json::Error,
    },

    /// A document cannot be serialized for writing.
    Json(serde_json::Error),

    /// The connection URI cannot be parsed.
    Uri(url::ParseError),

    /// The connection URI uses a scheme no backend handles.
    #[display("Unsupported connection URI scheme '{scheme}'")]
    #[from(skip)]
    UnsupportedScheme {
        /// The URI scheme.
        scheme: String,
    },

    /// The connection URI is well formed but unusable.
    #[display("Invalid connection URI '{uri}': {message}")]
    #[from(skip)]
    InvalidUri {
        /// The URI as given.
        uri: String,
        /// Why it is rejected.
        message: String,
    },

    /// The database driver reported an error.
    #[cfg(feature = "mongodb")]
    #[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
    Mongo(mongodb::error::Error),

    /// A stored document cannot be converted to or from BSON.
    #[cfg(feature = "mongodb")]
    #[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
    #[display("BSON conversion failed: {message}")]
    #[from(skip)]
    Bson {
        /// Description of the conversion failure.
        message: String,
    },
}

/// Errors that abort a masking run.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum PipelineError {
    /// The configured batch size is zero.
    #[display("Batch size must be at least 1")]
    InvalidBatchSize,

    /// Reading from the source or writing to the sink failed.
    Store(StoreError),

    /// Generating a substitute failed.
    Generate(GenerateError),

    /// A bulk insert was rejected; earlier batches stay in the target.
    #[display("Writing batch #{batch} failed after {written} documents were written: {error}")]
    #[from(skip)]
    Write {
        /// One-based index of the failing batch.
        batch: usize,
        /// Documents already written by previous batches.
        written: u64,
        /// The sink error.
        error: StoreError,
    },
}
