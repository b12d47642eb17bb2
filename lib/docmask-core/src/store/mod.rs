//! Document sources and sinks.
//!
//! A backend is chosen from a connection URI:
//!
//! | URI | Backend |
//! |-----|---------|
//! | `file:///data/dumps` | [`JsonLinesStore`], one `.jsonl` file per collection |
//! | `mongodb://...`, `mongodb+srv://...` | `MongoStore` (feature `mongodb`) |
//!
//! [`MemoryStore`] keeps collections in memory and is built directly.

use std::fmt;

use tracing::debug;
use url::Url;

use crate::error::StoreError;
use crate::node::Document;
use crate::pipeline::{DocumentSink, DocumentSource};

mod jsonl;
mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

pub use self::jsonl::{JsonLinesSink, JsonLinesSource, JsonLinesStore};
pub use self::memory::{MemorySink, MemorySource, MemoryStore};
#[cfg(feature = "mongodb")]
#[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
pub use self::mongo::{MongoSink, MongoSource, MongoStore};

/// A collection inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    /// Database name.
    pub database: String,
    /// Collection name.
    pub collection: String,
}

impl CollectionRef {
    /// Reference `collection` in `database`.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// A backend selected from a connection URI.
#[derive(Debug, Clone)]
pub enum Store {
    /// JSON-lines files in a directory.
    JsonLines(JsonLinesStore),
    /// A `MongoDB` deployment.
    #[cfg(feature = "mongodb")]
    #[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
    Mongo(MongoStore),
}

impl Store {
    /// Connect to the backend named by `uri`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed, if its scheme has no backend,
    /// or if the backend cannot be reached.
    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let url = Url::parse(uri)?;
        debug!(scheme = url.scheme(), "selecting store backend");
        match url.scheme() {
            "file" => {
                let root = url.to_file_path().map_err(|()| StoreError::InvalidUri {
                    uri: uri.to_string(),
                    message: "expected an absolute directory path".to_string(),
                })?;
                Ok(Self::JsonLines(JsonLinesStore::new(root)))
            }
            #[cfg(feature = "mongodb")]
            "mongodb" | "mongodb+srv" => Ok(Self::Mongo(MongoStore::connect(uri).await?)),
            #[cfg(not(feature = "mongodb"))]
            "mongodb" | "mongodb+srv" => Err(StoreError::InvalidUri {
                uri: uri.to_string(),
                message: "built without the `mongodb` feature".to_string(),
            }),
            scheme => Err(StoreError::UnsupportedScheme {
                scheme: scheme.to_string(),
            }),
        }
    }

    /// Open `collection` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be opened.
    pub async fn source(&self, collection: &CollectionRef) -> Result<AnySource, StoreError> {
        match self {
            Self::JsonLines(store) => store.source(collection).await.map(AnySource::JsonLines),
            #[cfg(feature = "mongodb")]
            Self::Mongo(store) => store.source(collection).await.map(AnySource::Mongo),
        }
    }

    /// Open `collection` for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be opened.
    pub async fn sink(&self, collection: &CollectionRef) -> Result<AnySink, StoreError> {
        match self {
            Self::JsonLines(store) => store.sink(collection).await.map(AnySink::JsonLines),
            #[cfg(feature = "mongodb")]
            Self::Mongo(store) => Ok(AnySink::Mongo(store.sink(collection))),
        }
    }
}

/// A source from any URI-selected backend.
#[derive(Debug)]
pub enum AnySource {
    /// See [`JsonLinesSource`].
    JsonLines(JsonLinesSource),
    /// See `MongoSource`.
    #[cfg(feature = "mongodb")]
    Mongo(MongoSource),
}

impl DocumentSource for AnySource {
    async fn count(&mut self) -> Result<u64, StoreError> {
        match self {
            Self::JsonLines(source) => source.count().await,
            #[cfg(feature = "mongodb")]
            Self::Mongo(source) => source.count().await,
        }
    }

    async fn next_document(&mut self) -> Result<Option<Document>, StoreError> {
        match self {
            Self::JsonLines(source) => source.next_document().await,
            #[cfg(feature = "mongodb")]
            Self::Mongo(source) => source.next_document().await,
        }
    }
}

/// A sink from any URI-selected backend.
#[derive(Debug)]
pub enum AnySink {
    /// See [`JsonLinesSink`].
    JsonLines(JsonLinesSink),
    /// See `MongoSink`.
    #[cfg(feature = "mongodb")]
    Mongo(MongoSink),
}

impl DocumentSink for AnySink {
    async fn insert_many(&mut self, documents: Vec<Document>) -> Result<(), StoreError> {
        match self {
            Self::JsonLines(sink) => sink.insert_many(documents).await,
            #[cfg(feature = "mongodb")]
            Self::Mongo(sink) => sink.insert_many(documents).await,
        }
    }
}
