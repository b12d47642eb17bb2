use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tracing::debug;

use super::CollectionRef;
use crate::error::StoreError;
use crate::node::Document;
use crate::pipeline::{DocumentSink, DocumentSource};

const EXTENSION: &str = "jsonl";

/// Collections stored as JSON-lines files.
///
/// Collection `db.users` lives in `<root>/db/users.jsonl`, one JSON document
/// per line. Blank lines are skipped when reading.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    root: PathBuf,
}

impl JsonLinesStore {
    /// A store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding `collection`.
    #[must_use]
    pub fn collection_path(&self, collection: &CollectionRef) -> PathBuf {
        self.root
            .join(&collection.database)
            .join(format!("{}.{EXTENSION}", collection.collection))
    }

    /// Open `collection` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection file cannot be opened.
    pub async fn source(&self, collection: &CollectionRef) -> Result<JsonLinesSource, StoreError> {
        let path = self.collection_path(collection);
        debug!(path = %path.display(), "opening source collection");
        let file = File::open(&path).await?;
        Ok(JsonLinesSource {
            lines: BufReader::new(file).lines(),
            path,
            line: 0,
        })
    }

    /// Open `collection` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection file cannot be created.
    pub async fn sink(&self, collection: &CollectionRef) -> Result<JsonLinesSink, StoreError> {
        let path = self.collection_path(collection);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        debug!(path = %path.display(), "opening target collection");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(JsonLinesSink { file, path })
    }
}

/// Reads a JSON-lines collection line by line.
#[derive(Debug)]
pub struct JsonLinesSource {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line: usize,
}

impl DocumentSource for JsonLinesSource {
    async fn count(&mut self) -> Result<u64, StoreError> {
        let file = File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut count = 0;
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn next_document(&mut self) -> Result<Option<Document>, StoreError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            let document =
                serde_json::from_str(&line).map_err(|error| StoreError::InvalidDocument {
                    path: self.path.clone(),
                    line: self.line,
                    error,
                })?;
            return Ok(Some(document));
        }
        Ok(None)
    }
}

/// Appends documents to a JSON-lines collection.
#[derive(Debug)]
pub struct JsonLinesSink {
    file: File,
    path: PathBuf,
}

impl JsonLinesSink {
    /// The collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSink for JsonLinesSink {
    async fn insert_many(&mut self, documents: Vec<Document>) -> Result<(), StoreError> {
        let mut buffer = Vec::new();
        for document in &documents {
            serde_json::to_writer(&mut buffer, document)?;
            buffer.push(b'\n');
        }
        self.file.write_all(&buffer).await?;
        self.file.flush().await?;
        Ok(())
    }
}
