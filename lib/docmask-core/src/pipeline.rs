//! Batched copy of a collection through the masker.
//!
//! The pipeline is strictly sequential: documents are pulled from a
//! [`DocumentSource`] into a batch, the batch is masked document by document,
//! then written to a [`DocumentSink`] in one bulk insert before the next
//! batch starts. The last partial batch is flushed the same way.
//!
//! A failed write aborts the run. Batches written before the failure stay in
//! the target, there is no rollback and no retry.

use std::future::Future;
use std::mem;

use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticSink, IgnoreDiagnostics, LogDiagnostics};
use crate::error::{PipelineError, StoreError};
use crate::generator::SubstituteGenerator;
use crate::masker::DocumentMasker;
use crate::node::Document;

/// Default number of documents per bulk insert.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Where documents are read from.
pub trait DocumentSource {
    /// Number of documents in the source, taken once before iterating.
    ///
    /// The count is informative and may be stale.
    fn count(&mut self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// The next document in natural order, `None` once exhausted.
    fn next_document(
        &mut self,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;
}

/// Where masked documents are written.
pub trait DocumentSink {
    /// Write a batch of documents in one bulk insert.
    fn insert_many(
        &mut self,
        documents: Vec<Document>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Documents per bulk insert, at least 1.
    pub batch_size: usize,
    /// Log masking diagnostics as warnings.
    pub show_warnings: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            show_warnings: false,
        }
    }
}

/// Progress notification, sent after each written batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Documents written so far.
    pub processed: u64,
    /// Documents announced by the source.
    pub total: u64,
    /// Batches written so far.
    pub batches: usize,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Documents announced by the source before the run.
    pub total: u64,
    /// Documents masked and written.
    pub processed: u64,
    /// Bulk inserts performed.
    pub batches: usize,
    /// Values replaced across all documents.
    pub replaced: u64,
    /// Diagnostics reported across all documents.
    pub diagnostics: u64,
}

impl RunReport {
    fn progress(&self) -> Progress {
        Progress {
            processed: self.processed,
            total: self.total,
            batches: self.batches,
        }
    }
}

/// Counts what passes through to the wrapped sink.
struct Counting<'a, S: ?Sized> {
    inner: &'a mut S,
    count: u64,
}

impl<S> DiagnosticSink for Counting<'_, S>
where
    S: DiagnosticSink + ?Sized,
{
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        self.inner.report(diagnostic);
    }
}

/// Copies a collection, masking each document on the way.
#[derive(Debug)]
pub struct BatchPipeline<G> {
    masker: DocumentMasker,
    generator: G,
    config: PipelineConfig,
}

impl<G> BatchPipeline<G>
where
    G: SubstituteGenerator,
{
    /// A pipeline with the default configuration.
    pub fn new(masker: DocumentMasker, generator: G) -> Self {
        Self::with_config(masker, generator, PipelineConfig::default())
    }

    /// A pipeline with a custom configuration.
    pub fn with_config(masker: DocumentMasker, generator: G, config: PipelineConfig) -> Self {
        Self {
            masker,
            generator,
            config,
        }
    }

    /// Run the copy, logging diagnostics when `show_warnings` is set.
    ///
    /// # Errors
    ///
    /// See [`run_with`](Self::run_with).
    pub async fn run<Src, Snk>(
        &mut self,
        source: &mut Src,
        sink: &mut Snk,
    ) -> Result<RunReport, PipelineError>
    where
        Src: DocumentSource,
        Snk: DocumentSink,
    {
        self.run_with_progress(source, sink, |_| {}).await
    }

    /// Like [`run`](Self::run), notifying `on_progress` after each batch.
    ///
    /// # Errors
    ///
    /// See [`run_with`](Self::run_with).
    pub async fn run_with_progress<Src, Snk, P>(
        &mut self,
        source: &mut Src,
        sink: &mut Snk,
        on_progress: P,
    ) -> Result<RunReport, PipelineError>
    where
        Src: DocumentSource,
        Snk: DocumentSink,
        P: FnMut(Progress),
    {
        if self.config.show_warnings {
            self.run_with(source, sink, &mut LogDiagnostics, on_progress)
                .await
        } else {
            self.run_with(source, sink, &mut IgnoreDiagnostics, on_progress)
                .await
        }
    }

    /// Run the copy with an explicit diagnostics sink and progress observer.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidBatchSize`] if the batch size is zero
    /// - [`PipelineError::Store`] if reading the source fails
    /// - [`PipelineError::Generate`] if a substitute cannot be generated
    /// - [`PipelineError::Write`] if a bulk insert fails
    pub async fn run_with<Src, Snk, D, P>(
        &mut self,
        source: &mut Src,
        sink: &mut Snk,
        diagnostics: &mut D,
        mut on_progress: P,
    ) -> Result<RunReport, PipelineError>
    where
        Src: DocumentSource,
        Snk: DocumentSink,
        D: DiagnosticSink + ?Sized,
        P: FnMut(Progress),
    {
        let batch_size = self.config.batch_size;
        if batch_size == 0 {
            return Err(PipelineError::InvalidBatchSize);
        }

        let total = source.count().await?;
        info!(total, batch_size, rules = self.masker.field_map().len(), "masking collection");

        let mut diagnostics = Counting {
            inner: diagnostics,
            count: 0,
        };
        let mut report = RunReport {
            total,
            ..RunReport::default()
        };
        let mut batch = Vec::with_capacity(batch_size);

        while let Some(document) = source.next_document().await? {
            batch.push(document);
            if batch.len() == batch_size {
                self.flush(&mut batch, sink, &mut diagnostics, &mut report)
                    .await?;
                on_progress(report.progress());
            }
        }
        if !batch.is_empty() {
            self.flush(&mut batch, sink, &mut diagnostics, &mut report)
                .await?;
            on_progress(report.progress());
        }

        report.diagnostics = diagnostics.count;
        info!(
            processed = report.processed,
            batches = report.batches,
            replaced = report.replaced,
            diagnostics = report.diagnostics,
            "collection masked"
        );
        Ok(report)
    }

    async fn flush<Snk, D>(
        &mut self,
        batch: &mut Vec<Document>,
        sink: &mut Snk,
        diagnostics: &mut D,
        report: &mut RunReport,
    ) -> Result<(), PipelineError>
    where
        Snk: DocumentSink,
        D: DiagnosticSink + ?Sized,
    {
        let mut documents = mem::replace(batch, Vec::with_capacity(self.config.batch_size));
        for document in &mut documents {
            let replaced = self
                .masker
                .mask(document, &mut self.generator, diagnostics)?;
            report.replaced += replaced as u64;
        }

        let size = documents.len() as u64;
        let index = report.batches + 1;
        sink.insert_many(documents)
            .await
            .map_err(|error| PipelineError::Write {
                batch: index,
                written: report.processed,
                error,
            })?;

        report.batches = index;
        report.processed += size;
        debug!(
            batch = index,
            size,
            processed = report.processed,
            total = report.total,
            "batch written"
        );
        Ok(())
    }
}
