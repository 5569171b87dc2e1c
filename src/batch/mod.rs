//! Batch Orchestration
//!
//! Applies many queries to many documents in one pass:
//! 1. compile each distinct query once (through the shared LRU cache)
//! 2. decode and parse each document once
//! 3. evaluate every compiled query against every parsed tree
//!
//! A failing query or document is recorded as a [`Diagnostic`] and left out
//! of the matrix; it never aborts the batch.

pub mod cache;
pub mod document;
pub mod matrix;

pub use cache::QueryCache;
pub use document::Document;
pub use matrix::{ResultMatrix, ResultRow};

use crate::error::{CompileError, DocumentError};
use crate::strategy::{evaluate_parallel, map_units};
use crate::xpath::{evaluate, CompiledQuery};
use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default number of compiled queries kept between runs
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

// =============================================================================
// Options
// =============================================================================

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Run compilation, parsing and evaluation on the rayon pool
    pub parallel: bool,
    /// Worker threads for a dedicated pool; None runs on the global pool
    pub threads: Option<usize>,
    /// Compiled queries kept in the LRU cache; 0 disables it
    pub cache_capacity: usize,
    /// Documents not finished by this deadline are abandoned
    pub time_budget: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            parallel: true,
            threads: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            time_budget: None,
        }
    }
}

// =============================================================================
// Phases and diagnostics
// =============================================================================

/// Batch state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Init,
    CompilingQueries,
    ParsingDocuments,
    Evaluating,
    Done,
}

impl BatchPhase {
    /// The phase after this one; `Done` is terminal
    pub fn next(self) -> Self {
        match self {
            BatchPhase::Init => BatchPhase::CompilingQueries,
            BatchPhase::CompilingQueries => BatchPhase::ParsingDocuments,
            BatchPhase::ParsingDocuments => BatchPhase::Evaluating,
            BatchPhase::Evaluating | BatchPhase::Done => BatchPhase::Done,
        }
    }

    fn advance(&mut self) {
        *self = self.next();
        debug!("batch phase: {self}");
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchPhase::Init => "init",
            BatchPhase::CompilingQueries => "compiling queries",
            BatchPhase::ParsingDocuments => "parsing documents",
            BatchPhase::Evaluating => "evaluating",
            BatchPhase::Done => "done",
        })
    }
}

/// A query or document left out of the matrix, and why
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("query {query:?} failed to compile: {error}")]
    Compile { query: String, error: CompileError },
    #[error("document {key:?} failed to parse: {error}")]
    Document { key: String, error: DocumentError },
    #[error("time budget exhausted, {documents} document(s) abandoned")]
    Abandoned { documents: usize },
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub matrix: ResultMatrix,
    pub diagnostics: Vec<Diagnostic>,
    /// Documents submitted to the run
    pub documents: usize,
}

/// Counts describing a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub queries: usize,
    pub failed_queries: usize,
    pub documents: usize,
    pub failed_documents: usize,
    pub abandoned_documents: usize,
    pub entries: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries ({} failed), {} documents ({} failed, {} abandoned), {} entries",
            self.queries,
            self.failed_queries,
            self.documents,
            self.failed_documents,
            self.abandoned_documents,
            self.entries
        )
    }
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            queries: self.matrix.query_count(),
            failed_queries: 0,
            documents: self.documents,
            failed_documents: 0,
            abandoned_documents: 0,
            entries: self.matrix.entry_count(),
        };
        for diagnostic in &self.diagnostics {
            match diagnostic {
                Diagnostic::Compile { .. } => summary.failed_queries += 1,
                Diagnostic::Document { .. } => summary.failed_documents += 1,
                Diagnostic::Abandoned { documents } => summary.abandoned_documents += documents,
            }
        }
        summary
    }

    pub fn into_matrix(self) -> ResultMatrix {
        self.matrix
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Runs batches; the compile cache is shared by every run of one extractor
pub struct Extractor {
    options: BatchOptions,
    cache: QueryCache,
    /// Dedicated pool when `threads` is set
    pool: Option<ThreadPool>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(BatchOptions::default())
    }
}

impl Extractor {
    pub fn new(options: BatchOptions) -> Self {
        let cache = QueryCache::new(options.cache_capacity);
        let pool = options
            .threads
            .filter(|_| options.parallel)
            .and_then(build_pool);
        Extractor { options, cache, pool }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Worker threads the batch runs on
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None if self.options.parallel => rayon::current_num_threads(),
            None => 1,
        }
    }

    /// Apply every query to every document
    ///
    /// Documents sharing a key merge in input order; a later value replaces
    /// an earlier one.
    pub fn run<Q: AsRef<str> + Sync>(&self, queries: &[Q], documents: &[Document]) -> BatchReport {
        match &self.pool {
            Some(pool) => pool.install(|| self.execute(queries, documents)),
            None => self.execute(queries, documents),
        }
    }

    fn execute<Q: AsRef<str>>(&self, queries: &[Q], documents: &[Document]) -> BatchReport {
        let deadline = self.options.time_budget.map(|budget| Instant::now() + budget);
        let expired = || deadline.is_some_and(|at| Instant::now() >= at);
        let parallel = self.options.parallel;

        let mut phase = BatchPhase::Init;
        let mut report = BatchReport {
            documents: documents.len(),
            ..BatchReport::default()
        };

        // Compile each distinct query once
        phase.advance();
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = queries
            .iter()
            .map(|query| query.as_ref())
            .filter(|query| seen.insert(*query))
            .collect();
        let outcomes = map_units(&distinct, parallel, |query| self.cache.get_or_compile(query));

        let mut compiled: Vec<(&str, &CompiledQuery)> = Vec::with_capacity(distinct.len());
        for (&query, outcome) in distinct.iter().zip(&outcomes) {
            report.matrix.ensure_query(query);
            match &**outcome {
                Ok(query_plan) => compiled.push((query, query_plan)),
                Err(error) => {
                    warn!("query {query:?} failed to compile: {error}");
                    report.diagnostics.push(Diagnostic::Compile {
                        query: query.to_string(),
                        error: error.clone(),
                    });
                }
            }
        }

        // Decode and parse each document once
        phase.advance();
        let trees = map_units(documents, parallel, |doc| (!expired()).then(|| doc.tree()));

        let mut abandoned = 0;
        let mut parsed = Vec::with_capacity(documents.len());
        for (doc, tree) in documents.iter().zip(trees) {
            match tree {
                None => abandoned += 1,
                Some(Ok(tree)) => parsed.push((doc.key(), tree)),
                Some(Err(error)) => {
                    warn!("document {:?} failed to parse: {error}", doc.key());
                    report.diagnostics.push(Diagnostic::Document {
                        key: doc.key().to_string(),
                        error: error.clone(),
                    });
                }
            }
        }

        // Every query against every tree; workers return private rows
        phase.advance();
        let plans: Vec<&CompiledQuery> = compiled.iter().map(|&(_, plan)| plan).collect();
        let rows = map_units(&parsed, parallel, |&(_, tree)| {
            if expired() {
                return None;
            }
            let row = if parallel {
                evaluate_parallel(tree, &plans)
            } else {
                plans
                    .iter()
                    .enumerate()
                    .filter_map(|(index, plan)| evaluate(plan, tree).map(|value| (index, value)))
                    .collect()
            };
            Some(row)
        });

        for (&(key, _), row) in parsed.iter().zip(rows) {
            let Some(row) = row else {
                abandoned += 1;
                continue;
            };
            for (index, value) in row {
                report.matrix.insert(compiled[index].0, key, value);
            }
        }

        if abandoned > 0 {
            warn!("time budget exhausted, abandoned {abandoned} document(s)");
            report.diagnostics.push(Diagnostic::Abandoned { documents: abandoned });
        }

        phase.advance();
        info!("batch complete: {}", report.summary());
        report
    }
}

/// Build a dedicated worker pool, falling back to the global one on failure
fn build_pool(threads: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => {
            debug!("worker pool with {} threads", pool.current_num_threads());
            Some(pool)
        }
        Err(error) => {
            warn!("failed to build a {threads}-thread pool: {error}; using the global pool");
            None
        }
    }
}

/// Run one batch with default options
pub fn run_batch<Q: AsRef<str> + Sync>(queries: &[Q], documents: &[Document]) -> ResultMatrix {
    Extractor::default().run(queries, documents).into_matrix()
}
