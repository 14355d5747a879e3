use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use sha2::{Digest, Sha256};

use crate::config::{BatchConfig, Config};
use crate::core::record_builder::RecordBuilder;
use crate::error::{ConfigError, MalformedXmlError};
use crate::utils::ingest::{load_path, SourceDocument};
use crate::UniversalRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutcome {
    pub path: String,
    pub filename: String,
    /// SHA-256 of the document text, hex encoded.
    pub digest: String,
    pub result: Result<UniversalRecord, MalformedXmlError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Same order as the input documents.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn records(&self) -> impl Iterator<Item = &UniversalRecord> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

pub fn content_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Runs the extraction core over many documents. Each document is isolated:
/// a parse failure is recorded in its outcome and the batch carries on.
pub struct DocumentProcessor {
    builder: RecordBuilder,
    batch: BatchConfig,
    pool: Option<ThreadPool>,
}

impl DocumentProcessor {
    pub fn new(builder: RecordBuilder, batch: BatchConfig) -> Self {
        let pool = if batch.max_parallel > 0 {
            match ThreadPoolBuilder::new().num_threads(batch.max_parallel).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("falling back to the global pool: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self { builder, batch, pool }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.record_builder()?, config.batch.clone()))
    }

    pub fn builder(&self) -> &RecordBuilder {
        &self.builder
    }

    pub fn process(&self, docs: &[SourceDocument]) -> BatchReport {
        info!("processing {} documents", docs.len());
        let run = || docs.par_iter().map(|doc| self.process_one(doc)).collect::<Vec<_>>();
        let outcomes = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let report = BatchReport { outcomes };
        info!("batch done: {} ok, {} failed", report.succeeded(), report.failed());
        report
    }

    /// Ingest every path, then process all documents as one batch.
    pub fn process_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BatchReport> {
        let mut docs = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let mut loaded = load_path(path, &self.batch)
                .with_context(|| format!("failed to load {}", path.display()))?;
            debug!("{}: {} documents", path.display(), loaded.len());
            docs.append(&mut loaded);
        }
        Ok(self.process(&docs))
    }

    fn process_one(&self, doc: &SourceDocument) -> DocumentOutcome {
        let result = self.builder.extract(&doc.text);
        match &result {
            Ok(record) => debug!("{}: parsed as {:?}", doc.path, record.title),
            Err(e) => error!("{}: {}", doc.path, e),
        }
        DocumentOutcome {
            path: doc.path.clone(),
            filename: doc.filename.clone(),
            digest: content_digest(&doc.text),
            result,
        }
    }
}
