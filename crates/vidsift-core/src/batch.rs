//! Parallel construction of a reference corpus from many input files.
//!
//! Each input is handed to the worker on a rayon thread. Workers share nothing
//! mutable; results are gathered only after every worker has finished, and a
//! failing input is recorded in the report instead of aborting the run.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::corpus::{CorpusEntry, ReferenceCorpus};
use crate::error::CoreResult;

/// One input that produced no signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Successful entries, in input order.
    pub entries: Vec<CorpusEntry>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Builds the reference corpus from the successful entries.
    pub fn into_corpus(self) -> CoreResult<(ReferenceCorpus, Vec<BatchFailure>)> {
        let corpus = ReferenceCorpus::new(self.entries)?;
        Ok((corpus, self.failures))
    }
}

/// Identifier of an input: its file name.
pub fn identifier_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Computes one signature per input in parallel.
///
/// Entries whose signatures differ in length from the first successful entry
/// are reported as failures so the result always forms a valid corpus.
pub fn run_batch<F, E>(inputs: &[PathBuf], worker: F) -> BatchReport
where
    F: Fn(&Path) -> Result<Vec<f64>, E> + Sync,
    E: Display,
{
    let results: Vec<Result<Vec<f64>, String>> = inputs
        .par_iter()
        .map(|path| {
            tracing::debug!(path = %path.display(), "computing signature");
            worker(path).map_err(|e| e.to_string())
        })
        .collect();

    let mut report = BatchReport::default();
    let mut seen = HashSet::new();
    let mut expected_len: Option<usize> = None;

    for (path, result) in inputs.iter().zip(results) {
        let identifier = identifier_for(path);
        let outcome = result.and_then(|signature| {
            if !seen.insert(identifier.clone()) {
                return Err(format!("duplicate identifier '{}'", identifier));
            }
            match expected_len {
                Some(len) if len != signature.len() => Err(format!(
                    "signature length {} does not match {}",
                    signature.len(),
                    len
                )),
                _ => {
                    expected_len = Some(signature.len());
                    Ok(signature)
                }
            }
        });

        match outcome {
            Ok(signature) => report.entries.push(CorpusEntry::new(
                identifier,
                path.display().to_string(),
                signature,
            )),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "skipping input");
                report.failures.push(BatchFailure {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    report
}
