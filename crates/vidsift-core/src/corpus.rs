//! Reference corpus: the read-only table of precomputed video signatures.
//!
//! ## Table format
//!
//! Comma-separated text, one row per video:
//!
//! ```text
//! identifier,filepath,dim_0,dim_1,...,dim_{L-1}
//! clip_a.avi,videos/clip_a.avi,0,3,1,...
//! ```
//!
//! The header row is optional when reading. Fields containing commas or
//! quotes are double-quoted, with embedded quotes doubled.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::search::{top_k, NeighborResult};

/// One reference video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Unique identifier, usually the file name.
    pub identifier: String,
    /// Path of the source the signature was computed from.
    pub filepath: String,
    /// Fixed-length signature vector.
    pub signature: Vec<f64>,
}

impl CorpusEntry {
    pub fn new(
        identifier: impl Into<String>,
        filepath: impl Into<String>,
        signature: Vec<f64>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            filepath: filepath.into(),
            signature,
        }
    }
}

/// Ordered set of entries with unique identifiers and one signature length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceCorpus {
    entries: Vec<CorpusEntry>,
}

impl ReferenceCorpus {
    /// Builds a corpus, rejecting duplicate identifiers and ragged signatures.
    pub fn new(entries: Vec<CorpusEntry>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.identifier.as_str()) {
                return Err(CoreError::DuplicateIdentifier(entry.identifier.clone()));
            }
        }
        if let Some(first) = entries.first() {
            let expected = first.signature.len();
            if let Some(bad) = entries.iter().find(|e| e.signature.len() != expected) {
                return Err(CoreError::mismatch(expected, bad.signature.len()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signature length shared by every entry, `None` for an empty corpus.
    pub fn signature_len(&self) -> Option<usize> {
        self.entries.first().map(|e| e.signature.len())
    }

    /// Looks up an entry by identifier.
    pub fn get(&self, identifier: &str) -> Option<&CorpusEntry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    /// Ranks the corpus against `query` with `distance`; see [`top_k`].
    pub fn nearest<F>(
        &self,
        query: &[f64],
        distance: F,
        k: usize,
    ) -> CoreResult<Vec<NeighborResult>>
    where
        F: Fn(&[f64], &[f64]) -> CoreResult<f64>,
    {
        top_k(
            query,
            self.entries
                .iter()
                .map(|e| (e.identifier.as_str(), e.signature.as_slice())),
            distance,
            k,
        )
    }

    /// Reads a reference table from disk.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CoreError::parse(path, format!("cannot read table: {}", e)))?;
        Self::parse(&text)
    }

    /// Parses reference table text.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let mut entries = Vec::new();
        let mut width: Option<usize> = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_csv_line(line, line_no)?;
            if fields.len() < 3 {
                return Err(CoreError::malformed(
                    line_no,
                    format!("expected at least 3 fields, found {}", fields.len()),
                ));
            }
            if entries.is_empty() && width.is_none() && is_header(&fields) {
                width = Some(fields.len());
                continue;
            }
            match width {
                Some(w) if w != fields.len() => {
                    return Err(CoreError::malformed(
                        line_no,
                        format!("expected {} fields, found {}", w, fields.len()),
                    ));
                }
                None => width = Some(fields.len()),
                _ => {}
            }

            let signature = fields[2..]
                .iter()
                .enumerate()
                .map(|(col, raw)| {
                    match raw.trim().parse::<f64>() {
                        Ok(value) if value.is_finite() => Ok(value),
                        Ok(_) => Err(CoreError::malformed(
                            line_no,
                            format!("signature field {} is not finite: '{}'", col, raw),
                        )),
                        Err(_) => Err(CoreError::malformed(
                            line_no,
                            format!("signature field {} is not numeric: '{}'", col, raw),
                        )),
                    }
                })
                .collect::<CoreResult<Vec<f64>>>()?;

            entries.push(CorpusEntry {
                identifier: fields[0].clone(),
                filepath: fields[1].clone(),
                signature,
            });
        }

        Self::new(entries)
    }

    /// Serializes the corpus as table text with a header row.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let dims = self.signature_len().unwrap_or(0);

        out.push_str("identifier,filepath");
        for i in 0..dims {
            let _ = write!(out, ",dim_{}", i);
        }
        out.push('\n');

        for entry in &self.entries {
            out.push_str(&csv_escape(&entry.identifier));
            out.push(',');
            out.push_str(&csv_escape(&entry.filepath));
            for value in &entry.signature {
                let _ = write!(out, ",{}", value);
            }
            out.push('\n');
        }
        out
    }

    /// Writes the table to disk.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        fs::write(path, self.to_csv())?;
        Ok(())
    }
}

/// Quotes a field if it contains separators or quotes.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// A header names the identifier column or has no numeric signature field.
fn is_header(fields: &[String]) -> bool {
    fields[0].trim() == "identifier"
        || fields[2..]
            .iter()
            .all(|f| f.trim().parse::<f64>().is_err())
}

/// Splits one line into fields, honoring double-quoted fields.
fn split_csv_line(line: &str, line_no: usize) -> CoreResult<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(CoreError::malformed(line_no, "unterminated quoted field"));
    }
    fields.push(current);
    Ok(fields)
}
