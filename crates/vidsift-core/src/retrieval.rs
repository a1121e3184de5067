//! Query surface: rank a reference corpus against a query under one model.

use crate::corpus::ReferenceCorpus;
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use crate::search::NeighborResult;

/// What to search for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query<'a> {
    /// A signature computed outside the corpus.
    Signature(&'a [f64]),
    /// The stored signature of a corpus entry.
    Reference(&'a str),
}

/// Checks that the corpus holds signatures of the length `model` stores.
pub fn check_corpus(model: Model, corpus: &ReferenceCorpus) -> CoreResult<()> {
    if let (Some(expected), Some(found)) = (model.stored_len(), corpus.signature_len()) {
        if expected != found {
            return Err(CoreError::mismatch(expected, found));
        }
    }
    Ok(())
}

/// Returns the `k` entries of `corpus` closest to `query` under `model`.
///
/// The query signature must have the corpus signature length. A reference
/// query ranks the entry itself first at distance zero.
pub fn search(
    query: Query<'_>,
    model: Model,
    corpus: &ReferenceCorpus,
    k: usize,
) -> CoreResult<Vec<NeighborResult>> {
    check_corpus(model, corpus)?;

    let signature = match query {
        Query::Signature(signature) => signature,
        Query::Reference(identifier) => corpus
            .get(identifier)
            .map(|e| e.signature.as_slice())
            .ok_or_else(|| CoreError::UnknownIdentifier(identifier.to_string()))?,
    };

    if let Some(expected) = corpus.signature_len() {
        if signature.len() != expected {
            return Err(CoreError::mismatch(expected, signature.len()));
        }
    }

    tracing::debug!(
        model = %model,
        metric = %model.metric(),
        entries = corpus.len(),
        k,
        "searching reference corpus"
    );
    corpus.nearest(signature, |q, r| model.distance(q, r), k)
}
