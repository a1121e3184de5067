//! Exhaustive k-nearest-neighbor search over a reference corpus.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborResult {
    /// Identifier of the reference entry.
    pub identifier: String,
    /// Distance from the query.
    pub distance: f64,
}

/// Scores `query` against every `(identifier, signature)` pair and returns the
/// `k` closest, ascending by distance.
///
/// Ties keep corpus order (the sort is stable). The first distance error
/// aborts the search and is returned to the caller. An empty corpus with
/// `k > 0` fails with [`CoreError::EmptyCorpus`]; `k == 0` always yields an
/// empty list.
pub fn top_k<'a, I, F>(
    query: &[f64],
    corpus: I,
    distance: F,
    k: usize,
) -> CoreResult<Vec<NeighborResult>>
where
    I: IntoIterator<Item = (&'a str, &'a [f64])>,
    F: Fn(&[f64], &[f64]) -> CoreResult<f64>,
{
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut scored = Vec::new();
    for (identifier, signature) in corpus {
        let d = distance(query, signature)?;
        scored.push(NeighborResult {
            identifier: identifier.to_string(),
            distance: d,
        });
    }

    if scored.is_empty() {
        return Err(CoreError::EmptyCorpus);
    }

    scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    scored.truncate(k);
    Ok(scored)
}
