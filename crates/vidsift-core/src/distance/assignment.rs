//! Exact minimum-cost bipartite assignment.
//!
//! Shortest-augmenting-path Hungarian method with row/column potentials,
//! O(rows² · cols). Results are exact and deterministic: the same matrix
//! always yields the same assignment.

use crate::error::{CoreError, CoreResult};

/// Dense row-major cost matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Builds a matrix by evaluating `cost(row, col)` for every cell.
    pub fn from_fn(rows: usize, cols: usize, mut cost: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(cost(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Wraps existing row-major data.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<f64>) -> CoreResult<Self> {
        if data.len() != rows * cols {
            return Err(CoreError::mismatch(rows * cols, data.len()));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

/// An optimal assignment of every row to a distinct column.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// `row_to_col[r]` is the column matched with row `r`.
    pub row_to_col: Vec<usize>,
    /// Sum of the matched costs, accumulated in row order.
    pub cost: f64,
}

/// Solves the assignment problem for `matrix` (requires `rows <= cols`).
pub fn solve(matrix: &CostMatrix) -> CoreResult<Assignment> {
    let n = matrix.rows;
    let m = matrix.cols;

    if n > m {
        return Err(CoreError::Assignment(format!(
            "more rows ({}) than columns ({})",
            n, m
        )));
    }
    if let Some(bad) = matrix.data.iter().find(|c| !c.is_finite()) {
        return Err(CoreError::Assignment(format!("non-finite cost {}", bad)));
    }
    if n == 0 {
        return Ok(Assignment {
            row_to_col: Vec::new(),
            cost: 0.0,
        });
    }

    // 1-based indices; row 0 / column 0 are the virtual source.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = matrix.get(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            if j1 == 0 {
                return Err(CoreError::Assignment(
                    "no augmenting path found".to_string(),
                ));
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }

    let cost = row_to_col
        .iter()
        .enumerate()
        .map(|(r, &c)| matrix.get(r, c))
        .sum();

    Ok(Assignment { row_to_col, cost })
}
