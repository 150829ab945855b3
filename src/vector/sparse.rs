// src/vector/sparse.rs
//! Compressed sparse row matrix for hashed feature rows.

/// CSR matrix: row `i` holds `indices[indptr[i]..indptr[i+1]]` with the
/// matching `data` values. Column indices within a row are ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl SparseMatrix {
    /// An empty matrix with zero rows.
    #[must_use]
    pub fn empty(n_cols: usize) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// A single row from `(column, value)` pairs; repeated columns are summed.
    #[must_use]
    pub fn row(entries: impl IntoIterator<Item = (usize, f64)>, n_cols: usize) -> Self {
        let mut pairs: Vec<(usize, f64)> = entries.into_iter().collect();
        pairs.sort_by_key(|(c, _)| *c);

        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut data: Vec<f64> = Vec::with_capacity(pairs.len());
        for (col, value) in pairs {
            match indices.last() {
                Some(&last) if last == col => {
                    if let Some(v) = data.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(col);
                    data.push(value);
                }
            }
        }

        Self {
            n_cols,
            indptr: vec![0, indices.len()],
            indices,
            data,
        }
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Stored (non-zero) entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Column indices and values of row `i`.
    #[must_use]
    pub fn row_entries(&self, i: usize) -> Option<(&[usize], &[f64])> {
        let start = *self.indptr.get(i)?;
        let end = *self.indptr.get(i + 1)?;
        Some((&self.indices[start..end], &self.data[start..end]))
    }

    /// Row `i` expanded to `n_cols` values.
    #[must_use]
    pub fn dense_row(&self, i: usize) -> Option<Vec<f64>> {
        let (cols, vals) = self.row_entries(i)?;
        let mut dense = vec![0.0; self.n_cols];
        for (&c, &v) in cols.iter().zip(vals) {
            if let Some(slot) = dense.get_mut(c) {
                *slot = v;
            }
        }
        Some(dense)
    }

    fn append(&mut self, other: Self) {
        let offset = self.data.len();
        self.indices.extend(other.indices);
        self.data.extend(other.data);
        self.indptr
            .extend(other.indptr.into_iter().skip(1).map(|p| p + offset));
    }
}

/// Stacks `bottom` under `top`, keeping row order. An absent operand yields
/// the other one unchanged.
#[must_use]
pub fn concatenate_rows(
    top: Option<SparseMatrix>,
    bottom: Option<SparseMatrix>,
    n_cols: usize,
) -> Option<SparseMatrix> {
    match (top, bottom) {
        (None, other) | (other, None) => other,
        (Some(mut a), Some(b)) => {
            a.n_cols = n_cols;
            a.append(b);
            Some(a)
        }
    }
}
