use smallvec::SmallVec;

use crate::foundation::error::{CoordError, CoordResult};

/// Inline capacity for per-point scratch buffers.
///
/// Batches of any axis count are supported; points with more axes spill
/// to the heap.
pub const POINT_INLINE_AXES: usize = 8;

/// A single coordinate tuple extracted from or fed into a batch.
pub type Point = SmallVec<[f64; POINT_INLINE_AXES]>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A batch of coordinate tuples: rows are axes, columns are samples.
///
/// Storage is axis-major (`data[axis * n_samples + sample]`) so a whole
/// axis row is contiguous, which keeps per-axis transform loops tight.
/// Mappings change the axis count of a batch, never the sample count.
pub struct CoordBatch {
    n_axes: usize,
    n_samples: usize,
    data: Vec<f64>,
}

impl CoordBatch {
    /// Create a zero-filled batch with the given shape.
    pub fn zeros(n_axes: usize, n_samples: usize) -> CoordResult<Self> {
        if n_axes == 0 {
            return Err(CoordError::validation("batch must have at least one axis"));
        }
        Ok(Self {
            n_axes,
            n_samples,
            data: vec![0.0; n_axes * n_samples],
        })
    }

    /// Create a batch from axis-major rows.
    ///
    /// Every row must have the same length; that length becomes the
    /// sample count.
    pub fn from_rows(rows: &[Vec<f64>]) -> CoordResult<Self> {
        if rows.is_empty() {
            return Err(CoordError::validation("batch must have at least one axis"));
        }
        let n_samples = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_samples {
                return Err(CoordError::validation(format!(
                    "axis row {i} has {} samples, expected {n_samples}",
                    row.len()
                )));
            }
        }
        let mut data = Vec::with_capacity(rows.len() * n_samples);
        for row in rows {
            data.extend_from_slice(row);
        }
        Ok(Self {
            n_axes: rows.len(),
            n_samples,
            data,
        })
    }

    /// Create a single-sample batch from one coordinate tuple.
    pub fn from_point(point: &[f64]) -> CoordResult<Self> {
        if point.is_empty() {
            return Err(CoordError::validation("point must have at least one axis"));
        }
        Ok(Self {
            n_axes: point.len(),
            n_samples: 1,
            data: point.to_vec(),
        })
    }

    /// Number of axes (rows).
    pub fn n_axes(&self) -> usize {
        self.n_axes
    }

    /// Number of samples (columns).
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Contiguous row of values for one axis.
    pub fn axis(&self, axis: usize) -> &[f64] {
        let start = axis * self.n_samples;
        &self.data[start..start + self.n_samples]
    }

    /// Mutable row of values for one axis.
    pub fn axis_mut(&mut self, axis: usize) -> &mut [f64] {
        let start = axis * self.n_samples;
        &mut self.data[start..start + self.n_samples]
    }

    /// Read one coordinate value.
    pub fn get(&self, axis: usize, sample: usize) -> f64 {
        self.data[axis * self.n_samples + sample]
    }

    /// Write one coordinate value.
    pub fn set(&mut self, axis: usize, sample: usize, value: f64) {
        self.data[axis * self.n_samples + sample] = value;
    }

    /// Extract the coordinate tuple at one sample column.
    pub fn point(&self, sample: usize) -> Point {
        let mut p = Point::with_capacity(self.n_axes);
        for axis in 0..self.n_axes {
            p.push(self.get(axis, sample));
        }
        p
    }

    /// Split the batch by rows at `at`, preserving sample order.
    ///
    /// Returns `(first, second)` where `first` holds axes `0..at` and
    /// `second` holds axes `at..n_axes`.
    pub fn split_rows(&self, at: usize) -> CoordResult<(Self, Self)> {
        if at == 0 || at >= self.n_axes {
            return Err(CoordError::validation(format!(
                "row split at {at} outside 1..{}",
                self.n_axes
            )));
        }
        let cut = at * self.n_samples;
        let first = Self {
            n_axes: at,
            n_samples: self.n_samples,
            data: self.data[..cut].to_vec(),
        };
        let second = Self {
            n_axes: self.n_axes - at,
            n_samples: self.n_samples,
            data: self.data[cut..].to_vec(),
        };
        Ok((first, second))
    }

    /// Concatenate two batches by rows; both must agree on sample count.
    pub fn concat_rows(first: &Self, second: &Self) -> CoordResult<Self> {
        if first.n_samples != second.n_samples {
            return Err(CoordError::dimension_mismatch(format!(
                "row concat of {} and {} samples",
                first.n_samples, second.n_samples
            )));
        }
        let mut data = Vec::with_capacity(first.data.len() + second.data.len());
        data.extend_from_slice(&first.data);
        data.extend_from_slice(&second.data);
        Ok(Self {
            n_axes: first.n_axes + second.n_axes,
            n_samples: first.n_samples,
            data,
        })
    }

    /// Flat axis-major view of the underlying values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/coords.rs"]
mod tests;
