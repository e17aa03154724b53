//! The affine leaf family: zoom, shift, matrix and general affine maps.
//!
//! These leaves are algebraically closed under series composition: any
//! adjacent pair folds into a single `y = M·x + b` map via the
//! [`Mapping::merged_with`] hook, and the folded result re-specializes
//! to the narrowest member that can represent it.

use std::any::Any;

use crate::foundation::coords::CoordBatch;
use crate::foundation::error::{CoordError, CoordResult};
use crate::foundation::math::{invert_matrix, mat_mul, mat_vec};
use crate::mapping::map::{MapRef, Mapping, check_apply, map_ref};
use crate::mapping::unit::UnitMap;

#[derive(Clone, Debug)]
/// Row-major `y = matrix · x + offset` coefficients.
struct AffineCoeffs {
    n_in: usize,
    n_out: usize,
    matrix: Vec<f64>,
    offset: Vec<f64>,
}

impl AffineCoeffs {
    /// Coefficients of `first` followed by `second`.
    fn compose(first: &Self, second: &Self) -> Self {
        let matrix = mat_mul(
            &second.matrix,
            &first.matrix,
            second.n_out,
            second.n_in,
            first.n_in,
        );
        let mut offset = mat_vec(&second.matrix, &first.offset, second.n_out, second.n_in);
        for (o, b) in offset.iter_mut().zip(&second.offset) {
            *o += b;
        }
        Self {
            n_in: first.n_in,
            n_out: second.n_out,
            matrix,
            offset,
        }
    }

    fn is_identity_matrix(&self) -> bool {
        if self.n_in != self.n_out {
            return false;
        }
        self.matrix.iter().enumerate().all(|(i, &v)| {
            let expected = if i / self.n_in == i % self.n_in {
                1.0
            } else {
                0.0
            };
            v == expected
        })
    }

    fn is_zero_offset(&self) -> bool {
        self.offset.iter().all(|&v| v == 0.0)
    }

    /// The shared diagonal factor, when the matrix is a uniform scale.
    fn uniform_zoom(&self) -> Option<f64> {
        if self.n_in != self.n_out {
            return None;
        }
        let factor = self.matrix[0];
        for (i, &v) in self.matrix.iter().enumerate() {
            let on_diagonal = i / self.n_in == i % self.n_in;
            if on_diagonal && v != factor {
                return None;
            }
            if !on_diagonal && v != 0.0 {
                return None;
            }
        }
        Some(factor)
    }
}

/// Extract affine coefficients when `mapping` belongs to the family.
fn coeffs_of(mapping: &dyn Mapping) -> Option<AffineCoeffs> {
    let any = mapping.as_any();
    if let Some(unit) = any.downcast_ref::<UnitMap>() {
        let n = unit.n_in();
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            matrix[i * n + i] = 1.0;
        }
        return Some(AffineCoeffs {
            n_in: n,
            n_out: n,
            matrix,
            offset: vec![0.0; n],
        });
    }
    if let Some(zoom) = any.downcast_ref::<ZoomMap>() {
        let n = zoom.n_in();
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            matrix[i * n + i] = zoom.factor();
        }
        return Some(AffineCoeffs {
            n_in: n,
            n_out: n,
            matrix,
            offset: vec![0.0; n],
        });
    }
    if let Some(shift) = any.downcast_ref::<ShiftMap>() {
        let n = shift.n_in();
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            matrix[i * n + i] = 1.0;
        }
        return Some(AffineCoeffs {
            n_in: n,
            n_out: n,
            matrix,
            offset: shift.offsets().to_vec(),
        });
    }
    if let Some(mat) = any.downcast_ref::<MatrixMap>() {
        return Some(AffineCoeffs {
            n_in: mat.n_in(),
            n_out: mat.n_out(),
            matrix: mat.elements().to_vec(),
            offset: vec![0.0; mat.n_out()],
        });
    }
    if let Some(aff) = any.downcast_ref::<AffineMap>() {
        return Some(AffineCoeffs {
            n_in: aff.n_in(),
            n_out: aff.n_out(),
            matrix: aff.matrix.clone(),
            offset: aff.offset.clone(),
        });
    }
    None
}

/// Wrap coefficients in the narrowest family member representing them.
fn specialize(coeffs: AffineCoeffs) -> MapRef {
    let identity_matrix = coeffs.is_identity_matrix();
    let zero_offset = coeffs.is_zero_offset();
    if identity_matrix && zero_offset {
        if let Ok(unit) = UnitMap::new(coeffs.n_in) {
            return map_ref(unit);
        }
    }
    if identity_matrix {
        if let Ok(shift) = ShiftMap::new(coeffs.offset.clone()) {
            return map_ref(shift);
        }
    }
    if zero_offset {
        if let Some(factor) = coeffs.uniform_zoom()
            && let Ok(zoom) = ZoomMap::new(coeffs.n_in, factor)
        {
            return map_ref(zoom);
        }
        if let Ok(mat) = MatrixMap::from_flat(coeffs.n_out, coeffs.n_in, coeffs.matrix.clone()) {
            return map_ref(mat);
        }
    }
    map_ref(AffineMap::from_coeffs(coeffs))
}

/// Family-wide series merge: `first` followed by `next`.
fn merge_affine(first: &dyn Mapping, next: &dyn Mapping) -> Option<MapRef> {
    let a = coeffs_of(first)?;
    let b = coeffs_of(next)?;
    if a.n_out != b.n_in {
        return None;
    }
    Some(specialize(AffineCoeffs::compose(&a, &b)))
}

/// Re-specialize a family member, if a narrower member represents it.
fn respecialized(mapping: &dyn Mapping) -> Option<MapRef> {
    let coeffs = coeffs_of(mapping)?;
    let narrowed = specialize(coeffs);
    if narrowed.class_name() == mapping.class_name() {
        None
    } else {
        Some(narrowed)
    }
}

/// Multiply a row-major matrix into a batch, axis rows at a time.
fn apply_matrix(
    elements: &[f64],
    n_rows: usize,
    n_cols: usize,
    batch: &CoordBatch,
) -> CoordResult<CoordBatch> {
    let mut out = CoordBatch::zeros(n_rows, batch.n_samples())?;
    for r in 0..n_rows {
        for c in 0..n_cols {
            let weight = elements[r * n_cols + c];
            if weight == 0.0 {
                continue;
            }
            let src = batch.axis(c);
            for (acc, &x) in out.axis_mut(r).iter_mut().zip(src) {
                *acc += weight * x;
            }
        }
    }
    Ok(out)
}

fn validate_finite(values: &[f64], what: &str) -> CoordResult<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CoordError::validation(format!("{what} must be finite")));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Uniform scale about the origin.
pub struct ZoomMap {
    n_axes: usize,
    factor: f64,
}

impl ZoomMap {
    /// Create a uniform scale over `n_axes` axes.
    ///
    /// The factor must be finite and non-zero so the inverse is defined.
    pub fn new(n_axes: usize, factor: f64) -> CoordResult<Self> {
        if n_axes == 0 {
            return Err(CoordError::validation("ZoomMap needs at least one axis"));
        }
        if !factor.is_finite() || factor == 0.0 {
            return Err(CoordError::validation(
                "ZoomMap factor must be finite and non-zero",
            ));
        }
        Ok(Self { n_axes, factor })
    }

    /// The scale factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Mapping for ZoomMap {
    fn n_in(&self) -> usize {
        self.n_axes
    }

    fn n_out(&self) -> usize {
        self.n_axes
    }

    fn inverse_defined(&self) -> bool {
        true
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        let mut out = batch.clone();
        for axis in 0..self.n_axes {
            for v in out.axis_mut(axis) {
                *v *= self.factor;
            }
        }
        Ok(out)
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        let mut out = batch.clone();
        for axis in 0..self.n_axes {
            for v in out.axis_mut(axis) {
                *v /= self.factor;
            }
        }
        Ok(out)
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(self.clone())
    }

    fn is_identity(&self) -> bool {
        self.factor == 1.0
    }

    fn simplify_step(&self) -> Option<MapRef> {
        respecialized(self)
    }

    fn merged_with(&self, next: &dyn Mapping) -> Option<MapRef> {
        merge_affine(self, next)
    }

    fn class_name(&self) -> &'static str {
        "ZoomMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-axis translation.
pub struct ShiftMap {
    offsets: Vec<f64>,
}

impl ShiftMap {
    /// Create a translation by `offsets`, one entry per axis.
    pub fn new(offsets: Vec<f64>) -> CoordResult<Self> {
        if offsets.is_empty() {
            return Err(CoordError::validation("ShiftMap needs at least one axis"));
        }
        validate_finite(&offsets, "ShiftMap offsets")?;
        Ok(Self { offsets })
    }

    /// The per-axis offsets.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }
}

impl Mapping for ShiftMap {
    fn n_in(&self) -> usize {
        self.offsets.len()
    }

    fn n_out(&self) -> usize {
        self.offsets.len()
    }

    fn inverse_defined(&self) -> bool {
        true
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        let mut out = batch.clone();
        for (axis, &d) in self.offsets.iter().enumerate() {
            for v in out.axis_mut(axis) {
                *v += d;
            }
        }
        Ok(out)
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        let mut out = batch.clone();
        for (axis, &d) in self.offsets.iter().enumerate() {
            for v in out.axis_mut(axis) {
                *v -= d;
            }
        }
        Ok(out)
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(self.clone())
    }

    fn is_identity(&self) -> bool {
        self.offsets.iter().all(|&d| d == 0.0)
    }

    fn simplify_step(&self) -> Option<MapRef> {
        respecialized(self)
    }

    fn merged_with(&self, next: &dyn Mapping) -> Option<MapRef> {
        merge_affine(self, next)
    }

    fn class_name(&self) -> &'static str {
        "ShiftMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// General linear map `y = M·x`, possibly non-square.
///
/// The inverse is defined only when the matrix is square and
/// numerically invertible; a non-square or singular matrix map declares
/// itself non-invertible instead of failing at apply time.
pub struct MatrixMap {
    n_rows: usize,
    n_cols: usize,
    elements: Vec<f64>,
    inverse: Option<Vec<f64>>,
}

impl MatrixMap {
    /// Create a linear map from matrix rows.
    pub fn new(rows: &[Vec<f64>]) -> CoordResult<Self> {
        if rows.is_empty() {
            return Err(CoordError::validation("MatrixMap needs at least one row"));
        }
        let n_cols = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(CoordError::validation(format!(
                    "matrix row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
        }
        let mut elements = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            elements.extend_from_slice(row);
        }
        Self::from_flat(rows.len(), n_cols, elements)
    }

    /// Create a linear map from row-major elements.
    pub fn from_flat(n_rows: usize, n_cols: usize, elements: Vec<f64>) -> CoordResult<Self> {
        if n_rows == 0 || n_cols == 0 {
            return Err(CoordError::validation(
                "MatrixMap needs at least one row and one column",
            ));
        }
        if elements.len() != n_rows * n_cols {
            return Err(CoordError::validation(format!(
                "matrix of {n_rows}x{n_cols} needs {} elements, got {}",
                n_rows * n_cols,
                elements.len()
            )));
        }
        validate_finite(&elements, "MatrixMap elements")?;
        let inverse = if n_rows == n_cols {
            invert_matrix(n_rows, &elements)
        } else {
            None
        };
        Ok(Self {
            n_rows,
            n_cols,
            elements,
            inverse,
        })
    }

    /// Row-major matrix elements.
    pub fn elements(&self) -> &[f64] {
        &self.elements
    }
}

impl Mapping for MatrixMap {
    fn n_in(&self) -> usize {
        self.n_cols
    }

    fn n_out(&self) -> usize {
        self.n_rows
    }

    fn inverse_defined(&self) -> bool {
        self.inverse.is_some()
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        apply_matrix(&self.elements, self.n_rows, self.n_cols, batch)
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        let inverse = self.inverse.as_ref().ok_or_else(|| {
            CoordError::inverse_undefined("MatrixMap matrix is not invertible")
        })?;
        apply_matrix(inverse, self.n_cols, self.n_rows, batch)
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(self.clone())
    }

    fn is_identity(&self) -> bool {
        self.n_rows == self.n_cols
            && self.elements.iter().enumerate().all(|(i, &v)| {
                let expected = if i / self.n_cols == i % self.n_cols {
                    1.0
                } else {
                    0.0
                };
                v == expected
            })
    }

    fn simplify_step(&self) -> Option<MapRef> {
        respecialized(self)
    }

    fn merged_with(&self, next: &dyn Mapping) -> Option<MapRef> {
        merge_affine(self, next)
    }

    fn class_name(&self) -> &'static str {
        "MatrixMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// General affine map `y = M·x + b`, possibly non-square.
///
/// This is the closed merge result of the family; the simplifier hook
/// re-specializes it back to a unit, shift, zoom or matrix map whenever
/// its coefficients allow.
pub struct AffineMap {
    n_in: usize,
    n_out: usize,
    matrix: Vec<f64>,
    offset: Vec<f64>,
    inverse: Option<AffineInverse>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct AffineInverse {
    matrix: Vec<f64>,
    offset: Vec<f64>,
}

impl AffineMap {
    /// Create an affine map from matrix rows and an offset vector.
    pub fn new(rows: &[Vec<f64>], offset: Vec<f64>) -> CoordResult<Self> {
        if rows.is_empty() {
            return Err(CoordError::validation("AffineMap needs at least one row"));
        }
        let n_cols = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(CoordError::validation(format!(
                    "affine row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
        }
        if n_cols == 0 {
            return Err(CoordError::validation(
                "AffineMap needs at least one column",
            ));
        }
        if offset.len() != rows.len() {
            return Err(CoordError::validation(format!(
                "affine offset has {} entries for {} rows",
                offset.len(),
                rows.len()
            )));
        }
        let mut matrix = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            matrix.extend_from_slice(row);
        }
        validate_finite(&matrix, "AffineMap matrix")?;
        validate_finite(&offset, "AffineMap offset")?;
        Ok(Self::from_coeffs(AffineCoeffs {
            n_in: n_cols,
            n_out: offset.len(),
            matrix,
            offset,
        }))
    }

    fn from_coeffs(coeffs: AffineCoeffs) -> Self {
        // x = M^-1·y - M^-1·b when M is square and invertible.
        let inverse = if coeffs.n_in == coeffs.n_out {
            invert_matrix(coeffs.n_in, &coeffs.matrix).map(|minv| {
                let mut off = mat_vec(&minv, &coeffs.offset, coeffs.n_in, coeffs.n_in);
                for v in &mut off {
                    *v = -*v;
                }
                AffineInverse {
                    matrix: minv,
                    offset: off,
                }
            })
        } else {
            None
        };
        Self {
            n_in: coeffs.n_in,
            n_out: coeffs.n_out,
            matrix: coeffs.matrix,
            offset: coeffs.offset,
            inverse,
        }
    }
}

impl Mapping for AffineMap {
    fn n_in(&self) -> usize {
        self.n_in
    }

    fn n_out(&self) -> usize {
        self.n_out
    }

    fn inverse_defined(&self) -> bool {
        self.inverse.is_some()
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        let mut out = apply_matrix(&self.matrix, self.n_out, self.n_in, batch)?;
        for (axis, &b) in self.offset.iter().enumerate() {
            for v in out.axis_mut(axis) {
                *v += b;
            }
        }
        Ok(out)
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        let inverse = self.inverse.as_ref().ok_or_else(|| {
            CoordError::inverse_undefined("AffineMap matrix is not invertible")
        })?;
        let mut out = apply_matrix(&inverse.matrix, self.n_in, self.n_out, batch)?;
        for (axis, &b) in inverse.offset.iter().enumerate() {
            for v in out.axis_mut(axis) {
                *v += b;
            }
        }
        Ok(out)
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(self.clone())
    }

    fn is_identity(&self) -> bool {
        self.offset.iter().all(|&v| v == 0.0)
            && self.n_in == self.n_out
            && self.matrix.iter().enumerate().all(|(i, &v)| {
                let expected = if i / self.n_in == i % self.n_in {
                    1.0
                } else {
                    0.0
                };
                v == expected
            })
    }

    fn simplify_step(&self) -> Option<MapRef> {
        respecialized(self)
    }

    fn merged_with(&self, next: &dyn Mapping) -> Option<MapRef> {
        merge_affine(self, next)
    }

    fn class_name(&self) -> &'static str {
        "AffineMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/affine.rs"]
mod tests;
