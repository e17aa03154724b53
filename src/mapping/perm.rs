use std::any::Any;

use crate::foundation::coords::CoordBatch;
use crate::foundation::error::{CoordError, CoordResult};
use crate::mapping::map::{MapRef, Mapping, check_apply, map_ref};
use crate::mapping::unit::UnitMap;

/// Validate that `perm` is a 1-based permutation of `1..=n_axes`.
pub(crate) fn validate_axis_perm(n_axes: usize, perm: &[usize]) -> CoordResult<()> {
    if perm.len() != n_axes {
        return Err(CoordError::validation(format!(
            "permutation has {} entries for {n_axes} axes",
            perm.len()
        )));
    }
    let mut seen = vec![false; n_axes];
    for &p in perm {
        if p == 0 || p > n_axes {
            return Err(CoordError::validation(format!(
                "permutation entry {p} outside 1..={n_axes}"
            )));
        }
        if seen[p - 1] {
            return Err(CoordError::validation(format!(
                "permutation repeats axis {p}"
            )));
        }
        seen[p - 1] = true;
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Axis permutation and selection, possibly with unequal axis counts.
///
/// Each entry of `out_perm` names the 1-based input axis feeding that
/// output axis; each entry of `in_perm` names the 1-based output axis
/// that reconstructs that input axis on the inverse path. A negative
/// entry `-k` supplies `constants[k - 1]` instead, which is how an axis
/// dropped in one direction is restored in the other. Both directions
/// are always defined, though a round trip through dropped axes only
/// recovers the configured constants.
pub struct PermMap {
    in_perm: Vec<i32>,
    out_perm: Vec<i32>,
    constants: Vec<f64>,
}

impl PermMap {
    /// Create a permutation/selection mapping.
    ///
    /// `in_perm.len()` becomes `n_in` and `out_perm.len()` becomes
    /// `n_out`. Entries must be non-zero, positive entries must index a
    /// live axis on the other side, and negative entries must index into
    /// `constants`.
    pub fn new(in_perm: Vec<i32>, out_perm: Vec<i32>, constants: Vec<f64>) -> CoordResult<Self> {
        if in_perm.is_empty() || out_perm.is_empty() {
            return Err(CoordError::validation(
                "PermMap needs at least one axis on each side",
            ));
        }
        let n_in = in_perm.len();
        let n_out = out_perm.len();
        for (side, perm, limit) in [("in_perm", &in_perm, n_out), ("out_perm", &out_perm, n_in)] {
            for &p in perm.iter() {
                if p == 0 {
                    return Err(CoordError::validation(format!("{side} entry must not be 0")));
                }
                if p > 0 && p as usize > limit {
                    return Err(CoordError::validation(format!(
                        "{side} entry {p} outside 1..={limit}"
                    )));
                }
                if p < 0 && p.unsigned_abs() as usize > constants.len() {
                    return Err(CoordError::validation(format!(
                        "{side} entry {p} has no matching constant"
                    )));
                }
            }
        }
        Ok(Self {
            in_perm,
            out_perm,
            constants,
        })
    }

    /// Create a square axis permutation.
    ///
    /// `perm` is 1-based: output axis `i` takes input axis `perm[i]`.
    pub fn axis_swap(perm: &[usize]) -> CoordResult<Self> {
        let n = perm.len();
        validate_axis_perm(n, perm)?;
        let out_perm: Vec<i32> = perm.iter().map(|&p| p as i32).collect();
        let mut in_perm = vec![0i32; n];
        for (i, &p) in perm.iter().enumerate() {
            in_perm[p - 1] = (i + 1) as i32;
        }
        Self::new(in_perm, out_perm, Vec::new())
    }

    fn route(
        &self,
        batch: &CoordBatch,
        perm: &[i32],
        n_to: usize,
    ) -> CoordResult<CoordBatch> {
        let mut out = CoordBatch::zeros(n_to, batch.n_samples())?;
        for (to_axis, &p) in perm.iter().enumerate() {
            let row = out.axis_mut(to_axis);
            if p > 0 {
                row.copy_from_slice(batch.axis(p as usize - 1));
            } else {
                row.fill(self.constants[p.unsigned_abs() as usize - 1]);
            }
        }
        Ok(out)
    }
}

impl Mapping for PermMap {
    fn n_in(&self) -> usize {
        self.in_perm.len()
    }

    fn n_out(&self) -> usize {
        self.out_perm.len()
    }

    fn inverse_defined(&self) -> bool {
        true
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        self.route(batch, &self.out_perm, self.n_out())
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        self.route(batch, &self.in_perm, self.n_in())
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(self.clone())
    }

    fn is_identity(&self) -> bool {
        self.constants.is_empty()
            && self.in_perm.len() == self.out_perm.len()
            && self.out_perm.iter().enumerate().all(|(i, &p)| p == (i + 1) as i32)
            && self.in_perm.iter().enumerate().all(|(i, &p)| p == (i + 1) as i32)
    }

    fn simplify_step(&self) -> Option<MapRef> {
        if self.is_identity() {
            return UnitMap::new(self.n_in()).ok().map(map_ref);
        }
        None
    }

    fn merged_with(&self, next: &dyn Mapping) -> Option<MapRef> {
        let next = next.as_any().downcast_ref::<PermMap>()?;
        if self.n_out() != next.n_in() {
            return None;
        }
        // Routes through constants are not composable axis-to-axis.
        if !self.constants.is_empty() || !next.constants.is_empty() {
            return None;
        }
        let out_perm: Vec<i32> = next
            .out_perm
            .iter()
            .map(|&p| self.out_perm[p as usize - 1])
            .collect();
        let in_perm: Vec<i32> = self
            .in_perm
            .iter()
            .map(|&p| next.in_perm[p as usize - 1])
            .collect();
        Self::new(in_perm, out_perm, Vec::new()).ok().map(map_ref)
    }

    fn class_name(&self) -> &'static str {
        "PermMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/perm.rs"]
mod tests;
