use std::any::Any;
use std::sync::Arc;

use crate::foundation::coords::CoordBatch;
use crate::foundation::error::{CoordError, CoordResult};
use crate::mapping::map::{MapRef, Mapping, check_apply, map_ref};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// How a compound combines its two children.
pub enum CompoundMode {
    /// Output of the first child feeds the input of the second.
    Series,
    /// Children act on disjoint leading/trailing axis ranges.
    Parallel,
}

#[derive(Debug)]
/// Composition of two mappings in series or in parallel.
///
/// A compound is itself a [`Mapping`], so composition nests arbitrarily.
/// Both children are shared handles: constructing a compound bumps each
/// operand's reference count and dropping the compound releases it, while
/// the operands remain independently usable.
pub struct CompoundMap {
    first: MapRef,
    second: MapRef,
    mode: CompoundMode,
}

impl CompoundMap {
    /// Compose in series: `first` applied first, then `second`.
    ///
    /// Fails with [`CoordError::DimensionMismatch`] unless
    /// `first.n_out() == second.n_in()`.
    pub fn series(first: &MapRef, second: &MapRef) -> CoordResult<Self> {
        if first.n_out() != second.n_in() {
            return Err(CoordError::dimension_mismatch(format!(
                "series compose: {} outputs {} axes but {} takes {}",
                first.class_name(),
                first.n_out(),
                second.class_name(),
                second.n_in()
            )));
        }
        Ok(Self {
            first: Arc::clone(first),
            second: Arc::clone(second),
            mode: CompoundMode::Series,
        })
    }

    /// Compose in parallel: `first` acts on the leading `first.n_in()`
    /// input axes, `second` on the remainder.
    pub fn parallel(first: &MapRef, second: &MapRef) -> CoordResult<Self> {
        Ok(Self {
            first: Arc::clone(first),
            second: Arc::clone(second),
            mode: CompoundMode::Parallel,
        })
    }

    /// Compose with an explicit mode.
    pub fn compose(first: &MapRef, second: &MapRef, mode: CompoundMode) -> CoordResult<Self> {
        match mode {
            CompoundMode::Series => Self::series(first, second),
            CompoundMode::Parallel => Self::parallel(first, second),
        }
    }

    /// First child handle.
    pub fn first(&self) -> &MapRef {
        &self.first
    }

    /// Second child handle.
    pub fn second(&self) -> &MapRef {
        &self.second
    }

    /// Composition mode.
    pub fn mode(&self) -> CompoundMode {
        self.mode
    }
}

impl Mapping for CompoundMap {
    fn n_in(&self) -> usize {
        match self.mode {
            CompoundMode::Series => self.first.n_in(),
            CompoundMode::Parallel => self.first.n_in() + self.second.n_in(),
        }
    }

    fn n_out(&self) -> usize {
        match self.mode {
            CompoundMode::Series => self.second.n_out(),
            CompoundMode::Parallel => self.first.n_out() + self.second.n_out(),
        }
    }

    fn forward_defined(&self) -> bool {
        self.first.forward_defined() && self.second.forward_defined()
    }

    fn inverse_defined(&self) -> bool {
        self.first.inverse_defined() && self.second.inverse_defined()
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        match self.mode {
            CompoundMode::Series => {
                let mid = self.first.apply_forward(batch)?;
                self.second.apply_forward(&mid)
            }
            CompoundMode::Parallel => {
                let (head, tail) = batch.split_rows(self.first.n_in())?;
                let out_head = self.first.apply_forward(&head)?;
                let out_tail = self.second.apply_forward(&tail)?;
                CoordBatch::concat_rows(&out_head, &out_tail)
            }
        }
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        match self.mode {
            // Inverse of a series swaps the order and inverts each child.
            CompoundMode::Series => {
                let mid = self.second.apply_inverse(batch)?;
                self.first.apply_inverse(&mid)
            }
            CompoundMode::Parallel => {
                let (head, tail) = batch.split_rows(self.first.n_out())?;
                let in_head = self.first.apply_inverse(&head)?;
                let in_tail = self.second.apply_inverse(&tail)?;
                CoordBatch::concat_rows(&in_head, &in_tail)
            }
        }
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(Self {
            first: self.first.deep_copy(),
            second: self.second.deep_copy(),
            mode: self.mode,
        })
    }

    fn class_name(&self) -> &'static str {
        "CompoundMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/compound.rs"]
mod tests;
