use std::any::Any;

use crate::foundation::coords::CoordBatch;
use crate::foundation::error::{CoordError, CoordResult};
use crate::mapping::map::{MapRef, Mapping, check_apply, map_ref};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Identity transform over a fixed number of axes.
pub struct UnitMap {
    n_axes: usize,
}

impl UnitMap {
    /// Create an identity over `n_axes` axes.
    pub fn new(n_axes: usize) -> CoordResult<Self> {
        if n_axes == 0 {
            return Err(CoordError::validation("UnitMap needs at least one axis"));
        }
        Ok(Self { n_axes })
    }
}

impl Mapping for UnitMap {
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
        Ok(batch.clone())
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        Ok(batch.clone())
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(self.clone())
    }

    fn is_identity(&self) -> bool {
        true
    }

    fn class_name(&self) -> &'static str {
        "UnitMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/unit.rs"]
mod tests;
