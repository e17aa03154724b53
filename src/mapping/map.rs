use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::foundation::coords::CoordBatch;
use crate::foundation::error::{CoordError, CoordResult};
use crate::mapping::compound::CompoundMap;

/// Shared handle to a transform unit.
///
/// Inserting a `MapRef` into a compound structure clones the handle, so
/// the operand stays independently usable and its reference count is
/// observable through [`Arc::strong_count`]. Use [`Mapping::deep_copy`]
/// for a structurally independent clone.
pub type MapRef = Arc<dyn Mapping>;

/// A coordinate transform with fixed input/output dimensionality.
///
/// This is the full capability set the engine dispatches through; leaf
/// transform kinds implement it and stay otherwise opaque to the
/// composition, simplification and routing machinery.
///
/// Implementations must uphold the shape contract: applying forward to a
/// batch of `n_in` axes yields a batch of `n_out` axes with the same
/// sample count, and the inverse direction mirrors that. Numeric domain
/// failures during application are reported as
/// [`CoordError::Evaluation`].
pub trait Mapping: Debug + Send + Sync {
    /// Number of input axes (always > 0).
    fn n_in(&self) -> usize;

    /// Number of output axes (always > 0).
    fn n_out(&self) -> usize;

    /// Whether the forward direction is defined.
    fn forward_defined(&self) -> bool {
        true
    }

    /// Whether the inverse direction is defined.
    fn inverse_defined(&self) -> bool;

    /// Transform a batch from input to output coordinates.
    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch>;

    /// Transform a batch from output back to input coordinates.
    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch>;

    /// Reconstruct an independent deep clone of this mapping.
    ///
    /// The clone shares no structure with the original; mutating or
    /// dropping either side never affects the other.
    fn deep_copy(&self) -> MapRef;

    /// Whether this mapping is the identity on its axes.
    ///
    /// Identity mappings are elided when a compound is simplified. A
    /// mapping reporting `true` must be square and must return its input
    /// unchanged in both directions.
    fn is_identity(&self) -> bool {
        false
    }

    /// Behavior-preserving rewrite of this mapping alone, if one exists.
    ///
    /// Leaf kinds use this to re-specialize (for example a general
    /// affine map whose coefficients collapsed to a pure translation).
    fn simplify_step(&self) -> Option<MapRef> {
        None
    }

    /// Merge with the mapping applied immediately after this one in a
    /// series chain, if the pair is algebraically mergeable.
    ///
    /// The merge catalog is leaf-kind-defined; the engine only requires
    /// that the returned mapping is behaviorally equivalent to
    /// `self` followed by `next`.
    fn merged_with(&self, _next: &dyn Mapping) -> Option<MapRef> {
        None
    }

    /// Stable class name for snapshots and diagnostics.
    fn class_name(&self) -> &'static str;

    /// Downcasting support for leaf-owned merge rules.
    fn as_any(&self) -> &dyn Any;
}

/// Wrap a concrete mapping into a shared [`MapRef`] handle.
pub fn map_ref<M: Mapping + 'static>(mapping: M) -> MapRef {
    Arc::new(mapping)
}

/// Validate a batch against a mapping before applying it.
///
/// Checks that the requested direction is defined and that the batch
/// axis count matches the mapping's expectation for that direction.
pub(crate) fn check_apply(
    mapping: &dyn Mapping,
    batch: &CoordBatch,
    inverse: bool,
) -> CoordResult<()> {
    if inverse && !mapping.inverse_defined() {
        return Err(CoordError::inverse_undefined(format!(
            "{} has no inverse transform",
            mapping.class_name()
        )));
    }
    if !inverse && !mapping.forward_defined() {
        return Err(CoordError::inverse_undefined(format!(
            "{} has no forward transform",
            mapping.class_name()
        )));
    }
    let expected = if inverse {
        mapping.n_out()
    } else {
        mapping.n_in()
    };
    if batch.n_axes() != expected {
        return Err(CoordError::dimension_mismatch(format!(
            "{} expects {expected} axes, batch has {}",
            mapping.class_name(),
            batch.n_axes()
        )));
    }
    Ok(())
}

/// Fluent combinators over shared mapping handles.
pub trait MappingExt {
    /// Series composition: `self` applied first, then `next`.
    fn then(&self, next: &MapRef) -> CoordResult<MapRef>;

    /// Parallel composition: `self` on the leading axes, `next` on the
    /// trailing axes.
    fn under(&self, next: &MapRef) -> CoordResult<MapRef>;

    /// Direction-swapped view sharing the underlying mapping.
    fn inverted(&self) -> MapRef;

    /// Behaviorally equivalent mapping with minimal structure.
    fn simplified(&self) -> MapRef;
}

impl MappingExt for MapRef {
    fn then(&self, next: &MapRef) -> CoordResult<MapRef> {
        Ok(map_ref(CompoundMap::series(self, next)?))
    }

    fn under(&self, next: &MapRef) -> CoordResult<MapRef> {
        Ok(map_ref(CompoundMap::parallel(self, next)?))
    }

    fn inverted(&self) -> MapRef {
        // Inverting an inverted view hands back the shared original.
        if let Some(inv) = self.as_any().downcast_ref::<InvertedMap>() {
            return Arc::clone(inv.inner());
        }
        map_ref(InvertedMap::new(Arc::clone(self)))
    }

    fn simplified(&self) -> MapRef {
        crate::simplify::simplifier::simplify(self)
    }
}

#[derive(Debug)]
/// Direction-swapping view over a shared mapping.
///
/// The view's forward direction is the wrapped mapping's inverse and
/// vice versa; definedness flags swap the same way. The wrapped mapping
/// is shared, not copied.
pub struct InvertedMap {
    inner: MapRef,
}

impl InvertedMap {
    /// Wrap a shared mapping in an inverted view.
    pub fn new(inner: MapRef) -> Self {
        Self { inner }
    }

    /// The wrapped mapping.
    pub fn inner(&self) -> &MapRef {
        &self.inner
    }
}

impl Mapping for InvertedMap {
    fn n_in(&self) -> usize {
        self.inner.n_out()
    }

    fn n_out(&self) -> usize {
        self.inner.n_in()
    }

    fn forward_defined(&self) -> bool {
        self.inner.inverse_defined()
    }

    fn inverse_defined(&self) -> bool {
        self.inner.forward_defined()
    }

    fn apply_forward(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, false)?;
        self.inner.apply_inverse(batch)
    }

    fn apply_inverse(&self, batch: &CoordBatch) -> CoordResult<CoordBatch> {
        check_apply(self, batch, true)?;
        self.inner.apply_forward(batch)
    }

    fn deep_copy(&self) -> MapRef {
        map_ref(Self {
            inner: self.inner.deep_copy(),
        })
    }

    fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    fn simplify_step(&self) -> Option<MapRef> {
        // Double inversion unwraps to the innermost shared mapping.
        self.inner
            .as_any()
            .downcast_ref::<InvertedMap>()
            .map(|nested| Arc::clone(nested.inner()))
    }

    fn class_name(&self) -> &'static str {
        "InvertedMap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/map.rs"]
mod tests;
