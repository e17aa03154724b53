//! Behavior-preserving reduction of compound mapping trees.

use std::sync::Arc;

use crate::mapping::compound::{CompoundMap, CompoundMode};
use crate::mapping::map::{InvertedMap, MapRef, MappingExt, map_ref};
use crate::mapping::unit::UnitMap;

/// Produce a behaviorally equivalent mapping with minimal structure.
///
/// The rewrite is conservative: it never changes `n_in`/`n_out` and never
/// changes forward or inverse results for valid inputs beyond floating
/// point tolerance. It is idempotent, and it never attempts to invert a
/// component that declares itself non-invertible.
///
/// Strategy, applied bottom-up:
/// 1. Flatten series chains and simplify every element in place.
/// 2. Drop identity elements and fold adjacent pairs through the
///    leaf-owned merge hook until a pass makes no change.
/// 3. Collapse parallels of identities and unwrap double inversion.
#[tracing::instrument(skip(mapping), fields(class = mapping.class_name()))]
pub fn simplify(mapping: &MapRef) -> MapRef {
    simplify_ref(mapping)
}

fn simplify_ref(mapping: &MapRef) -> MapRef {
    if let Some(inverted) = mapping.as_any().downcast_ref::<InvertedMap>() {
        return simplify_inverted(mapping, inverted);
    }
    if let Some(compound) = mapping.as_any().downcast_ref::<CompoundMap>() {
        return match compound.mode() {
            CompoundMode::Series => simplify_series(mapping),
            CompoundMode::Parallel => simplify_parallel(mapping, compound),
        };
    }
    mapping
        .simplify_step()
        .unwrap_or_else(|| Arc::clone(mapping))
}

fn simplify_inverted(original: &MapRef, inverted: &InvertedMap) -> MapRef {
    let inner = simplify_ref(inverted.inner());
    if let Some(nested) = inner.as_any().downcast_ref::<InvertedMap>() {
        return Arc::clone(nested.inner());
    }
    if inner.is_identity() {
        return inner;
    }
    if Arc::ptr_eq(&inner, inverted.inner()) {
        return Arc::clone(original);
    }
    inner.inverted()
}

fn simplify_parallel(original: &MapRef, compound: &CompoundMap) -> MapRef {
    let first = simplify_ref(compound.first());
    let second = simplify_ref(compound.second());
    if first.is_identity() && second.is_identity() {
        if let Ok(unit) = UnitMap::new(first.n_in() + second.n_in()) {
            return map_ref(unit);
        }
    }
    if Arc::ptr_eq(&first, compound.first()) && Arc::ptr_eq(&second, compound.second()) {
        return Arc::clone(original);
    }
    match CompoundMap::parallel(&first, &second) {
        Ok(rebuilt) => map_ref(rebuilt),
        Err(_) => Arc::clone(original),
    }
}

fn simplify_series(original: &MapRef) -> MapRef {
    let mut raw: Vec<MapRef> = Vec::new();
    flatten_series(original, &mut raw);

    let mut any_child_changed = false;
    let mut parts: Vec<MapRef> = Vec::with_capacity(raw.len());
    for part in &raw {
        let simplified = simplify_ref(part);
        if !Arc::ptr_eq(&simplified, part) {
            any_child_changed = true;
        }
        parts.push(simplified);
    }

    let mut merges = 0usize;
    let mut dropped = 0usize;
    let mut changed = true;
    while changed {
        changed = false;

        let before = parts.len();
        parts.retain(|p| !p.is_identity());
        if parts.len() != before {
            dropped += before - parts.len();
            changed = true;
        }

        let mut i = 0;
        while i + 1 < parts.len() {
            if let Some(merged) = parts[i].merged_with(parts[i + 1].as_ref()) {
                let merged = simplify_ref(&merged);
                parts.splice(i..=i + 1, [merged]);
                merges += 1;
                changed = true;
                // The merged element may fold into its predecessor too.
                i = i.saturating_sub(1);
            } else {
                i += 1;
            }
        }
    }

    if merges > 0 || dropped > 0 {
        tracing::debug!(merges, dropped, "series chain reduced");
    }

    if parts.is_empty() {
        // Every element was the identity, so the chain was square.
        return match UnitMap::new(original.n_in()) {
            Ok(unit) => map_ref(unit),
            Err(_) => Arc::clone(original),
        };
    }
    if parts.len() == 1 {
        return parts.remove(0);
    }
    if !any_child_changed && merges == 0 && dropped == 0 && parts.len() == raw.len() {
        return Arc::clone(original);
    }
    series_fold(&parts).unwrap_or_else(|| Arc::clone(original))
}

fn flatten_series(mapping: &MapRef, out: &mut Vec<MapRef>) {
    if let Some(compound) = mapping.as_any().downcast_ref::<CompoundMap>()
        && compound.mode() == CompoundMode::Series
    {
        flatten_series(compound.first(), out);
        flatten_series(compound.second(), out);
        return;
    }
    out.push(Arc::clone(mapping));
}

fn series_fold(parts: &[MapRef]) -> Option<MapRef> {
    let mut iter = parts.iter();
    let mut acc = Arc::clone(iter.next()?);
    for part in iter {
        acc = acc.then(part).ok()?;
    }
    Some(acc)
}

#[cfg(test)]
#[path = "../../tests/unit/simplify/simplifier.rs"]
mod tests;
