use super::*;

use crate::foundation::coords::CoordBatch;
use crate::mapping::affine::{MatrixMap, ShiftMap, ZoomMap};
use crate::mapping::perm::PermMap;

fn assert_batches_close(a: &CoordBatch, b: &CoordBatch) {
    assert_eq!(a.n_axes(), b.n_axes());
    assert_eq!(a.n_samples(), b.n_samples());
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert!((x - y).abs() < 1e-12, "{x} != {y}");
    }
}

fn sample2() -> CoordBatch {
    CoordBatch::from_rows(&[vec![1.0, 2.0, -6.0, 30.0, 0.2], vec![3.0, 99.9, -5.1, 21.0, 0.0]])
        .unwrap()
}

#[test]
fn series_of_mergeable_leaves_collapses() {
    let shift = map_ref(ShiftMap::new(vec![-0.5, 1.2]).unwrap());
    let zoom = map_ref(ZoomMap::new(2, 1.3).unwrap());
    let series = shift.then(&zoom).unwrap();

    let reduced = simplify(&series);
    assert_ne!(reduced.class_name(), "CompoundMap");

    let batch = sample2();
    assert_batches_close(
        &reduced.apply_forward(&batch).unwrap(),
        &series.apply_forward(&batch).unwrap(),
    );
}

#[test]
fn identity_elements_are_elided() {
    let zoom = map_ref(ZoomMap::new(2, 1.3).unwrap());
    let unit = map_ref(UnitMap::new(2).unwrap());
    let chain = zoom.then(&unit).unwrap().then(&unit).unwrap();
    let reduced = simplify(&chain);
    assert_eq!(reduced.class_name(), "ZoomMap");
}

#[test]
fn all_identity_series_becomes_unit() {
    let unit = map_ref(UnitMap::new(3).unwrap());
    let chain = unit.then(&unit).unwrap();
    let reduced = simplify(&chain);
    assert_eq!(reduced.class_name(), "UnitMap");
    assert_eq!(reduced.n_in(), 3);
}

#[test]
fn parallel_of_identities_becomes_unit() {
    let a = map_ref(UnitMap::new(2).unwrap());
    let b = map_ref(PermMap::axis_swap(&[1, 2, 3]).unwrap());
    let parallel = a.under(&b).unwrap();
    let reduced = simplify(&parallel);
    assert_eq!(reduced.class_name(), "UnitMap");
    assert_eq!(reduced.n_in(), 5);
}

#[test]
fn parallel_children_simplify_recursively() {
    let shift = map_ref(ShiftMap::new(vec![1.0]).unwrap());
    let zoom = map_ref(ZoomMap::new(1, 2.0).unwrap());
    let left = shift.then(&zoom).unwrap();
    let right = map_ref(ZoomMap::new(2, 1.5).unwrap());
    let parallel = left.under(&right).unwrap();

    let reduced = simplify(&parallel);
    let batch = CoordBatch::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
    assert_batches_close(
        &reduced.apply_forward(&batch).unwrap(),
        &parallel.apply_forward(&batch).unwrap(),
    );
}

#[test]
fn simplify_is_idempotent() {
    let shift = map_ref(ShiftMap::new(vec![-0.5, 1.2]).unwrap());
    let zoom = map_ref(ZoomMap::new(2, 1.3).unwrap());
    let perm = map_ref(PermMap::axis_swap(&[2, 1]).unwrap());
    let chain = shift.then(&zoom).unwrap().then(&perm).unwrap();

    let once = simplify(&chain);
    let twice = simplify(&once);
    let batch = sample2();
    assert_batches_close(
        &once.apply_forward(&batch).unwrap(),
        &twice.apply_forward(&batch).unwrap(),
    );
    assert_batches_close(
        &once.apply_forward(&batch).unwrap(),
        &chain.apply_forward(&batch).unwrap(),
    );
}

#[test]
fn unmergeable_chain_is_left_alone() {
    let perm = map_ref(PermMap::new(vec![1, 2, -1], vec![1, 2], vec![0.5]).unwrap());
    let shift = map_ref(ShiftMap::new(vec![1.0, 2.0]).unwrap());
    let chain = perm.then(&shift).unwrap();
    let reduced = simplify(&chain);
    // Nothing to merge or drop, so the original handle comes back.
    assert!(std::sync::Arc::ptr_eq(&reduced, &chain));
}

#[test]
fn non_invertible_component_keeps_inverse_undefined() {
    let narrow = map_ref(MatrixMap::new(&[vec![1.0, 2.0]]).unwrap());
    let shift = map_ref(ShiftMap::new(vec![3.0]).unwrap());
    let series = narrow.then(&shift).unwrap();
    assert!(!series.inverse_defined());

    let reduced = simplify(&series);
    assert!(!reduced.inverse_defined());
    let batch = CoordBatch::from_rows(&[vec![1.0]]).unwrap();
    assert!(matches!(
        reduced.apply_inverse(&batch),
        Err(crate::foundation::error::CoordError::InverseUndefined(_))
    ));
}

#[test]
fn inverted_wrapper_unwraps_and_simplifies() {
    let zoom = map_ref(ZoomMap::new(2, 2.0).unwrap());
    let wrapped = map_ref(InvertedMap::new(map_ref(InvertedMap::new(
        std::sync::Arc::clone(&zoom),
    ))));
    let reduced = simplify(&wrapped);
    assert!(std::sync::Arc::ptr_eq(&reduced, &zoom));
}

#[test]
fn inverted_identity_collapses() {
    let unit = map_ref(UnitMap::new(2).unwrap());
    let wrapped = unit.inverted();
    let reduced = simplify(&wrapped);
    assert!(reduced.is_identity());
}

#[test]
fn nested_series_flattens_across_grouping() {
    // ((shift . zoom) . zoom2) and (shift . (zoom . zoom2)) reduce to
    // behaviorally equal leaves regardless of grouping.
    let shift = map_ref(ShiftMap::new(vec![1.0, -1.0]).unwrap());
    let zoom_a = map_ref(ZoomMap::new(2, 2.0).unwrap());
    let zoom_b = map_ref(ZoomMap::new(2, 0.5).unwrap());

    let left = shift.then(&zoom_a).unwrap().then(&zoom_b).unwrap();
    let right = shift.then(&zoom_a.then(&zoom_b).unwrap()).unwrap();

    let batch = sample2();
    assert_batches_close(
        &simplify(&left).apply_forward(&batch).unwrap(),
        &simplify(&right).apply_forward(&batch).unwrap(),
    );
    // zoom_a . zoom_b cancels, so the whole chain is just the shift.
    assert_eq!(simplify(&left).class_name(), "ShiftMap");
}
