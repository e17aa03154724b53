use super::*;

use crate::mapping::affine::{MatrixMap, ShiftMap, ZoomMap};

fn shift2() -> MapRef {
    map_ref(ShiftMap::new(vec![-0.5, 1.2]).unwrap())
}

fn zoom2() -> MapRef {
    map_ref(ZoomMap::new(2, 1.3).unwrap())
}

#[test]
fn series_dimensions_and_flags() {
    let series = CompoundMap::series(&shift2(), &zoom2()).unwrap();
    assert_eq!(series.n_in(), 2);
    assert_eq!(series.n_out(), 2);
    assert_eq!(series.mode(), CompoundMode::Series);
    assert!(series.forward_defined());
    assert!(series.inverse_defined());
}

#[test]
fn series_rejects_mismatched_interface() {
    let narrow = map_ref(MatrixMap::new(&[vec![1.0, 2.0]]).unwrap());
    let err = CompoundMap::series(&shift2(), &narrow).unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::CoordError::DimensionMismatch(_)
    ));
}

#[test]
fn series_applies_first_then_second() {
    let series = CompoundMap::series(&shift2(), &zoom2()).unwrap();
    let batch = CoordBatch::from_rows(&[vec![1.0], vec![3.0]]).unwrap();
    let out = series.apply_forward(&batch).unwrap();
    assert_eq!(out.get(0, 0), (1.0 - 0.5) * 1.3);
    assert_eq!(out.get(1, 0), (3.0 + 1.2) * 1.3);
}

#[test]
fn series_inverse_reverses_order() {
    let series = CompoundMap::series(&shift2(), &zoom2()).unwrap();
    let batch = CoordBatch::from_rows(&[vec![0.65], vec![5.46]]).unwrap();
    let back = series.apply_inverse(&batch).unwrap();
    assert!((back.get(0, 0) - 1.0).abs() < 1e-12);
    assert!((back.get(1, 0) - 3.0).abs() < 1e-12);
}

#[test]
fn parallel_concatenates_axis_ranges() {
    let parallel = CompoundMap::parallel(&shift2(), &zoom2()).unwrap();
    assert_eq!(parallel.n_in(), 4);
    assert_eq!(parallel.n_out(), 4);
    let batch = CoordBatch::from_rows(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
    let out = parallel.apply_forward(&batch).unwrap();
    for (axis, expected) in [0.5, 3.2, 3.9, 5.2].into_iter().enumerate() {
        assert!((out.get(axis, 0) - expected).abs() < 1e-12);
    }
}

#[test]
fn parallel_inverse_splits_on_output_boundary() {
    let narrow = map_ref(MatrixMap::new(&[vec![1.0, 1.0]]).unwrap());
    let parallel = CompoundMap::parallel(&narrow, &zoom2()).unwrap();
    // 2+2 in, 1+2 out; the inverse splits at the first child's n_out.
    assert_eq!(parallel.n_in(), 4);
    assert_eq!(parallel.n_out(), 3);
    assert!(!parallel.inverse_defined());
}

#[test]
fn inverse_undefined_child_poisons_compound() {
    let narrow = map_ref(MatrixMap::new(&[vec![1.0, 2.0]]).unwrap());
    let series = CompoundMap::series(&narrow, &map_ref(ShiftMap::new(vec![3.0]).unwrap())).unwrap();
    assert!(!series.inverse_defined());
    let batch = CoordBatch::from_rows(&[vec![1.0]]).unwrap();
    let err = series.apply_inverse(&batch).unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::CoordError::InverseUndefined(_)
    ));
}

#[test]
fn deep_copy_is_structurally_independent() {
    let shift = shift2();
    let series = map_ref(CompoundMap::series(&shift, &zoom2()).unwrap());
    let copy = series.deep_copy();
    // The copy holds fresh operands, so dropping it leaves the shared
    // operand's count where composition put it.
    let before = std::sync::Arc::strong_count(&shift);
    drop(copy);
    assert_eq!(std::sync::Arc::strong_count(&shift), before);
}

#[test]
fn compose_mode_dispatches() {
    let series = CompoundMap::compose(&shift2(), &zoom2(), CompoundMode::Series).unwrap();
    assert_eq!(series.n_in(), 2);
    let parallel = CompoundMap::compose(&shift2(), &zoom2(), CompoundMode::Parallel).unwrap();
    assert_eq!(parallel.n_in(), 4);
}
