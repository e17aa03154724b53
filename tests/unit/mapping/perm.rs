use super::*;

#[test]
fn axis_swap_routes_rows() {
    let perm = PermMap::axis_swap(&[2, 1]).unwrap();
    let batch = CoordBatch::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let out = perm.apply_forward(&batch).unwrap();
    assert_eq!(out.axis(0), &[3.0, 4.0]);
    assert_eq!(out.axis(1), &[1.0, 2.0]);
    let back = perm.apply_inverse(&out).unwrap();
    assert_eq!(back, batch);
}

#[test]
fn constants_restore_dropped_axes() {
    // Forward keeps the first two of three axes; the inverse restores
    // the dropped axis from the configured constant.
    let perm = PermMap::new(vec![1, 2, -1], vec![1, 2], vec![0.123]).unwrap();
    assert_eq!(perm.n_in(), 3);
    assert_eq!(perm.n_out(), 2);
    assert!(perm.inverse_defined());

    let batch = CoordBatch::from_rows(&[vec![75.1], vec![-53.2], vec![0.123]]).unwrap();
    let out = perm.apply_forward(&batch).unwrap();
    assert_eq!(out.axis(0), &[75.1]);
    assert_eq!(out.axis(1), &[-53.2]);

    let back = perm.apply_inverse(&out).unwrap();
    assert_eq!(back.axis(0), &[75.1]);
    assert_eq!(back.axis(1), &[-53.2]);
    assert_eq!(back.axis(2), &[0.123]);
}

#[test]
fn identity_permutation_is_detected() {
    let perm = PermMap::axis_swap(&[1, 2, 3]).unwrap();
    assert!(perm.is_identity());
    let swapped = PermMap::axis_swap(&[2, 1, 3]).unwrap();
    assert!(!swapped.is_identity());
}

#[test]
fn simplify_step_collapses_identity_to_unit() {
    let perm = PermMap::axis_swap(&[1, 2]).unwrap();
    let step = perm.simplify_step().unwrap();
    assert_eq!(step.class_name(), "UnitMap");
}

#[test]
fn adjacent_swaps_merge_and_cancel() {
    let a = PermMap::axis_swap(&[2, 1]).unwrap();
    let b = PermMap::axis_swap(&[2, 1]).unwrap();
    let merged = a.merged_with(&b).unwrap();
    assert!(merged.is_identity());
}

#[test]
fn merge_composes_routing() {
    // [2,1] then [1,3,2]-style routing over three axes.
    let a = PermMap::axis_swap(&[2, 3, 1]).unwrap();
    let b = PermMap::axis_swap(&[3, 1, 2]).unwrap();
    let merged = a.merged_with(&b).unwrap();
    let batch = CoordBatch::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
    let direct = merged.apply_forward(&batch).unwrap();
    let staged = b
        .apply_forward(&a.apply_forward(&batch).unwrap())
        .unwrap();
    assert_eq!(direct, staged);
}

#[test]
fn constants_block_merging() {
    let a = PermMap::new(vec![1, 2, -1], vec![1, 2], vec![0.5]).unwrap();
    let b = PermMap::axis_swap(&[2, 1]).unwrap();
    assert!(a.merged_with(&b).is_none());
}

#[test]
fn construction_validates_entries() {
    assert!(PermMap::new(vec![0], vec![1], Vec::new()).is_err());
    assert!(PermMap::new(vec![2], vec![1], Vec::new()).is_err());
    assert!(PermMap::new(vec![-1], vec![1], Vec::new()).is_err());
    assert!(PermMap::axis_swap(&[1, 1]).is_err());
    assert!(PermMap::axis_swap(&[]).is_err());
}
