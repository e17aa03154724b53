use super::*;

#[test]
fn passes_batches_through_unchanged() {
    let unit = UnitMap::new(2).unwrap();
    let batch = CoordBatch::from_rows(&[vec![1.0, -2.0], vec![0.5, 99.0]]).unwrap();
    assert_eq!(unit.apply_forward(&batch).unwrap(), batch);
    assert_eq!(unit.apply_inverse(&batch).unwrap(), batch);
}

#[test]
fn reports_identity() {
    let unit = UnitMap::new(3).unwrap();
    assert!(unit.is_identity());
    assert_eq!(unit.n_in(), 3);
    assert_eq!(unit.n_out(), 3);
    assert!(unit.inverse_defined());
}

#[test]
fn rejects_zero_axes() {
    assert!(UnitMap::new(0).is_err());
}

#[test]
fn rejects_wrong_axis_count() {
    let unit = UnitMap::new(2).unwrap();
    let batch = CoordBatch::from_rows(&[vec![1.0]]).unwrap();
    assert!(unit.apply_forward(&batch).is_err());
}
