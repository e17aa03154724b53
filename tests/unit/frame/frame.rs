use super::*;

#[test]
fn new_frame_has_numbered_axes() {
    let frame = Frame::new(3).unwrap();
    assert_eq!(frame.n_axes(), 3);
    assert_eq!(frame.axes()[0].label, "axis1");
    assert_eq!(frame.axes()[2].label, "axis3");
    assert!(Frame::new(0).is_err());
}

#[test]
fn ident_and_domain_metadata() {
    let mut frame = Frame::with_ident(2, "detector").unwrap();
    assert_eq!(frame.ident(), "detector");
    frame.set_ident("sky");
    frame.set_domain("SKY");
    assert_eq!(frame.ident(), "sky");
    assert_eq!(frame.domain(), "SKY");
}

#[test]
fn attrs_set_test_clear() {
    let mut frame = Frame::new(2).unwrap();
    assert!(!frame.has_attr("Epoch"));
    frame.set_attr("Epoch", "2000.0");
    assert!(frame.has_attr("Epoch"));
    assert_eq!(frame.attr("Epoch"), Some("2000.0"));
    assert!(frame.clear_attr("Epoch"));
    assert!(!frame.has_attr("Epoch"));
    assert!(!frame.clear_attr("Epoch"));
}

#[test]
fn clone_is_isolated() {
    let mut original = Frame::with_ident(2, "original").unwrap();
    let mut copy = original.clone();
    copy.set_ident("copy");
    copy.set_attr("k", "v");
    assert_eq!(original.ident(), "original");
    assert!(!original.has_attr("k"));
    original.set_ident("changed");
    assert_eq!(copy.ident(), "copy");
}

#[test]
fn permute_axes_reorders_descriptors() {
    let mut frame = Frame::new(2).unwrap();
    frame.axes_mut()[0].label = "x".into();
    frame.axes_mut()[1].label = "y".into();
    frame.permute_axes(&[2, 1]).unwrap();
    assert_eq!(frame.axes()[0].label, "y");
    assert_eq!(frame.axes()[1].label, "x");
    frame.permute_axes(&[2, 1]).unwrap();
    assert_eq!(frame.axes()[0].label, "x");
}

#[test]
fn permute_axes_validates() {
    let mut frame = Frame::new(2).unwrap();
    assert!(frame.permute_axes(&[1]).is_err());
    assert!(frame.permute_axes(&[1, 1]).is_err());
    assert!(frame.permute_axes(&[0, 1]).is_err());
    assert!(frame.permute_axes(&[1, 3]).is_err());
}
