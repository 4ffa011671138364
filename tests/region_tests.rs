//! Region integration tests
//!
//! Containment and bounds contracts across the kinds, plus the boolean
//! combinators against their pointwise definitions.

use ferro_wcs::frame::Frame;
use ferro_wcs::mapping::Mapping;
use ferro_wcs::region::{Region, RegionOper};
use ferro_wcs::{Object, WcsError};

#[test]
fn box_contains_iff_every_axis_is_within_bounds() {
    let r = Region::new_box(Frame::new(2), vec![0.0, 10.0], vec![2.0, 20.0]).unwrap();
    let cases = [
        ([1.0, 15.0], true),
        ([0.0, 10.0], true),  // lower corner, inclusive
        ([2.0, 20.0], true),  // upper corner, inclusive
        ([1.0, 9.9], false),  // one axis out is enough
        ([2.1, 15.0], false),
        ([-1.0, 25.0], false),
    ];
    for (p, expect) in cases {
        assert_eq!(r.contains(&p).unwrap(), expect, "point {p:?}");
    }
}

#[test]
fn intersection_matches_pointwise_and() {
    let r1 = Region::new_circle(Frame::new(2), vec![0.0, 0.0], 2.0).unwrap();
    let r2 = Region::new_box(Frame::new(2), vec![0.0, -3.0], vec![3.0, 3.0]).unwrap();
    let both = Region::combine(RegionOper::Intersection, r1.clone(), r2.clone()).unwrap();

    let probes = [
        [0.0, 0.0],
        [1.0, 1.0],
        [-1.0, 0.0],
        [2.5, 0.0],
        [0.5, 2.5],
        [10.0, 10.0],
    ];
    for p in probes {
        let expect = r1.contains(&p).unwrap() && r2.contains(&p).unwrap();
        assert_eq!(both.contains(&p).unwrap(), expect, "point {p:?}");
    }
}

#[test]
fn union_and_difference_match_pointwise_definitions() {
    let a = Region::new_box(Frame::new(1), vec![0.0], vec![2.0]).unwrap();
    let b = Region::new_box(Frame::new(1), vec![1.0], vec![3.0]).unwrap();
    let union = Region::combine(RegionOper::Union, a.clone(), b.clone()).unwrap();
    let diff = Region::combine(RegionOper::Difference, a.clone(), b.clone()).unwrap();

    for x in [-1.0, 0.5, 1.5, 2.5, 3.5] {
        let in_a = a.contains(&[x]).unwrap();
        let in_b = b.contains(&[x]).unwrap();
        assert_eq!(union.contains(&[x]).unwrap(), in_a || in_b, "x = {x}");
        assert_eq!(diff.contains(&[x]).unwrap(), in_a && !in_b, "x = {x}");
    }
}

#[test]
fn negation_complements_containment() {
    let mut r = Region::new_circle(Frame::new(2), vec![0.0, 0.0], 1.0).unwrap();
    let inside = [0.5, 0.0];
    let outside = [2.0, 0.0];
    assert!(r.contains(&inside).unwrap());
    assert!(!r.contains(&outside).unwrap());

    r.negate();
    assert!(!r.contains(&inside).unwrap());
    assert!(r.contains(&outside).unwrap());

    r.negate();
    assert!(r.contains(&inside).unwrap());
}

#[test]
fn unbounded_signal_names_the_open_axis() {
    let r = Region::new_interval(
        Frame::new(3),
        vec![Some(0.0), Some(0.0), Some(0.0)],
        vec![Some(1.0), None, Some(1.0)],
    )
    .unwrap();
    match r.bounds() {
        Err(WcsError::Unbounded { axis }) => assert_eq!(axis, 2),
        other => panic!("expected Unbounded, got {other:?}"),
    }
}

#[test]
fn bounds_track_the_encoding_mapping() {
    let mut r = Region::new_circle(Frame::new(2), vec![0.0, 0.0], 1.0).unwrap();
    r.remap(&Mapping::series(&Mapping::zoom(2, 2.0), &Mapping::shift(vec![10.0, 20.0])).unwrap())
        .unwrap();
    let bounds = r.bounds().unwrap();
    assert_eq!(bounds, vec![(8.0, 12.0), (18.0, 22.0)]);

    // containment agrees with the transformed geometry
    assert!(r.contains(&[10.0, 20.0]).unwrap());
    assert!(r.contains(&[11.9, 20.0]).unwrap());
    assert!(!r.contains(&[12.5, 20.0]).unwrap());
}

#[test]
fn polygon_and_ellipse_agree_with_circle_limits() {
    // A square polygon and a circle inscribed in it
    let square = Region::new_polygon(
        Frame::new(2),
        vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
    )
    .unwrap();
    let circle = Region::new_circle(Frame::new(2), vec![0.0, 0.0], 1.0).unwrap();

    // Inside the circle implies inside the square
    for p in [[0.0, 0.0], [0.7, 0.0], [0.0, -0.9], [0.5, 0.5]] {
        if circle.contains(&p).unwrap() {
            assert!(square.contains(&p).unwrap(), "point {p:?}");
        }
    }
    // Corner of the square is outside the circle
    assert!(square.contains(&[0.99, 0.99]).unwrap());
    assert!(!circle.contains(&[0.99, 0.99]).unwrap());
}

#[test]
fn compound_regions_nest_arbitrarily() {
    let ring = Region::combine(
        RegionOper::Difference,
        Region::new_circle(Frame::new(2), vec![0.0, 0.0], 2.0).unwrap(),
        Region::new_circle(Frame::new(2), vec![0.0, 0.0], 1.0).unwrap(),
    )
    .unwrap();
    let with_hole_filled = Region::combine(
        RegionOper::Union,
        ring.clone(),
        Region::new_circle(Frame::new(2), vec![0.0, 0.0], 0.5).unwrap(),
    )
    .unwrap();

    assert!(!ring.contains(&[0.0, 0.0]).unwrap());
    assert!(ring.contains(&[1.5, 0.0]).unwrap());
    assert!(with_hole_filled.contains(&[0.0, 0.0]).unwrap());
    assert!(!with_hole_filled.contains(&[0.75, 0.0]).unwrap());
}

#[test]
fn region_attribute_surface() {
    let mut r = Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
    r.set_attr("Label(1)", "RA").unwrap();
    r.set_attr("Negated", "1").unwrap();

    assert_eq!(r.get_attr("Class").unwrap().as_str(), Some("Box"));
    assert_eq!(r.get_attr("Label(1)").unwrap().as_str(), Some("RA"));
    assert!(r.is_negated());

    let err = r.get_attr("Radius").unwrap_err();
    assert!(matches!(err, WcsError::UnknownAttribute { .. }));
}
