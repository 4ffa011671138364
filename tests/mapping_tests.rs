//! Mapping algebra integration tests
//!
//! Covers the transform contracts: forward/inverse round trips for every
//! invertible kind, associativity of series composition, bad-value
//! propagation and dimension checking.

use ferro_wcs::mapping::{Mapping, PointSet, PolyTerm, ProjKind, BAD};
use ferro_wcs::WcsError;

/// Every invertible kind with a few representative in-domain points
fn invertible_cases() -> Vec<(Mapping, Vec<Vec<f64>>)> {
    vec![
        (Mapping::unit(2), vec![vec![1.0, 2.0], vec![-5.0, 0.0]]),
        (
            Mapping::shift(vec![3.0, -1.0]),
            vec![vec![0.0, 0.0], vec![10.5, 2.5]],
        ),
        (Mapping::zoom(2, 2.5), vec![vec![1.0, -4.0], vec![0.0, 7.0]]),
        (
            Mapping::affine(2, 2, vec![2.0, 1.0, 0.5, 3.0], vec![1.0, -1.0]).unwrap(),
            vec![vec![1.0, 1.0], vec![-2.0, 4.0]],
        ),
        (
            Mapping::perm(vec![1, 0]).unwrap(),
            vec![vec![1.0, 2.0], vec![9.0, -9.0]],
        ),
        (
            Mapping::projection(ProjKind::Gnomonic),
            vec![vec![0.2, 0.9], vec![-0.5, 1.2]],
        ),
        (
            Mapping::lut(vec![0.0, 1.0, 3.0, 7.0], 0.0, 1.0).unwrap(),
            vec![vec![0.5], vec![2.25]],
        ),
        (
            Mapping::series(&Mapping::zoom(2, 3.0), &Mapping::shift(vec![1.0, 1.0])).unwrap(),
            vec![vec![2.0, -2.0]],
        ),
        (
            Mapping::parallel(&Mapping::zoom(1, 2.0), &Mapping::shift(vec![5.0])),
            vec![vec![3.0, 3.0]],
        ),
    ]
}

#[test]
fn forward_then_inverse_recovers_the_point() {
    for (mapping, points) in invertible_cases() {
        assert!(mapping.has_inverse(), "{} lost its inverse", mapping.kind_class());
        for p in points {
            let fwd = mapping.transform_point(&p, true).unwrap();
            let back = mapping.transform_point(&fwd, false).unwrap();
            for (a, b) in p.iter().zip(&back) {
                assert!(
                    (a - b).abs() < 1e-10,
                    "{}: {:?} -> {:?} -> {:?}",
                    mapping.kind_class(),
                    p,
                    fwd,
                    back
                );
            }
        }
    }
}

#[test]
fn inverted_mapping_swaps_directions() {
    for (mapping, points) in invertible_cases() {
        let inverted = mapping.invert();
        for p in points {
            let via_inverse = mapping.transform_point(&p, false);
            let via_inverted = inverted.transform_point(&p, true);
            match (via_inverse, via_inverted) {
                (Ok(a), Ok(b)) => assert_eq!(a, b, "{}", mapping.kind_class()),
                (a, b) => panic!("direction mismatch: {a:?} vs {b:?}"),
            }
        }
    }
}

#[test]
fn series_composition_is_associative() {
    let a = Mapping::shift(vec![1.0, -1.0]);
    let b = Mapping::affine(2, 2, vec![0.0, 1.0, 1.0, 0.0], vec![2.0, 0.0]).unwrap();
    let c = Mapping::zoom(2, 0.5);

    let left = Mapping::series(&Mapping::series(&a, &b).unwrap(), &c).unwrap();
    let right = Mapping::series(&a, &Mapping::series(&b, &c).unwrap()).unwrap();

    for p in [[0.0, 0.0], [1.0, 2.0], [-3.5, 7.25], [100.0, -100.0]] {
        assert_eq!(
            left.transform_point(&p, true).unwrap(),
            right.transform_point(&p, true).unwrap(),
            "associativity broke at {p:?}"
        );
    }
}

#[test]
fn series_requires_matching_dimensions() {
    let two_to_one = Mapping::affine(2, 1, vec![1.0, 1.0], vec![0.0]).unwrap();
    let err = Mapping::series(&two_to_one, &Mapping::unit(2)).unwrap_err();
    assert!(matches!(
        err,
        WcsError::DimensionMismatch {
            expected: 1,
            found: 2,
            ..
        }
    ));

    // and the other way round is fine
    assert!(Mapping::series(&Mapping::unit(2), &two_to_one).is_ok());
}

#[test]
fn bad_values_pass_through_every_kind() {
    let kinds = vec![
        Mapping::zoom(2, 2.0),
        Mapping::projection(ProjKind::Gnomonic),
        Mapping::series(&Mapping::zoom(2, 2.0), &Mapping::projection(ProjKind::Gnomonic))
            .unwrap(),
        Mapping::polynomial(
            2,
            2,
            vec![
                vec![PolyTerm::new(1.0, vec![2, 0])],
                vec![PolyTerm::new(1.0, vec![0, 2])],
            ],
            None,
        )
        .unwrap(),
    ];
    for mapping in kinds {
        let out = mapping.transform_point(&[BAD, 0.5], true).unwrap();
        assert!(
            out.iter().all(|v| *v == BAD),
            "{} leaked a bad value: {out:?}",
            mapping.kind_class()
        );
    }
}

#[test]
fn bad_values_survive_batch_transforms() {
    let zoom = Mapping::zoom(1, 10.0);
    let points = PointSet::from_axes(&[vec![1.0, BAD, 3.0]]).unwrap();
    let out = zoom.transform(&points, true).unwrap();
    assert_eq!(out.axis(0), &[10.0, BAD, 30.0]);
}

#[test]
fn rectangular_affine_has_forward_only() {
    let project = Mapping::affine(3, 2, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0.0, 0.0])
        .unwrap();
    assert!(project.has_forward());
    assert!(!project.has_inverse());
    assert_eq!(
        project.transform_point(&[1.0, 2.0, 3.0], true).unwrap(),
        vec![1.0, 2.0]
    );
    assert!(matches!(
        project.transform_point(&[1.0, 2.0], false),
        Err(WcsError::NoInverse { .. })
    ));
}

#[test]
fn linearity_and_diagonality_flags() {
    assert!(Mapping::unit(3).is_linear());
    assert!(Mapping::unit(3).is_diagonal());
    assert!(Mapping::shift(vec![1.0]).is_linear());
    assert!(Mapping::zoom(2, 2.0).is_diagonal());
    assert!(!Mapping::projection(ProjKind::Gnomonic).is_linear());
    assert!(!Mapping::perm(vec![1, 0]).unwrap().is_diagonal());

    let diagonal_pair = Mapping::parallel(&Mapping::zoom(1, 2.0), &Mapping::shift(vec![1.0]));
    assert!(diagonal_pair.is_linear());
    assert!(diagonal_pair.is_diagonal());

    let with_proj = Mapping::series(
        &Mapping::projection(ProjKind::Gnomonic),
        &Mapping::zoom(2, 2.0),
    )
    .unwrap();
    assert!(!with_proj.is_linear());
}

#[test]
fn zoom_by_zero_loses_inverse_only() {
    let squash = Mapping::zoom(2, 0.0);
    assert!(squash.has_forward());
    assert!(!squash.has_inverse());
    assert_eq!(
        squash.transform_point(&[5.0, -5.0], true).unwrap(),
        vec![0.0, 0.0]
    );
}
