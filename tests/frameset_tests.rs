//! FrameSet graph integration tests

use ferro_wcs::frame::{Frame, FrameSet};
use ferro_wcs::mapping::{Mapping, PolyTerm};
use ferro_wcs::{Object, WcsError};

/// F1 (base) --zoom 2--> F2 --shift (1,1)--> F3 (current)
fn chain_set() -> FrameSet {
    let mut fs = FrameSet::new(Frame::new(2));
    fs.add_frame(1, Mapping::zoom(2, 2.0), Frame::new(2)).unwrap();
    fs.add_frame(2, Mapping::shift(vec![1.0, 1.0]), Frame::new(2))
        .unwrap();
    fs
}

#[test]
fn path_equals_series_composition_of_edges() {
    let fs = chain_set();
    let path = fs.find_path(1, 3).unwrap();
    let composed = Mapping::series(&Mapping::zoom(2, 2.0), &Mapping::shift(vec![1.0, 1.0]))
        .unwrap()
        .simplify();

    assert!(path.same_as(&composed));
    for p in [[0.0, 0.0], [3.0, 4.0], [-1.0, 2.0]] {
        let via_path = path.transform_point(&p, true).unwrap();
        let via_chain = composed.transform_point(&p, true).unwrap();
        assert_eq!(via_path, via_chain);
    }
}

#[test]
fn base_to_current_follows_markers() {
    let mut fs = chain_set();
    assert_eq!(
        fs.base_to_current()
            .unwrap()
            .transform_point(&[1.0, 1.0], true)
            .unwrap(),
        vec![3.0, 3.0]
    );

    // Re-point current at the middle frame; the path shortens
    fs.set_current(2).unwrap();
    assert_eq!(
        fs.base_to_current()
            .unwrap()
            .transform_point(&[1.0, 1.0], true)
            .unwrap(),
        vec![2.0, 2.0]
    );
}

#[test]
fn path_search_crosses_edges_backwards() {
    // F3 -> F1 requires traversing both edges against their direction
    let fs = chain_set();
    let back = fs.find_path(3, 1).unwrap();
    assert_eq!(
        back.transform_point(&[3.0, 3.0], true).unwrap(),
        vec![1.0, 1.0]
    );
}

#[test]
fn shortest_chain_wins() {
    // Diamond: F1 -> F2 -> F3 plus a direct F1 -> F3 shortcut; BFS must
    // pick the one-edge chain
    let mut fs = FrameSet::new(Frame::new(1));
    fs.add_frame(1, Mapping::zoom(1, 2.0), Frame::new(1)).unwrap();
    fs.add_frame(2, Mapping::zoom(1, 3.0), Frame::new(1)).unwrap();
    fs.add_edge(1, 3, Mapping::zoom(1, 100.0)).unwrap();

    let path = fs.find_path(1, 3).unwrap();
    assert_eq!(path.transform_point(&[1.0], true).unwrap(), vec![100.0]);
}

#[test]
fn disconnected_frames_report_no_path() {
    let mut fs = FrameSet::new(Frame::new(1));
    let one_way =
        Mapping::polynomial(1, 1, vec![vec![PolyTerm::new(1.0, vec![2])]], None).unwrap();
    fs.add_frame(1, one_way, Frame::new(1)).unwrap();

    assert!(fs.find_path(1, 2).is_ok());
    assert!(matches!(
        fs.find_path(2, 1),
        Err(WcsError::NoPath { from: 2, to: 1 })
    ));
}

#[test]
fn unknown_indices_are_rejected_with_bounds() {
    let fs = chain_set();
    match fs.find_path(1, 42) {
        Err(WcsError::UnknownFrameIndex { index: 42, nframe }) => assert_eq!(nframe, 3),
        other => panic!("expected UnknownFrameIndex, got {other:?}"),
    }
}

#[test]
fn remap_frame_is_transparent_to_through_paths() {
    let mut fs = chain_set();
    let before = fs.find_path(1, 3).unwrap();
    fs.remap_frame(2, Mapping::shift(vec![100.0, -100.0])).unwrap();
    let after = fs.find_path(1, 3).unwrap();
    for p in [[0.0, 0.0], [5.0, 5.0]] {
        assert_eq!(
            before.transform_point(&p, true).unwrap(),
            after.transform_point(&p, true).unwrap()
        );
    }
}

#[test]
fn removing_a_bridge_frame_is_rejected() {
    let mut fs = chain_set();
    let err = fs.remove_frame(2).unwrap_err();
    assert!(matches!(err, WcsError::WouldDisconnect { index: 2 }));
    // and the set is untouched
    assert_eq!(fs.nframe(), 3);
    assert!(fs.find_path(1, 3).is_ok());
}

#[test]
fn frameset_serves_current_frame_attributes() {
    let mut fs = chain_set();
    fs.set_attr("Label(1)", "RA").unwrap();
    fs.set_attr("Label(2)", "Dec").unwrap();

    assert_eq!(fs.get_attr("Label(1)").unwrap().as_str(), Some("RA"));
    assert_eq!(fs.frame(3).unwrap().label(2).unwrap(), "Dec");
    // base frame untouched
    assert_eq!(fs.frame(1).unwrap().label(1).unwrap(), "Axis 1");
}

#[test]
fn growing_sets_preserve_existing_paths() {
    let mut fs = chain_set();
    let before = fs.find_path(1, 3).unwrap();
    fs.add_frame(3, Mapping::zoom(2, 10.0), Frame::new(2)).unwrap();
    let after = fs.find_path(1, 3).unwrap();
    assert!(before.same_as(&after));

    // and the new frame is reachable through the full chain
    let full = fs.find_path(1, 4).unwrap();
    assert_eq!(
        full.transform_point(&[1.0, 1.0], true).unwrap(),
        vec![30.0, 30.0]
    );
}
