use super::*;

#[test]
fn cumulative_and_total() {
    let m = SegmentModel::from_durations(&[0.0, 100.0, 50.0, 0.0]);
    assert_eq!(m.cumulative(), &[0.0, 100.0, 150.0, 150.0]);
    assert_eq!(m.total_ms(), 150.0);
    assert_eq!(m.segment_start_ms(0), 0.0);
    assert_eq!(m.segment_start_ms(2), 100.0);
    assert_eq!(m.len(), 4);
}

#[test]
fn negative_and_nan_durations_become_zero() {
    let m = SegmentModel::from_durations(&[10.0, -5.0, f64::NAN, 10.0]);
    assert_eq!(m.cumulative(), &[10.0, 10.0, 10.0, 20.0]);
}

#[test]
fn lookup_skips_zero_duration_anchors() {
    let m = SegmentModel::from_durations(&[0.0, 100.0, 0.0, 0.0, 50.0]);
    assert_eq!(m.time_to_segment_index(0.0), Some(1));
    assert_eq!(m.time_to_segment_index(99.9), Some(1));
    assert_eq!(m.time_to_segment_index(100.0), Some(4));
    assert_eq!(m.time_to_segment_index(149.0), Some(4));
    assert_eq!(m.time_to_segment_index(150.0), None);
    assert_eq!(m.time_to_segment_index(-3.0), Some(1));
    assert_eq!(m.time_to_segment_index(f64::NAN), None);
}

#[test]
fn lookup_brackets_every_time() {
    let m = SegmentModel::from_durations(&[0.0, 30.0, 0.0, 45.0, 10.0, 0.0, 25.0]);
    let c = m.cumulative();
    let mut ms = 0.0;
    while ms < m.total_ms() {
        let i = m.time_to_segment_index(ms).unwrap();
        let lo = if i == 0 { 0.0 } else { c[i - 1] };
        assert!(lo <= ms && ms < c[i], "ms={ms} i={i}");
        assert!(m.segment(i).unwrap().duration_ms > 0.0);
        ms += 2.5;
    }
}

#[test]
fn empty_model_has_no_segments() {
    let m = SegmentModel::default();
    assert!(m.is_empty());
    assert_eq!(m.total_ms(), 0.0);
    assert_eq!(m.time_to_segment_index(0.0), None);
}

#[test]
fn per_frame_layout_uses_kinds() {
    let r = TransitionResolver::new(&["T0", "I0-1", "C_0", "I0-2", "T1"]);
    let m = SegmentModel::build(
        &r,
        &SegmentLayout::PerFrame {
            intermediate_ms: 100.0,
            consensus_ms: 40.0,
        },
    );
    assert_eq!(m.cumulative(), &[0.0, 100.0, 140.0, 240.0, 240.0]);
    assert_eq!(m.time_of_frame(2), Some(140.0));
    assert_eq!(m.time_of_frame(4), Some(240.0));
    assert_eq!(m.time_of_frame(9), None);
}

#[test]
fn per_transition_layout_groups_frames() {
    let r = TransitionResolver::new(&["T0", "I0-1", "I0-2", "T1", "I1-1", "T2"]);
    let m = SegmentModel::build(&r, &SegmentLayout::PerTransition { transition_ms: 300.0 });
    assert_eq!(m.len(), 2);
    assert_eq!(
        m.segment(0).unwrap().body,
        SegmentBody::Grouped {
            interpolation_data: vec![0, 1, 2, 3]
        }
    );
    assert_eq!(m.segment(1).unwrap().instant_frame(), Some(3));
    assert!(m.segment(1).unwrap().contains_frame(5));
    assert_eq!(m.total_ms(), 600.0);
    assert_eq!(m.time_of_frame(0), Some(0.0));
    assert_eq!(m.time_of_frame(2), Some(200.0));
    assert_eq!(m.time_of_frame(5), Some(600.0));
}

#[test]
fn per_transition_layout_covers_unanchored_edges() {
    let r = TransitionResolver::new(&["I0-1", "T0", "I0-2", "T1", "I1-1"]);
    let m = SegmentModel::build(&r, &SegmentLayout::PerTransition { transition_ms: 10.0 });
    let groups: Vec<Option<usize>> = (0..m.len())
        .map(|i| m.segment(i).and_then(Segment::instant_frame))
        .collect();
    assert_eq!(groups, vec![Some(0), Some(1), Some(3)]);
}

#[test]
fn layout_deserializes_by_mode() {
    let l: SegmentLayout =
        serde_json::from_str(r#"{"mode": "per_transition", "transition_ms": 800}"#).unwrap();
    assert_eq!(l, SegmentLayout::PerTransition { transition_ms: 800.0 });
    assert_eq!(
        SegmentLayout::default(),
        SegmentLayout::PerFrame {
            intermediate_ms: 120.0,
            consensus_ms: 120.0
        }
    );
}
