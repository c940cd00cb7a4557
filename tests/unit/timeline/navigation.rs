use super::*;

fn tiny() -> TransitionResolver {
    TransitionResolver::new(&["T0", "I0-1", "I0-2", "T1"])
}

fn stops(nav: &Navigator) -> (usize, bool) {
    (nav.current(), nav.first_full())
}

#[test]
fn starts_at_first_frame() {
    let r = tiny();
    let nav = Navigator::new(&r);
    assert_eq!(stops(&nav), (0, true));
    assert_eq!(nav.previous(), None);
    assert!(!nav.is_backward());
}

#[test]
fn forward_dwells_once_on_full_trees() {
    let r = tiny();
    let mut nav = Navigator::new(&r);
    let mut seen = vec![stops(&nav)];
    while nav.forward(&r) {
        seen.push(stops(&nav));
    }
    assert_eq!(
        seen,
        vec![(0, true), (1, false), (2, false), (3, false), (3, true)]
    );
}

#[test]
fn backward_mirrors_forward() {
    let r = tiny();
    let mut nav = Navigator::new(&r);
    while nav.forward(&r) {}
    let mut seen = vec![stops(&nav)];
    while nav.backward(&r) {
        seen.push(stops(&nav));
    }
    assert_eq!(
        seen,
        vec![(3, true), (3, false), (2, false), (1, false), (0, true), (0, false)]
    );
}

#[test]
fn dwell_keeps_previous() {
    let r = tiny();
    let mut nav = Navigator::new(&r);
    nav.go_to_position(2, &r);
    nav.forward(&r);
    assert_eq!(nav.previous(), Some(2));
    nav.forward(&r);
    assert_eq!(stops(&nav), (3, true));
    assert_eq!(nav.previous(), Some(2));
}

#[test]
fn jumps_record_direction() {
    let r = tiny();
    let mut nav = Navigator::new(&r);
    let mut trace = Vec::new();
    for k in [0, 3, 1] {
        nav.go_to_position(k, &r);
        trace.push((nav.previous(), nav.is_backward()));
    }
    assert_eq!(
        trace,
        vec![(None, false), (Some(0), false), (Some(3), true)]
    );
}

#[test]
fn landing_on_full_tree_backward_starts_next_transition() {
    let r = TransitionResolver::new(&["T0", "I0-1", "T1", "I1-1", "T2"]);
    let mut nav = Navigator::new(&r);
    nav.go_to_position(4, &r);
    nav.go_to_position(2, &r);
    assert_eq!(stops(&nav), (2, true));
    nav.go_to_position(4, &r);
    assert_eq!(stops(&nav), (4, false));
}

#[test]
fn go_to_clamps() {
    let r = tiny();
    let mut nav = Navigator::new(&r);
    assert!(nav.go_to_position(10, &r));
    assert_eq!(nav.current(), 3);
    assert!(nav.go_to_position(-4, &r));
    assert_eq!(nav.current(), 0);
    assert!(!nav.go_to_position(1, &r));
}

#[test]
fn round_trip_returns_to_start() {
    let r = TransitionResolver::new(&["T0", "I0-1", "C_0", "I0-2", "T1", "I1-1", "T2"]);
    for k in 0..r.len() as i64 {
        for from in [0, r.len() as i64 - 1] {
            let mut nav = Navigator::new(&r);
            nav.go_to_position(from, &r);
            nav.go_to_position(k, &r);
            let start = nav.position();
            nav.forward(&r);
            nav.backward(&r);
            assert_eq!(nav.position(), start, "k={k} from={from}");
        }
    }
}

#[test]
fn consensus_frames_are_single_stops() {
    let r = TransitionResolver::new(&["T0", "C_0", "T1"]);
    let mut nav = Navigator::new(&r);
    nav.forward(&r);
    assert_eq!(stops(&nav), (1, false));
    nav.forward(&r);
    assert_eq!(stops(&nav), (2, false));
}

#[test]
fn follow_tracks_playhead_stops() {
    let r = tiny();
    let mut nav = Navigator::new(&r);
    nav.follow(Position {
        index: 1,
        first_full: false,
    });
    assert_eq!(nav.previous(), Some(0));
    nav.follow(Position {
        index: 1,
        first_full: false,
    });
    assert_eq!(nav.previous(), Some(0));
    nav.follow(Position {
        index: 0,
        first_full: true,
    });
    assert!(nav.is_backward());
    assert_eq!(stops(&nav), (0, true));
}
