use super::*;

#[test]
fn leaf_set_dedups_and_sorts() {
    let s = leaf_set([3, 1, 3, 2]);
    assert_eq!(s.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn clamp_index_reports_clamping() {
    assert_eq!(clamp_index(2, 4), (2, false));
    assert_eq!(clamp_index(-1, 4), (0, true));
    assert_eq!(clamp_index(9, 4), (3, true));
    assert_eq!(clamp_index(0, 0), (0, false));
    assert_eq!(clamp_index(5, 0), (0, true));
}

#[test]
fn clamp_ms_handles_non_finite() {
    assert_eq!(clamp_ms(50.0, 100.0), (50.0, false));
    assert_eq!(clamp_ms(-1.0, 100.0), (0.0, true));
    assert_eq!(clamp_ms(150.0, 100.0), (100.0, true));
    assert_eq!(clamp_ms(f64::NAN, 100.0), (0.0, true));
    assert_eq!(clamp_ms(f64::INFINITY, 100.0), (0.0, true));
}
