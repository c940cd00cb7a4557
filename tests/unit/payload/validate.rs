use super::*;
use serde_json::json;

fn leaf(name: &str, i: u32) -> serde_json::Value {
    json!({"name": name, "split_indices": [i]})
}

fn frame() -> serde_json::Value {
    json!({"split_indices": [0, 1, 2], "children": [leaf("A", 0), leaf("B", 1), leaf("C", 2)]})
}

/// Two transitions with three intermediates each; everything parallel.
fn base() -> serde_json::Value {
    let names = ["T0", "IT0_down_1", "C_0", "IT0_up_1", "T1", "IT1_down_1", "C_1", "IT1_up_1", "T2"];
    json!({
        "tree_list": names.iter().map(|_| frame()).collect::<Vec<_>>(),
        "tree_names": names,
        "rfd_list": [0.2, 0.4],
        "weighted_rfd_list": [0.1, 0.3],
        "scale_list": names.iter().map(|_| 1.0).collect::<Vec<_>>(),
        "subtree_tracking": names.iter().map(|_| serde_json::Value::Null).collect::<Vec<_>>(),
        "active_change_edge_tracking": names.iter().map(|_| json!([0, 1])).collect::<Vec<_>>(),
        "highlight_data": {"jumping_taxa": [[[0]], [[1]]]},
        "sorted_leaves": ["A", "B", "C"]
    })
}

fn check(value: serde_json::Value) -> ValidationReport {
    let data = MovieData::from_value(value).unwrap();
    validate_movie(&data, &ValidationOpts::default())
}

#[test]
fn clean_payload_has_no_findings() {
    let r = check(base());
    assert!(r.is_valid(), "{r}");
    assert!(r.warnings.is_empty(), "{r}");
    assert_eq!(
        r.recommendations,
        vec!["attach an alignment to enable MSA window sync".to_owned()]
    );
}

#[test]
fn missing_required_lists_are_fatal() {
    let r = check(json!({}));
    assert!(r.has_code(DiagnosticCode::MissingTreeList));
    assert!(r.has_code(DiagnosticCode::MissingTreeNames));
    assert_eq!(r.issues[0].path, "$.tree_list");

    let mut v = base();
    v.as_object_mut().unwrap().remove("tree_names");
    let r = check(v);
    assert_eq!(r.issues.len(), 1);
    assert_eq!(r.issues[0].code, DiagnosticCode::MissingTreeNames);
}

#[test]
fn frame_count_mismatch_is_fatal() {
    let mut v = base();
    v["tree_names"].as_array_mut().unwrap().pop();
    let r = check(v);
    assert!(!r.is_valid());
    assert!(r.has_code(DiagnosticCode::FrameCountMismatch));
}

#[test]
fn no_full_trees_is_fatal() {
    let r = check(json!({"tree_list": [frame(), frame()], "tree_names": ["IT0_down_1", "IT0_up_1"]}));
    assert!(r.has_code(DiagnosticCode::NoFullTrees));
    assert!(!r.is_valid());
}

#[test]
fn nonconforming_frames_are_fatal_with_paths() {
    let mut v = base();
    v["tree_list"][2] = json!(42);
    v["tree_list"][3] = json!({"children": "nope"});
    let r = check(v);
    let paths: Vec<&str> = r
        .issues
        .iter()
        .filter(|d| d.code == DiagnosticCode::FrameNonconforming)
        .map(|d| d.path.as_str())
        .collect();
    assert_eq!(paths, vec!["$.tree_list[2]", "$.tree_list[3]"]);
}

#[test]
fn unsorted_splits_warn() {
    let mut v = base();
    v["tree_list"][0]["split_indices"] = json!([2, 0, 1]);
    let r = check(v);
    assert!(r.is_valid());
    assert!(r.has_code(DiagnosticCode::UnsortedSplit));
}

#[test]
fn highlight_length_must_match_transitions() {
    let mut v = base();
    v["highlight_data"]["jumping_taxa"] = json!([[[0]]]);
    let r = check(v);
    assert!(!r.is_valid());
    assert_eq!(r.issues[0].code, DiagnosticCode::HighlightLengthMismatch);
    assert_eq!(r.issues[0].path, "$.highlight_data.jumping_taxa");
}

#[test]
fn absent_highlight_fields_are_not_checked() {
    let mut v = base();
    v["highlight_data"] = json!({"s_edges": [[], []]});
    assert!(check(v).is_valid());
}

#[test]
fn distance_drift_within_tolerance_warns() {
    let mut v = base();
    v["rfd_list"] = json!([0.2, 0.4, 0.6]);
    let r = check(v);
    assert!(r.is_valid());
    assert!(
        r.warnings
            .iter()
            .any(|d| d.code == DiagnosticCode::DistanceLengthDrift && d.path == "$.rfd_list")
    );
}

#[test]
fn distance_drift_beyond_tolerance_is_fatal() {
    let mut v = base();
    v["rfd_list"] = json!(vec![0.5; 12]);
    let r = check(v);
    assert!(!r.is_valid());
    assert_eq!(r.issues[0].code, DiagnosticCode::DistanceLengthDrift);

    let opts = ValidationOpts {
        distance_drift_tolerance: 20,
        ..ValidationOpts::default()
    };
    let mut v = base();
    v["rfd_list"] = json!(vec![0.5; 12]);
    let data = MovieData::from_value(v).unwrap();
    assert!(validate_movie(&data, &opts).is_valid());
}

#[test]
fn invalid_and_missing_distances_warn() {
    let mut v = base();
    v["rfd_list"] = json!([1.5, null]);
    v["weighted_rfd_list"] = json!([]);
    let r = check(v);
    assert!(r.is_valid());
    let invalid: Vec<&str> = r
        .warnings
        .iter()
        .filter(|d| d.code == DiagnosticCode::InvalidDistance)
        .map(|d| d.path.as_str())
        .collect();
    assert_eq!(invalid, vec!["$.rfd_list[0]", "$.rfd_list[1]"]);
    assert!(r.has_code(DiagnosticCode::DistancesMissing));
}

#[test]
fn scale_problems_warn() {
    let mut v = base();
    v["scale_list"][1] = json!(0.0);
    v["scale_list"][2] = json!(null);
    let r = check(v);
    assert!(r.is_valid());
    assert_eq!(
        r.warnings
            .iter()
            .filter(|d| d.code == DiagnosticCode::NonPositiveScale)
            .count(),
        2
    );

    let mut v = base();
    v["scale_list"] = json!([1.0]);
    assert!(check(v).has_code(DiagnosticCode::ScaleLengthMismatch));
}

#[test]
fn malformed_tracking_entries_warn() {
    let mut v = base();
    v["active_change_edge_tracking"][4] = json!("edge");
    v["subtree_tracking"] = json!([]);
    let r = check(v);
    assert!(r.is_valid());
    assert!(r.has_code(DiagnosticCode::TrackingEntryMalformed));
    assert!(r.has_code(DiagnosticCode::TrackingLengthMismatch));
}

#[test]
fn name_pattern_findings_warn() {
    let mut v = base();
    v["tree_names"][1] = json!("mystery");
    v["tree_names"][4] = json!("T3");
    let r = check(v);
    assert!(r.is_valid());
    assert!(r.has_code(DiagnosticCode::UnrecognizedFrameName));
    assert!(r.has_code(DiagnosticCode::NonConsecutiveFullTrees));
}

#[test]
fn boundary_frames_must_be_full() {
    let mut v = base();
    v["tree_names"][8] = json!("IT1_up_2");
    let r = check(v);
    assert!(!r.is_valid());
    let paths: Vec<&str> = r
        .issues
        .iter()
        .filter(|d| d.code == DiagnosticCode::BoundaryNotFull)
        .map(|d| d.path.as_str())
        .collect();
    assert_eq!(paths, vec!["$.tree_names[8]"]);

    let mut v = base();
    v["tree_names"][0] = json!("IT0_down_0");
    v["tree_names"][4] = json!("T0");
    v["tree_names"][8] = json!("T1");
    assert!(check(v).has_code(DiagnosticCode::BoundaryNotFull));
}

#[test]
fn frames_without_splits_are_fatal() {
    let r = check(json!({
        "tree_list": [{}, {"foo": 1}, {"bar": "x"}],
        "tree_names": ["T0", "I0-1", "T1"]
    }));
    assert!(!r.is_valid());
    let paths: Vec<&str> = r
        .issues
        .iter()
        .filter(|d| d.code == DiagnosticCode::FrameNonconforming)
        .map(|d| d.path.as_str())
        .collect();
    assert_eq!(paths, vec!["$.tree_list[0]", "$.tree_list[1]", "$.tree_list[2]"]);

    let mut v = base();
    v["tree_list"][5]["children"][1] = json!({"name": "B"});
    let r = check(v);
    assert!(!r.is_valid());
    assert_eq!(r.issues[0].path, "$.tree_list[5]");
}

#[test]
fn density_thresholds() {
    let sparse = json!({
        "tree_list": [frame(), frame(), frame()],
        "tree_names": ["T0", "IT0_down_1", "T1"],
        "rfd_list": [0.1],
        "weighted_rfd_list": [0.1]
    });
    let r = check(sparse);
    assert!(r.has_code(DiagnosticCode::SparseInterpolation));
    assert!(r.recommendations.iter().any(|s| s.contains("increase")));

    let mut names = vec!["T0".to_owned()];
    names.extend((0..25).map(|i| format!("IT0_down_{i}")));
    names.push("T1".to_owned());
    let dense = json!({
        "tree_list": names.iter().map(|_| frame()).collect::<Vec<_>>(),
        "tree_names": names,
        "rfd_list": [0.1],
        "weighted_rfd_list": [0.1]
    });
    assert!(check(dense).has_code(DiagnosticCode::DenseInterpolation));
}

#[test]
fn zero_window_warns_when_msa_attached() {
    let mut v = base();
    v["msa"] = json!({"window_size": 0, "step_size": 5});
    let r = check(v);
    assert!(r.has_code(DiagnosticCode::InvalidWindow));
    assert!(r.recommendations.is_empty());
}

#[test]
fn diagnostics_display_code_and_path() {
    let r = check(json!({}));
    assert_eq!(
        r.issues[0].to_string(),
        "[missing_tree_list] $.tree_list: tree_list is required"
    );
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["issues"][0]["code"], "missing_tree_list");
}
