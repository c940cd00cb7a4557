use super::*;
use crate::payload::validate::{Diagnostic, DiagnosticCode};

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PhyloError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        PhyloError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        PhyloError::payload_invalid(ValidationReport::default())
            .to_string()
            .starts_with("payload invalid:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PhyloError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn payload_invalid_keeps_report() {
    let report = ValidationReport {
        issues: vec![
            Diagnostic {
                code: DiagnosticCode::MissingTreeList,
                path: "$.tree_list".to_owned(),
                message: "tree_list is required".to_owned(),
            },
            Diagnostic {
                code: DiagnosticCode::MissingTreeNames,
                path: "$.tree_names".to_owned(),
                message: "tree_names is required".to_owned(),
            },
        ],
        ..ValidationReport::default()
    };
    let err = PhyloError::payload_invalid(report);
    let text = err.to_string();
    assert!(text.contains("missing_tree_list"));
    assert!(text.contains("(+1 more)"));
    assert_eq!(err.report().map(|r| r.issues.len()), Some(2));
    assert!(PhyloError::config("x").report().is_none());
}

#[test]
fn serde_json_errors_convert() {
    let err: PhyloError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, PhyloError::Serde(_)));
}

#[test]
fn condition_codes_are_stable() {
    assert_eq!(ConditionCode::OutOfRange.as_str(), "out_of_range");
    assert_eq!(ConditionCode::Inconsistent.as_str(), "inconsistent");
    assert_eq!(ConditionCode::MissingMsa.as_str(), "missing_msa");
    assert_eq!(ConditionCode::TopologyChange.as_str(), "topology_change");

    let c = Condition::new(ConditionCode::OutOfRange, "index 9 clamped");
    assert_eq!(c.to_string(), "out_of_range: index 9 clamped");
    assert_eq!(
        serde_json::to_value(&c).unwrap(),
        serde_json::json!({"code": "out_of_range", "message": "index 9 clamped"})
    );
}
