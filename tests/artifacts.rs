use std::path::PathBuf;
use student_risk::{
    build_row,
    models::{ModelLoader, RowEncoder},
    types::student::StudentSubmission,
    FeatureValue,
};

fn artifacts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts")
}

#[test]
fn test_bundled_template_and_feature_info_agree() {
    let loader = ModelLoader::new();
    let template = loader
        .load_template(artifacts_dir().join("default_row.json"))
        .unwrap();
    let info = loader
        .load_feature_info(artifacts_dir().join("feature_info.json"))
        .unwrap();

    let submission: StudentSubmission = serde_json::from_str(
        r#"{"age": 15, "subject": "Math", "failures": 1, "absences": 0, "studytime": 4,
            "schoolsup": "yes", "famsup": "no", "internet": "no", "higher": "yes",
            "G1": 10, "G2": 9}"#,
    )
    .unwrap();
    let profile = submission.validate().unwrap();

    let row = build_row(&template, &profile.to_input_values());
    assert_eq!(row.columns(), template.columns());
    assert_eq!(row.get("subject"), Some(&FeatureValue::from("Math")));
    assert_eq!(row.get("Mjob"), Some(&FeatureValue::from("other")));

    let features = RowEncoder::new(info.categories).encode(&row).unwrap();
    assert_eq!(features.len(), template.len());
    // subject is the last column; Math is category 0
    assert_eq!(features.last(), Some(&0.0));
}
