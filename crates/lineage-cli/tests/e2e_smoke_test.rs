use std::fs;

use tempfile::tempdir;

use lineage::LineageError;
use lineage_core::color::Color;
use lineage_cli::{Args, CliError};

const ROWS: &str = r#"[
    {"domain": "Domain1", "sourceSystem": "SystemA", "table": "Table1"},
    {"domain": "Domain1", "sourceSystem": "SystemA", "table": "Table2"},
    {"domain": "Domain2", "sourceSystem": "SystemB", "table": "Table3"},
    {"domain": "Domain2", "sourceSystem": "SystemB", "table": "Table1"}
]"#;

fn args(input: &std::path::Path, output: &std::path::Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        collapse: Vec::new(),
        strict_keys: false,
    }
}

#[tokio::test]
async fn e2e_renders_calibration_rows() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.svg");
    fs::write(&input, ROWS).unwrap();

    lineage_cli::run(&args(&input, &output)).await.unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    for label in ["Domain1", "Domain2", "SystemA", "SystemB", "Table1", "Table2", "Table3"] {
        assert!(svg.contains(label), "missing {label}");
    }
}

#[tokio::test]
async fn e2e_collapse_hides_domain_members() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.svg");
    fs::write(&input, ROWS).unwrap();

    let mut cfg = args(&input, &output);
    cfg.collapse = vec!["Domain2".to_string()];
    lineage_cli::run(&cfg).await.unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("Domain2 [+]"));
    assert!(!svg.contains("Table3"));
}

#[tokio::test]
async fn e2e_config_file_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.svg");
    let config = temp_dir.path().join("config.toml");
    fs::write(&input, ROWS).unwrap();
    fs::write(&config, "[style.table]\nfill = \"pink\"\nstroke = \"purple\"\n").unwrap();

    let mut cfg = args(&input, &output);
    cfg.config = Some(config.to_string_lossy().to_string());
    lineage_cli::run(&cfg).await.unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    let pink = Color::new("pink").unwrap().to_string();
    assert!(svg.contains(&pink));
}

#[tokio::test]
async fn e2e_blank_field_is_reported() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.svg");
    fs::write(
        &input,
        r#"[{"domain": "Domain1", "sourceSystem": " ", "table": "Table1"}]"#,
    )
    .unwrap();

    let err = lineage_cli::run(&args(&input, &output)).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Lineage(LineageError::Validation { row_index: 0, .. })
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn e2e_malformed_json_is_reported() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.svg");
    fs::write(&input, "[{\"domain\": ").unwrap();

    let err = lineage_cli::run(&args(&input, &output)).await.unwrap_err();
    assert!(matches!(err, CliError::Input { .. }));
}

#[tokio::test]
async fn e2e_strict_keys_rejects_conflicts() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.svg");
    fs::write(
        &input,
        r#"[
            {"domain": "a-b", "sourceSystem": "c", "table": "T1"},
            {"domain": "a", "sourceSystem": "b-c", "table": "T2"}
        ]"#,
    )
    .unwrap();

    let mut cfg = args(&input, &output);
    cfg.strict_keys = true;
    let err = lineage_cli::run(&cfg).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Lineage(LineageError::DuplicateKeyConflict { .. })
    ));

    cfg.strict_keys = false;
    lineage_cli::run(&cfg).await.unwrap();
    assert!(output.exists());
}
