use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use lulc_catalog::config::Config;
use lulc_catalog::domain::SchemaVersion;
use lulc_catalog::pipeline::processing::normalize::TemporalSource;
use lulc_catalog::pipeline::Pipeline;
use lulc_catalog::source_loader::load_initiatives;
use tempfile::NamedTempFile;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/initiatives_sample.jsonc")
}

#[test]
fn test_sample_file_builds_one_record_per_initiative() -> Result<()> {
    let raw = load_initiatives(sample_path())?;
    let build = Pipeline::default().build(&raw);

    let names: Vec<&str> = build.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["MapBiomas Brazil", "Dynamic World", "ESA WorldCover", "Undated Survey"]);
    assert_eq!(build.metadata.len(), 4);

    let mapbiomas = &build.records[0];
    assert_eq!(mapbiomas.schema_version, SchemaVersion::Legacy);
    assert_eq!(mapbiomas.accuracy, 89.5);
    assert_eq!(mapbiomas.resolution, 30.0);
    assert_eq!(mapbiomas.classes, 27);
    assert_eq!(mapbiomas.available_years, vec![2016, 2017, 2018, 2019, 2020]);
    assert_eq!(mapbiomas.temporal_source, TemporalSource::Record);

    let dw = &build.records[1];
    assert_eq!(dw.schema_version, SchemaVersion::Intermediate);
    assert_eq!(dw.resolution, 10.0);
    assert_eq!(dw.accuracy, 73.8);
    assert_eq!(dw.temporal_gaps, vec![2020]);
    assert_eq!(dw.temporal_span, 4);

    let worldcover = &build.records[2];
    assert_eq!(worldcover.schema_version, SchemaVersion::Structured);
    assert_eq!(worldcover.resolution, 10.0);
    assert_eq!(worldcover.accuracy, 76.7);
    assert_eq!(worldcover.classes, 11);
    assert_eq!(worldcover.reference_system, "4326");

    let undated = &build.records[3];
    assert_eq!(undated.acronym, "Undated ");
    assert!(undated.accuracy_defaulted);
    assert!(undated.resolution_defaulted);
    assert!(undated.temporal_defaulted);
    assert_eq!(undated.temporal_source, TemporalSource::Default);

    assert!(build.warnings.iter().all(|w| w.initiative != "ESA WorldCover"));
    assert!(build.warnings.iter().any(|w| w.initiative == "Undated Survey"));
    Ok(())
}

#[test]
fn test_enriched_metadata_keeps_raw_fields() -> Result<()> {
    let raw = load_initiatives(sample_path())?;
    let build = Pipeline::default().build(&raw);

    let dw = build.metadata["Dynamic World"].as_object().unwrap();
    assert_eq!(dw["provider"], "Google / World Resources Institute");
    assert_eq!(dw["acronym"], "DW");
    assert_eq!(dw["start_year"], 2018);
    assert_eq!(dw["end_year"], 2021);
    assert_eq!(dw["temporal_gaps"], serde_json::json!([2020]));
    assert_eq!(dw["temporal_defaulted"], false);
    assert!(!dw.contains_key("declared_available_years"));
    Ok(())
}

#[test]
fn test_auxiliary_data_skips_undated_initiatives() -> Result<()> {
    let raw = load_initiatives(sample_path())?;
    let pipeline = Pipeline::default();
    let auxiliary = pipeline.auxiliary(&pipeline.build(&raw));

    assert_eq!(auxiliary.comparison_matrix.len(), 4);
    assert_eq!(auxiliary.temporal_analysis.excluded, vec!["Undated Survey".to_string()]);
    assert_eq!(auxiliary.data_summary.total_initiatives, 4);
    assert_eq!(auxiliary.data_summary.initiatives_with_temporal_data, 3);

    let bitmap = &auxiliary.temporal_bitmap;
    assert_eq!(bitmap.time_range, Some([2016, 2021]));
    assert_eq!(bitmap.temporal_data["MapBiomas"].bitmap, "111110");
    assert_eq!(bitmap.temporal_data["DW"].bitmap, "001101");
    assert_eq!(bitmap.temporal_data["WorldCover"].bitmap, "000011");
    assert!(!bitmap.temporal_data.contains_key("Undated "));
    assert_eq!(bitmap.overlap_stats.max_concurrent, 2);

    assert_eq!(
        auxiliary.insights.top_performers.highest_accuracy.as_deref(),
        Some("MapBiomas")
    );
    Ok(())
}

#[test]
fn test_full_run_validates_sample() -> Result<()> {
    let raw = load_initiatives(sample_path())?;
    let result = Pipeline::default().run(&raw);

    assert!(result.validation.dataframe_valid);
    assert!(result.validation.metadata_valid);
    assert_eq!(result.validation.summary.dataframe_rows, 4);

    // Same input, same fingerprint
    let again = Pipeline::default().run(&raw);
    assert_eq!(result.input_fingerprint, again.input_fingerprint);
    Ok(())
}

#[test]
fn test_config_file_overrides_drive_validation() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[catalog.temporal_overrides]
"Dynamic World" = [2019, 2020]

[aggregate]
compact_key_len = 4
"#
    )?;
    let config = Config::load(file.path())?;
    let pipeline = Pipeline::new(config);

    let raw = load_initiatives(sample_path())?;
    let result = pipeline.run(&raw);

    let dw = &result.build.records[1];
    assert_eq!(dw.available_years, vec![2019, 2020]);
    assert_eq!(dw.temporal_source, TemporalSource::Override);
    assert_eq!(
        result.build.metadata["Dynamic World"]["declared_available_years"],
        serde_json::json!([2018, 2019, 2021])
    );

    assert!(result.validation.dataframe_valid);
    assert!(!result.validation.metadata_valid);
    assert!(result
        .validation
        .issues
        .contains(&"Temporal data mismatch for Dynamic World".to_string()));

    assert!(result.auxiliary.temporal_bitmap.temporal_data.contains_key("MapB"));
    Ok(())
}

#[test]
fn test_loader_rejects_non_object_root() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "// just a list\n[1, 2, 3]")?;
    assert!(load_initiatives(file.path()).is_err());
    Ok(())
}
