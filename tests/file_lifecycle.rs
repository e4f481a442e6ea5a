//! File Lifecycle Tests
//!
//! Opening, closing and validating SSP files on disk. Tests that need
//! `xmllint` return early when it is not installed; the commit checks use a
//! recording validator instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ssp_standard::{
    Annotation, Compliance, FileOptions, Mode, Parameter, ParameterSet, ParameterValue,
    ParameterValuesFile, SchemaCatalog, SchemaValidator, SspError, SspFile, UntypedDocument,
    XmlLint,
};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn has_xmllint() -> bool {
    XmlLint::new().is_available()
}

fn validating() -> FileOptions {
    FileOptions {
        validate_on_save: true,
        ..FileOptions::default()
    }
}

/// Validator that keeps a copy of every document it is asked to check
#[derive(Debug, Clone, Default)]
struct Recorder {
    accept: bool,
    seen: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl Recorder {
    fn accepting() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    fn rejecting() -> Self {
        Self::default()
    }

    fn seen(&self) -> Vec<(PathBuf, String)> {
        self.seen.lock().unwrap().clone()
    }

    fn options(&self) -> FileOptions {
        FileOptions {
            validate_on_save: true,
            compliance: Some(Compliance::new(
                SchemaCatalog::bundled().unwrap(),
                self.clone(),
            )),
            ..FileOptions::default()
        }
    }
}

impl SchemaValidator for Recorder {
    fn validate(&self, document: &Path, _schema: &Path) -> ssp_standard::Result<()> {
        let content = fs::read_to_string(document)?;
        self.seen
            .lock()
            .unwrap()
            .push((document.to_path_buf(), content));
        if self.accept {
            Ok(())
        } else {
            Err(SspError::SchemaValidation {
                identifier: String::new(),
                path: document.to_path_buf(),
                diagnostic: "element not expected".to_string(),
            })
        }
    }
}

fn vehicle() -> ParameterSet {
    let mut set = ParameterSet::new("Vehicle");
    set.add_parameter(Parameter::new(
        "mass",
        ParameterValue::Real {
            value: 1250.5,
            unit: Some("kg".to_string()),
        },
    ));
    set.add_parameter(Parameter::new("gears", ParameterValue::Integer(6)));
    set
}

// =============================================================================
// Open and close
// =============================================================================

#[test]
fn test_read_missing_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.ssv");

    let err = ParameterValuesFile::open(&path, Mode::Read, ParameterSet::default()).unwrap_err();
    assert!(err.is_read_error(), "{:?}", err);
    assert!(!path.exists());
}

#[test]
fn test_append_missing_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.ssv");

    let err = ParameterValuesFile::open(&path, Mode::Append, ParameterSet::default()).unwrap_err();
    assert!(matches!(err, SspError::Read { .. }));
    assert!(!path.exists());
}

#[test]
fn test_write_creates_file_on_close() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");

    let file = ParameterValuesFile::open(&path, Mode::Write, vehicle()).unwrap();
    assert!(!path.exists());
    file.close().unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(saved.contains("<ssv:ParameterSet"));
    assert!(saved.contains("xmlns:ssc=\"http://ssp-standard.org/SSP1/SystemStructureCommon\""));
    assert!(saved.contains("\n  <ssv:Parameters>"));
}

#[test]
fn test_read_fixture() {
    let file =
        ParameterValuesFile::open(fixture("parameters.ssv"), Mode::Read, ParameterSet::default())
            .unwrap();
    let set = file.document();

    assert_eq!(set.name, "Vehicle");
    assert_eq!(set.version, "1.0");
    assert_eq!(set.metadata.author.as_deref(), Some("Jane Doe"));
    assert_eq!(set.parameters.len(), 4);
    assert_eq!(
        set.parameter("gears").map(|p| &p.value),
        Some(&ParameterValue::Integer(6))
    );
    assert_eq!(set.parameter("mode").unwrap().annotations.len(), 1);
    assert_eq!(set.enumerations.get("DriveMode").unwrap().value_of("Sport"), Some(1));
    assert!(file.root().is_some());
    file.close().unwrap();
}

#[test]
fn test_append_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");
    ParameterValuesFile::open(&path, Mode::Write, vehicle())
        .unwrap()
        .close()
        .unwrap();

    let mut file = ParameterValuesFile::open(&path, Mode::Append, ParameterSet::default()).unwrap();
    file.document_mut()
        .add_parameter(Parameter::new("abs", ParameterValue::Boolean(true)));
    let mut note = Annotation::new("com.example.review");
    note.add_text("checked");
    file.document_mut().annotations.add_annotation(note);
    file.close().unwrap();

    let file = ParameterValuesFile::open(&path, Mode::Read, ParameterSet::default()).unwrap();
    let set = file.document();
    let names: Vec<&str> = set.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["mass", "gears", "abs"]);
    assert_eq!(set.annotations.len(), 1);
    let note = set.annotations.iter().next().unwrap();
    assert_eq!(note.type_declaration(), "com.example.review");
    assert_eq!(note.text().as_deref(), Some("checked"));
}

#[test]
fn test_scoped_body_error_still_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoped.ssv");

    let file = ParameterValuesFile::open(&path, Mode::Write, vehicle()).unwrap();
    let result: ssp_standard::Result<()> = file.scoped(|file| {
        file.document_mut()
            .add_parameter(Parameter::new("late", ParameterValue::Integer(1)));
        Err(SspError::Serialize("body failed".to_string()))
    });

    assert!(matches!(result, Err(SspError::Serialize(_))));
    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("name=\"late\""));
}

#[test]
fn test_read_mode_never_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("copy.ssv");
    fs::copy(fixture("parameters.ssv"), &path).unwrap();
    let before = fs::read(&path).unwrap();

    let mut file = ParameterValuesFile::open(&path, Mode::Read, ParameterSet::default()).unwrap();
    file.document_mut().name = "Changed".to_string();
    file.close().unwrap();

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_units_survive_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chassis.ssv");
    fs::copy(fixture("units.ssv"), &path).unwrap();

    let mut file = ParameterValuesFile::open(&path, Mode::Append, ParameterSet::default()).unwrap();
    assert_eq!(file.document().units.len(), 2);
    file.document_mut()
        .add_parameter(Parameter::new("gears", ParameterValue::Integer(6)));
    file.close().unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("<ssc:Units>"), "{}", saved);
    assert!(saved.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
    assert!(saved.contains(
        "xsi:schemaLocation=\"http://ssp-standard.org/SSP1/SystemStructureParameterValues SystemStructureParameterValues.xsd\""
    ));

    let mut file = ParameterValuesFile::open(&path, Mode::Read, ParameterSet::default()).unwrap();
    let set = file.document();
    assert_eq!(set.parameters.len(), 3);
    let celsius = set.units.get("degC").unwrap();
    assert_eq!(celsius.base_unit.k, 1);
    assert_eq!(celsius.base_unit.offset, 273.15);
    assert_eq!(set.units.get("kg").unwrap().base_unit.kg, 1);

    if has_xmllint() {
        file.check_compliance().unwrap();
    }
}

#[test]
fn test_description_with_geometry_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drivetrain.ssd");
    fs::copy(fixture("geometry.ssd"), &path).unwrap();

    let file = SspFile::open(&path, Mode::Append, UntypedDocument::default()).unwrap();
    let root = file.document().root.as_ref().unwrap();
    assert_eq!(root.name, "SystemStructureDescription");
    file.close().unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("<ssd:ElementGeometry"), "{}", saved);
    assert!(saved.contains("rotation=\"90\""));
    assert!(saved.contains("pointsX=\"1 2 3\""));
    assert!(saved.contains("<ssd:Note"));
    assert!(saved.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
    assert!(saved.contains(
        "xsi:schemaLocation=\"http://ssp-standard.org/SSP1/SystemStructureDescription SystemStructureDescription.xsd\""
    ));
    assert!(!saved.contains(" schemaLocation="));
}

// =============================================================================
// Compliance
// =============================================================================

#[test]
fn test_unknown_identifier_has_no_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.xml");
    let mut file = SspFile::open(&path, Mode::Write, UntypedDocument::default()).unwrap();

    let err = file.check_compliance().unwrap_err();
    assert!(matches!(err, SspError::MissingSchema(ref id) if id == "unknown"));
    assert!(!path.exists());
}

#[test]
fn test_read_fixture_is_compliant() {
    if !has_xmllint() {
        return;
    }
    let mut file =
        ParameterValuesFile::open(fixture("parameters.ssv"), Mode::Read, ParameterSet::default())
            .unwrap();
    file.check_compliance().unwrap();
}

#[test]
fn test_read_invalid_fixture_is_reported() {
    if !has_xmllint() {
        return;
    }
    let mut file = SspFile::open_with_identifier(
        fixture("invalid.ssv"),
        Mode::Read,
        "ssv",
        UntypedDocument::default(),
    )
    .unwrap();

    match file.check_compliance().unwrap_err() {
        SspError::SchemaValidation {
            identifier,
            path,
            diagnostic,
        } => {
            assert_eq!(identifier, "ssv");
            assert_eq!(path, fixture("invalid.ssv"));
            assert!(diagnostic.contains("six"), "{}", diagnostic);
        }
        other => panic!("Expected SchemaValidation, got {:?}", other),
    }
}

#[test]
fn test_written_document_is_compliant() {
    if !has_xmllint() {
        return;
    }
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");

    let mut set = vehicle();
    set.metadata = ssp_standard::TopLevelMetaData::generated_now();
    let mut file = ParameterValuesFile::open(&path, Mode::Write, set)
        .unwrap()
        .with_options(validating());
    file.check_compliance().unwrap();
    assert!(!path.exists());
    file.close().unwrap();
    assert!(path.exists());
}

#[test]
fn test_invalid_write_is_not_committed() {
    if !has_xmllint() {
        return;
    }
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");

    let mut set = vehicle();
    set.version = "2.0".to_string();
    let mut file = ParameterValuesFile::open(&path, Mode::Write, set)
        .unwrap()
        .with_options(validating());

    let err = file.check_compliance().unwrap_err();
    assert!(err.is_schema_violation(), "{:?}", err);
    assert!(!path.exists());

    let err = file.close().unwrap_err();
    match err {
        SspError::SchemaValidation { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected SchemaValidation, got {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_description_with_geometry_is_compliant() {
    if !has_xmllint() {
        return;
    }
    for identifier in ["ssd", "ssd11"] {
        let mut file = SspFile::open_with_identifier(
            fixture("geometry.ssd"),
            Mode::Read,
            identifier,
            UntypedDocument::default(),
        )
        .unwrap();
        file.check_compliance()
            .unwrap_or_else(|e| panic!("{} rejected geometry.ssd: {}", identifier, e));
    }
}

#[test]
fn test_resaved_description_is_compliant() {
    if !has_xmllint() {
        return;
    }
    let dir = tempdir().unwrap();
    let path = dir.path().join("drivetrain.ssd");
    fs::copy(fixture("geometry.ssd"), &path).unwrap();

    SspFile::open(&path, Mode::Append, UntypedDocument::default())
        .unwrap()
        .close()
        .unwrap();

    let mut file = SspFile::open_with_identifier(&path, Mode::Read, "ssd", UntypedDocument::default())
        .unwrap();
    file.check_compliance().unwrap();
}

// =============================================================================
// Validate before commit
// =============================================================================

#[test]
fn test_rejected_write_is_not_committed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");
    let validator = Recorder::rejecting();

    let file = ParameterValuesFile::open(&path, Mode::Write, vehicle())
        .unwrap()
        .with_options(validator.options());
    match file.close().unwrap_err() {
        SspError::SchemaValidation {
            identifier,
            path: reported,
            diagnostic,
        } => {
            assert_eq!(identifier, "ssv");
            assert_eq!(reported, path);
            assert_eq!(diagnostic, "element not expected");
        }
        other => panic!("Expected SchemaValidation, got {:?}", other),
    }
    assert!(!path.exists());

    let seen = validator.seen();
    assert_eq!(seen.len(), 1);
    let (staged, content) = &seen[0];
    assert_ne!(staged, &path);
    assert!(!staged.exists());
    assert!(!staged.parent().unwrap().exists());
    assert!(content.contains("name=\"gears\""));
}

#[test]
fn test_rejected_append_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");
    fs::copy(fixture("parameters.ssv"), &path).unwrap();
    let before = fs::read(&path).unwrap();
    let validator = Recorder::rejecting();

    let mut file = ParameterValuesFile::open(&path, Mode::Append, ParameterSet::default())
        .unwrap()
        .with_options(validator.options());
    file.document_mut()
        .add_parameter(Parameter::new("late", ParameterValue::Integer(1)));
    let err = file.close().unwrap_err();

    assert!(err.is_schema_violation(), "{:?}", err);
    assert_eq!(fs::read(&path).unwrap(), before);
    let seen = validator.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].1.contains("name=\"late\""));
    assert!(!seen[0].0.exists());
}

#[test]
fn test_rejected_compliance_check_leaves_target_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");
    let validator = Recorder::rejecting();

    let mut file = ParameterValuesFile::open(&path, Mode::Write, vehicle())
        .unwrap()
        .with_options(validator.options());
    match file.check_compliance().unwrap_err() {
        SspError::SchemaValidation { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected SchemaValidation, got {:?}", other),
    }
    assert!(!path.exists());
    assert!(!validator.seen()[0].0.exists());

    // Validation on close rejects the same document.
    assert!(file.close().is_err());
    assert!(!path.exists());
}

#[test]
fn test_accepted_write_validates_before_saving() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vehicle.ssv");
    let validator = Recorder::accepting();

    let mut file = ParameterValuesFile::open(&path, Mode::Write, vehicle())
        .unwrap()
        .with_options(validator.options());
    file.check_compliance().unwrap();
    assert!(!path.exists());
    file.close().unwrap();

    let seen = validator.seen();
    assert_eq!(seen.len(), 2);
    let saved = fs::read_to_string(&path).unwrap();
    assert_eq!(seen[1].1, saved);
    assert!(seen.iter().all(|(staged, _)| staged != &path && !staged.exists()));
}

#[test]
fn test_read_mode_checks_file_on_disk() {
    let validator = Recorder::accepting();
    let mut file =
        ParameterValuesFile::open(fixture("parameters.ssv"), Mode::Read, ParameterSet::default())
            .unwrap()
            .with_options(validator.options());
    file.check_compliance().unwrap();

    let seen = validator.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, fixture("parameters.ssv"));
    file.close().unwrap();
    assert_eq!(validator.seen().len(), 1);
}
