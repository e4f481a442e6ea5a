//! XSD validation
//!
//! Validation is delegated to an external validator behind [`SchemaValidator`].
//! The default implementation drives libxml2's `xmllint`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::config::SspConfig;
use crate::error::{Result, SspError};
use crate::schema::SchemaCatalog;

/// Validates a document file against an XSD schema file
pub trait SchemaValidator: fmt::Debug {
    /// Ok if `document` conforms to `schema`; a [`SspError::SchemaValidation`]
    /// carrying the validator's diagnostic otherwise.
    fn validate(&self, document: &Path, schema: &Path) -> Result<()>;
}

/// `xmllint --noout --schema <schema> <document>`
#[derive(Debug, Clone)]
pub struct XmlLint {
    program: PathBuf,
}

impl XmlLint {
    pub fn new() -> Self {
        Self::with_program("xmllint")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the program can be started
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

impl Default for XmlLint {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator for XmlLint {
    fn validate(&self, document: &Path, schema: &Path) -> Result<()> {
        debug!(
            document = %document.display(),
            schema = %schema.display(),
            "Running xmllint"
        );

        let output = Command::new(&self.program)
            .arg("--noout")
            .arg("--schema")
            .arg(schema)
            .arg(document)
            .output()
            .map_err(|e| {
                SspError::ValidatorUnavailable(format!("{}: {}", self.program.display(), e))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            // 4: schema could not be parsed, 5: schema could not be compiled
            Some(4) | Some(5) => Err(SspError::InvalidSchema {
                path: schema.to_path_buf(),
                diagnostic,
            }),
            _ => Err(SspError::SchemaValidation {
                identifier: String::new(),
                path: document.to_path_buf(),
                diagnostic,
            }),
        }
    }
}

/// A schema catalog paired with the validator that applies it
#[derive(Debug, Clone)]
pub struct Compliance {
    catalog: Arc<SchemaCatalog>,
    validator: Arc<dyn SchemaValidator + Send + Sync>,
}

impl Compliance {
    pub fn new(
        catalog: Arc<SchemaCatalog>,
        validator: impl SchemaValidator + Send + Sync + 'static,
    ) -> Self {
        Self {
            catalog,
            validator: Arc::new(validator),
        }
    }

    /// Bundled schemas validated with `xmllint` from `PATH`
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(SchemaCatalog::bundled()?, XmlLint::new()))
    }

    pub fn from_config(config: &SspConfig) -> Result<Self> {
        Ok(Self::new(
            SchemaCatalog::from_config(config)?,
            XmlLint::with_program(&config.validation.xmllint),
        ))
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Validate the file at `document` against the schema for `identifier`
    pub fn check(&self, identifier: &str, document: &Path) -> Result<()> {
        let schema = self.catalog.schema_path(identifier)?;
        self.validator
            .validate(document, schema)
            .map_err(|e| match e {
                SspError::SchemaValidation {
                    path, diagnostic, ..
                } => SspError::SchemaValidation {
                    identifier: identifier.to_string(),
                    path,
                    diagnostic,
                },
                other => other,
            })
    }
}
