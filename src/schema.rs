//! Schema catalog
//!
//! Maps sub-standard identifiers to the XSD schemas shipped with this crate.
//! The schemas live in `resources/` next to the crate manifest and are also
//! embedded in the binary, so a relocated executable can still validate by
//! extracting them to a cache directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use include_dir::{include_dir, Dir};
use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::config::SspConfig;
use crate::error::{Result, SspError};

/// Identifier used when a document does not name its sub-standard.
/// It has no schema, so compliance checks on it always fail.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Identifier → schema file name, for every bundled schema
pub const SCHEMA_FILES: [(&str, &str); 6] = [
    ("ssc", "SystemStructureCommon.xsd"),
    ("ssd", "SystemStructureDescription.xsd"),
    ("ssd11", "SystemStructureDescription11.xsd"),
    ("ssm", "SystemStructureParameterMapping.xsd"),
    ("ssv", "SystemStructureParameterValues.xsd"),
    ("ssb", "SystemStructureSignalDictionary.xsd"),
];

static RESOURCES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/resources");

static BUNDLED: OnceLock<Arc<SchemaCatalog>> = OnceLock::new();

/// Identifier for a file based on its extension (`.ssd`, `.ssv`, `.ssm`, `.ssb`)
pub fn identifier_for_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "ssd" => Some("ssd"),
        "ssv" => Some("ssv"),
        "ssm" => Some("ssm"),
        "ssb" => Some("ssb"),
        _ => None,
    }
}

/// Identifier → schema path mapping with every path present on disk
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    dir: PathBuf,
    schemas: BTreeMap<&'static str, PathBuf>,
}

impl SchemaCatalog {
    /// Load the catalog from a directory holding all bundled schema files
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut schemas = BTreeMap::new();

        for (identifier, file_name) in SCHEMA_FILES {
            let path = dir.join(file_name);
            if !path.is_file() {
                return Err(SspError::MissingSchemaFile {
                    identifier: identifier.to_string(),
                    path,
                });
            }
            schemas.insert(identifier, path);
        }

        debug!(dir = %dir.display(), "Loaded schema catalog");
        Ok(Self { dir, schemas })
    }

    /// Write the embedded schemas into `dir` and load the catalog from there.
    /// Files already present with identical content are left alone.
    pub fn extract_to(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for (identifier, file_name) in SCHEMA_FILES {
            let contents = RESOURCES
                .get_file(file_name)
                .ok_or_else(|| SspError::MissingSchemaFile {
                    identifier: identifier.to_string(),
                    path: PathBuf::from(file_name),
                })?
                .contents();

            let target = dir.join(file_name);
            let checksum = Checksum::from_bytes(contents);
            let up_to_date = fs::read(&target)
                .map(|existing| checksum.verify(&existing))
                .unwrap_or(false);
            if !up_to_date {
                debug!(
                    file = %target.display(),
                    sha256 = checksum.as_str(),
                    "Extracting bundled schema"
                );
                fs::write(&target, contents)?;
            }
        }

        Self::load(dir)
    }

    /// The catalog of bundled schemas, shared by the whole process
    pub fn bundled() -> Result<Arc<SchemaCatalog>> {
        if let Some(catalog) = BUNDLED.get() {
            return Ok(Arc::clone(catalog));
        }
        let catalog = Arc::new(Self::locate_bundled()?);
        Ok(Arc::clone(BUNDLED.get_or_init(|| catalog)))
    }

    /// The catalog selected by configuration: an explicit resource directory
    /// if one is set, otherwise the bundled schemas
    pub fn from_config(config: &SspConfig) -> Result<Arc<SchemaCatalog>> {
        match &config.schemas.resource_dir {
            Some(dir) => Ok(Arc::new(Self::load(dir)?)),
            None => Self::bundled(),
        }
    }

    fn locate_bundled() -> Result<Self> {
        let source_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources");
        if let Ok(catalog) = Self::load(&source_dir) {
            return Ok(catalog);
        }

        let bundle = Checksum::combined(
            SCHEMA_FILES
                .iter()
                .filter_map(|(_, name)| RESOURCES.get_file(name).map(|f| (*name, f.contents()))),
        );
        let cache_dir = directories::ProjectDirs::from("org", "ssp-standard", "ssp-standard")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(std::env::temp_dir)
            .join("schemas")
            .join(bundle.short());

        match Self::extract_to(&cache_dir) {
            Ok(catalog) => Ok(catalog),
            Err(e) => {
                warn!(dir = %cache_dir.display(), error = %e, "Schema cache not writable, using temp dir");
                let fallback = std::env::temp_dir()
                    .join("ssp-standard-schemas")
                    .join(bundle.short());
                Self::extract_to(fallback)
            }
        }
    }

    /// Path of the schema for `identifier`
    pub fn schema_path(&self, identifier: &str) -> Result<&Path> {
        self.schemas
            .get(identifier)
            .map(PathBuf::as_path)
            .ok_or_else(|| SspError::MissingSchema(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.schemas.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemas.keys().copied()
    }

    /// Directory holding the schema files
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
