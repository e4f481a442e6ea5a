//! SSP files on disk
//!
//! [`SspFile`] owns the lifecycle of one document:
//!
//! ```text
//! open(path, mode) ──► read/append: parse + read hook
//!       │
//!   enter / body
//!       │
//! close ──► write/append: write hook + serialize + persist
//! ```
//!
//! The document type supplies the read and write hooks through [`SspDocument`];
//! the file only handles paths, modes, schemas and persistence.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tempfile::Builder;
use tracing::{debug, error, info};
use xmltree::Element;

use crate::config::SspConfig;
use crate::error::{Result, SspError};
use crate::schema::UNKNOWN_IDENTIFIER;
use crate::validator::Compliance;
use crate::xml::{self, DEFAULT_INDENT};

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Parse on open, never written back
    Read,
    /// Start empty, written on close
    Write,
    /// Parse on open, written back on close
    Append,
}

impl Mode {
    /// Whether the file is parsed when opened
    pub fn reads(&self) -> bool {
        matches!(self, Mode::Read | Mode::Append)
    }

    /// Whether the file is written when closed
    pub fn writes(&self) -> bool {
        matches!(self, Mode::Write | Mode::Append)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Read => "read",
            Mode::Write => "write",
            Mode::Append => "append",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "r" | "read" => Ok(Mode::Read),
            "w" | "write" => Ok(Mode::Write),
            "a" | "append" => Ok(Mode::Append),
            other => Err(format!("unknown file mode '{}'", other)),
        }
    }
}

/// The domain content of one kind of SSP file
///
/// Both hooks default to [`SspError::UnimplementedHook`]; a document type that
/// is only ever read, or only ever written, may leave the other one out.
pub trait SspDocument {
    /// Schema identifier used for compliance checks
    const IDENTIFIER: &'static str = UNKNOWN_IDENTIFIER;

    /// Populate the document from the tree parsed on open
    fn read(&mut self, _root: &Element) -> Result<()> {
        Err(SspError::UnimplementedHook {
            hook: "read",
            document: std::any::type_name::<Self>(),
        })
    }

    /// Build the tree to persist from the current document state
    fn write(&self) -> Result<Element> {
        Err(SspError::UnimplementedHook {
            hook: "write",
            document: std::any::type_name::<Self>(),
        })
    }
}

/// Options that affect how a file is validated and saved
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Indentation of the saved document
    pub indent: String,
    /// Validate the serialized document before committing it on close
    pub validate_on_save: bool,
    /// Catalog and validator; the bundled ones when unset
    pub compliance: Option<Compliance>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            validate_on_save: false,
            compliance: None,
        }
    }
}

impl FileOptions {
    pub fn from_config(config: &SspConfig) -> Result<Self> {
        Ok(Self {
            indent: config.output.indent.clone(),
            validate_on_save: config.validation.validate_on_save,
            compliance: Some(Compliance::from_config(config)?),
        })
    }
}

/// One SSP document on disk
pub struct SspFile<D: SspDocument> {
    file_path: PathBuf,
    mode: Mode,
    identifier: String,
    root: Option<Element>,
    document: D,
    options: FileOptions,
    closed: bool,
}

impl<D: SspDocument> SspFile<D> {
    /// Open `file_path` with the identifier of the document type
    pub fn open(file_path: impl AsRef<Path>, mode: Mode, document: D) -> Result<Self> {
        Self::open_with_identifier(file_path, mode, D::IDENTIFIER, document)
    }

    /// Open `file_path` validating against the schema for `identifier`
    pub fn open_with_identifier(
        file_path: impl AsRef<Path>,
        mode: Mode,
        identifier: impl Into<String>,
        document: D,
    ) -> Result<Self> {
        let mut file = Self {
            file_path: file_path.as_ref().to_path_buf(),
            mode,
            identifier: identifier.into(),
            root: None,
            document,
            options: FileOptions::default(),
            closed: false,
        };

        debug!(
            path = %file.file_path.display(),
            mode = %mode,
            identifier = %file.identifier,
            "Opening SSP file"
        );

        if mode.reads() {
            if let Err(e) = file.read() {
                // Nothing was opened, so dropping must not write.
                file.closed = true;
                return Err(e);
            }
        }
        Ok(file)
    }

    /// Replace the validation and output options
    pub fn with_options(mut self, options: FileOptions) -> Self {
        self.options = options;
        self
    }

    fn read(&mut self) -> Result<()> {
        let root = xml::parse_file(&self.file_path)?;
        self.document.read(&root)?;
        self.root = Some(root);
        Ok(())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The most recently parsed or written tree
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Start working with the file
    pub fn enter(&mut self) -> &mut Self {
        debug!(path = %self.file_path.display(), "Entering SSP file scope");
        self
    }

    /// Run `body` with the file, then close it.
    ///
    /// The close runs on every exit path of `body`. If both fail, the error
    /// from `body` is returned and the close error is logged.
    pub fn scoped<R>(mut self, body: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let outcome = body(self.enter());
        let closed = self.exit();

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                error!(
                    path = %self.file_path.display(),
                    error = %close_error,
                    "Closing SSP file failed after an earlier error"
                );
                Err(e)
            }
        }
    }

    /// Close the file, writing it for write and append modes
    pub fn close(mut self) -> Result<()> {
        self.exit()
    }

    fn exit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.mode.writes() {
            let bytes = self.write()?;
            if self.options.validate_on_save {
                self.validate_bytes(&bytes)?;
            }
            self.save(&bytes)?;
        }
        Ok(())
    }

    /// Run the write hook and serialize its tree
    fn write(&mut self) -> Result<Vec<u8>> {
        let root = self.document.write()?;
        let bytes = xml::to_bytes_with_indent(&root, &self.options.indent)?;
        self.root = Some(root);
        Ok(bytes)
    }

    /// Replace the target file with `bytes` via a sibling temporary file.
    ///
    /// An existing target keeps its permissions. A new file gets the mode a
    /// plain create would give it.
    fn save(&self, bytes: &[u8]) -> Result<()> {
        let dir = match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let existing = match fs::metadata(&self.file_path) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut builder = Builder::new();
        builder.prefix(".ssp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Created through open(2), so the process umask applies.
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut staged = builder.tempfile_in(dir)?;
        if let Some(permissions) = existing {
            staged.as_file().set_permissions(permissions)?;
        }
        staged.write_all(bytes)?;
        staged.flush()?;
        staged
            .persist(&self.file_path)
            .map_err(|e| SspError::Io(e.error))?;

        info!(path = %self.file_path.display(), bytes = bytes.len(), "Saved SSP file");
        Ok(())
    }

    fn compliance(&self) -> Result<Compliance> {
        match &self.options.compliance {
            Some(compliance) => Ok(compliance.clone()),
            None => Compliance::bundled(),
        }
    }

    fn validate_bytes(&self, bytes: &[u8]) -> Result<()> {
        let compliance = self.compliance()?;
        // Unknown identifiers fail before anything touches the disk.
        compliance.catalog().schema_path(&self.identifier)?;

        let dir = tempfile::tempdir()?;
        let staged = dir.path().join("tmp.xml");
        fs::write(&staged, bytes)?;

        compliance
            .check(&self.identifier, &staged)
            .map_err(|e| match e {
                SspError::SchemaValidation {
                    identifier,
                    diagnostic,
                    ..
                } => SspError::SchemaValidation {
                    identifier,
                    path: self.file_path.clone(),
                    diagnostic,
                },
                other => other,
            })
    }

    /// Validate the document against the schema selected by its identifier.
    ///
    /// Write and append modes validate a temporary serialization of the write
    /// hook's tree; the target file is not touched. Read mode validates the
    /// file on disk as it was opened.
    pub fn check_compliance(&mut self) -> Result<()> {
        let compliance = self.compliance()?;
        compliance.catalog().schema_path(&self.identifier)?;

        info!(
            path = %self.file_path.display(),
            identifier = %self.identifier,
            mode = %self.mode,
            "Checking compliance"
        );

        if self.mode.writes() {
            let bytes = self.write()?;
            self.validate_bytes(&bytes)
        } else {
            compliance.check(&self.identifier, &self.file_path)
        }
    }
}

impl<D: SspDocument> Drop for SspFile<D> {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!(
                path = %self.file_path.display(),
                error = %e,
                "Failed to close SSP file"
            );
        }
    }
}

impl<D: SspDocument + fmt::Debug> fmt::Debug for SspFile<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SspFile")
            .field("file_path", &self.file_path)
            .field("mode", &self.mode)
            .field("identifier", &self.identifier)
            .field("document", &self.document)
            .field("closed", &self.closed)
            .finish()
    }
}

/// A document that keeps the parsed tree as-is
///
/// Useful for validating or re-saving files of any sub-standard without a
/// typed model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UntypedDocument {
    pub root: Option<Element>,
}

impl UntypedDocument {
    pub fn new(root: Element) -> Self {
        Self { root: Some(root) }
    }
}

impl SspDocument for UntypedDocument {
    fn read(&mut self, root: &Element) -> Result<()> {
        self.root = Some(root.clone());
        Ok(())
    }

    fn write(&self) -> Result<Element> {
        self.root.clone().ok_or(SspError::MissingRoot)
    }
}
