//! SSP Standard
//!
//! A typed, round-trippable model for documents of the System Structure and
//! Parameterization (SSP) family of XML standards, with schema-validated
//! reading and writing of files on disk.
//!
//! ## Features
//!
//! - **Typed elements**: annotations, enumerations, units and metadata convert to and
//!   from XML trees through [`SspElement`]
//! - **File lifecycle**: [`SspFile`] parses on open and writes on close
//! - **Compliance checks**: documents are validated against the bundled XSD
//!   schemas with an external validator
//! - **Canonical output**: pretty-printed UTF-8 using the `ssc`, `ssv`, `ssb`,
//!   `ssm` and `ssd` prefixes
//!
//! ## Architecture
//!
//! ```text
//! namespace ─┐
//! schema ────┼─► validator ─┐
//! element ───┴─► common ────┼─► file ─► ssv
//!                xml ───────┘
//! ```

pub mod checksum;
pub mod common;
pub mod config;
pub mod element;
pub mod error;
pub mod file;
pub mod namespace;
pub mod schema;
pub mod ssv;
pub mod validator;
pub mod xml;

/// Version written to the `version` attribute of top-level SSP documents
pub const SSP_VERSION: &str = "1.0";

pub use common::{
    Annotation, Annotations, BaseElement, BaseUnit, Enumeration, Enumerations, Item,
    TopLevelMetaData, Unit, Units,
};
pub use config::SspConfig;
pub use element::{SspElement, Unrecognized};
pub use error::{Result, SspError};
pub use file::{FileOptions, Mode, SspDocument, SspFile, UntypedDocument};
pub use namespace::{register_namespaces, SspNamespace};
pub use schema::{identifier_for_path, SchemaCatalog, UNKNOWN_IDENTIFIER};
pub use ssv::{Parameter, ParameterSet, ParameterValue, ParameterValuesFile};
pub use validator::{Compliance, SchemaValidator, XmlLint};
