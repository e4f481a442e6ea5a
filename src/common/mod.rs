//! Content shared by all SSP sub-standards (the `ssc` namespace)

pub mod annotation;
pub mod enumeration;
pub mod metadata;
pub mod unit;

pub use annotation::{Annotation, Annotations};
pub use enumeration::{Enumeration, Enumerations, Item};
pub use metadata::{BaseElement, TopLevelMetaData};
pub use unit::{BaseUnit, Unit, Units};
