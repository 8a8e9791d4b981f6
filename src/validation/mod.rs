pub mod manifest_validator;

pub use manifest_validator::{ManifestValidator, ValidationReport};
