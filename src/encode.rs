//! Tree serialization into the supported output formats.

use crate::tree::ParameterTree;
use thiserror::Error;

/// Output encodings selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("could not encode the tree as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not encode the tree as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Render the assembled tree as bytes in the chosen format.
pub fn encode(tree: &ParameterTree, format: Format) -> Result<Vec<u8>, EncodeError> {
    match format {
        Format::Json => Ok(serde_json::to_vec(tree)?),
        Format::Yaml => Ok(serde_yaml::to_string(tree)?.into_bytes()),
    }
}
