//! Command-line surface.
//!
//! Parsing stays thin: arguments normalize into the core types here and the
//! core never sees clap.

use crate::encode::Format;
use crate::param::{ParameterKind, QueryKey, TypeFilter};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ssm-gather",
    version,
    long_version = crate::version::long(),
    about = "Recursively gather parameters stored in AWS SSM under a given path"
)]
pub struct Cli {
    /// Path prefix to gather parameters under
    #[arg(value_name = "PATH", default_value = "/")]
    pub path: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Gather only parameters of a specific type
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE")]
    pub kind: Option<TypeArg>,

    /// Retry attempts for a failed page request
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub retries: u32,
}

/// `--type` values, spelled the way the store spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TypeArg {
    #[value(name = "String")]
    String,
    #[value(name = "SecureString")]
    SecureString,
}

impl Cli {
    pub fn query_key(&self) -> QueryKey {
        QueryKey::normalize(&self.path)
    }

    pub fn type_filter(&self) -> TypeFilter {
        match self.kind {
            None => TypeFilter::all(),
            Some(TypeArg::String) => TypeFilter::only(ParameterKind::Plain),
            Some(TypeArg::SecureString) => TypeFilter::only(ParameterKind::Secret),
        }
    }
}
