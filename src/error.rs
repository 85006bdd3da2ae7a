//! Plugin errors.

use std::error;
use std::fmt;

use prost::DecodeError;

/// An error which aborts a plugin run.
///
/// Problems inside method option blobs never surface here: a malformed or
/// mistyped annotation is simply treated as absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The plugin parameter named a key this plugin does not understand.
    UnknownParameter(String),
    /// A known plugin parameter carried an unusable value.
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
    /// A generated file name does not live under the configured `module` prefix.
    OutputPath { file: String, module: String },
    /// The code generator request could not be decoded.
    Decode(DecodeError),
}

impl Error {
    pub(crate) fn invalid_parameter(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownParameter(name) => write!(f, "unknown plugin parameter: {:?}", name),
            Error::InvalidParameter {
                name,
                value,
                reason,
            } => write!(
                f,
                "invalid value {:?} for plugin parameter {}: {}",
                value, name, reason
            ),
            Error::OutputPath { file, module } => write!(
                f,
                "{}: generated file does not match prefix {:?}",
                file, module
            ),
            Error::Decode(error) => write!(f, "invalid CodeGeneratorRequest: {}", error),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Decode(error) => Some(error),
            _ => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(error: DecodeError) -> Self {
        Error::Decode(error)
    }
}
