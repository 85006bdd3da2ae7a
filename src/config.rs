use log::warn;
use prost::encoding::{MAX_TAG, MIN_TAG};

use crate::Error;

/// The extension field number used when none is configured.
pub const DEFAULT_EXTENSION_FIELD_NUMBER: u32 = 50001;

/// How output file names are derived from the input `.proto` files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathMode {
    /// Output files are placed in a directory named after the Go import path.
    #[default]
    Import,
    /// Output files are placed next to their `.proto` file.
    SourceRelative,
}

/// Configuration options for permission table generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) extension_field_number: u32,
    pub(crate) paths: PathMode,
    pub(crate) module: Option<String>,
}

impl Config {
    /// Creates a new code generator configuration with default options.
    pub fn new() -> Self {
        Config::default()
    }

    /// Parses the parameter string protoc forwards from `--permissions_opt`.
    ///
    /// The parameter is a comma separated list of `key=value` pairs:
    ///
    /// - `extension-field-number=N` (or `extension_field_number=N`): the field
    ///   number of the `MethodOptions` extension carrying the permissions.
    /// - `paths=import|source_relative`: how output paths are derived.
    /// - `module=PREFIX`: an import path prefix stripped from output paths.
    ///
    /// Unknown keys and malformed values are rejected.
    pub fn from_parameter(parameter: Option<&str>) -> Result<Config, Error> {
        let mut config = Config::new();
        let Some(parameter) = parameter else {
            return Ok(config);
        };

        for entry in parameter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((name, value)) = entry.split_once('=') else {
                warn!("rejecting plugin parameter without a value: {:?}", entry);
                return Err(Error::invalid_parameter(entry, "", "expected key=value"));
            };
            let (name, value) = (name.trim(), value.trim());
            match name {
                "extension-field-number" | "extension_field_number" => {
                    let number = value.parse::<u32>().map_err(|error| {
                        Error::invalid_parameter(name, value, error.to_string())
                    })?;
                    if !(MIN_TAG..=MAX_TAG).contains(&number) {
                        return Err(Error::invalid_parameter(
                            name,
                            value,
                            format!("field number must be between {} and {}", MIN_TAG, MAX_TAG),
                        ));
                    }
                    config.extension_field_number(number);
                }
                "paths" => {
                    let paths = match value {
                        "import" => PathMode::Import,
                        "source_relative" => PathMode::SourceRelative,
                        _ => {
                            return Err(Error::invalid_parameter(
                                name,
                                value,
                                "expected import or source_relative",
                            ))
                        }
                    };
                    config.paths(paths);
                }
                "module" => {
                    config.module(value);
                }
                _ => {
                    warn!("rejecting unknown plugin parameter: {:?}", name);
                    return Err(Error::UnknownParameter(name.to_owned()));
                }
            }
        }

        if let (PathMode::SourceRelative, Some(module)) = (config.paths, &config.module) {
            return Err(Error::invalid_parameter(
                "module",
                module.as_str(),
                "cannot be combined with paths=source_relative",
            ));
        }

        Ok(config)
    }

    /// Sets the field number of the `MethodOptions` extension which carries the
    /// comma separated list of required permissions.
    ///
    /// # Example
    ///
    /// ```rust
    /// # let mut config = protoc_gen_permissions::Config::new();
    /// config.extension_field_number(50100);
    /// ```
    pub fn extension_field_number(&mut self, number: u32) -> &mut Self {
        self.extension_field_number = number;
        self
    }

    /// Configures how output paths are derived from input files.
    pub fn paths(&mut self, paths: PathMode) -> &mut Self {
        self.paths = paths;
        self
    }

    /// Strips `module` from the front of output paths in [`PathMode::Import`] mode.
    pub fn module(&mut self, module: impl Into<String>) -> &mut Self {
        self.module = Some(module.into());
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            extension_field_number: DEFAULT_EXTENSION_FIELD_NUMBER,
            paths: PathMode::default(),
            module: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_parameter(None).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.extension_field_number, 50001);
        assert_eq!(config.paths, PathMode::Import);
        assert_eq!(config.module, None);

        assert_eq!(Config::from_parameter(Some("")).unwrap(), Config::new());
        assert_eq!(Config::from_parameter(Some(" , ")).unwrap(), Config::new());
    }

    #[test]
    fn parses_every_option() {
        let config = Config::from_parameter(Some(
            "extension-field-number=50100, paths=import,module=example.com/api",
        ))
        .unwrap();
        assert_eq!(config.extension_field_number, 50100);
        assert_eq!(config.paths, PathMode::Import);
        assert_eq!(config.module.as_deref(), Some("example.com/api"));

        let config = Config::from_parameter(Some("paths=source_relative")).unwrap();
        assert_eq!(config.paths, PathMode::SourceRelative);

        let config = Config::from_parameter(Some("extension_field_number=7")).unwrap();
        assert_eq!(config.extension_field_number, 7);
    }

    #[test]
    fn rejects_bad_field_numbers() {
        for value in ["", "abc", "-1", "0", "536870912", "99999999999"] {
            let parameter = format!("extension-field-number={}", value);
            match Config::from_parameter(Some(&parameter)) {
                Err(Error::InvalidParameter { name, .. }) => {
                    assert_eq!(name, "extension-field-number")
                }
                other => panic!("{:?} was accepted: {:?}", value, other),
            }
        }
        assert!(Config::from_parameter(Some("extension-field-number=536870911")).is_ok());
    }

    #[test]
    fn rejects_unknown_parameters() {
        assert_eq!(
            Config::from_parameter(Some("paths=import,plugins=grpc")),
            Err(Error::UnknownParameter("plugins".to_owned()))
        );
        assert!(matches!(
            Config::from_parameter(Some("paths=relative")),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            Config::from_parameter(Some("source_relative")),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            Config::from_parameter(Some("paths=source_relative,module=example.com/api")),
            Err(Error::InvalidParameter { name, .. }) if name == "module"
        ));
    }
}
