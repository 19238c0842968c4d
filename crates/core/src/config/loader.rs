use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "percentages.toml";

/// Load configuration from defaults, an optional TOML file and the environment.
///
/// An explicit `path` must exist. Without one, `percentages.toml` is read if
/// present. Environment variables use the `PERCENTAGES_` prefix with `__`
/// between section and key, e.g. `PERCENTAGES_CREDENTIALS__BASIC_AUTH_USERNAME`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                figment = figment.merge(Toml::file(fallback));
            }
        }
    }

    figment
        .merge(Env::prefixed("PERCENTAGES_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
