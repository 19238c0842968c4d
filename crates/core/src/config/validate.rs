use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Input and output are different files
/// - Remote timeout, when set, is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.dataset.input_path == config.dataset.output_path {
        return Err(ConfigError::ValidationError(format!(
            "dataset.output_path would overwrite the input file {}",
            config.dataset.input_path.display()
        )));
    }

    if config.remote.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "remote.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_same_input_and_output_fails() {
        let mut config = Config::default();
        config.dataset.output_path = PathBuf::from("test_dataset_nutri_from_ciqual.json");
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.remote.timeout_secs = Some(0);
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_positive_timeout() {
        let mut config = Config::default();
        config.remote.timeout_secs = Some(30);
        assert!(validate_config(&config).is_ok());
    }
}
