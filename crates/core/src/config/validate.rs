use super::{types::Config, ConfigError};
use crate::tool::ToolKind;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Limits are not 0
/// - Tool paths are set and tool timeouts and density are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Limits
    if config.limits.max_files == 0 {
        return Err(invalid("limits.max_files cannot be 0"));
    }
    if config.limits.max_file_size_bytes == 0 {
        return Err(invalid("limits.max_file_size_bytes cannot be 0"));
    }

    // Tools
    let tools = &config.tools;
    for tool in ToolKind::ALL {
        if tools.program(tool).as_os_str().is_empty() {
            return Err(invalid(format!("tools: path for {tool} cannot be empty")));
        }
        if tools.timeout(tool).is_zero() {
            return Err(invalid(format!("tools: timeout for {tool} cannot be 0")));
        }
    }
    if tools.rasterize_density == 0 {
        return Err(invalid("tools.rasterize_density cannot be 0"));
    }

    Ok(())
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_limits() {
        let mut config = Config::default();
        config.limits.max_files = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.limits.max_file_size_bytes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_tools() {
        let mut config = Config::default();
        config.tools.office_path = PathBuf::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("office_converter"));

        let mut config = Config::default();
        config.tools.transcode_timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("media_transcoder"));

        let mut config = Config::default();
        config.tools.rasterize_density = 0;
        assert!(validate_config(&config).is_err());
    }
}
