use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub use crate::batch::LimitsConfig;
pub use crate::tool::ToolsConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Append tool stderr excerpts to 500 responses. Diagnostic use only.
    #[serde(default)]
    pub expose_tool_stderr: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expose_tool_stderr: false,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Working directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Directory holding uploads and every generated file.
    #[serde(default = "default_workspace_dir")]
    pub dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
        }
    }
}

fn default_workspace_dir() -> PathBuf {
    std::env::temp_dir().join("formatshift")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(!config.server.expose_tool_stderr);
        assert!(config.workspace.dir.ends_with("formatshift"));
        assert_eq!(config.limits.max_files, 4);
        assert_eq!(config.tools.rasterize_density, 300);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
expose_tool_stderr = true

[workspace]
dir = "/var/lib/formatshift"

[limits]
max_files = 2
max_file_size_bytes = 1048576

[tools]
rasterizer_path = "/usr/bin/convert"
office_timeout_secs = 60
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.server.expose_tool_stderr);
        assert_eq!(config.workspace.dir, PathBuf::from("/var/lib/formatshift"));
        assert_eq!(config.limits.max_file_size_bytes, 1_048_576);
        assert_eq!(config.tools.rasterizer_path, PathBuf::from("/usr/bin/convert"));
        assert_eq!(config.tools.office_timeout_secs, 60);
        assert_eq!(config.tools.transcode_timeout_secs, 600);
    }

    #[test]
    fn test_config_serializes() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["limits"]["max_files"], 4);
        assert_eq!(json["tools"]["office_path"], "soffice");
    }
}
