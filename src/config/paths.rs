//! Cross-platform directory path resolution
//!
//! - Linux/macOS: XDG Base Directory specification (~/.config)
//! - Windows: Known Folder API (AppData\Roaming)

use std::path::PathBuf;

const APP_NAME: &str = "kube-mapper";

/// Get the configuration directory path
///
/// Checks KUBE_MAPPER_CONFIG_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/kube-mapper or ~/.config/kube-mapper
/// - Windows: %APPDATA%\kube-mapper\config
pub fn config_dir() -> PathBuf {
    std::env::var("KUBE_MAPPER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the default configuration file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_yaml_in_config_dir() {
        let path = config_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.yaml"));
        assert_eq!(path.parent(), Some(config_dir().as_path()));
    }
}
