use std::path::PathBuf;

/// Platform-specific path handling that follows XDG Base Directory spec on Unix-like systems
/// and Windows conventions on Windows.
///
/// On macOS and Linux:
/// - Config: $XDG_CONFIG_HOME/{name} (default: ~/.config/{name})
/// - Data: $XDG_DATA_HOME/{name} (default: ~/.local/share/{name})
///
/// On Windows:
/// - Config: %APPDATA%\{name}
/// - Data: %APPDATA%\{name}
pub struct ProjectPaths {
    name: String,
}

impl ProjectPaths {
    /// Create a new ProjectPaths instance for the given application name.
    pub fn new(name: &str) -> Option<Self> {
        home_dir()?;
        Some(ProjectPaths {
            name: name.to_string(),
        })
    }

    pub fn config_dir(&self) -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            windows_appdata()
                .map(|p| p.join(&self.name))
                .unwrap_or_else(|| PathBuf::from(format!(".{}", self.name)))
        }

        #[cfg(not(target_os = "windows"))]
        {
            xdg_dir("XDG_CONFIG_HOME", &[".config"], &self.name)
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            windows_appdata()
                .map(|p| p.join(&self.name))
                .unwrap_or_else(|| PathBuf::from(format!(".{}", self.name)))
        }

        #[cfg(not(target_os = "windows"))]
        {
            xdg_dir("XDG_DATA_HOME", &[".local", "share"], &self.name)
        }
    }

    /// Directory for rolling log files
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Default location of the persistent script variable store
    pub fn persistent_vars_file(&self) -> PathBuf {
        self.data_dir().join("persistent_vars.toml")
    }
}

/// Home directory, respecting HOME before asking the platform.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
}

/// Resolve an XDG base directory: the env var if set, else `~/<fallback>`.
#[cfg(not(target_os = "windows"))]
fn xdg_dir(var: &str, fallback: &[&str], name: &str) -> PathBuf {
    let relative: PathBuf = fallback.iter().collect();
    std::env::var(var)
        .ok()
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|h| h.join(&relative)))
        .unwrap_or(relative)
        .join(name)
}

#[cfg(target_os = "windows")]
fn windows_appdata() -> Option<PathBuf> {
    std::env::var("APPDATA").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_paths_creation() {
        let paths = ProjectPaths::new("moongate");
        assert!(paths.is_some());
    }

    #[test]
    fn test_dirs_contain_name() {
        if let Some(paths) = ProjectPaths::new("moongate") {
            assert!(paths.config_dir().to_string_lossy().contains("moongate"));
            assert!(paths.data_dir().to_string_lossy().contains("moongate"));
            assert!(paths.logs_dir().ends_with("logs"));
        }
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_xdg_data_dir_uses_local_share_path() {
        let data_dir = xdg_dir("MOONGATE_TEST_UNSET_VAR", &[".local", "share"], "test");
        let data_str = data_dir.to_string_lossy();
        assert!(data_str.contains(".local/share"));
        assert!(data_str.ends_with("test"));
    }
}
