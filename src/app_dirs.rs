use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where progress records and preferences live.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "palabritas")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }

    /// The practice log appended to after every completed word or exercise.
    pub fn log_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("log.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_lives_in_config_dir() {
        if let (Some(dir), Some(log)) = (AppDirs::config_dir(), AppDirs::log_path()) {
            assert_eq!(log.parent(), Some(dir.as_path()));
            assert_eq!(log.file_name().unwrap(), "log.csv");
        }
    }
}
