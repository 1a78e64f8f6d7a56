//! Well-known filesystem locations.

use std::path::PathBuf;

/// Resolves the application's directories.
pub struct ForgePaths;

impl ForgePaths {
    /// The configuration/data directory: `~/.config/promptforge`.
    ///
    /// # Errors
    ///
    /// Returns an error message if the platform config directory cannot be
    /// determined.
    pub fn config_dir() -> Result<PathBuf, String> {
        dirs::config_dir()
            .map(|dir| dir.join("promptforge"))
            .ok_or_else(|| "Cannot find config directory".to_string())
    }
}
