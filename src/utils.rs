use crate::error::WindCheckError;
use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "windcheck";
pub const CATALOG_FILE_NAME: &str = "catalog.json";
pub const MEASUREMENTS_DIR_NAME: &str = "measurements";

/// The platform data directory for windcheck, e.g. `~/.local/share/windcheck` on Linux.
pub fn get_data_dir() -> Result<PathBuf, WindCheckError> {
    dirs::data_dir()
        .ok_or(WindCheckError::DataDirResolution)
        .map(|p| p.join(DATA_DIR_NAME))
}

pub async fn ensure_data_dir_exists(path: &Path) -> Result<(), WindCheckError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(WindCheckError::DataDir(
                    path.to_path_buf(),
                    io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
                ));
            }
            Ok(())
        }
        Err(e) => Err(WindCheckError::DataDir(path.to_path_buf(), e)),
    }
}

pub fn catalog_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CATALOG_FILE_NAME)
}

pub fn measurements_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(MEASUREMENTS_DIR_NAME)
}
