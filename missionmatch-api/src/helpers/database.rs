use crate::config::{non_empty, ApiConfig};
use crate::database::Database;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Returns the path to the MissionMatch database
///
/// `[database] path` wins when set. Otherwise the file lives in the local data directory:
///
/// - **macOS**: `~/Library/Application Support/missionmatch/db.sqlite`
/// - **Linux**: `~/.local/share/missionmatch/db.sqlite`
/// - **Windows**: `%LOCALAPPDATA%\missionmatch\db.sqlite`
pub fn get_db_path(config: &ApiConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = config.database.as_ref().and_then(|d| non_empty(&d.path)) {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("missionmatch").join("db.sqlite"))
}

/// Open the database at `db_path`, creating it and running migrations as needed
pub fn initialize_database(db_path: &Path) -> anyhow::Result<Arc<Database>> {
    let db = Database::new(db_path)?;
    tracing::info!("Database initialized at: {}", db_path.display());
    Ok(Arc::new(db))
}
