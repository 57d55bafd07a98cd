//! Data directory layout.

use std::path::PathBuf;

/// Overrides the data directory.
pub const ENV_DATA_DIR: &str = "ARCHITAI_DATA_DIR";

/// Resolve the ArchitAI data directory.
///
/// Uses `ARCHITAI_DATA_DIR` env var if set, otherwise `~/.architai`, and
/// `./.architai` when no home directory is known.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var(ENV_DATA_DIR) {
        Ok(dir) if !dir.trim().is_empty() => return PathBuf::from(dir),
        _ => {}
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".architai");
    }

    PathBuf::from(".architai")
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &std::path::Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        // Idempotent.
        ensure_data_dir(&nested).await.unwrap();
    }

    #[test]
    fn test_resolve_data_dir_is_never_empty() {
        assert!(!resolve_data_dir().as_os_str().is_empty());
    }
}
