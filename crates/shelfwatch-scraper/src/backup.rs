//! Backup snapshot loading.
//!
//! A backup snapshot is a previously captured JSON dump of a retailer's raw
//! listings — `[{name, price, image_url, product_url}, ...]` — used as the
//! fallback source when the live scrape fails. The pipeline only ever reads
//! these files.

use std::path::Path;

use shelfwatch_core::RawListing;

use crate::error::ScraperError;

/// Reads and parses a backup snapshot file.
///
/// # Errors
///
/// Returns [`ScraperError::BackupIo`] if the file cannot be read, or
/// [`ScraperError::BackupParse`] if it is not a JSON array of raw listings.
pub fn load_backup_snapshot(path: &Path) -> Result<Vec<RawListing>, ScraperError> {
    let content = std::fs::read_to_string(path).map_err(|e| ScraperError::BackupIo {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ScraperError::BackupParse {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    /// Writes `content` to a unique temp file and returns its path.
    fn temp_snapshot(test_name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "shelfwatch-backup-{test_name}-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("create temp snapshot");
        file.write_all(content.as_bytes())
            .expect("write temp snapshot");
        path
    }

    #[test]
    fn loads_well_formed_snapshot() {
        let path = temp_snapshot(
            "ok",
            r#"[{"name": "BDF Chicken 1kg", "price": "$500.00",
                 "image_url": null, "product_url": "/p/1"},
                {"name": "Rice 2kg", "price": "$300.00"}]"#,
        );
        let listings = load_backup_snapshot(&path).expect("snapshot should load");
        std::fs::remove_file(&path).ok();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name, "BDF Chicken 1kg");
        assert_eq!(listings[1].product_url, None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("shelfwatch-backup-definitely-missing.json");
        let err = load_backup_snapshot(&path).unwrap_err();
        assert!(matches!(err, ScraperError::BackupIo { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let path = temp_snapshot("bad", "{not json");
        let err = load_backup_snapshot(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ScraperError::BackupParse { .. }));
    }

    #[test]
    fn empty_array_is_valid_and_empty() {
        let path = temp_snapshot("empty", "[]");
        let listings = load_backup_snapshot(&path).expect("snapshot should load");
        std::fs::remove_file(&path).ok();
        assert!(listings.is_empty());
    }
}
