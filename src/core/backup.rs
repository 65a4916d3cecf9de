use crate::config::Config;
use crate::db::log::oplog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database file to `dest_file`, optionally zipped.
    ///
    /// Uses `VACUUM INTO` so the copy is consistent even while the
    /// database is open. Returns the final backup path.
    pub fn backup(pool: &DbPool, cfg: &Config, dest_file: &str, compress: bool, force: bool) -> AppResult<PathBuf> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        if !src.exists() {
            return Err(AppError::not_found("Database", src.display()));
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        ensure_writable(dest, force)?;
        if dest.exists() {
            fs::remove_file(dest)?;
        }

        pool.conn
            .execute("VACUUM INTO ?1", [dest.to_string_lossy().as_ref()])?;
        success(format!("Backup created: {}", dest.display()));

        let final_path = if compress {
            let compressed = compress_backup(dest)?;
            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {e}"));
            }
            compressed
        } else {
            dest.to_path_buf()
        };

        oplog(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::InvalidInput(format!("not a file path: {}", path.display())))?;

    let mut f = fs::File::open(path)?;
    zip.start_file(name, options).map_err(std::io::Error::other)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    info(format!("Compressed: {}", zip_path.display()));
    Ok(zip_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::open_db;

    #[test]
    fn backup_and_zip() {
        let dir = std::env::temp_dir().join(format!("cats_backup_test_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let db = dir.join("cats.sqlite");
        let cfg = Config {
            database: db.to_string_lossy().to_string(),
            ..Config::default()
        };
        let pool = open_db(&cfg.database).unwrap();

        let plain = dir.join("copy.sqlite");
        let out = BackupLogic::backup(&pool, &cfg, &plain.to_string_lossy(), false, true).unwrap();
        assert_eq!(out, plain);
        assert!(plain.exists());

        let zipped = dir.join("zipped.sqlite");
        let out = BackupLogic::backup(&pool, &cfg, &zipped.to_string_lossy(), true, true).unwrap();
        assert_eq!(out, dir.join("zipped.zip"));
        assert!(out.exists());
        assert!(!zipped.exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
