//! SQLite cache location handling for the binary.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

pub const DEFAULT_DB_URL: &str = "sqlite://sheet.sqlite3";

/// Accepts `sqlite::memory:`, `sqlite://...`, `sqlite:path` or a bare path and
/// returns an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_owned();
    }
    if let Some(rest) = trimmed.strip_prefix("sqlite://") {
        if Path::new(rest).is_absolute() {
            return trimmed.to_owned();
        }
        return format!("sqlite://{}", absolute(rest).display());
    }

    let path = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    format!("sqlite://{}", absolute(path).display())
}

fn absolute(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// Create the database file (and its parent directory) so `sqlx` can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_pass_through() {
        assert_eq!(normalize_sqlite_url(" sqlite::memory: "), "sqlite::memory:");
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("data/sheet.sqlite3");
        let path = url.strip_prefix("sqlite://").unwrap();
        assert!(Path::new(path).is_absolute());
        assert!(path.ends_with("data/sheet.sqlite3"));

        let default = normalize_sqlite_url(DEFAULT_DB_URL);
        assert!(Path::new(default.strip_prefix("sqlite://").unwrap()).is_absolute());
    }

    #[test]
    fn absolute_urls_are_kept() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/sheet.sqlite3"),
            "sqlite:///tmp/sheet.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("/tmp/sheet.sqlite3"),
            "sqlite:///tmp/sheet.sqlite3"
        );
    }

    #[test]
    fn rejects_non_sqlite_urls() {
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }
}
