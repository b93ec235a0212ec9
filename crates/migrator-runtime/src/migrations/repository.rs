//! Filesystem access to migration scripts.
//!
//! Stateless: every call goes back to the directory. Only the top level of the
//! directory is scanned and only regular files ending in `.sql` are considered.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use migrator_core::error::{MigratorError, Result};
use tracing::debug;

const SCRIPT_EXTENSION: &str = "sql";

/// A discovered script file, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    /// File name including the extension, e.g. `0002_add_price.sql`.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
}

/// A script whose content has been read and validated as non-blank.
#[derive(Debug, Clone)]
pub struct MigrationScript {
    pub name: String,
    pub content: String,
}

/// List the `*.sql` files at the top level of `dir`, in directory listing order.
pub async fn list_scripts(dir: &Path) -> Result<Vec<ScriptFile>> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(MigratorError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            return Err(MigratorError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => return Err(MigratorError::Io(e)),
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut scripts = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e != SCRIPT_EXTENSION).unwrap_or(true) {
            continue;
        }
        // Follows symlinks: a linked script counts, a linked directory or dangling link does not.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => continue,
        }

        scripts.push(ScriptFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }

    if scripts.is_empty() {
        return Err(MigratorError::NoScriptsFound {
            path: dir.to_path_buf(),
        });
    }

    debug!(count = scripts.len(), dir = %dir.display(), "Discovered migration scripts");
    Ok(scripts)
}

/// Read a script's full text. Blank content is an error, never skipped.
pub async fn read_script(file: &ScriptFile) -> Result<MigrationScript> {
    let content = tokio::fs::read_to_string(&file.path).await?;

    if content.trim().is_empty() {
        return Err(MigratorError::EmptyScript {
            path: file.path.clone(),
        });
    }

    Ok(MigrationScript {
        name: file.name.clone(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_core::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn names(scripts: &[ScriptFile]) -> Vec<String> {
        let mut names: Vec<String> = scripts.iter().map(|s| s.name.clone()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_list_nonexistent_dir() {
        let err = list_scripts(Path::new("/nonexistent/MigrationScripts"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    }

    #[tokio::test]
    async fn test_list_path_that_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("0001_init.sql");
        fs::write(&file, "SELECT 1;").unwrap();

        let err = list_scripts(&file).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    }

    #[tokio::test]
    async fn test_list_empty_dir() {
        let dir = TempDir::new().unwrap();
        let err = list_scripts(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoScriptsFound);
    }

    #[tokio::test]
    async fn test_list_ignores_non_sql() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("0001_init.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("readme.txt"), "Not a migration").unwrap();
        fs::write(dir.path().join("backup.sql.bak"), "Backup").unwrap();
        fs::write(dir.path().join("sql"), "No extension").unwrap();

        let scripts = list_scripts(dir.path()).await.unwrap();
        assert_eq!(names(&scripts), vec!["0001_init.sql"]);
        assert_eq!(scripts[0].path, dir.path().join("0001_init.sql"));
    }

    #[tokio::test]
    async fn test_list_only_non_sql_is_no_scripts_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();

        let err = list_scripts(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoScriptsFound);
    }

    #[tokio::test]
    async fn test_list_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("0009_old.sql"), "SELECT 9;").unwrap();
        fs::create_dir(dir.path().join("0099_dir.sql")).unwrap();
        fs::write(dir.path().join("0001_init.sql"), "SELECT 1;").unwrap();

        let scripts = list_scripts(dir.path()).await.unwrap();
        assert_eq!(names(&scripts), vec!["0001_init.sql"]);
    }

    #[tokio::test]
    async fn test_read_script() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0001_init.sql");
        fs::write(&path, "CREATE TABLE IF NOT EXISTS tours (id UUID);\n").unwrap();

        let file = ScriptFile {
            name: "0001_init.sql".into(),
            path,
        };
        let script = read_script(&file).await.unwrap();
        assert_eq!(script.name, "0001_init.sql");
        assert_eq!(script.content, "CREATE TABLE IF NOT EXISTS tours (id UUID);\n");
    }

    #[tokio::test]
    async fn test_read_whitespace_script_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0002_blank.sql");
        fs::write(&path, "  \n\t\r\n ").unwrap();

        let file = ScriptFile {
            name: "0002_blank.sql".into(),
            path: path.clone(),
        };
        match read_script(&file).await.unwrap_err() {
            MigratorError::EmptyScript { path: reported } => assert_eq!(reported, path),
            other => panic!("expected EmptyScript, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let file = ScriptFile {
            name: "0001_gone.sql".into(),
            path: PathBuf::from("/nonexistent/0001_gone.sql"),
        };
        assert_eq!(read_script(&file).await.unwrap_err().kind(), ErrorKind::Io);
    }
}
