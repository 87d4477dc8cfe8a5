//! Writing the finished superstring.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

/// Default destination used by the command line tool.
pub const DEFAULT_OUTPUT: &str = "superstring.txt";

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("cannot write output {}: {source}", .path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn unwritable(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + '_ {
    move |source| OutputError::Unwritable {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_OUTPUT.into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` verbatim to `path`: no header, no trailing newline.
pub fn write_superstring<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), OutputError> {
    let path = path.as_ref();
    write_atomic(path, contents.as_bytes())?;
    info!("Superstring ({} bp) written to {}", contents.len(), path.display());
    Ok(())
}

/// Replace `path` with `contents` without ever exposing a partial file.
///
/// Data goes to a sibling `.tmp` file that is renamed into place once synced,
/// and removed again if any step fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(unwritable(path))?;
        }
    }

    let tmp = temp_path(path);
    let result = write_then_rename(&tmp, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_then_rename(tmp: &Path, path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp)
        .map_err(unwritable(path))?;
    file.write_all(contents).map_err(unwritable(path))?;
    file.flush().map_err(unwritable(path))?;
    file.sync_all().map_err(unwritable(path))?;
    drop(file);

    fs::rename(tmp, path).map_err(unwritable(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_raw_contents_without_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("superstring.txt");

        write_superstring(&path, "ATTAGACCTGCCGGAATAC").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ATTAGACCTGCCGGAATAC");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "stale contents that are longer").unwrap();

        write_superstring(&path, "ACGT").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ACGT");
    }

    #[test]
    fn directory_destination_is_unwritable_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        fs::create_dir(&target).unwrap();

        let err = write_superstring(&target, "ACGT").unwrap_err();
        assert!(matches!(err, OutputError::Unwritable { .. }));
        assert!(!temp_path(&target).exists());
    }
}
