//! Reading record text from disk.
//!
//! A record comes either as a plain `.sgf` file or as a `.zip` archive holding
//! exactly one `.sgf` entry.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::error::{Result, TutorError};

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Read the record text at `path`.
///
/// # Errors
/// - `UnsupportedSource` - neither `.sgf` nor `.zip`
/// - `Archive` - unreadable archive, or not exactly one `.sgf` entry
/// - `Io` - the file cannot be read
pub fn read_record(path: &Path) -> Result<String> {
    let name = path.to_string_lossy();
    if has_extension(&name, "sgf") {
        fs::read_to_string(path)
            .map_err(|source| TutorError::io(format!("read record {name}"), source))
    } else if has_extension(&name, "zip") {
        read_zipped_record(path)
    } else {
        Err(TutorError::UnsupportedSource {
            path: name.into_owned(),
        })
    }
}

fn read_zipped_record(path: &Path) -> Result<String> {
    let name = path.display().to_string();
    let archive_err = |reason: String| TutorError::Archive {
        path: name.clone(),
        reason,
    };

    let file = File::open(path)
        .map_err(|source| TutorError::io(format!("open archive {name}"), source))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;

    let records: Vec<String> = archive
        .file_names()
        .filter(|n| !n.ends_with('/') && has_extension(n, "sgf"))
        .map(str::to_string)
        .collect();
    let entry_name = match records.as_slice() {
        [] => return Err(archive_err("no SGF file in archive".to_string())),
        [one] => one.clone(),
        _ => {
            return Err(archive_err(format!(
                "more than one SGF file in archive ({})",
                records.len()
            )));
        }
    };

    let mut entry = archive
        .by_name(&entry_name)
        .map_err(|e| archive_err(e.to_string()))?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|source| TutorError::io(format!("read {entry_name} from {name}"), source))?;
    log::info!("read {entry_name} ({} bytes) from {name}", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_plain_sgf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lines.sgf");
        fs::write(&path, "(;B[dd])").unwrap();
        assert_eq!(read_record(&path).unwrap(), "(;B[dd])");
    }

    #[test]
    fn test_single_entry_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lines.zip");
        write_zip(&path, &[("readme.txt", "hello"), ("kjd/lines.SGF", "(;B[pd])")]);
        assert_eq!(read_record(&path).unwrap(), "(;B[pd])");
    }

    #[test]
    fn test_zip_without_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.zip");
        write_zip(&path, &[("readme.txt", "hello")]);
        assert!(matches!(read_record(&path), Err(TutorError::Archive { .. })));
    }

    #[test]
    fn test_zip_with_two_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("two.zip");
        write_zip(&path, &[("a.sgf", "(;B[dd])"), ("b.sgf", "(;B[pd])")]);
        let err = read_record(&path).unwrap_err();
        assert!(err.to_string().contains("more than one"), "{err}");
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            read_record(Path::new("lines.txt")),
            Err(TutorError::UnsupportedSource { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_record(Path::new("/nonexistent_12345/lines.sgf")),
            Err(TutorError::Io { .. })
        ));
    }
}
