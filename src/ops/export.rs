use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::io::store::{StoreError, atomic_write};
use crate::model::mandala::Mandala;
use crate::parse::serialize_outline;

/// `mandala-YYYY-MM-DD.md`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("mandala-{}.md", date.format("%Y-%m-%d"))
}

/// Today's export file name in `dir`
pub fn default_export_path(dir: &Path) -> PathBuf {
    dir.join(export_file_name(Local::now().date_naive()))
}

/// Serialize the tree and write it to `path`
pub fn export_to_file(mandala: &Mandala, path: &Path) -> Result<(), StoreError> {
    let text = serialize_outline(mandala);
    atomic_write(path, text.as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), bytes = text.len(), "exported outline");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_outline;
    use tempfile::TempDir;

    #[test]
    fn file_name_carries_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "mandala-2024-03-07.md");
    }

    #[test]
    fn default_path_is_in_dir() {
        let path = default_export_path(Path::new("/tmp/out"));
        assert_eq!(path.parent(), Some(Path::new("/tmp/out")));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("mandala-") && name.ends_with(".md"));
        assert_eq!(name.len(), "mandala-YYYY-MM-DD.md".len());
    }

    #[test]
    fn exported_file_reimports() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.md");
        let m = Mandala::placeholder();
        export_to_file(&m, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_outline(&text).unwrap(), m);
    }
}
