use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::mandala::Mandala;
use crate::model::settings::Settings;

/// File holding the current tree
pub const TREE_FILE: &str = "mandala.json";
/// File holding the settings record
pub const SETTINGS_FILE: &str = "settings.toml";

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("could not serialize tree: {0}")]
    TreeSerializeError(#[from] serde_json::Error),
    #[error("could not serialize settings: {0}")]
    SettingsSerializeError(#[from] toml::ser::Error),
}

/// Load/save of the tree and of the settings. The two records are
/// independent: saving one never touches the other.
pub trait Store {
    /// The persisted tree, or `None` when nothing has been saved yet
    fn load_tree(&self) -> Result<Option<Mandala>, StoreError>;
    fn save_tree(&self, mandala: &Mandala) -> Result<(), StoreError>;
    /// The persisted settings, or `None` when nothing has been saved yet
    fn load_settings(&self) -> Result<Option<Settings>, StoreError>;
    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;
    /// Set aside an unreadable tree record so it isn't overwritten
    fn quarantine_tree(&self) {}
}

/// Resolve the data directory: explicit override, then `$MANDALA_HOME`,
/// then `$XDG_DATA_HOME/mandala`, then `~/.local/share/mandala`.
pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var("MANDALA_HOME")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_home.join("mandala")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Write a file atomically: temp file in the same directory, then rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Store backed by two files in a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tree_path(&self) -> PathBuf {
        self.dir.join(TREE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn write(path: &Path, content: &str) -> Result<(), StoreError> {
        atomic_write(path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Store for FileStore {
    fn load_tree(&self) -> Result<Option<Mandala>, StoreError> {
        let path = self.tree_path();
        let Some(text) = Self::read_optional(&path)? else {
            return Ok(None);
        };
        let mandala: Mandala = serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if !mandala.is_well_formed() {
            return Err(StoreError::Corrupt {
                path,
                message: "tree does not have the 1 + 8 + 64 cell shape".to_string(),
            });
        }
        Ok(Some(mandala))
    }

    fn save_tree(&self, mandala: &Mandala) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(mandala)?;
        Self::write(&self.tree_path(), &content)
    }

    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        let path = self.settings_path();
        let Some(text) = Self::read_optional(&path)? else {
            return Ok(None);
        };
        toml::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path,
                message: e.to_string(),
            })
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(settings)?;
        Self::write(&self.settings_path(), &content)
    }

    fn quarantine_tree(&self) {
        let path = self.tree_path();
        let bak = path.with_extension("json.bak");
        match fs::copy(&path, &bak) {
            Ok(_) => tracing::info!(backup = %bak.display(), "backed up unreadable tree"),
            Err(e) => tracing::warn!(error = %e, "could not back up unreadable tree"),
        }
    }
}

/// Load the tree at start-up. Nothing saved gives the placeholder tree; an
/// unreadable record is quarantined, logged, and replaced by the placeholder.
pub fn load_tree_or_placeholder(store: &dyn Store) -> Mandala {
    match store.load_tree() {
        Ok(Some(mandala)) => mandala,
        Ok(None) => {
            tracing::info!("no saved tree; using placeholder");
            Mandala::placeholder()
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not load saved tree; using placeholder");
            if matches!(e, StoreError::Corrupt { .. }) {
                store.quarantine_tree();
            }
            Mandala::placeholder()
        }
    }
}

/// Load settings at start-up, falling back to defaults on any failure.
pub fn load_settings_or_default(store: &dyn Store) -> Settings {
    match store.load_settings() {
        Ok(Some(settings)) => settings,
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not load settings; using defaults");
            Settings::default()
        }
    }
}

/// In-memory store, for tests and for running without a data directory
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub tree: RefCell<Option<Mandala>>,
    pub settings: RefCell<Option<Settings>>,
    /// Number of successful tree saves
    pub tree_saves: RefCell<usize>,
    /// Make every save fail
    pub fail_writes: bool,
}

impl MemoryStore {
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteError {
                path: PathBuf::from("<memory>"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "writes disabled"),
            });
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn load_tree(&self) -> Result<Option<Mandala>, StoreError> {
        Ok(self.tree.borrow().clone())
    }

    fn save_tree(&self, mandala: &Mandala) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.tree.borrow_mut() = Some(mandala.clone());
        *self.tree_saves.borrow_mut() += 1;
        Ok(())
    }

    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        Ok(self.settings.borrow().clone())
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.settings.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}
