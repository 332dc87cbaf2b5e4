//! Atomic TOML documents guarded by an exclusive lock file.

use fms_core::FmsError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic TOML operations.
#[derive(Debug)]
pub enum AtomicTomlError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Lock(String),
}

impl std::fmt::Display for AtomicTomlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicTomlError::Io(e) => write!(f, "I/O error: {}", e),
            AtomicTomlError::Parse(e) => write!(f, "TOML parse error: {}", e),
            AtomicTomlError::Serialize(e) => write!(f, "TOML serialization error: {}", e),
            AtomicTomlError::Lock(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicTomlError {}

impl From<std::io::Error> for AtomicTomlError {
    fn from(e: std::io::Error) -> Self {
        AtomicTomlError::Io(e)
    }
}

impl From<toml::de::Error> for AtomicTomlError {
    fn from(e: toml::de::Error) -> Self {
        AtomicTomlError::Parse(e)
    }
}

impl From<toml::ser::Error> for AtomicTomlError {
    fn from(e: toml::ser::Error) -> Self {
        AtomicTomlError::Serialize(e)
    }
}

impl From<AtomicTomlError> for FmsError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Io(e) => FmsError::from(e),
            AtomicTomlError::Parse(e) => FmsError::from(e),
            AtomicTomlError::Serialize(e) => FmsError::from(e),
            AtomicTomlError::Lock(message) => FmsError::io(message),
        }
    }
}

/// A single TOML document on disk.
///
/// Writes go to a sibling temp file, are fsynced, then renamed over the
/// target, so readers never observe a half-written document. `update` holds
/// an exclusive lock across read-modify-write.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing or blank file yields `None`.
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&content)?))
    }

    /// Replaces the document atomically.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(rendered.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under an exclusive lock. Returns the written value.
    ///
    /// A document that no longer parses is replaced, starting from the default.
    pub fn update<F>(&self, f: F) -> Result<T, AtomicTomlError>
    where
        T: Default,
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = match self.load() {
            Ok(data) => data.unwrap_or_default(),
            Err(AtomicTomlError::Parse(e)) => {
                tracing::warn!(
                    "[AtomicToml] Replacing unreadable {:?}: {}",
                    self.path,
                    e
                );
                T::default()
            }
            Err(e) => return Err(e),
        };
        f(&mut data);
        self.save(&data)?;
        Ok(data)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        let invalid = |what: &str| {
            AtomicTomlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Path has no {}", what),
            ))
        };
        let parent = self.path.parent().ok_or_else(|| invalid("parent directory"))?;
        let file_name = self.path.file_name().ok_or_else(|| invalid("file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// The state file holds a bearer token; keep it private to the user.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Exclusive lock held until the handle is dropped.
///
/// The lock file itself stays on disk; removing it would let a waiter and a
/// newcomer lock different inodes.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicTomlError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        visits: u32,
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Prefs>::new(dir.path().join("missing.toml"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Prefs>::new(dir.path().join("nested/prefs.toml"));
        let prefs = Prefs {
            theme: "dark".into(),
            visits: 3,
        };

        file.save(&prefs).unwrap();

        assert_eq!(file.load().unwrap(), Some(prefs));
        assert!(!dir.path().join("nested/.prefs.toml.tmp").exists());
    }

    #[test]
    fn test_update_starts_from_default() {
        let dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Prefs>::new(dir.path().join("prefs.toml"));

        file.update(|p| p.visits += 1).unwrap();
        let written = file.update(|p| p.visits += 1).unwrap();

        assert_eq!(written.visits, 2);
        assert_eq!(file.load().unwrap().unwrap().visits, 2);
    }

    #[test]
    fn test_lock_file_outlives_update() {
        let dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Prefs>::new(dir.path().join("prefs.toml"));

        file.update(|p| p.visits += 1).unwrap();

        assert!(dir.path().join("prefs.lock").exists());
        let written = file.update(|p| p.visits += 1).unwrap();
        assert_eq!(written.visits, 2);
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "theme = [not toml").unwrap();

        let file = AtomicTomlFile::<Prefs>::new(path);
        assert!(matches!(file.load(), Err(AtomicTomlError::Parse(_))));
    }

    #[test]
    fn test_update_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "theme = [not toml").unwrap();

        let file = AtomicTomlFile::<Prefs>::new(path);
        let written = file.update(|p| p.theme = "dark".into()).unwrap();

        assert_eq!(written.visits, 0);
        assert_eq!(file.load().unwrap(), Some(written));
    }
}
