//! Credential kept in a small file under the user's data directory.

use farmstand_application::{Credential, CredentialStore, CredentialStoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the bearer credential as a single line of text.
///
/// On unix the file is created with mode 0600.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/farmstand/credential`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("farmstand").join("credential"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Credential::new(token)))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_private(&self.path, credential.expose())?;
        debug!("Credential saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Credential removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_signed_out() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credential"));
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("farmstand").join("credential");
        let store = FileCredentialStore::new(&path);

        store.save(&Credential::new("abc")).unwrap();
        assert!(path.exists());
        assert_eq!(store.load().unwrap(), Some(Credential::new("abc")));

        store.save(&Credential::new("def")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credential::new("def")));

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_blank_file_is_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credential");
        fs::write(&path, "  \n").unwrap();
        assert!(FileCredentialStore::new(path).load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credential");
        FileCredentialStore::new(&path)
            .save(&Credential::new("abc"))
            .unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
