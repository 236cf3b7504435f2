//! Places where a credential is persisted between runs

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::auth::Credential;
use crate::error::Result;
use crate::traits::CredentialStore;


/// A credential store backed by a JSON file
#[derive(Clone, Debug, PartialEq)]
pub struct TokenFile {
    backing_file: PathBuf,
}

impl TokenFile {
    pub fn new(path: &Path) -> Self {
        Self { backing_file: PathBuf::from(path) }
    }
}

impl CredentialStore for TokenFile {
    /// A missing file means there is no credential yet.
    /// A file that cannot be parsed (e.g. written by an incompatible version) is ignored, so that a new authorization is performed
    fn load(&self) -> Result<Option<Credential>> {
        let path = &self.backing_file;
        if path.exists() == false {
            log::debug!("No token file at {:?}", path);
            return Ok(None);
        }

        let file = std::fs::File::open(path)?;
        match serde_json::from_reader(file) {
            Err(err) => {
                log::warn!("Invalid token file {:?}: {}. Ignoring it", path, err);
                Ok(None)
            },
            Ok(credential) => Ok(Some(credential)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let path = &self.backing_file;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = create_private_file(path)?;
        serde_json::to_writer_pretty(file, credential)?;
        log::debug!("Credential saved to {:?}", path);
        Ok(())
    }
}

/// Create (or truncate) a file only its owner can read, since it holds secrets
#[cfg(unix)]
fn create_private_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    // `mode` only applies to newly created files
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}


/// A credential store that only lives in memory
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credential: Mutex<Option<Credential>>,
    saves: Mutex<u32>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self { credential: Mutex::new(Some(credential)), saves: Mutex::new(0) }
    }

    /// How many times `save` has been called
    pub fn saves(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

impl CredentialStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.credential.lock().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.credential.lock().unwrap() = Some(credential.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
