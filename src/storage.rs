//! Secure Storage Module
//!
//! Persists the dashboard session between runs. On Windows the payload is
//! encrypted with DPAPI; elsewhere it is written as plain JSON.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, error, debug};

use crate::session::Session;

#[cfg(windows)]
use windows::Win32::Security::Cryptography::{
    CryptProtectData, CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN,
};
#[cfg(windows)]
use windows::Win32::Security::Cryptography::CRYPT_INTEGER_BLOB;

/// Key the session is stored under
pub const SESSION_KEY: &str = "session";

/// Where the session store writes through to
pub trait SessionPersistence: Send + Sync {
    /// Load the persisted session, `None` when nothing was stored
    fn load_session(&self) -> Result<Option<Session>, StorageError>;

    fn save_session(&self, session: &Session) -> Result<(), StorageError>;

    fn clear_session(&self) -> Result<(), StorageError>;
}

/// File-backed key-value storage, one `<key>.dat` file per key
pub struct SecureStorage {
    storage_path: PathBuf,
}

impl SecureStorage {
    /// Create storage in the platform local data directory
    pub fn new() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ConnectDashboard");

        Self::with_path(storage_path)
    }

    /// Create storage rooted at an explicit directory
    pub fn with_path(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();

        if let Err(e) = std::fs::create_dir_all(&storage_path) {
            error!("Failed to create storage directory: {}", e);
        }

        debug!("Secure storage initialized at: {:?}", storage_path);

        Self { storage_path }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Save a value under `key`
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let encrypted = self.encrypt(json.as_bytes())?;

        std::fs::write(self.file_for(key), encrypted)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        debug!("Saved data for key: {}", key);
        Ok(())
    }

    /// Load the value stored under `key`, `None` if the key was never written
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let file_path = self.file_for(key);
        if !file_path.exists() {
            return Ok(None);
        }

        let encrypted = std::fs::read(&file_path)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let decrypted = self.decrypt(&encrypted)?;

        let json = String::from_utf8(decrypted)
            .map_err(|e| StorageError::Decryption(e.to_string()))?;

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Delete stored data; missing keys are not an error
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.file_for(key);

        if file_path.exists() {
            std::fs::remove_file(&file_path)
                .map_err(|e| StorageError::Io(e.to_string()))?;
            info!("Deleted stored data for key: {}", key);
        }

        Ok(())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.file_for(key).exists()
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.storage_path.join(format!("{}.dat", key))
    }

    #[cfg(windows)]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        use std::ptr::null_mut;

        let input = CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        };

        let mut output = CRYPT_INTEGER_BLOB {
            cbData: 0,
            pbData: null_mut(),
        };

        unsafe {
            let result = CryptProtectData(
                &input,
                None,
                None,
                None,
                None,
                CRYPTPROTECT_UI_FORBIDDEN,
                &mut output,
            );

            if result.is_err() {
                return Err(StorageError::Encryption("DPAPI encryption failed".into()));
            }

            let encrypted = std::slice::from_raw_parts(
                output.pbData,
                output.cbData as usize,
            ).to_vec();

            windows::Win32::Foundation::LocalFree(
                windows::Win32::Foundation::HLOCAL(output.pbData as *mut std::ffi::c_void)
            );

            Ok(encrypted)
        }
    }

    #[cfg(windows)]
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        use std::ptr::null_mut;

        let input = CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        };

        let mut output = CRYPT_INTEGER_BLOB {
            cbData: 0,
            pbData: null_mut(),
        };

        unsafe {
            let result = CryptUnprotectData(
                &input,
                None,
                None,
                None,
                None,
                CRYPTPROTECT_UI_FORBIDDEN,
                &mut output,
            );

            if result.is_err() {
                return Err(StorageError::Decryption("DPAPI decryption failed".into()));
            }

            let decrypted = std::slice::from_raw_parts(
                output.pbData,
                output.cbData as usize,
            ).to_vec();

            windows::Win32::Foundation::LocalFree(
                windows::Win32::Foundation::HLOCAL(output.pbData as *mut std::ffi::c_void)
            );

            Ok(decrypted)
        }
    }

    #[cfg(not(windows))]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        Ok(data.to_vec())
    }

    #[cfg(not(windows))]
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        Ok(data.to_vec())
    }
}

impl Default for SecureStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPersistence for SecureStorage {
    fn load_session(&self) -> Result<Option<Session>, StorageError> {
        self.load(SESSION_KEY)
    }

    fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        self.save(SESSION_KEY, session)
    }

    fn clear_session(&self) -> Result<(), StorageError> {
        self.delete(SESSION_KEY)
    }
}

/// Process-local persistence, for embedders without a disk and for tests
#[derive(Default)]
pub struct MemoryStorage {
    session: Mutex<Option<Session>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a session, as if written by an earlier run
    pub fn with_session(session: Session) -> Self {
        Self { session: Mutex::new(Some(session)) }
    }
}

impl SessionPersistence for MemoryStorage {
    fn load_session(&self) -> Result<Option<Session>, StorageError> {
        self.session
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut guard = self.session.lock().map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self.session.lock().map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),
}
