//! Persisted session state.
//!
//! The session lives in a small key-value store that survives restarts (the
//! browser's local storage in the web frontend, a JSON file here). Only the
//! credentials are persisted; the cart is never written to it.
//!
//! # Keys
//!
//! | key | value |
//! |---|---|
//! | `token` | API session token |
//! | `userType` | `user` or `shop` |
//! | `shopName` / `shopEmail` | remembered between shop sign-up and setup |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use drovo_core::UserType;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_TYPE_KEY: &str = "userType";
pub const SHOP_NAME_KEY: &str = "shopName";
pub const SHOP_EMAIL_KEY: &str = "shopEmail";

/// Errors from the persisted store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A string key-value store that outlives the process.
pub trait SessionStore: Send {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Delete a value; deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the change could not be persisted.
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// Store that forgets everything when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = values.len(), "Session store opened");
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        write_private(&self.path, json.as_bytes())?;
        Ok(())
    }
}

/// Write `contents` to `path`, readable by the owner only.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Authentication state rehydrated from a [`SessionStore`].
pub struct Session {
    store: Box<dyn SessionStore>,
    token: Option<SecretString>,
    user_type: UserType,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Rehydrate the session persisted in `store`.
    ///
    /// An unreadable user type falls back to a customer session.
    #[must_use]
    pub fn restore(store: Box<dyn SessionStore>) -> Self {
        let token = store
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        let user_type = store
            .get(USER_TYPE_KEY)
            .and_then(|raw| {
                raw.parse::<UserType>()
                    .inspect_err(|e| warn!(error = %e, "Ignoring stored user type"))
                    .ok()
            })
            .unwrap_or_default();

        debug!(authenticated = token.is_some(), %user_type, "Session restored");
        Self {
            store,
            token,
            user_type,
        }
    }

    /// A guest session that is never persisted.
    #[must_use]
    pub fn guest() -> Self {
        Self::restore(Box::new(MemoryStore::new()))
    }

    /// The session token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Store a fresh token and account type.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be written.
    pub fn login(&mut self, token: SecretString, user_type: UserType) -> Result<(), SessionError> {
        self.store.set(TOKEN_KEY, token.expose_secret())?;
        self.store.set(USER_TYPE_KEY, &user_type.to_string())?;
        self.token = Some(token);
        self.user_type = user_type;
        info!(%user_type, "Logged in");
        Ok(())
    }

    /// Drop the token and fall back to a customer (guest) session.
    ///
    /// In-memory state is reset even if persisting the change fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be written.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.token = None;
        self.user_type = UserType::User;
        self.store.remove(TOKEN_KEY)?;
        self.store.set(USER_TYPE_KEY, &UserType::User.to_string())?;
        info!("Logged out");
        Ok(())
    }

    /// Remember a shop's name and email between sign-up and setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be written.
    pub fn remember_shop(&mut self, name: &str, email: &str) -> Result<(), SessionError> {
        self.store.set(SHOP_NAME_KEY, name)?;
        self.store.set(SHOP_EMAIL_KEY, email)
    }

    /// Forget the remembered shop details once setup is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be written.
    pub fn forget_shop(&mut self) -> Result<(), SessionError> {
        self.store.remove(SHOP_NAME_KEY)?;
        self.store.remove(SHOP_EMAIL_KEY)
    }

    #[must_use]
    pub fn shop_name(&self) -> Option<String> {
        self.store.get(SHOP_NAME_KEY)
    }

    #[must_use]
    pub fn shop_email(&self) -> Option<String> {
        self.store.get(SHOP_EMAIL_KEY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("drovo-session-{}-{name}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_guest_session() {
        let session = Session::guest();
        assert!(!session.is_authenticated());
        assert_eq!(session.user_type(), UserType::User);
    }

    #[test]
    fn test_login_and_logout() {
        let mut session = Session::guest();
        session
            .login(SecretString::from("tok-123"), UserType::Shop)
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().expose_secret(), "tok-123");
        assert_eq!(session.user_type(), UserType::Shop);

        session.logout().unwrap();
        assert!(session.token().is_none());
        assert_eq!(session.user_type(), UserType::User);
    }

    #[test]
    fn test_restore_from_store() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "persisted").unwrap();
        store.set(USER_TYPE_KEY, "shop").unwrap();

        let session = Session::restore(Box::new(store));
        assert_eq!(session.token().unwrap().expose_secret(), "persisted");
        assert_eq!(session.user_type(), UserType::Shop);
    }

    #[test]
    fn test_restore_ignores_garbage() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "").unwrap();
        store.set(USER_TYPE_KEY, "superuser").unwrap();

        let session = Session::restore(Box::new(store));
        assert!(!session.is_authenticated());
        assert_eq!(session.user_type(), UserType::User);
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut session = Session::guest();
        session
            .login(SecretString::from("very-secret"), UserType::User)
            .unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let mut session = Session::restore(Box::new(FileStore::open(&path).unwrap()));
            session
                .login(SecretString::from("file-token"), UserType::User)
                .unwrap();
            session.remember_shop("Gokul Dairy", "gokul@drovo.in").unwrap();
        }

        let session = Session::restore(Box::new(FileStore::open(&path).unwrap()));
        assert_eq!(session.token().unwrap().expose_secret(), "file-token");
        assert_eq!(session.shop_name().as_deref(), Some("Gokul Dairy"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("mode");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        // A pre-existing world-readable file is tightened on the next write
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "file-token").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        std::fs::remove_file(&path).unwrap();
        store.set(TOKEN_KEY, "fresh-token").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(SessionError::Parse(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
