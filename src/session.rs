use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::entities::Session;
use crate::error::{storage_error, Error};

pub const STORAGE_KEY: &str = "cabmatch.session";

/// Durable key/value storage local to this client.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// One file per key inside a directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;

        // replace atomically
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = self.entries.lock().map_err(storage_error)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(storage_error)?;
        entries.insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(storage_error)?;
        entries.remove(key);
        Ok(())
    }
}

/// Owns the persisted identity of the signed-in user. The composition root
/// creates one at startup and hands it to whatever needs the session.
pub struct SessionStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
    pub fn save(&self, session: &Session) -> Result<(), Error> {
        let raw = serde_json::to_string(session)?;
        self.storage.set(STORAGE_KEY, &raw)
    }

    /// Returns the stored session. Content that no longer parses is removed
    /// and treated as no session at all.
    #[tracing::instrument(skip_all)]
    pub fn load(&self) -> Result<Option<Session>, Error> {
        let raw = match self.storage.get(STORAGE_KEY)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!("discarding unreadable session record: {}", err);
                self.storage.remove(STORAGE_KEY)?;
                Ok(None)
            }
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn clear(&self) -> Result<(), Error> {
        self.storage.remove(STORAGE_KEY)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;
    use uuid::Uuid;

    use super::*;
    use crate::entities::UserType;

    fn rider() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            user_type: UserType::Rider,
            token: Some("rider_token".into()),
            name: Some("Ravi".into()),
            phone: Some("9000000002".into()),
            vehicle_no: None,
        }
    }

    #[test]
    fn load_returns_saved_session() {
        let store = SessionStore::new(MemoryStorage::default());
        let session = rider();

        assert_ok!(store.save(&session));

        assert_eq!(store.load().unwrap(), Some(session));
    }

    #[test]
    fn empty_storage_has_no_session() {
        let store = SessionStore::new(MemoryStorage::default());

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_record_is_cleared() {
        let store = SessionStore::new(MemoryStorage::default());
        assert_ok!(store.save(&rider()));
        assert_ok!(store.storage().set(STORAGE_KEY, "{\"userId\": 42"));

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn clear_removes_session() {
        let store = SessionStore::new(MemoryStorage::default());
        assert_ok!(store.save(&rider()));

        assert_ok!(store.clear());

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_storage_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let session = rider();

        SessionStore::new(FileStorage::new(dir.path().join("nested")))
            .save(&session)
            .unwrap();

        let reopened = SessionStore::new(FileStorage::new(dir.path().join("nested")));
        assert_eq!(reopened.load().unwrap(), Some(session));

        assert_ok!(reopened.clear());
        assert_ok!(reopened.clear());
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn file_storage_clears_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(FileStorage::new(dir.path()));
        fs::write(dir.path().join(format!("{}.json", STORAGE_KEY)), "not json").unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!dir.path().join(format!("{}.json", STORAGE_KEY)).exists());
    }
}
