//! Whole-collection JSON file persistence
//!
//! One file, one JSON array, overwritten in full on every mutation. The
//! store is best-effort by design: a missing or malformed file loads as an
//! empty collection, and write failures are logged rather than surfaced —
//! the in-memory roster stays the source of truth for the session.

use std::fs;
use std::path::{Path, PathBuf};

use crate::user::User;

pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection. Any failure degrades to an empty list.
    pub fn load(&self) -> Vec<User> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no users file, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "users file is malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the file with the full collection. Failures are logged.
    pub fn save(&self, users: &[User]) {
        if let Err(e) = self.try_save(users) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save users");
        }
    }

    fn try_save(&self, users: &[User]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(users)?;
        // Write to a sibling temp file and rename so a partial file is never
        // observable at the real path.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> UserStore {
        UserStore::new(dir.path().join("users.json"))
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let users = vec![
            User::new("Ana", "Eng", "Paris"),
            User::new("Ben", "Ops", "Lyon"),
            User::new("Chloé", "PM", "Nantes"),
        ];

        store.save(&users);
        assert_eq!(store.load(), users);
    }

    #[test]
    fn test_saving_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let users = vec![User::new("Ana", "Eng", "Paris")];

        store.save(&users);
        store.save(&users);
        assert_eq!(store.load(), users);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_shape_mismatch_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // Valid JSON, wrong shape: treated as total failure, no partial recovery
        fs::write(store.path(), br#"[{"name":"Ana"}]"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path().join("nested/data/users.json"));
        let users = vec![User::new("Ana", "Eng", "Paris")];

        store.save(&users);
        assert_eq!(store.load(), users);
    }

    #[test]
    fn test_ana_scenario_preserves_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let ana = User::new("Ana", "Eng", "Paris");
        let id = ana.id;

        store.save(std::slice::from_ref(&ana));
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, id);
        assert_eq!(loaded[0].name, "Ana");
        assert_eq!(loaded[0].title, "Eng");
        assert_eq!(loaded[0].localisation, "Paris");
    }
}
