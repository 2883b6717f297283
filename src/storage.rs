//! Local persistence of users created or edited on this machine.
//!
//! The slot is a single JSON array file, rewritten in full on every change.
//! Every persisted mutation in the app goes through [`LocalStore`].
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Context, Result};
use crate::model::User;
use crate::store::{UserAction, UserStore};

/// File name of the persisted slot inside the data directory.
pub const STORAGE_FILE: &str = "customUsers.json";

#[derive(Clone, Debug)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted users. A missing file is an empty list; so is a
    /// corrupt one, after a warning.
    pub fn load(&self) -> Vec<User> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read local users");
                return Vec::new();
            }
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<User>>(&raw) {
            Ok(users) => users,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "local users file is corrupt, ignoring it");
                Vec::new()
            }
        }
    }

    /// Overwrite the slot with `users`.
    pub fn save(&self, users: &[User]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_ctx(|| format!("creating {}", dir.display()))?;
        }
        let body = serde_json::to_string_pretty(users).with_ctx(|| "encoding local users".to_string())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_ctx(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_ctx(|| format!("replacing {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = users.len(), "saved local users");
        Ok(())
    }

    pub fn find(&self, email: &str) -> Option<User> {
        self.load().into_iter().find(|u| u.email == email)
    }

    /// Put persisted users the store does not know (by email) back into it.
    /// Adds prepend, so walking the slot backwards keeps its newest-first order.
    pub fn reconcile(&self, store: &mut UserStore) -> usize {
        let mut added = 0;
        for user in self.load().into_iter().rev() {
            if !store.contains_email(&user.email) {
                store.dispatch(UserAction::Add(user));
                added += 1;
            }
        }
        if added > 0 {
            info!(added, "restored local users");
        }
        added
    }

    /// Persist a newly created user at the front; an entry with the same email is replaced.
    pub fn record_added(&self, user: &User) -> Result<()> {
        let mut users = self.load();
        let user = user.clone().flagged();
        match users.iter().position(|u| u.email == user.email) {
            Some(pos) => users[pos] = user,
            None => users.insert(0, user),
        }
        self.save(&users)
    }

    /// Replace the record stored under `original_email` in place. A user that
    /// was never persisted (a remote one) is stored as a new local copy.
    pub fn record_edited(&self, original_email: &str, user: &User) -> Result<()> {
        let mut users = self.load();
        let user = user.clone().flagged();
        match users.iter().position(|u| u.email == original_email) {
            Some(pos) => users[pos] = user,
            None => users.insert(0, user),
        }
        self.save(&users)
    }

    pub fn record_removed(&self, email: &str) -> Result<()> {
        let mut users = self.load();
        let before = users.len();
        users.retain(|u| u.email != email);
        if users.len() == before && !self.path.exists() {
            return Ok(());
        }
        self.save(&users)
    }
}
