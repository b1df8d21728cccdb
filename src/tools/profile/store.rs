//! JSON-file profile store
//!
//! The whole file is one object keyed by user id. Every update takes an
//! exclusive lock on a sibling `.lock` file, re-reads the file, merges and
//! replaces it atomically, so sessions in other processes never lose each
//! other's writes. Reads always go to disk.

use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{ProfileUpdate, UserProfile};
use crate::core::{Result, SwitchboardError};

type Profiles = BTreeMap<String, UserProfile>;

pub struct ProfileStore {
    path: PathBuf,
    /// Keeps this process's updates off the blocking pool while one holds the file lock
    writer: Mutex<()>,
}

impl ProfileStore {
    /// Open the store at `path`, starting empty when the file does not exist yet.
    /// An existing file must parse.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let profiles = read_profiles(&path)?;

        tracing::debug!(path = %path.display(), users = profiles.len(), "Profile store opened");
        Ok(Self {
            path,
            writer: Mutex::new(()),
        })
    }

    /// The stored profile, if the user has one
    pub async fn get(&self, user_id: &str) -> Option<UserProfile> {
        let path = self.path.clone();
        match blocking(move || read_profiles(&path)).await {
            Ok(mut profiles) => profiles.remove(user_id),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read profile store");
                None
            }
        }
    }

    /// One-line description of what is known about the user
    pub async fn summary(&self, user_id: &str) -> Option<String> {
        self.get(user_id).await.and_then(|p| p.summary())
    }

    /// Merge `update` into the user's profile as currently stored and persist the store
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile> {
        let _writer = self.writer.lock().await;

        let path = self.path.clone();
        let user = user_id.to_string();
        let update = update.clone();
        let profile = blocking(move || update_on_disk(&path, &user, &update)).await?;

        tracing::info!(user_id, "Profile updated");
        Ok(profile)
    }
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| SwitchboardError::Other(format!("Profile store task failed: {}", e)))?
}

fn read_profiles(path: &Path) -> Result<Profiles> {
    if !path.exists() {
        return Ok(Profiles::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Profiles::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Read-merge-write under an exclusive lock on the sibling lock file
fn update_on_disk(path: &Path, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile> {
    std::fs::create_dir_all(parent_dir(path))?;

    // the lock is released when `lock` is closed
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;
    FileExt::lock_exclusive(&lock)?;

    let mut profiles = read_profiles(path)?;
    let profile = profiles.entry(user_id.to_string()).or_default();
    profile.merge(update);
    let profile = profile.clone();

    let json = serde_json::to_string_pretty(&profiles)?;
    write_atomic(path, json.as_bytes())?;
    Ok(profile)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "profiles".into());
    name.push(".lock");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tempfile::NamedTempFile::new_in(parent_dir(path))?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn likes(items: &[&str]) -> ProfileUpdate {
        ProfileUpdate {
            likes: items.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");

        let store = ProfileStore::open(&path).unwrap();
        assert!(store.get("user_001").await.is_none());

        let update = ProfileUpdate {
            name: Some("Dennis".to_string()),
            ..likes(&["Football"])
        };
        store.update("user_001", &update).await.unwrap();

        let reopened = ProfileStore::open(&path).unwrap();
        let profile = reopened.get("user_001").await.unwrap();
        assert_eq!(profile.name, "Dennis");
        assert!(profile.likes.contains("Football"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["user_001"]["likes"][0], "Football");
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ProfileStore::open(dir.path().join("p.json")).unwrap());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.update("u", &likes(&["Chess"])).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.update("u", &likes(&["Tea"])).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let reopened = ProfileStore::open(dir.path().join("p.json")).unwrap();
        assert_eq!(reopened.get("u").await.unwrap().likes.len(), 2);
    }

    #[tokio::test]
    async fn test_profiles_are_kept_per_user() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path().join("p.json")).unwrap();
        store.update("a", &likes(&["Chess"])).await.unwrap();
        store.update("b", &likes(&["Tea"])).await.unwrap();

        assert!(!store.get("a").await.unwrap().likes.contains("Tea"));
        assert_eq!(store.summary("b").await.unwrap(), "The user likes Tea.");
    }

    #[tokio::test]
    async fn test_separate_handles_keep_each_others_updates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        let first = ProfileStore::open(&path).unwrap();
        let second = ProfileStore::open(&path).unwrap();

        first.update("u", &likes(&["Chess"])).await.unwrap();
        let merged = second.update("u", &likes(&["Tea"])).await.unwrap();
        assert_eq!(merged.likes.len(), 2);

        // reads see the other handle's write
        assert_eq!(first.get("u").await.unwrap().likes.len(), 2);
        let reopened = ProfileStore::open(&path).unwrap();
        assert_eq!(reopened.get("u").await.unwrap().likes.len(), 2);
        assert!(dir.path().join("profiles.json.lock").exists());
    }

    #[tokio::test]
    async fn test_concurrent_handles_serialize_on_the_lock_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");

        let updates = ["Chess", "Tea", "Books", "Music"].map(|like| {
            let store = ProfileStore::open(&path).unwrap();
            tokio::spawn(async move { store.update("u", &likes(&[like])).await })
        });
        for update in updates {
            update.await.unwrap().unwrap();
        }

        let reopened = ProfileStore::open(&path).unwrap();
        assert_eq!(reopened.get("u").await.unwrap().likes.len(), 4);
    }

    #[test]
    fn test_corrupt_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(ProfileStore::open(&path).is_err());
    }
}
