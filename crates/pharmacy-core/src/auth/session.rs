use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::UserProfile;

/// Session file name in the cache directory
pub const SESSION_FILE: &str = "session.json";

/// What a successful login leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub csrf_token: Option<String>,
    pub stored_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(user: Option<UserProfile>, csrf_token: Option<String>) -> Self {
        Self {
            user,
            csrf_token,
            stored_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.role.as_deref())
    }
}

/// Persistent backing for the session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionData>>;
    fn save(&self, data: &SessionData) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session persisted as JSON on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        let data = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Session kept only for the lifetime of the process.
#[derive(Default)]
pub struct MemorySessionStore {
    data: Mutex<Option<SessionData>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        Ok(self.data.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = Some(data.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Shared handle to the current session.
///
/// Clone is cheap; all clones see the same state. Writes replace the whole
/// session (last writer wins) and go to the store after memory is updated.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    data: Arc<RwLock<Option<SessionData>>>,
}

impl SessionContext {
    /// Empty session on top of `store`, ignoring whatever it holds
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            data: Arc::new(RwLock::new(None)),
        }
    }

    /// Session seeded from what `store` persisted earlier
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self> {
        let data = store.load()?;
        debug!(restored = data.is_some(), "Session loaded");
        Ok(Self {
            store,
            data: Arc::new(RwLock::new(data)),
        })
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    pub async fn csrf_token(&self) -> Option<String> {
        self.data.read().await.as_ref().and_then(|d| d.csrf_token.clone())
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.data.read().await.as_ref().and_then(|d| d.user.clone())
    }

    pub async fn snapshot(&self) -> Option<SessionData> {
        self.data.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.data.read().await.is_some()
    }

    /// Replace the session with a fresh login result.
    ///
    /// Memory is always updated; the returned error only reports that the
    /// store could not persist it.
    pub async fn establish(&self, user: Option<UserProfile>, csrf_token: Option<String>) -> Result<()> {
        let data = SessionData::new(user, csrf_token);
        *self.data.write().await = Some(data.clone());
        // Lock released before touching the store
        self.store.save(&data)
    }

    pub async fn clear(&self) -> Result<()> {
        *self.data.write().await = None;
        self.store.clear()
    }
}
