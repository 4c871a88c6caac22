//! Process-wide credential store: the access/refresh token pair, optionally
//! persisted to a JSON document so a session survives restarts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::Error;

/// The token pair. An absent refresh token makes any refresh attempt fail
/// immediately; both slots are always cleared together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Holds the current credentials. Mutated only by the refresh coordinator
/// (successful rotation) and the session terminator (teardown); everything
/// else reads.
pub struct CredentialStore {
    inner: RwLock<Credentials>,
    path: Option<PathBuf>,
}

impl CredentialStore {
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Credentials::default()),
            path: None,
        }
    }

    pub fn with_initial(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
            path: None,
        }
    }

    /// Open a file-backed store, loading whatever pair was persisted by a
    /// previous run. A missing file starts the store empty.
    pub fn open(path: PathBuf) -> Result<Self, Error> {
        let credentials = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Credentials::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            inner: RwLock::new(credentials),
            path: Some(path),
        })
    }

    pub async fn access(&self) -> Option<String> {
        self.inner.read().await.access.clone()
    }

    pub async fn refresh(&self) -> Option<String> {
        self.inner.read().await.refresh.clone()
    }

    pub async fn snapshot(&self) -> Credentials {
        self.inner.read().await.clone()
    }

    /// Install a full pair, e.g. after login or registration.
    pub async fn set_tokens(&self, access: String, refresh: String) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        inner.access = Some(access);
        inner.refresh = Some(refresh);
        self.persist(&inner)
    }

    /// Install the access token produced by a refresh episode. The refresh
    /// token is replaced only when the backend rotated it.
    pub async fn store_refreshed(
        &self,
        access: String,
        rotated_refresh: Option<String>,
    ) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        inner.access = Some(access);
        if let Some(refresh) = rotated_refresh {
            inner.refresh = Some(refresh);
        }
        self.persist(&inner)
    }

    /// Drop both tokens. Never clears one side alone.
    pub async fn clear(&self) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        *inner = Credentials::default();
        self.persist(&inner)
    }

    fn persist(&self, credentials: &Credentials) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        std::fs::write(path, serde_json::to_string(credentials)?)?;
        debug!(path = %path.display(), "credentials persisted");
        Ok(())
    }
}
