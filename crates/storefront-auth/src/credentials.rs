//! Session credentials and the client-side token cache
//!
//! The request pipeline never owns credentials. It reads and writes them
//! through the `CredentialStore` trait, which the application injects.
//! `SessionStore` is the stock implementation: an in-memory session that can
//! optionally be mirrored to a JSON file. File writes use atomic temp-file +
//! rename, and a tokio Mutex serializes concurrent writers so the file always
//! reflects the latest in-memory state.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::Secret;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Bearer credentials issued by the backend at login.
///
/// Expirations are unix timestamps in seconds, as returned by the login
/// endpoint (`access_token_expiration`, `refresh_token_expiration`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: Secret<String>,
    #[serde(default)]
    pub refresh_token: Option<Secret<String>>,
    #[serde(default)]
    pub access_token_expiration: Option<u64>,
    #[serde(default)]
    pub refresh_token_expiration: Option<u64>,
}

impl Credentials {
    /// Credentials without expiry information.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            refresh_token: Some(Secret::new(refresh_token.into())),
            access_token_expiration: None,
            refresh_token_expiration: None,
        }
    }

    /// Whether the access token is past its expiration at `now_secs`.
    ///
    /// Unknown expiration is treated as not expired; the backend's 401 is
    /// the authority in that case.
    pub fn is_access_token_expired(&self, now_secs: u64) -> bool {
        match self.access_token_expiration {
            Some(expires) => now_secs >= expires,
            None => false,
        }
    }
}

/// Everything the token cache persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Client-generated identifier correlating guest activity such as the cart.
    /// Survives logout.
    #[serde(default = "new_device_token")]
    pub device_token: String,
}

impl SessionState {
    /// A signed-out session with a freshly generated device token.
    pub fn anonymous() -> Self {
        Self {
            credentials: None,
            customer_id: None,
            device_token: new_device_token(),
        }
    }
}

fn new_device_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Credential source injected into the request pipeline.
///
/// Reads are synchronous snapshots taken at request-build time. `set_tokens`
/// is called once per successful refresh and may persist, so it is async.
/// Uses `Pin<Box<dyn Future>>` for dyn-compatibility (`Arc<dyn CredentialStore>`).
pub trait CredentialStore: Send + Sync {
    /// Current bearer token, if signed in.
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;

    /// Customer id of the signed-in user.
    fn customer_id(&self) -> Option<String>;

    /// Device identifier sent as `x-device-id`.
    fn device_token(&self) -> Option<String>;

    /// Replace the token pair after a refresh.
    fn set_tokens(
        &self,
        access_token: String,
        refresh_token: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Session store, optionally mirrored to a JSON file.
///
/// Reads go through a `std::sync::RwLock` so they never wait on a pending
/// file write. The tokio Mutex orders writers: mutate, snapshot, persist.
pub struct SessionStore {
    path: Option<PathBuf>,
    state: RwLock<SessionState>,
    writes: Mutex<()>,
}

impl SessionStore {
    /// A signed-out, memory-only session.
    pub fn in_memory() -> Self {
        Self::with_state(SessionState::anonymous())
    }

    /// A memory-only session seeded with `state`.
    pub fn with_state(state: SessionState) -> Self {
        Self {
            path: None,
            state: RwLock::new(state),
            writes: Mutex::new(()),
        }
    }

    /// Load the session cached at `path`.
    ///
    /// If the file doesn't exist, starts a signed-out session with a new
    /// device token and writes it so the device token is stable across runs.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let state: SessionState = serde_json::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing session file: {e}")))?;
            info!(
                path = %path.display(),
                signed_in = state.credentials.is_some(),
                "loaded session"
            );
            state
        } else {
            info!(path = %path.display(), "session file not found, starting signed out");
            let state = SessionState::anonymous();
            write_atomic(&path, &state).await?;
            state
        };

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
            writes: Mutex::new(()),
        })
    }

    /// Clone of the current session.
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// Whether an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.read().credentials.is_some()
    }

    /// Whether the access token is past its expiration at `now_secs`.
    pub fn is_token_expired(&self, now_secs: u64) -> bool {
        self.read()
            .credentials
            .as_ref()
            .is_some_and(|c| c.is_access_token_expired(now_secs))
    }

    /// Store the credentials returned by login or registration.
    pub async fn set_auth_data(
        &self,
        credentials: Credentials,
        customer_id: Option<String>,
    ) -> Result<()> {
        self.mutate(move |state| {
            state.credentials = Some(credentials);
            state.customer_id = customer_id;
        })
        .await
    }

    /// Record the signed-in customer.
    pub async fn set_customer_id(&self, customer_id: String) -> Result<()> {
        self.mutate(move |state| state.customer_id = Some(customer_id))
            .await
    }

    /// Replace the token pair after a refresh.
    ///
    /// The refresh endpoint does not report expirations, so the cached access
    /// expiration is dropped rather than left pointing at the old token.
    pub async fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        self.mutate(move |state| match state.credentials.as_mut() {
            Some(credentials) => {
                credentials.access_token = Secret::new(access_token);
                credentials.refresh_token = Some(Secret::new(refresh_token));
                credentials.access_token_expiration = None;
            }
            None => state.credentials = Some(Credentials::new(access_token, refresh_token)),
        })
        .await
    }

    /// Sign out. The device token is kept so the guest cart survives.
    pub async fn clear(&self) -> Result<()> {
        self.mutate(|state| {
            state.credentials = None;
            state.customer_id = None;
        })
        .await
    }

    async fn mutate(&self, apply: impl FnOnce(&mut SessionState)) -> Result<()> {
        let _writer = self.writes.lock().await;
        let snapshot = {
            let mut state = self.write();
            apply(&mut state);
            state.clone()
        };
        match &self.path {
            Some(path) => write_atomic(path, &snapshot).await,
            None => Ok(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for SessionStore {
    fn access_token(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .map(|c| c.access_token.expose().clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .and_then(|c| c.refresh_token.as_ref())
            .map(|t| t.expose().clone())
    }

    fn customer_id(&self) -> Option<String> {
        self.read().customer_id.clone()
    }

    fn device_token(&self) -> Option<String> {
        Some(self.read().device_token.clone())
    }

    fn set_tokens(
        &self,
        access_token: String,
        refresh_token: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.update_tokens(access_token, refresh_token))
    }
}

/// Write the session to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets file permissions to 0600 (owner read/write only) since
/// the file contains bearer tokens.
async fn write_atomic(path: &Path, state: &SessionState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| Error::CredentialParse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("session path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn signed_in(access: &str, refresh: &str, expires: Option<u64>) -> Credentials {
        Credentials {
            access_token: Secret::from(access),
            refresh_token: Some(Secret::from(refresh)),
            access_token_expiration: expires,
            refresh_token_expiration: None,
        }
    }

    #[test]
    fn anonymous_sessions_get_distinct_device_tokens() {
        let a = SessionState::anonymous();
        let b = SessionState::anonymous();
        assert_ne!(a.device_token, b.device_token);
        assert!(a.credentials.is_none());
    }

    #[tokio::test]
    async fn in_memory_store_exposes_tokens_through_trait() {
        let store = SessionStore::in_memory();
        assert!(store.access_token().is_none());
        assert!(store.device_token().is_some());

        store
            .set_auth_data(signed_in("A1", "R1", None), Some("cust-1".into()))
            .await
            .unwrap();

        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
        assert_eq!(store.customer_id().as_deref(), Some("cust-1"));
    }

    #[tokio::test]
    async fn set_tokens_replaces_pair_and_drops_stale_expiration() {
        let session = Arc::new(SessionStore::with_state(SessionState {
            credentials: Some(signed_in("A1", "R1", Some(100))),
            customer_id: None,
            device_token: "device-1".into(),
        }));
        assert!(session.is_token_expired(101));
        let store: Arc<dyn CredentialStore> = session.clone();

        store.set_tokens("A2".into(), "R2".into()).await.unwrap();

        assert_eq!(store.access_token().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().as_deref(), Some("R2"));
        let credentials = session.snapshot().credentials.unwrap();
        assert_eq!(credentials.access_token_expiration, None);
        assert!(!session.is_token_expired(u64::MAX));
    }

    #[tokio::test]
    async fn set_tokens_without_session_creates_credentials() {
        let store = SessionStore::in_memory();
        store.update_tokens("A2".into(), "R2".into()).await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.access_token().as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn clear_keeps_device_token() {
        let store = SessionStore::in_memory();
        let device = store.device_token();
        store
            .set_auth_data(signed_in("A1", "R1", None), Some("cust-1".into()))
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.access_token().is_none());
        assert!(store.customer_id().is_none());
        assert_eq!(store.device_token(), device);
    }

    #[tokio::test]
    async fn token_expiry_uses_epoch_seconds() {
        let store = SessionStore::in_memory();
        assert!(!store.is_token_expired(u64::MAX), "signed out is never expired");

        store
            .set_auth_data(signed_in("A1", "R1", Some(1_700_000_000)), None)
            .await
            .unwrap();
        assert!(!store.is_token_expired(1_699_999_999));
        assert!(store.is_token_expired(1_700_000_000));

        let unknown = Credentials::new("A", "R");
        assert!(!unknown.is_access_token_expired(u64::MAX));
    }

    #[tokio::test]
    async fn cold_start_creates_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::SESSION_FILE_NAME);

        assert!(!path.exists());
        let store = SessionStore::load(path.clone()).await.unwrap();
        assert!(!store.is_authenticated());
        assert!(path.exists());

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: SessionState = serde_json::from_str(&contents).unwrap();
        assert_eq!(Some(parsed.device_token), store.device_token());
    }

    #[tokio::test]
    async fn roundtrip_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(path.clone()).await.unwrap();
        store
            .set_auth_data(signed_in("A1", "R1", Some(42)), Some("cust-9".into()))
            .await
            .unwrap();
        store.set_tokens("A2".into(), "R2".into()).await.unwrap();

        let reloaded = SessionStore::load(path).await.unwrap();
        assert_eq!(reloaded.access_token().as_deref(), Some("A2"));
        assert_eq!(reloaded.refresh_token().as_deref(), Some("R2"));
        assert_eq!(reloaded.customer_id().as_deref(), Some("cust-9"));
        assert_eq!(reloaded.device_token(), store.device_token());
    }

    #[tokio::test]
    async fn corrupt_session_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = SessionStore::load(path).await;
        assert!(matches!(result, Err(Error::CredentialParse(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(path.clone()).await.unwrap();
        store
            .set_auth_data(signed_in("A1", "R1", None), None)
            .await
            .unwrap();

        let metadata = tokio::fs::metadata(&path).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "session file must be 0600, got {mode:o}");
    }

    #[tokio::test]
    async fn concurrent_token_writes_leave_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = Arc::new(SessionStore::load(path.clone()).await.unwrap());

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_tokens(format!("A{i}"), format!("R{i}"))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: SessionState = serde_json::from_str(&contents).unwrap();
        let on_disk = parsed.credentials.unwrap().access_token.expose().clone();
        assert_eq!(Some(on_disk), store.access_token(), "file must match memory");
    }
}
