//! Client configuration
//!
//! Config precedence: env vars > config file > defaults. Only the base URL
//! and tenant can be overridden from the environment; credentials never live
//! in the config file, they come from the injected `CredentialStore`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use storefront_auth::CredentialStore;

/// Connection settings shared by every resource client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Prefix for relative endpoints, e.g. `https://api.example.com`
    pub base_url: String,
    /// Sent as `x-api-tenant` on every request
    pub tenant: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries for retryable transport failures (total attempts = retries + 1)
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Linear backoff unit: the n-th retry waits `n * retry_delay_ms`
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Base URL of the auth service; required when a credential store is attached
    #[serde(default)]
    pub auth_url: Option<String>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

impl ClientConfig {
    /// Config with default timeout (10s), 3 retries and 1s retry unit.
    pub fn new(base_url: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tenant: tenant.into(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            auth_url: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> common::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.tenant.trim().is_empty() {
            return Err(common::Error::Config("tenant must not be empty".into()));
        }

        if self.timeout_ms == 0 {
            return Err(common::Error::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if let Some(auth_url) = &self.auth_url {
            if !auth_url.starts_with("http://") && !auth_url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "auth_url must start with http:// or https://, got: {auth_url}"
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// `STOREFRONT_BASE_URL` and `STOREFRONT_TENANT` override the file.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = toml::from_str(&contents)?;

        if let Ok(base_url) = std::env::var("STOREFRONT_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(tenant) = std::env::var("STOREFRONT_TENANT") {
            config.tenant = tenant;
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolve config file path from an explicit argument or STOREFRONT_CONFIG.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        if let Some(p) = explicit {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("STOREFRONT_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("storefront.toml")
    }
}

/// Credential collaborator attached to the pipeline.
#[derive(Clone)]
pub struct AuthConfig {
    /// Base URL of the auth service; refresh goes to `{auth_url}/refresh`
    pub auth_url: String,
    pub store: Arc<dyn CredentialStore>,
}

impl AuthConfig {
    pub fn new(auth_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            auth_url: auth_url.into(),
            store,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("auth_url", &self.auth_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn clear_overrides() {
        unsafe {
            remove_env("STOREFRONT_BASE_URL");
            remove_env("STOREFRONT_TENANT");
        }
    }

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new("https://api.example.com", "acme");
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert!(config.auth_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_minimal_file_uses_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let (_dir, path) = write_config(
            "storefront.toml",
            r#"
base_url = "https://api.example.com"
tenant = "acme"
"#,
        );

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.tenant, "acme");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
    }

    #[test]
    fn load_reads_all_fields() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let (_dir, path) = write_config(
            "storefront.toml",
            r#"
base_url = "https://api.example.com"
tenant = "acme"
timeout_ms = 2500
retries = 1
retry_delay_ms = 50
auth_url = "https://api.example.com/auth"
"#,
        );

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.retries, 1);
        assert_eq!(config.retry_delay(), Duration::from_millis(50));
        assert_eq!(
            config.auth_url.as_deref(),
            Some("https://api.example.com/auth")
        );
    }

    #[test]
    fn env_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let (_dir, path) = write_config(
            "storefront.toml",
            r#"
base_url = "https://api.example.com"
tenant = "acme"
"#,
        );

        unsafe {
            set_env("STOREFRONT_BASE_URL", "https://staging.example.com");
            set_env("STOREFRONT_TENANT", "acme-staging");
        }
        let config = ClientConfig::load(&path).unwrap();
        clear_overrides();

        assert_eq!(config.base_url, "https://staging.example.com");
        assert_eq!(config.tenant, "acme-staging");
    }

    #[test]
    fn load_missing_file_errors() {
        let result = ClientConfig::load(Path::new("/nonexistent/storefront.toml"));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }

    #[test]
    fn load_invalid_toml_errors() {
        let (_dir, path) = write_config("bad.toml", "not valid {{{{ toml");
        assert!(matches!(
            ClientConfig::load(&path),
            Err(common::Error::Toml(_))
        ));
    }

    #[test]
    fn base_url_without_scheme_rejected() {
        let err = ClientConfig::new("api.example.com", "acme")
            .validate()
            .unwrap_err();
        assert!(
            err.to_string().contains("base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn empty_tenant_rejected() {
        assert!(
            ClientConfig::new("https://api.example.com", "  ")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let config =
            ClientConfig::new("https://api.example.com", "acme").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err(), "timeout of 0 must be rejected");
    }

    #[test]
    fn auth_url_without_scheme_rejected() {
        let config = ClientConfig::new("https://api.example.com", "acme").with_auth_url("auth");
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_path_prefers_explicit_then_env_then_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("STOREFRONT_CONFIG", "/env/storefront.toml") };
        assert_eq!(
            ClientConfig::resolve_path(Some("/cli/wins.toml")),
            PathBuf::from("/cli/wins.toml")
        );
        assert_eq!(
            ClientConfig::resolve_path(None),
            PathBuf::from("/env/storefront.toml")
        );
        unsafe { remove_env("STOREFRONT_CONFIG") };
        assert_eq!(
            ClientConfig::resolve_path(None),
            PathBuf::from("storefront.toml")
        );
    }
}
