//! Wire constants of the storefront auth API

/// Path appended to the configured auth URL for token refresh
pub const REFRESH_PATH: &str = "/refresh";

/// Default file name of the persisted token cache
pub const SESSION_FILE_NAME: &str = "auth-storage.json";
