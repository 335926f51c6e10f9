//! Storage key constants.

/// Storage keys used by the wallet client
pub struct StorageKeys;

impl StorageKeys {
    /// Bearer token attached to API requests
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Long-lived token exchanged at `/auth/refresh`
    pub const REFRESH_TOKEN: &'static str = "refresh_token";
}
