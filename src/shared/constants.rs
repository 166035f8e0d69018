/// Directory (under the public root) and URL prefix for uploaded files
pub const UPLOAD_DIR: &str = "upload";

/// Key under which the whole site content document is persisted
pub const CONTENT_STORAGE_KEY: &str = "site_content";

/// Realm announced by the admin basic-auth challenge
pub const ADMIN_REALM: &str = "Institute Admin";

/// Capacity of the content change broadcast channel
pub const CONTENT_EVENT_CAPACITY: usize = 64;
