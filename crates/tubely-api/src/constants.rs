//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Mount point of the local-backend asset route.
pub const ASSETS_PREFIX: &str = "/assets";

/// Multipart field carrying the video bytes.
pub const VIDEO_FIELD_NAME: &str = "video";

/// Prefix of per-request staging directories.
pub const STAGING_DIR_PREFIX: &str = "tubely-upload-";

/// Name of the staged upload inside its staging directory.
pub const STAGED_FILE_NAME: &str = "upload.mp4";

/// `iss` claim of access tokens.
pub const ACCESS_TOKEN_ISSUER: &str = "tubely-access";
