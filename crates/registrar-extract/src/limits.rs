//! Payload size limits.

/// Default maximum JSON or url-encoded body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default maximum size of one multipart part (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum multipart body size (50 MiB).
pub const DEFAULT_MAX_MULTIPART_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum number of multipart parts.
pub const DEFAULT_MAX_MULTIPART_FIELDS: usize = 100;

/// Size limits applied while reading request payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum JSON or url-encoded body size in bytes.
    pub max_body_size: usize,
    /// Maximum size of one multipart part in bytes.
    pub max_file_size: usize,
    /// Maximum multipart body size in bytes.
    pub max_multipart_size: usize,
    /// Maximum number of multipart parts.
    pub max_multipart_fields: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_multipart_size: DEFAULT_MAX_MULTIPART_SIZE,
            max_multipart_fields: DEFAULT_MAX_MULTIPART_FIELDS,
        }
    }
}

impl Limits {
    /// Creates the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the JSON or url-encoded body limit.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Sets the per-part limit.
    #[must_use]
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets the multipart body limit.
    #[must_use]
    pub fn max_multipart_size(mut self, size: usize) -> Self {
        self.max_multipart_size = size;
        self
    }

    /// Sets the multipart part count limit.
    #[must_use]
    pub fn max_multipart_fields(mut self, count: usize) -> Self {
        self.max_multipart_fields = count;
        self
    }
}
