//! Store configuration.

/// Configuration for a [`RecordStore`](super::RecordStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Check every inserted record against the catalog.
    pub validate_on_insert: bool,

    /// First identifier handed out by `next_id`.
    pub first_id: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            validate_on_insert: true,
            first_id: 1,
        }
    }
}

impl StoreConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept records without checking them against the catalog.
    pub fn without_validation(mut self) -> Self {
        self.validate_on_insert = false;
        self
    }

    /// Set the first generated identifier.
    pub fn with_first_id(mut self, first_id: u64) -> Self {
        self.first_id = first_id;
        self
    }
}
