//! Revocable in-memory resource handles.
//!
//! Materialized bytes (extracted build entries, fallback images) are parked
//! in a registry and addressed through short-lived `local:` URLs, mirroring
//! object-URL semantics: whoever created a handle must revoke it when the
//! presenting view goes away, or the bytes stay live across navigations.
//! Handles revoke themselves on drop and revocation is exactly-once.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Bytes stored behind a local URL, with their content-type tag.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Arc<[u8]>,
    pub content_type: String,
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: HashMap<String, StoredBlob>,
    next_id: u64,
}

/// Registry mapping short-lived local URLs to in-memory bytes.
///
/// Cheap to clone; clones share the same underlying table.
#[derive(Debug, Clone, Default)]
pub struct UrlRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park bytes and hand back an owning, revocable handle.
    pub fn create(&self, bytes: Vec<u8>, content_type: impl Into<String>) -> ResourceHandle {
        let content_type = content_type.into();
        let len = bytes.len();
        let mut inner = self.inner.lock();
        let url = format!("local:blob/{:016x}", inner.next_id);
        inner.next_id += 1;
        inner.entries.insert(
            url.clone(),
            StoredBlob { bytes: bytes.into(), content_type: content_type.clone() },
        );
        tracing::debug!(%url, %content_type, len, "materialized resource handle");
        ResourceHandle { url, content_type, len, registry: self.clone(), revoked: false }
    }

    /// Look up the bytes behind a live URL.
    pub fn get(&self, url: &str) -> Option<StoredBlob> {
        self.inner.lock().entries.get(url).cloned()
    }

    /// Number of live (unrevoked) handles.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether no handles are live.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    fn revoke(&self, url: &str) -> bool {
        let removed = self.inner.lock().entries.remove(url).is_some();
        if removed {
            tracing::debug!(%url, "revoked resource handle");
        }
        removed
    }
}

/// A locally-scoped, revocable reference to in-memory bytes.
///
/// Owned exclusively by one resolution attempt; never shared across
/// concurrent resolutions. Dropping the handle revokes its URL.
#[derive(Debug)]
pub struct ResourceHandle {
    url: String,
    content_type: String,
    len: usize,
    registry: UrlRegistry,
    revoked: bool,
}

impl ResourceHandle {
    /// The short-lived local URL addressing the bytes.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Content-type tag recorded at materialization.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size of the materialized bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Revoke the URL, releasing the bytes.
    ///
    /// Returns `true` the first time; later calls are no-ops. Happens
    /// automatically on drop.
    pub fn revoke(&mut self) -> bool {
        if self.revoked {
            return false;
        }
        self.revoked = true;
        self.registry.revoke(&self.url)
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}
