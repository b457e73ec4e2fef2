//! Link-existence cache hook.

use expunge_core::PageKey;

/// Process-wide cache answering "does this title exist".
///
/// A purged title must stop being reported as existing, so the purge
/// invalidates it once the relational delete has committed.
pub trait LinkCache: Send + Sync {
    fn invalidate(&self, key: &PageKey);
}

/// Cache used when the host keeps no link cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLinkCache;

impl LinkCache for NullLinkCache {
    fn invalidate(&self, key: &PageKey) {
        tracing::trace!(page = %key, "No link cache to invalidate");
    }
}
