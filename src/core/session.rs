use crate::core::Locator;
use crate::errors::Result;
use async_trait::async_trait;

/// The live browser as seen by the waiting core.
///
/// Both calls are read-only and may be issued concurrently from several
/// waits. Lookups that fail because the page is still changing should return
/// a recoverable [`BrowserError`](crate::errors::BrowserError) (see
/// `is_recoverable`); a dead session must return a fatal one.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    type Handle: Clone + Send + Sync;

    /// Every element currently matching `locator`, in document order.
    /// No match is an empty vector, not an error.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Handle>>;

    /// Whether the element is visually rendered right now.
    async fn is_displayed(&self, handle: &Self::Handle) -> Result<bool>;
}
