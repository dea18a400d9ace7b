use crate::core::{Locator, RemoteSession};
use crate::elements::ElementState;
use crate::errors::{BrowserError, Result};
use crate::waits::ConditionalWait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Re-queries the session on every poll until some element matching a
/// locator is in the requested state.
///
/// Handles are never cached across polls: the page may re-render at any time,
/// so each poll starts from a fresh `find_all`.
pub struct ElementFinder<S: RemoteSession> {
    session: Arc<S>,
    wait: ConditionalWait,
}

impl<S: RemoteSession> Clone for ElementFinder<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            wait: self.wait.clone(),
        }
    }
}

impl<S: RemoteSession> ElementFinder<S> {
    pub fn new(session: Arc<S>, wait: ConditionalWait) -> Self {
        Self { session, wait }
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    pub fn conditional_wait(&self) -> &ConditionalWait {
        &self.wait
    }

    /// Elements matching `locator` in `state`, as seen by the last poll.
    ///
    /// An empty vector means nothing qualified before `timeout` ran out.
    pub async fn find_elements(
        &self,
        locator: &Locator,
        timeout: Duration,
        state: ElementState,
    ) -> Result<Vec<S::Handle>> {
        let found = self
            .wait
            .wait_for_value(
                move || self.poll_once(locator, state),
                timeout,
                self.wait.timeouts().polling_interval(),
            )
            .await?
            .unwrap_or_default();

        debug!(
            locator = %locator,
            state = %state,
            count = found.len(),
            "Element lookup finished"
        );
        Ok(found)
    }

    /// First element matching `locator` in `state`, waiting up to the
    /// configured command timeout.
    pub async fn find_element(&self, locator: &Locator, state: ElementState) -> Result<S::Handle> {
        self.find_element_with_timeout(locator, self.wait.timeouts().command(), state)
            .await
    }

    /// [`find_element`](Self::find_element) with a caller-chosen timeout.
    pub async fn find_element_with_timeout(
        &self,
        locator: &Locator,
        timeout: Duration,
        state: ElementState,
    ) -> Result<S::Handle> {
        self.find_elements(locator, timeout, state)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                BrowserError::ElementNotFound(format!(
                    "{} ({}) within {} ms",
                    locator,
                    state,
                    timeout.as_millis()
                ))
            })
    }

    async fn poll_once(
        &self,
        locator: &Locator,
        state: ElementState,
    ) -> Result<Option<Vec<S::Handle>>> {
        let handles = match self.session.find_all(locator).await {
            Ok(handles) => handles,
            Err(err) if err.is_recoverable() => {
                trace!(locator = %locator, error = %err, "Lookup failed, counting as no match");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut matched = Vec::with_capacity(handles.len());
        for handle in handles {
            if self.satisfies(&handle, state).await? {
                matched.push(handle);
            }
        }

        Ok((!matched.is_empty()).then_some(matched))
    }

    async fn satisfies(&self, handle: &S::Handle, state: ElementState) -> Result<bool> {
        match state {
            ElementState::ExistsInAnyState => Ok(true),
            ElementState::Displayed => match self.session.is_displayed(handle).await {
                Ok(displayed) => Ok(displayed),
                Err(err) if err.is_recoverable() => {
                    trace!(error = %err, "Element went away during visibility check");
                    Ok(false)
                }
                Err(err) => Err(err),
            },
        }
    }
}
