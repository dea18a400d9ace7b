use crate::core::{Locator, RemoteSession};
use crate::elements::{ElementFinder, ElementState};
use crate::errors::Result;
use std::time::Duration;

/// Yes/no state questions about the elements behind one locator.
///
/// Not finding anything is always a plain `false`. Only a broken session
/// surfaces as an error.
pub struct ElementStateProvider<S: RemoteSession> {
    locator: Locator,
    finder: ElementFinder<S>,
}

impl<S: RemoteSession> ElementStateProvider<S> {
    pub fn new(locator: Locator, finder: ElementFinder<S>) -> Self {
        Self { locator, finder }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Single look, no waiting.
    pub async fn is_displayed(&self) -> Result<bool> {
        self.wait_for_displayed(Duration::ZERO).await
    }

    /// Single look, no waiting.
    pub async fn is_exist(&self) -> Result<bool> {
        self.wait_for_exist(Duration::ZERO).await
    }

    pub async fn wait_for_displayed(&self, timeout: Duration) -> Result<bool> {
        self.any_in_state(timeout, ElementState::Displayed).await
    }

    pub async fn wait_for_exist(&self, timeout: Duration) -> Result<bool> {
        self.any_in_state(timeout, ElementState::ExistsInAnyState).await
    }

    /// Each poll is a fresh zero-timeout [`is_displayed`](Self::is_displayed).
    pub async fn wait_for_not_displayed(&self, timeout: Duration) -> Result<bool> {
        self.finder
            .conditional_wait()
            .wait_for_true(
                move || async move { self.is_displayed().await.map(|displayed| !displayed) },
                timeout,
            )
            .await
    }

    /// Each poll is a fresh zero-timeout [`is_exist`](Self::is_exist).
    pub async fn wait_for_not_exist(&self, timeout: Duration) -> Result<bool> {
        self.finder
            .conditional_wait()
            .wait_for_true(
                move || async move { self.is_exist().await.map(|exists| !exists) },
                timeout,
            )
            .await
    }

    async fn any_in_state(&self, timeout: Duration, state: ElementState) -> Result<bool> {
        let found = self
            .finder
            .find_elements(&self.locator, timeout, state)
            .await?;
        Ok(!found.is_empty())
    }
}
