//! Scripted in-memory [`RemoteSession`] for exercising waits without a browser.
//!
//! Each locator gets a timeline of frames. A frame lists the elements that
//! `find_all` reports from its start offset until the next frame begins.
//! Offsets are measured on tokio's clock from the moment the session is built,
//! so tests running on a paused clock get exact timings.

use crate::core::{Locator, RemoteSession};
use crate::errors::{BrowserError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub id: u32,
    pub displayed: bool,
    /// Detached between lookup and visibility check.
    pub stale: bool,
}

impl FakeElement {
    pub fn visible(id: u32) -> Self {
        Self {
            id,
            displayed: true,
            stale: false,
        }
    }

    pub fn hidden(id: u32) -> Self {
        Self {
            id,
            displayed: false,
            stale: false,
        }
    }

    pub fn stale(id: u32) -> Self {
        Self {
            id,
            displayed: true,
            stale: true,
        }
    }
}

struct Frame {
    at: Duration,
    elements: Vec<FakeElement>,
}

enum Failure {
    OnPoll(usize, fn() -> BrowserError),
    EveryPoll(fn() -> BrowserError),
}

pub struct ScriptedSession {
    started: Instant,
    timelines: HashMap<Locator, Vec<Frame>>,
    failures: Vec<Failure>,
    polls: Mutex<Vec<Duration>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            timelines: HashMap::new(),
            failures: Vec::new(),
            polls: Mutex::new(Vec::new()),
        }
    }

    /// From `at` on, `locator` matches `elements`.
    pub fn frame(mut self, locator: &Locator, at: Duration, elements: Vec<FakeElement>) -> Self {
        let frames = self.timelines.entry(locator.clone()).or_default();
        frames.push(Frame { at, elements });
        frames.sort_by_key(|frame| frame.at);
        self
    }

    /// The `poll`-th `find_all` call (zero-based, any locator) fails.
    pub fn fail_on_poll(mut self, poll: usize, error: fn() -> BrowserError) -> Self {
        self.failures.push(Failure::OnPoll(poll, error));
        self
    }

    pub fn fail_every_poll(mut self, error: fn() -> BrowserError) -> Self {
        self.failures.push(Failure::EveryPoll(error));
        self
    }

    pub async fn poll_count(&self) -> usize {
        self.polls.lock().await.len()
    }

    /// Offsets at which `find_all` was called.
    pub async fn poll_offsets(&self) -> Vec<Duration> {
        self.polls.lock().await.clone()
    }

    fn elements_at(&self, locator: &Locator, elapsed: Duration) -> Vec<FakeElement> {
        self.timelines
            .get(locator)
            .and_then(|frames| frames.iter().rev().find(|frame| frame.at <= elapsed))
            .map(|frame| frame.elements.clone())
            .unwrap_or_default()
    }
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteSession for ScriptedSession {
    type Handle = FakeElement;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeElement>> {
        let elapsed = self.started.elapsed();
        let poll = {
            let mut polls = self.polls.lock().await;
            polls.push(elapsed);
            polls.len() - 1
        };

        for failure in &self.failures {
            match failure {
                Failure::OnPoll(n, error) if *n == poll => return Err(error()),
                Failure::EveryPoll(error) => return Err(error()),
                _ => {}
            }
        }

        Ok(self.elements_at(locator, elapsed))
    }

    async fn is_displayed(&self, handle: &FakeElement) -> Result<bool> {
        if handle.stale {
            return Err(BrowserError::StaleElement(format!("element {}", handle.id)));
        }
        Ok(handle.displayed)
    }
}
