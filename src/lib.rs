#[cfg(feature = "chrome")]
pub mod browser;
pub mod core;
pub mod elements;
pub mod errors;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod waits;

#[cfg(feature = "chrome")]
pub use browser::{ChromeElement, ChromeSession};
pub use crate::core::{By, Config, Locator, RemoteSession, TimeoutConfig};
pub use elements::{ElementFinder, ElementState, ElementStateProvider};
pub use errors::{BrowserError, Result};
pub use waits::ConditionalWait;
