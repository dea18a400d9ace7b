pub mod config;
pub mod locator;
pub mod session;

pub use config::{BrowserProfile, BrowserType, Config, TimeoutConfig, Viewport};
pub use locator::{By, Locator};
pub use session::RemoteSession;
