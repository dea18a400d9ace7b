pub mod chrome;

pub use chrome::{ChromeElement, ChromeSession};
