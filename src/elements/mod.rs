pub mod finder;
pub mod provider;
pub mod state;

pub use finder::ElementFinder;
pub use provider::ElementStateProvider;
pub use state::ElementState;
