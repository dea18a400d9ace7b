pub mod conditional;

pub use conditional::ConditionalWait;
