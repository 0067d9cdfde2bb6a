//! Built-in tool services.

pub mod time;

pub use time::TimeService;
