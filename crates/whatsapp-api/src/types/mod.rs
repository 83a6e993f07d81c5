//! Request and response types for the messaging API.

mod health;
mod send;
mod statistics;
mod template;

pub use health::*;
pub use send::*;
pub use statistics::*;
pub use template::*;
