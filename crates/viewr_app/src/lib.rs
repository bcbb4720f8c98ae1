//! viewR page client: binds the core page state machine to a DOM, a durable
//! store and the viewR server.
pub mod platform;

pub use platform::app::{PageEvent, PageRuntime, RuntimeSettings};
pub use platform::config::{ClientConfig, ConfigError};
pub use platform::dom::{Dom, DomEvent, EventTarget};
pub use platform::headless::HeadlessDom;
