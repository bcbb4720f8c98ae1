pub mod app;
pub mod config;
pub mod console;
pub mod dom;
pub mod effects;
pub mod headless;
pub mod logging;
pub mod router;
