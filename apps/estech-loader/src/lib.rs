//! ES Tech Loader
//!
//! A background launcher whose actions come from a remotely managed JSON
//! document. The library provides the configuration sync engine, the
//! first-match application resolver and a small event loop that ties them
//! together for a menu-bar or command-line front end.

pub mod actions;
pub mod app;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod platform;
pub mod settings;
pub mod url_scheme;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{LoaderError, Result};
