//! Configuration for the flash development server.
//!
//! Settings are layered with `figment`: built-in defaults, then an optional
//! `flash.config.json` in the project root, then `FLASH_`-prefixed
//! environment variables, then command-line overrides.

pub mod config;
pub mod error;
pub mod loading;

pub use config::FlashConfig;
pub use error::{ConfigError, Result};
pub use loading::{ConfigOverrides, CONFIG_FILE_NAME, ENV_PREFIX};
